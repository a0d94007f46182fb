//! Enrollment Dashboard
//!
//! Student enrollment records from a spreadsheet joined with city coordinates,
//! filtered and aggregated for an authenticated desktop dashboard.

pub mod auth;
pub mod charts;
pub mod config;
pub mod data;
pub mod error;
pub mod gui;
pub mod session;
pub mod stats;
