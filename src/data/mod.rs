//! Data module - sheet loading, joining, sanitizing and filtering

mod dataset;
pub mod export;
mod filter;
mod joiner;
mod loader;
mod model;
mod provider;
mod sanitizer;
mod schema;

pub use dataset::Dataset;
pub use filter::{
    EmptyResultWarning, FilterSelection, FilteredView, TopN, TOP_N_DEFAULT, TOP_N_MAX, TOP_N_MIN,
};
pub use joiner::join;
pub use loader::{DataLoader, LoaderError, RawTables};
pub use model::{
    Category, CoordinateEntry, Dimension, GeoPoint, GeoRecord, JoinKey, JoinedRecord, Record,
    RecordTable,
};
pub use provider::{CsvSheetProvider, DataProvider, InMemoryProvider};
pub use sanitizer::{
    repair_latitude, repair_longitude, sanitize, sanitize_position, CoordinateIssue,
    DataQualityWarning, SanitizeReport,
};
pub use schema::{coordinates_from_frame, records_from_frame, SchemaError};
