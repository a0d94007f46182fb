//! Stats module - KPIs and grouped counts

mod calculator;

pub use calculator::{
    CityBubble, CountEntry, GroupedCounts, Kpis, MapBubble, StateBubble, StatsCalculator, Summary,
    GROUPED_DIMENSIONS,
};
