//! Sheet Loader Module
//! Fetches both sheets from a provider and strips columns that are entirely empty.

use super::provider::DataProvider;
use polars::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Data source unavailable ({sheet}): {reason}")]
    SourceUnavailable { sheet: String, reason: String },
    #[error("Failed to load sheet: {0}")]
    CsvError(#[from] PolarsError),
}

/// Both sheets as returned by the provider, minus blank columns.
#[derive(Debug, Clone)]
pub struct RawTables {
    pub records: DataFrame,
    pub coordinates: DataFrame,
}

/// Handles sheet loading.
pub struct DataLoader;

impl DataLoader {
    /// Read both sheets, one provider round-trip each.
    pub fn load(provider: &dyn DataProvider) -> Result<RawTables, LoaderError> {
        info!(source = %provider.describe(), "loading sheets");

        let records = Self::drop_empty_columns(&provider.fetch_records()?)?;
        let coordinates = Self::drop_empty_columns(&provider.fetch_coordinates()?)?;

        info!(
            records = records.height(),
            record_columns = records.width(),
            coordinates = coordinates.height(),
            "sheets loaded"
        );

        Ok(RawTables {
            records,
            coordinates,
        })
    }

    /// Remove every column whose cells are all null. Exports from the sheet
    /// occasionally carry blank trailing columns.
    pub fn drop_empty_columns(df: &DataFrame) -> Result<DataFrame, LoaderError> {
        // With no rows there is nothing to judge a column by.
        if df.height() == 0 {
            return Ok(df.clone());
        }

        let kept: Vec<Column> = df
            .get_columns()
            .iter()
            .filter(|col| col.null_count() < col.len())
            .cloned()
            .collect();

        let dropped = df.width() - kept.len();
        if dropped > 0 {
            debug!(dropped, "dropped empty columns");
        }

        Ok(DataFrame::new(kept)?)
    }

    /// Get list of column names.
    pub fn get_columns(df: &DataFrame) -> Vec<String> {
        df.get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}
