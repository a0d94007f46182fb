//! Data Providers
//! The narrow seam between the pipeline and wherever the two sheets live.

use super::loader::LoaderError;
use crate::config::SourceConfig;
use polars::prelude::*;
use std::cell::Cell;
use std::path::{Path, PathBuf};

/// External datastore exposing the enrollment sheet and the coordinate sheet.
pub trait DataProvider {
    /// Enrollment records, one row per student, with a header row.
    fn fetch_records(&self) -> Result<DataFrame, LoaderError>;

    /// City coordinate lookup, one row per city/state pair, with a header row.
    fn fetch_coordinates(&self) -> Result<DataFrame, LoaderError>;

    /// Human readable location, used in logs and error messages.
    fn describe(&self) -> String;
}

/// Spreadsheet exported as one `<sheet>.csv` file per tab inside a directory.
pub struct CsvSheetProvider {
    directory: PathBuf,
    records_sheet: String,
    coordinates_sheet: String,
    delimiter: u8,
}

impl CsvSheetProvider {
    pub fn new(directory: impl Into<PathBuf>, records_sheet: &str, coordinates_sheet: &str) -> Self {
        Self {
            directory: directory.into(),
            records_sheet: records_sheet.to_string(),
            coordinates_sheet: coordinates_sheet.to_string(),
            delimiter: b',',
        }
    }

    pub fn from_config(source: &SourceConfig) -> Self {
        Self::new(
            &source.directory,
            &source.records_sheet,
            &source.coordinates_sheet,
        )
        .with_delimiter(source.delimiter_byte())
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn sheet_path(&self, sheet: &str) -> PathBuf {
        self.directory.join(format!("{sheet}.csv"))
    }

    fn read_sheet(&self, sheet: &str) -> Result<DataFrame, LoaderError> {
        if !self.directory.is_dir() {
            return Err(LoaderError::SourceUnavailable {
                sheet: sheet.to_string(),
                reason: format!("directory {:?} not found", self.directory),
            });
        }

        let path = self.sheet_path(sheet);
        if !path.is_file() {
            return Err(LoaderError::SourceUnavailable {
                sheet: sheet.to_string(),
                reason: format!("sheet file {:?} not found", path),
            });
        }

        // Every column is read as text; numeric parsing happens per column downstream.
        LazyCsvReader::new(&path)
            .with_separator(self.delimiter)
            .with_infer_schema_length(Some(0))
            .finish()
            .and_then(|lazy| lazy.collect())
            .map_err(|e| LoaderError::SourceUnavailable {
                sheet: sheet.to_string(),
                reason: e.to_string(),
            })
    }
}

impl DataProvider for CsvSheetProvider {
    fn fetch_records(&self) -> Result<DataFrame, LoaderError> {
        self.read_sheet(&self.records_sheet)
    }

    fn fetch_coordinates(&self) -> Result<DataFrame, LoaderError> {
        self.read_sheet(&self.coordinates_sheet)
    }

    fn describe(&self) -> String {
        format!("csv sheets in {:?}", self.directory)
    }
}

/// Provider backed by frames already in memory. Counts fetches so callers can
/// observe cache behaviour.
#[derive(Default)]
pub struct InMemoryProvider {
    records: Option<DataFrame>,
    coordinates: Option<DataFrame>,
    fetches: Cell<usize>,
}

impl InMemoryProvider {
    pub fn new(records: DataFrame, coordinates: DataFrame) -> Self {
        Self {
            records: Some(records),
            coordinates: Some(coordinates),
            fetches: Cell::new(0),
        }
    }

    /// A provider whose every fetch fails, as if the remote store were down.
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Number of `fetch_records` calls served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.get()
    }

    fn frame(&self, frame: &Option<DataFrame>, sheet: &str) -> Result<DataFrame, LoaderError> {
        frame.clone().ok_or_else(|| LoaderError::SourceUnavailable {
            sheet: sheet.to_string(),
            reason: "in-memory source has no such table".to_string(),
        })
    }
}

impl DataProvider for InMemoryProvider {
    fn fetch_records(&self) -> Result<DataFrame, LoaderError> {
        self.fetches.set(self.fetches.get() + 1);
        self.frame(&self.records, "records")
    }

    fn fetch_coordinates(&self) -> Result<DataFrame, LoaderError> {
        self.frame(&self.coordinates, "coordinates")
    }

    fn describe(&self) -> String {
        "in-memory tables".to_string()
    }
}
