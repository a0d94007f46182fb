//! Filtered Data Export
//! Writes the current filtered view as semicolon-separated UTF-8 text.

use super::filter::FilteredView;
use super::model::{Category, Dimension, JoinedRecord};
use crate::config::ColumnConfig;
use polars::prelude::*;
use std::fs;
use std::path::Path;
use tracing::info;

/// Field separator of exported files.
pub const EXPORT_SEPARATOR: u8 = b';';

/// Suggested file name for the download.
pub const EXPORT_FILE_NAME: &str = "dados_filtrados.csv";

fn cell(category: &Category) -> Option<String> {
    (!category.is_blank()).then(|| category.label().to_string())
}

/// Build a frame with one row per filtered record: source columns in sheet
/// order, then join key, latitude and longitude as joined.
pub fn to_frame(
    view: &FilteredView<'_, JoinedRecord>,
    columns: &ColumnConfig,
    source_columns: &[String],
    extra_columns: &[String],
) -> PolarsResult<DataFrame> {
    let core = [
        (columns.city.as_str(), Dimension::City),
        (columns.state.as_str(), Dimension::State),
        (columns.kind.as_str(), Dimension::Type),
        (columns.contract_status.as_str(), Dimension::ContractStatus),
        (columns.course.as_str(), Dimension::Course),
    ];

    let mut out: Vec<Column> = Vec::with_capacity(source_columns.len() + 3);

    for name in source_columns {
        let values: Vec<Option<String>> =
            if let Some((_, dimension)) = core.iter().find(|(col, _)| *col == name.as_str()) {
                view.iter()
                    .map(|row| cell(row.record.category(*dimension)))
                    .collect()
            } else if let Some(idx) = extra_columns.iter().position(|col| col == name) {
                view.iter()
                    .map(|row| row.record.extras.get(idx).cloned().flatten())
                    .collect()
            } else {
                continue;
            };
        out.push(Column::new(name.as_str().into(), values));
    }

    let keys: Vec<String> = view.iter().map(|row| row.record.join_key.to_string()).collect();
    let latitudes: Vec<Option<f64>> = view.iter().map(|row| row.latitude).collect();
    let longitudes: Vec<Option<f64>> = view.iter().map(|row| row.longitude).collect();

    out.push(Column::new(columns.key.as_str().into(), keys));
    out.push(Column::new(columns.latitude.as_str().into(), latitudes));
    out.push(Column::new(columns.longitude.as_str().into(), longitudes));

    DataFrame::new(out)
}

/// Serialize the view to CSV bytes with a header row.
pub fn to_csv_bytes(
    view: &FilteredView<'_, JoinedRecord>,
    columns: &ColumnConfig,
    source_columns: &[String],
    extra_columns: &[String],
) -> PolarsResult<Vec<u8>> {
    let mut df = to_frame(view, columns, source_columns, extra_columns)?;
    let mut buffer: Vec<u8> = Vec::new();
    CsvWriter::new(&mut buffer)
        .include_header(true)
        .with_separator(EXPORT_SEPARATOR)
        .finish(&mut df)?;
    Ok(buffer)
}

/// Write already serialized CSV to disk.
pub fn write_csv(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    fs::write(path, bytes)?;
    info!(?path, bytes = bytes.len(), "filtered data exported");
    Ok(())
}
