//! Sheet Schema Module
//! Required-column checks and conversion of raw frames into typed rows.

use super::model::{Category, CoordinateEntry, Record, RecordTable};
use crate::config::ColumnConfig;
use polars::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Required column '{column}' not found in {table} sheet")]
    MissingColumn { table: &'static str, column: String },
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Fail unless every named column is present. Runs before any row is read.
pub fn require_columns(
    df: &DataFrame,
    table: &'static str,
    required: &[&str],
) -> Result<(), SchemaError> {
    let names = df.get_column_names();
    for column in required {
        if !names.iter().any(|name| name.as_str() == *column) {
            return Err(SchemaError::MissingColumn {
                table,
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

/// Check both sheets before any row is converted.
pub fn validate(records: &DataFrame, coordinates: &DataFrame, columns: &ColumnConfig) -> Result<(), SchemaError> {
    require_columns(records, "records", &columns.record_columns())?;
    require_columns(coordinates, "coordinates", &columns.coordinate_columns())
}

/// Cell values of a column as text, whatever dtype the provider produced.
fn text_cells(df: &DataFrame, column: &str) -> Result<Vec<Option<String>>, SchemaError> {
    let col = df.column(column)?.cast(&DataType::String)?;
    let values = col
        .as_materialized_series()
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect();
    Ok(values)
}

/// Numeric cell values; anything that does not parse becomes `None`.
fn numeric_cells(df: &DataFrame, column: &str) -> Result<Vec<Option<f64>>, SchemaError> {
    Ok(text_cells(df, column)?
        .into_iter()
        .map(|cell| cell.and_then(|s| parse_number(&s)))
        .collect())
}

/// Lenient number parsing for sheet cells. Non-finite results count as unparseable.
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Convert the enrollment sheet into records.
pub fn records_from_frame(df: &DataFrame, columns: &ColumnConfig) -> Result<RecordTable, SchemaError> {
    let core = columns.record_columns();
    require_columns(df, "records", &core)?;

    // Key and coordinate columns come from the lookup sheet, never from the records.
    let joined = columns.coordinate_columns();
    let source_columns: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .filter(|name| !joined.contains(&name.as_str()))
        .collect();
    let extra_columns: Vec<String> = source_columns
        .iter()
        .filter(|name| !core.contains(&name.as_str()))
        .cloned()
        .collect();

    let cities = text_cells(df, &columns.city)?;
    let states = text_cells(df, &columns.state)?;
    let kinds = text_cells(df, &columns.kind)?;
    let statuses = text_cells(df, &columns.contract_status)?;
    let courses = text_cells(df, &columns.course)?;
    let extras = extra_columns
        .iter()
        .map(|name| text_cells(df, name))
        .collect::<Result<Vec<_>, _>>()?;

    let records = (0..df.height())
        .map(|row| {
            Record::new(
                Category::from_cell(cities[row].as_deref()),
                Category::from_cell(states[row].as_deref()),
                Category::from_cell(kinds[row].as_deref()),
                Category::from_cell(statuses[row].as_deref()),
                Category::from_cell(courses[row].as_deref()),
            )
            .with_extras(extras.iter().map(|col| col[row].clone()).collect())
        })
        .collect();

    Ok(RecordTable {
        records,
        source_columns,
        extra_columns,
    })
}

/// Convert the coordinate sheet into lookup entries. Rows without a key are skipped.
pub fn coordinates_from_frame(
    df: &DataFrame,
    columns: &ColumnConfig,
) -> Result<Vec<CoordinateEntry>, SchemaError> {
    require_columns(df, "coordinates", &columns.coordinate_columns())?;

    let keys = text_cells(df, &columns.key)?;
    let latitudes = numeric_cells(df, &columns.latitude)?;
    let longitudes = numeric_cells(df, &columns.longitude)?;

    Ok(keys
        .into_iter()
        .zip(latitudes)
        .zip(longitudes)
        .filter_map(|((key, lat), lon)| {
            key.filter(|k| !k.trim().is_empty())
                .map(|k| CoordinateEntry::new(&k, lat, lon))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> ColumnConfig {
        ColumnConfig::default()
    }

    #[test]
    fn missing_city_column_is_a_schema_error() {
        let df = df!("Estado" => &["SP"], "Tipo" => &["EAD"]).unwrap();
        let err = records_from_frame(&df, &columns()).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::MissingColumn { table: "records", ref column } if column == "Cidade"
        ));
    }

    #[test]
    fn missing_key_column_is_a_schema_error() {
        let df = df!("Latitude" => &["1"], "Longitude" => &["2"]).unwrap();
        let err = coordinates_from_frame(&df, &columns()).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::MissingColumn { table: "coordinates", ref column } if column == "Chave"
        ));
    }

    #[test]
    fn records_keep_extra_columns_in_order() {
        let df = df!(
            "Matricula" => &["001", "002"],
            "Cidade" => &[" Campinas", "Natal"],
            "Estado" => &["sp", "RN"],
            "Tipo" => &["EAD", "Presencial"],
            "Situacao do contrato" => &["Vigente", "Cancelado"],
            "Curso" => &["Direito", "Pedagogia"]
        )
        .unwrap();

        let table = records_from_frame(&df, &columns()).unwrap();
        assert_eq!(table.extra_columns, vec!["Matricula"]);
        assert_eq!(table.source_columns.len(), 6);
        assert_eq!(table.records.len(), 2);
        let first = &table.records[0];
        assert_eq!(first.city.label(), "Campinas");
        assert_eq!(first.join_key.as_str(), "CAMPINAS - SP");
        assert_eq!(first.extras, vec![Some("001".to_string())]);
    }

    #[test]
    fn numeric_dtypes_and_garbage_are_both_handled() {
        let df = df!(
            "Chave" => &["NATAL - RN", "RECIFE - PE", ""],
            "Latitude" => &[-57950000.0, 1.0, 2.0],
            "Longitude" => &["-35.21", "n/a", "3"]
        )
        .unwrap();

        let entries = coordinates_from_frame(&df, &columns()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].latitude, Some(-57950000.0));
        assert_eq!(entries[0].longitude, Some(-35.21));
        assert_eq!(entries[1].longitude, None);
    }

    #[test]
    fn lookup_columns_in_records_sheet_are_not_extras() {
        let df = df!(
            "Cidade" => &["Natal"],
            "Estado" => &["RN"],
            "Tipo" => &["EAD"],
            "Situacao do contrato" => &["VIGENTE"],
            "Curso" => &["Direito"],
            "Chave" => &["stale"]
        )
        .unwrap();
        let table = records_from_frame(&df, &columns()).unwrap();
        assert!(table.extra_columns.is_empty());
        assert!(!table.source_columns.contains(&"Chave".to_string()));
    }

    #[test]
    fn validate_checks_coordinates_even_when_records_are_fine() {
        let records = df!(
            "Cidade" => &["Natal"],
            "Estado" => &["RN"],
            "Tipo" => &["EAD"],
            "Situacao do contrato" => &["VIGENTE"],
            "Curso" => &["Direito"]
        )
        .unwrap();
        let coords = df!("Chave" => &["NATAL - RN"], "Latitude" => &["1"]).unwrap();
        let err = validate(&records, &coords, &columns()).unwrap_err();
        assert!(matches!(err, SchemaError::MissingColumn { ref column, .. } if column == "Longitude"));
    }

    #[test]
    fn parse_number_rejects_non_numeric() {
        assert_eq!(parse_number(" -23.55 "), Some(-23.55));
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number(""), None);
    }
}
