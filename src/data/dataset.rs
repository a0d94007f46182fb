//! Loaded Dataset
//! Runs Loader -> Joiner -> Sanitizer once and keeps the results for filtering.

use super::filter::{FilterSelection, FilteredView};
use super::joiner;
use super::loader::{DataLoader, RawTables};
use super::model::{Category, Dimension, GeoRecord, JoinedRecord};
use super::provider::DataProvider;
use super::sanitizer::{self, DataQualityWarning};
use super::schema::{self, SchemaError};
use crate::config::ColumnConfig;
use crate::error::DashboardError;
use chrono::{DateTime, Local};
use std::collections::BTreeSet;
use tracing::info;

/// Canonical, immutable data for one session.
#[derive(Debug, Clone)]
pub struct Dataset {
    joined: Vec<JoinedRecord>,
    geo: Vec<GeoRecord>,
    data_quality: Vec<DataQualityWarning>,
    source_columns: Vec<String>,
    extra_columns: Vec<String>,
    loaded_at: DateTime<Local>,
}

impl Dataset {
    /// Fetch both sheets and build the dataset.
    pub fn load(provider: &dyn DataProvider, columns: &ColumnConfig) -> Result<Self, DashboardError> {
        let tables = DataLoader::load(provider)?;
        Ok(Self::from_tables(&tables, columns)?)
    }

    /// Build from already fetched sheets. Column checks on both sheets run
    /// before any row is converted.
    pub fn from_tables(tables: &RawTables, columns: &ColumnConfig) -> Result<Self, SchemaError> {
        schema::validate(&tables.records, &tables.coordinates, columns)?;

        let record_table = schema::records_from_frame(&tables.records, columns)?;
        let coordinates = schema::coordinates_from_frame(&tables.coordinates, columns)?;

        let joined = joiner::join(record_table.records, &coordinates);
        let report = sanitizer::sanitize(&joined);

        info!(
            records = joined.len(),
            geo_valid = report.geo_valid.len(),
            "dataset ready"
        );

        Ok(Self {
            joined,
            geo: report.geo_valid,
            data_quality: report.rejected,
            source_columns: record_table.source_columns,
            extra_columns: record_table.extra_columns,
            loaded_at: Local::now(),
        })
    }

    /// Every record, coordinates attached where a lookup row matched.
    pub fn joined(&self) -> &[JoinedRecord] {
        &self.joined
    }

    /// Records with a repaired, in-range position.
    pub fn geo(&self) -> &[GeoRecord] {
        &self.geo
    }

    pub fn data_quality(&self) -> &[DataQualityWarning] {
        &self.data_quality
    }

    /// Load-time warnings for the rows the selection keeps.
    pub fn data_quality_for<'a>(
        &'a self,
        selection: &'a FilterSelection,
    ) -> impl Iterator<Item = &'a DataQualityWarning> + 'a {
        self.data_quality.iter().filter(move |warning| {
            self.joined
                .get(warning.row)
                .is_some_and(|row| selection.matches(&row.record))
        })
    }

    pub fn source_columns(&self) -> &[String] {
        &self.source_columns
    }

    pub fn extra_columns(&self) -> &[String] {
        &self.extra_columns
    }

    pub fn loaded_at(&self) -> DateTime<Local> {
        self.loaded_at
    }

    /// Sorted distinct non-blank values of a column, for the sidebar.
    pub fn options(&self, dimension: Dimension) -> Vec<Category> {
        let distinct: BTreeSet<&Category> = self
            .joined
            .iter()
            .map(|row| row.record.category(dimension))
            .filter(|category| !category.is_blank())
            .collect();
        distinct.into_iter().cloned().collect()
    }

    pub fn filter(&self, selection: &FilterSelection) -> FilteredView<'_, JoinedRecord> {
        selection.apply(&self.joined)
    }

    pub fn filter_geo(&self, selection: &FilterSelection) -> FilteredView<'_, GeoRecord> {
        selection.apply(&self.geo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use super::Dimension;

    fn tables() -> RawTables {
        RawTables {
            records: df!(
                "Cidade" => &["Campinas", "campinas ", "Natal", "Atlantida"],
                "Estado" => &["SP", "sp", "RN", "XX"],
                "Tipo" => &["EAD", "EAD", "Presencial", "EAD"],
                "Situacao do contrato" => &["VIGENTE", "CANCELADO", "TRANCADO", "VIGENTE"],
                "Curso" => &["Direito", "Direito", "Pedagogia", "Direito"]
            )
            .unwrap(),
            coordinates: df!(
                "Chave" => &["CAMPINAS - SP", "NATAL - RN"],
                "Latitude" => &["-229056000", "-5.79"],
                "Longitude" => &["-470608000", "-35.21"]
            )
            .unwrap(),
        }
    }

    #[test]
    fn geo_subset_is_separate_from_joined_set() {
        let dataset = Dataset::from_tables(&tables(), &ColumnConfig::default()).unwrap();
        assert_eq!(dataset.joined().len(), 4);
        assert_eq!(dataset.geo().len(), 3);
        assert_eq!(dataset.data_quality().len(), 1);
        assert_eq!(dataset.data_quality()[0].join_key, "ATLANTIDA - XX");
    }

    #[test]
    fn data_quality_follows_the_selection() {
        let dataset = Dataset::from_tables(&tables(), &ColumnConfig::default()).unwrap();
        assert_eq!(dataset.data_quality()[0].row, 3);

        let all = FilterSelection::new();
        assert_eq!(dataset.data_quality_for(&all).count(), 1);

        let atlantida = FilterSelection::new().with(Dimension::State, ["XX"]);
        let keys: Vec<&str> = dataset
            .data_quality_for(&atlantida)
            .map(|w| w.join_key.as_str())
            .collect();
        assert_eq!(keys, vec!["ATLANTIDA - XX"]);

        let sao_paulo = FilterSelection::new().with(Dimension::State, ["SP"]);
        assert_eq!(dataset.data_quality_for(&sao_paulo).count(), 0);
    }

    #[test]
    fn options_are_distinct_and_sorted() {
        let dataset = Dataset::from_tables(&tables(), &ColumnConfig::default()).unwrap();
        let cities: Vec<String> = dataset
            .options(Dimension::City)
            .iter()
            .map(|c| c.label().to_string())
            .collect();
        assert_eq!(cities, vec!["Atlantida", "Campinas", "Natal"]);
    }

    #[test]
    fn schema_error_stops_the_build() {
        let mut raw = tables();
        raw.coordinates = df!("Chave" => &["X"], "Lat" => &["1"], "Longitude" => &["2"]).unwrap();
        let err = Dataset::from_tables(&raw, &ColumnConfig::default()).unwrap_err();
        assert!(matches!(err, SchemaError::MissingColumn { table: "coordinates", .. }));
    }
}
