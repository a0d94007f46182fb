//! Enrollment Data Model
//! Typed rows produced once at ingestion and shared read-only by the rest of the pipeline.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Valid latitude range in degrees.
pub const LATITUDE_LIMIT: f64 = 90.0;
/// Valid longitude range in degrees.
pub const LONGITUDE_LIMIT: f64 = 180.0;

/// A categorical cell value.
///
/// `label` is the trimmed source text shown to users. `key` is the trimmed,
/// uppercased form used for equality, hashing, ordering and filtering, so
/// `" sp"` and `"SP"` are the same category.
#[derive(Debug, Clone, Default)]
pub struct Category {
    label: String,
    key: String,
}

impl Category {
    pub fn new(raw: &str) -> Self {
        let label = raw.trim().to_string();
        let key = label.to_uppercase();
        Self { label, key }
    }

    /// Build from an optional cell; a missing cell becomes the blank category.
    pub fn from_cell(raw: Option<&str>) -> Self {
        raw.map(Self::new).unwrap_or_default()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_blank(&self) -> bool {
        self.key.is_empty()
    }
}

impl PartialEq for Category {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Category {}

impl Hash for Category {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for Category {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Category {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Normalized "CITY - STATE" identifier shared by records and coordinate entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JoinKey(String);

impl JoinKey {
    /// Key for an enrollment row: `upper(trim(city)) + " - " + upper(trim(state))`.
    pub fn from_city_state(city: &str, state: &str) -> Self {
        Self(format!(
            "{} - {}",
            city.trim().to_uppercase(),
            state.trim().to_uppercase()
        ))
    }

    /// Key for a coordinate lookup row, which already holds the composite text.
    pub fn from_raw(raw: &str) -> Self {
        Self(raw.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JoinKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Filterable / groupable record columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dimension {
    State,
    City,
    Type,
    ContractStatus,
    Course,
}

impl Dimension {
    /// Sidebar order.
    pub const ALL: [Dimension; 5] = [
        Dimension::State,
        Dimension::City,
        Dimension::Type,
        Dimension::ContractStatus,
        Dimension::Course,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Dimension::State => "State",
            Dimension::City => "City",
            Dimension::Type => "Type",
            Dimension::ContractStatus => "Contract Status",
            Dimension::Course => "Course",
        }
    }
}

/// One enrollment row.
#[derive(Debug, Clone)]
pub struct Record {
    pub city: Category,
    pub state: Category,
    pub kind: Category,
    pub contract_status: Category,
    pub course: Category,
    pub join_key: JoinKey,
    /// Remaining source columns, aligned with `RecordTable::extra_columns`.
    pub extras: Vec<Option<String>>,
}

impl Record {
    pub fn new(
        city: Category,
        state: Category,
        kind: Category,
        contract_status: Category,
        course: Category,
    ) -> Self {
        let join_key = JoinKey::from_city_state(city.label(), state.label());
        Self {
            city,
            state,
            kind,
            contract_status,
            course,
            join_key,
            extras: Vec::new(),
        }
    }

    pub fn with_extras(mut self, extras: Vec<Option<String>>) -> Self {
        self.extras = extras;
        self
    }

    pub fn category(&self, dimension: Dimension) -> &Category {
        match dimension {
            Dimension::State => &self.state,
            Dimension::City => &self.city,
            Dimension::Type => &self.kind,
            Dimension::ContractStatus => &self.contract_status,
            Dimension::Course => &self.course,
        }
    }
}

impl AsRef<Record> for Record {
    fn as_ref(&self) -> &Record {
        self
    }
}

/// Records plus the names of the extra source columns they carry.
#[derive(Debug, Clone, Default)]
pub struct RecordTable {
    pub records: Vec<Record>,
    /// Sheet header order, lookup columns excluded.
    pub source_columns: Vec<String>,
    pub extra_columns: Vec<String>,
}

/// One row of the coordinate lookup sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateEntry {
    pub join_key: JoinKey,
    /// `None` when the cell was empty or not numeric.
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl CoordinateEntry {
    pub fn new(raw_key: &str, latitude: Option<f64>, longitude: Option<f64>) -> Self {
        Self {
            join_key: JoinKey::from_raw(raw_key),
            latitude,
            longitude,
        }
    }
}

/// A record with the coordinates of its matching lookup row, if any.
#[derive(Debug, Clone)]
pub struct JoinedRecord {
    pub record: Record,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl AsRef<Record> for JoinedRecord {
    fn as_ref(&self) -> &Record {
        &self.record
    }
}

/// A latitude/longitude pair that is known to be in range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    /// Returns `None` unless both values are finite and inside the valid ranges.
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let lat_ok = latitude.is_finite() && latitude.abs() <= LATITUDE_LIMIT;
        let lon_ok = longitude.is_finite() && longitude.abs() <= LONGITUDE_LIMIT;
        (lat_ok && lon_ok).then_some(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// A joined record that survived coordinate sanitization.
#[derive(Debug, Clone)]
pub struct GeoRecord {
    pub record: Record,
    pub point: GeoPoint,
}

impl AsRef<Record> for GeoRecord {
    fn as_ref(&self) -> &Record {
        &self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_key_normalization_is_deterministic() {
        assert_eq!(
            JoinKey::from_city_state("  sao paulo ", "sp"),
            JoinKey::from_city_state("SAO PAULO", "SP")
        );
        assert_eq!(
            JoinKey::from_city_state("Campinas", "SP").as_str(),
            "CAMPINAS - SP"
        );
        assert_eq!(JoinKey::from_raw(" campinas - sp "), JoinKey::from_raw("CAMPINAS - SP"));
    }

    #[test]
    fn category_compares_on_folded_key_but_keeps_label() {
        let a = Category::new("  Vigente ");
        let b = Category::new("VIGENTE");
        assert_eq!(a, b);
        assert_eq!(a.label(), "Vigente");
        assert_eq!(a.key(), "VIGENTE");
        assert!(Category::from_cell(None).is_blank());
        assert!(Category::new("   ").is_blank());
    }

    #[test]
    fn geo_point_rejects_out_of_range() {
        assert!(GeoPoint::new(-23.55, -46.63).is_some());
        assert!(GeoPoint::new(90.0, 180.0).is_some());
        assert!(GeoPoint::new(100.0, 50.0).is_none());
        assert!(GeoPoint::new(10.0, -180.5).is_none());
        assert!(GeoPoint::new(f64::NAN, 0.0).is_none());
    }
}
