//! Coordinate Sanitizer
//! Repairs coordinates exported without their decimal point and keeps only
//! rows whose position ends up in range.
//!
//! The upstream export sometimes writes a coordinate such as `-23.55` as the
//! integer `-235500000`, i.e. scaled by 10^7. Values outside the valid range
//! are divided back once; values already in range are never touched.

use super::model::{GeoPoint, GeoRecord, JoinedRecord, LATITUDE_LIMIT, LONGITUDE_LIMIT};
use tracing::{debug, warn};

/// Scale applied by the defective export.
pub const DECIMAL_SHIFT: f64 = 10_000_000.0;

/// Why a joined record has no usable position.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordinateIssue {
    /// No coordinate row matched, or a cell was empty or not numeric.
    Missing,
    /// Still outside the valid range after repair.
    OutOfRange { latitude: f64, longitude: f64 },
}

/// A row excluded from geographic views.
#[derive(Debug, Clone, PartialEq)]
pub struct DataQualityWarning {
    /// Position of the row in the joined set.
    pub row: usize,
    pub join_key: String,
    pub issue: CoordinateIssue,
}

/// Output of a sanitization pass.
#[derive(Debug, Clone, Default)]
pub struct SanitizeReport {
    pub geo_valid: Vec<GeoRecord>,
    pub rejected: Vec<DataQualityWarning>,
}

pub fn repair_latitude(latitude: f64) -> f64 {
    repair(latitude, LATITUDE_LIMIT)
}

pub fn repair_longitude(longitude: f64) -> f64 {
    repair(longitude, LONGITUDE_LIMIT)
}

fn repair(value: f64, limit: f64) -> f64 {
    if value.abs() > limit {
        value / DECIMAL_SHIFT
    } else {
        value
    }
}

/// Repair and validate the position of one joined record.
pub fn sanitize_position(
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<GeoPoint, CoordinateIssue> {
    let (Some(latitude), Some(longitude)) = (latitude, longitude) else {
        return Err(CoordinateIssue::Missing);
    };
    if !latitude.is_finite() || !longitude.is_finite() {
        return Err(CoordinateIssue::Missing);
    }

    let latitude = repair_latitude(latitude);
    let longitude = repair_longitude(longitude);
    GeoPoint::new(latitude, longitude).ok_or(CoordinateIssue::OutOfRange {
        latitude,
        longitude,
    })
}

/// Build the geo-valid subset. Input order is preserved.
pub fn sanitize(joined: &[JoinedRecord]) -> SanitizeReport {
    let mut report = SanitizeReport::default();

    for (index, row) in joined.iter().enumerate() {
        match sanitize_position(row.latitude, row.longitude) {
            Ok(point) => report.geo_valid.push(GeoRecord {
                record: row.record.clone(),
                point,
            }),
            Err(issue) => {
                debug!(key = %row.record.join_key, ?issue, "row excluded from map");
                report.rejected.push(DataQualityWarning {
                    row: index,
                    join_key: row.record.join_key.to_string(),
                    issue,
                });
            }
        }
    }

    if !report.rejected.is_empty() {
        warn!(
            rejected = report.rejected.len(),
            kept = report.geo_valid.len(),
            "rows without usable coordinates excluded from map views"
        );
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Category, Record};

    fn joined(latitude: Option<f64>, longitude: Option<f64>) -> JoinedRecord {
        JoinedRecord {
            record: Record::new(
                Category::new("Sao Paulo"),
                Category::new("SP"),
                Category::new("EAD"),
                Category::new("VIGENTE"),
                Category::new("Direito"),
            ),
            latitude,
            longitude,
        }
    }

    #[test]
    fn repairs_missing_decimal_point() {
        let point = sanitize_position(Some(-235500000.0), Some(-463633000.0)).unwrap();
        assert!((point.latitude() - -23.55).abs() < 1e-12);
        assert!((point.longitude() - -46.3633).abs() < 1e-12);
    }

    #[test]
    fn repair_is_idempotent_on_valid_values() {
        assert_eq!(repair_latitude(-23.55), -23.55);
        assert_eq!(repair_latitude(repair_latitude(-23.55)), -23.55);
        assert_eq!(repair_longitude(repair_longitude(-46.6333)), -46.6333);

        let once = repair_latitude(-235500000.0);
        assert_eq!(repair_latitude(once), once);
    }

    #[test]
    fn boundary_values_are_not_shifted() {
        assert_eq!(repair_latitude(90.0), 90.0);
        assert_eq!(repair_longitude(-180.0), -180.0);
    }

    #[test]
    fn out_of_range_after_repair_is_rejected() {
        // 100 / 10^7 is in range, so build a latitude that stays out of range.
        let issue = sanitize_position(Some(9.5e9), Some(50.0)).unwrap_err();
        assert!(matches!(issue, CoordinateIssue::OutOfRange { .. }));
    }

    #[test]
    fn missing_values_are_rejected_not_errors() {
        let report = sanitize(&[
            joined(None, None),
            joined(Some(-23.55), None),
            joined(Some(-23.55), Some(-46.63)),
        ]);
        assert_eq!(report.geo_valid.len(), 1);
        assert_eq!(report.rejected.len(), 2);
        assert!(report
            .rejected
            .iter()
            .all(|w| w.issue == CoordinateIssue::Missing && w.join_key == "SAO PAULO - SP"));
        let rows: Vec<usize> = report.rejected.iter().map(|w| w.row).collect();
        assert_eq!(rows, vec![0, 1]);
    }
}
