//! Application configuration, read from a TOML file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub columns: ColumnConfig,
    pub cache: CacheConfig,
    pub kpi: KpiConfig,
    pub ui: UiConfig,
    /// Username -> credentials accepted by the sign-in screen.
    pub credentials: BTreeMap<String, UserCredentials>,
}

/// Where the two sheets are read from.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SourceConfig {
    pub directory: PathBuf,
    pub records_sheet: String,
    pub coordinates_sheet: String,
    pub delimiter: char,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("data"),
            records_sheet: "basededados".to_string(),
            coordinates_sheet: "coordenadas".to_string(),
            delimiter: ',',
        }
    }
}

impl SourceConfig {
    /// Delimiter as a CSV byte; non-ASCII characters fall back to a comma.
    pub fn delimiter_byte(&self) -> u8 {
        if self.delimiter.is_ascii() {
            self.delimiter as u8
        } else {
            b','
        }
    }
}

/// Sheet header names.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ColumnConfig {
    pub city: String,
    pub state: String,
    pub kind: String,
    pub contract_status: String,
    pub course: String,
    pub key: String,
    pub latitude: String,
    pub longitude: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            city: "Cidade".to_string(),
            state: "Estado".to_string(),
            kind: "Tipo".to_string(),
            contract_status: "Situacao do contrato".to_string(),
            course: "Curso".to_string(),
            key: "Chave".to_string(),
            latitude: "Latitude".to_string(),
            longitude: "Longitude".to_string(),
        }
    }
}

impl ColumnConfig {
    /// Columns the enrollment sheet must have.
    pub fn record_columns(&self) -> Vec<&str> {
        vec![
            self.city.as_str(),
            self.state.as_str(),
            self.kind.as_str(),
            self.contract_status.as_str(),
            self.course.as_str(),
        ]
    }

    /// Columns the coordinate sheet must have.
    pub fn coordinate_columns(&self) -> Vec<&str> {
        vec![
            self.key.as_str(),
            self.latitude.as_str(),
            self.longitude.as_str(),
        ]
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 600 }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct KpiConfig {
    /// Contract statuses that count as an active student (case-insensitive).
    pub active_statuses: Vec<String>,
}

impl Default for KpiConfig {
    fn default() -> Self {
        Self {
            active_statuses: vec!["VIGENTE".to_string(), "TRANCADO".to_string()],
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct UiConfig {
    pub title: String,
    pub logo: Option<PathBuf>,
    /// Free text shown as "Data extracted on ...".
    pub extracted_on: Option<String>,
    pub footer: Option<String>,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            title: "Student Dashboard".to_string(),
            logo: None,
            extracted_on: None,
            footer: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct UserCredentials {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    /// bcrypt hash of the password (`$2b$...`).
    pub password_hash: String,
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AppConfig =
            toml::from_str(content).with_context(|| "Failed to parse TOML configuration")?;
        Ok(config)
    }

    /// Read `path` if it exists, otherwise run on defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            info!(?path, "loading configuration");
            Self::load_from_file(path)
        } else {
            warn!(?path, "configuration file not found, using defaults");
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_sheet_layout() {
        let config = AppConfig::default();
        assert_eq!(config.source.records_sheet, "basededados");
        assert_eq!(config.columns.contract_status, "Situacao do contrato");
        assert_eq!(config.cache.ttl(), Duration::from_secs(600));
        assert_eq!(config.kpi.active_statuses, vec!["VIGENTE", "TRANCADO"]);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [source]
            directory = "/srv/sheets"
            delimiter = ";"

            [cache]
            ttl_secs = 30

            [credentials.ana]
            name = "Ana"
            password_hash = "$2b$04$Q9fj3Xc1pK7mZr2Tn8bLweFmMrAJjbuZLB4QbE29e0tY2j12uXdaO"
            "#,
        )
        .unwrap();

        assert_eq!(config.source.directory, PathBuf::from("/srv/sheets"));
        assert_eq!(config.source.delimiter_byte(), b';');
        assert_eq!(config.source.coordinates_sheet, "coordenadas");
        assert_eq!(config.cache.ttl_secs, 30);
        assert_eq!(config.columns.city, "Cidade");
        assert_eq!(config.credentials["ana"].name, "Ana");
        assert!(config.credentials["ana"].password_hash.starts_with("$2b$04$"));
        assert!(config.credentials["ana"].email.is_none());
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(AppConfig::from_toml("[cache]\nttl_secs = \"soon\"").is_err());
    }
}
