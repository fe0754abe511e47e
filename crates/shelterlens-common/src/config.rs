//! Locator configuration.
//!
//! Read from `shelterlens.toml` in the current directory or from the path in
//! the `SHELTERLENS_CONFIG` env var. Every field has a default, so a partial
//! file (or none at all) still yields a usable configuration.
//!
//! ```toml
//! [reference]
//! name = "Paul's Place"
//! latitude = 39.2820504
//! longitude = -76.6328439
//!
//! [ranking]
//! threshold_miles = 10.0
//! categories_path = "config/categories.toml"
//!
//! [sources]
//! csv_path = "data/locations.csv"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShelterError};
use crate::models::{Position, ReferencePoint, PAULS_PLACE, PAULS_PLACE_NAME};

pub const CONFIG_ENV: &str = "SHELTERLENS_CONFIG";
pub const BIND_ENV: &str = "SHELTERLENS_BIND";
pub const DEFAULT_CONFIG_FILE: &str = "shelterlens.toml";

/// Baltimore City homeless shelter feature layer.
pub const DEFAULT_ARCGIS_URL: &str = "https://services1.arcgis.com/UWYHeuuJISiGmgXx/arcgis/rest/services/Homeless_Shelter/FeatureServer/0/query?where=1%3D1&outFields=*&outSR=4326&f=json";

/// Complete locator configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocatorConfig {
    #[serde(default)]
    pub reference: ReferenceConfig,

    #[serde(default)]
    pub ranking: RankingConfig,

    #[serde(default)]
    pub sources: SourcesConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

// ── Reference point ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceConfig {
    #[serde(default = "default_reference_name")]
    pub name: String,
    #[serde(default = "default_reference_latitude")]
    pub latitude: f64,
    #[serde(default = "default_reference_longitude")]
    pub longitude: f64,
}

fn default_reference_name()      -> String { PAULS_PLACE_NAME.to_string() }
fn default_reference_latitude()  -> f64    { PAULS_PLACE.latitude }
fn default_reference_longitude() -> f64    { PAULS_PLACE.longitude }

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            name: default_reference_name(),
            latitude: default_reference_latitude(),
            longitude: default_reference_longitude(),
        }
    }
}

impl ReferenceConfig {
    pub fn to_reference_point(&self) -> ReferencePoint {
        ReferencePoint {
            name: self.name.clone(),
            position: Position::new(self.latitude, self.longitude),
        }
    }
}

// ── Ranking ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Radius filter, statute miles.
    #[serde(default = "default_threshold")]
    pub threshold_miles: f64,

    /// Name → category lookup file (.toml, .yaml/.yml or .json).
    #[serde(default = "default_categories_path")]
    pub categories_path: PathBuf,
}

fn default_threshold()       -> f64     { 10.0 }
fn default_categories_path() -> PathBuf { PathBuf::from("config/categories.toml") }

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            threshold_miles: default_threshold(),
            categories_path: default_categories_path(),
        }
    }
}

// ── Sources ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "default_true")]
    pub arcgis_enabled: bool,

    #[serde(default = "default_arcgis_url")]
    pub arcgis_url: String,

    /// HTTP timeout for the remote fetch.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// How long a successful remote fetch is reused.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Optional CSV with `Location`, `Latitude`, `Longitude` columns.
    #[serde(default)]
    pub csv_path: Option<PathBuf>,

    /// Optional single hand-entered record.
    #[serde(default)]
    pub sample: Option<SampleRecordConfig>,

    /// Hosts allowed in addition to the built-in allowlist.
    #[serde(default)]
    pub allowed_hosts: Vec<String>,
}

fn default_true()           -> bool   { true }
fn default_arcgis_url()     -> String { DEFAULT_ARCGIS_URL.to_string() }
fn default_timeout_secs()   -> u64    { 30 }
fn default_cache_ttl_secs() -> u64    { 3600 }

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            arcgis_enabled: true,
            arcgis_url: default_arcgis_url(),
            timeout_secs: default_timeout_secs(),
            cache_ttl_secs: default_cache_ttl_secs(),
            csv_path: None,
            sample: None,
            allowed_hosts: vec![],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRecordConfig {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    pub category: Option<String>,
}

// ── Server ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String { "127.0.0.1:3001".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

// ── Loading ──────────────────────────────────────────────────────────────────

impl LocatorConfig {
    /// Load configuration from `shelterlens.toml`.
    /// Checks SHELTERLENS_CONFIG env var first, then current directory.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var(CONFIG_ENV)
            .unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        if !Path::new(&path).exists() {
            anyhow::bail!(
                "Config file not found: {}\n\
                 Copy shelterlens.example.toml to shelterlens.toml and edit it.",
                path
            );
        }

        Ok(Self::from_path(&path)?)
    }

    /// Like `load`, but a missing file yields the defaults with a warning.
    /// A file that exists and fails to parse or validate is still an error.
    pub fn load_or_default() -> anyhow::Result<Self> {
        let path = std::env::var(CONFIG_ENV)
            .unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        if !Path::new(&path).exists() {
            tracing::warn!(path = %path, "Config file not found, using built-in defaults");
            return Ok(Self::default());
        }
        Self::from_path(&path).map_err(|e| anyhow::anyhow!("{}: {}", path, e))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ShelterError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let t = self.ranking.threshold_miles;
        if !t.is_finite() || t <= 0.0 {
            return Err(ShelterError::Config(format!(
                "ranking.threshold_miles must be a positive number, got {t}"
            )));
        }
        let reference = self.reference.to_reference_point();
        if !reference.position.is_valid() {
            return Err(ShelterError::Config(format!(
                "reference position {} is not a valid WGS84 coordinate",
                reference.position
            )));
        }
        if let Some(ref sample) = self.sources.sample {
            if !Position::new(sample.latitude, sample.longitude).is_valid() {
                return Err(ShelterError::Config(format!(
                    "sample record '{}' has an invalid position",
                    sample.name
                )));
            }
        }
        Ok(())
    }

    /// Bind address, SHELTERLENS_BIND wins over the file.
    pub fn bind_addr(&self) -> String {
        std::env::var(BIND_ENV).unwrap_or_else(|_| self.server.bind.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = LocatorConfig::default();
        assert_eq!(config.reference.name, "Paul's Place");
        assert_eq!(config.ranking.threshold_miles, 10.0);
        assert!(config.sources.arcgis_enabled);
        assert!(config.sources.csv_path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_file_yields_defaults() {
        let config = LocatorConfig::from_toml_str("").unwrap();
        assert_eq!(config, LocatorConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = LocatorConfig::from_toml_str(
            r#"
            [ranking]
            threshold_miles = 2.5

            [sources]
            arcgis_enabled = false
            csv_path = "data/locations.csv"

            [sources.sample]
            name = "Test Site"
            latitude = 39.29
            longitude = -76.61
            "#,
        )
        .unwrap();
        assert_eq!(config.ranking.threshold_miles, 2.5);
        assert_eq!(config.ranking.categories_path, PathBuf::from("config/categories.toml"));
        assert!(!config.sources.arcgis_enabled);
        assert_eq!(config.sources.csv_path, Some(PathBuf::from("data/locations.csv")));
        assert_eq!(config.sources.timeout_secs, 30);
        assert_eq!(config.sources.sample.as_ref().map(|s| s.name.as_str()), Some("Test Site"));
        assert_eq!(config.reference, ReferenceConfig::default());
    }

    #[test]
    fn test_rejects_non_positive_threshold() {
        let err = LocatorConfig::from_toml_str("[ranking]\nthreshold_miles = 0.0\n").unwrap_err();
        assert!(matches!(err, ShelterError::Config(_)));
    }

    #[test]
    fn test_rejects_invalid_reference() {
        let err = LocatorConfig::from_toml_str("[reference]\nlatitude = 123.0\n").unwrap_err();
        assert!(err.to_string().contains("reference position"));
    }

    #[test]
    fn test_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shelterlens.toml");
        std::fs::write(&path, "[server]\nbind = \"0.0.0.0:8080\"\n").unwrap();
        let config = LocatorConfig::from_path(&path).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:8080");
    }
}
