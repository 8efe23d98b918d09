//! Run configuration, loaded once from TOML and passed by reference.
//!
//! Every field has a default, so an empty file (or no file) yields the stock
//! generation model: 90 days, 20% multiplicative noise, weekend factor 0.85,
//! holiday-season uplift in Nov/Dec and a summer dip in Jul/Aug.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub generation: GenerationConfig,
    pub output: OutputConfig,
    pub storage: StorageConfig,
    pub catalog: CatalogConfig,
}

impl AppConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Reject values the synthesizer, writer or publisher cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.generation.validate()?;
        self.storage.validate()?;
        self.catalog.validate()
    }
}

/// Longest series a run may request (about a century of days).
pub const MAX_DAYS: u32 = 36_600;

/// Knobs for the daily metric model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Number of consecutive days ending today.
    pub days: u32,
    /// Standard deviation of the multiplicative Gaussian noise on gross.
    pub noise_std: f64,
    /// Multiplier applied on Saturdays and Sundays.
    pub weekend_factor: f64,
    /// Per-month overrides; months not listed use 1.0.
    pub seasonal: Vec<SeasonalFactor>,
    pub cost_ratios: CostRatios,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            days: 90,
            noise_std: 0.2,
            weekend_factor: 0.85,
            seasonal: vec![
                SeasonalFactor::new(11, 1.6),
                SeasonalFactor::new(12, 1.4),
                SeasonalFactor::new(1, 0.9),
                SeasonalFactor::new(7, 0.85),
                SeasonalFactor::new(8, 0.85),
            ],
            cost_ratios: CostRatios::default(),
        }
    }
}

impl GenerationConfig {
    /// Seasonal multiplier for a calendar month (1 = January).
    pub fn seasonal_factor(&self, month: u32) -> f64 {
        self.seasonal
            .iter()
            .find(|s| s.month == month)
            .map(|s| s.factor)
            .unwrap_or(1.0)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_days(self.days)?;
        if !(self.noise_std >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "generation.noise_std must be >= 0, got {}",
                self.noise_std
            )));
        }
        if !(self.weekend_factor > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "generation.weekend_factor must be > 0, got {}",
                self.weekend_factor
            )));
        }
        for s in &self.seasonal {
            if !(1..=12).contains(&s.month) {
                return Err(ConfigError::Invalid(format!(
                    "seasonal month {} is outside 1..=12",
                    s.month
                )));
            }
            if !(s.factor > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "seasonal factor for month {} must be > 0",
                    s.month
                )));
            }
        }
        self.cost_ratios.validate()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeasonalFactor {
    pub month: u32,
    pub factor: f64,
}

impl SeasonalFactor {
    pub fn new(month: u32, factor: f64) -> Self {
        Self { month, factor }
    }
}

/// Closed range a cost ratio is drawn from, as a fraction of gross.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioRange {
    pub low: f64,
    pub high: f64,
}

impl RatioRange {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostRatios {
    pub product: RatioRange,
    pub marketing: RatioRange,
    pub fulfillment: RatioRange,
    pub processing: RatioRange,
    pub other: RatioRange,
}

impl Default for CostRatios {
    fn default() -> Self {
        Self {
            product: RatioRange::new(0.35, 0.45),
            marketing: RatioRange::new(0.15, 0.25),
            fulfillment: RatioRange::new(0.08, 0.12),
            processing: RatioRange::new(0.025, 0.035),
            other: RatioRange::new(0.0, 0.03),
        }
    }
}

impl CostRatios {
    fn named(&self) -> [(&'static str, RatioRange); 5] {
        [
            ("product", self.product),
            ("marketing", self.marketing),
            ("fulfillment", self.fulfillment),
            ("processing", self.processing),
            ("other", self.other),
        ]
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, range) in self.named() {
            if !(range.low >= 0.0) || !(range.low <= range.high) {
                return Err(ConfigError::Invalid(format!(
                    "cost_ratios.{name}: need 0 <= low <= high, got [{}, {}]",
                    range.low, range.high
                )));
            }
        }
        Ok(())
    }
}

/// Local outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root of the Hive-partitioned Parquet tree.
    pub local_root: PathBuf,
    /// Flat CSV dump of the whole dataset; `None` disables it.
    pub csv_path: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            local_root: PathBuf::from("daily_metrics/parquet"),
            csv_path: Some(PathBuf::from("daily_metrics/daily_metrics.csv")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    S3,
    /// Mirror uploads into a local directory instead of a bucket.
    Local,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub bucket: String,
    pub prefix: String,
    pub region: String,
    /// Custom S3-compatible endpoint (MinIO, LocalStack).
    pub endpoint: Option<String>,
    /// Target directory when `backend = "local"`.
    pub local_mirror: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::S3,
            bucket: String::new(),
            prefix: "daily_metrics".into(),
            region: "us-east-1".into(),
            endpoint: None,
            local_mirror: PathBuf::from("daily_metrics/mirror"),
        }
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend == StorageBackend::S3 && self.bucket.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "storage.bucket is required for the s3 backend".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub database: String,
    pub table: String,
    pub workgroup: String,
    /// Where the query engine writes result files, e.g. `s3://bucket/athena-results/`.
    pub output_location: String,
    pub region: String,
    pub endpoint: Option<String>,
    pub poll_interval_ms: u64,
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            database: String::new(),
            table: "daily_metrics".into(),
            workgroup: "primary".into(),
            output_location: String::new(),
            region: "us-east-1".into(),
            endpoint: None,
            poll_interval_ms: 1000,
            timeout_secs: 120,
        }
    }
}

impl CatalogConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("catalog.database", &self.database),
            ("catalog.workgroup", &self.workgroup),
            ("catalog.output_location", &self.output_location),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{name} is required")));
            }
        }
        if !is_plain_identifier(&self.table) {
            return Err(ConfigError::Invalid(format!(
                "catalog.table must match [A-Za-z0-9_]+, got {:?}",
                self.table
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("catalog.poll_interval_ms must be > 0".into()));
        }
        Ok(())
    }
}

/// Accept a day count in `1..=MAX_DAYS`.
pub fn check_days(days: u32) -> Result<(), ConfigError> {
    if days == 0 {
        return Err(ConfigError::Invalid("generation.days must be at least 1".into()));
    }
    if days > MAX_DAYS {
        return Err(ConfigError::Invalid(format!(
            "generation.days must be at most {MAX_DAYS}, got {days}"
        )));
    }
    Ok(())
}

fn is_plain_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
[generation]
days = 30
noise_std = 0.1
weekend_factor = 0.8
seasonal = [{ month = 12, factor = 2.0 }]

[generation.cost_ratios]
product = { low = 0.3, high = 0.4 }

[output]
local_root = "out/parquet"

[storage]
bucket = "analytics-dev"
prefix = "/daily_metrics/"

[catalog]
database = "analytics"
workgroup = "dev"
output_location = "s3://analytics-dev/athena-results/"
timeout_secs = 30
"#;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = AppConfig::from_toml("").unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.generation.days, 90);
        assert_eq!(cfg.catalog.table, "daily_metrics");
        assert_eq!(cfg.generation.seasonal_factor(11), 1.6);
        assert_eq!(cfg.generation.seasonal_factor(3), 1.0);
    }

    #[test]
    fn full_file_parses_and_validates() {
        let cfg = AppConfig::from_toml(FULL).unwrap();
        assert_eq!(cfg.generation.days, 30);
        assert_eq!(cfg.generation.seasonal_factor(12), 2.0);
        // Only the listed override replaces the stock table.
        assert_eq!(cfg.generation.seasonal_factor(11), 1.0);
        assert_eq!(cfg.generation.cost_ratios.product, RatioRange::new(0.3, 0.4));
        assert_eq!(cfg.generation.cost_ratios.marketing, RatioRange::new(0.15, 0.25));
        assert_eq!(cfg.output.local_root, PathBuf::from("out/parquet"));
        assert_eq!(cfg.catalog.timeout_secs, 30);
        assert_eq!(cfg.catalog.poll_interval_ms, 1000);
        cfg.validate().unwrap();
    }

    #[test]
    fn defaults_fail_validation_without_remote_names() {
        let err = AppConfig::default().validate().unwrap_err();
        assert!(err.to_string().contains("storage.bucket"));
    }

    #[test]
    fn inverted_ratio_range_rejected() {
        let mut cfg = AppConfig::from_toml(FULL).unwrap();
        cfg.generation.cost_ratios.other = RatioRange::new(0.2, 0.1);
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("cost_ratios.other"));
    }

    #[test]
    fn table_name_must_be_identifier() {
        let mut cfg = AppConfig::from_toml(FULL).unwrap();
        cfg.catalog.table = "daily_metrics; DROP TABLE x".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn day_count_bounds() {
        assert!(check_days(0).is_err());
        assert!(check_days(1).is_ok());
        assert!(check_days(MAX_DAYS).is_ok());
        assert!(check_days(MAX_DAYS + 1).is_err());

        let mut cfg = AppConfig::from_toml(FULL).unwrap();
        cfg.generation.days = 4_000_000_000;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("generation.days"));
    }

    #[test]
    fn bad_seasonal_month_rejected() {
        let mut cfg = AppConfig::from_toml(FULL).unwrap();
        cfg.generation.seasonal.push(SeasonalFactor::new(13, 1.0));
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn local_backend_needs_no_bucket() {
        let mut cfg = AppConfig::from_toml(FULL).unwrap();
        cfg.storage.backend = StorageBackend::Local;
        cfg.storage.bucket.clear();
        cfg.validate().unwrap();
    }

    #[test]
    fn unknown_backend_is_parse_error() {
        let err = AppConfig::from_toml("[storage]\nbackend = \"gcs\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
