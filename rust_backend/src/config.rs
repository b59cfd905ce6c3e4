//! Dashboard configuration file support.
//!
//! Reads `dashboard.toml`. Every section and key is optional; a missing file
//! section falls back to the built-in defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::core::domain::{AgeRange, BucketSpan, DateField, PartitionError};
use crate::parsing::DateNormalizer;
use crate::services::trends::TimeBucketAggregator;
use crate::time::DateStyle;

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("No dashboard.toml found in standard locations")]
    NotFound,
}

impl From<PartitionError> for ConfigError {
    fn from(e: PartitionError) -> Self {
        ConfigError::Invalid(format!("ageing.ranges: {}", e))
    }
}

/// Dashboard configuration from file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub dates: DateSettings,
    #[serde(default)]
    pub trends: TrendSettings,
    #[serde(default)]
    pub ageing: AgeingSettings,
    #[serde(default)]
    pub fields: FieldSettings,
}

/// Date parsing and display settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateSettings {
    /// Placeholder tokens on top of the built-in list.
    #[serde(default)]
    pub extra_placeholders: Vec<String>,
    #[serde(default = "default_display_style")]
    pub display_style: DateStyle,
}

/// Inventory trend and schedule horizon settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSettings {
    #[serde(default = "default_window_weeks")]
    pub window_weeks: usize,
    #[serde(default)]
    pub span: BucketSpan,
    #[serde(default = "default_schedule_months")]
    pub schedule_months: usize,
}

/// Stock ageing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeingSettings {
    #[serde(default = "AgeRange::default_ranges")]
    pub ranges: Vec<AgeRange>,
    #[serde(default = "default_oldest_limit")]
    pub oldest_limit: usize,
}

/// Which row keys carry each logical date, and the category column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSettings {
    #[serde(default = "default_received")]
    pub received: DateField,
    #[serde(default = "default_handover")]
    pub handover: DateField,
    #[serde(default = "default_signed_order")]
    pub signed_order: DateField,
    #[serde(default = "default_production")]
    pub production: DateField,
    #[serde(default = "default_category_key")]
    pub category: String,
}

fn default_display_style() -> DateStyle {
    DateStyle::DayFirst
}

fn default_window_weeks() -> usize {
    12
}

fn default_schedule_months() -> usize {
    6
}

fn default_oldest_limit() -> usize {
    5
}

fn default_received() -> DateField {
    DateField::RECEIVED_AT.into()
}

fn default_handover() -> DateField {
    DateField::HANDOVER_AT.into()
}

fn default_signed_order() -> DateField {
    DateField::SIGNED_ORDER_RECEIVED.into()
}

fn default_production() -> DateField {
    DateField::PRODUCTION_DATE.into()
}

fn default_category_key() -> String {
    "type".to_string()
}

impl Default for DateSettings {
    fn default() -> Self {
        Self {
            extra_placeholders: Vec::new(),
            display_style: default_display_style(),
        }
    }
}

impl Default for TrendSettings {
    fn default() -> Self {
        Self {
            window_weeks: default_window_weeks(),
            span: BucketSpan::default(),
            schedule_months: default_schedule_months(),
        }
    }
}

impl Default for AgeingSettings {
    fn default() -> Self {
        Self {
            ranges: AgeRange::default_ranges(),
            oldest_limit: default_oldest_limit(),
        }
    }
}

impl Default for FieldSettings {
    fn default() -> Self {
        Self {
            received: default_received(),
            handover: default_handover(),
            signed_order: default_signed_order(),
            production: default_production(),
            category: default_category_key(),
        }
    }
}

impl DashboardConfig {
    /// Load configuration from a TOML file and validate it.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(DashboardConfig)` if successful
    /// * `Err(ConfigError)` if the file cannot be read, parsed or is invalid
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        log::debug!("Loaded dashboard config from {}", path.display());
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: DashboardConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `dashboard.toml` in:
    /// 1. Current directory
    /// 2. `rust_backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> Result<Self, ConfigError> {
        let search_paths = [
            PathBuf::from("dashboard.toml"),
            PathBuf::from("rust_backend/dashboard.toml"),
            PathBuf::from("../dashboard.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(ConfigError::NotFound)
    }

    /// Default-location config, or built-in defaults when none is found.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        match Self::from_default_location() {
            Err(ConfigError::NotFound) => {
                log::warn!("No dashboard.toml found, using built-in defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trends.window_weeks == 0 {
            return Err(ConfigError::Invalid(
                "trends.window_weeks must be greater than zero".to_string(),
            ));
        }
        if self.fields.received.keys().next().is_none() {
            return Err(ConfigError::Invalid(
                "fields.received needs at least one key".to_string(),
            ));
        }
        AgeRange::validate_partition(&self.ageing.ranges)?;
        Ok(())
    }

    /// Normalizer with the configured placeholder tokens.
    pub fn normalizer(&self) -> DateNormalizer {
        DateNormalizer::new().with_placeholders(self.dates.extra_placeholders.iter())
    }

    /// Aggregator using [`Self::normalizer`].
    pub fn aggregator(&self) -> TimeBucketAggregator {
        TimeBucketAggregator::with_normalizer(self.normalizer())
    }
}

impl FromStr for DashboardConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_toml_str(s)
    }
}
