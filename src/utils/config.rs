//! Configuration utilities

use crate::charts::Palette;
use crate::data::DEFAULT_URL_TEMPLATE;
use crate::impact::MissingPolicy;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Last day (exclusive) of the post history considered by the aligner
pub fn default_cutoff_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 12, 28).expect("valid calendar date")
}

/// The two spellings matched by the keyword filter
pub fn default_keywords() -> Vec<String> {
    vec!["doge".to_string(), "Doge".to_string()]
}

/// Settings for one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Days averaged after each post (must be at least 1)
    pub window_days: u32,
    /// Posts dated on or after this day are ignored
    pub cutoff_date: NaiveDate,
    /// Case-sensitive substrings that mark a post as on-topic
    pub keywords: Vec<String>,
    /// Analyse posts that do not mention the keywords instead
    pub invert_filter: bool,
    /// Averaging rule when a day in the window has no price bar
    pub missing_policy: MissingPolicy,
    /// Post link template, `{id}` is replaced by the post id
    pub url_template: String,
    /// Color per asset name
    pub palette: Palette,
    /// Chart layout
    pub chart: ChartSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window_days: 1,
            cutoff_date: default_cutoff_date(),
            keywords: default_keywords(),
            invert_filter: false,
            missing_policy: MissingPolicy::default(),
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            palette: Palette::default(),
            chart: ChartSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

/// Chart layout settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSettings {
    /// First day on the x axis
    pub from: NaiveDate,
    /// Last day on the x axis
    pub to: NaiveDate,
    /// Lower bound of the standardized-price y axis
    pub y_min: f64,
    /// Upper bound of the standardized-price y axis
    pub y_max: f64,
    /// Plot width in characters
    pub width: usize,
    /// Plot height in rows
    pub height: usize,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            from: NaiveDate::from_ymd_opt(2021, 1, 1).expect("valid calendar date"),
            to: NaiveDate::from_ymd_opt(2022, 1, 1).expect("valid calendar date"),
            y_min: -2.0,
            y_max: 5.0,
            width: 72,
            height: 16,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Analysis config file formats, picked by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Json,
    Toml,
    Yaml,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|e| e.to_str()).unwrap_or("") {
            "json" => Ok(Self::Json),
            "toml" => Ok(Self::Toml),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Read an `AnalysisConfig` from a `.json`, `.toml` or `.yaml`/`.yml` file.
///
/// Keys missing from the file keep their defaults, so a file holding only
/// `window_days = 3` is valid.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AnalysisConfig, ConfigError> {
    let path = path.as_ref();
    let format = ConfigFormat::from_path(path)?;
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileError {
        path: path.to_path_buf(),
        source,
    })?;

    let parsed: Result<AnalysisConfig, String> = match format {
        ConfigFormat::Json => serde_json::from_str(&content).map_err(|e| e.to_string()),
        ConfigFormat::Toml => toml::from_str(&content).map_err(|e| e.to_string()),
        ConfigFormat::Yaml => serde_yaml::from_str(&content).map_err(|e| e.to_string()),
    };

    parsed.map_err(|message| ConfigError::ParseError {
        path: path.to_path_buf(),
        message,
    })
}

/// Write an `AnalysisConfig` in the format named by the file extension
pub fn save_config<P: AsRef<Path>>(config: &AnalysisConfig, path: P) -> Result<(), ConfigError> {
    let path = path.as_ref();

    let content = match ConfigFormat::from_path(path)? {
        ConfigFormat::Json => serde_json::to_string_pretty(config).map_err(|e| e.to_string()),
        ConfigFormat::Toml => toml::to_string_pretty(config).map_err(|e| e.to_string()),
        ConfigFormat::Yaml => serde_yaml::to_string(config).map_err(|e| e.to_string()),
    }
    .map_err(ConfigError::SerializeError)?;

    std::fs::write(path, content).map_err(|source| ConfigError::FileError {
        path: path.to_path_buf(),
        source,
    })
}

/// Failure to read or write an analysis config file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot access config file {path:?}: {source}")]
    FileError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid analysis config in {path:?}: {message}")]
    ParseError { path: PathBuf, message: String },
    #[error("cannot serialize analysis config: {0}")]
    SerializeError(String),
    /// Extension other than json, toml, yaml or yml
    #[error("unsupported config extension {0:?} (expected json, toml, yaml or yml)")]
    UnsupportedFormat(String),
}
