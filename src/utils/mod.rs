//! Helper modules

pub mod config;

pub use config::{load_config, save_config, AnalysisConfig, ChartSettings, ConfigError, LoggingSettings};
