//! Error types shared by the loaders, the aligner and the chart renderers

use thiserror::Error;

/// Errors that can occur while loading data or running an analysis
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unparseable timestamp: {0:?}")]
    Timestamp(String),

    #[error("Window must span at least one day, got {0}")]
    InvalidWindow(u32),

    #[error("No palette color for asset: {0}")]
    UnknownAsset(String),
}

/// Result type alias for analysis operations
pub type Result<T> = std::result::Result<T, AnalysisError>;
