//! Error types for rusty_stock_analytics
//!
//! The analytical stages themselves never fail: insufficient history and
//! indeterminate ratios surface as undefined values. These errors belong to the
//! data boundary (validation, CSV/JSON parsing) and to configuration.

use thiserror::Error;

/// Main error type for rusty_stock_analytics
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

/// Result type alias for rusty_stock_analytics operations
pub type Result<T> = std::result::Result<T, AnalysisError>;
