//! Error types for the recibo-core library.
//!
//! Field extraction itself never fails: a field that cannot be recovered is
//! reported through a sentinel value and the record's validation report.
//! These errors only come from configuration handling.

use thiserror::Error;

/// Main error type for the recibo library.
#[derive(Error, Debug)]
pub enum ReciboError {
    /// Configuration values are out of range or inconsistent.
    #[error("configuration error: {0}")]
    Config(String),

    /// A pattern built from configuration tables failed to compile.
    #[error("pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// Configuration file could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the recibo library.
pub type Result<T> = std::result::Result<T, ReciboError>;
