//! Error types for the daily benefit engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate.
//! Only malformed or missing mandatory inputs (and unreadable configuration)
//! are errors; business-rule zeroing and rate lookup misses are reported
//! through the result's audit warnings instead.

use thiserror::Error;

/// The main error type for the daily benefit engine.
///
/// # Example
///
/// ```
/// use ij_engine::error::EngineError;
///
/// let error = EngineError::MissingField {
///     field: "birth_date".to_string(),
/// };
/// assert_eq!(error.to_string(), "Missing required field: birth_date");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration parsed but is inconsistent (e.g. overlapping rate periods).
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// A description of the inconsistency.
        message: String,
    },

    /// A mandatory calculation input was not supplied.
    #[error("Missing required field: {field}")]
    MissingField {
        /// The name of the missing field.
        field: String,
    },

    /// A stoppage period was malformed.
    #[error("Invalid stoppage period #{index}: {message}")]
    InvalidPeriod {
        /// Position of the period in the caller's list.
        index: usize,
        /// A description of what made the period invalid.
        message: String,
    },

    /// The option percentage could not be interpreted.
    #[error("Invalid option percentage: '{value}'")]
    InvalidOption {
        /// The raw value supplied by the caller.
        value: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
