//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while fetching or parsing financial statements.
#[derive(Debug, Error)]
pub enum DataError {
    /// No response could be obtained to decode: malformed URL, unreachable
    /// host, or a non-success HTTP status.
    #[error("Unable to fetch {url}: {reason}")]
    Parser {
        /// URL that was requested
        url: String,
        /// What went wrong
        reason: String,
    },

    /// A response was received but its body is not valid JSON.
    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),

    /// Date field is not of the form `YYYY-M-D`
    #[error("Invalid date '{0}': expected YYYY-M-D")]
    InvalidDate(String),

    /// Required field absent from a payload
    #[error("Missing field '{field}' in {context}")]
    MissingField {
        /// Name of the field
        field: String,
        /// Where the field was expected
        context: String,
    },

    /// Payload or record has an unexpected JSON shape
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Scalar field could not be read as a number
    #[error("Invalid value for '{field}': {value}")]
    InvalidValue {
        /// Name of the field
        field: String,
        /// Offending value, rendered as JSON
        value: String,
    },

    /// Invalid symbol
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Unknown or non-tabular statement identifier
    #[error("Unknown statement: {0}")]
    UnknownStatement(String),

    /// HTTP client could not be constructed
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}

impl DataError {
    pub(crate) fn parser(url: &str, reason: impl std::fmt::Display) -> Self {
        Self::Parser {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn missing(field: &str, context: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.to_string(),
            context: context.into(),
        }
    }
}
