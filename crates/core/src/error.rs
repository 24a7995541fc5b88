//! Error types for the periodic system.

use crate::types::MonthPeriod;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the periodic system.
#[derive(Error, Debug)]
pub enum Error {
    /// Granularity tag is not one of DAY, MONTH or DECADE.
    #[error("Unsupported granularity: {0}")]
    UnsupportedGranularity(String),

    /// A date, decade label or period string could not be parsed.
    #[error("Malformed temporal value: {0}")]
    MalformedTemporalValue(String),

    /// Currency code is not a member of the currency enumeration.
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    /// Two raw rows fall in the same month where only one is allowed.
    #[error("Duplicate period: {0}")]
    DuplicatePeriod(MonthPeriod),

    /// Symbol identifier is not of the form `namespace/ticker`.
    #[error("Malformed symbol id: {0}")]
    MalformedSymbolId(String),

    /// Raw-value supplier failed.
    #[error("Supplier error: {0}")]
    Supplier(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an unsupported granularity error.
    pub fn unsupported_granularity(tag: impl Into<String>) -> Self {
        Error::UnsupportedGranularity(tag.into())
    }

    /// Create a malformed temporal value error.
    pub fn malformed_temporal(msg: impl Into<String>) -> Self {
        Error::MalformedTemporalValue(msg.into())
    }

    /// Create an unknown currency error.
    pub fn unknown_currency(code: impl Into<String>) -> Self {
        Error::UnknownCurrency(code.into())
    }

    /// Create a malformed symbol id error.
    pub fn malformed_symbol_id(msg: impl Into<String>) -> Self {
        Error::MalformedSymbolId(msg.into())
    }

    /// Create a supplier error.
    pub fn supplier(msg: impl Into<String>) -> Self {
        Error::Supplier(msg.into())
    }
}
