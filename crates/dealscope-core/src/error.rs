use thiserror::Error;

use crate::aggregator::ProviderFailure;

/// Validation and contract errors exposed by `dealscope-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("item set id cannot be empty")]
    EmptySetId,
    #[error("item number cannot be empty")]
    EmptyItemNumber,
    #[error("item key '{value}' must look like '<set>-<number>'")]
    InvalidItemKey { value: String },
    #[error("{field} length {len} exceeds max {max}")]
    ItemFieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },
    #[error("{field} contains invalid character '{ch}' at index {index}")]
    ItemFieldInvalidChar {
        field: &'static str,
        ch: char,
        index: usize,
    },

    #[error("invalid source '{value}', expected one of tcgplayer, ebay")]
    InvalidSource { value: String },
    #[error("invalid condition '{value}', expected one of NM, LP, MP, HP, DMG")]
    InvalidCondition { value: String },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },
    #[error("unix timestamp {millis}ms is out of range")]
    TimestampOutOfRange { millis: i64 },

    #[error("currency must be a 3-letter uppercase ISO code: '{value}'")]
    InvalidCurrency { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },

    #[error("invalid configuration value for {key}: '{value}'")]
    InvalidConfig { key: &'static str, value: String },
}

/// Failure of a whole aggregation request.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PricingError {
    /// Every configured provider failed (or none were configured).
    #[error("no pricing data available")]
    NoDataAvailable { failures: Vec<ProviderFailure> },
}

impl PricingError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NoDataAvailable { .. } => "pricing.no_data_available",
        }
    }

    /// Message suitable for end users.
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::NoDataAvailable { .. } => "pricing unavailable for this item",
        }
    }

    pub fn failures(&self) -> &[ProviderFailure] {
        match self {
            Self::NoDataAvailable { failures } => failures,
        }
    }
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
