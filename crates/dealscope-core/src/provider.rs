//! Pricing provider contract and per-provider error type.
//!
//! A [`PricingProvider`] produces a [`MarketSummary`] for one item from one
//! external source. Concrete providers differ only in where their numbers
//! come from; the aggregator treats them interchangeably.
//!
//! # Example
//!
//! ```rust,ignore
//! use dealscope_core::{ItemIdentity, PricingProvider, TcgplayerProvider};
//!
//! async fn price(provider: &TcgplayerProvider) -> Result<(), dealscope_core::SourceError> {
//!     let item = ItemIdentity::parse("swsh4-183")?;
//!     let summary = provider.market_summary(&item).await?;
//!     println!("{}: {:.2} {}", provider.name(), summary.market, summary.currency);
//!     Ok(())
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{ItemIdentity, MarketSummary, ValidationError};

/// Provider-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// The source does not know the item.
    NotFound,
    /// The source could not be reached.
    Unavailable,
    /// The call exceeded the caller's time budget.
    Timeout,
    /// The source answered with data that cannot form a summary.
    InvalidData,
    Internal,
}

/// Structured error for one failed provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::NotFound,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn timeout(elapsed_ms: u64) -> Self {
        Self {
            kind: SourceErrorKind::Timeout,
            message: format!("provider call timed out after {elapsed_ms}ms"),
            retryable: true,
        }
    }

    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidData,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::NotFound => "source.not_found",
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::Timeout => "source.timeout",
            SourceErrorKind::InvalidData => "source.invalid_data",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

impl From<ValidationError> for SourceError {
    fn from(error: ValidationError) -> Self {
        Self::invalid_data(error.to_string())
    }
}

/// Boxed future returned by [`PricingProvider::market_summary`].
pub type SummaryFuture<'a> =
    Pin<Box<dyn Future<Output = Result<MarketSummary, SourceError>> + Send + 'a>>;

/// Source adapter contract.
///
/// | Method | Description |
/// |--------|-------------|
/// | [`name`](PricingProvider::name) | Source name recorded in failures and price points |
/// | [`market_summary`](PricingProvider::market_summary) | Summary for one item from this source |
///
/// A provider that only partially knows an item returns a summary with the
/// unknown fields left as `None`; it never invents values.
///
/// Implementations must be `Send + Sync` as the aggregator shares them
/// behind `Arc`.
pub trait PricingProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Fetches this source's market summary for `item`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the source is unreachable, does not know the
    /// item, or returns data that cannot form a summary.
    fn market_summary<'a>(&'a self, item: &'a ItemIdentity) -> SummaryFuture<'a>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(SourceError::not_found("x").code(), "source.not_found");
        assert_eq!(SourceError::timeout(50).code(), "source.timeout");
        assert_eq!(SourceError::invalid_data("x").code(), "source.invalid_data");
    }

    #[test]
    fn timeouts_and_outages_are_retryable() {
        assert!(SourceError::timeout(10).retryable());
        assert!(SourceError::unavailable("down").retryable());
        assert!(!SourceError::not_found("missing").retryable());
    }

    #[test]
    fn validation_errors_become_invalid_data() {
        let error = SourceError::from(ValidationError::NonFiniteValue { field: "market" });
        assert_eq!(error.kind(), SourceErrorKind::InvalidData);
        assert!(error.message().contains("market"));
    }
}
