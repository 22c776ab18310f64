//! Core contracts for dealscope.
//!
//! This crate contains:
//! - Item identity, price point and market summary models with validation
//! - The pricing provider contract and fixture-backed providers
//! - Concurrent multi-source aggregation with outlier rejection
//! - Deal targets and verdicts
//! - Response envelope and structured errors

pub mod adapters;
pub mod aggregator;
pub mod config;
pub mod deal;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod feed;
pub mod provider;
pub mod source;

pub use adapters::{
    EbaySoldProvider, TcgplayerProvider, EBAY_SAMPLE_LATENCY, TCGPLAYER_SAMPLE_LATENCY,
};
pub use aggregator::{
    mean, median, AggregateReport, PricingAggregator, PricingAggregatorBuilder, ProviderFailure,
    RejectedValue,
};
pub use config::{PricingConfig, DEFAULT_OUTLIER_THRESHOLD};
pub use deal::{
    compute_deal_targets, evaluate_deal, evaluate_deal_at, DealEvaluation, DealTargets, DealTier,
    DealVerdict, Verdict, STALE_THRESHOLD_MS,
};
pub use domain::{
    round2, validate_currency_code, Condition, ItemIdentity, MarketSummary, PricePoint,
    UtcDateTime,
};
pub use envelope::{Envelope, EnvelopeError, EnvelopeMeta, SCHEMA_VERSION};
pub use error::{CoreError, PricingError, ValidationError};
pub use feed::{FeedRecord, FixtureBook, FixtureFeed, PriceFeed, RecordFuture};
pub use provider::{PricingProvider, SourceError, SourceErrorKind, SummaryFuture};
pub use source::ProviderId;
