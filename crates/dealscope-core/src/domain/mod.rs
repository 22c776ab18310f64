//! # Domain Models
//!
//! Value types shared by pricing providers, the aggregator and the deal
//! evaluator.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ItemIdentity`] | Set id + item number (+ optional variant/language) |
//! | [`PricePoint`] | One source's observation with provenance |
//! | [`MarketSummary`] | Per-provider or reconciled market view |
//! | [`Condition`] | Condition grade of an observed copy |
//! | [`UtcDateTime`] | UTC timestamp |
//!
//! Constructors validate their inputs; fields stay public so callers can
//! build summaries from their own sources.

mod identity;
mod models;
mod timestamp;

pub use identity::ItemIdentity;
pub(crate) use models::{validate_non_negative, validate_optional_non_negative};
pub use models::{round2, validate_currency_code, Condition, MarketSummary, PricePoint};
pub use timestamp::UtcDateTime;
