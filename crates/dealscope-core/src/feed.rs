//! Injectable price data sources backing the bundled providers.
//!
//! Providers never read data directly; they ask a [`PriceFeed`] for the raw
//! [`FeedRecord`] of an item. [`FixtureFeed`] serves records from a JSON
//! fixture book, and a network-backed feed can replace it without touching
//! the providers, the aggregator or the deal evaluator.

use std::collections::HashMap;
use std::fs;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{validate_non_negative, validate_optional_non_negative};
use crate::{
    validate_currency_code, CoreError, ItemIdentity, SourceError, UtcDateTime, ValidationError,
};

const TCGPLAYER_SAMPLE: &str = include_str!("../fixtures/tcgplayer.sample.json");
const EBAY_SAMPLE: &str = include_str!("../fixtures/ebay.sample.json");

/// Flat per-item record as published by a pricing source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedRecord {
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sold_avg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mid: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_size: Option<u32>,
    /// Observation time; absent means observed at lookup time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<UtcDateTime>,
}

impl FeedRecord {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_currency_code(&self.currency)?;
        validate_optional_non_negative("market", self.market)?;
        validate_optional_non_negative("soldAvg", self.sold_avg)?;
        validate_optional_non_negative("low", self.low)?;
        validate_optional_non_negative("mid", self.mid)?;
        validate_optional_non_negative("high", self.high)?;
        if let Some(last_sold) = self.last_sold {
            validate_non_negative("lastSold", last_sold)?;
        }
        Ok(())
    }
}

/// Boxed future returned by [`PriceFeed::record`].
pub type RecordFuture<'a> =
    Pin<Box<dyn Future<Output = Result<FeedRecord, SourceError>> + Send + 'a>>;

/// Data-source abstraction behind a provider.
pub trait PriceFeed: Send + Sync {
    /// Returns the source's record for `item`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the source cannot be reached or has no
    /// record (and no fallback) for the item.
    fn record<'a>(&'a self, item: &'a ItemIdentity) -> RecordFuture<'a>;
}

/// Fixture document: per-item records plus the source's fallback record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixtureBook {
    /// Served for keys missing from `cards`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<FeedRecord>,
    /// Keyed by lowercase item key (`swsh4-183`).
    #[serde(default, deserialize_with = "lowercase_keys")]
    pub cards: HashMap<String, FeedRecord>,
}

fn lowercase_keys<'de, D>(deserializer: D) -> Result<HashMap<String, FeedRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let cards = HashMap::<String, FeedRecord>::deserialize(deserializer)?;
    Ok(cards
        .into_iter()
        .map(|(key, record)| (key.trim().to_ascii_lowercase(), record))
        .collect())
}

impl FixtureBook {
    pub fn from_json(input: &str) -> Result<Self, CoreError> {
        let book: Self = serde_json::from_str(input)?;
        book.validate()?;
        Ok(book)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn with_default(mut self, record: FeedRecord) -> Self {
        self.default = Some(record);
        self
    }

    pub fn with_card(mut self, key: impl Into<String>, record: FeedRecord) -> Self {
        self.cards.insert(key.into().trim().to_ascii_lowercase(), record);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(default) = &self.default {
            default.validate()?;
        }
        for record in self.cards.values() {
            record.validate()?;
        }
        Ok(())
    }

    pub fn lookup(&self, item: &ItemIdentity) -> Option<&FeedRecord> {
        self.cards.get(&item.key()).or(self.default.as_ref())
    }
}

/// [`PriceFeed`] answering from an in-memory fixture book.
#[derive(Debug, Clone)]
pub struct FixtureFeed {
    source: &'static str,
    book: FixtureBook,
    latency: Duration,
}

impl FixtureFeed {
    pub fn new(source: &'static str, book: FixtureBook) -> Self {
        Self {
            source,
            book,
            latency: Duration::ZERO,
        }
    }

    /// Bundled TCGplayer sample data.
    pub fn tcgplayer_sample() -> Result<Self, CoreError> {
        Ok(Self::new("tcgplayer", FixtureBook::from_json(TCGPLAYER_SAMPLE)?))
    }

    /// Bundled eBay sold-listings sample data.
    pub fn ebay_sample() -> Result<Self, CoreError> {
        Ok(Self::new("ebay", FixtureBook::from_json(EBAY_SAMPLE)?))
    }

    /// Delays every lookup, imitating a network round trip.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn book(&self) -> &FixtureBook {
        &self.book
    }
}

impl PriceFeed for FixtureFeed {
    fn record<'a>(&'a self, item: &'a ItemIdentity) -> RecordFuture<'a> {
        Box::pin(async move {
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }

            let key = item.key();
            let Some(record) = self.book.lookup(item) else {
                return Err(SourceError::not_found(format!(
                    "{} has no record for '{key}'",
                    self.source
                )));
            };

            if !self.book.cards.contains_key(&key) {
                tracing::debug!(
                    source = self.source,
                    item = %key,
                    "serving default fixture record"
                );
            }
            Ok(record.clone())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(key: &str) -> ItemIdentity {
        ItemIdentity::parse(key).expect("valid item")
    }

    #[test]
    fn bundled_samples_parse() {
        let tcgplayer = FixtureFeed::tcgplayer_sample().expect("tcgplayer sample");
        let ebay = FixtureFeed::ebay_sample().expect("ebay sample");

        assert!(tcgplayer.book().default.is_some());
        assert!(ebay.book().cards.contains_key("base1-4"));
    }

    #[test]
    fn rejects_negative_fixture_values() {
        let input = r#"{
            "cards": {
                "base1-4": {
                    "currency": "USD",
                    "market": -3.0,
                    "lastUpdated": "2025-01-15T09:30:00Z"
                }
            }
        }"#;

        let err = FixtureBook::from_json(input).expect_err("must fail");
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::NegativeValue { field: "market" })
        ));
    }

    #[test]
    fn lookup_falls_back_to_default() {
        let book = FixtureBook::from_json(TCGPLAYER_SAMPLE).expect("sample");
        let known = book.lookup(&item("swsh4-183")).expect("known record");
        let unknown = book.lookup(&item("unknown-999")).expect("default record");

        assert_eq!(known.market, Some(95.5));
        assert_eq!(unknown.market, Some(25.0));
    }

    #[tokio::test]
    async fn card_keys_from_json_match_regardless_of_case() {
        let input = r#"{
            "default": { "currency": "USD", "market": 1.0 },
            "cards": {
                "SWSH4-183": { "currency": "USD", "market": 95.5 },
                "Base1-4": { "currency": "USD", "market": 350.0 }
            }
        }"#;
        let feed = FixtureFeed::new("tcgplayer", FixtureBook::from_json(input).expect("book"));

        let upper = feed.record(&item("SWSH4-183")).await.expect("known card");
        let lower = feed.record(&item("swsh4-183")).await.expect("known card");
        let mixed = feed.record(&item("base1-4")).await.expect("known card");

        assert_eq!(upper.market, Some(95.5));
        assert_eq!(lower.market, Some(95.5));
        assert_eq!(mixed.market, Some(350.0));
        assert!(feed.book().cards.contains_key("swsh4-183"));
    }

    #[tokio::test]
    async fn missing_default_is_not_found() {
        let feed = FixtureFeed::new("empty", FixtureBook::default());

        let err = feed.record(&item("base1-4")).await.expect_err("must fail");
        assert_eq!(err.kind(), crate::SourceErrorKind::NotFound);
        assert!(err.message().contains("base1-4"));
    }

    #[test]
    fn loads_fixture_file_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ebay.json");
        fs::write(&path, EBAY_SAMPLE).expect("write fixture");

        let book = FixtureBook::from_path(&path).expect("load fixture");
        assert_eq!(book.cards["base1-4"].sold_avg, Some(365.0));
    }
}
