use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::feed::{FeedRecord, FixtureFeed, PriceFeed};
use crate::provider::{PricingProvider, SourceError, SummaryFuture};
use crate::{CoreError, ItemIdentity, MarketSummary, PricePoint, ProviderId, UtcDateTime};

/// Latency the bundled sample imitates when simulation is enabled.
pub const TCGPLAYER_SAMPLE_LATENCY: Duration = Duration::from_millis(100);

/// TCGplayer list-price provider: market, low, mid and high, no realized sales.
#[derive(Clone)]
pub struct TcgplayerProvider {
    feed: Arc<dyn PriceFeed>,
}

impl TcgplayerProvider {
    pub const ID: ProviderId = ProviderId::Tcgplayer;

    pub fn new(feed: Arc<dyn PriceFeed>) -> Self {
        Self { feed }
    }

    /// Provider backed by the bundled TCGplayer fixture book.
    pub fn sample() -> Result<Self, CoreError> {
        Ok(Self::new(Arc::new(FixtureFeed::tcgplayer_sample()?)))
    }

    pub fn sample_with_latency() -> Result<Self, CoreError> {
        let feed = FixtureFeed::tcgplayer_sample()?.with_latency(TCGPLAYER_SAMPLE_LATENCY);
        Ok(Self::new(Arc::new(feed)))
    }
}

impl fmt::Debug for TcgplayerProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TcgplayerProvider").finish_non_exhaustive()
    }
}

impl PricingProvider for TcgplayerProvider {
    fn name(&self) -> &str {
        Self::ID.as_str()
    }

    fn market_summary<'a>(&'a self, item: &'a ItemIdentity) -> SummaryFuture<'a> {
        Box::pin(async move {
            let record = self.feed.record(item).await?;
            normalize_summary(record)
        })
    }
}

fn normalize_summary(record: FeedRecord) -> Result<MarketSummary, SourceError> {
    let Some(market) = record.market else {
        return Err(SourceError::invalid_data(
            "tcgplayer record has no market price",
        ));
    };

    let observed = record.last_updated.unwrap_or_else(UtcDateTime::now);
    let point = PricePoint::new(
        TcgplayerProvider::ID.as_str(),
        &record.currency,
        market,
        observed,
    )?;

    let summary = MarketSummary::new(&record.currency, market, observed)?
        .with_band(record.low, record.mid, record.high)?
        .with_sample_size(record.sample_size)
        .with_source(point);

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SourceErrorKind;

    fn record() -> FeedRecord {
        FeedRecord {
            currency: String::from("usd"),
            market: Some(12.0),
            sold_avg: None,
            low: None,
            mid: None,
            high: Some(15.0),
            last_sold: None,
            sample_size: None,
            last_updated: Some(UtcDateTime::parse("2025-01-15T09:30:00Z").expect("timestamp")),
        }
    }

    #[test]
    fn keeps_missing_fields_absent() {
        let summary = normalize_summary(record()).expect("summary");

        assert_eq!(summary.currency, "USD");
        assert_eq!(summary.market, 12.0);
        assert_eq!(summary.low, None);
        assert_eq!(summary.mid, None);
        assert_eq!(summary.high, Some(15.0));
        assert_eq!(summary.sold_avg, None);
        assert_eq!(summary.sample_size, None);
    }

    #[test]
    fn stamps_missing_observation_time() {
        let mut record = record();
        record.last_updated = None;
        let before = UtcDateTime::now();

        let summary = normalize_summary(record).expect("summary");
        assert!(summary.last_updated >= before);
        assert_eq!(summary.sources[0].last_updated, summary.last_updated);
    }

    #[test]
    fn requires_market_price() {
        let mut record = record();
        record.market = None;

        let err = normalize_summary(record).expect_err("must fail");
        assert_eq!(err.kind(), SourceErrorKind::InvalidData);
    }
}
