use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::feed::{FeedRecord, FixtureFeed, PriceFeed};
use crate::provider::{PricingProvider, SourceError, SummaryFuture};
use crate::{CoreError, ItemIdentity, MarketSummary, PricePoint, ProviderId, UtcDateTime};

/// Latency the bundled sample imitates when simulation is enabled.
pub const EBAY_SAMPLE_LATENCY: Duration = Duration::from_millis(120);

/// eBay sold-listings provider. Its market value is the average realized
/// sale price, reported as both `market` and `sold_avg`.
#[derive(Clone)]
pub struct EbaySoldProvider {
    feed: Arc<dyn PriceFeed>,
}

impl EbaySoldProvider {
    pub const ID: ProviderId = ProviderId::Ebay;

    pub fn new(feed: Arc<dyn PriceFeed>) -> Self {
        Self { feed }
    }

    /// Provider backed by the bundled eBay fixture book.
    pub fn sample() -> Result<Self, CoreError> {
        Ok(Self::new(Arc::new(FixtureFeed::ebay_sample()?)))
    }

    pub fn sample_with_latency() -> Result<Self, CoreError> {
        let feed = FixtureFeed::ebay_sample()?.with_latency(EBAY_SAMPLE_LATENCY);
        Ok(Self::new(Arc::new(feed)))
    }
}

impl fmt::Debug for EbaySoldProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EbaySoldProvider").finish_non_exhaustive()
    }
}

impl PricingProvider for EbaySoldProvider {
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
    let Some(sold_avg) = record.sold_avg else {
        return Err(SourceError::invalid_data(
            "ebay record has no sold average",
        ));
    };

    let observed = record.last_updated.unwrap_or_else(UtcDateTime::now);
    let point = PricePoint::new(
        EbaySoldProvider::ID.as_str(),
        &record.currency,
        sold_avg,
        observed,
    )?;

    // Sold listings have no asking-price midpoint.
    let summary = MarketSummary::new(&record.currency, sold_avg, observed)?
        .with_band(record.low, None, record.high)?
        .with_sold_avg(Some(sold_avg))?
        .with_sample_size(record.sample_size)
        .with_source(point);

    Ok(summary)
}
