//! Multi-source price reconciliation.
//!
//! [`PricingAggregator`] fans a request out to every configured provider at
//! once, drops the calls that fail, rejects representative values that stray
//! too far from the median and folds the survivors into one
//! [`MarketSummary`].
//!
//! | Output field | Derived from |
//! |--------------|--------------|
//! | `market` | mean of non-outlier representative values |
//! | `low` / `high` | min / max band edge over all surviving summaries |
//! | `mid` | midpoint of the aggregated `low` and `high` |
//! | `sold_avg` | mean of the `sold_avg` values that are present |
//! | `sample_size` | sum of sample sizes, omitted when zero |
//! | `last_updated` | most recent surviving timestamp |
//! | `currency` | first surviving summary |

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use serde::Serialize;

use crate::adapters::{
    EbaySoldProvider, TcgplayerProvider, EBAY_SAMPLE_LATENCY, TCGPLAYER_SAMPLE_LATENCY,
};
use crate::config::{PricingConfig, DEFAULT_OUTLIER_THRESHOLD};
use crate::feed::{FixtureBook, FixtureFeed};
use crate::provider::{PricingProvider, SourceError};
use crate::{
    round2, CoreError, EnvelopeError, ItemIdentity, MarketSummary, PricingError, ProviderId,
};

/// A provider call excluded from the aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderFailure {
    pub provider: String,
    pub error: SourceError,
}

impl ProviderFailure {
    pub fn to_envelope_error(&self) -> EnvelopeError {
        EnvelopeError::new(self.error.code(), self.error.message())
            .with_retryable(self.error.retryable())
            .with_source(self.provider.as_str())
    }
}

/// A representative value left out of the central estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedValue {
    pub provider: String,
    pub value: f64,
    /// `|value - median| / median`.
    pub deviation: f64,
}

/// Aggregate summary plus the diagnostics of how it was reached.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateReport {
    pub summary: MarketSummary,
    pub failures: Vec<ProviderFailure>,
    pub rejected: Vec<RejectedValue>,
    /// Median of the representative values before outlier rejection.
    pub median: f64,
    pub latency_ms: u64,
}

/// Concurrent fan-out over a fixed provider set.
#[derive(Clone)]
pub struct PricingAggregator {
    providers: Vec<Arc<dyn PricingProvider>>,
    outlier_threshold: f64,
    provider_timeout: Option<Duration>,
}

impl fmt::Debug for PricingAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PricingAggregator")
            .field("providers", &self.provider_names())
            .field("outlier_threshold", &self.outlier_threshold)
            .field("provider_timeout", &self.provider_timeout)
            .finish()
    }
}

impl PricingAggregator {
    pub fn builder() -> PricingAggregatorBuilder {
        PricingAggregatorBuilder::new()
    }

    /// Provider names in invocation order.
    pub fn provider_names(&self) -> Vec<String> {
        self.providers
            .iter()
            .map(|provider| provider.name().to_owned())
            .collect()
    }

    pub fn outlier_threshold(&self) -> f64 {
        self.outlier_threshold
    }

    pub fn provider_timeout(&self) -> Option<Duration> {
        self.provider_timeout
    }

    /// Reconciled summary for `item`.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::NoDataAvailable`] when no provider produced a
    /// summary.
    pub async fn market_summary(&self, item: &ItemIdentity) -> Result<MarketSummary, PricingError> {
        self.aggregate(item).await.map(|report| report.summary)
    }

    /// Reconciled summary for `item` together with failures, rejected
    /// outliers and timing.
    ///
    /// Every provider call settles before reconciliation starts. Dropping the
    /// returned future drops all in-flight provider calls.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::NoDataAvailable`] when no provider produced a
    /// summary.
    pub async fn aggregate(&self, item: &ItemIdentity) -> Result<AggregateReport, PricingError> {
        let started = Instant::now();
        let calls = self
            .providers
            .iter()
            .map(|provider| self.invoke(provider.as_ref(), item));
        let results = join_all(calls).await;

        let mut survivors = Vec::with_capacity(results.len());
        let mut failures = Vec::new();
        for (provider, result) in self.providers.iter().zip(results) {
            match result {
                Ok(summary) => survivors.push((provider.name().to_owned(), summary)),
                Err(error) => {
                    tracing::warn!(
                        provider = provider.name(),
                        code = error.code(),
                        error = %error.message(),
                        "excluding provider from aggregate"
                    );
                    failures.push(ProviderFailure {
                        provider: provider.name().to_owned(),
                        error,
                    });
                }
            }
        }

        if survivors.is_empty() {
            tracing::error!(item = %item, failed = failures.len(), "no pricing data available");
            return Err(PricingError::NoDataAvailable { failures });
        }

        let contributors = survivors.len();
        let reconciled = reconcile(survivors, self.outlier_threshold);
        tracing::debug!(
            item = %item,
            market = reconciled.summary.market,
            providers = contributors,
            "aggregated market summary"
        );

        Ok(AggregateReport {
            summary: reconciled.summary,
            failures,
            rejected: reconciled.rejected,
            median: reconciled.median,
            latency_ms: elapsed_ms(started),
        })
    }

    async fn invoke(
        &self,
        provider: &dyn PricingProvider,
        item: &ItemIdentity,
    ) -> Result<MarketSummary, SourceError> {
        match self.provider_timeout {
            Some(budget) => tokio::time::timeout(budget, provider.market_summary(item))
                .await
                .unwrap_or_else(|_| Err(SourceError::timeout(duration_ms(budget)))),
            None => provider.market_summary(item).await,
        }
    }
}

/// Builder for [`PricingAggregator`].
pub struct PricingAggregatorBuilder {
    providers: Vec<Arc<dyn PricingProvider>>,
    outlier_threshold: f64,
    provider_timeout: Option<Duration>,
}

impl fmt::Debug for PricingAggregatorBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PricingAggregatorBuilder")
            .field("providers", &self.providers.len())
            .field("outlier_threshold", &self.outlier_threshold)
            .field("provider_timeout", &self.provider_timeout)
            .finish()
    }
}

impl Default for PricingAggregatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PricingAggregatorBuilder {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            outlier_threshold: DEFAULT_OUTLIER_THRESHOLD,
            provider_timeout: None,
        }
    }

    /// Fixture-backed providers and limits described by `config`.
    ///
    /// Configured fixture files replace the bundled sample books.
    pub fn from_config(config: &PricingConfig) -> Result<Self, CoreError> {
        config.validate()?;

        let mut builder = Self::new().with_outlier_threshold(config.outlier_threshold);
        if let Some(timeout) = config.provider_timeout() {
            builder = builder.with_provider_timeout(timeout);
        }

        let mut providers = Vec::with_capacity(config.providers.len());
        for id in &config.providers {
            let provider: Arc<dyn PricingProvider> = match id {
                ProviderId::Tcgplayer => {
                    let feed = fixture_feed(
                        *id,
                        config.tcgplayer_fixtures.as_deref(),
                        config.simulate_latency.then_some(TCGPLAYER_SAMPLE_LATENCY),
                    )?;
                    Arc::new(TcgplayerProvider::new(Arc::new(feed)))
                }
                ProviderId::Ebay => {
                    let feed = fixture_feed(
                        *id,
                        config.ebay_fixtures.as_deref(),
                        config.simulate_latency.then_some(EBAY_SAMPLE_LATENCY),
                    )?;
                    Arc::new(EbaySoldProvider::new(Arc::new(feed)))
                }
            };
            providers.push(provider);
        }

        Ok(builder.with_providers(providers))
    }

    pub fn with_provider(mut self, provider: Arc<dyn PricingProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn with_providers<I>(mut self, providers: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn PricingProvider>>,
    {
        self.providers.extend(providers);
        self
    }

    pub fn with_outlier_threshold(mut self, threshold: f64) -> Self {
        self.outlier_threshold = threshold;
        self
    }

    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> PricingAggregator {
        PricingAggregator {
            providers: self.providers,
            outlier_threshold: self.outlier_threshold,
            provider_timeout: self.provider_timeout,
        }
    }
}

/// Median of `values`; `None` when empty.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Arithmetic mean of `values`; `None` when empty.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

struct Reconciled {
    summary: MarketSummary,
    rejected: Vec<RejectedValue>,
    median: f64,
}

// `survivors` is non-empty.
fn reconcile(survivors: Vec<(String, MarketSummary)>, threshold: f64) -> Reconciled {
    let values = survivors
        .iter()
        .map(|(_, summary)| summary.representative_value())
        .collect::<Vec<_>>();
    let center = median(&values).unwrap_or(0.0);

    let mut kept = Vec::with_capacity(values.len());
    let mut rejected = Vec::new();
    for ((provider, _), value) in survivors.iter().zip(&values) {
        let deviation = (value - center).abs() / center;
        if deviation <= threshold {
            kept.push(*value);
        } else {
            tracing::debug!(
                provider = %provider,
                value = *value,
                median = center,
                deviation,
                "rejecting outlier"
            );
            rejected.push(RejectedValue {
                provider: provider.clone(),
                value: *value,
                deviation,
            });
        }
    }

    let market = match mean(&kept) {
        Some(market) => market,
        None => {
            tracing::debug!(median = center, "every value rejected, using unfiltered mean");
            rejected.clear();
            mean(&values).unwrap_or(0.0)
        }
    };

    let low = survivors
        .iter()
        .map(|(_, summary)| summary.low_or_market())
        .fold(f64::INFINITY, f64::min);
    let high = survivors
        .iter()
        .map(|(_, summary)| summary.high_or_market())
        .fold(f64::NEG_INFINITY, f64::max);

    let sold = survivors
        .iter()
        .filter_map(|(_, summary)| summary.sold_avg)
        .collect::<Vec<_>>();
    let sold_avg = mean(&sold).filter(|value| *value != 0.0).map(round2);

    let sample_size = survivors
        .iter()
        .map(|(_, summary)| summary.sample_size.unwrap_or(0))
        .fold(0_u32, u32::saturating_add);

    let (_, first) = &survivors[0];
    let currency = first.currency.clone();
    if let Some((provider, other)) = survivors
        .iter()
        .find(|(_, summary)| summary.currency != currency)
    {
        tracing::warn!(
            expected = %currency,
            provider = %provider,
            found = %other.currency,
            "providers disagree on currency; keeping the first"
        );
    }

    let last_updated = survivors
        .iter()
        .map(|(_, summary)| summary.last_updated)
        .max()
        .unwrap_or(first.last_updated);

    let sources = survivors
        .into_iter()
        .flat_map(|(_, summary)| summary.sources)
        .collect();

    Reconciled {
        summary: MarketSummary {
            currency,
            market: round2(market),
            low: Some(round2(low)),
            mid: Some(round2((low + high) / 2.0)),
            high: Some(round2(high)),
            sold_avg,
            sample_size: (sample_size > 0).then_some(sample_size),
            last_updated,
            sources,
        },
        rejected,
        median: center,
    }
}

fn fixture_feed(
    id: ProviderId,
    path: Option<&Path>,
    latency: Option<Duration>,
) -> Result<FixtureFeed, CoreError> {
    let feed = match (id, path) {
        (_, Some(path)) => FixtureFeed::new(id.as_str(), FixtureBook::from_path(path)?),
        (ProviderId::Tcgplayer, None) => FixtureFeed::tcgplayer_sample()?,
        (ProviderId::Ebay, None) => FixtureFeed::ebay_sample()?,
    };

    Ok(match latency {
        Some(latency) => feed.with_latency(latency),
        None => feed,
    })
}

fn duration_ms(duration: Duration) -> u64 {
    duration.as_millis().min(u128::from(u64::MAX)) as u64
}

fn elapsed_ms(started: Instant) -> u64 {
    duration_ms(started.elapsed())
}
