//! Deal evaluation against a market summary.
//!
//! The evaluator is total: bad input, missing market data and stale data all
//! produce a [`Verdict::Unknown`] carrying a reason instead of an error.
//!
//! | Verdict | Asking price |
//! |---------|--------------|
//! | `GOOD` | `<= pct80` |
//! | `FAIR` | `<= pct90` |
//! | `OVERPRICED` | `> pct90` |

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{round2, MarketSummary, UtcDateTime};

/// Market data older than this is stale. The bound is exclusive.
pub const STALE_THRESHOLD_MS: i64 = 24 * 60 * 60 * 1000;

const MS_PER_HOUR: i64 = 60 * 60 * 1000;

/// Discount-tier reference prices derived from a market value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DealTargets {
    pub pct80: f64,
    pub pct85: f64,
    pub pct90: f64,
}

/// One labelled tier of [`DealTargets`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DealTier {
    pub label: &'static str,
    pub percent: u8,
    pub price: f64,
}

impl DealTargets {
    /// Tiers in ascending price order, labelled for display.
    ///
    /// `pct85` is informational and does not gate the verdict.
    pub fn tiers(&self) -> [DealTier; 3] {
        [
            DealTier {
                label: "Deep Value",
                percent: 80,
                price: self.pct80,
            },
            DealTier {
                label: "Great Deal",
                percent: 85,
                price: self.pct85,
            },
            DealTier {
                label: "Fair Trade",
                percent: 90,
                price: self.pct90,
            },
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Good,
    Fair,
    Overpriced,
    Unknown,
}

impl Verdict {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Good => "GOOD",
            Self::Fair => "FAIR",
            Self::Overpriced => "OVERPRICED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealVerdict {
    pub verdict: Verdict,
    /// In `[0, 1]`; zero for every `UNKNOWN` verdict.
    pub confidence: f64,
    pub reason: String,
}

impl DealVerdict {
    fn unknown(reason: impl Into<String>) -> Self {
        Self {
            verdict: Verdict::Unknown,
            confidence: 0.0,
            reason: reason.into(),
        }
    }
}

/// Verdict plus the targets it was judged against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealEvaluation {
    #[serde(flatten)]
    pub verdict: DealVerdict,
    #[serde(flatten)]
    pub targets: DealTargets,
}

/// 80%, 85% and 90% of `market_value`, rounded to cents. All zero when the
/// market value is not a positive finite number.
pub fn compute_deal_targets(market_value: f64) -> DealTargets {
    if !market_value.is_finite() || market_value <= 0.0 {
        return DealTargets {
            pct80: 0.0,
            pct85: 0.0,
            pct90: 0.0,
        };
    }

    DealTargets {
        pct80: round2(market_value * 0.8),
        pct85: round2(market_value * 0.85),
        pct90: round2(market_value * 0.9),
    }
}

/// Classifies `asking_price` against `summary` as of the current time.
pub fn evaluate_deal(asking_price: f64, summary: &MarketSummary) -> DealEvaluation {
    evaluate_deal_at(asking_price, summary, UtcDateTime::now())
}

/// Classifies `asking_price` against `summary` as of `now`.
pub fn evaluate_deal_at(
    asking_price: f64,
    summary: &MarketSummary,
    now: UtcDateTime,
) -> DealEvaluation {
    let targets = compute_deal_targets(summary.market);
    let verdict = classify(asking_price, summary, &targets, now);
    DealEvaluation { verdict, targets }
}

fn classify(
    asking_price: f64,
    summary: &MarketSummary,
    targets: &DealTargets,
    now: UtcDateTime,
) -> DealVerdict {
    if !asking_price.is_finite() || asking_price < 0.0 {
        return DealVerdict::unknown("Invalid asking price");
    }

    let market = summary.market;
    if !market.is_finite() || market <= 0.0 {
        return DealVerdict::unknown("Market data unavailable");
    }

    let age_ms = now.millis_since(summary.last_updated);
    if age_ms > STALE_THRESHOLD_MS {
        let hours = age_ms / MS_PER_HOUR;
        return DealVerdict::unknown(format!("Market data is stale ({hours}h old)"));
    }

    let confidence = confidence(summary);

    if asking_price <= targets.pct90 {
        let below = percent_of(market - asking_price, market);
        return DealVerdict {
            verdict: if asking_price <= targets.pct80 {
                Verdict::Good
            } else {
                Verdict::Fair
            },
            confidence,
            reason: format!("Asking price is {below}% below market value"),
        };
    }

    let above = percent_of(asking_price - market, market);
    let reason = if above > 0 {
        format!("Asking price is {above}% above market value")
    } else {
        String::from("Asking price is at market value")
    };

    DealVerdict {
        verdict: Verdict::Overpriced,
        confidence,
        reason,
    }
}

// Counted in tenths so the documented steps stay exact.
fn confidence(summary: &MarketSummary) -> f64 {
    let mut tenths = 7_u8;
    if summary.sample_size.is_some_and(|size| size > 10) {
        tenths += 2;
    }
    if summary.sources.len() > 1 {
        tenths += 1;
    }
    f64::from(tenths.min(10)) / 10.0
}

/// Whole percent, halves rounded up.
fn percent_of(delta: f64, market: f64) -> i64 {
    (delta / market * 100.0 + 0.5).floor() as i64
}
