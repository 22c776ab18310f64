use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{UtcDateTime, ValidationError};

/// Physical condition grade of an observed copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    #[serde(rename = "NM")]
    NearMint,
    #[serde(rename = "LP")]
    LightlyPlayed,
    #[serde(rename = "MP")]
    ModeratelyPlayed,
    #[serde(rename = "HP")]
    HeavilyPlayed,
    #[serde(rename = "DMG")]
    Damaged,
}

impl Condition {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NearMint => "NM",
            Self::LightlyPlayed => "LP",
            Self::ModeratelyPlayed => "MP",
            Self::HeavilyPlayed => "HP",
            Self::Damaged => "DMG",
        }
    }
}

impl Display for Condition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Condition {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "NM" => Ok(Self::NearMint),
            "LP" => Ok(Self::LightlyPlayed),
            "MP" => Ok(Self::ModeratelyPlayed),
            "HP" => Ok(Self::HeavilyPlayed),
            "DMG" => Ok(Self::Damaged),
            _ => Err(ValidationError::InvalidCondition {
                value: value.to_owned(),
            }),
        }
    }
}

/// One source's single price observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub source: String,
    pub currency: String,
    pub value: f64,
    pub last_updated: UtcDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    /// Origin of the observation (listing id, URL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl PricePoint {
    pub fn new(
        source: impl Into<String>,
        currency: impl AsRef<str>,
        value: f64,
        last_updated: UtcDateTime,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("value", value)?;

        Ok(Self {
            source: source.into(),
            currency: validate_currency_code(currency.as_ref())?,
            value,
            last_updated,
            condition: None,
            reference: None,
        })
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}

/// Market view of one item, either from a single provider or reconciled
/// across several.
///
/// `low <= market <= high` is a target rather than an enforced bound: sources
/// disagree and an aggregate is a statistical compromise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSummary {
    pub currency: String,
    pub market: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mid: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,
    /// Average of realized sale prices.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sold_avg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_size: Option<u32>,
    pub last_updated: UtcDateTime,
    #[serde(default)]
    pub sources: Vec<PricePoint>,
}

impl MarketSummary {
    pub fn new(
        currency: impl AsRef<str>,
        market: f64,
        last_updated: UtcDateTime,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("market", market)?;

        Ok(Self {
            currency: validate_currency_code(currency.as_ref())?,
            market,
            low: None,
            mid: None,
            high: None,
            sold_avg: None,
            sample_size: None,
            last_updated,
            sources: Vec::new(),
        })
    }

    pub fn with_band(
        mut self,
        low: Option<f64>,
        mid: Option<f64>,
        high: Option<f64>,
    ) -> Result<Self, ValidationError> {
        validate_optional_non_negative("low", low)?;
        validate_optional_non_negative("mid", mid)?;
        validate_optional_non_negative("high", high)?;
        self.low = low;
        self.mid = mid;
        self.high = high;
        Ok(self)
    }

    pub fn with_sold_avg(mut self, sold_avg: Option<f64>) -> Result<Self, ValidationError> {
        validate_optional_non_negative("sold_avg", sold_avg)?;
        self.sold_avg = sold_avg;
        Ok(self)
    }

    pub fn with_sample_size(mut self, sample_size: Option<u32>) -> Self {
        self.sample_size = sample_size;
        self
    }

    pub fn with_source(mut self, point: PricePoint) -> Self {
        self.sources.push(point);
        self
    }

    /// The single number used for median and outlier computation.
    ///
    /// Realized sales outrank list prices: `sold_avg`, then `mid`, then
    /// `market`. Zero and NaN entries count as absent.
    pub fn representative_value(&self) -> f64 {
        [self.sold_avg, self.mid]
            .into_iter()
            .flatten()
            .find(|value| is_usable(*value))
            .unwrap_or(self.market)
    }

    /// Lower band edge, falling back to `market` when the source has none.
    pub fn low_or_market(&self) -> f64 {
        self.low.filter(|value| is_usable(*value)).unwrap_or(self.market)
    }

    /// Upper band edge, falling back to `market` when the source has none.
    pub fn high_or_market(&self) -> f64 {
        self.high
            .filter(|value| is_usable(*value))
            .unwrap_or(self.market)
    }
}

/// Round to exactly two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Validate and normalize currency to uppercase 3-letter code.
pub fn validate_currency_code(input: &str) -> Result<String, ValidationError> {
    let normalized = input.trim().to_ascii_uppercase();
    let is_valid = normalized.len() == 3 && normalized.chars().all(|ch| ch.is_ascii_alphabetic());

    if !is_valid {
        return Err(ValidationError::InvalidCurrency {
            value: input.to_owned(),
        });
    }

    Ok(normalized)
}

fn is_usable(value: f64) -> bool {
    value != 0.0 && !value.is_nan()
}

pub(crate) fn validate_non_negative(
    field: &'static str,
    value: f64,
) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}

pub(crate) fn validate_optional_non_negative(
    field: &'static str,
    value: Option<f64>,
) -> Result<(), ValidationError> {
    if let Some(value) = value {
        validate_non_negative(field, value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts() -> UtcDateTime {
        UtcDateTime::parse("2024-01-01T00:00:00Z").expect("timestamp")
    }

    #[test]
    fn validates_currency() {
        assert_eq!(
            validate_currency_code("usd").expect("must normalize"),
            "USD"
        );
        assert!(matches!(
            validate_currency_code("USDT"),
            Err(ValidationError::InvalidCurrency { .. })
        ));
    }

    #[test]
    fn price_point_serializes_provenance_only_when_present() {
        let bare = PricePoint::new("ebay", "USD", 101.25, ts()).expect("valid point");
        let listed = bare
            .clone()
            .with_condition(Condition::LightlyPlayed)
            .with_reference("https://www.ebay.com/itm/1234567890");

        let bare_json = serde_json::to_value(&bare).expect("serialize");
        let listed_json = serde_json::to_value(&listed).expect("serialize");

        assert!(bare_json.get("reference").is_none());
        assert!(bare_json.get("condition").is_none());
        assert_eq!(listed_json["reference"], "https://www.ebay.com/itm/1234567890");
        assert_eq!(listed.reference.as_deref(), Some("https://www.ebay.com/itm/1234567890"));
    }

    #[test]
    fn rejects_negative_market() {
        let err = MarketSummary::new("USD", -1.0, ts()).expect_err("must fail");
        assert!(matches!(err, ValidationError::NegativeValue { field: "market" }));
    }

    #[test]
    fn representative_value_prefers_sold_avg_then_mid() {
        let base = MarketSummary::new("USD", 100.0, ts()).expect("valid");
        assert_eq!(base.representative_value(), 100.0);

        let with_mid = base
            .clone()
            .with_band(Some(90.0), Some(104.0), Some(120.0))
            .expect("valid band");
        assert_eq!(with_mid.representative_value(), 104.0);

        let with_sold = with_mid
            .with_sold_avg(Some(98.5))
            .expect("valid sold avg");
        assert_eq!(with_sold.representative_value(), 98.5);
    }

    #[test]
    fn representative_value_skips_zero_entries() {
        let summary = MarketSummary::new("USD", 40.0, ts())
            .expect("valid")
            .with_band(None, Some(0.0), None)
            .expect("valid band")
            .with_sold_avg(Some(0.0))
            .expect("valid sold avg");

        assert_eq!(summary.representative_value(), 40.0);
    }

    #[test]
    fn band_edges_fall_back_to_market() {
        let summary = MarketSummary::new("USD", 40.0, ts()).expect("valid");
        assert_eq!(summary.low_or_market(), 40.0);
        assert_eq!(summary.high_or_market(), 40.0);
    }

    #[test]
    fn rounds_to_cents() {
        assert_eq!(round2(79.992), 79.99);
        assert_eq!(round2(28.3305), 28.33);
        assert_eq!(round2(29.997), 30.0);
    }

    #[test]
    fn parses_condition_codes() {
        assert_eq!("lp".parse::<Condition>().expect("valid"), Condition::LightlyPlayed);
        assert!("mint".parse::<Condition>().is_err());
    }

    #[test]
    fn price_point_serializes_condition_code() {
        let point = PricePoint::new("ebay", "usd", 12.5, ts())
            .expect("valid")
            .with_condition(Condition::NearMint);
        let json = serde_json::to_value(&point).expect("serialize");

        assert_eq!(json["currency"], "USD");
        assert_eq!(json["condition"], "NM");
        assert!(json.get("reference").is_none());
    }
}
