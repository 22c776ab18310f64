//! Aggregation settings.
//!
//! # Environment Variables
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `DEALSCOPE_OUTLIER_THRESHOLD` | `0.5` | Max relative deviation from the median |
//! | `DEALSCOPE_PROVIDER_TIMEOUT_MS` | unset | Per-provider time budget |
//! | `DEALSCOPE_PROVIDERS` | `tcgplayer,ebay` | Enabled providers, in invocation order |
//! | `DEALSCOPE_TCGPLAYER_FIXTURES` | bundled sample | Fixture book for TCGplayer |
//! | `DEALSCOPE_EBAY_FIXTURES` | bundled sample | Fixture book for eBay |
//! | `DEALSCOPE_SIMULATE_LATENCY` | `false` | Delay fixture lookups like a network call |

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ProviderId, ValidationError};

pub const DEFAULT_OUTLIER_THRESHOLD: f64 = 0.5;

const OUTLIER_THRESHOLD_VAR: &str = "DEALSCOPE_OUTLIER_THRESHOLD";
const PROVIDER_TIMEOUT_VAR: &str = "DEALSCOPE_PROVIDER_TIMEOUT_MS";
const PROVIDERS_VAR: &str = "DEALSCOPE_PROVIDERS";
const TCGPLAYER_FIXTURES_VAR: &str = "DEALSCOPE_TCGPLAYER_FIXTURES";
const EBAY_FIXTURES_VAR: &str = "DEALSCOPE_EBAY_FIXTURES";
const SIMULATE_LATENCY_VAR: &str = "DEALSCOPE_SIMULATE_LATENCY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub outlier_threshold: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_timeout_ms: Option<u64>,
    pub providers: Vec<ProviderId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tcgplayer_fixtures: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ebay_fixtures: Option<PathBuf>,
    pub simulate_latency: bool,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            outlier_threshold: DEFAULT_OUTLIER_THRESHOLD,
            provider_timeout_ms: None,
            providers: ProviderId::ALL.to_vec(),
            tcgplayer_fixtures: None,
            ebay_fixtures: None,
            simulate_latency: false,
        }
    }
}

impl PricingConfig {
    /// Defaults overridden by `DEALSCOPE_*` environment variables.
    pub fn from_env() -> Result<Self, ValidationError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(OUTLIER_THRESHOLD_VAR) {
            config.outlier_threshold = raw
                .trim()
                .parse()
                .map_err(|_| invalid(OUTLIER_THRESHOLD_VAR, &raw))?;
        }

        if let Some(raw) = lookup(PROVIDER_TIMEOUT_VAR) {
            let millis: u64 = raw
                .trim()
                .parse()
                .map_err(|_| invalid(PROVIDER_TIMEOUT_VAR, &raw))?;
            config.provider_timeout_ms = Some(millis);
        }

        if let Some(raw) = lookup(PROVIDERS_VAR) {
            config.providers = raw
                .split(',')
                .filter(|part| !part.trim().is_empty())
                .map(|part| part.parse::<ProviderId>())
                .collect::<Result<Vec<ProviderId>, _>>()?;
            dedupe(&mut config.providers);
        }

        config.tcgplayer_fixtures = lookup(TCGPLAYER_FIXTURES_VAR).map(PathBuf::from);
        config.ebay_fixtures = lookup(EBAY_FIXTURES_VAR).map(PathBuf::from);

        if let Some(raw) = lookup(SIMULATE_LATENCY_VAR) {
            config.simulate_latency =
                parse_flag(&raw).ok_or_else(|| invalid(SIMULATE_LATENCY_VAR, &raw))?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.outlier_threshold.is_finite() || self.outlier_threshold <= 0.0 {
            return Err(invalid(
                OUTLIER_THRESHOLD_VAR,
                &self.outlier_threshold.to_string(),
            ));
        }

        if self.provider_timeout_ms == Some(0) {
            return Err(invalid(PROVIDER_TIMEOUT_VAR, "0"));
        }

        if self.providers.is_empty() {
            return Err(invalid(PROVIDERS_VAR, ""));
        }

        Ok(())
    }

    pub fn provider_timeout(&self) -> Option<Duration> {
        self.provider_timeout_ms.map(Duration::from_millis)
    }
}

fn invalid(key: &'static str, value: &str) -> ValidationError {
    ValidationError::InvalidConfig {
        key,
        value: value.to_owned(),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn dedupe(providers: &mut Vec<ProviderId>) {
    let mut seen = Vec::with_capacity(providers.len());
    providers.retain(|provider| {
        if seen.contains(provider) {
            false
        } else {
            seen.push(*provider);
            true
        }
    });
}
