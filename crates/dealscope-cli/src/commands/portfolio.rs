use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Instant;

use dealscope_core::{round2, Condition, EnvelopeError, ItemIdentity, PricingAggregator};
use serde::{Deserialize, Serialize};

use crate::cli::{CollectionStatus, PortfolioArgs};
use crate::error::CliError;

use super::CommandResult;

/// One stored collection entry.
#[derive(Debug, Clone, Deserialize)]
struct Holding {
    item: String,
    quantity: u32,
    status: CollectionStatus,
    #[serde(default)]
    condition: Option<Condition>,
}

#[derive(Debug, Serialize)]
struct PortfolioEntry {
    item: String,
    quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    condition: Option<Condition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    market: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<f64>,
}

#[derive(Debug, Serialize)]
struct PortfolioResponseData {
    status: CollectionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    currency: Option<String>,
    total_value: f64,
    priced: usize,
    unpriced: usize,
    entries: Vec<PortfolioEntry>,
}

pub async fn run(
    args: &PortfolioArgs,
    aggregator: &PricingAggregator,
) -> Result<CommandResult, CliError> {
    let started = Instant::now();
    let holdings = load_holdings(&args.file)?
        .into_iter()
        .filter(|(_, holding)| holding.status == args.status)
        .collect::<Vec<_>>();

    let mut markets: HashMap<ItemIdentity, Option<f64>> = HashMap::new();
    let mut currency: Option<String> = None;
    let mut warnings = Vec::new();
    let mut errors = Vec::new();

    for (item, _) in &holdings {
        if markets.contains_key(item) {
            continue;
        }

        match aggregator.market_summary(item).await {
            Ok(summary) => {
                let expected = currency.get_or_insert_with(|| summary.currency.clone());
                if *expected != summary.currency {
                    warnings.push(format!(
                        "{item} is priced in {} but the portfolio total uses {expected}",
                        summary.currency
                    ));
                }
                markets.insert(item.clone(), Some(summary.market));
            }
            Err(error) => {
                tracing::warn!(item = %item, error = %error, "portfolio entry left unpriced");
                errors.push(EnvelopeError::from(&error).with_source(item.key()));
                markets.insert(item.clone(), None);
            }
        }
    }

    let entries = holdings
        .into_iter()
        .map(|(item, holding)| {
            let market = markets.get(&item).copied().flatten();
            PortfolioEntry {
                item: item.to_string(),
                quantity: holding.quantity,
                condition: holding.condition,
                market,
                value: market.map(|market| round2(market * f64::from(holding.quantity))),
            }
        })
        .collect::<Vec<_>>();

    let total_value = round2(entries.iter().filter_map(|entry| entry.value).sum());
    let priced = entries.iter().filter(|entry| entry.market.is_some()).count();

    let data = serde_json::to_value(PortfolioResponseData {
        status: args.status,
        currency,
        total_value,
        priced,
        unpriced: entries.len() - priced,
        entries,
    })?;

    let mut result = CommandResult::ok(data, aggregator.provider_names())
        .with_errors(errors)
        .with_latency(started.elapsed().as_millis().min(u128::from(u64::MAX)) as u64);
    for warning in warnings {
        result = result.with_warning(warning);
    }

    Ok(result)
}

fn load_holdings(path: &Path) -> Result<Vec<(ItemIdentity, Holding)>, CliError> {
    let contents = fs::read_to_string(path)?;
    let holdings: Vec<Holding> = serde_json::from_str(&contents)?;

    holdings
        .into_iter()
        .map(|holding| -> Result<_, CliError> {
            Ok((ItemIdentity::parse(&holding.item)?, holding))
        })
        .collect()
}
