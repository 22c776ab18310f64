use dealscope_core::{MarketSummary, PricingAggregator, RejectedValue};
use serde::Serialize;

use crate::cli::PriceArgs;
use crate::error::CliError;

use super::{parse_item, CommandResult};

#[derive(Debug, Serialize)]
struct PriceResponseData {
    item: String,
    summary: MarketSummary,
    median: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    rejected: Vec<RejectedValue>,
}

pub async fn run(
    args: &PriceArgs,
    aggregator: &PricingAggregator,
) -> Result<CommandResult, CliError> {
    let item = parse_item(&args.item)?;
    let report = aggregator.aggregate(&item).await?;
    let providers = aggregator.provider_names();

    let errors = report
        .failures
        .iter()
        .map(|failure| failure.to_envelope_error())
        .collect::<Vec<_>>();
    let warning = (!errors.is_empty()).then(|| {
        format!(
            "{} of {} providers failed; summary built from the rest",
            errors.len(),
            providers.len()
        )
    });

    let data = serde_json::to_value(PriceResponseData {
        item: item.to_string(),
        summary: report.summary,
        median: report.median,
        rejected: report.rejected,
    })?;

    let mut result = CommandResult::ok(data, providers)
        .with_errors(errors)
        .with_latency(report.latency_ms);
    if let Some(warning) = warning {
        result = result.with_warning(warning);
    }

    Ok(result)
}
