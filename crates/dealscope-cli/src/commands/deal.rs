use dealscope_core::{evaluate_deal, DealEvaluation, DealTier, PricingAggregator, Verdict};
use serde::Serialize;

use crate::cli::DealArgs;
use crate::error::CliError;

use super::{parse_item, CommandResult};

#[derive(Debug, Serialize)]
struct DealResponseData {
    item: String,
    asking_price: f64,
    market: f64,
    currency: String,
    #[serde(flatten)]
    evaluation: DealEvaluation,
    tiers: [DealTier; 3],
}

pub async fn run(
    args: &DealArgs,
    aggregator: &PricingAggregator,
) -> Result<CommandResult, CliError> {
    let item = parse_item(&args.item)?;
    let report = aggregator.aggregate(&item).await?;
    let evaluation = evaluate_deal(args.asking_price, &report.summary);
    let unknown = evaluation.verdict.verdict == Verdict::Unknown;

    let data = serde_json::to_value(DealResponseData {
        item: item.to_string(),
        asking_price: args.asking_price,
        market: report.summary.market,
        currency: report.summary.currency.clone(),
        tiers: evaluation.targets.tiers(),
        evaluation,
    })?;

    let mut result = CommandResult::ok(data, aggregator.provider_names())
        .with_errors(
            report
                .failures
                .iter()
                .map(|failure| failure.to_envelope_error())
                .collect(),
        )
        .with_latency(report.latency_ms);

    if unknown {
        result = result.with_warning("no recommendation could be made; see reason");
    }

    Ok(result)
}
