use dealscope_core::{compute_deal_targets, DealTargets, DealTier};
use serde::Serialize;

use crate::cli::TargetsArgs;
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct TargetsResponseData {
    market_value: f64,
    #[serde(flatten)]
    targets: DealTargets,
    tiers: [DealTier; 3],
}

pub fn run(args: &TargetsArgs) -> Result<CommandResult, CliError> {
    let targets = compute_deal_targets(args.market_value);

    let data = serde_json::to_value(TargetsResponseData {
        market_value: args.market_value,
        targets,
        tiers: targets.tiers(),
    })?;

    let result = CommandResult::ok(data, Vec::new());
    if !args.market_value.is_finite() || args.market_value <= 0.0 {
        return Ok(result.with_warning("market value is not positive; all targets are zero"));
    }

    Ok(result)
}
