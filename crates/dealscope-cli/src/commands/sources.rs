use dealscope_core::{PricingAggregator, PricingConfig, ProviderId};
use serde::Serialize;

use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct ProviderEntry {
    name: String,
    position: usize,
    fixtures: &'static str,
}

#[derive(Debug, Serialize)]
struct SourcesResponseData {
    providers: Vec<ProviderEntry>,
    outlier_threshold: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    provider_timeout_ms: Option<u64>,
    simulate_latency: bool,
}

pub fn run(
    aggregator: &PricingAggregator,
    config: &PricingConfig,
) -> Result<CommandResult, CliError> {
    let providers = config
        .providers
        .iter()
        .zip(aggregator.provider_names())
        .enumerate()
        .map(|(position, (id, name))| {
            let custom = match id {
                ProviderId::Tcgplayer => config.tcgplayer_fixtures.is_some(),
                ProviderId::Ebay => config.ebay_fixtures.is_some(),
            };
            ProviderEntry {
                name,
                position,
                fixtures: if custom { "file" } else { "bundled" },
            }
        })
        .collect::<Vec<_>>();

    let data = serde_json::to_value(SourcesResponseData {
        providers,
        outlier_threshold: aggregator.outlier_threshold(),
        provider_timeout_ms: config.provider_timeout_ms,
        simulate_latency: config.simulate_latency,
    })?;

    Ok(CommandResult::ok(data, aggregator.provider_names()))
}
