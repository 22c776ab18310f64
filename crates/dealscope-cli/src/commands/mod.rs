mod deal;
mod portfolio;
mod price;
mod sources;
mod targets;

use dealscope_core::{
    Envelope, EnvelopeError, EnvelopeMeta, ItemIdentity, PricingAggregator,
    PricingAggregatorBuilder, PricingConfig, ValidationError,
};
use serde_json::Value;
use uuid::Uuid;

use crate::cli::{Cli, Command, ItemArgs};
use crate::error::CliError;

pub struct CommandResult {
    pub data: Value,
    pub warnings: Vec<String>,
    pub errors: Vec<EnvelopeError>,
    pub latency_ms: u64,
    pub source_chain: Vec<String>,
}

impl CommandResult {
    pub fn ok(data: Value, source_chain: Vec<String>) -> Self {
        Self {
            data,
            warnings: Vec::new(),
            errors: Vec::new(),
            latency_ms: 0,
            source_chain,
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_errors(mut self, errors: Vec<EnvelopeError>) -> Self {
        self.errors.extend(errors);
        self
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }
}

pub async fn run(cli: &Cli) -> Result<Envelope<Value>, CliError> {
    let command_result = match &cli.command {
        Command::Price(args) => price::run(args, &build_aggregator(cli)?).await?,
        Command::Deal(args) => deal::run(args, &build_aggregator(cli)?).await?,
        Command::Targets(args) => targets::run(args)?,
        Command::Portfolio(args) => portfolio::run(args, &build_aggregator(cli)?).await?,
        Command::Sources => {
            let config = load_config(cli)?;
            let aggregator = PricingAggregatorBuilder::from_config(&config)?.build();
            sources::run(&aggregator, &config)?
        }
    };

    let CommandResult {
        data,
        warnings,
        errors,
        latency_ms,
        source_chain,
    } = command_result;

    let mut meta =
        EnvelopeMeta::new(Uuid::new_v4().to_string(), source_chain).with_latency(latency_ms);
    for warning in warnings {
        meta.push_warning(warning);
    }

    Ok(Envelope::new(meta, data).with_errors(errors))
}

/// Environment configuration with command-line overrides applied.
fn load_config(cli: &Cli) -> Result<PricingConfig, CliError> {
    let mut config = PricingConfig::from_env()?;
    if let Some(timeout_ms) = cli.timeout_ms {
        config.provider_timeout_ms = Some(timeout_ms);
    }
    if cli.simulate_latency {
        config.simulate_latency = true;
    }
    config.validate()?;
    Ok(config)
}

fn build_aggregator(cli: &Cli) -> Result<PricingAggregator, CliError> {
    let config = load_config(cli)?;
    Ok(PricingAggregatorBuilder::from_config(&config)?.build())
}

fn parse_item(args: &ItemArgs) -> Result<ItemIdentity, ValidationError> {
    let mut item = ItemIdentity::parse(&args.item)?;
    if let Some(variant) = &args.variant {
        item = item.with_variant(variant)?;
    }
    if let Some(language) = &args.language {
        item = item.with_language(language)?;
    }
    Ok(item)
}
