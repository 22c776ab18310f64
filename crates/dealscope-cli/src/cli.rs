//! CLI argument definitions for dealscope.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `price` | Aggregate market summary for one item |
//! | `deal` | Aggregate, then judge an asking price |
//! | `targets` | Deal targets for a known market value |
//! | `portfolio` | Value a collection file |
//! | `sources` | List configured pricing providers |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--timeout-ms` | unset | Per-provider time budget, overrides the environment |
//! | `--simulate-latency` | `false` | Delay fixture lookups like network calls |
//!
//! Provider settings are otherwise read from `DEALSCOPE_*` environment
//! variables. Logs go to stderr and honour `RUST_LOG`.
//!
//! # Examples
//!
//! ```bash
//! dealscope price swsh4-183 --pretty
//! dealscope deal base1-4 280
//! dealscope targets 95.5 --format table
//! dealscope portfolio collection.json
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// Collectible pricing aggregation and deal evaluation.
#[derive(Debug, Parser)]
#[command(name = "dealscope", author, version, about)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Per-provider timeout in milliseconds.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Delay fixture lookups the way network calls would be.
    #[arg(long, global = true, default_value_t = false)]
    pub simulate_latency: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary.
    Table,
    /// Single JSON envelope.
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Aggregate market summary for an item.
    ///
    ///   dealscope price swsh4-183
    ///   dealscope price base1-4 --variant 1st-edition
    Price(PriceArgs),

    /// Judge an asking price against the aggregate market value.
    ///
    ///   dealscope deal base1-4 280
    Deal(DealArgs),

    /// Deal targets (80/85/90%) for a market value.
    Targets(TargetsArgs),

    /// Value the entries of a collection file.
    ///
    /// The file holds a JSON list of `{"item", "quantity", "status"}`
    /// entries; status is one of OWNED, WANTED, FOR_TRADE.
    ///
    ///   dealscope portfolio collection.json --status for-trade
    Portfolio(PortfolioArgs),

    /// List configured pricing providers.
    Sources,
}

/// Item key plus optional qualifiers.
#[derive(Debug, Args)]
pub struct ItemArgs {
    /// Item key as `<set>-<number>`, e.g. swsh4-183.
    pub item: String,

    #[arg(long)]
    pub variant: Option<String>,

    #[arg(long)]
    pub language: Option<String>,
}

#[derive(Debug, Args)]
pub struct PriceArgs {
    #[command(flatten)]
    pub item: ItemArgs,
}

#[derive(Debug, Args)]
pub struct DealArgs {
    #[command(flatten)]
    pub item: ItemArgs,

    /// Proposed transaction price, in the market's currency.
    #[arg(allow_negative_numbers = true)]
    pub asking_price: f64,
}

#[derive(Debug, Args)]
pub struct TargetsArgs {
    #[arg(allow_negative_numbers = true)]
    pub market_value: f64,
}

#[derive(Debug, Args)]
pub struct PortfolioArgs {
    /// Path to the collection file.
    pub file: PathBuf,

    /// Which collection entries to value.
    #[arg(long, value_enum, default_value_t = CollectionStatus::Owned)]
    pub status: CollectionStatus,
}

/// Collection tag of a stored entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CollectionStatus {
    #[serde(alias = "owned")]
    Owned,
    #[serde(alias = "wanted")]
    Wanted,
    #[serde(alias = "for-trade", alias = "for_trade")]
    ForTrade,
}
