use std::path::PathBuf;

use clap::Parser;

/// Resolve the freshest available quote for a ticker and print it as JSON.
#[derive(Debug, Parser)]
#[command(name = "quotefall", version, about)]
pub struct Cli {
    /// Ticker symbol. Four-digit numeric symbols are treated as
    /// Taiwan-listed and get the exchange suffix appended.
    pub ticker: String,

    /// Replace revenue and holdings with a simulated order-flow series.
    #[arg(long)]
    pub chip: bool,

    /// Stamp timestamps in the system's local offset instead of UTC+8.
    #[arg(long)]
    pub local_time: bool,

    /// Serve deterministic offline data instead of calling the upstream API.
    #[arg(long)]
    pub mock: bool,

    /// Pretty-print the JSON report.
    #[arg(long)]
    pub pretty: bool,

    /// Directory for persisted upstream session state.
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Per-request timeout in milliseconds.
    #[arg(long, value_name = "MS", default_value_t = 10_000)]
    pub timeout_ms: u64,
}
