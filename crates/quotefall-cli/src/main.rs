mod cli;
mod error;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use quotefall_core::{
    DeploymentVariant, QuoteService, ServiceConfig, TimeZonePolicy, YahooConfig, YahooProvider,
};

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let yahoo_config = YahooConfig {
        cache_dir: cli.cache_dir.clone(),
        timeout_ms: Some(cli.timeout_ms),
    };
    let provider = if cli.mock {
        YahooProvider::mock()
    } else {
        YahooProvider::new(yahoo_config)
    };

    let config = ServiceConfig {
        variant: if cli.chip {
            DeploymentVariant::SimulatedChip
        } else {
            DeploymentVariant::RealFinancials
        },
        time_zone: if cli.local_time {
            TimeZonePolicy::Local
        } else {
            TimeZonePolicy::default()
        },
    };

    let service = QuoteService::new(Arc::new(provider), config);
    let report = service.resolve_quote(&cli.ticker).await?;

    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{rendered}");

    Ok(())
}
