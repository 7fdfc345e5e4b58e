mod cli;
mod config;
mod error;
mod prober;
mod report;
mod runner;
mod stats;
mod util;

use std::process;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

use cli::Cli;
use config::BenchConfig;
use error::BootError;
use runner::Runner;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "Fatal:".red().bold(), e);
        process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), BootError> {
    let config = BenchConfig::from_cli(cli)?;
    init_tracing(&config)?;

    if !config.color {
        colored::control::set_override(false);
    }

    let runner = Runner::new(config);
    let summary = runner.benchmark(|event| report::print_event(&event)).await?;
    report::print_summary(&summary);
    Ok(())
}

fn init_tracing(config: &BenchConfig) -> Result<(), BootError> {
    let log_level = config.get_tracing_level()?;
    let directive: Directive = format!("time_to_boot={}", log_level.as_str().to_lowercase())
        .parse()
        .map_err(|e| BootError::config(format!("log filter: {e}")))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive))
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
