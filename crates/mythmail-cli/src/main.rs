use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod cli_command_handlers;
mod cli_config;
mod cli_runtime_helpers;

pub(crate) use cli::{Cli, CliCommand};
pub(crate) use cli_command_handlers::run_cli;
pub(crate) use cli_config::{AppConfig, load_app_config};
pub(crate) use cli_runtime_helpers::{
    build_services, output_error, output_ok, read_password, summary_to_json,
};

const LOG_ENV: &str = "MYTHMAIL_LOG";

fn init_logging(verbosity: u8) -> Result<()> {
    let filter = match std::env::var(LOG_ENV) {
        Ok(filter) if !filter.trim().is_empty() => EnvFilter::try_new(filter)?,
        _ => EnvFilter::try_new(match verbosity {
            0 => "warn",
            1 => "info",
            _ => "debug",
        })?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;
    let config = load_app_config();
    let rt = tokio::runtime::Runtime::new()?;
    if let Err(err) = run_cli(&rt, cli.command, &config) {
        return output_error(&format!("{:#}", err));
    }
    Ok(())
}
