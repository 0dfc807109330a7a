mod cli;
mod error;
mod providers;
mod repository;
mod status;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    env_logger::init();

    let cli = Cli::parse();
    info!("Starting Travis branch status check");
    let status = cli.execute(&mut std::io::stdout().lock()).await?;

    Ok(ExitCode::from(status.exit_code(cli.fail_on_error)))
}
