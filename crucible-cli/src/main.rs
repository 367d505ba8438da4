//! Entry point for the `crucible` binary.

use clap::Parser;
use crucible_cli::{execute, Cli, CliError};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("crucible=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "command failed");
            e.exit_code()
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<i32, CliError> {
    let config = cli.limits.resolve()?;
    let outcome = execute(cli.command, config).await?;
    println!("{}", serde_json::to_string_pretty(&outcome.report)?);
    Ok(outcome.exit_code())
}
