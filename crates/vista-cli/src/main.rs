use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use vista_cli::cli::{Cli, Commands};
use vista_cli::commands;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG, when set, overrides the command line
    let env_filter = EnvFilter::builder()
        .with_default_directive(cli.level_filter().into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Serve { config, addr } => commands::serve::execute(&config, addr).await,
        Commands::Query {
            config,
            widget,
            params,
        } => commands::query::execute(&config, &widget, &params).await,
    }
}
