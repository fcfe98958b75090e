mod cli;
mod commands;
mod terminal;

use anyhow::Result;
use clap::Parser;

use crate::cli::{CliArgs, Command};
use crate::terminal::Terminal;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    cellscope_core::config::load_dotenv();
    let config = cellscope_core::Config::from_env();
    let terminal = Terminal::new();

    match args.command {
        Command::Scan(scan) => commands::scan(&config, scan, &terminal).await,
        Command::History(cmd) => commands::history(&config, cmd, &terminal),
        Command::Suggest(suggest) => commands::suggest(&config, suggest, &terminal).await,
    }
}
