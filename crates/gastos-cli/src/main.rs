//! Gastos CLI - Quick-add expense parser
//!
//! Usage:
//!   gastos parse "GrabFood 289 dinner yesterday"
//!   gastos parse "Uniqlo 430 socks" --rules rules.json
//!   gastos hints "Shell 2100 gas full tank"
//!   gastos categories

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::build_config(&cli.offset, &cli.timezone, &cli.currency, &cli.account)?;

    match cli.command {
        Commands::Parse {
            text,
            rules,
            mock_llm,
        } => commands::cmd_parse(config, &text, rules.as_deref(), mock_llm.as_deref()).await,
        Commands::Hints { text } => commands::cmd_hints(config, &text),
        Commands::Categories => commands::cmd_categories(config),
    }
}
