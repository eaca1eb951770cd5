//! CLI argument definitions using clap
//!
//! This module contains the clap structs and enums for parsing CLI
//! arguments. The actual command implementations are in the `commands`
//! module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Gastos - Turn casual spending notes into structured transactions
#[derive(Parser)]
#[command(name = "gastos")]
#[command(about = "Quick-add expense parser", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// UTC offset for date resolution (e.g. +08:00)
    #[arg(long, default_value = "+08:00", global = true)]
    pub offset: String,

    /// Timezone label forwarded to the extractor
    #[arg(long, default_value = "Asia/Manila", global = true)]
    pub timezone: String,

    /// Default currency code
    #[arg(long, default_value = "PHP", global = true)]
    pub currency: String,

    /// Default account name
    #[arg(long, default_value = "General", global = true)]
    pub account: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a quick-add phrase into a transaction candidate
    Parse {
        /// The free-text input, e.g. "GrabFood 289 dinner yesterday"
        text: String,

        /// JSON file with learned rules to match against
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Canned LLM response as inline JSON, e.g. '{"category":"Shopping"}'
        ///
        /// Stands in for a real extractor; without it the chain is
        /// rule → fallback.
        #[arg(long)]
        mock_llm: Option<String>,
    },

    /// Show the hint-table category guess for a phrase
    Hints {
        /// The free-text input
        text: String,
    },

    /// List the category whitelist
    Categories,
}
