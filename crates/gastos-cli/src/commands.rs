//! Command implementations for the Gastos CLI

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use gastos_core::{
    config::parse_utc_offset, CategoryHintTable, MemoryStore, MockExtractor, QuickAddConfig,
    QuickAddOrchestrator, Rule,
};

/// Build the core configuration from the global CLI flags
pub fn build_config(
    offset: &str,
    timezone: &str,
    currency: &str,
    account: &str,
) -> Result<QuickAddConfig> {
    let utc_offset = parse_utc_offset(offset).context("Invalid --offset")?;

    Ok(QuickAddConfig {
        utc_offset,
        timezone_label: timezone.to_string(),
        currency: currency.to_string(),
        account: account.to_string(),
        ..QuickAddConfig::default()
    })
}

pub async fn cmd_parse(
    config: QuickAddConfig,
    text: &str,
    rules_path: Option<&Path>,
    mock_llm: Option<&str>,
) -> Result<()> {
    let rules = match rules_path {
        Some(path) => load_rules(path)?,
        None => Vec::new(),
    };
    tracing::debug!(rule_count = rules.len(), "Loaded rule set");

    let store = Arc::new(MemoryStore::with_rules(rules));
    let mut orchestrator = QuickAddOrchestrator::new(store, config);

    if let Some(raw) = mock_llm {
        let value: serde_json::Value =
            serde_json::from_str(raw).context("Invalid --mock-llm JSON")?;
        orchestrator = orchestrator.with_extractor(Arc::new(MockExtractor::responding(value)));
    }

    let outcome = orchestrator.parse(text).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    Ok(())
}

pub fn cmd_hints(config: QuickAddConfig, text: &str) -> Result<()> {
    let hints = CategoryHintTable::new();
    let guess = hints.guess(text, config.preferred_default_category());
    println!("{}", guess);
    Ok(())
}

pub fn cmd_categories(config: QuickAddConfig) -> Result<()> {
    for category in &config.categories {
        println!("{}", category);
    }
    Ok(())
}

fn load_rules(path: &Path) -> Result<Vec<Rule>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rules file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Invalid rules JSON in {}", path.display()))
}
