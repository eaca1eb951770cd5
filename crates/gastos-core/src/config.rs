//! Caller-injected configuration for the quick-add core
//!
//! The category whitelist and timezone are owned by the caller, not by this
//! crate; the defaults here match the reference deployment (Philippine
//! peso, UTC+8).

use std::time::Duration;

use chrono::{DateTime, FixedOffset, Utc};

use crate::error::{Error, Result};

/// Category whitelist used when the caller does not supply one
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Food & Dining",
    "Groceries",
    "Transportation",
    "Shopping",
    "Utilities",
    "Health",
    "Entertainment",
    "Education",
    "Travel",
    "Bills & Fees",
    "Personal Care",
    "Transfer",
    "Income",
    "Miscellaneous",
];

pub const DEFAULT_CURRENCY: &str = "PHP";
pub const DEFAULT_ACCOUNT: &str = "General";

/// Configuration injected into the orchestrator and learner
#[derive(Debug, Clone)]
pub struct QuickAddConfig {
    /// Closed set of valid categories; every candidate category is
    /// normalized against this list
    pub categories: Vec<String>,
    /// UTC offset in which "now", "yesterday" and weekday names resolve
    pub utc_offset: FixedOffset,
    /// Human-readable timezone label forwarded to the LLM extractor
    pub timezone_label: String,
    pub currency: String,
    pub account: String,
    /// Upper bound on a single LLM extractor call; a timeout degrades to
    /// the heuristic fallback like any other extractor failure
    pub llm_timeout: Duration,
}

impl Default for QuickAddConfig {
    fn default() -> Self {
        Self {
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            utc_offset: FixedOffset::east_opt(8 * 3600).expect("static offset in range"),
            timezone_label: "Asia/Manila".to_string(),
            currency: DEFAULT_CURRENCY.to_string(),
            account: DEFAULT_ACCOUNT.to_string(),
            llm_timeout: Duration::from_secs(10),
        }
    }
}

impl QuickAddConfig {
    /// Current instant shifted into the configured offset
    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.utc_offset)
    }

    /// The category preferred when nothing else matches: "Miscellaneous"
    /// if whitelisted, else the first whitelist entry.
    pub fn preferred_default_category(&self) -> &str {
        self.categories
            .iter()
            .find(|c| c.as_str() == "Miscellaneous")
            .or_else(|| self.categories.first())
            .map(|c| c.as_str())
            .unwrap_or("Miscellaneous")
    }
}

/// Parse a `+08:00` / `-05:30` style UTC offset string
pub fn parse_utc_offset(value: &str) -> Result<FixedOffset> {
    let value = value.trim();
    let (sign, rest) = match value.as_bytes().first() {
        Some(b'+') => (1, &value[1..]),
        Some(b'-') => (-1, &value[1..]),
        _ => (1, value),
    };

    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None => (rest, "0"),
    };

    let hours: i32 = hours
        .parse()
        .map_err(|_| Error::Validation(format!("invalid UTC offset: {}", value)))?;
    let minutes: i32 = minutes
        .parse()
        .map_err(|_| Error::Validation(format!("invalid UTC offset: {}", value)))?;

    let seconds = sign * (hours * 3600 + minutes * 60);
    FixedOffset::east_opt(seconds)
        .ok_or_else(|| Error::Validation(format!("UTC offset out of range: {}", value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = QuickAddConfig::default();
        assert_eq!(config.currency, "PHP");
        assert_eq!(config.account, "General");
        assert_eq!(config.utc_offset.local_minus_utc(), 8 * 3600);
        assert!(config.categories.iter().any(|c| c == "Food & Dining"));
    }

    #[test]
    fn test_preferred_default_category() {
        let config = QuickAddConfig::default();
        assert_eq!(config.preferred_default_category(), "Miscellaneous");

        let narrow = QuickAddConfig {
            categories: vec!["Essentials".to_string(), "Fun".to_string()],
            ..QuickAddConfig::default()
        };
        assert_eq!(narrow.preferred_default_category(), "Essentials");
    }

    #[test]
    fn test_parse_utc_offset() {
        assert_eq!(
            parse_utc_offset("+08:00").unwrap().local_minus_utc(),
            8 * 3600
        );
        assert_eq!(
            parse_utc_offset("-05:30").unwrap().local_minus_utc(),
            -(5 * 3600 + 30 * 60)
        );
        assert_eq!(parse_utc_offset("8").unwrap().local_minus_utc(), 8 * 3600);
        assert!(parse_utc_offset("what").is_err());
        assert!(parse_utc_offset("+99:00").is_err());
    }
}
