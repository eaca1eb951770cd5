//! Coercion of any candidate field set into a canonical transaction
//!
//! Whatever produced the candidate (heuristics, a learned rule, or a raw
//! LLM guess), the output honors the same invariants: non-negative amount,
//! `YYYY-MM-DD` date, whitelisted category, non-empty merchant.

use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset};
use regex::Regex;
use serde_json::Value;

use crate::config::{DEFAULT_ACCOUNT, DEFAULT_CURRENCY};
use crate::models::{ParseCandidate, TransactionCandidate};

fn iso_date_shape() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("static pattern"))
}

/// Coerce a candidate into a canonical, whitelist-validated transaction
pub fn normalize(
    candidate: ParseCandidate,
    categories: &[String],
    now: DateTime<FixedOffset>,
) -> TransactionCandidate {
    let amount = match candidate.amount {
        Some(amount) if amount.is_finite() && amount > 0.0 => amount,
        _ => 0.0,
    };

    let merchant = candidate
        .merchant
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or("Unknown")
        .to_string();

    let note = candidate.note.trim().to_string();

    let currency = {
        let trimmed = candidate.currency.trim();
        if trimmed.is_empty() {
            DEFAULT_CURRENCY.to_string()
        } else {
            trimmed.to_uppercase()
        }
    };

    let account = {
        let trimmed = candidate.account.trim();
        if trimmed.is_empty() {
            DEFAULT_ACCOUNT.to_string()
        } else {
            trimmed.to_string()
        }
    };

    let date = candidate
        .date
        .as_deref()
        .map(str::trim)
        .filter(|d| iso_date_shape().is_match(d))
        .map(|d| d.to_string())
        .unwrap_or_else(|| now.format("%Y-%m-%d").to_string());

    let category = normalize_category(candidate.category.as_deref(), categories);

    TransactionCandidate {
        date,
        amount,
        currency,
        account,
        category,
        merchant,
        note,
    }
}

/// Force a category guess onto the whitelist
///
/// Exact member first, then a loose case-insensitive match, then the
/// literal "Miscellaneous" if whitelisted, else the first entry.
pub fn normalize_category(guess: Option<&str>, categories: &[String]) -> String {
    let guess = guess.map(str::trim).unwrap_or("");

    let mut category = guess.to_string();
    if category.is_empty() || !categories.iter().any(|c| c == &category) {
        category = match_category_loose(&category, categories)
            .unwrap_or("Miscellaneous")
            .to_string();
        if !categories.iter().any(|c| c == &category) {
            category = categories.first().cloned().unwrap_or(category);
        }
    }

    category
}

/// Case-insensitive exact match, then substring containment of the guess
/// within a whitelist entry. The containment leg can surprise for very
/// short guesses; it is kept to match the established behavior.
fn match_category_loose<'a>(guess: &str, categories: &'a [String]) -> Option<&'a str> {
    if guess.is_empty() {
        return None;
    }
    let lower = guess.to_lowercase();

    categories
        .iter()
        .find(|c| c.to_lowercase() == lower)
        .or_else(|| categories.iter().find(|c| c.to_lowercase().contains(&lower)))
        .map(|c| c.as_str())
}

/// Coerce a raw JSON value into an amount: numbers pass through, strings
/// are parsed after stripping thousands separators, anything else is None.
pub fn coerce_amount(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned = s.replace(',', "");
            let cleaned = cleaned.trim();
            cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
        }
        _ => None,
    }
}

/// Coerce a raw JSON value into a trimmed string; null and non-scalar
/// values become empty.
pub fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// JavaScript-style truthiness for loosely typed extractor flags
pub fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
        Value::Null => false,
    }
}
