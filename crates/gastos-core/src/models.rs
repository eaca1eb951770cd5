//! Domain models for Gastos

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A learned pattern→category rule
///
/// Created the first time a user overrides an LLM-suggested category for a
/// quick-add transaction; updated (hits incremented, `last_used_at`
/// refreshed) every time the same normalized pattern is learned again.
/// Patterns are unique per rule set (case-insensitive); uniqueness is
/// enforced by the upsert, not by storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: String,
    /// Lowercased, trimmed, non-empty
    pub pattern: String,
    pub category: String,
    pub hits: i64,
    pub last_used_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Upsert payload for a rule
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRule {
    pub pattern: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Intermediate field guess, before normalization
///
/// Produced by the heuristic extractor (with `category = None`), by a rule
/// match (heuristics + learned category), or by merging raw LLM fields over
/// the heuristic baseline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseCandidate {
    pub amount: Option<f64>,
    pub date: Option<String>,
    pub merchant: Option<String>,
    pub note: String,
    pub currency: String,
    pub account: String,
    pub category: Option<String>,
}

/// The final, normalized transaction candidate
///
/// Invariants after normalization: `date` matches `YYYY-MM-DD`, `amount` is
/// never negative, `category` is a whitelist member, `merchant` is never
/// empty ("Unknown" sentinel).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionCandidate {
    pub date: String,
    pub amount: f64,
    pub currency: String,
    pub account: String,
    pub category: String,
    pub merchant: String,
    pub note: String,
}

/// Which strategy produced a parse result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseSource {
    /// A learned rule matched the input text
    Rule,
    /// The external LLM extractor produced the fields
    Llm,
    /// Deterministic heuristics plus the category hint table
    Fallback,
}

impl ParseSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rule => "rule",
            Self::Llm => "llm",
            Self::Fallback => "fallback",
        }
    }
}

impl std::str::FromStr for ParseSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rule" => Ok(Self::Rule),
            "llm" => Ok(Self::Llm),
            "fallback" => Ok(Self::Fallback),
            _ => Err(format!("Unknown parse source: {}", s)),
        }
    }
}

impl std::fmt::Display for ParseSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a transaction entered the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TransactionOrigin {
    /// Entered through a structured form
    #[default]
    Manual,
    /// Entered through the natural-language quick-add path
    QuickAdd,
}

impl TransactionOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::QuickAdd => "quick-add",
        }
    }
}

impl std::str::FromStr for TransactionOrigin {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "manual" => Ok(Self::Manual),
            "quick-add" | "nl" => Ok(Self::QuickAdd),
            _ => Err(format!("Unknown transaction origin: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Metadata describing how a parse result was produced
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseMeta {
    pub source: ParseSource,
    pub suggested_category: String,
    pub matched_rule_pattern: Option<String>,
    /// Trust in the result: 1 for rule hits, extractor-reported (clamped)
    /// for LLM hits, fixed 0.45 for the heuristic fallback
    pub confidence: f64,
    /// Uncertain enough that the caller should prompt before saving
    pub needs_review: bool,
}

/// The full quick-add parse response: a best-effort transaction guess plus
/// the metadata the caller needs to decide whether to prompt the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseOutcome {
    pub transaction: TransactionCandidate,
    pub meta: ParseMeta,
}

/// Post-commit feedback handed to the rule learner
///
/// Assembled by the transaction-creation collaborator after a durable
/// create: the suggestion that produced the quick-add guess, plus what the
/// user actually saved.
#[derive(Debug, Clone)]
pub struct CorrectionFeedback {
    pub origin: TransactionOrigin,
    /// Meta of the suggestion the user started from
    pub suggestion: ParseMeta,
    /// Merchant on the saved transaction
    pub merchant: String,
    /// The raw quick-add input text
    pub raw_input: String,
    /// Category the user actually saved
    pub final_category: String,
}
