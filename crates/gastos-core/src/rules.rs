//! Learned-rule matching and the correction feedback loop
//!
//! A rule maps a lowercased text pattern to a category. Rules are born
//! from user corrections: when someone overrides an LLM-suggested category
//! on a quick-add transaction, the merchant (or first word of the input)
//! becomes a pattern so the next parse skips the LLM entirely.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::Result;
use crate::models::{CorrectionFeedback, NewRule, ParseSource, Rule, TransactionOrigin};
use crate::store::Store;

/// Find the best matching rule for an input text
///
/// Matching is case-insensitive substring containment of the rule pattern
/// within the text. When several rules match, the longest pattern wins
/// (ties broken by original rule order), so more specific learned patterns
/// beat generic ones.
pub fn find_match<'a>(rules: &'a [Rule], text: &str) -> Option<&'a Rule> {
    let normalized_text = text.to_lowercase();

    let mut ordered: Vec<&Rule> = rules.iter().collect();
    ordered.sort_by(|a, b| b.pattern.len().cmp(&a.pattern.len()));

    ordered.into_iter().find(|rule| {
        let pattern = rule.pattern.trim().to_lowercase();
        !pattern.is_empty() && normalized_text.contains(&pattern)
    })
}

/// Post-commit feedback hook that turns category corrections into rules
pub struct RuleLearner {
    store: Arc<dyn Store>,
}

impl RuleLearner {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Learn from a finalized transaction, if there is anything to learn
    ///
    /// Fires only when all of these hold: the transaction came through
    /// quick-add, the suggestion that produced it came from the LLM, a
    /// suggested category was present, and the user saved a different
    /// category. Anything else is a silent no-op; a store failure is not.
    pub async fn maybe_learn(
        &self,
        feedback: &CorrectionFeedback,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if feedback.origin != TransactionOrigin::QuickAdd {
            return Ok(());
        }
        if feedback.suggestion.source != ParseSource::Llm {
            return Ok(());
        }

        let suggested = feedback.suggestion.suggested_category.trim();
        if suggested.is_empty() || suggested == feedback.final_category {
            return Ok(());
        }

        let pattern = match derive_pattern(&feedback.merchant, &feedback.raw_input) {
            Some(pattern) => pattern,
            None => {
                debug!(raw_input = %feedback.raw_input, "No learnable pattern, skipping");
                return Ok(());
            }
        };

        debug!(
            pattern = %pattern,
            category = %feedback.final_category,
            "Learning correction rule"
        );

        self.store
            .upsert_rule(&NewRule {
                pattern,
                category: feedback.final_category.clone(),
                created_at: now,
                updated_at: now,
            })
            .await?;

        Ok(())
    }
}

/// Derive the rule pattern for a correction
///
/// Lowercased merchant unless it is empty or the "Unknown" sentinel;
/// otherwise the first token of the raw input that contains a letter.
fn derive_pattern(merchant: &str, raw_input: &str) -> Option<String> {
    let normalized = merchant.trim().to_lowercase();
    if !normalized.is_empty() && normalized != "unknown" {
        return Some(normalized);
    }

    raw_input
        .split_whitespace()
        .map(|token| token.to_lowercase())
        .find(|token| token.chars().any(|c| c.is_ascii_alphabetic()))
}
