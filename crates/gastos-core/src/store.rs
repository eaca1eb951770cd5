//! Rule persistence contract and the in-memory reference store
//!
//! The core never talks to a spreadsheet or file API directly; callers
//! inject whatever `Store` implementation backs their deployment. The
//! bundled `MemoryStore` is used by tests and the CLI.

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{NewRule, Rule};

/// Persistence collaborator for learned rules
///
/// `upsert_rule` must be atomic per normalized pattern: "find existing
/// pattern, then increment-or-create" is a read-modify-write, and two
/// concurrent learners hitting the same pattern must not produce duplicate
/// rows or lose a hit count. Implementations without native compare-and-swap
/// semantics should serialize upserts (the in-memory store holds a single
/// write lock across the whole operation).
#[async_trait]
pub trait Store: Send + Sync {
    async fn list_rules(&self) -> Result<Vec<Rule>>;

    /// Create or update the rule for `new_rule.pattern`
    ///
    /// The pattern is normalized (trimmed, lowercased) here; an existing
    /// rule with the same normalized pattern gets its category replaced,
    /// `hits` incremented and `last_used_at` refreshed. Returns `None` when
    /// the pattern normalizes to an empty string.
    async fn upsert_rule(&self, new_rule: &NewRule) -> Result<Option<Rule>>;
}

/// In-memory rule store
///
/// A single async mutex guards the rule vector, so upserts are serialized
/// and the same-pattern race cannot occur in-process.
#[derive(Default)]
pub struct MemoryStore {
    rules: Mutex<Vec<Rule>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing rules (tests, CLI `--rules` files)
    pub fn with_rules(rules: Vec<Rule>) -> Self {
        Self {
            rules: Mutex::new(rules),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_rules(&self) -> Result<Vec<Rule>> {
        Ok(self.rules.lock().await.clone())
    }

    async fn upsert_rule(&self, new_rule: &NewRule) -> Result<Option<Rule>> {
        let pattern = new_rule.pattern.trim().to_lowercase();
        if pattern.is_empty() {
            return Ok(None);
        }

        let mut rules = self.rules.lock().await;

        if let Some(existing) = rules
            .iter_mut()
            .find(|rule| rule.pattern.to_lowercase() == pattern)
        {
            existing.category = new_rule.category.clone();
            existing.hits += 1;
            existing.last_used_at = new_rule.updated_at;
            return Ok(Some(existing.clone()));
        }

        let rule = Rule {
            id: Uuid::new_v4().to_string(),
            pattern,
            category: new_rule.category.clone(),
            hits: 1,
            last_used_at: new_rule.updated_at,
            created_at: new_rule.created_at,
        };
        rules.push(rule.clone());
        Ok(Some(rule))
    }
}
