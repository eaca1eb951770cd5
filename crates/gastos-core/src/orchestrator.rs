//! The quick-add priority chain: learned rule → LLM → heuristic fallback
//!
//! The three outcomes are mutually exclusive per request. A rule hit never
//! invokes the LLM; an LLM failure (error, timeout, non-object payload) is
//! recovered silently and degrades to the hint-table fallback. The caller
//! always gets a best-effort transaction plus a confidence signal, never
//! "the AI failed".

use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::QuickAddConfig;
use crate::error::{Error, Result};
use crate::extract::{ExtractRequest, TextExtractor};
use crate::heuristics::HeuristicExtractor;
use crate::hints::CategoryHintTable;
use crate::models::{ParseCandidate, ParseMeta, ParseOutcome, ParseSource, Rule};
use crate::normalize::{coerce_amount, coerce_bool, coerce_string, normalize};
use crate::rules::find_match;
use crate::store::Store;

/// Which strategy won for this request
///
/// The chain is a single ordered evaluation, not independent attempts;
/// keeping it as a tagged variant makes the precedence explicit and lets
/// the outcome be assembled in one place.
enum Resolution {
    RuleHit(Rule),
    LlmHit(Map<String, Value>),
    Fallback,
}

pub struct QuickAddOrchestrator {
    store: Arc<dyn Store>,
    extractor: Option<Arc<dyn TextExtractor>>,
    config: QuickAddConfig,
    heuristics: HeuristicExtractor,
    hints: CategoryHintTable,
}

impl QuickAddOrchestrator {
    pub fn new(store: Arc<dyn Store>, config: QuickAddConfig) -> Self {
        let heuristics = HeuristicExtractor::new(&config.currency, &config.account);
        Self {
            store,
            extractor: None,
            config,
            heuristics,
            hints: CategoryHintTable::new(),
        }
    }

    /// Attach an LLM extractor; without one the chain is rule → fallback
    pub fn with_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// Parse a quick-add phrase into a transaction candidate plus metadata
    ///
    /// Fails only on empty input or a store failure; extractor trouble is
    /// absorbed into the fallback branch.
    pub async fn parse(&self, input: &str) -> Result<ParseOutcome> {
        let text = input.trim();
        if text.is_empty() {
            return Err(Error::Validation("text is required".into()));
        }

        let now = self.config.now();
        let baseline = self.heuristics.extract(text, now);

        let rules = self.store.list_rules().await?;

        let resolution = match find_match(&rules, text) {
            Some(rule) => {
                debug!(pattern = %rule.pattern, "Learned rule matched");
                Resolution::RuleHit(rule.clone())
            }
            None => match self.invoke_extractor(text, now).await {
                Some(fields) => Resolution::LlmHit(fields),
                None => Resolution::Fallback,
            },
        };

        Ok(self.assemble(text, baseline, resolution, now))
    }

    /// Call the extractor under the configured timeout, folding every
    /// failure mode into "unavailable"
    async fn invoke_extractor(
        &self,
        text: &str,
        now: DateTime<FixedOffset>,
    ) -> Option<Map<String, Value>> {
        let extractor = self.extractor.as_ref()?;

        let request = ExtractRequest {
            text: text.to_string(),
            today: now.format("%Y-%m-%d").to_string(),
            categories: self.config.categories.clone(),
            timezone: self.config.timezone_label.clone(),
        };

        match tokio::time::timeout(self.config.llm_timeout, extractor.extract(&request)).await {
            Ok(Ok(Value::Object(fields))) => Some(fields),
            Ok(Ok(other)) => {
                warn!("LLM extractor returned a non-object payload: {}", other);
                None
            }
            Ok(Err(err)) => {
                warn!("LLM extractor failed: {}", err);
                None
            }
            Err(_) => {
                warn!(
                    "LLM extractor timed out after {:?}",
                    self.config.llm_timeout
                );
                None
            }
        }
    }

    fn assemble(
        &self,
        text: &str,
        baseline: ParseCandidate,
        resolution: Resolution,
        now: DateTime<FixedOffset>,
    ) -> ParseOutcome {
        match resolution {
            Resolution::RuleHit(rule) => {
                let candidate = ParseCandidate {
                    category: Some(rule.category.clone()),
                    ..baseline
                };
                let transaction = normalize(candidate, &self.config.categories, now);

                ParseOutcome {
                    transaction,
                    meta: ParseMeta {
                        source: ParseSource::Rule,
                        suggested_category: rule.category,
                        matched_rule_pattern: Some(rule.pattern),
                        confidence: 1.0,
                        needs_review: false,
                    },
                }
            }

            Resolution::LlmHit(fields) => {
                let needs_review = llm_needs_review(&fields);
                let confidence = clamp_confidence(fields.get("confidence"));
                let candidate = merge_llm_fields(baseline, &fields);
                let transaction = normalize(candidate, &self.config.categories, now);

                ParseOutcome {
                    meta: ParseMeta {
                        source: ParseSource::Llm,
                        suggested_category: transaction.category.clone(),
                        matched_rule_pattern: None,
                        confidence,
                        needs_review,
                    },
                    transaction,
                }
            }

            Resolution::Fallback => {
                let fallback_category = self
                    .hints
                    .guess(text, self.config.preferred_default_category())
                    .to_string();
                let candidate = ParseCandidate {
                    category: Some(fallback_category.clone()),
                    ..baseline
                };
                let transaction = normalize(candidate, &self.config.categories, now);
                let needs_review = transaction.amount <= 0.0 || transaction.merchant == "Unknown";

                ParseOutcome {
                    transaction,
                    meta: ParseMeta {
                        source: ParseSource::Fallback,
                        suggested_category: fallback_category,
                        matched_rule_pattern: None,
                        confidence: 0.45,
                        needs_review,
                    },
                }
            }
        }
    }
}

/// Merge raw LLM fields over the heuristic baseline
///
/// Override happens by key presence (JSON-spread semantics): an explicit
/// null wipes the heuristic value rather than preserving it.
fn merge_llm_fields(mut candidate: ParseCandidate, fields: &Map<String, Value>) -> ParseCandidate {
    if let Some(value) = fields.get("amount") {
        candidate.amount = coerce_amount(value);
    }
    if let Some(value) = fields.get("date") {
        candidate.date = Some(coerce_string(value));
    }
    if let Some(value) = fields.get("merchant") {
        candidate.merchant = Some(coerce_string(value));
    }
    if let Some(value) = fields.get("note") {
        candidate.note = coerce_string(value);
    }
    if candidate.note.is_empty() {
        if let Some(value) = fields.get("notes") {
            let notes = coerce_string(value);
            if !notes.is_empty() {
                candidate.note = notes;
            }
        }
    }
    if let Some(value) = fields.get("currency") {
        candidate.currency = coerce_string(value);
    }
    if let Some(value) = fields.get("account") {
        candidate.account = coerce_string(value);
    }
    if let Some(value) = fields.get("category") {
        candidate.category = Some(coerce_string(value));
    }

    candidate
}

/// Clamp an extractor-reported confidence into [0, 1]
///
/// A missing or unparsable value defaults to 0.8; an explicit null is
/// taken at face value as zero.
fn clamp_confidence(value: Option<&Value>) -> f64 {
    let num = match value {
        None => return 0.8,
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
        Some(Value::Null) => Some(0.0),
        Some(_) => None,
    };

    match num {
        Some(n) if n.is_finite() => n.clamp(0.0, 1.0),
        _ => 0.8,
    }
}

/// `needs_review`, with the camelCase spelling accepted as a fallback key
fn llm_needs_review(fields: &Map<String, Value>) -> bool {
    match fields.get("needs_review") {
        Some(value) if !value.is_null() => coerce_bool(value),
        _ => fields.get("needsReview").map(coerce_bool).unwrap_or(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{MockBehavior, MockExtractor};
    use crate::models::{NewRule, TransactionOrigin};
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::time::Duration;

    fn config() -> QuickAddConfig {
        QuickAddConfig::default()
    }

    async fn store_with_rule(pattern: &str, category: &str) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        let now = Utc::now();
        store
            .upsert_rule(&NewRule {
                pattern: pattern.to_string(),
                category: category.to_string(),
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
        store
    }

    struct FailingStore;

    #[async_trait]
    impl Store for FailingStore {
        async fn list_rules(&self) -> Result<Vec<Rule>> {
            Err(Error::Store("sheet unavailable".into()))
        }

        async fn upsert_rule(&self, _new_rule: &NewRule) -> Result<Option<Rule>> {
            Err(Error::Store("sheet unavailable".into()))
        }
    }

    #[tokio::test]
    async fn test_empty_text_is_a_validation_error() {
        let orchestrator = QuickAddOrchestrator::new(Arc::new(MemoryStore::new()), config());
        for input in ["", "   ", "\n\t"] {
            match orchestrator.parse(input).await {
                Err(Error::Validation(_)) => {}
                other => panic!("expected validation error, got {:?}", other.map(|o| o.meta)),
            }
        }
    }

    #[tokio::test]
    async fn test_rule_hit_never_invokes_llm() {
        let store = store_with_rule("grabfood", "Food & Dining").await;
        let extractor = Arc::new(MockExtractor::responding(
            serde_json::json!({"category": "Shopping"}),
        ));
        let orchestrator =
            QuickAddOrchestrator::new(store, config()).with_extractor(extractor.clone());

        let outcome = orchestrator.parse("GrabFood 289 dinner yesterday").await.unwrap();

        assert_eq!(outcome.meta.source, ParseSource::Rule);
        assert_eq!(outcome.meta.confidence, 1.0);
        assert!(!outcome.meta.needs_review);
        assert_eq!(outcome.meta.matched_rule_pattern.as_deref(), Some("grabfood"));
        assert_eq!(outcome.transaction.category, "Food & Dining");
        assert_eq!(outcome.transaction.amount, 289.0);
        assert_eq!(extractor.calls(), 0);
    }

    #[tokio::test]
    async fn test_longest_rule_pattern_wins() {
        let store = store_with_rule("grab", "Transportation").await;
        let now = Utc::now();
        store
            .upsert_rule(&NewRule {
                pattern: "grabfood".to_string(),
                category: "Food & Dining".to_string(),
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();

        let orchestrator = QuickAddOrchestrator::new(store, config());
        let outcome = orchestrator.parse("grabfood 289 dinner").await.unwrap();

        assert_eq!(outcome.meta.matched_rule_pattern.as_deref(), Some("grabfood"));
        assert_eq!(outcome.transaction.category, "Food & Dining");
    }

    #[tokio::test]
    async fn test_llm_hit_merges_over_baseline() {
        let extractor = Arc::new(MockExtractor::responding(serde_json::json!({
            "amount": 430,
            "date": "2026-02-24",
            "merchant": "Uniqlo",
            "category": "Shopping",
            "note": "socks",
            "currency": "php",
            "account": "Card",
            "confidence": 0.86,
            "needs_review": false,
        })));
        let orchestrator = QuickAddOrchestrator::new(Arc::new(MemoryStore::new()), config())
            .with_extractor(extractor);

        let outcome = orchestrator
            .parse("Spent 430 at Uniqlo for socks yesterday")
            .await
            .unwrap();

        assert_eq!(outcome.meta.source, ParseSource::Llm);
        assert_eq!(outcome.meta.confidence, 0.86);
        assert!(!outcome.meta.needs_review);
        assert_eq!(outcome.meta.matched_rule_pattern, None);
        assert_eq!(outcome.meta.suggested_category, "Shopping");
        assert_eq!(outcome.transaction.merchant, "Uniqlo");
        assert_eq!(outcome.transaction.category, "Shopping");
        assert_eq!(outcome.transaction.currency, "PHP");
        assert_eq!(outcome.transaction.account, "Card");
        assert_eq!(outcome.transaction.date, "2026-02-24");
        assert_eq!(outcome.transaction.note, "socks");
    }

    #[tokio::test]
    async fn test_llm_partial_fields_keep_heuristic_baseline() {
        // Only a category comes back; amount/date/merchant stay heuristic
        let extractor = Arc::new(MockExtractor::responding(
            serde_json::json!({"category": "shopping"}),
        ));
        let orchestrator = QuickAddOrchestrator::new(Arc::new(MemoryStore::new()), config())
            .with_extractor(extractor);

        let outcome = orchestrator.parse("Uniqlo 430 socks").await.unwrap();

        assert_eq!(outcome.meta.source, ParseSource::Llm);
        // Case-insensitive whitelist coercion
        assert_eq!(outcome.transaction.category, "Shopping");
        assert_eq!(outcome.transaction.amount, 430.0);
        assert_eq!(outcome.transaction.merchant, "Uniqlo socks");
        // Missing confidence defaults to 0.8
        assert_eq!(outcome.meta.confidence, 0.8);
    }

    #[tokio::test]
    async fn test_llm_confidence_clamped() {
        let extractor = Arc::new(MockExtractor::responding(
            serde_json::json!({"confidence": 1.7, "needs_review": 1}),
        ));
        let orchestrator = QuickAddOrchestrator::new(Arc::new(MemoryStore::new()), config())
            .with_extractor(extractor);

        let outcome = orchestrator.parse("mystery 42").await.unwrap();

        assert_eq!(outcome.meta.confidence, 1.0);
        assert!(outcome.meta.needs_review);
    }

    #[tokio::test]
    async fn test_llm_unknown_category_coerces_to_miscellaneous() {
        let extractor = Arc::new(MockExtractor::responding(
            serde_json::json!({"category": "Cryptocurrency"}),
        ));
        let orchestrator = QuickAddOrchestrator::new(Arc::new(MemoryStore::new()), config())
            .with_extractor(extractor);

        let outcome = orchestrator.parse("mystery 42").await.unwrap();
        assert_eq!(outcome.transaction.category, "Miscellaneous");
        assert_eq!(outcome.meta.suggested_category, "Miscellaneous");
    }

    #[tokio::test]
    async fn test_llm_failure_falls_back() {
        let extractor = Arc::new(MockExtractor::failing());
        let orchestrator = QuickAddOrchestrator::new(Arc::new(MemoryStore::new()), config())
            .with_extractor(extractor.clone());

        let outcome = orchestrator.parse("Grab taxi 150 today").await.unwrap();

        assert_eq!(outcome.meta.source, ParseSource::Fallback);
        assert_eq!(outcome.meta.confidence, 0.45);
        assert_eq!(outcome.transaction.category, "Transportation");
        assert_eq!(outcome.transaction.amount, 150.0);
        assert_eq!(extractor.calls(), 1);
    }

    #[tokio::test]
    async fn test_llm_non_object_payload_falls_back() {
        let extractor = Arc::new(MockExtractor::responding(serde_json::json!([1, 2, 3])));
        let orchestrator = QuickAddOrchestrator::new(Arc::new(MemoryStore::new()), config())
            .with_extractor(extractor);

        let outcome = orchestrator.parse("Grab taxi 150 today").await.unwrap();
        assert_eq!(outcome.meta.source, ParseSource::Fallback);
    }

    #[tokio::test]
    async fn test_llm_timeout_falls_back() {
        let extractor = Arc::new(MockExtractor::new(MockBehavior::Hang(
            Duration::from_millis(200),
        )));
        let mut cfg = config();
        cfg.llm_timeout = Duration::from_millis(20);
        let orchestrator =
            QuickAddOrchestrator::new(Arc::new(MemoryStore::new()), cfg).with_extractor(extractor);

        let outcome = orchestrator.parse("Grab taxi 150 today").await.unwrap();
        assert_eq!(outcome.meta.source, ParseSource::Fallback);
        assert_eq!(outcome.meta.confidence, 0.45);
    }

    #[tokio::test]
    async fn test_fallback_needs_review_signals() {
        let orchestrator = QuickAddOrchestrator::new(Arc::new(MemoryStore::new()), config());

        // Known merchant, positive amount: confident enough
        let outcome = orchestrator.parse("Jollibee 250 lunch").await.unwrap();
        assert!(!outcome.meta.needs_review);

        // No amount parsed: flag for review
        let outcome = orchestrator.parse("Jollibee lunch").await.unwrap();
        assert!(outcome.meta.needs_review);
        assert_eq!(outcome.transaction.amount, 0.0);

        // Unknown merchant: flag for review
        let outcome = orchestrator.parse("450").await.unwrap();
        assert!(outcome.meta.needs_review);
        assert_eq!(outcome.transaction.merchant, "Unknown");
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let orchestrator = QuickAddOrchestrator::new(Arc::new(FailingStore), config());
        match orchestrator.parse("Jollibee 250 lunch").await {
            Err(Error::Store(_)) => {}
            other => panic!("expected store error, got {:?}", other.map(|o| o.meta)),
        }
    }

    #[tokio::test]
    async fn test_learner_feedback_shapes_next_parse() {
        // The full loop: LLM suggestion, user correction, rule on replay
        let store = Arc::new(MemoryStore::new());
        let extractor = Arc::new(MockExtractor::responding(serde_json::json!({
            "category": "Food & Dining",
            "merchant": "GrabFood",
            "confidence": 0.88,
        })));
        let orchestrator = QuickAddOrchestrator::new(store.clone(), config())
            .with_extractor(extractor.clone());

        let first = orchestrator.parse("GrabFood 289 dinner yesterday").await.unwrap();
        assert_eq!(first.meta.source, ParseSource::Llm);

        let learner = crate::rules::RuleLearner::new(store.clone());
        learner
            .maybe_learn(
                &crate::models::CorrectionFeedback {
                    origin: TransactionOrigin::QuickAdd,
                    suggestion: first.meta.clone(),
                    merchant: first.transaction.merchant.clone(),
                    raw_input: "GrabFood 289 dinner yesterday".to_string(),
                    final_category: "Transportation".to_string(),
                },
                Utc::now(),
            )
            .await
            .unwrap();

        let second = orchestrator.parse("grabfood 120 breakfast").await.unwrap();
        assert_eq!(second.meta.source, ParseSource::Rule);
        assert_eq!(second.transaction.category, "Transportation");
        // Still only the one LLM call, from the first parse
        assert_eq!(extractor.calls(), 1);
    }
}
