//! Gastos Core Library
//!
//! Shared functionality for the Gastos quick-add expense tracker:
//! - Deterministic heuristics for amount/date/merchant extraction
//! - Keyword→category hint table
//! - Learned rule matching and the correction feedback loop
//! - Candidate normalization against a category whitelist
//! - Pluggable LLM extractor contract (the transport lives with the caller)
//! - The quick-add orchestrator composing rule → LLM → fallback

pub mod config;
pub mod error;
pub mod extract;
pub mod heuristics;
pub mod hints;
pub mod models;
pub mod normalize;
pub mod orchestrator;
pub mod rules;
pub mod store;

pub use config::{QuickAddConfig, DEFAULT_CATEGORIES};
pub use error::{Error, Result};
pub use extract::{ExtractRequest, MockBehavior, MockExtractor, TextExtractor};
pub use heuristics::HeuristicExtractor;
pub use hints::CategoryHintTable;
pub use models::{
    CorrectionFeedback, NewRule, ParseCandidate, ParseMeta, ParseOutcome, ParseSource, Rule,
    TransactionCandidate, TransactionOrigin,
};
pub use orchestrator::QuickAddOrchestrator;
pub use rules::RuleLearner;
pub use store::{MemoryStore, Store};
