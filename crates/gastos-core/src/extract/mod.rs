//! Pluggable LLM extractor abstraction
//!
//! The core defines the contract an external extractor must satisfy; it
//! never implements the transport itself. Implementations live with the
//! caller (an HTTP client, a local model server, ...); the bundled
//! `MockExtractor` exists for tests and offline use.
//!
//! All failure modes (transport error, timeout, malformed payload) are
//! unified into a single "unavailable" signal at this boundary: the
//! orchestrator treats any `Err` or non-object value as "no LLM" and
//! degrades to the heuristic fallback.

mod mock;
pub mod parsing;

pub use mock::{MockBehavior, MockExtractor};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Context handed to the extractor for a single parse
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractRequest {
    /// The raw quick-add input
    pub text: String,
    /// Today's date (`YYYY-MM-DD`) in the caller's timezone
    pub today: String,
    /// The category whitelist the extractor should choose from
    pub categories: Vec<String>,
    /// Human-readable timezone label (e.g. "Asia/Manila")
    pub timezone: String,
}

/// Capability interface for the external LLM extractor
///
/// `extract` returns the model's loosely-structured field guess as a raw
/// JSON value. Expected keys: amount, currency, merchant, date, category,
/// note, confidence, needs_review, account. Nothing is guaranteed, though;
/// the orchestrator coerces whatever comes back. Implementations should
/// not retry internally; the call is already bounded by the orchestrator's
/// timeout.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, request: &ExtractRequest) -> Result<Value>;
}
