//! Error types for Gastos

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Input rejected before any strategy ran. Surfaced to the caller.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The LLM extractor failed, timed out, or returned unparsable content.
    /// Recovered inside the orchestrator; never escapes `parse`.
    #[error("Extractor unavailable: {0}")]
    Extractor(String),

    /// Rule listing or upsert failed. Propagated to the caller as fatal.
    #[error("Store error: {0}")]
    Store(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
