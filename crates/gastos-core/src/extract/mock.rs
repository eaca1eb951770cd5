//! Mock extractor for testing
//!
//! Scripted responses for all extractor outcomes: a canned field mapping,
//! a hard failure, or a hang longer than any sane timeout.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{Error, Result};

use super::{ExtractRequest, TextExtractor};

/// What the mock should do when invoked
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Return this value as the raw field mapping
    Respond(Value),
    /// Fail as if the transport/model errored
    Fail,
    /// Sleep for the given duration before responding, to exercise the
    /// orchestrator's timeout path
    Hang(Duration),
}

pub struct MockExtractor {
    behavior: MockBehavior,
    calls: AtomicUsize,
}

impl MockExtractor {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    /// Mock that answers with the given JSON object
    pub fn responding(value: Value) -> Self {
        Self::new(MockBehavior::Respond(value))
    }

    /// Mock that always fails
    pub fn failing() -> Self {
        Self::new(MockBehavior::Fail)
    }

    /// How many times `extract` was invoked
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextExtractor for MockExtractor {
    async fn extract(&self, _request: &ExtractRequest) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.behavior {
            MockBehavior::Respond(value) => Ok(value.clone()),
            MockBehavior::Fail => Err(Error::Extractor("mock extractor failure".into())),
            MockBehavior::Hang(duration) => {
                tokio::time::sleep(*duration).await;
                Ok(Value::Object(serde_json::Map::new()))
            }
        }
    }
}
