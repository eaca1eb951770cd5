//! JSON extraction helper for LLM extractor responses
//!
//! Models often wrap their JSON payload in extra prose or markdown fences;
//! extractor implementations can use this to pull out the object before
//! handing it to the orchestrator.

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Extract the JSON object from a model response
///
/// Takes the slice between the first `{` and the last `}` and parses it;
/// anything else is an extractor failure.
pub fn json_object_from_response(response: &str) -> Result<Map<String, Value>> {
    let response = response.trim();

    let start = response.find('{');
    let end = response.rfind('}');

    match (start, end) {
        (Some(s), Some(e)) if s < e => {
            let json_str = &response[s..=e];
            let value: Value = serde_json::from_str(json_str).map_err(|err| {
                let truncated = if json_str.len() > 200 {
                    format!("{}...", &json_str[..200])
                } else {
                    json_str.to_string()
                };
                Error::Extractor(format!("Invalid JSON from LLM: {} | Raw: {}", err, truncated))
            })?;
            match value {
                Value::Object(map) => Ok(map),
                other => Err(Error::Extractor(format!(
                    "LLM returned a non-object payload: {}",
                    other
                ))),
            }
        }
        _ => Err(Error::Extractor(format!(
            "No JSON found in LLM response | Raw: {}",
            if response.len() > 200 {
                format!("{}...", &response[..200])
            } else {
                response.to_string()
            }
        ))),
    }
}
