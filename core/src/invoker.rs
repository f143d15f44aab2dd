//! The one external call per request, and everything that guards it.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use tracing::{error, info, warn};

use crate::config::DEFAULT_TIMEOUT_SECS;
use crate::error::{BackendError, Failure};
use crate::kind::AnalysisKind;
use crate::llm::{GenerationRequest, GenerativeBackend};
use crate::schema::{validate_output, Schema};

/// Sends a rendered instruction to the backend and returns a record that
/// matches the output schema. Holds no per-request state.
#[derive(Clone)]
pub struct StructuredInvoker {
    backend: Arc<dyn GenerativeBackend>,
    timeout: Duration,
}

impl StructuredInvoker {
    pub fn new(backend: Arc<dyn GenerativeBackend>) -> Self {
        Self::with_timeout(backend, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(backend: Arc<dyn GenerativeBackend>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn invoke(
        &self,
        kind: AnalysisKind,
        instruction: String,
        output_schema: &Schema,
    ) -> Result<Map<String, Value>, Failure> {
        let request = GenerationRequest {
            kind,
            instruction,
            output_schema: output_schema.to_json_schema(),
        };

        // 1. Call the backend under a deadline. No retry here; that is the caller's call.
        let raw = match tokio::time::timeout(self.timeout, self.backend.generate(request)).await {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                error!(kind = %kind, "Backend failure: {}", e);
                return Err(Failure::new(kind, e));
            }
            Err(_) => {
                error!(kind = %kind, timeout = ?self.timeout, "Backend timed out");
                return Err(Failure::new(kind, BackendError::Timeout(self.timeout)));
            }
        };

        // 2. Pull the structured payload out of whatever the model wrapped it in
        let payload = parse_payload(&raw).map_err(|e| {
            error!(kind = %kind, "Unparseable backend response: {}", e);
            Failure::new(kind, e)
        })?;

        // 3. Hold it against the declared shape
        let record = validate_output(output_schema, &payload).map_err(|e| {
            // Usually means the prompt and the schema drifted apart.
            warn!(kind = %kind, path = %e.path, "Schema mismatch: {}", e);
            Failure::new(kind, e)
        })?;

        info!(kind = %kind, fields = record.len(), "Structured output validated");
        Ok(record)
    }
}

/// Finds the JSON object in a model answer, tolerating code fences and
/// commentary before or after it, including prose that contains braces.
pub fn parse_payload(text: &str) -> Result<Value, BackendError> {
    let trimmed = text.trim();
    let mut candidates = vec![trimmed];
    if let Some(fenced) = fenced_block(trimmed) {
        candidates.push(fenced);
    }

    let mut last_err = None;
    for candidate in candidates {
        match serde_json::from_str::<Value>(candidate) {
            Ok(value @ Value::Object(_)) => return Ok(value),
            Ok(_) => {}
            Err(e) => last_err = Some(e.to_string()),
        }
    }

    if let Some(value) = first_embedded_object(trimmed) {
        return Ok(value);
    }
    Err(BackendError::MalformedResponse(
        last_err.unwrap_or_else(|| "no JSON object in response".to_string()),
    ))
}

fn fenced_block(text: &str) -> Option<&str> {
    let (open, skip) = match text.find("```json") {
        Some(i) => (i, "```json".len()),
        None => (text.find("```")?, "```".len()),
    };
    let body = &text[open + skip..];
    let close = body.find("```")?;
    Some(body[..close].trim())
}

/// Tries every `{` in turn and returns the first complete object that
/// parses from there; whatever follows it is ignored.
fn first_embedded_object(text: &str) -> Option<Value> {
    text.match_indices('{').find_map(|(start, _)| {
        match serde_json::Deserializer::from_str(&text[start..])
            .into_iter::<Value>()
            .next()
        {
            Some(Ok(value @ Value::Object(_))) => Some(value),
            _ => None,
        }
    })
}
