//! Scripted in-memory backend shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use insight_core::error::BackendError;
use insight_core::invoker::StructuredInvoker;
use insight_core::llm::{GenerationRequest, GenerativeBackend};
use insight_core::{AnalysisKind, Analyst};
use serde_json::{json, Value};

#[derive(Clone)]
pub enum Script {
    Reply(String),
    Delayed(Duration, String),
    Fail(BackendError),
    Hang,
}

#[derive(Default)]
pub struct ScriptedBackend {
    scripts: HashMap<AnalysisKind, Script>,
    seen: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, kind: AnalysisKind, script: Script) -> Self {
        self.scripts.insert(kind, script);
        self
    }

    pub fn reply(self, kind: AnalysisKind, payload: Value) -> Self {
        self.on(kind, Script::Reply(payload.to_string()))
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeBackend for ScriptedBackend {
    async fn generate(&self, request: GenerationRequest) -> Result<String, BackendError> {
        let script = self.scripts.get(&request.kind).cloned();
        self.seen.lock().unwrap().push(request);

        match script {
            Some(Script::Reply(text)) => Ok(text),
            Some(Script::Delayed(delay, text)) => {
                tokio::time::sleep(delay).await;
                Ok(text)
            }
            Some(Script::Fail(e)) => Err(e),
            Some(Script::Hang) => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(BackendError::EmptyResponse)
            }
            None => Err(BackendError::Transport("no script for kind".into())),
        }
    }
}

pub fn analyst_with(backend: Arc<ScriptedBackend>, timeout: Duration) -> Analyst {
    Analyst::new(StructuredInvoker::with_timeout(backend, timeout))
}

pub fn competitor_payload() -> Value {
    json!({
        "summary": "Mars-owned rival focused on veterinary nutrition.",
        "strengths": ["Vet clinic channel", "Prescription diets"],
        "weaknesses": ["Premium pricing"],
        "strategy": "Grow therapeutic lines through clinics.",
        "marketPositioning": "Science-led premium brand."
    })
}

pub fn market_share_payload() -> Value {
    json!({
        "marketSummary": "Consolidated market led by a few groups.",
        "marketShare": [
            { "company": "A", "share": 40 },
            { "company": "B", "share": 30 }
        ],
        "keyTrends": ["Premiumization"]
    })
}

pub fn sales_report_payload() -> Value {
    json!({
        "title": "Q2 Sales Report",
        "summary": "Revenue grew on Product A.",
        "keyInsights": ["USA leads revenue"],
        "recommendations": ["Expand Product C in Germany"]
    })
}
