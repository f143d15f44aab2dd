//! `run_analysis`: lookup, validate, render, invoke.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::{Failure, RegistryError, SchemaMismatchError, ValidationError, Violation};
use crate::invoker::StructuredInvoker;
use crate::kind::AnalysisKind;
use crate::registry::Registry;
use crate::reports::AnalysisRequest;
use crate::schema::validate_input;

/// One user action. Consumed by exactly one `Analyst::execute` call.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationRequest {
    pub id: Uuid,
    pub kind: AnalysisKind,
    pub input: Value,
}

impl InvocationRequest {
    pub fn new(kind: AnalysisKind, input: Value) -> Self {
        Self::with_id(Uuid::new_v4(), kind, input)
    }

    /// Lets a caller that tracks its own ids (e.g. a panel) tag the request.
    pub fn with_id(id: Uuid, kind: AnalysisKind, input: Value) -> Self {
        Self { id, kind, input }
    }
}

/// A validated output record, owned by whoever issued the request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResult {
    pub request_id: Uuid,
    pub kind: AnalysisKind,
    pub output: Map<String, Value>,
}

impl InvocationResult {
    /// Reads the record into one of the typed reports.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.output.clone()))
    }
}

#[derive(Clone)]
pub struct Analyst {
    registry: Arc<Registry>,
    invoker: StructuredInvoker,
}

impl Analyst {
    /// Uses the builtin table.
    pub fn new(invoker: StructuredInvoker) -> Self {
        Self {
            registry: Arc::new(Registry::global().clone()),
            invoker,
        }
    }

    /// Uses a custom table. Every kind must be present so that lookups at
    /// request time cannot fail.
    pub fn with_registry(registry: Registry, invoker: StructuredInvoker) -> Result<Self, RegistryError> {
        registry.verify()?;
        for kind in AnalysisKind::ALL {
            registry.lookup(kind)?;
        }
        Ok(Self {
            registry: Arc::new(registry),
            invoker,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub async fn run(&self, kind: AnalysisKind, input: Value) -> Result<InvocationResult, Failure> {
        self.execute(InvocationRequest::new(kind, input)).await
    }

    /// Runs one request through the pipeline. Success is all-or-nothing.
    ///
    /// # Panics
    ///
    /// If the request's kind is missing from the registry. Construction
    /// checks coverage, so this only happens on a programming defect.
    pub async fn execute(&self, request: InvocationRequest) -> Result<InvocationResult, Failure> {
        let InvocationRequest { id, kind, input } = request;

        let definition = match self.registry.lookup(kind) {
            Ok(def) => def,
            Err(e) => {
                error!(request_id = %id, "Registry misconfigured: {}", e);
                panic!("{}", e);
            }
        };

        // 1. Validate the user's input
        let record = validate_input(&definition.input, &input).map_err(|e| {
            info!(request_id = %id, kind = %kind, "Rejected input: {}", e);
            Failure::new(kind, e)
        })?;

        // 2. Render the instruction
        let instruction = definition.template.render(&record).map_err(|e| {
            error!(request_id = %id, kind = %kind, "Template/schema mismatch: {}", e);
            debug_assert!(false, "template for {} is inconsistent: {}", kind, e);
            Failure::new(kind, e)
        })?;

        // 3. Ask the backend
        info!(request_id = %id, kind = %kind, "Running analysis");
        let output = self
            .invoker
            .invoke(kind, instruction, &definition.output)
            .await?;

        Ok(InvocationResult {
            request_id: id,
            kind,
            output,
        })
    }

    /// Typed front door: `analyst.run_typed(&MarketShareInput { .. })`.
    pub async fn run_typed<R: AnalysisRequest>(&self, input: &R) -> Result<R::Output, Failure> {
        let value = serde_json::to_value(input).map_err(|e| {
            warn!(kind = %R::KIND, "Typed input did not serialize: {}", e);
            Failure::new(
                R::KIND,
                ValidationError {
                    path: "$".to_string(),
                    violation: Violation::Undecodable(e.to_string()),
                },
            )
        })?;
        let result = self.run(R::KIND, value).await?;
        result.parse::<R::Output>().map_err(|e| {
            warn!(kind = %R::KIND, "Validated record did not decode: {}", e);
            Failure::new(
                R::KIND,
                SchemaMismatchError {
                    path: "$".to_string(),
                    violation: Violation::Undecodable(e.to_string()),
                },
            )
        })
    }
}
