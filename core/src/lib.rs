//! Schema-constrained analysis core.
//!
//! Every analysis follows one path: validate the input record, render the
//! prompt template, ask the generative backend for a structured payload and
//! validate that payload against the output schema.

pub mod analyst;
pub mod config;
pub mod data;
pub mod error;
pub mod invoker;
pub mod kind;
pub mod llm;
pub mod panel;
pub mod registry;
pub mod reports;
pub mod schema;
pub mod template;

pub use analyst::{Analyst, InvocationRequest, InvocationResult};
pub use error::{Failure, FailureCause};
pub use kind::AnalysisKind;
pub use registry::{AnalysisDefinition, Registry};
