//! Error taxonomy for the analysis pipeline.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::kind::AnalysisKind;

/// What was wrong with a single field, shared by input and output checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    Missing,
    Blank,
    WrongType {
        expected: &'static str,
        found: &'static str,
    },
    NonFinite,
    Undecodable(String),
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Missing => write!(f, "required field is missing"),
            Violation::Blank => write!(f, "must not be empty"),
            Violation::WrongType { expected, found } => {
                write!(f, "expected {}, found {}", expected, found)
            }
            Violation::NonFinite => write!(f, "number must be finite"),
            Violation::Undecodable(reason) => write!(f, "could not be decoded: {}", reason),
        }
    }
}

/// Bad or missing user input, caught before any backend call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid input at '{path}': {violation}")]
pub struct ValidationError {
    pub path: String,
    pub violation: Violation,
}

/// The backend answered, but the payload does not have the declared shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("response does not match schema at '{path}': {violation}")]
pub struct SchemaMismatchError {
    pub path: String,
    pub violation: Violation,
}

/// A template/schema disagreement. Always a programming defect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("placeholder '{0}' has no matching input field")]
    UnknownPlaceholder(String),

    #[error("unterminated placeholder starting at byte {0}")]
    Unterminated(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("backend did not answer within {0:?}")]
    Timeout(Duration),

    #[error("backend request failed: {0}")]
    Transport(String),

    #[error("backend returned no content")]
    EmptyResponse,

    #[error("backend response is not valid JSON: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("analysis kind '{0}' is not registered")]
    Unregistered(AnalysisKind),

    #[error("analysis kind '{0}' is registered twice")]
    Duplicate(AnalysisKind),

    #[error("template for '{kind}' references unknown field '{placeholder}'")]
    UnknownPlaceholder {
        kind: AnalysisKind,
        placeholder: String,
    },

    #[error("template for '{kind}' is malformed: {source}")]
    MalformedTemplate {
        kind: AnalysisKind,
        #[source]
        source: TemplateError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureCause {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    SchemaMismatch(#[from] SchemaMismatchError),
}

impl FailureCause {
    /// Stable label used on the wire and in logs.
    pub fn label(&self) -> &'static str {
        match self {
            FailureCause::Validation(_) => "validation",
            FailureCause::Template(_) => "template",
            FailureCause::Backend(_) => "backend",
            FailureCause::SchemaMismatch(_) => "schema_mismatch",
        }
    }

    /// Whether re-submitting the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FailureCause::Backend(_) | FailureCause::SchemaMismatch(_)
        )
    }
}

/// The single error value handed to the presentation layer.
/// Never carries a partial result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} failed: {cause}")]
pub struct Failure {
    pub kind: AnalysisKind,
    #[source]
    pub cause: FailureCause,
}

impl Failure {
    pub fn new(kind: AnalysisKind, cause: impl Into<FailureCause>) -> Self {
        Self {
            kind,
            cause: cause.into(),
        }
    }

    /// Message safe to show to the user. Internal detail stays in the logs.
    pub fn user_message(&self) -> &'static str {
        match self.cause {
            FailureCause::Validation(_) => self.kind.missing_input_message(),
            _ => self.kind.failure_message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_hides_backend_detail() {
        let failure = Failure::new(
            AnalysisKind::SalesReport,
            BackendError::Transport("connection reset by 10.0.0.7".into()),
        );
        assert_eq!(
            failure.user_message(),
            "There was a problem generating the sales report."
        );
        assert!(failure.cause.is_retryable());
    }

    #[test]
    fn validation_failure_asks_for_input() {
        let failure = Failure::new(
            AnalysisKind::MarketAnalysis,
            ValidationError {
                path: "topic".into(),
                violation: Violation::Blank,
            },
        );
        assert_eq!(failure.user_message(), "Please enter a market topic.");
        assert_eq!(failure.cause.label(), "validation");
        assert!(!failure.cause.is_retryable());
    }
}
