use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use insight_core::data::dataset_fields;
use insight_core::panel::PanelState;
use insight_core::{AnalysisDefinition, AnalysisKind, Failure, FailureCause};
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

// Output: what the dashboard reads back

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputFieldView {
    pub name: &'static str,
    pub description: &'static str,
    /// Filled from the dataset when the client leaves it out.
    pub from_dataset: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub kind: AnalysisKind,
    pub title: &'static str,
    pub input_fields: Vec<InputFieldView>,
}

impl From<&AnalysisDefinition> for AnalysisSummary {
    fn from(def: &AnalysisDefinition) -> Self {
        let dataset = dataset_fields(def.kind);
        Self {
            kind: def.kind,
            title: def.kind.title(),
            input_fields: def
                .input
                .fields
                .iter()
                .map(|f| InputFieldView {
                    name: f.name,
                    description: f.description,
                    from_dataset: dataset.contains(&f.name),
                })
                .collect(),
        }
    }
}

/// What a client sees when an analysis fails. No internal detail.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureBody {
    pub kind: AnalysisKind,
    pub cause: &'static str,
    pub message: &'static str,
    pub retryable: bool,
}

impl From<&Failure> for FailureBody {
    fn from(failure: &Failure) -> Self {
        Self {
            kind: failure.kind,
            cause: failure.cause.label(),
            message: failure.user_message(),
            retryable: failure.cause.is_retryable(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelSubmitted {
    pub request_id: Uuid,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelView {
    pub kind: AnalysisKind,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<PanelError>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelError {
    pub cause: &'static str,
    /// Inline text under the panel.
    pub message: &'static str,
    /// Toast text.
    pub notification: &'static str,
}

impl PanelView {
    pub fn new(kind: AnalysisKind, state: &PanelState) -> Self {
        let mut view = Self {
            kind,
            status: state.label(),
            request_id: None,
            output: None,
            error: None,
        };
        match state {
            PanelState::Idle => {}
            PanelState::Pending { request_id } => view.request_id = Some(*request_id),
            PanelState::Success { result } => {
                view.request_id = Some(result.request_id);
                view.output = Some(result.output.clone());
            }
            PanelState::Error {
                request_id,
                failure,
            } => {
                view.request_id = Some(*request_id);
                let message = match failure.cause {
                    FailureCause::Validation(_) => kind.missing_input_message(),
                    _ => kind.retry_message(),
                };
                view.error = Some(PanelError {
                    cause: failure.cause.label(),
                    message,
                    notification: failure.user_message(),
                });
            }
        }
        view
    }
}

// Errors a handler can return

#[derive(Debug)]
pub enum ApiError {
    UnknownKind(String),
    Analysis(Failure),
}

impl From<Failure> for ApiError {
    fn from(failure: Failure) -> Self {
        ApiError::Analysis(failure)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::UnknownKind(slug) => (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({
                    "error": format!("Unknown analysis kind: {}", slug)
                })),
            )
                .into_response(),
            ApiError::Analysis(failure) => {
                let status = match failure.cause {
                    FailureCause::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                    FailureCause::Backend(_) | FailureCause::SchemaMismatch(_) => {
                        StatusCode::BAD_GATEWAY
                    }
                    FailureCause::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, Json(FailureBody::from(&failure))).into_response()
            }
        }
    }
}
