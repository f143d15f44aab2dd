//! Per-panel request lifecycle.
//!
//! Idle -> Pending -> Success | Error, and back to Pending on retry. Each
//! submission gets a fresh id; an outcome is applied only if its id is the
//! panel's current one, so a slow superseded call cannot overwrite a newer
//! result.

use tracing::debug;
use uuid::Uuid;

use crate::analyst::InvocationResult;
use crate::error::Failure;
use crate::kind::AnalysisKind;

#[derive(Debug, Clone, PartialEq)]
pub enum PanelState {
    Idle,
    Pending { request_id: Uuid },
    Success { result: InvocationResult },
    Error { request_id: Uuid, failure: Failure },
}

impl PanelState {
    pub fn label(&self) -> &'static str {
        match self {
            PanelState::Idle => "idle",
            PanelState::Pending { .. } => "pending",
            PanelState::Success { .. } => "success",
            PanelState::Error { .. } => "error",
        }
    }
}

/// What happened to an outcome handed to [`Panel::complete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Stale,
}

#[derive(Debug, Clone)]
pub struct Panel {
    kind: AnalysisKind,
    state: PanelState,
}

impl Panel {
    pub fn new(kind: AnalysisKind) -> Self {
        Self {
            kind,
            state: PanelState::Idle,
        }
    }

    pub fn kind(&self) -> AnalysisKind {
        self.kind
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, PanelState::Pending { .. })
    }

    /// Starts a submission. Any request still pending is superseded.
    pub fn begin(&mut self) -> Uuid {
        let request_id = Uuid::new_v4();
        if let PanelState::Pending { request_id: old } = self.state {
            debug!(kind = %self.kind, superseded = %old, "Pending request superseded");
        }
        self.state = PanelState::Pending { request_id };
        request_id
    }

    pub fn complete(
        &mut self,
        request_id: Uuid,
        outcome: Result<InvocationResult, Failure>,
    ) -> Completion {
        match self.state {
            PanelState::Pending { request_id: current } if current == request_id => {}
            _ => {
                debug!(kind = %self.kind, request_id = %request_id, "Discarding stale outcome");
                return Completion::Stale;
            }
        }

        self.state = match outcome {
            Ok(result) => PanelState::Success { result },
            Err(failure) => PanelState::Error {
                request_id,
                failure,
            },
        };
        Completion::Applied
    }

    /// Back to Idle; whatever is in flight becomes stale.
    pub fn reset(&mut self) {
        self.state = PanelState::Idle;
    }
}
