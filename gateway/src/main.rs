mod api;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

// Internal imports
use crate::api::{AnalysisSummary, ApiError, PanelSubmitted, PanelView};
use insight_core::config::Config;
use insight_core::data::{prefill, DashboardData, DataProvider, SampleDataset};
use insight_core::invoker::StructuredInvoker;
use insight_core::llm::OpenAiBackend;
use insight_core::panel::{Completion, Panel};
use insight_core::{AnalysisKind, Analyst, InvocationRequest, InvocationResult};

// 1. Application State
// The analyst is stateless; the only mutable thing is one panel per kind,
// plus the worker task currently filling it.
#[derive(Clone)]
struct AppState {
    analyst: Analyst,
    data: Arc<dyn DataProvider>,
    panels: Arc<Mutex<HashMap<AnalysisKind, PanelSlot>>>,
}

struct PanelSlot {
    panel: Panel,
    task: Option<JoinHandle<()>>,
}

impl PanelSlot {
    fn new(kind: AnalysisKind) -> Self {
        Self {
            panel: Panel::new(kind),
            task: None,
        }
    }

    // Drops the in-flight backend call, if any. Its result would be stale anyway.
    fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            if !task.is_finished() {
                info!(kind = %self.panel.kind(), "Cancelling superseded analysis");
            }
            task.abort();
        }
    }
}

impl AppState {
    fn new(analyst: Analyst, data: Arc<dyn DataProvider>) -> Self {
        let panels = AnalysisKind::ALL
            .iter()
            .map(|kind| (*kind, PanelSlot::new(*kind)))
            .collect();
        Self {
            analyst,
            data,
            panels: Arc::new(Mutex::new(panels)),
        }
    }

    // Never held across an await.
    fn with_slot<T>(&self, kind: AnalysisKind, f: impl FnOnce(&mut PanelSlot) -> T) -> T {
        let mut panels = self.panels.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let slot = panels.entry(kind).or_insert_with(|| PanelSlot::new(kind));
        f(slot)
    }

    fn with_panel<T>(&self, kind: AnalysisKind, f: impl FnOnce(&mut Panel) -> T) -> T {
        self.with_slot(kind, |slot| f(&mut slot.panel))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    // 2. Logging Setup
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_target(false)
        .compact()
        .init();

    info!("Insight Gateway Initializing...");

    // 3. Initialize The Brain
    let backend = OpenAiBackend::new(&config.backend).context("Failed to initialize backend")?;
    match backend.ping().await {
        Ok(msg) => info!("Brain Status: {}", msg),
        Err(e) => error!("Brain is online but unresponsive: {}", e),
    }

    let invoker = StructuredInvoker::with_timeout(Arc::new(backend), config.analysis_timeout);
    let analyst = Analyst::new(invoker);
    info!(
        "Loaded {} analyses. Backend timeout: {:?}",
        analyst.registry().definitions().len(),
        config.analysis_timeout
    );

    // 4. Bundle State + Routes
    let state = AppState::new(analyst, Arc::new(SampleDataset));
    let app = router(state);

    // 5. Start Server
    let listener = TcpListener::bind(config.gateway_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.gateway_addr))?;
    info!("Gateway listening on {}...", config.gateway_addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/dataset", get(dataset))
        .route("/analyses", get(list_analyses))
        .route("/analyses/{kind}", post(run_analysis))
        .route(
            "/panels/{kind}",
            get(panel_status).post(submit_panel).delete(reset_panel),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn parse_kind(slug: &str) -> Result<AnalysisKind, ApiError> {
    slug.parse()
        .map_err(|_| ApiError::UnknownKind(slug.to_string()))
}

// --- HANDLERS ---

async fn health_check() -> &'static str {
    "Insight Gateway: Operational"
}

async fn dataset(State(state): State<AppState>) -> Json<DashboardData> {
    Json(state.data.dashboard())
}

async fn list_analyses(State(state): State<AppState>) -> Json<Vec<AnalysisSummary>> {
    Json(
        state
            .analyst
            .registry()
            .definitions()
            .iter()
            .map(AnalysisSummary::from)
            .collect(),
    )
}

// Synchronous path: the caller awaits the result directly.
async fn run_analysis(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(input): Json<Value>,
) -> Result<Json<InvocationResult>, ApiError> {
    let kind = parse_kind(&slug)?;
    let input = prefill(kind, input, state.data.as_ref());

    let result = state.analyst.run(kind, input).await?;
    info!(kind = %kind, request_id = %result.request_id, "Analysis delivered");
    Ok(Json(result))
}

// Panel path: submit, then poll. A newer submission supersedes the old one.
async fn submit_panel(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(input): Json<Value>,
) -> Result<(StatusCode, Json<PanelSubmitted>), ApiError> {
    let kind = parse_kind(&slug)?;
    let input = prefill(kind, input, state.data.as_ref());

    let worker = state.clone();
    let request_id = state.with_slot(kind, move |slot| {
        slot.cancel();
        let request_id = slot.panel.begin();
        slot.task = Some(tokio::spawn(async move {
            let outcome = worker
                .analyst
                .execute(InvocationRequest::with_id(request_id, kind, input))
                .await;
            if worker.with_panel(kind, |panel| panel.complete(request_id, outcome))
                == Completion::Stale
            {
                warn!(kind = %kind, request_id = %request_id, "Discarded superseded result");
            }
        }));
        request_id
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(PanelSubmitted {
            request_id,
            status: "pending",
        }),
    ))
}

async fn panel_status(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PanelView>, ApiError> {
    let kind = parse_kind(&slug)?;
    Ok(Json(state.with_panel(kind, |panel| PanelView::new(kind, panel.state()))))
}

async fn reset_panel(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PanelView>, ApiError> {
    let kind = parse_kind(&slug)?;
    Ok(Json(state.with_slot(kind, |slot| {
        slot.cancel();
        slot.panel.reset();
        PanelView::new(kind, slot.panel.state())
    })))
}
