// src/api.rs
use axum::body::Bytes;
use axum::http::StatusCode as AxumStatusCode;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::AppError;
use crate::punch_service::PunchService;
use crate::record_store::RecordStore;
use crate::report_service::{MonthlyReport, ReportService, WorkdayEntry};

#[derive(Clone)]
pub struct AppState {
    pub punch_service: Arc<PunchService>,
    pub report_service: Arc<ReportService>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            punch_service: Arc::new(PunchService::new(store.clone())),
            report_service: Arc::new(ReportService::new(store)),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "Hello World!" }))
        .route("/health", get(handle_health))
        .route("/batidas", post(handle_create_punch))
        .route("/folhas-de-ponto/{mes}", get(handle_monthly_report))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// Body of POST /batidas. `momento` is kept loose so a wrong JSON type is
// reported as a format error rather than a missing parameter.
#[derive(Debug, Deserialize)]
struct PunchRequest {
    momento: Option<serde_json::Value>,
}

fn extract_momento(body: &[u8]) -> Result<String, AppError> {
    let request: PunchRequest =
        serde_json::from_slice(body).map_err(|_| AppError::MissingParameter)?;
    match request.momento {
        None | Some(serde_json::Value::Null) => Err(AppError::MissingParameter),
        Some(serde_json::Value::String(momento)) => Ok(momento),
        Some(_) => Err(AppError::InvalidFormat),
    }
}

async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn handle_create_punch(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(AxumStatusCode, Json<WorkdayEntry>), AppError> {
    info!("Handling POST /batidas request...");
    let momento = extract_momento(&body)?;
    let record = state.punch_service.record_moment(&momento).await?;
    Ok((AxumStatusCode::CREATED, Json(WorkdayEntry::from(record))))
}

async fn handle_monthly_report(
    State(state): State<AppState>,
    Path(mes): Path<String>,
) -> Result<Json<MonthlyReport>, AppError> {
    info!("Handling GET /folhas-de-ponto/{} request...", mes);
    let report = state.report_service.build_report(&mes).await?;
    Ok(Json(report))
}
