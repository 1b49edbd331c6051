//! HTTP API for the Mower ROI calculator.
//!
//! This module exposes the engine over a small REST API built with
//! [`axum`](https://crates.io/crates/axum).  The calculator front end
//! posts raw form answers and receives the full report as JSON; the
//! same server accepts leads.  The equipment catalog is loaded once at
//! start-up and shared read-only through the router state.

use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;

use crate::config::ServerConfig;
use crate::engine::{evaluate, evaluate_scenarios};
use crate::equipment::{load_catalog_opt, recommend, EquipmentRecommendation, LoadedCatalog};
use crate::error::LeadError;
use crate::inputs::{resolve_equipment_query, RawInputs};
use crate::lead::{LeadSink, LeadSubmission, TracingLeadSink};
use crate::models::CalculatorReport;

/// Application state shared across requests.
pub struct AppState {
    pub catalog: LoadedCatalog,
    pub lead_sink: Arc<dyn LeadSink>,
}

impl AppState {
    pub fn new(catalog: LoadedCatalog, lead_sink: Arc<dyn LeadSink>) -> Self {
        Self { catalog, lead_sink }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    Invalid(String),
    Upstream(String),
    Internal(String),
}

impl From<LeadError> for ApiError {
    fn from(err: LeadError) -> Self {
        match err {
            LeadError::Delivery(_) => ApiError::Upstream(err.to_string()),
            LeadError::MissingField(_) | LeadError::InvalidEmail(_) => {
                ApiError::Invalid(err.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Invalid(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid", message),
            ApiError::Upstream(message) => (StatusCode::BAD_GATEWAY, "upstream", message),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

/// Build the API router around the given state.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/calculate", post(calculate_handler))
        .route("/api/scenarios", post(scenarios_handler))
        .route("/api/equipment", post(equipment_handler))
        .route("/api/leads", post(lead_handler))
        .with_state(state)
}

async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({ "status": "ok", "catalog": state.catalog.source }))
}

/// Handler for POST /api/calculate
async fn calculate_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RawInputs>, JsonRejection>,
) -> Result<Json<CalculatorReport>, ApiError> {
    let Json(input) = payload?;
    let report = evaluate(&input, &state.catalog.catalog);
    tracing::debug!(
        property_type = report.results.inputs.property_type.as_str(),
        acreage = report.results.inputs.acreage,
        net_annual_savings = report.results.net_annual_savings,
        "calculated report"
    );
    Ok(Json(report))
}

/// Handler for POST /api/scenarios
async fn scenarios_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Vec<RawInputs>>, JsonRejection>,
) -> Result<Json<Vec<CalculatorReport>>, ApiError> {
    let Json(scenarios) = payload?;
    let count = scenarios.len();
    let reports = tokio::task::spawn_blocking(move || {
        evaluate_scenarios(&scenarios, &state.catalog.catalog)
    })
    .await
    .map_err(|err| ApiError::Internal(err.to_string()))?;
    tracing::debug!(count, "evaluated scenarios");
    Ok(Json(reports))
}

/// Handler for POST /api/equipment
async fn equipment_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RawInputs>, JsonRejection>,
) -> Result<Json<EquipmentRecommendation>, ApiError> {
    let Json(raw) = payload?;
    let query = resolve_equipment_query(&raw);
    Ok(Json(recommend(
        &state.catalog.catalog,
        query.property_type,
        query.acreage,
        query.automation_level,
        query.is_hilly,
    )))
}

/// Handler for POST /api/leads
async fn lead_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LeadSubmission>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(lead) = payload?;
    lead.validate()?;
    state.lead_sink.submit(&lead)?;
    Ok((StatusCode::ACCEPTED, Json(json!({ "status": "accepted" }))))
}

/// Launch the API server.  Loads the configured catalog (or the
/// built-in one), binds to the configured address and serves until
/// the server terminates.
pub async fn serve(config: &ServerConfig) -> Result<()> {
    let catalog = load_catalog_opt(config.catalog_path.as_deref());
    let state = Arc::new(AppState::new(catalog, Arc::new(TracingLeadSink)));
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "server listening");
    axum::serve(listener, router).await?;
    Ok(())
}
