//! HTTP handlers for the dashboard API.

use axum::{
  extract::{Path, Query, State},
  http::StatusCode,
  Json,
};
use std::sync::Arc;
use tracing::{info, warn};

use risk_analyzer::types::{AnalysisReport, ErrorOutput};
use risk_analyzer::{EngineError, ALL_PROJECTS};

use crate::date;
use crate::state::AppState;
use crate::types::{AlertsResponse, AnalyzePayload, AsOfQuery};

pub type ApiError = (StatusCode, Json<ErrorOutput>);
pub type ApiResult<T> = Result<Json<T>, ApiError>;

/// Map analyzer errors to a status and the shared error body.
fn error_response(e: EngineError) -> ApiError {
  let status = match &e {
    EngineError::Validation { .. } | EngineError::Parse(_) | EngineError::Json(_) => {
      StatusCode::BAD_REQUEST
    }
    EngineError::Source(_) => StatusCode::BAD_GATEWAY,
    EngineError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
  };
  let body = match e {
    EngineError::Validation { field, reason } => ErrorOutput::new(reason).with_field(field),
    other => ErrorOutput::new(other.to_string()),
  };
  warn!(status = status.as_u16(), message = %body.message, "request failed");
  (status, Json(body))
}

pub async fn health() -> &'static str {
  "ok"
}

/// Analyze a posted batch of issues.
pub async fn analyze_batch(
  State(state): State<Arc<AppState>>,
  Json(payload): Json<AnalyzePayload>,
) -> ApiResult<AnalysisReport> {
  let as_of = date::parse_as_of(payload.as_of.as_deref()).map_err(error_response)?;
  let project = payload.project.as_deref().unwrap_or(ALL_PROJECTS);
  let report = state.analyzer.analyze(project, &payload.issues, as_of);
  info!(
    project,
    issues = payload.issues.len(),
    skipped = report.skipped_count,
    "analyzed posted batch"
  );
  Ok(Json(report))
}

/// Analyze one configured project from the issue source.
pub async fn analyze_project(
  State(state): State<Arc<AppState>>,
  Path(project_key): Path<String>,
  Query(query): Query<AsOfQuery>,
) -> ApiResult<AnalysisReport> {
  if !state.settings.is_enabled(&project_key) {
    return Err((
      StatusCode::NOT_FOUND,
      Json(
        ErrorOutput::new(format!("project {} is not enabled", project_key)).with_field("project"),
      ),
    ));
  }
  let now = date::resolve_now(query.as_of.as_deref()).map_err(error_response)?;
  let report = state
    .analyzer
    .analyze_project(&state.issues, &state.settings, &project_key, now)
    .map_err(error_response)?;
  Ok(Json(report))
}

/// Combined analysis across every enabled project.
pub async fn analyze_all(
  State(state): State<Arc<AppState>>,
  Query(query): Query<AsOfQuery>,
) -> ApiResult<AnalysisReport> {
  let now = date::resolve_now(query.as_of.as_deref()).map_err(error_response)?;
  let report = state
    .analyzer
    .analyze_all(&state.issues, &state.settings, now)
    .map_err(error_response)?;
  Ok(Json(report))
}

/// Threshold alerts for enabled projects, respecting cooldowns.
pub async fn check_alerts(
  State(state): State<Arc<AppState>>,
  Query(query): Query<AsOfQuery>,
) -> ApiResult<AlertsResponse> {
  let now = date::resolve_now(query.as_of.as_deref()).map_err(error_response)?;
  let mut tracker = state.alerts.lock().await;
  let alerts = state
    .analyzer
    .check_alerts(&mut tracker, &state.issues, &state.settings, now)
    .map_err(error_response)?;
  if !alerts.is_empty() {
    info!(count = alerts.len(), "component alerts raised");
  }
  Ok(Json(AlertsResponse {
    checked_at: now.to_rfc3339(),
    alerts,
  }))
}
