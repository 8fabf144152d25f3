//! Bug Risk Dashboard API
//!
//! HTTP service over the risk analyzer. Bind to 127.0.0.1 by default
//! (internal only).

mod date;
mod handlers;
mod state;
mod types;

use std::sync::Arc;

use axum::{
  routing::{get, post},
  Router,
};
use tower_http::cors::CorsLayer;

pub use handlers::{analyze_all, analyze_batch, analyze_project, check_alerts, health};
pub use state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
  Router::new()
    .route("/health", get(health))
    .route("/api/analyze", post(analyze_batch).get(analyze_all))
    .route("/api/analyze/:project_key", get(analyze_project))
    .route("/api/alerts/check", get(check_alerts))
    .layer(CorsLayer::permissive())
    .with_state(state)
}
