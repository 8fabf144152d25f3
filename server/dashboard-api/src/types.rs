//! Request/response types for the dashboard API.

use risk_analyzer::types::{ComponentAlert, RawIssue};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/analyze`.
#[derive(Debug, Deserialize)]
pub struct AnalyzePayload {
  #[serde(default)]
  pub project: Option<String>,
  #[serde(default)]
  pub issues: Vec<RawIssue>,
  /// End of the analysis range; defaults to the newest issue.
  #[serde(default)]
  pub as_of: Option<String>,
}

/// Query string for the source-backed GET routes.
#[derive(Debug, Default, Deserialize)]
pub struct AsOfQuery {
  /// Overrides "now" (RFC 3339 or YYYY-MM-DD).
  pub as_of: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AlertsResponse {
  pub checked_at: String,
  pub alerts: Vec<ComponentAlert>,
}
