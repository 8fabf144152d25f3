//! Shared application state.

use risk_analyzer::{AlertTracker, InMemoryIssueSource, RiskAnalyzer, StaticConfigStore};
use tokio::sync::Mutex;

pub struct AppState {
  pub analyzer: RiskAnalyzer,
  pub settings: StaticConfigStore,
  pub issues: InMemoryIssueSource,
  /// Cooldowns persist across `/api/alerts/check` calls.
  pub alerts: Mutex<AlertTracker>,
}

impl AppState {
  pub fn new(
    analyzer: RiskAnalyzer,
    settings: StaticConfigStore,
    issues: InMemoryIssueSource,
  ) -> Self {
    let alerts = Mutex::new(analyzer.alert_tracker());
    Self {
      analyzer,
      settings,
      issues,
      alerts,
    }
  }
}
