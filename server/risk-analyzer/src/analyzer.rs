//! RiskAnalyzer: the pure analysis pipeline over a batch of issues.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::alerts::AlertTracker;
use crate::component_risk;
use crate::config::Config;
use crate::error::EngineError;
use crate::forecast;
use crate::health;
use crate::history;
use crate::normalize;
use crate::sources::{ConfigStore, IssueSource};
use crate::temporal;
use crate::text_signals;
use crate::types::*;

/// Project label used for combined, cross-project reports.
pub const ALL_PROJECTS: &str = "ALL";

/// The risk analyzer. Holds only configuration; every call is a pure
/// function of its arguments.
#[derive(Debug, Clone)]
pub struct RiskAnalyzer {
  config: Config,
}

impl Default for RiskAnalyzer {
  fn default() -> Self {
    Self::with_defaults()
  }
}

impl RiskAnalyzer {
  pub fn new(config: Config) -> Self {
    Self { config }
  }

  pub fn with_defaults() -> Self {
    Self::new(Config::default())
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  pub fn alert_tracker(&self) -> AlertTracker {
    AlertTracker::new(self.config.alerts.clone())
  }

  /// Component risk table, anchored at the newest issue in the set.
  pub fn compute_component_risk(&self, issues: &[Issue]) -> Vec<ComponentRiskEntry> {
    match component_risk::analysis_end(issues) {
      Some(as_of) => self.compute_component_risk_at(issues, as_of),
      None => Vec::new(),
    }
  }

  /// Component risk table with an explicit end of the analysis range.
  pub fn compute_component_risk_at(
    &self,
    issues: &[Issue],
    as_of: DateTime<Utc>,
  ) -> Vec<ComponentRiskEntry> {
    component_risk::score_components(issues, as_of, &self.config)
  }

  pub fn compute_health_summary(
    &self,
    entries: &[ComponentRiskEntry],
    total_issue_count: u64,
    forecast: Option<&ForecastResult>,
  ) -> ProjectHealthSummary {
    health::summarize(entries, total_issue_count, forecast, &self.config)
  }

  pub fn forecast_trend(&self, history: &[HistoryPoint]) -> ForecastResult {
    forecast::forecast(history, &self.config)
  }

  pub fn extract_text_signals(&self, issues: &[Issue]) -> TextSignals {
    text_signals::extract(issues, &self.config)
  }

  pub fn monthly_history(&self, issues: &[Issue], as_of: DateTime<Utc>) -> Vec<HistoryPoint> {
    history::monthly_history(issues, as_of, self.config.history_months)
  }

  pub fn component_trends(&self, issues: &[Issue], as_of: DateTime<Utc>) -> Vec<ComponentTrend> {
    history::component_trends(issues, as_of, self.config.history_months, &self.config)
  }

  /// Run the whole pipeline over raw records.
  ///
  /// Malformed records are skipped and listed; `as_of` defaults to the
  /// newest valid issue.
  pub fn analyze(
    &self,
    project: &str,
    raws: &[RawIssue],
    as_of: Option<DateTime<Utc>>,
  ) -> AnalysisReport {
    self.run(project, raws, as_of, self.config.history_months)
  }

  fn run(
    &self,
    project: &str,
    raws: &[RawIssue],
    as_of: Option<DateTime<Utc>>,
    months: u32,
  ) -> AnalysisReport {
    let normalized = normalize::normalize_all(raws);
    let as_of = as_of.or_else(|| component_risk::analysis_end(&normalized.issues));

    // Everything below sees the same range: issues up to and including as_of.
    let (issues, later): (Vec<Issue>, Vec<Issue>) = match as_of {
      Some(end) => normalized
        .issues
        .iter()
        .cloned()
        .partition(|i| i.created_at <= end),
      None => (normalized.issues.clone(), Vec::new()),
    };
    let issues = &issues;
    if !later.is_empty() {
      debug!(project, count = later.len(), "ignoring issues created after as_of");
    }

    let (components, history, component_trends) = match as_of {
      Some(end) => (
        self.compute_component_risk_at(issues, end),
        history::monthly_history(issues, end, months),
        history::component_trends(issues, end, months, &self.config),
      ),
      None => (Vec::new(), Vec::new(), Vec::new()),
    };

    let forecast = self.forecast_trend(&history);
    let total_issues = issues.len() as u64;
    let health = self.compute_health_summary(&components, total_issues, Some(&forecast));
    let text_signals = self.extract_text_signals(issues);
    let temporal = temporal::analyze(issues);
    let unassigned_issues = issues.iter().filter(|i| i.component.is_none()).count() as u64;

    debug!(
      project,
      total_issues,
      skipped = normalized.skipped.len(),
      components = components.len(),
      health_score = health.health_score,
      "analysis complete"
    );

    AnalysisReport {
      project: project.to_string(),
      as_of: as_of.map(|t| t.to_rfc3339()),
      input_digest: input_digest(&normalized.issues),
      total_issues,
      unassigned_issues,
      excluded_after_as_of: later.len() as u64,
      skipped_count: normalized.skipped.len(),
      skipped: normalized.skipped,
      components,
      health,
      history,
      forecast,
      component_trends,
      text_signals,
      temporal,
    }
  }

  /// Fetch one project's window from the source and analyze it. The
  /// store's `analysis_months` overrides `Config::history_months`.
  pub fn analyze_project(
    &self,
    source: &dyn IssueSource,
    store: &dyn ConfigStore,
    project_key: &str,
    now: DateTime<Utc>,
  ) -> Result<AnalysisReport, EngineError> {
    let months = store.analysis_months();
    let since = history::window_start(&now, months);
    let raws = source.fetch(project_key, since)?;
    info!(project = project_key, records = raws.len(), %since, "fetched issues");
    Ok(self.run(project_key, &raws, Some(now), months))
  }

  /// Merge every enabled project's issues into one combined report.
  pub fn analyze_all(
    &self,
    source: &dyn IssueSource,
    store: &dyn ConfigStore,
    now: DateTime<Utc>,
  ) -> Result<AnalysisReport, EngineError> {
    let months = store.analysis_months();
    let since = history::window_start(&now, months);
    let mut raws = Vec::new();
    for project in store.enabled_projects() {
      let batch = source.fetch(&project.key, since)?;
      info!(project = %project.key, records = batch.len(), "fetched issues");
      raws.extend(batch);
    }
    Ok(self.run(ALL_PROJECTS, &raws, Some(now), months))
  }

  /// Evaluate threshold alerts for every enabled project.
  pub fn check_alerts(
    &self,
    tracker: &mut AlertTracker,
    source: &dyn IssueSource,
    store: &dyn ConfigStore,
    now: DateTime<Utc>,
  ) -> Result<Vec<ComponentAlert>, EngineError> {
    let mut alerts = Vec::new();
    for project in store.enabled_projects() {
      let report = self.analyze_project(source, store, &project.key, now)?;
      alerts.extend(tracker.evaluate(&project.key, &report.components, now));
    }
    Ok(alerts)
  }
}

/// Stable digest of the validated input, so callers can cache reports.
fn input_digest(issues: &[Issue]) -> String {
  let mut hasher = blake3::Hasher::new();
  for issue in issues {
    hasher.update(issue.project.as_bytes());
    hasher.update(b"|");
    hasher.update(issue.key.as_deref().unwrap_or("").as_bytes());
    hasher.update(b"|");
    hasher.update(issue.component.as_deref().unwrap_or("").as_bytes());
    hasher.update(b"|");
    hasher.update(issue.severity.map(Severity::as_str).unwrap_or("").as_bytes());
    hasher.update(b"|");
    hasher.update(issue.created_at.to_rfc3339().as_bytes());
    hasher.update(b"|");
    hasher.update(issue.summary.as_bytes());
    hasher.update(b"\n");
  }
  // 16 bytes of the hash, hex-encoded.
  let hash = hasher.finalize();
  hash.as_bytes()[..16].iter().map(|b| format!("{:02x}", b)).collect()
}
