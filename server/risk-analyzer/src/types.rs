//! Core types for the risk analyzer (JSON contracts + internal models).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Inbound types (JSON contract: what the issue source sends)
// ---------------------------------------------------------------------------

/// One inbound issue record. Unknown fields are silently ignored; every
/// field is optional so a single bad record can be skipped instead of
/// failing the whole batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawIssue {
  #[serde(default)]
  pub project: String,
  #[serde(default)]
  pub key: Option<String>,
  #[serde(default)]
  pub component: Option<String>,
  #[serde(default, alias = "priority")]
  pub severity: Option<String>,
  #[serde(default, alias = "created")]
  pub created_at: Option<String>,
  #[serde(default)]
  pub summary: Option<String>,
}

// ---------------------------------------------------------------------------
// Severity enum (normalized)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
  Low,
  Medium,
  High,
  Critical,
}

impl Severity {
  /// Accepts severity names and JIRA priority names, case-insensitively.
  pub fn from_str_loose(s: &str) -> Option<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "critical" | "blocker" | "highest" | "urgent" => Some(Self::Critical),
      "high" | "major" => Some(Self::High),
      "medium" | "normal" => Some(Self::Medium),
      "low" | "minor" | "trivial" | "lowest" => Some(Self::Low),
      _ => None,
    }
  }

  /// Critical and High both count toward a component's severity weight.
  pub fn is_severe(self) -> bool {
    matches!(self, Self::Critical | Self::High)
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Low => "Low",
      Self::Medium => "Medium",
      Self::High => "High",
      Self::Critical => "Critical",
    }
  }
}

// ---------------------------------------------------------------------------
// Internal normalized types
// ---------------------------------------------------------------------------

/// Validated issue record. Immutable input to every analysis step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
  pub project: String,
  pub key: Option<String>,
  pub component: Option<String>,
  pub severity: Option<Severity>,
  pub created_at: DateTime<Utc>,
  pub summary: String,
}

/// A record excluded from analysis, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
  /// Position of the record in the input batch.
  pub index: usize,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub key: Option<String>,
  pub field: String,
  pub reason: String,
}

// ---------------------------------------------------------------------------
// Component risk
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskBucket {
  Low,
  Medium,
  High,
  Critical,
}

impl RiskBucket {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Low => "Low",
      Self::Medium => "Medium",
      Self::High => "High",
      Self::Critical => "Critical",
    }
  }
}

/// Points each rule contributed before clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RiskFactors {
  pub volume: u32,
  pub severity: u32,
  pub recency: u32,
  pub stability_bonus: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentRiskEntry {
  pub component_name: String,
  pub bug_count: u64,
  pub critical_count: u64,
  pub recent_count: u64,
  pub risk_score: u8,
  pub risk_bucket: RiskBucket,
  pub contributing_factors: RiskFactors,
}

// ---------------------------------------------------------------------------
// Project health
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BusinessImpact {
  Low,
  Medium,
  High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
  Improving,
  Stable,
  Declining,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthLevel {
  Excellent,
  Good,
  Fair,
  Poor,
  Critical,
}

impl HealthLevel {
  pub fn from_score(score: u8) -> Self {
    match score {
      80..=u8::MAX => Self::Excellent,
      60..=79 => Self::Good,
      40..=59 => Self::Fair,
      20..=39 => Self::Poor,
      _ => Self::Critical,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectHealthSummary {
  pub health_score: u8,
  pub health_level: HealthLevel,
  pub business_impact: BusinessImpact,
  pub trend_direction: TrendDirection,
  pub total_issues: u64,
  pub components_affected: usize,
  pub critical_components: usize,
  pub high_components: usize,
}

// ---------------------------------------------------------------------------
// History + forecast
// ---------------------------------------------------------------------------

/// Bug count for one period (a calendar month, labelled "YYYY-MM").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryPoint {
  pub period: String,
  pub count: u64,
}

impl HistoryPoint {
  pub fn new(period: impl Into<String>, count: u64) -> Self {
    Self {
      period: period.into(),
      count,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
  pub predicted_next_period_count: u64,
  pub confidence: u8,
  pub trend_slope: f64,
  pub intercept: f64,
  pub r_squared: f64,
  pub points: usize,
}

/// Per-component direction; "Increasing" means more bugs over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComponentTrendDirection {
  Increasing,
  Stable,
  Decreasing,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentTrend {
  pub component_name: String,
  pub monthly_counts: Vec<u64>,
  pub total_bugs: u64,
  pub avg_per_month: f64,
  pub trend_slope: f64,
  pub direction: ComponentTrendDirection,
}

// ---------------------------------------------------------------------------
// Text signals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
  Negative,
  Neutral,
  Positive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UrgencyLevel {
  Low,
  Medium,
  High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemeCount {
  pub term: String,
  pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextSignals {
  pub sentiment: Sentiment,
  /// (negative hits - positive hits) / summaries.
  pub sentiment_score: f64,
  pub urgent_count: u64,
  pub urgent_summaries: u64,
  pub urgency_level: UrgencyLevel,
  pub top_themes: Vec<ThemeCount>,
  pub categories: BTreeMap<String, u64>,
}

// ---------------------------------------------------------------------------
// Temporal patterns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCount {
  /// English weekday name, e.g. "Monday".
  pub day: String,
  pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourCount {
  /// Hour of day in UTC, 0-23.
  pub hour: u32,
  pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekCount {
  /// ISO week label, "YYYY-Www".
  pub week: String,
  pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeeklyTrend {
  Increasing,
  Decreasing,
  Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemporalPatterns {
  pub peak_days: Vec<DayCount>,
  pub peak_hours: Vec<HourCount>,
  /// Chronological; weeks without issues are omitted.
  pub weekly_counts: Vec<WeekCount>,
  /// Last week vs. first week; None with fewer than two weeks.
  pub weekly_trend: Option<WeeklyTrend>,
}

// ---------------------------------------------------------------------------
// Threshold alerts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
  HighRisk,
  Critical,
  Urgent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentAlert {
  pub project: String,
  pub component_name: String,
  pub bug_count: u64,
  pub level: AlertLevel,
  pub raised_at: String,
  pub recommendations: Vec<String>,
}

// ---------------------------------------------------------------------------
// Output types (JSON contract: what we emit)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
  pub project: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub as_of: Option<String>,
  pub input_digest: String,
  pub total_issues: u64,
  pub unassigned_issues: u64,
  /// Valid issues created after `as_of`; excluded from every section.
  pub excluded_after_as_of: u64,
  pub skipped_count: usize,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub skipped: Vec<SkippedRecord>,
  pub components: Vec<ComponentRiskEntry>,
  pub health: ProjectHealthSummary,
  pub history: Vec<HistoryPoint>,
  pub forecast: ForecastResult,
  pub component_trends: Vec<ComponentTrend>,
  pub text_signals: TextSignals,
  pub temporal: TemporalPatterns,
}

/// Structured error output for the binaries.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorOutput {
  pub error: bool,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub field: Option<String>,
}

impl ErrorOutput {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      error: true,
      message: message.into(),
      field: None,
    }
  }

  pub fn with_field(mut self, field: impl Into<String>) -> Self {
    self.field = Some(field.into());
    self
  }
}
