//! Analyzer configuration with sane defaults.
//!
//! Every number here is scoring policy, not a learned parameter. A TOML
//! file may override any subset of fields; the rest keep their defaults.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Upper bound for `history_months` / `analysis_months` (ten years).
pub const MAX_HISTORY_MONTHS: u32 = 120;

/// Tunable weights and thresholds for risk analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Points per bug in a component.
  pub weight_volume: u32,
  /// Points per Critical/High severity bug.
  pub weight_severity: u32,
  /// Points per bug created inside the recency window.
  pub weight_recency: u32,
  /// Points removed from quiet components (no recent bugs, below-average volume).
  pub stability_bonus: u32,
  /// Days before the end of the analysis range that count as "recent".
  pub recency_days: i64,
  /// Inclusive lower bound of the Critical bucket.
  pub bucket_critical: u8,
  /// Inclusive lower bound of the High bucket.
  pub bucket_high: u8,
  /// Inclusive lower bound of the Medium bucket.
  pub bucket_medium: u8,
  /// Health points lost per Critical-bucket component.
  pub health_critical_deduction: u32,
  /// Health points lost per High-bucket component.
  pub health_high_deduction: u32,
  /// |slope| below this is a flat trend.
  pub trend_epsilon: f64,
  /// Confidence for forecasts without enough data to fit a line.
  pub confidence_floor: f64,
  /// Confidence ceiling for a perfect fit over enough points.
  pub confidence_max: f64,
  /// Number of points at which sample size stops limiting confidence.
  pub full_confidence_points: usize,
  /// Calendar months of history to aggregate (current month included).
  pub history_months: u32,
  /// Number of themes reported by the text pass.
  pub top_themes: usize,
  /// Net negative hits per summary at or above which sentiment is Negative.
  pub sentiment_threshold: f64,
  pub vocabulary: TextVocabulary,
  pub alerts: AlertThresholds,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      weight_volume: 10,
      weight_severity: 15,
      weight_recency: 15,
      stability_bonus: 10,
      recency_days: 30,
      bucket_critical: 80,
      bucket_high: 60,
      bucket_medium: 30,
      health_critical_deduction: 25,
      health_high_deduction: 10,
      trend_epsilon: 0.5,
      confidence_floor: 30.0,
      confidence_max: 95.0,
      full_confidence_points: 3,
      history_months: 6,
      top_themes: 5,
      sentiment_threshold: 0.5,
      vocabulary: TextVocabulary::default(),
      alerts: AlertThresholds::default(),
    }
  }
}

impl Config {
  /// Parse a (possibly partial) TOML document over the defaults.
  pub fn from_toml_str(raw: &str) -> Result<Self, EngineError> {
    let config: Config = toml::from_str(raw)?;
    config.validate()?;
    Ok(config)
  }

  /// Load a TOML config file.
  pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
      .map_err(|e| EngineError::config(format!("read {}: {}", path.display(), e)))?;
    Self::from_toml_str(&raw)
  }

  /// Reject configurations that would make buckets or confidence incoherent.
  pub fn validate(&self) -> Result<(), EngineError> {
    if !(self.bucket_medium <= self.bucket_high && self.bucket_high <= self.bucket_critical) {
      return Err(EngineError::config(
        "bucket thresholds must satisfy medium <= high <= critical",
      ));
    }
    if self.bucket_critical > 100 {
      return Err(EngineError::config("bucket_critical must be <= 100"));
    }
    if !(0.0..=100.0).contains(&self.confidence_floor)
      || !(0.0..=100.0).contains(&self.confidence_max)
      || self.confidence_floor > self.confidence_max
    {
      return Err(EngineError::config(
        "confidence bounds must satisfy 0 <= floor <= max <= 100",
      ));
    }
    if self.full_confidence_points < 2 {
      return Err(EngineError::config("full_confidence_points must be >= 2"));
    }
    if self.recency_days < 0 {
      return Err(EngineError::config("recency_days must be >= 0"));
    }
    if self.trend_epsilon < 0.0 {
      return Err(EngineError::config("trend_epsilon must be >= 0"));
    }
    validate_months("history_months", self.history_months)?;
    Ok(())
  }
}

/// Month counts must be 1..=MAX_HISTORY_MONTHS.
pub fn validate_months(field: &str, months: u32) -> Result<(), EngineError> {
  if months == 0 || months > MAX_HISTORY_MONTHS {
    return Err(EngineError::config(format!(
      "{} must be between 1 and {}, got {}",
      field, MAX_HISTORY_MONTHS, months
    )));
  }
  Ok(())
}

/// Fixed word lists for the keyword pass over issue summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextVocabulary {
  pub urgent: Vec<String>,
  pub negative: Vec<String>,
  pub positive: Vec<String>,
  pub stopwords: Vec<String>,
  /// Category name -> keywords; a summary counts once per matching category.
  pub categories: BTreeMap<String, Vec<String>>,
}

fn words(list: &[&str]) -> Vec<String> {
  list.iter().map(|w| w.to_string()).collect()
}

impl Default for TextVocabulary {
  fn default() -> Self {
    Self {
      urgent: words(&[
        "critical",
        "urgent",
        "blocking",
        "blocker",
        "timeout",
        "crash",
        "emergency",
        "asap",
        "show-stopper",
        "outage",
      ]),
      negative: words(&[
        "broken", "failed", "fail", "failure", "critical", "urgent", "crash", "error", "timeout",
        "bug",
      ]),
      positive: words(&["fixed", "resolved", "improved", "working", "stable"]),
      stopwords: words(&[
        "the", "and", "for", "with", "from", "that", "this", "when", "are", "was", "not", "but",
        "can", "has", "have", "after", "into", "on", "in", "of", "to", "is", "it", "an", "a",
        "at", "by", "be", "or", "as", "does", "doesn't", "don't", "cannot", "can't", "while",
        "some", "all", "any", "user", "users", "app",
      ]),
      categories: BTreeMap::from([
        (
          "UI/UX".to_string(),
          words(&["button", "display", "layout", "ui", "interface", "design", "screen"]),
        ),
        (
          "Performance".to_string(),
          words(&["slow", "timeout", "performance", "lag", "speed", "memory"]),
        ),
        (
          "Functionality".to_string(),
          words(&["feature", "function", "work", "broken", "fail", "failed"]),
        ),
        (
          "Security".to_string(),
          words(&["security", "auth", "login", "permission", "access", "token"]),
        ),
        (
          "Data".to_string(),
          words(&["data", "database", "save", "load", "sync"]),
        ),
      ]),
    }
  }
}

/// Bug-count bands for threshold alerts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertThresholds {
  pub high: u64,
  pub critical: u64,
  pub urgent: u64,
  /// Hours a (project, component) alert stays suppressed after firing.
  pub cooldown_hours: i64,
}

impl Default for AlertThresholds {
  fn default() -> Self {
    Self {
      high: 5,
      critical: 10,
      urgent: 15,
      cooldown_hours: 24,
    }
  }
}
