//! Aggregate project health from the component risk table.

use crate::config::Config;
use crate::types::{
  BusinessImpact, ComponentRiskEntry, ForecastResult, HealthLevel, ProjectHealthSummary,
  RiskBucket, TrendDirection,
};

/// Build the project health summary.
///
/// No components means no detected risk: 100 / Low / Stable.
pub fn summarize(
  entries: &[ComponentRiskEntry],
  total_issue_count: u64,
  forecast: Option<&ForecastResult>,
  config: &Config,
) -> ProjectHealthSummary {
  let critical = entries
    .iter()
    .filter(|e| e.risk_bucket == RiskBucket::Critical)
    .count();
  let high = entries
    .iter()
    .filter(|e| e.risk_bucket == RiskBucket::High)
    .count();

  let deduction = (critical as u64) * config.health_critical_deduction as u64
    + (high as u64) * config.health_high_deduction as u64;
  let health_score = 100u64.saturating_sub(deduction) as u8;

  let business_impact = match critical {
    0 => BusinessImpact::Low,
    1 => BusinessImpact::Medium,
    _ => BusinessImpact::High,
  };

  let trend_direction = if entries.is_empty() {
    TrendDirection::Stable
  } else {
    forecast
      .map(|f| trend_direction(f.trend_slope, config.trend_epsilon))
      .unwrap_or(TrendDirection::Stable)
  };

  ProjectHealthSummary {
    health_score,
    health_level: HealthLevel::from_score(health_score),
    business_impact,
    trend_direction,
    total_issues: total_issue_count,
    components_affected: entries.len(),
    critical_components: critical,
    high_components: high,
  }
}

/// Rising bug counts mean declining health.
pub fn trend_direction(slope: f64, epsilon: f64) -> TrendDirection {
  if slope > epsilon {
    TrendDirection::Declining
  } else if slope < -epsilon {
    TrendDirection::Improving
  } else {
    TrendDirection::Stable
  }
}
