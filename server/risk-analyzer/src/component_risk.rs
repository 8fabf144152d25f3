//! Per-component bug tally and risk scoring.
//!
//! score = bugs * W_volume + severe * W_severity + recent * W_recency - stability_bonus,
//! clamped to 0..=100, then bucketed by inclusive lower bounds.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

use crate::config::Config;
use crate::types::{ComponentRiskEntry, Issue, RiskBucket, RiskFactors};

#[derive(Default)]
struct Tally {
  bugs: u64,
  severe: u64,
  recent: u64,
}

/// End of the analysis range when the caller gives none: the newest issue.
pub fn analysis_end(issues: &[Issue]) -> Option<DateTime<Utc>> {
  issues.iter().map(|i| i.created_at).max()
}

/// Map a bounded score to its bucket.
pub fn bucket_for(score: u8, config: &Config) -> RiskBucket {
  if score >= config.bucket_critical {
    RiskBucket::Critical
  } else if score >= config.bucket_high {
    RiskBucket::High
  } else if score >= config.bucket_medium {
    RiskBucket::Medium
  } else {
    RiskBucket::Low
  }
}

/// Score every component that has at least one issue.
///
/// Issues without a component, or created after `as_of`, are ignored here.
/// Output is sorted by risk_score desc, then component_name asc.
pub fn score_components(
  issues: &[Issue],
  as_of: DateTime<Utc>,
  config: &Config,
) -> Vec<ComponentRiskEntry> {
  let recent_cutoff = as_of - Duration::days(config.recency_days);

  let mut tallies: BTreeMap<&str, Tally> = BTreeMap::new();
  for issue in issues.iter().filter(|i| i.created_at <= as_of) {
    let Some(component) = issue.component.as_deref() else {
      continue;
    };
    let tally = tallies.entry(component).or_default();
    tally.bugs += 1;
    if issue.severity.is_some_and(|s| s.is_severe()) {
      tally.severe += 1;
    }
    if issue.created_at >= recent_cutoff {
      tally.recent += 1;
    }
  }

  if tallies.is_empty() {
    return Vec::new();
  }

  let total_bugs: u64 = tallies.values().map(|t| t.bugs).sum();
  let mean_bugs = total_bugs as f64 / tallies.len() as f64;

  let mut entries: Vec<ComponentRiskEntry> = tallies
    .into_iter()
    .map(|(name, tally)| {
      let factors = RiskFactors {
        volume: points(tally.bugs, config.weight_volume),
        severity: points(tally.severe, config.weight_severity),
        recency: points(tally.recent, config.weight_recency),
        stability_bonus: if tally.recent == 0 && (tally.bugs as f64) < mean_bugs {
          config.stability_bonus
        } else {
          0
        },
      };
      let raw = factors.volume as i64 + factors.severity as i64 + factors.recency as i64
        - factors.stability_bonus as i64;
      let risk_score = raw.clamp(0, 100) as u8;

      ComponentRiskEntry {
        component_name: name.to_string(),
        bug_count: tally.bugs,
        critical_count: tally.severe,
        recent_count: tally.recent,
        risk_score,
        risk_bucket: bucket_for(risk_score, config),
        contributing_factors: factors,
      }
    })
    .collect();

  // Deterministic sort: score desc, then name asc.
  entries.sort_by(|a, b| {
    b.risk_score
      .cmp(&a.risk_score)
      .then_with(|| a.component_name.cmp(&b.component_name))
  });

  entries
}

/// count * weight, saturating so huge inputs still clamp to 100 later.
fn points(count: u64, weight: u32) -> u32 {
  u32::try_from(count)
    .unwrap_or(u32::MAX)
    .saturating_mul(weight)
}
