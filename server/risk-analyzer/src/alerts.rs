//! Bug-count threshold alerts with a per-component cooldown.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::config::AlertThresholds;
use crate::types::{AlertLevel, ComponentAlert, ComponentRiskEntry};

/// Remembers when each (project, component) last alerted.
#[derive(Debug, Clone)]
pub struct AlertTracker {
  thresholds: AlertThresholds,
  last_alert: HashMap<(String, String), DateTime<Utc>>,
}

impl AlertTracker {
  pub fn new(thresholds: AlertThresholds) -> Self {
    Self {
      thresholds,
      last_alert: HashMap::new(),
    }
  }

  pub fn level_for(&self, bug_count: u64) -> Option<AlertLevel> {
    let t = &self.thresholds;
    if bug_count >= t.urgent {
      Some(AlertLevel::Urgent)
    } else if bug_count >= t.critical {
      Some(AlertLevel::Critical)
    } else if bug_count >= t.high {
      Some(AlertLevel::HighRisk)
    } else {
      None
    }
  }

  fn on_cooldown(&self, key: &(String, String), now: DateTime<Utc>) -> bool {
    self
      .last_alert
      .get(key)
      .is_some_and(|&at| now - at < Duration::hours(self.thresholds.cooldown_hours))
  }

  /// Raise alerts for components over a threshold that are not cooling down.
  /// Fired alerts start a new cooldown.
  pub fn evaluate(
    &mut self,
    project: &str,
    entries: &[ComponentRiskEntry],
    now: DateTime<Utc>,
  ) -> Vec<ComponentAlert> {
    let mut alerts = Vec::new();
    for entry in entries {
      let Some(level) = self.level_for(entry.bug_count) else {
        continue;
      };
      let key = (project.to_string(), entry.component_name.clone());
      if self.on_cooldown(&key, now) {
        continue;
      }
      self.last_alert.insert(key, now);
      alerts.push(ComponentAlert {
        project: project.to_string(),
        component_name: entry.component_name.clone(),
        bug_count: entry.bug_count,
        level,
        raised_at: now.to_rfc3339(),
        recommendations: recommendations(level),
      });
    }
    alerts
  }
}

fn recommendations(level: AlertLevel) -> Vec<String> {
  let lines: &[&str] = match level {
    AlertLevel::Urgent => &[
      "Immediate action required",
      "Run an emergency code review and regression pass on this component",
      "Assign dedicated owners to investigate root causes",
      "Consider rolling back recent changes to this component",
    ],
    AlertLevel::Critical => &[
      "Prioritize this component for immediate attention",
      "Increase test coverage and code review depth",
      "Consider refactoring if the pattern persists",
    ],
    AlertLevel::HighRisk => &[
      "Monitor closely and increase testing",
      "Review recent code changes",
      "Add automated tests around reported failures",
    ],
  };
  lines.iter().map(|s| s.to_string()).collect()
}
