//! Calendar-month bucketing and per-component trend lines.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, TimeZone, Utc};

use crate::config::{Config, MAX_HISTORY_MONTHS};
use crate::forecast;
use crate::types::{ComponentTrend, ComponentTrendDirection, HistoryPoint, Issue};

/// Month bucket key: "YYYY-MM".
pub fn month_bucket(ts: &DateTime<Utc>) -> String {
  ts.format("%Y-%m").to_string()
}

/// (year, month) pairs for the `months` calendar months ending with `as_of`'s
/// month. Capped at `MAX_HISTORY_MONTHS` for configs that skipped validation.
fn month_window(as_of: &DateTime<Utc>, months: u32) -> Vec<(i32, u32)> {
  let months = months.min(MAX_HISTORY_MONTHS);
  let mut year = as_of.year();
  let mut month = as_of.month();
  let mut out = Vec::with_capacity(months as usize);
  for _ in 0..months {
    out.push((year, month));
    if month == 1 {
      month = 12;
      year -= 1;
    } else {
      month -= 1;
    }
  }
  out.reverse();
  out
}

/// Midnight UTC on the first day of the oldest month in the window.
pub fn window_start(as_of: &DateTime<Utc>, months: u32) -> DateTime<Utc> {
  let (year, month) = month_window(as_of, months.max(1))[0];
  Utc
    .with_ymd_and_hms(year, month, 1, 0, 0, 0)
    .single()
    .unwrap_or(*as_of)
}

fn label((year, month): (i32, u32)) -> String {
  format!("{:04}-{:02}", year, month)
}

/// Monthly bug counts, chronological, zero-filled. The last month is
/// partial (up to `as_of`); issues outside the window are ignored.
pub fn monthly_history(issues: &[Issue], as_of: DateTime<Utc>, months: u32) -> Vec<HistoryPoint> {
  let window = month_window(&as_of, months);
  let mut counts: HashMap<String, u64> = HashMap::new();
  for issue in issues.iter().filter(|i| i.created_at <= as_of) {
    *counts.entry(month_bucket(&issue.created_at)).or_insert(0) += 1;
  }
  window
    .into_iter()
    .map(|ym| {
      let period = label(ym);
      let count = counts.get(&period).copied().unwrap_or(0);
      HistoryPoint { period, count }
    })
    .collect()
}

/// Per-component monthly series with slope and direction.
///
/// Needs at least two months to fit a line; sorted by total desc, then name.
pub fn component_trends(
  issues: &[Issue],
  as_of: DateTime<Utc>,
  months: u32,
  config: &Config,
) -> Vec<ComponentTrend> {
  if months < 2 {
    return Vec::new();
  }
  let window: Vec<String> = month_window(&as_of, months).into_iter().map(label).collect();
  let index: HashMap<&str, usize> = window
    .iter()
    .enumerate()
    .map(|(i, m)| (m.as_str(), i))
    .collect();

  let mut series: BTreeMap<&str, Vec<u64>> = BTreeMap::new();
  for issue in issues.iter().filter(|i| i.created_at <= as_of) {
    let Some(component) = issue.component.as_deref() else {
      continue;
    };
    let bucket = month_bucket(&issue.created_at);
    let Some(&slot) = index.get(bucket.as_str()) else {
      continue;
    };
    series
      .entry(component)
      .or_insert_with(|| vec![0; window.len()])[slot] += 1;
  }

  let mut trends: Vec<ComponentTrend> = series
    .into_iter()
    .filter_map(|(name, counts)| {
      let as_f64: Vec<f64> = counts.iter().map(|&c| c as f64).collect();
      let fit = forecast::fit_line(&as_f64)?;
      let total: u64 = counts.iter().sum();
      let direction = if fit.slope > config.trend_epsilon {
        ComponentTrendDirection::Increasing
      } else if fit.slope < -config.trend_epsilon {
        ComponentTrendDirection::Decreasing
      } else {
        ComponentTrendDirection::Stable
      };
      Some(ComponentTrend {
        component_name: name.to_string(),
        total_bugs: total,
        avg_per_month: ((total as f64 / counts.len() as f64) * 10.0).round() / 10.0,
        trend_slope: (fit.slope * 100.0).round() / 100.0,
        direction,
        monthly_counts: counts,
      })
    })
    .collect();

  trends.sort_by(|a, b| {
    b.total_bugs
      .cmp(&a.total_bugs)
      .then_with(|| a.component_name.cmp(&b.component_name))
  });
  trends
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 9, 0, 0).unwrap()
  }

  fn issue(component: Option<&str>, created: DateTime<Utc>) -> Issue {
    Issue {
      project: "IOS".into(),
      key: None,
      component: component.map(Into::into),
      severity: None,
      created_at: created,
      summary: String::new(),
    }
  }

  #[test]
  fn window_start_is_first_of_oldest_month() {
    assert_eq!(
      window_start(&at(2024, 2, 10), 3),
      Utc.with_ymd_and_hms(2023, 12, 1, 0, 0, 0).unwrap()
    );
    assert_eq!(
      window_start(&at(2024, 2, 10), 1),
      Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()
    );
  }

  #[test]
  fn month_bucket_format() {
    assert_eq!(month_bucket(&at(2025, 6, 1)), "2025-06");
  }

  #[test]
  fn window_crosses_year_boundary() {
    let h = monthly_history(&[], at(2024, 2, 10), 4);
    let periods: Vec<_> = h.iter().map(|p| p.period.as_str()).collect();
    assert_eq!(periods, vec!["2023-11", "2023-12", "2024-01", "2024-02"]);
    assert!(h.iter().all(|p| p.count == 0));
  }

  #[test]
  fn counts_zero_fill_and_ignore_out_of_window() {
    let issues = vec![
      issue(Some("A"), at(2024, 1, 3)),
      issue(None, at(2024, 1, 20)),
      issue(Some("B"), at(2024, 3, 1)),
      issue(Some("B"), at(2023, 6, 1)),
      issue(Some("B"), at(2024, 4, 1)),
    ];
    let h = monthly_history(&issues, at(2024, 3, 15), 3);
    assert_eq!(
      h,
      vec![
        HistoryPoint::new("2024-01", 2),
        HistoryPoint::new("2024-02", 0),
        HistoryPoint::new("2024-03", 1),
      ]
    );
  }

  #[test]
  fn component_trend_directions() {
    let mut issues = Vec::new();
    // Rising: 0, 2, 4
    for _ in 0..2 {
      issues.push(issue(Some("Rising"), at(2024, 2, 5)));
    }
    for _ in 0..4 {
      issues.push(issue(Some("Rising"), at(2024, 3, 5)));
    }
    // Falling: 3, 1, 0
    for _ in 0..3 {
      issues.push(issue(Some("Falling"), at(2024, 1, 5)));
    }
    issues.push(issue(Some("Falling"), at(2024, 2, 5)));
    // Flat: 1, 1, 1
    for m in 1..=3 {
      issues.push(issue(Some("Flat"), at(2024, m, 5)));
    }

    let trends = component_trends(&issues, at(2024, 3, 20), 3, &Config::default());
    let by_name = |n: &str| trends.iter().find(|t| t.component_name == n).unwrap();

    assert_eq!(by_name("Rising").direction, ComponentTrendDirection::Increasing);
    assert_eq!(by_name("Rising").monthly_counts, vec![0, 2, 4]);
    assert_eq!(by_name("Falling").direction, ComponentTrendDirection::Decreasing);
    assert_eq!(by_name("Flat").direction, ComponentTrendDirection::Stable);
    assert_eq!(by_name("Flat").avg_per_month, 1.0);

    // Sorted by total desc.
    assert_eq!(trends[0].component_name, "Rising");
  }

  #[test]
  fn oversized_window_is_capped() {
    let h = monthly_history(&[], at(2024, 3, 1), u32::MAX);
    assert_eq!(h.len(), MAX_HISTORY_MONTHS as usize);
    assert_eq!(h.last().map(|p| p.period.as_str()), Some("2024-03"));
  }

  #[test]
  fn single_month_has_no_trends() {
    let issues = vec![issue(Some("A"), at(2024, 3, 1))];
    assert!(component_trends(&issues, at(2024, 3, 2), 1, &Config::default()).is_empty());
  }
}
