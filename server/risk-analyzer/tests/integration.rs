//! Integration tests for the risk analyzer.

use chrono::{TimeZone, Utc};
use risk_analyzer::normalize::normalize_all;
use risk_analyzer::types::*;
use risk_analyzer::{Config, InMemoryIssueSource, RawIssue, RiskAnalyzer, StaticConfigStore};

fn parse_lines(raw: &str) -> Vec<RawIssue> {
  raw
    .lines()
    .map(str::trim)
    .filter(|l| !l.is_empty())
    .map(|l| serde_json::from_str(l).unwrap())
    .collect()
}

fn auth_payment_fixture() -> Vec<RawIssue> {
  parse_lines(
    r#"
    {"project":"AND","key":"AND-1","component":"Auth","severity":"Critical","created":"2024-01-01","summary":"Critical payment issue affecting customers"}
    {"project":"AND","key":"AND-2","component":"Auth","severity":"Critical","created":"2024-01-02","summary":"Login timeout error"}
    {"project":"AND","key":"AND-3","component":"Payment","severity":"Low","created":"2024-01-01","summary":"Receipt layout off by a pixel"}
    "#,
  )
}

#[test]
fn auth_and_payment_end_to_end() {
  let analyzer = RiskAnalyzer::with_defaults();
  let report = analyzer.analyze("AND", &auth_payment_fixture(), None);

  assert_eq!(report.as_of.as_deref(), Some("2024-01-02T00:00:00+00:00"));
  assert_eq!(report.components.len(), 2);

  let auth = &report.components[0];
  assert_eq!(auth.component_name, "Auth");
  assert_eq!(auth.bug_count, 2);
  assert_eq!(auth.critical_count, 2);
  assert_eq!(auth.recent_count, 2);
  assert_eq!(auth.risk_score, 80);
  assert_eq!(auth.risk_bucket, RiskBucket::Critical);

  let payment = &report.components[1];
  assert_eq!(payment.component_name, "Payment");
  assert_eq!(payment.risk_score, 25);
  assert_eq!(payment.risk_bucket, RiskBucket::Low);

  assert_eq!(report.health.health_score, 75);
  assert_eq!(report.health.business_impact, BusinessImpact::Medium);
  assert_eq!(report.health.critical_components, 1);
  assert_eq!(report.health.total_issues, 3);
}

#[test]
fn component_risk_without_as_of_uses_newest_issue() {
  let analyzer = RiskAnalyzer::with_defaults();
  let issues = normalize_all(&auth_payment_fixture()).issues;
  let entries = analyzer.compute_component_risk(&issues);
  let names: Vec<_> = entries.iter().map(|e| e.component_name.as_str()).collect();
  assert_eq!(names, vec!["Auth", "Payment"]);
}

#[test]
fn report_is_deterministic() {
  let analyzer = RiskAnalyzer::with_defaults();
  let raws = auth_payment_fixture();
  let a = serde_json::to_string(&analyzer.analyze("AND", &raws, None)).unwrap();
  let b = serde_json::to_string(&analyzer.analyze("AND", &raws, None)).unwrap();
  assert_eq!(a, b);
}

#[test]
fn input_order_does_not_change_scores() {
  let analyzer = RiskAnalyzer::with_defaults();
  let mut raws = auth_payment_fixture();
  let forward = analyzer.analyze("AND", &raws, None);
  raws.reverse();
  let backward = analyzer.analyze("AND", &raws, None);
  assert_eq!(forward.components, backward.components);
  assert_eq!(forward.health, backward.health);
  assert_eq!(forward.history, backward.history);
}

#[test]
fn text_signals_from_summaries() {
  let config = Config {
    vocabulary: risk_analyzer::config::TextVocabulary {
      urgent: vec!["critical".into(), "timeout".into()],
      ..Default::default()
    },
    ..Config::default()
  };
  let analyzer = RiskAnalyzer::new(config);
  let issues = normalize_all(&auth_payment_fixture()[..2]).issues;
  let signals = analyzer.extract_text_signals(&issues);
  assert_eq!(signals.urgent_count, 2);
}

#[test]
fn malformed_records_are_skipped_with_reasons() {
  let raws = parse_lines(
    r#"
    {"project":"AND","key":"AND-1","component":"Auth","severity":"High","created_at":"2024-02-01"}
    {"project":"AND","key":"AND-2","component":"Auth","severity":"Blocker-ish","created_at":"2024-02-01"}
    {"project":"AND","key":"AND-3","component":"Auth","severity":"High","created_at":"yesterday"}
    {"project":"AND","key":"AND-4","component":"Auth","severity":"High"}
    "#,
  );
  let report = RiskAnalyzer::with_defaults().analyze("AND", &raws, None);
  assert_eq!(report.total_issues, 1);
  assert_eq!(report.skipped_count, 3);
  let keys: Vec<_> = report
    .skipped
    .iter()
    .map(|s| s.key.as_deref().unwrap_or(""))
    .collect();
  assert_eq!(keys, vec!["AND-2", "AND-3", "AND-4"]);
  assert_eq!(report.skipped[0].field, "severity");
  assert_eq!(report.skipped[2].field, "created_at");
}

#[test]
fn history_and_forecast_follow_monthly_growth() {
  // 1, 2, 3, 4 bugs across Jan..Apr.
  let mut lines = Vec::new();
  for (month, count) in [(1, 1), (2, 2), (3, 3), (4, 4)] {
    for day in 1..=count {
      lines.push(format!(
        r#"{{"project":"IOS","component":"Sync","severity":"Medium","created_at":"2024-{:02}-{:02}"}}"#,
        month, day
      ));
    }
  }
  let raws = parse_lines(&lines.join("\n"));
  let config = Config {
    history_months: 4,
    ..Config::default()
  };
  let as_of = Utc.with_ymd_and_hms(2024, 4, 30, 0, 0, 0).unwrap();
  let report = RiskAnalyzer::new(config).analyze("IOS", &raws, Some(as_of));

  let counts: Vec<u64> = report.history.iter().map(|p| p.count).collect();
  assert_eq!(counts, vec![1, 2, 3, 4]);
  assert_eq!(report.history[0].period, "2024-01");
  assert_eq!(report.forecast.predicted_next_period_count, 5);
  assert_eq!(report.forecast.confidence, 95);
  assert_eq!(report.health.trend_direction, TrendDirection::Declining);
  assert_eq!(report.component_trends.len(), 1);
  assert_eq!(
    report.component_trends[0].direction,
    ComponentTrendDirection::Increasing
  );
}

#[test]
fn report_serializes_with_stable_field_names() {
  let report = RiskAnalyzer::with_defaults().analyze("AND", &auth_payment_fixture(), None);
  let value = serde_json::to_value(&report).unwrap();
  assert_eq!(value["project"], "AND");
  assert_eq!(value["components"][0]["component_name"], "Auth");
  assert!(value["components"][0]["contributing_factors"].is_object());
  assert!(value["health"]["health_score"].is_number());
  assert!(value["forecast"]["confidence"].is_number());
  assert!(value.get("skipped").is_none());
}

#[test]
fn source_and_store_drive_project_analysis() {
  let store = StaticConfigStore::from_toml_str(
    r#"
    analysis_months = 3
    [[projects]]
    key = "AND"
    name = "Android"
    "#,
  )
  .unwrap();
  let source = InMemoryIssueSource::from_json_lines(
    r#"
    {"project":"AND","component":"Auth","severity":"Critical","created_at":"2024-03-01"}
    {"project":"AND","component":"Auth","severity":"Critical","created_at":"2024-03-02"}
    {"project":"AND","component":"Auth","severity":"Low","created_at":"2023-06-02"}
    "#,
  )
  .unwrap();
  let now = Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap();
  let report = RiskAnalyzer::with_defaults()
    .analyze_project(&source, &store, "AND", now)
    .unwrap();
  assert_eq!(report.total_issues, 2);
  assert_eq!(report.history.len(), 3);
  assert_eq!(report.components[0].risk_bucket, RiskBucket::Critical);
}
