//! End-to-end tests against a live listener.

use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use dashboard_api::{router, AppState};
use risk_analyzer::{InMemoryIssueSource, RiskAnalyzer, StaticConfigStore};

const SETTINGS: &str = r#"
analysis_months = 3

[[projects]]
key = "AND"
name = "Android"

[[projects]]
key = "IOS"
name = "iOS"

[[projects]]
key = "MES"
enabled = false
"#;

fn issue_lines() -> String {
  let mut lines = Vec::new();
  for day in 1..=6 {
    lines.push(format!(
      r#"{{"project":"AND","component":"Auth","severity":"Critical","created_at":"2024-03-{:02}","summary":"Login crash"}}"#,
      day
    ));
  }
  lines.push(
    r#"{"project":"IOS","component":"Chat","severity":"Low","created_at":"2024-02-10","summary":"Typo"}"#
      .to_string(),
  );
  lines.push(
    r#"{"project":"MES","component":"Inbox","severity":"High","created_at":"2024-03-02"}"#.to_string(),
  );
  lines.join("\n")
}

async fn spawn_app() -> SocketAddr {
  let settings = StaticConfigStore::from_toml_str(SETTINGS).expect("settings");
  let issues = InMemoryIssueSource::from_json_lines(&issue_lines()).expect("issues");
  let state = Arc::new(AppState::new(RiskAnalyzer::with_defaults(), settings, issues));
  let app = router(state);
  let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
    .await
    .expect("bind listener");
  let addr = listener.local_addr().expect("local addr");
  tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });
  addr
}

async fn send(addr: SocketAddr, method: &str, path: &str, body: Option<&str>) -> (u16, String) {
  let mut stream = tokio::net::TcpStream::connect(addr)
    .await
    .expect("connect server");
  let req = match body {
    Some(b) => format!(
      "{method} {path} HTTP/1.1\r\nHost: {addr}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{b}",
      b.len()
    ),
    None => format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n"),
  };
  stream
    .write_all(req.as_bytes())
    .await
    .expect("write request");
  let mut response = String::new();
  stream
    .read_to_string(&mut response)
    .await
    .expect("read response");
  let (head, body) = response
    .split_once("\r\n\r\n")
    .expect("http response separator");
  let status = head
    .lines()
    .next()
    .and_then(|line| line.split_whitespace().nth(1))
    .and_then(|s| s.parse::<u16>().ok())
    .expect("status");
  (status, body.to_string())
}

fn json(body: &str) -> Value {
  serde_json::from_str(body).expect("json body")
}

#[tokio::test]
async fn health_ok() {
  let addr = spawn_app().await;
  let (status, body) = send(addr, "GET", "/health", None).await;
  assert_eq!(status, 200);
  assert_eq!(body, "ok");
}

#[tokio::test]
async fn posted_batch_is_scored() {
  let addr = spawn_app().await;
  let payload = r#"{
    "project": "AND",
    "issues": [
      {"component":"Auth","severity":"Critical","created":"2024-01-01"},
      {"component":"Auth","severity":"Critical","created":"2024-01-02"},
      {"component":"Payment","severity":"Low","created":"2024-01-01"}
    ]
  }"#;
  let (status, body) = send(addr, "POST", "/api/analyze", Some(payload)).await;
  assert_eq!(status, 200);
  let report = json(&body);
  assert_eq!(report["project"], "AND");
  assert_eq!(report["components"][0]["component_name"], "Auth");
  assert_eq!(report["components"][0]["risk_score"], 80);
  assert_eq!(report["components"][1]["component_name"], "Payment");
  assert_eq!(report["health"]["health_score"], 75);
}

#[tokio::test]
async fn posted_as_of_bounds_the_range() {
  let addr = spawn_app().await;
  let payload = r#"{
    "project": "AND",
    "as_of": "2024-01-15",
    "issues": [
      {"component":"Auth","severity":"Low","created":"2023-12-01"},
      {"component":"Auth","severity":"Critical","created":"2024-06-01"}
    ]
  }"#;
  let (status, body) = send(addr, "POST", "/api/analyze", Some(payload)).await;
  assert_eq!(status, 200);
  let report = json(&body);
  assert_eq!(report["total_issues"], 1);
  assert_eq!(report["excluded_after_as_of"], 1);
  assert_eq!(report["components"][0]["bug_count"], 1);
  assert_eq!(report["components"][0]["recent_count"], 0);
}

#[tokio::test]
async fn bad_as_of_is_rejected_with_field() {
  let addr = spawn_app().await;
  let payload = r#"{"issues": [], "as_of": "someday"}"#;
  let (status, body) = send(addr, "POST", "/api/analyze", Some(payload)).await;
  assert_eq!(status, 400);
  let err = json(&body);
  assert_eq!(err["error"], true);
  assert_eq!(err["field"], "as_of");
}

#[tokio::test]
async fn project_route_uses_source_window() {
  let addr = spawn_app().await;
  let (status, body) = send(addr, "GET", "/api/analyze/AND?as_of=2024-03-20", None).await;
  assert_eq!(status, 200);
  let report = json(&body);
  assert_eq!(report["project"], "AND");
  assert_eq!(report["total_issues"], 6);
  assert_eq!(report["history"].as_array().map(Vec::len), Some(3));
  assert_eq!(report["components"][0]["risk_bucket"], "Critical");
}

#[tokio::test]
async fn disabled_project_is_not_found() {
  let addr = spawn_app().await;
  let (status, body) = send(addr, "GET", "/api/analyze/MES", None).await;
  assert_eq!(status, 404);
  assert_eq!(json(&body)["field"], "project");
}

#[tokio::test]
async fn combined_route_merges_enabled_projects() {
  let addr = spawn_app().await;
  let (status, body) = send(addr, "GET", "/api/analyze?as_of=2024-03-20", None).await;
  assert_eq!(status, 200);
  let report = json(&body);
  assert_eq!(report["project"], "ALL");
  assert_eq!(report["total_issues"], 7);
  assert_eq!(report["components"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn alerts_respect_cooldown() {
  let addr = spawn_app().await;
  let (status, body) = send(addr, "GET", "/api/alerts/check?as_of=2024-03-20", None).await;
  assert_eq!(status, 200);
  let first = json(&body);
  let alerts = first["alerts"].as_array().expect("alerts array");
  assert_eq!(alerts.len(), 1);
  assert_eq!(alerts[0]["component_name"], "Auth");
  assert_eq!(alerts[0]["level"], "high_risk");

  let (_, body) = send(addr, "GET", "/api/alerts/check?as_of=2024-03-20T06:00:00Z", None).await;
  assert_eq!(json(&body)["alerts"].as_array().map(Vec::len), Some(0));
}
