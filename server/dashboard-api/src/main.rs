//! Binary entrypoint for the dashboard API.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use risk_analyzer::{Config, InMemoryIssueSource, RiskAnalyzer, StaticConfigStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

use dashboard_api::{router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  init_tracing();

  let port: u16 = std::env::var("PORT")
    .unwrap_or_else(|_| "5004".into())
    .parse()?;
  let bind: IpAddr = std::env::var("BIND")
    .unwrap_or_else(|_| "127.0.0.1".into())
    .parse()?;

  let config = match std::env::var("ANALYZER_CONFIG") {
    Ok(path) => Config::load(path)?,
    Err(_) => Config::default(),
  };
  let settings = match std::env::var("SETTINGS_PATH") {
    Ok(path) => StaticConfigStore::load(path)?,
    Err(_) => StaticConfigStore::default(),
  };
  let issues = match std::env::var("ISSUES_PATH") {
    Ok(path) => InMemoryIssueSource::load(path)?,
    Err(_) => InMemoryIssueSource::default(),
  };
  info!(
    projects = settings.projects.len(),
    issues = issues.len(),
    months = settings.analysis_months,
    "loaded settings"
  );

  let state = Arc::new(AppState::new(RiskAnalyzer::new(config), settings, issues));
  let app = router(state);

  let addr = SocketAddr::from((bind, port));
  info!("dashboard-api listening on http://{}", addr);

  let listener = tokio::net::TcpListener::bind(addr).await?;
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;

  Ok(())
}

fn init_tracing() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let log_json = std::env::var("LOG_JSON").is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));
  if log_json {
    tracing_subscriber::fmt().with_env_filter(filter).json().init();
  } else {
    tracing_subscriber::fmt().with_env_filter(filter).init();
  }
}

async fn shutdown_signal() {
  let _ = tokio::signal::ctrl_c().await;
  info!("shutting down");
}
