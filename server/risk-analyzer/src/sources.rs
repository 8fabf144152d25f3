//! Collaborator seams: where issues and settings come from.
//!
//! The analyzer never fetches or reads settings itself; callers inject an
//! `IssueSource` and a `ConfigStore`. The implementations here are static
//! (in-memory / file-loaded), suitable for the CLI, the HTTP service and tests.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::config::validate_months;
use crate::error::EngineError;
use crate::normalize::parse_timestamp;
use crate::types::RawIssue;

/// Supplies raw issue records for a project created on or after `since`.
pub trait IssueSource {
  fn fetch(&self, project_key: &str, since: DateTime<Utc>) -> Result<Vec<RawIssue>, EngineError>;
}

/// Supplies which projects to analyze and how to reach the tracker.
pub trait ConfigStore {
  fn enabled_projects(&self) -> Vec<ProjectRef>;
  fn jira_credentials(&self) -> Option<JiraCredentials>;
  /// Calendar months of history to analyze.
  fn analysis_months(&self) -> u32;
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProjectRef {
  pub key: String,
  #[serde(default)]
  pub name: String,
  #[serde(default = "enabled_by_default")]
  pub enabled: bool,
}

fn enabled_by_default() -> bool {
  true
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct JiraCredentials {
  pub url: String,
  pub email: String,
  pub api_token: String,
}

impl fmt::Debug for JiraCredentials {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let tail: String = self
      .api_token
      .chars()
      .rev()
      .take(4)
      .collect::<Vec<_>>()
      .into_iter()
      .rev()
      .collect();
    f.debug_struct("JiraCredentials")
      .field("url", &self.url)
      .field("email", &self.email)
      .field("api_token", &format!("****{}", tail))
      .finish()
  }
}

// ---------------------------------------------------------------------------
// Static settings (TOML)
// ---------------------------------------------------------------------------

/// Settings file layout:
///
/// ```toml
/// analysis_months = 6
///
/// [jira]
/// url = "https://example.atlassian.net/"
/// email = "qa@example.com"
/// api_token = "..."
///
/// [[projects]]
/// key = "AND"
/// name = "Android"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct StaticConfigStore {
  #[serde(default = "default_months")]
  pub analysis_months: u32,
  #[serde(default)]
  pub jira: Option<JiraCredentials>,
  #[serde(default)]
  pub projects: Vec<ProjectRef>,
}

fn default_months() -> u32 {
  6
}

impl Default for StaticConfigStore {
  fn default() -> Self {
    Self {
      analysis_months: default_months(),
      jira: None,
      projects: Vec::new(),
    }
  }
}

impl StaticConfigStore {
  pub fn from_toml_str(raw: &str) -> Result<Self, EngineError> {
    let store: StaticConfigStore = toml::from_str(raw)?;
    validate_months("analysis_months", store.analysis_months)?;
    Ok(store)
  }

  pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
      .map_err(|e| EngineError::config(format!("read {}: {}", path.display(), e)))?;
    Self::from_toml_str(&raw)
  }

  pub fn is_enabled(&self, project_key: &str) -> bool {
    self
      .projects
      .iter()
      .any(|p| p.enabled && p.key.eq_ignore_ascii_case(project_key))
  }
}

impl ConfigStore for StaticConfigStore {
  fn enabled_projects(&self) -> Vec<ProjectRef> {
    self.projects.iter().filter(|p| p.enabled).cloned().collect()
  }

  fn jira_credentials(&self) -> Option<JiraCredentials> {
    self.jira.clone()
  }

  fn analysis_months(&self) -> u32 {
    self.analysis_months
  }
}

// ---------------------------------------------------------------------------
// In-memory issue source
// ---------------------------------------------------------------------------

/// Issues held in memory, e.g. loaded from a JSON-lines export.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIssueSource {
  issues: Vec<RawIssue>,
}

impl InMemoryIssueSource {
  pub fn new(issues: Vec<RawIssue>) -> Self {
    Self { issues }
  }

  /// One `RawIssue` JSON object per non-blank line.
  pub fn from_json_lines(raw: &str) -> Result<Self, EngineError> {
    let issues = raw
      .lines()
      .map(str::trim)
      .filter(|l| !l.is_empty())
      .map(|line| serde_json::from_str::<RawIssue>(line))
      .collect::<Result<Vec<_>, _>>()?;
    Ok(Self::new(issues))
  }

  pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
      .map_err(|e| EngineError::unavailable(format!("read {}: {}", path.display(), e)))?;
    Self::from_json_lines(&raw)
  }

  pub fn len(&self) -> usize {
    self.issues.len()
  }

  pub fn is_empty(&self) -> bool {
    self.issues.is_empty()
  }
}

impl IssueSource for InMemoryIssueSource {
  /// Records whose date cannot be parsed are passed through so the
  /// analyzer reports them as skipped instead of silently dropping them.
  fn fetch(&self, project_key: &str, since: DateTime<Utc>) -> Result<Vec<RawIssue>, EngineError> {
    Ok(
      self
        .issues
        .iter()
        .filter(|i| i.project.eq_ignore_ascii_case(project_key))
        .filter(|i| match i.created_at.as_deref().map(parse_timestamp) {
          Some(Ok(ts)) => ts >= since,
          _ => true,
        })
        .cloned()
        .collect(),
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  #[test]
  fn settings_parse_and_filter_enabled() {
    let store = StaticConfigStore::from_toml_str(
      r#"
      analysis_months = 3

      [jira]
      url = "https://example.atlassian.net/"
      email = "qa@example.com"
      api_token = "secret-token-1234"

      [[projects]]
      key = "AND"
      name = "Android"

      [[projects]]
      key = "IOS"
      enabled = false
      "#,
    )
    .unwrap();
    assert_eq!(store.analysis_months(), 3);
    let enabled = store.enabled_projects();
    assert_eq!(enabled.len(), 1);
    assert_eq!(enabled[0].key, "AND");
    assert!(store.is_enabled("and"));
    assert!(!store.is_enabled("IOS"));
    assert!(store.jira_credentials().is_some());
  }

  #[test]
  fn credentials_debug_masks_token() {
    let creds = JiraCredentials {
      url: "https://example.atlassian.net/".into(),
      email: "qa@example.com".into(),
      api_token: "secret-token-1234".into(),
    };
    let shown = format!("{:?}", creds);
    assert!(!shown.contains("secret-token"));
    assert!(shown.contains("****1234"));
  }

  #[test]
  fn analysis_months_bounds() {
    assert!(StaticConfigStore::from_toml_str("analysis_months = 0").is_err());
    assert!(StaticConfigStore::from_toml_str("analysis_months = 1").is_ok());
    assert!(StaticConfigStore::from_toml_str("analysis_months = 120").is_ok());
    assert!(StaticConfigStore::from_toml_str("analysis_months = 4294967295").is_err());
  }

  #[test]
  fn in_memory_source_filters_project_and_date() {
    let source = InMemoryIssueSource::from_json_lines(
      r#"
      {"project":"AND","component":"Auth","created_at":"2024-03-01"}
      {"project":"AND","component":"Auth","created_at":"2023-01-01"}
      {"project":"IOS","component":"Chat","created_at":"2024-03-01"}
      {"project":"AND","component":"Auth","created_at":"garbage"}
      "#,
    )
    .unwrap();
    assert_eq!(source.len(), 4);
    let since = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let fetched = source.fetch("AND", since).unwrap();
    assert_eq!(fetched.len(), 2);
    assert!(fetched.iter().all(|i| i.project == "AND"));
  }

  #[test]
  fn bad_json_line_is_an_error() {
    let err = InMemoryIssueSource::from_json_lines("{not json}").unwrap_err();
    assert!(matches!(err, EngineError::Json(_)));
  }
}
