//! Validate inbound issue records into canonical `Issue`s.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::warn;

use crate::error::EngineError;
use crate::types::*;

/// Validated issues plus the records that were excluded.
#[derive(Debug, Clone, Default)]
pub struct Normalized {
  pub issues: Vec<Issue>,
  pub skipped: Vec<SkippedRecord>,
}

/// Parse and normalize one RawIssue.
pub fn normalize(raw: &RawIssue) -> Result<Issue, EngineError> {
  let created_raw = raw
    .created_at
    .as_deref()
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .ok_or_else(|| EngineError::validation("created_at", "missing"))?;
  let created_at = parse_timestamp(created_raw)?;

  let severity = match raw.severity.as_deref().map(str::trim) {
    None | Some("") => None,
    Some(s) => Some(Severity::from_str_loose(s).ok_or_else(|| {
      EngineError::validation(
        "severity",
        &format!("unknown severity {:?}; expected critical|high|medium|low", s),
      )
    })?),
  };

  let component = raw
    .component
    .as_deref()
    .map(str::trim)
    .filter(|c| !c.is_empty())
    .map(str::to_string);

  Ok(Issue {
    project: raw.project.trim().to_string(),
    key: raw.key.clone(),
    component,
    severity,
    created_at,
    summary: raw.summary.clone().unwrap_or_default(),
  })
}

/// Normalize a batch. Invalid records are skipped, never fatal.
pub fn normalize_all(raws: &[RawIssue]) -> Normalized {
  let mut out = Normalized::default();
  for (index, raw) in raws.iter().enumerate() {
    match normalize(raw) {
      Ok(issue) => out.issues.push(issue),
      Err(e) => {
        let (field, reason) = match e {
          EngineError::Validation { field, reason } => (field, reason),
          other => ("record".to_string(), other.to_string()),
        };
        warn!(index, key = ?raw.key, %field, %reason, "skipping malformed issue");
        out.skipped.push(SkippedRecord {
          index,
          key: raw.key.clone(),
          field,
          reason,
        });
      }
    }
  }
  out
}

/// Accepts RFC 3339, JIRA's `2024-01-15T10:30:00.000+0000`, or `YYYY-MM-DD`.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, EngineError> {
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Ok(dt.with_timezone(&Utc));
  }
  if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z") {
    return Ok(dt.with_timezone(&Utc));
  }
  if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
    return Ok(naive.and_utc());
  }
  if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
    if let Some(naive) = date.and_hms_opt(0, 0, 0) {
      return Ok(naive.and_utc());
    }
  }
  Err(EngineError::validation(
    "created_at",
    &format!("unrecognized timestamp {:?}", s),
  ))
}
