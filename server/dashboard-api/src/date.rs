//! Date parsing utilities.

use chrono::{DateTime, Utc};
use risk_analyzer::normalize::parse_timestamp;
use risk_analyzer::EngineError;

/// Parse an optional `as_of` parameter; a bad value is a validation error.
pub fn parse_as_of(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, EngineError> {
  match raw.map(str::trim).filter(|s| !s.is_empty()) {
    None => Ok(None),
    Some(s) => parse_timestamp(s)
      .map(Some)
      .map_err(|_| EngineError::validation("as_of", &format!("invalid timestamp {:?}", s))),
  }
}

/// `as_of` when given, else the wall clock.
pub fn resolve_now(raw: Option<&str>) -> Result<DateTime<Utc>, EngineError> {
  Ok(parse_as_of(raw)?.unwrap_or_else(Utc::now))
}
