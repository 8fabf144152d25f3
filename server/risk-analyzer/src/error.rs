//! Structured error types for the risk analyzer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
  #[error("validation: {field}: {reason}")]
  Validation { field: String, reason: String },

  #[error("parse: {0}")]
  Parse(String),

  #[error("json: {0}")]
  Json(#[from] serde_json::Error),

  #[error("config: {0}")]
  Config(String),

  #[error("issue source: {0}")]
  Source(String),
}

impl EngineError {
  pub fn validation(field: &str, reason: &str) -> Self {
    Self::Validation {
      field: field.to_string(),
      reason: reason.to_string(),
    }
  }

  pub fn parse(msg: impl Into<String>) -> Self {
    Self::Parse(msg.into())
  }

  pub fn config(msg: impl Into<String>) -> Self {
    Self::Config(msg.into())
  }

  pub fn unavailable(msg: impl Into<String>) -> Self {
    Self::Source(msg.into())
  }
}

impl From<toml::de::Error> for EngineError {
  fn from(e: toml::de::Error) -> Self {
    Self::Config(e.to_string())
  }
}
