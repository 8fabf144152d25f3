//! Bug Risk Analyzer: deterministic, rule-based issue-tracker analytics.
//!
//! Takes a batch of issues (component, severity, date, summary) and produces
//! per-component risk scores and buckets, an aggregate project health score,
//! a monthly history with a linear forecast, and keyword text signals.
//!
//! No ML, no DB, no network; pure computation. Issue data and settings come
//! in through the `IssueSource` / `ConfigStore` traits.

pub mod alerts;
pub mod analyzer;
pub mod component_risk;
pub mod config;
pub mod error;
pub mod forecast;
pub mod health;
pub mod history;
pub mod normalize;
pub mod sources;
pub mod temporal;
pub mod text_signals;
pub mod types;

pub use alerts::AlertTracker;
pub use analyzer::{RiskAnalyzer, ALL_PROJECTS};
pub use config::Config;
pub use error::EngineError;
pub use sources::{ConfigStore, InMemoryIssueSource, IssueSource, StaticConfigStore};
pub use types::{AnalysisReport, Issue, RawIssue};
