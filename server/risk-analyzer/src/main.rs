//! Binary entrypoint: read issue JSON lines from stdin, write one
//! AnalysisReport JSON object to stdout.
//!
//! Lines that are not valid JSON, and records that fail validation, are
//! listed in the report's `skipped` array with their 0-based line number.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use risk_analyzer::normalize::parse_timestamp;
use risk_analyzer::types::{RawIssue, SkippedRecord};
use risk_analyzer::{Config, RiskAnalyzer};

#[derive(Parser, Debug)]
#[command(name = "risk-analyzer", about = "Score bug risk per component from issue JSON lines")]
struct Args {
  /// TOML file overriding the default weights, thresholds and vocabularies.
  #[arg(long, env = "ANALYZER_CONFIG")]
  config: Option<PathBuf>,
  /// End of the analysis range (RFC 3339 or YYYY-MM-DD). Defaults to the newest issue.
  #[arg(long)]
  as_of: Option<String>,
  /// Calendar months of history to bucket and forecast.
  #[arg(long)]
  months: Option<u32>,
  /// Only analyze records for this project key; also labels the report.
  #[arg(long)]
  project: Option<String>,
  /// Pretty-print the report.
  #[arg(long)]
  pretty: bool,
}

fn main() {
  init_tracing();
  if let Err(e) = run_binary() {
    let _ = writeln!(io::stderr(), "risk-analyzer error: {}", e);
    std::process::exit(1);
  }
}

/// Logs go to stderr so stdout stays a single JSON document.
fn init_tracing() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(io::stderr);
  if std::env::var("LOG_JSON").is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true")) {
    builder.json().init();
  } else {
    builder.init();
  }
}

fn run_binary() -> Result<(), Box<dyn std::error::Error>> {
  let args = Args::parse();

  let mut config = match &args.config {
    Some(path) => Config::load(path)?,
    None => Config::default(),
  };
  if let Some(months) = args.months {
    config.history_months = months;
  }
  config.validate()?;

  let as_of = args.as_of.as_deref().map(parse_timestamp).transpose()?;

  let mut raws: Vec<RawIssue> = Vec::new();
  let mut line_of: Vec<usize> = Vec::new();
  let mut unparsed: Vec<SkippedRecord> = Vec::new();

  for (line_no, line) in io::stdin().lock().lines().enumerate() {
    let line = line?;
    let trimmed = line.trim();
    if trimmed.is_empty() {
      continue;
    }
    match serde_json::from_str::<RawIssue>(trimmed) {
      Ok(raw) => {
        if let Some(project) = &args.project {
          if !raw.project.is_empty() && !raw.project.eq_ignore_ascii_case(project) {
            continue;
          }
        }
        raws.push(raw);
        line_of.push(line_no);
      }
      Err(e) => {
        tracing::warn!(line = line_no, error = %e, "skipping unparseable line");
        unparsed.push(SkippedRecord {
          index: line_no,
          key: None,
          field: "json".to_string(),
          reason: e.to_string(),
        });
      }
    }
  }

  let analyzer = RiskAnalyzer::new(config);
  let label = args.project.as_deref().unwrap_or("ALL");
  let mut report = analyzer.analyze(label, &raws, as_of);

  // Report positions as input line numbers, not batch offsets.
  for skipped in &mut report.skipped {
    if let Some(&line_no) = line_of.get(skipped.index) {
      skipped.index = line_no;
    }
  }
  report.skipped.extend(unparsed);
  report.skipped.sort_by_key(|s| s.index);
  report.skipped_count = report.skipped.len();

  let json = if args.pretty {
    serde_json::to_vec_pretty(&report)?
  } else {
    serde_json::to_vec(&report)?
  };
  let mut out = io::stdout().lock();
  out.write_all(&json)?;
  writeln!(out)?;
  Ok(())
}
