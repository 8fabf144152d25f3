//! Least-squares trend line over period counts and a one-step forecast.

use crate::config::Config;
use crate::types::{ForecastResult, HistoryPoint};

/// Fitted line `count = slope * index + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
  pub slope: f64,
  pub intercept: f64,
  /// Coefficient of determination; 1.0 for a flat series.
  pub r_squared: f64,
}

/// Fit counts against their index 0..n. Needs at least two points.
pub fn fit_line(counts: &[f64]) -> Option<LineFit> {
  let n = counts.len();
  if n < 2 {
    return None;
  }
  let nf = n as f64;
  let mean_x = (nf - 1.0) / 2.0;
  let mean_y = counts.iter().sum::<f64>() / nf;

  let mut sxx = 0.0;
  let mut sxy = 0.0;
  let mut syy = 0.0;
  for (i, &y) in counts.iter().enumerate() {
    let dx = i as f64 - mean_x;
    let dy = y - mean_y;
    sxx += dx * dx;
    sxy += dx * dy;
    syy += dy * dy;
  }

  let slope = sxy / sxx;
  let intercept = mean_y - slope * mean_x;

  let r_squared = if syy == 0.0 {
    1.0
  } else {
    let ss_res: f64 = counts
      .iter()
      .enumerate()
      .map(|(i, &y)| {
        let e = y - (slope * i as f64 + intercept);
        e * e
      })
      .sum();
    (1.0 - ss_res / syy).clamp(0.0, 1.0)
  };

  Some(LineFit {
    slope,
    intercept,
    r_squared,
  })
}

/// Confidence grows with fit quality and sample size, between floor and max.
pub fn confidence(points: usize, r_squared: f64, config: &Config) -> u8 {
  if points < 2 {
    return config.confidence_floor.round() as u8;
  }
  let full = config.full_confidence_points.max(2) as f64;
  let sample_weight = ((points as f64 - 1.0) / (full - 1.0)).min(1.0);
  let span = config.confidence_max - config.confidence_floor;
  let value = config.confidence_floor + span * r_squared.clamp(0.0, 1.0) * sample_weight;
  value.round().clamp(0.0, 100.0) as u8
}

/// Forecast the next period from a chronological history.
///
/// Zero or one point cannot support a regression: the forecast is flat at
/// the last known count with floor confidence.
pub fn forecast(history: &[HistoryPoint], config: &Config) -> ForecastResult {
  let counts: Vec<f64> = history.iter().map(|p| p.count as f64).collect();

  let Some(fit) = fit_line(&counts) else {
    return ForecastResult {
      predicted_next_period_count: history.last().map(|p| p.count).unwrap_or(0),
      confidence: confidence(history.len(), 0.0, config),
      trend_slope: 0.0,
      intercept: counts.first().copied().unwrap_or(0.0),
      r_squared: 0.0,
      points: history.len(),
    };
  };

  let next = fit.slope * counts.len() as f64 + fit.intercept;
  let predicted = next.round().max(0.0) as u64;

  ForecastResult {
    predicted_next_period_count: predicted,
    confidence: confidence(counts.len(), fit.r_squared, config),
    trend_slope: round_to(fit.slope, 4),
    intercept: round_to(fit.intercept, 4),
    r_squared: round_to(fit.r_squared, 4),
    points: counts.len(),
  }
}

fn round_to(v: f64, places: i32) -> f64 {
  let f = 10f64.powi(places);
  (v * f).round() / f
}
