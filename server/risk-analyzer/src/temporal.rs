//! When bugs get filed: peak weekdays, peak hours and the week-over-week trend.

use std::collections::BTreeMap;

use chrono::{Datelike, Timelike, Weekday};

use crate::types::{DayCount, HourCount, Issue, TemporalPatterns, WeekCount, WeeklyTrend};

/// Weekdays reported in `peak_days`.
pub const PEAK_DAYS: usize = 2;
/// Hours reported in `peak_hours`.
pub const PEAK_HOURS: usize = 3;

const WEEK: [Weekday; 7] = [
  Weekday::Mon,
  Weekday::Tue,
  Weekday::Wed,
  Weekday::Thu,
  Weekday::Fri,
  Weekday::Sat,
  Weekday::Sun,
];

fn day_name(day: Weekday) -> &'static str {
  match day {
    Weekday::Mon => "Monday",
    Weekday::Tue => "Tuesday",
    Weekday::Wed => "Wednesday",
    Weekday::Thu => "Thursday",
    Weekday::Fri => "Friday",
    Weekday::Sat => "Saturday",
    Weekday::Sun => "Sunday",
  }
}

/// Count creation times. Ties go to the earlier weekday (Monday first) and
/// the earlier hour.
pub fn analyze(issues: &[Issue]) -> TemporalPatterns {
  let mut days = [0u64; 7];
  let mut hours = [0u64; 24];
  let mut weeks: BTreeMap<(i32, u32), u64> = BTreeMap::new();

  for issue in issues {
    let ts = issue.created_at;
    days[ts.weekday().num_days_from_monday() as usize] += 1;
    hours[ts.hour() as usize] += 1;
    let iso = ts.iso_week();
    *weeks.entry((iso.year(), iso.week())).or_insert(0) += 1;
  }

  let mut peak_days: Vec<DayCount> = WEEK
    .iter()
    .zip(days)
    .filter(|(_, count)| *count > 0)
    .map(|(&day, count)| DayCount {
      day: day_name(day).to_string(),
      count,
    })
    .collect();
  // Stable sort keeps Monday-first order among equal counts.
  peak_days.sort_by(|a, b| b.count.cmp(&a.count));
  peak_days.truncate(PEAK_DAYS);

  let mut peak_hours: Vec<HourCount> = (0..24u32)
    .filter(|&h| hours[h as usize] > 0)
    .map(|h| HourCount {
      hour: h,
      count: hours[h as usize],
    })
    .collect();
  peak_hours.sort_by(|a, b| b.count.cmp(&a.count));
  peak_hours.truncate(PEAK_HOURS);

  let weekly_counts: Vec<WeekCount> = weeks
    .into_iter()
    .map(|((year, week), count)| WeekCount {
      week: format!("{:04}-W{:02}", year, week),
      count,
    })
    .collect();

  let weekly_trend = match (weekly_counts.first(), weekly_counts.last()) {
    (Some(first), Some(last)) if weekly_counts.len() > 1 => Some(if last.count > first.count {
      WeeklyTrend::Increasing
    } else if last.count < first.count {
      WeeklyTrend::Decreasing
    } else {
      WeeklyTrend::Stable
    }),
    _ => None,
  };

  TemporalPatterns {
    peak_days,
    peak_hours,
    weekly_counts,
    weekly_trend,
  }
}
