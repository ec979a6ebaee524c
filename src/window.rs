use anyhow::{Context, Result, bail};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

// Report window types and the date predicate every classifier goes through.

/// Is `timestamp` inside `[start, end + buffer_days]`?
///
/// An absent timestamp (an event that has not happened) is never in the window.
pub fn in_window(
  timestamp: Option<DateTime<Utc>>,
  start: DateTime<Utc>,
  end: DateTime<Utc>,
  buffer_days: u32,
) -> bool {
  match timestamp {
    Some(ts) => start <= ts && ts <= add_buffer(end, buffer_days),
    None => false,
  }
}

/// `end` pushed out by `buffer_days`, saturating at the latest representable instant.
fn add_buffer(end: DateTime<Utc>, buffer_days: u32) -> DateTime<Utc> {
  Duration::try_days(i64::from(buffer_days))
    .and_then(|buffer| end.checked_add_signed(buffer))
    .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct ReportWindow {
  pub start: DateTime<Utc>,
  pub end: DateTime<Utc>,
  /// Extra days after `end` still counted, for bots acting after the period closes.
  pub buffer_days: u32,
}

impl ReportWindow {
  pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, buffer_days: u32) -> Self {
    Self { start, end, buffer_days }
  }

  /// Window covering whole calendar days: `start` 00:00:00 through `end` 23:59:59 UTC.
  pub fn from_days(start: NaiveDate, end: NaiveDate, buffer_days: u32) -> Result<Self> {
    if end < start {
      bail!("--end ({}) is before --start ({})", end, start);
    }
    let start_dt = Utc.from_utc_datetime(&start.and_time(NaiveTime::MIN));
    let end_dt = Utc.from_utc_datetime(&end.and_time(last_second_of_day()));

    Ok(Self::new(start_dt, end_dt, buffer_days))
  }

  pub fn contains(&self, timestamp: Option<DateTime<Utc>>) -> bool {
    in_window(timestamp, self.start, self.end, self.buffer_days)
  }

  /// Last instant still inside the window once the buffer is applied.
  pub fn buffered_end(&self) -> DateTime<Utc> {
    add_buffer(self.end, self.buffer_days)
  }

  /// True when an item updated at `updated_at` (and everything after it in a
  /// most-recently-updated-first listing) is older than the window.
  pub fn is_before(&self, updated_at: DateTime<Utc>) -> bool {
    updated_at < self.start
  }

  pub fn is_after(&self, updated_at: DateTime<Utc>) -> bool {
    updated_at > self.buffered_end()
  }
}

fn last_second_of_day() -> NaiveTime {
  NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
}

/// Parse a `--start`/`--end` value (YYYY-MM-DD).
pub fn parse_report_date(raw: &str, flag: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
    .with_context(|| format!("invalid {}: expected YYYY-MM-DD, got {:?}", flag, raw))
}

/// Parse a GitHub REST timestamp (`2021-11-16T10:00:00Z`).
pub fn parse_github_timestamp(raw: &str) -> Option<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.with_timezone(&Utc))
}

/// Parse an HTTP `Last-Modified` header (`Thu, 18 Nov 2021 12:00:01 GMT`).
pub fn parse_http_date(raw: &str) -> Option<DateTime<Utc>> {
  DateTime::parse_from_rfc2822(raw.trim()).ok().map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
  use super::*;
  use proptest::prelude::*;

  fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn at(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, mi, s).single().unwrap()
  }

  #[test]
  fn boundaries_are_inclusive() {
    let start = at(2021, 11, 15, 0, 0, 0);
    let end = at(2021, 11, 21, 23, 59, 59);
    assert!(in_window(Some(start), start, end, 0));
    assert!(in_window(Some(end), start, end, 0));
    assert!(!in_window(Some(end + Duration::days(1)), start, end, 0));
    assert!(in_window(Some(end + Duration::days(1)), start, end, 1));
    assert!(!in_window(Some(start - Duration::seconds(1)), start, end, 3));
  }

  #[test]
  fn absent_timestamp_is_never_in_window() {
    let start = at(2021, 11, 15, 0, 0, 0);
    let end = at(2021, 11, 21, 0, 0, 0);
    assert!(!in_window(None, start, end, 0));
    assert!(!in_window(None, start, end, 30));
  }

  #[test]
  fn from_days_covers_whole_last_day() {
    let w = ReportWindow::from_days(day(2021, 11, 15), day(2021, 11, 21), 2).unwrap();
    assert_eq!(w.start, at(2021, 11, 15, 0, 0, 0));
    assert_eq!(w.end, at(2021, 11, 21, 23, 59, 59));
    assert_eq!(w.buffered_end(), at(2021, 11, 23, 23, 59, 59));
    assert!(w.contains(Some(at(2021, 11, 21, 18, 0, 0))));
    assert!(w.is_after(at(2021, 11, 24, 0, 0, 0)));
    assert!(w.is_before(at(2021, 11, 14, 23, 59, 59)));
  }

  #[test]
  fn from_days_rejects_reversed_range() {
    let err = ReportWindow::from_days(day(2021, 11, 21), day(2021, 11, 15), 0).unwrap_err();
    assert!(err.to_string().contains("before --start"));
  }

  #[test]
  fn huge_buffer_saturates_instead_of_overflowing() {
    let w = ReportWindow::from_days(day(2021, 11, 15), day(2021, 11, 21), u32::MAX).unwrap();
    assert_eq!(w.buffered_end(), DateTime::<Utc>::MAX_UTC);
    assert!(w.contains(Some(at(2021, 11, 16, 0, 0, 0))));
    assert!(w.contains(Some(at(2400, 1, 1, 0, 0, 0))));
    assert!(!w.is_after(at(2400, 1, 1, 0, 0, 0)));
    assert!(!w.contains(Some(at(2021, 11, 14, 23, 59, 59))));
  }

  #[test]
  fn parses_dates_and_timestamps() {
    assert_eq!(parse_report_date("2021-11-15", "--start").unwrap(), day(2021, 11, 15));
    assert!(parse_report_date("15/11/2021", "--start").is_err());
    assert_eq!(parse_github_timestamp("2021-11-16T10:00:00Z"), Some(at(2021, 11, 16, 10, 0, 0)));
    assert_eq!(parse_github_timestamp("not a date"), None);
    assert_eq!(
      parse_http_date("Thu, 18 Nov 2021 12:00:01 GMT"),
      Some(at(2021, 11, 18, 12, 0, 1))
    );
  }

  proptest! {
    #[test]
    fn buffer_only_ever_widens_the_window(offset_secs in -864_000i64..864_000, buffer in 0u32..10) {
      let start = at(2021, 11, 15, 0, 0, 0);
      let end = at(2021, 11, 21, 23, 59, 59);
      let ts = end + Duration::seconds(offset_secs);
      if in_window(Some(ts), start, end, 0) {
        prop_assert!(in_window(Some(ts), start, end, buffer));
      }
      prop_assert_eq!(
        in_window(Some(ts), start, end, buffer),
        ts >= start && ts <= end + Duration::days(i64::from(buffer))
      );
    }
  }
}
