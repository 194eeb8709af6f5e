use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

pub const DAY_MILLIS: i64 = 86_400_000;

/// Parse a marketplace timestamp (supports multiple formats).
/// Values without an offset are taken as UTC.
pub fn parse_marketplace_date(date_str: &str) -> Option<DateTime<Utc>> {
    let date_str = date_str.trim();
    if date_str.is_empty() {
        return None;
    }

    // "2024-01-15T10:30:00Z", "2024-01-15T10:30:00+05:30"
    if let Ok(dt) = DateTime::parse_from_rfc3339(date_str) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(date_str, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    if let Ok(day) = NaiveDate::parse_from_str(date_str, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&day.and_time(NaiveTime::default())));
    }

    None
}

/// Parse a "YYYY-MM-DD" calendar date
pub fn parse_day(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| format!("Invalid date '{}': expected YYYY-MM-DD ({})", value, e))
}

/// Epoch millis of local midnight starting `day`
pub fn local_day_start_millis(day: NaiveDate, offset: FixedOffset) -> i64 {
    let utc_midnight = Utc
        .from_utc_datetime(&day.and_time(NaiveTime::default()))
        .timestamp_millis();
    utc_midnight - i64::from(offset.local_minus_utc()) * 1000
}

/// Local calendar day an epoch-millis instant falls on
pub fn local_day_of(millis: i64, offset: FixedOffset) -> NaiveDate {
    Utc.timestamp_millis_opt(millis)
        .single()
        .unwrap_or_default()
        .with_timezone(&offset)
        .date_naive()
}

pub fn format_local(millis: i64, offset: FixedOffset, format: &str) -> String {
    Utc.timestamp_millis_opt(millis)
        .single()
        .unwrap_or_default()
        .with_timezone(&offset)
        .format(format)
        .to_string()
}

/// Half-open millis window `[start, end)` covering whole local days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start: i64,
    pub end: i64,
}

impl DayWindow {
    /// From `date_from` 00:00 local to the end of `date_to` (inclusive day)
    pub fn from_days(date_from: NaiveDate, date_to: NaiveDate, offset: FixedOffset) -> Self {
        Self {
            start: local_day_start_millis(date_from, offset),
            end: local_day_start_millis(date_to, offset) + DAY_MILLIS,
        }
    }

    /// Parse "YYYY-MM-DD" bounds; rejects `date_from` after `date_to`
    pub fn parse(date_from: &str, date_to: &str, offset: FixedOffset) -> Result<Self, String> {
        let from = parse_day(date_from)?;
        let to = parse_day(date_to)?;
        if from > to {
            return Err(format!(
                "Start date {} is after end date {}",
                date_from, date_to
            ));
        }
        Ok(Self::from_days(from, to, offset))
    }

    pub fn contains(&self, millis: i64) -> bool {
        millis >= self.start && millis < self.end
    }

    pub fn start_utc(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.start).single().unwrap_or_default()
    }

    /// Last instant inside the window
    pub fn end_utc_inclusive(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.end).single().unwrap_or_default() - Duration::seconds(1)
    }
}
