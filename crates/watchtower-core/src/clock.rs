//! Wall-clock access and the calendar/timestamp string formats used on disk.
//!
//! Dates are stored as `YYYY-MM-DD`, timestamps as RFC 3339 carrying the
//! local offset at the time they were taken, so `hour()` of a parsed
//! timestamp is the local hour it was recorded at.

use std::sync::Mutex;

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime};

/// Source of "now" for every store and the analyzer.
pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now(&self) -> OffsetDateTime;

    /// Local calendar date of `now()`.
    fn today(&self) -> Date {
        self.now().date()
    }
}

/// Reads the system clock in the local offset, falling back to UTC when the
/// offset cannot be determined (e.g. multi-threaded processes on some unixes).
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
    }
}

/// A settable clock for tests and replays.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<OffsetDateTime>,
}

impl FixedClock {
    pub fn new(now: OffsetDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: OffsetDateTime) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *guard += by;
    }

    pub fn advance_days(&self, days: i64) {
        self.advance(Duration::days(days));
    }
}

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// ── Formats ──

/// `YYYY-MM-DD`
pub fn format_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Parse `YYYY-MM-DD`. Returns `None` on anything else.
pub fn parse_date(s: &str) -> Option<Date> {
    Date::parse(s.trim(), format_description!("[year]-[month]-[day]")).ok()
}

/// RFC 3339 with the timestamp's own offset.
pub fn format_ts(ts: OffsetDateTime) -> String {
    ts.format(&Rfc3339)
        .expect("RFC3339 formatting should not fail")
}

pub fn parse_ts(s: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(s.trim(), &Rfc3339).ok()
}

/// `HH:MM` of a timestamp, as used in field report prefixes.
pub fn format_hhmm(ts: OffsetDateTime) -> String {
    format!("{:02}:{:02}", ts.hour(), ts.minute())
}

/// Start of a trailing window of `days` ending at `now`, or `None` when it
/// lies outside the representable range.
pub fn window_cutoff(now: OffsetDateTime, days: i64) -> Option<OffsetDateTime> {
    let secs = days.checked_mul(86_400)?;
    now.checked_sub(Duration::seconds(secs))
}

/// Whether the calendar day `date` (taken as local midnight in `now`'s offset)
/// falls inside the trailing `days` window ending at `now`. A window reaching
/// past the earliest representable instant covers all history.
pub fn date_in_window(date: Date, now: OffsetDateTime, days: i64) -> bool {
    match window_cutoff(now, days) {
        Some(cutoff) => date.midnight().assume_offset(now.offset()) >= cutoff,
        None => days > 0,
    }
}
