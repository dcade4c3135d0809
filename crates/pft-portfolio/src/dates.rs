//! Date normalization for raw trade dates.
//!
//! The sheet layer hands over dates in whatever shape the operator typed:
//! `"Nov 21"`, `"2025-06-20"`, `"6/20/2025"`, `"Jun 20, 2025"`. This module
//! turns every one of them into a [`NormalizedDate`] that orders correctly.
//!
//! Parsing is total. An abbreviated `"Mon D"` is anchored to a configured
//! reference year; anything else goes through a fixed list of generic
//! formats; an empty or unparseable string becomes the caller-supplied
//! `now`. There is no hidden clock read anywhere in this module.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::warn;

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%b %d, %Y",
    "%b %d %Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %b %Y",
    "%d %B %Y",
];

/// A parsed, totally ordered trade timestamp (naive UTC).
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedDate(NaiveDateTime);

impl NormalizedDate {
    pub fn new(dt: NaiveDateTime) -> Self {
        Self(dt)
    }

    /// Midnight on the given calendar day.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(Self)
    }

    pub fn as_datetime(&self) -> NaiveDateTime {
        self.0
    }

    /// `YYYY-MM-DD` key used by historical price maps.
    pub fn date_key(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }
}

/// Whole days from `from` to `to` (negative when `to` is earlier).
pub fn days_between(from: NormalizedDate, to: NormalizedDate) -> i64 {
    (to.0 - from.0).num_days()
}

/// Normalize a raw date, falling back to `now` when it cannot be parsed.
pub fn normalize(raw: &str, reference_year: i32, now: NaiveDateTime) -> NormalizedDate {
    match try_parse(raw, reference_year) {
        Some(d) => d,
        None => {
            if !raw.trim().is_empty() {
                warn!(raw, "unparseable trade date; substituting invocation time");
            }
            NormalizedDate(now)
        }
    }
}

/// Parse a raw date without any fallback.
pub fn try_parse(raw: &str, reference_year: i32) -> Option<NormalizedDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    parse_month_day(s, reference_year).or_else(|| parse_generic(s))
}

/// `"Mon D"`: 3-letter month abbreviation + 1–2 digit day, nothing else.
fn parse_month_day(s: &str, reference_year: i32) -> Option<NormalizedDate> {
    let mut parts = s.split_whitespace();
    let mon = parts.next()?;
    let day = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    if mon.len() != 3 || day.is_empty() || day.len() > 2 {
        return None;
    }
    if !day.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let mon_lc = mon.to_ascii_lowercase();
    let month = MONTHS.iter().position(|m| *m == mon_lc)? as u32 + 1;
    let day: u32 = day.parse().ok()?;
    NormalizedDate::from_ymd(reference_year, month, day)
}

fn parse_generic(s: &str) -> Option<NormalizedDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(NormalizedDate(dt.naive_utc()));
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(NormalizedDate(dt));
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0).map(NormalizedDate);
        }
    }
    None
}
