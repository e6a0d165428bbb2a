// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time handling.

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, Utc};

/// Current time as unix seconds.
pub fn now_unix() -> i64 {
    Utc::now().timestamp()
}

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    pub year: i32,
    /// 1-12
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The month `offset` months before `self`.
    pub fn months_back(self, offset: u32) -> Self {
        let index = self.year as i64 * 12 + (self.month as i64 - 1) - offset as i64;
        Self {
            year: index.div_euclid(12) as i32,
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    /// Canonical `YYYY-MM` key.
    pub fn key(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

/// `month_count` target months ending at the month of `today`, newest first.
pub fn target_months(today: NaiveDate, month_count: u32) -> Vec<YearMonth> {
    let current = YearMonth::of(today);
    (0..month_count).map(|i| current.months_back(i)).collect()
}

/// Local calendar date an activity started on.
///
/// Strava's `start_date_local` is wall-clock time with a misleading `Z`
/// suffix, so the offset is dropped rather than converted. Falls back to
/// `start_date` (true UTC) converted to the machine's local zone.
pub fn local_start_date(
    start_date_local: Option<&str>,
    start_date: Option<&str>,
) -> Option<NaiveDate> {
    if let Some(date) = start_date_local.and_then(parse_wall_clock) {
        return Some(date);
    }
    start_date
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Local).date_naive())
}

fn parse_wall_clock(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim_end_matches('Z');
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|dt| dt.date())
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.naive_local().date()))
        .or_else(|_| NaiveDate::parse_from_str(raw.get(..10).unwrap_or(raw), "%Y-%m-%d"))
        .ok()
}
