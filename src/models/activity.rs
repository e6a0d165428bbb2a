// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Strava activity model as returned by the list endpoint.

use serde::{Deserialize, Serialize};

use crate::time_utils;

/// Summary activity from `GET /athlete/activities`.
///
/// Only the fields the aggregator and CLI read are modeled; the rest of
/// Strava's payload is ignored. Metrics missing from the payload are zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Strava activity ID
    pub id: u64,
    /// Activity name/title
    #[serde(default)]
    pub name: String,
    /// Sport type (Ride, Run, Hike, etc.)
    #[serde(default)]
    pub sport_type: String,
    /// Start date/time in UTC (ISO 8601)
    #[serde(default)]
    pub start_date: Option<String>,
    /// Start date/time as athlete wall-clock time (ISO 8601)
    #[serde(default)]
    pub start_date_local: Option<String>,
    /// Distance in meters
    #[serde(default, deserialize_with = "non_negative")]
    pub distance: f64,
    /// Moving time in seconds
    #[serde(default, deserialize_with = "non_negative")]
    pub moving_time: f64,
    /// Elapsed time in seconds
    #[serde(default, deserialize_with = "non_negative")]
    pub elapsed_time: f64,
    /// Elevation gain in meters
    #[serde(default, deserialize_with = "non_negative")]
    pub total_elevation_gain: f64,
}

impl Activity {
    /// Calendar date the activity started on, in the athlete's local time.
    pub fn local_start_date(&self) -> Option<chrono::NaiveDate> {
        time_utils::local_start_date(
            self.start_date_local.as_deref(),
            self.start_date.as_deref(),
        )
    }
}

/// Accepts null, missing or negative values as zero.
fn non_negative<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<f64> = Option::deserialize(deserializer)?;
    Ok(value.filter(|v| v.is_finite() && *v > 0.0).unwrap_or(0.0))
}
