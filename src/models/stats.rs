//! Month-bucketed activity aggregates.
//!
//! Buckets are keyed by calendar month ("YYYY-MM") and only exist once an
//! activity has landed in them.

use serde::Serialize;
use std::collections::HashMap;

use crate::error::PageError;
use crate::models::Activity;
use crate::time_utils::YearMonth;

/// Running totals for one month.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonthTotals {
    /// Meters
    pub total_distance: f64,
    /// Moving time, seconds
    pub total_time: f64,
    /// Meters
    pub total_elevation_gain: f64,
}

impl MonthTotals {
    fn add(&mut self, activity: &Activity) {
        self.total_distance += activity.distance;
        self.total_time += activity.moving_time;
        self.total_elevation_gain += activity.total_elevation_gain;
    }
}

/// Aggregate row for a month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthBucket {
    pub month: String,
    #[serde(flatten)]
    pub totals: MonthTotals,
}

/// Raw activities behind a month's aggregate, for drill-down.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthActivities {
    pub month: String,
    pub activities: Vec<Activity>,
}

/// Why an aggregation stopped paging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Every target month received at least one activity.
    AllMonthsFilled,
    /// An empty or short page ended the feed.
    EndOfFeed,
    /// The configured page budget ran out first.
    PageBudget,
    /// A page failed; results are partial.
    Failed,
    /// Zero months were requested.
    NothingRequested,
}

/// Result of one aggregation run.
///
/// Partial results are valid: check `stop` / `diagnostic` to tell whether the
/// data is complete.
#[derive(Debug)]
pub struct MonthlyReport {
    pub aggregates: Vec<MonthBucket>,
    pub raw: Vec<MonthActivities>,
    pub stop: StopReason,
    pub pages_fetched: u32,
    pub diagnostic: Option<PageError>,
}

impl MonthlyReport {
    pub fn is_complete(&self) -> bool {
        matches!(
            self.stop,
            StopReason::AllMonthsFilled | StopReason::EndOfFeed | StopReason::NothingRequested
        )
    }

    /// Drill-down records for `month` ("YYYY-MM").
    pub fn activities_for(&self, month: &str) -> Option<&[Activity]> {
        self.raw
            .iter()
            .find(|m| m.month == month)
            .map(|m| m.activities.as_slice())
    }
}

/// Accumulates activities into a fixed set of target months.
#[derive(Debug)]
pub struct MonthlyAccumulator {
    targets: Vec<YearMonth>,
    buckets: HashMap<YearMonth, (MonthTotals, Vec<Activity>)>,
}

impl MonthlyAccumulator {
    pub fn new(targets: Vec<YearMonth>) -> Self {
        Self {
            targets,
            buckets: HashMap::new(),
        }
    }

    /// Add an activity if it falls in a target month.
    ///
    /// Returns `true` if the activity matched a target month.
    pub fn add(&mut self, activity: &Activity) -> bool {
        let Some(start) = activity.local_start_date() else {
            tracing::debug!(activity_id = activity.id, "Activity has no usable start date");
            return false;
        };
        let month = YearMonth::of(start);
        if !self.targets.contains(&month) {
            return false;
        }

        let (totals, activities) = self.buckets.entry(month).or_default();
        totals.add(activity);
        activities.push(activity.clone());
        true
    }

    /// Whether every target month has at least one activity.
    pub fn is_filled(&self) -> bool {
        self.buckets.len() >= self.targets.len()
    }

    pub fn filled_months(&self) -> usize {
        self.buckets.len()
    }

    /// Build the report, ordering buckets like the targets (newest first).
    pub fn into_report(
        mut self,
        stop: StopReason,
        pages_fetched: u32,
        diagnostic: Option<PageError>,
    ) -> MonthlyReport {
        let mut aggregates = Vec::with_capacity(self.buckets.len());
        let mut raw = Vec::with_capacity(self.buckets.len());

        for month in &self.targets {
            if let Some((totals, activities)) = self.buckets.remove(month) {
                let key = month.key();
                aggregates.push(MonthBucket {
                    month: key.clone(),
                    totals,
                });
                raw.push(MonthActivities {
                    month: key,
                    activities,
                });
            }
        }

        MonthlyReport {
            aggregates,
            raw,
            stop,
            pages_fetched,
            diagnostic,
        }
    }
}
