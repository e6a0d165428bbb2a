// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Monthly aggregation over the activity feed.
//!
//! Pages are read newest-first until every target month has at least one
//! activity or the feed ends. A target month with no activities at all means
//! reading the athlete's entire history; set a page budget to cap that.

use chrono::{Local, NaiveDate};

use crate::models::stats::MonthlyAccumulator;
use crate::models::{MonthlyReport, StopReason};
use crate::services::activity::{is_last_page, ActivitySource, MAX_PER_PAGE};
use crate::time_utils;

/// Folds activity pages into month buckets.
pub struct MonthlyAggregator<S> {
    source: S,
    per_page: u32,
    max_pages: Option<u32>,
}

impl<S: ActivitySource> MonthlyAggregator<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            per_page: MAX_PER_PAGE,
            max_pages: None,
        }
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.clamp(1, MAX_PER_PAGE);
        self
    }

    /// Stop after this many pages even if some months are still empty.
    pub fn with_max_pages(mut self, max_pages: Option<u32>) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Aggregate the last `month_count` months, including the current one.
    pub async fn aggregate(&self, month_count: u32) -> MonthlyReport {
        self.aggregate_at(month_count, Local::now().date_naive()).await
    }

    /// Aggregate the `month_count` months ending at the month of `today`.
    ///
    /// Never fails: a page error ends the run and the buckets gathered so far
    /// are returned with the error as diagnostic.
    pub async fn aggregate_at(&self, month_count: u32, today: NaiveDate) -> MonthlyReport {
        let targets = time_utils::target_months(today, month_count);
        let mut acc = MonthlyAccumulator::new(targets);

        if month_count == 0 {
            return acc.into_report(StopReason::NothingRequested, 0, None);
        }

        let mut page = 1;
        loop {
            if self.max_pages.is_some_and(|max| page > max) {
                tracing::warn!(
                    pages = page - 1,
                    filled = acc.filled_months(),
                    month_count,
                    "Page budget exhausted before all months were found"
                );
                return acc.into_report(StopReason::PageBudget, page - 1, None);
            }

            let activities = match self.source.fetch_page(page, self.per_page).await {
                Ok(activities) => activities,
                Err(e) => {
                    tracing::error!(
                        page,
                        error = %e,
                        "Failed to fetch activities, returning partial results"
                    );
                    return acc.into_report(StopReason::Failed, page, Some(e));
                }
            };

            if activities.is_empty() {
                tracing::info!(page, "No more activities found");
                return acc.into_report(StopReason::EndOfFeed, page, None);
            }

            let matched = activities.iter().filter(|a| acc.add(a)).count();
            tracing::debug!(
                page,
                fetched = activities.len(),
                matched,
                filled = acc.filled_months(),
                "Aggregated activity page"
            );

            if acc.is_filled() {
                return acc.into_report(StopReason::AllMonthsFilled, page, None);
            }
            if is_last_page(activities.len(), self.per_page) {
                return acc.into_report(StopReason::EndOfFeed, page, None);
            }
            page += 1;
        }
    }
}
