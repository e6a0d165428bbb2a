// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity feed paging.
//!
//! Strava gives no total count for `/athlete/activities`; a page shorter than
//! `per_page` is the only end-of-feed signal.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::PageError;
use crate::models::Activity;
use crate::services::strava::RequestOptions;
use crate::services::ApiClient;

/// Default page size for interactive listing.
pub const DEFAULT_PER_PAGE: u32 = 30;

/// Largest page size Strava accepts.
pub const MAX_PER_PAGE: u32 = 200;

/// Optional time window for the activity list (unix seconds).
#[derive(Debug, Clone, Copy, Default)]
pub struct ActivityFilter {
    pub before: Option<i64>,
    pub after: Option<i64>,
}

/// A source of activity pages, numbered from 1.
#[async_trait]
pub trait ActivitySource: Send + Sync {
    async fn fetch_page(&self, page: u32, per_page: u32) -> Result<Vec<Activity>, PageError>;
}

/// Pages through the authenticated athlete's activities.
#[derive(Clone)]
pub struct ActivityPager {
    api: ApiClient,
    url: String,
    filter: ActivityFilter,
}

impl ActivityPager {
    pub fn new(api: ApiClient, activities_url: String) -> Self {
        Self {
            api,
            url: activities_url,
            filter: ActivityFilter::default(),
        }
    }

    pub fn with_filter(mut self, filter: ActivityFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Fetch every page until a short page, returning all activities and the
    /// number of requests made.
    pub async fn fetch_all(&self, per_page: u32) -> Result<(Vec<Activity>, u32), PageError> {
        let per_page = per_page.clamp(1, MAX_PER_PAGE);
        let mut activities = Vec::new();
        let mut page = 1;

        loop {
            let batch = self.fetch_page(page, per_page).await?;
            let count = batch.len();
            activities.extend(batch);

            if is_last_page(count, per_page) {
                tracing::debug!(pages = page, total = activities.len(), "Activity feed exhausted");
                return Ok((activities, page));
            }
            page += 1;
        }
    }
}

#[async_trait]
impl ActivitySource for ActivityPager {
    async fn fetch_page(&self, page: u32, per_page: u32) -> Result<Vec<Activity>, PageError> {
        let mut options = RequestOptions::default()
            .query("page", page.max(1))
            .query("per_page", per_page);
        if let Some(before) = self.filter.before {
            options = options.query("before", before);
        }
        if let Some(after) = self.filter.after {
            options = options.query("after", after);
        }

        let body = self.api.get_json(&self.url, options).await?;
        let activities = parse_page(body)?;
        tracing::debug!(page, per_page, count = activities.len(), "Fetched activity page");
        Ok(activities)
    }
}

/// A page shorter than requested is the last one.
pub fn is_last_page(count: usize, per_page: u32) -> bool {
    count < per_page as usize
}

/// Decode a list payload, surfacing Strava's error objects.
fn parse_page(body: Value) -> Result<Vec<Activity>, PageError> {
    if let Some(object) = body.as_object() {
        if let Some(error) = object.get("errors").or_else(|| object.get("error")) {
            let message = object
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| match error {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                });
            return Err(PageError::ApiReported { message, body });
        }
    }

    if !body.is_array() {
        return Err(PageError::Malformed(format!(
            "expected an array of activities, got {}",
            json_kind(&body)
        )));
    }

    serde_json::from_value(body).map_err(|e| PageError::Malformed(e.to_string()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
