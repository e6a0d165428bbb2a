// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Trailbook: monthly summaries of your Strava activities
//!
//! This crate provides the client core: OAuth login, credential persistence
//! with just-in-time token refresh, authenticated API access, and month-bucketed
//! aggregation of the activity feed.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod time_utils;

use std::sync::Arc;

use config::Config;
use db::CredentialStore;
use services::{
    ActivityPager, ApiClient, MonthlyAggregator, OAuthController, StravaClient, TokenManager,
};

/// Shared client state, wired once at startup.
#[derive(Clone)]
pub struct Trailbook {
    pub config: Config,
    pub store: Arc<dyn CredentialStore>,
    pub api: ApiClient,
    client: StravaClient,
}

impl Trailbook {
    pub fn new(config: Config, store: Arc<dyn CredentialStore>) -> Result<Self, reqwest::Error> {
        let client = StravaClient::new(&config)?;
        let tokens = TokenManager::new(client.clone(), store.clone(), config.refresh_margin_secs);
        let api = ApiClient::new(client.clone(), tokens);

        Ok(Self {
            config,
            store,
            api,
            client,
        })
    }

    pub fn tokens(&self) -> &TokenManager {
        self.api.tokens()
    }

    pub fn oauth(&self) -> OAuthController {
        OAuthController::new(&self.config, self.client.clone(), self.store.clone())
    }

    pub fn pager(&self) -> ActivityPager {
        ActivityPager::new(self.api.clone(), self.config.activities_url())
    }

    pub fn aggregator(&self) -> MonthlyAggregator<ActivityPager> {
        MonthlyAggregator::new(self.pager()).with_max_pages(self.config.aggregate_max_pages)
    }
}
