// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - token lifecycle, API access and aggregation.

pub mod activity;
pub mod aggregate;
pub mod api;
pub mod oauth;
pub mod strava;
pub mod token;

pub use activity::{ActivityFilter, ActivityPager, ActivitySource};
pub use aggregate::MonthlyAggregator;
pub use api::ApiClient;
pub use oauth::{AuthState, OAuthController};
pub use strava::{RequestOptions, StravaClient};
pub use token::TokenManager;
