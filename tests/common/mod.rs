// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use serde_json::{json, Value};
use std::sync::Arc;
use trailbook::config::Config;
use trailbook::db::{self, MemoryStore};
use trailbook::models::CredentialRecord;
use trailbook::Trailbook;
use wiremock::MockServer;

pub const ACTIVITIES_PATH: &str = "/api/v3/athlete/activities";
pub const TOKEN_PATH: &str = "/oauth/token";

/// Create a client wired to the mock server with an in-memory store.
#[allow(dead_code)]
pub fn create_test_app(server: &MockServer) -> (Trailbook, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let config = Config::test_default(&server.uri());
    let app = Trailbook::new(config, store.clone()).expect("Failed to build client");
    (app, store)
}

/// Seed the store with a credential record expiring `expires_in` seconds from now.
#[allow(dead_code)]
pub async fn seed_credentials(store: &MemoryStore, expires_in: i64) -> CredentialRecord {
    let record = CredentialRecord {
        access_token: "stored_access_token".to_string(),
        refresh_token: "stored_refresh_token".to_string(),
        expires_at: chrono::Utc::now().timestamp() + expires_in,
    };
    db::save_credentials(store, &record)
        .await
        .expect("Failed to seed credentials");
    record
}

/// Strava-shaped summary activity.
#[allow(dead_code)]
pub fn activity_json(id: u64, start_date_local: &str, distance: f64) -> Value {
    json!({
        "resource_state": 2,
        "id": id,
        "name": format!("Activity {}", id),
        "sport_type": "Ride",
        "distance": distance,
        "moving_time": 600,
        "elapsed_time": 700,
        "total_elevation_gain": 12.5,
        "start_date": start_date_local,
        "start_date_local": start_date_local,
        "timezone": "(GMT-08:00) America/Los_Angeles",
        "map": {"id": format!("a{}", id), "summary_polyline": null}
    })
}

/// `count` activities all starting on `date`.
#[allow(dead_code)]
pub fn page_of(first_id: u64, count: usize, date: &str, distance: f64) -> Value {
    Value::Array(
        (0..count as u64)
            .map(|i| activity_json(first_id + i, date, distance))
            .collect(),
    )
}
