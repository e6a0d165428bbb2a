// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Monthly aggregation tests against a mocked activity feed.

use chrono::NaiveDate;
use serde_json::{json, Value};
use trailbook::error::PageError;
use trailbook::models::StopReason;
use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

mod common;
use common::{activity_json, create_test_app, page_of, seed_credentials, ACTIVITIES_PATH};

const PER_PAGE: u32 = 4;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
}

async fn mount_page(server: &MockServer, page: u32, body: Value, expected: u64) {
    Mock::given(matchers::method("GET"))
        .and(matchers::path(ACTIVITIES_PATH))
        .and(matchers::query_param("page", page.to_string()))
        .and(matchers::query_param("per_page", PER_PAGE.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(expected)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_two_months_exact_sums_and_early_stop() {
    let server = MockServer::start().await;

    // Page 1: March only (not done yet). Page 2: rest of March, February,
    // and something older. Page 3 must never be requested.
    mount_page(
        &server,
        1,
        json!([
            activity_json(1, "2024-03-14T07:00:00Z", 1000.0),
            activity_json(2, "2024-03-12T07:00:00Z", 2500.5),
            activity_json(3, "2024-03-10T07:00:00Z", 300.25),
            activity_json(4, "2024-03-08T07:00:00Z", 4000.0),
        ]),
        1,
    )
    .await;
    mount_page(
        &server,
        2,
        json!([
            activity_json(5, "2024-03-01T00:30:00Z", 10.0),
            activity_json(6, "2024-02-29T23:30:00Z", 777.0),
            activity_json(7, "2024-02-02T07:00:00Z", 23.0),
            activity_json(8, "2024-01-31T07:00:00Z", 99999.0),
        ]),
        1,
    )
    .await;
    mount_page(&server, 3, page_of(9, 4, "2023-12-01T07:00:00Z", 1.0), 0).await;

    let (app, store) = create_test_app(&server);
    seed_credentials(&store, 3600).await;

    let report = app
        .aggregator()
        .with_per_page(PER_PAGE)
        .aggregate_at(2, today())
        .await;

    assert_eq!(report.stop, StopReason::AllMonthsFilled);
    assert_eq!(report.pages_fetched, 2);
    assert!(report.diagnostic.is_none());

    assert_eq!(report.aggregates.len(), 2);
    let march = &report.aggregates[0];
    assert_eq!(march.month, "2024-03");
    assert_eq!(march.totals.total_distance, 1000.0 + 2500.5 + 300.25 + 4000.0 + 10.0);
    assert_eq!(march.totals.total_time, 5.0 * 600.0);
    assert_eq!(march.totals.total_elevation_gain, 5.0 * 12.5);

    let february = &report.aggregates[1];
    assert_eq!(february.month, "2024-02");
    assert_eq!(february.totals.total_distance, 777.0 + 23.0);

    let raw_ids: Vec<u64> = report
        .activities_for("2024-02")
        .unwrap()
        .iter()
        .map(|a| a.id)
        .collect();
    assert_eq!(raw_ids, vec![6, 7]);
}

#[tokio::test]
async fn test_empty_first_page() {
    let server = MockServer::start().await;
    mount_page(&server, 1, json!([]), 1).await;

    let (app, store) = create_test_app(&server);
    seed_credentials(&store, 3600).await;

    let report = app
        .aggregator()
        .with_per_page(PER_PAGE)
        .aggregate_at(3, today())
        .await;

    assert!(report.aggregates.is_empty());
    assert!(report.raw.is_empty());
    assert!(report.diagnostic.is_none());
    assert_eq!(report.stop, StopReason::EndOfFeed);
}

#[tokio::test]
async fn test_errors_on_page_two_keeps_page_one() {
    let server = MockServer::start().await;
    mount_page(&server, 1, page_of(1, 4, "2024-03-05T07:00:00Z", 100.0), 1).await;
    mount_page(
        &server,
        2,
        json!({
            "message": "Rate Limit Exceeded",
            "errors": [{"resource": "Application", "field": "rate limit", "code": "exceeded"}]
        }),
        1,
    )
    .await;
    mount_page(&server, 3, page_of(9, 4, "2024-02-05T07:00:00Z", 1.0), 0).await;

    let (app, store) = create_test_app(&server);
    seed_credentials(&store, 3600).await;

    let report = app
        .aggregator()
        .with_per_page(PER_PAGE)
        .aggregate_at(2, today())
        .await;

    assert_eq!(report.stop, StopReason::Failed);
    assert!(!report.is_complete());
    match &report.diagnostic {
        Some(PageError::ApiReported { message, .. }) => {
            assert_eq!(message, "Rate Limit Exceeded")
        }
        other => panic!("expected ApiReported diagnostic, got {:?}", other),
    }
    assert_eq!(report.aggregates.len(), 1);
    assert_eq!(report.aggregates[0].month, "2024-03");
    assert_eq!(report.aggregates[0].totals.total_distance, 400.0);
    assert_eq!(report.raw[0].activities.len(), 4);
}

#[tokio::test]
async fn test_http_error_mid_pagination_is_partial() {
    let server = MockServer::start().await;
    mount_page(&server, 1, page_of(1, 4, "2024-03-05T07:00:00Z", 100.0), 1).await;
    Mock::given(matchers::method("GET"))
        .and(matchers::path(ACTIVITIES_PATH))
        .and(matchers::query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "Server Error"})))
        .expect(1)
        .mount(&server)
        .await;

    let (app, store) = create_test_app(&server);
    seed_credentials(&store, 3600).await;

    let report = app
        .aggregator()
        .with_per_page(PER_PAGE)
        .aggregate_at(2, today())
        .await;

    assert_eq!(report.stop, StopReason::Failed);
    assert!(matches!(
        report.diagnostic,
        Some(PageError::Fetch(trailbook::error::FetchError::Remote { status: 500, .. }))
    ));
    assert_eq!(report.aggregates.len(), 1);
}

#[tokio::test]
async fn test_not_authenticated_yields_empty_report_with_diagnostic() {
    let server = MockServer::start().await;
    let (app, _store) = create_test_app(&server);

    let report = app.aggregator().aggregate_at(2, today()).await;

    assert!(report.aggregates.is_empty());
    assert!(report
        .diagnostic
        .as_ref()
        .is_some_and(PageError::is_auth_error));
}
