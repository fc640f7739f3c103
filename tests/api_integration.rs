//! Integration tests for the REST API feature.

#![cfg(feature = "api")]

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::NaiveDate;
use tower::util::ServiceExt;

use energy_dash::api::{AppState, router};
use energy_dash::sim::appliance::default_appliances;
use energy_dash::sim::clock::FixedClock;
use energy_dash::sim::live::LiveSimulator;
use energy_dash::sim::random::rng_from_seed;
use energy_dash::sim::scheduler::LiveDashboard;
use energy_dash::tariff::TariffSchedule;

async fn get(state: Arc<AppState>, uri: &str) -> (StatusCode, serde_json::Value) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let resp = router(state).oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn evening() -> FixedClock {
    FixedClock(
        NaiveDate::from_ymd_opt(2025, 6, 9)
            .unwrap()
            .and_hms_opt(18, 30, 0)
            .unwrap(),
    )
}

/// Bundled dataset with both live tasks running.
fn start(tick: Duration) -> (Arc<AppState>, LiveDashboard) {
    let simulator = LiveSimulator::new(default_appliances(), tick, 24, rng_from_seed(Some(42)));
    let dashboard = LiveDashboard::start(
        TariffSchedule::default(),
        simulator,
        evening(),
        Duration::from_secs(60),
    );
    let state = AppState::new(
        common::bundled_samples(),
        common::default_deriver(),
        dashboard.live(),
        dashboard.price(),
    )
    .unwrap();
    (Arc::new(state), dashboard)
}

#[tokio::test(start_paused = true)]
async fn dataset_views_over_bundled_week() {
    let (state, dashboard) = start(Duration::from_millis(2500));

    let (status, dates) = get(state.clone(), "/dates").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dates.as_array().unwrap().len(), 7);
    assert_eq!(dates[0], "2025-06-02");

    let (_, daily) = get(state.clone(), "/daily?date=2025-06-05").await;
    assert_eq!(daily["records"].as_array().unwrap().len(), 96);
    assert_eq!(daily["records"][0]["time"], "00:00");

    let (_, hourly) = get(state.clone(), "/hourly?date=2025-06-05").await;
    let buckets = hourly["buckets"].as_array().unwrap();
    assert_eq!(buckets.len(), 24);
    assert!(
        (hourly["summary"]["total_kwh"].as_f64().unwrap()
            - daily["summary"]["total_kwh"].as_f64().unwrap())
        .abs()
            < 1e-9
    );

    let (_, weekly) = get(state.clone(), "/weekly").await;
    assert_eq!(weekly["days"].as_array().unwrap().len(), 7);
    assert!(weekly["summary"]["avg_daily_kwh"].as_f64().unwrap() > 0.0);

    let (status, error) = get(state, "/daily?date=2025-13-01").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error["error"].is_string());

    dashboard.stop().await;
}

#[tokio::test(start_paused = true)]
async fn live_view_tracks_running_simulation() {
    let tick = Duration::from_millis(2500);
    let (state, dashboard) = start(tick);

    let (_, price) = get(state.clone(), "/price").await;
    assert_eq!(price["tier"], "high");
    assert_eq!(price["price"], 1.3);

    tokio::time::sleep(tick * 30 + Duration::from_millis(100)).await;
    let (_, live) = get(state.clone(), "/live").await;
    let history = live["history"].as_array().unwrap();
    assert_eq!(history.len(), 24);
    assert_eq!(history[23]["time"], "18:30:00");

    let simulated = live["simulated_kwh"].as_f64().unwrap();
    assert!(simulated > 0.0);
    let grand = live["grand_totals"]["total_kwh"].as_f64().unwrap();
    assert!((grand - state.historical.total_kwh - simulated).abs() < 1e-9);

    dashboard.stop().await;
}
