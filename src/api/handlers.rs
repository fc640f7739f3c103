//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use chrono::NaiveDate;

use super::AppState;
use super::types::{
    BucketEntry, DailyResponse, DateQuery, ErrorResponse, HourlyResponse, LiveResponse,
    PriceResponse, RecordEntry, WeeklyResponse,
};
use crate::aggregate::{Bucket, aggregate_daily, aggregate_hourly, summarize, summarize_days};
use crate::error::DashError;
use crate::meter::sample::parse_date;

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = Result<Json<T>, ApiError>;

fn error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn derivation_error(e: DashError) -> ApiError {
    match e {
        DashError::DataIntegrity { .. } => error(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
        _ => error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// Resolves the requested date, falling back to the first available one.
fn selected_date(state: &AppState, query: &DateQuery) -> Result<NaiveDate, ApiError> {
    match query.date.as_deref() {
        Some(raw) => parse_date(raw).map_err(|e| error(StatusCode::BAD_REQUEST, e.to_string())),
        None => state
            .dates
            .first()
            .copied()
            .ok_or_else(|| error(StatusCode::NOT_FOUND, "dataset is empty")),
    }
}

/// `GET /dates` → 200 + dates in first-seen order
pub async fn get_dates(State(state): State<Arc<AppState>>) -> Json<Vec<NaiveDate>> {
    Json(state.dates.clone())
}

/// Interval records and stats for one day.
///
/// `GET /daily?date=2025-06-02` → 200 + `DailyResponse`
/// `GET /daily?date=bogus` → 400 + `ErrorResponse`
pub async fn get_daily(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DateQuery>,
) -> ApiResult<DailyResponse> {
    let date = selected_date(&state, &query)?;
    let records = state
        .deriver
        .derive_day(&state.samples, date)
        .map_err(derivation_error)?;

    Ok(Json(DailyResponse {
        date,
        summary: summarize(&records),
        records: records.iter().map(RecordEntry::from).collect(),
    }))
}

/// Hourly buckets and stats for one day.
///
/// `GET /hourly?date=2025-06-02` → 200 + `HourlyResponse`
pub async fn get_hourly(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DateQuery>,
) -> ApiResult<HourlyResponse> {
    let date = selected_date(&state, &query)?;
    let records = state
        .deriver
        .derive_day(&state.samples, date)
        .map_err(derivation_error)?;
    let buckets: Vec<Bucket> = aggregate_hourly(&records)
        .into_iter()
        .map(Bucket::from)
        .collect();

    Ok(Json(HourlyResponse {
        date,
        summary: summarize(&buckets),
        buckets: buckets.iter().map(BucketEntry::from).collect(),
    }))
}

/// `GET /weekly` → 200 + per-day buckets with daily averages
pub async fn get_weekly(State(state): State<Arc<AppState>>) -> ApiResult<WeeklyResponse> {
    let days: Vec<Bucket> = aggregate_daily(&state.samples, &state.deriver)
        .map_err(derivation_error)?
        .into_iter()
        .map(Bucket::from)
        .collect();

    Ok(Json(WeeklyResponse {
        summary: summarize_days(&state.samples, &days),
        days: days.iter().map(BucketEntry::from).collect(),
    }))
}

/// `GET /live` → 200 + latest simulator snapshot
pub async fn get_live(State(state): State<Arc<AppState>>) -> Json<LiveResponse> {
    let price = *state.price.borrow();
    let snapshot = state.live.borrow().clone();
    Json(LiveResponse::new(&snapshot, &state.historical, price))
}

/// `GET /price` → 200 + current price and tier
pub async fn get_price(State(state): State<Arc<AppState>>) -> Json<PriceResponse> {
    Json(PriceResponse::from(*state.price.borrow()))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tokio::sync::watch;
    use tower::util::ServiceExt;

    use super::*;
    use crate::api::router;
    use crate::meter::{IntegrityPolicy, RawSample, UsageDeriver};
    use crate::sim::live::LiveSnapshot;
    use crate::tariff::{PriceInfo, PriceTier, TariffSchedule};

    fn make_test_state(policy: IntegrityPolicy, readings: &[(&str, f64)]) -> Arc<AppState> {
        let samples = readings
            .iter()
            .map(|(ts, wh)| RawSample::parse(ts, *wh).unwrap())
            .collect();
        let (_, live) = watch::channel(LiveSnapshot::default());
        let (_, price) = watch::channel(PriceInfo {
            price: 1.3,
            tier: PriceTier::High,
        });
        let deriver = UsageDeriver::new(TariffSchedule::default(), policy);
        Arc::new(AppState::new(samples, deriver, live, price).unwrap())
    }

    fn two_days() -> Arc<AppState> {
        make_test_state(
            IntegrityPolicy::Preserve,
            &[
                ("2025-06-02 00:00", 0.0),
                ("2025-06-02 00:15", 250.0),
                ("2025-06-02 00:30", 400.0),
                ("2025-06-03 00:15", 600.0),
            ],
        )
    }

    async fn get_json(state: Arc<AppState>, uri: &str) -> (StatusCode, serde_json::Value) {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = router(state).oneshot(req).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn dates_in_first_seen_order() {
        let (status, json) = get_json(two_days(), "/dates").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!(["2025-06-02", "2025-06-03"]));
    }

    #[tokio::test]
    async fn daily_defaults_to_first_date() {
        let (status, json) = get_json(two_days(), "/daily").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["date"], "2025-06-02");
        assert_eq!(json["records"].as_array().unwrap().len(), 2);
        assert_eq!(json["records"][0]["time"], "00:15");
        assert_eq!(json["records"][0]["tier"], "low");
    }

    #[tokio::test]
    async fn daily_uses_previous_day_boundary() {
        let (_, json) = get_json(two_days(), "/daily?date=2025-06-03").await;
        let records = json["records"].as_array().unwrap();
        assert_eq!(records.len(), 1);
        assert!((records[0]["usage_kwh"].as_f64().unwrap() - 0.2).abs() < 1e-9);
    }

    #[tokio::test]
    async fn daily_absent_date_is_empty() {
        let (status, json) = get_json(two_days(), "/daily?date=2030-01-01").await;
        assert_eq!(status, StatusCode::OK);
        assert!(json["records"].as_array().unwrap().is_empty());
        assert_eq!(json["summary"]["peak_kwh"], 0.0);
    }

    #[tokio::test]
    async fn malformed_date_returns_400() {
        let (status, json) = get_json(two_days(), "/hourly?date=02.06.2025").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("02.06.2025"));
    }

    #[tokio::test]
    async fn hourly_groups_by_hour() {
        let (_, json) = get_json(two_days(), "/hourly?date=2025-06-02").await;
        let buckets = json["buckets"].as_array().unwrap();
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0]["label"], "00:00");
        assert!((buckets[0]["usage_kwh"].as_f64().unwrap() - 0.4).abs() < 1e-9);
    }

    #[tokio::test]
    async fn weekly_averages_over_dates() {
        let (_, json) = get_json(two_days(), "/weekly").await;
        assert_eq!(json["days"].as_array().unwrap().len(), 2);
        assert!(json["days"][0].get("tier").is_none());
        assert!((json["summary"]["avg_daily_kwh"].as_f64().unwrap() - 0.3).abs() < 1e-9);
    }

    #[tokio::test]
    async fn preserved_counter_drop_is_served_negative() {
        let state = make_test_state(
            IntegrityPolicy::Preserve,
            &[("2025-06-02 00:00", 500.0), ("2025-06-02 00:15", 100.0)],
        );
        let (status, json) = get_json(state, "/daily").await;
        assert_eq!(status, StatusCode::OK);
        assert!((json["records"][0]["usage_kwh"].as_f64().unwrap() + 0.4).abs() < 1e-9);
    }

    #[test]
    fn integrity_violation_maps_to_422() {
        let e = DashError::DataIntegrity {
            at: RawSample::parse("2025-06-02 00:15", 100.0).unwrap().timestamp,
            previous_wh: 500.0,
            current_wh: 100.0,
        };
        assert_eq!(derivation_error(e).0, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn price_reports_tier_hours() {
        let (_, json) = get_json(two_days(), "/price").await;
        assert_eq!(json["tier"], "high");
        assert_eq!(json["hours"], "06-11, 16-00");
    }

    #[tokio::test]
    async fn live_adds_historical_totals() {
        let (_, json) = get_json(two_days(), "/live").await;
        assert!(json["history"].as_array().unwrap().is_empty());
        assert!((json["grand_totals"]["total_kwh"].as_f64().unwrap() - 0.6).abs() < 1e-9);
    }

    #[tokio::test]
    async fn empty_dataset_daily_returns_404() {
        let state = make_test_state(IntegrityPolicy::Preserve, &[]);
        let (status, _) = get_json(state, "/daily").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
