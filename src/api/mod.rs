//! Read-only REST API for the dashboard views.
//!
//! Provides GET endpoints:
//! - `/dates`: dates available in the dataset
//! - `/daily?date=`: interval records and daily stats
//! - `/hourly?date=`: hourly buckets and daily stats
//! - `/weekly`: per-day buckets with totals and averages
//! - `/live`: latest live simulator snapshot with grand totals
//! - `/price`: current price and tier

mod handlers;
mod types;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use chrono::NaiveDate;
use tokio::sync::watch;
use tracing::info;

use crate::aggregate::{HistoricalTotals, historical_totals};
use crate::error::Result;
use crate::meter::{RawSample, UsageDeriver, available_dates};
use crate::sim::live::LiveSnapshot;
use crate::tariff::PriceInfo;

pub use types::ErrorResponse;

/// Application state shared across all request handlers.
///
/// The dataset is immutable once loaded; the live values are read from
/// the watch channels the background tasks publish on.
pub struct AppState {
    pub samples: Vec<RawSample>,
    pub deriver: UsageDeriver,
    /// Distinct dataset dates in first-seen order.
    pub dates: Vec<NaiveDate>,
    pub historical: HistoricalTotals,
    pub live: watch::Receiver<LiveSnapshot>,
    pub price: watch::Receiver<PriceInfo>,
}

impl AppState {
    /// Builds the state, computing the dataset's dates and totals up front.
    ///
    /// # Errors
    ///
    /// Propagates integrity errors from the deriver.
    pub fn new(
        samples: Vec<RawSample>,
        deriver: UsageDeriver,
        live: watch::Receiver<LiveSnapshot>,
        price: watch::Receiver<PriceInfo>,
    ) -> Result<Self> {
        Ok(Self {
            dates: available_dates(&samples),
            historical: historical_totals(&samples, &deriver)?,
            samples,
            deriver,
            live,
            price,
        })
    }
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/dates", get(handlers::get_dates))
        .route("/daily", get(handlers::get_daily))
        .route("/hourly", get(handlers::get_hourly))
        .route("/weekly", get(handlers::get_weekly))
        .route("/live", get(handlers::get_live))
        .route("/price", get(handlers::get_price))
        .with_state(state)
}

/// Binds to the given address and serves the API until `shutdown` resolves.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind to `addr`.
pub async fn serve(
    state: Arc<AppState>,
    addr: SocketAddr,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}
