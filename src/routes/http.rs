// GET handlers: version, dashboard, stations, bands, daily trends

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use super::AppState;
use crate::models::MetricType;
use crate::pipeline::daily::series_by_metric;

/// Package name and version (from Cargo.toml at build time).
const NAME: &str = env!("CARGO_PKG_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// GET /version: returns service name and version.
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /api/dashboard: latest full snapshot.
pub(super) async fn dashboard_handler(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.dashboard_rx.borrow().clone();
    Json(snapshot.as_ref().clone())
}

pub(super) async fn stations_handler(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.dashboard_rx.borrow().clone();
    Json(snapshot.stations.clone())
}

/// GET /api/stations/{id}: 404 when the station is not in the latest snapshot.
pub(super) async fn station_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let snapshot = state.dashboard_rx.borrow().clone();
    match snapshot.station(&id) {
        Some(view) => Json(view.clone()).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": format!("unknown station: {}", id) })),
        )
            .into_response(),
    }
}

pub(super) async fn bands_handler(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.dashboard_rx.borrow().clone();
    Json(snapshot.bands.clone())
}

#[derive(Debug, Deserialize)]
pub(super) struct TrendQuery {
    metric: Option<String>,
}

/// GET /api/trends/daily[?metric=<type>]: one series, or all series keyed by metric type.
pub(super) async fn daily_trends_handler(
    State(state): State<AppState>,
    Query(query): Query<TrendQuery>,
) -> Response {
    let trends = state.trends_rx.borrow().clone();
    match query.metric {
        Some(name) => match name.parse::<MetricType>() {
            Ok(metric_type) => Json(trends.series(metric_type)).into_response(),
            Err(e) => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response(),
        },
        None => Json(series_by_metric(&trends.points)).into_response(),
    }
}
