// HTTP + WebSocket routes (read-only views over published snapshots)

mod http;
mod ws;

use axum::{Router, routing::get};
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};

use crate::models::{DashboardSnapshot, TrendSnapshot};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) dashboard_rx: watch::Receiver<Arc<DashboardSnapshot>>,
    pub(crate) trends_rx: watch::Receiver<Arc<TrendSnapshot>>,
    pub(crate) ws_connections: Arc<AtomicUsize>,
}

pub fn app(
    dashboard_rx: watch::Receiver<Arc<DashboardSnapshot>>,
    trends_rx: watch::Receiver<Arc<TrendSnapshot>>,
    ws_connections: Arc<AtomicUsize>,
) -> Router {
    let state = AppState {
        dashboard_rx,
        trends_rx,
        ws_connections,
    };
    Router::new()
        .route("/", get(|| async { "stationhealth" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/dashboard", get(http::dashboard_handler)) // GET /api/dashboard
        .route("/api/stations", get(http::stations_handler)) // GET /api/stations
        .route("/api/stations/{id}", get(http::station_handler)) // GET /api/stations/{id}
        .route("/api/bands", get(http::bands_handler)) // GET /api/bands
        .route("/api/trends/daily", get(http::daily_trends_handler)) // GET /api/trends/daily
        .route("/ws/dashboard", get(ws::ws_dashboard)) // WS /ws/dashboard
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
