pub mod logging;
mod routes;

use std::{sync::Arc, time::Duration, time::Instant};

use axum::{
    routing::{get, post},
    Router,
};
use lexinsight_agent::GatewayTransport;
use lexinsight_core::types::AnalysisProfile;
use tokio::sync::broadcast;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::logging::LogRing;

// ── AppState ──────────────────────────────────────────────────────────────

pub struct AppState {
    pub gateway: Arc<GatewayTransport>,
    pub profile: AnalysisProfile,
    pub timeout: Duration,
    pub start_time: Instant,
    pub log_tx: broadcast::Sender<String>,
    pub log_ring: LogRing,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health
        .route("/api/health", get(routes::health))
        // Relay
        .route("/functions/v1/analyze-case", post(routes::analyze_case))
        // Server-side analysis
        .route("/api/analyze", post(routes::analyze))
        // SSE logs
        .route("/api/logs", get(routes::sse_logs))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
