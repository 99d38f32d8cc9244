//! Service banner, health probe and the fallback for unmatched routes.

use axum::{Json, extract::State, http::Uri};
use chrono::Utc;
use std::sync::Arc;
use tracing::warn;

use super::{AVAILABLE_ROUTES, ApiError, AppState, BannerResponse, HealthResponse};

/// `GET /`
pub async fn banner(State(state): State<Arc<AppState>>) -> Json<BannerResponse> {
    Json(BannerResponse {
        message: "Atelier inquiry API",
        version: env!("CARGO_PKG_VERSION"),
        environment: state.environment().as_str(),
        endpoints: AVAILABLE_ROUTES.to_vec(),
    })
}

/// `GET /health`
///
/// Always answers 200 while the process is up; store connectivity is
/// reported in the `database` member.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let database = match state.store.ping().await {
        Ok(()) => "connected",
        Err(e) => {
            warn!(error = %e, "Store ping failed");
            "disconnected"
        }
    };

    Json(HealthResponse {
        status: "healthy",
        uptime: state.start_time.elapsed().as_secs(),
        timestamp: Utc::now().to_rfc3339(),
        database,
    })
}

/// Fallback for unknown paths and unsupported methods on known paths.
pub async fn route_not_found(uri: Uri) -> ApiError {
    ApiError::route_not_found(uri.path())
}
