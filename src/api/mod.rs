use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::config::{Config, Environment};
use crate::db::{InquiryStore, Store};
use crate::services::{DefaultInquiryService, InquiryService};

mod contact;
pub mod cors;
mod error;
pub mod observability;
mod system;
mod types;

pub use contact::SUCCESS_MESSAGE;
pub use error::{
    ApiError, INTERNAL_MESSAGE, MALFORMED_BODY_MESSAGE, NOT_FOUND_MESSAGE, PERSISTENCE_MESSAGE,
    VALIDATION_MESSAGE,
};
pub use types::*;

/// The public route table, as reported by the banner and the 404 fallback.
pub const AVAILABLE_ROUTES: [&str; 3] = ["GET /", "GET /health", "POST /api/contact"];

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    pub store: Arc<dyn InquiryStore>,

    pub inquiry_service: Arc<dyn InquiryService>,

    pub start_time: std::time::Instant,
}

impl AppState {
    #[must_use]
    pub fn environment(&self) -> Environment {
        self.config.server.environment
    }
}

/// Builds the state around an already-open store handle.
#[must_use]
pub fn create_app_state(config: Config, store: Arc<dyn InquiryStore>) -> Arc<AppState> {
    let inquiry_service: Arc<dyn InquiryService> =
        Arc::new(DefaultInquiryService::new(store.clone()));

    Arc::new(AppState {
        config: Arc::new(config),
        store,
        inquiry_service,
        start_time: std::time::Instant::now(),
    })
}

/// Opens the store named by the config and builds the state around it.
pub async fn create_app_state_from_config(config: Config) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.general.database_url,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    Ok(create_app_state(config, Arc::new(store)))
}

pub fn router(state: Arc<AppState>) -> anyhow::Result<Router> {
    let cors_layer = cors::OriginPolicy::for_server(&state.config.server)?.into_layer();
    let max_body_bytes = state.config.server.max_body_bytes;

    Ok(Router::new()
        .route("/", get(system::banner))
        .route("/health", get(system::health))
        .route("/api/contact", post(contact::submit_contact))
        .fallback(system::route_not_found)
        .method_not_allowed_fallback(system::route_not_found)
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CatchPanicLayer::custom(error::handle_panic))
        .layer(middleware::from_fn(observability::security_headers_middleware))
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http()))
}
