//! Judge Pipeline, gateway role (C3): the HTTP surface clients submit
//! execute/evaluate requests to. Publishes a [`judge_types::Task`] and
//! awaits its response via [`correlation::CorrelationDispatcher`], the
//! wake-on-response replacement for the original poll loop.

pub mod auth;
pub mod contest_client;
pub mod core_service_client;
pub mod correlation;
pub mod error;
pub mod handlers;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use state::GatewayState;

/// Builds the gateway's router: `/`, `/health`, `/execute`, `/evaluate`,
/// wrapped in request tracing and permissive CORS (the judge sits
/// behind the platform's own edge, which applies the real policy).
pub fn create_judge_router(state: GatewayState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/execute", post(handlers::execute))
        .route("/evaluate", post(handlers::evaluate))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
