//! Application setup and server configuration.

use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::kernel::ServerDeps;
use crate::server::routes::{
    get_participant_handler, health_handler, opt_in_handler, run_matching_handler,
    upsert_participant_handler,
};

/// Build the HTTP router around shared server dependencies
pub fn build_app(deps: ServerDeps) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/participants/:id",
            get(get_participant_handler).put(upsert_participant_handler),
        )
        .route("/participants/:id/opt-in", post(opt_in_handler))
        .route("/matching/run", post(run_matching_handler))
        .layer(Extension(deps))
        .layer(TraceLayer::new_for_http())
}
