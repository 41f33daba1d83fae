use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::SharedState;

pub fn build_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Liveness
        .route("/health", get(crate::routes::health::health))
        // Analysis
        .route("/api/niche", post(crate::routes::niche::analyze))
        .route("/api/channel", post(crate::routes::channel::analyze))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
