use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::{handlers, middleware::metrics_middleware, sessions};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health, config and metrics
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/metrics", get(handlers::get_metrics))
        // Sessions
        .route("/sessions", post(sessions::create_session))
        .route(
            "/sessions/{id}",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        // Series picking
        .route("/sessions/{id}/series-input", post(sessions::series_input))
        .route("/sessions/{id}/select", post(sessions::select_series))
        // Guessing
        .route("/sessions/{id}/guess-input", post(sessions::guess_input))
        .route("/sessions/{id}/submit", post(sessions::submit_guess))
        .route("/sessions/{id}/new-guess", post(sessions::new_guess))
        // Reveal
        .route("/sessions/{id}/reveal/{field}", post(sessions::toggle_reveal))
        .route("/sessions/{id}/reveal-all", post(sessions::reveal_all))
        .route("/sessions/{id}/hide-all", post(sessions::hide_all))
        // Notices and feedback
        .route("/sessions/{id}/notice/dismiss", post(sessions::dismiss_notice))
        .route("/sessions/{id}/feedback", post(sessions::submit_feedback))
        .route("/sessions/{id}/feedback/open", post(sessions::open_feedback))
        .route("/sessions/{id}/feedback/close", post(sessions::close_feedback))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
