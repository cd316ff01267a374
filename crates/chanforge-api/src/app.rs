use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::auth::require_bearer_token;
use crate::handlers;
use crate::state::AppState;

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/ready", get(handlers::ready))
        .route("/channels", get(handlers::list_channels))
        .route(
            "/channels/:content_id",
            get(handlers::get_channel).delete(handlers::purge_channel),
        )
        .route("/channels/:content_id/retire", post(handlers::retire_channel))
        .route("/channels/:content_id/rotate-key", post(handlers::rotate_key))
        .route("/reconcile", post(handlers::post_reconcile))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer_token))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
