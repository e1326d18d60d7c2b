use axum::{Router, routing::post};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::handlers::callbacks;
use crate::provision::{CALL_CALLBACK_PATH, MESSAGE_CALLBACK_PATH};
use crate::state::AppState;

/// Create the router for the Bandwidth callback endpoints
///
/// Callbacks with a registered handler are answered by the provisioning
/// layer in front of this router; the routes here only receive the posts it
/// lets through.
pub fn create_webhook_router() -> Router<Arc<AppState>> {
    Router::new()
        .route(MESSAGE_CALLBACK_PATH, post(callbacks::unhandled_callback))
        .route(CALL_CALLBACK_PATH, post(callbacks::unhandled_callback))
        .layer(TraceLayer::new_for_http())
}
