//! Router assembly
//!
//! - `api` - routes behind the axum provisioning middleware
//! - `webhooks` - Bandwidth callback routes behind the tower provisioning layer

use axum::{Router, middleware, routing::get};
use std::sync::Arc;

use crate::handlers::api::health_check;
use crate::middleware::{BandwidthLayer, provisioning_middleware};
use crate::state::AppState;

pub mod api;
pub mod webhooks;

/// Builds the complete application: a public health check plus the
/// provisioned API and callback routes.
pub fn create_app(state: Arc<AppState>) -> Router {
    let api_routes = api::create_api_router().layer(middleware::from_fn_with_state(
        Arc::clone(&state.provisioner),
        provisioning_middleware,
    ));

    let webhook_routes =
        webhooks::create_webhook_router().layer(BandwidthLayer::new(Arc::clone(&state.provisioner)));

    let public_routes = Router::new().route("/", get(health_check));

    public_routes
        .merge(api_routes)
        .merge(webhook_routes)
        .with_state(state)
}
