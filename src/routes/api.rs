use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers::{api, sip};
use crate::state::AppState;
use std::sync::Arc;

/// Routes that need the provisioned Bandwidth resources of the request host
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/provisioning", get(api::provisioning_info))
        .route("/sip/accounts", post(sip::create_sip_account))
        .layer(TraceLayer::new_for_http())
}
