use axum::{Extension, http::StatusCode, response::Json};
use serde::Serialize;
use serde_json::{Value, json};

use crate::middleware::BandwidthContext;

/// Health check handler
/// Returns a simple JSON response indicating the server is running
pub async fn health_check() -> Result<Json<Value>, StatusCode> {
    Ok(Json(json!({
        "status": "OK"
    })))
}

/// Resources provisioned for the host the request was addressed to.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisioningInfo {
    pub application_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_id: Option<String>,
}

pub async fn provisioning_info(
    Extension(context): Extension<BandwidthContext>,
) -> Json<ProvisioningInfo> {
    Json(ProvisioningInfo {
        application_id: context.application_id,
        phone_number: context.phone_number,
        domain_id: context.domain_id,
    })
}
