//! SIP account REST handler
//!
//! Creates (or returns) an endpoint in the provisioned SIP domain, bound to
//! the provisioned application.

use axum::{Extension, response::Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::client::Endpoint;
use crate::errors::{AppError, AppResult};
use crate::middleware::BandwidthContext;
use crate::provision::SipAccount;

/// Request body for `POST /sip/accounts`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SipAccountRequest {
    pub user_name: String,
    /// Generated when omitted
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SipAccountResponse {
    pub id: String,
    pub name: String,
    pub domain_id: String,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sip_uri: Option<String>,
}

impl From<Endpoint> for SipAccountResponse {
    fn from(endpoint: Endpoint) -> Self {
        Self {
            id: endpoint.id,
            name: endpoint.name,
            domain_id: endpoint.domain_id,
            enabled: endpoint.enabled,
            sip_uri: endpoint.sip_uri,
        }
    }
}

pub async fn create_sip_account(
    Extension(context): Extension<BandwidthContext>,
    Json(request): Json<SipAccountRequest>,
) -> AppResult<Json<SipAccountResponse>> {
    let user_name = request.user_name.trim();
    if user_name.is_empty() {
        return Err(AppError::BadRequest("userName is required".to_string()));
    }
    if context.endpoint_resolver.is_none() {
        return Err(AppError::NotFound(
            "SIP is not configured on this server".to_string(),
        ));
    }

    let account = SipAccount::Credentials {
        user_name: user_name.to_string(),
        password: request.password.filter(|p| !p.is_empty()),
    };
    let endpoint = context.get_or_create_endpoint(account).await?;

    info!(endpoint_id = %endpoint.id, name = %endpoint.name, "SIP account ready");
    Ok(Json(endpoint.into()))
}
