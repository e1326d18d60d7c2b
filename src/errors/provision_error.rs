use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::client::{ApiError, PhoneType};
use crate::core::cache::CacheError;

/// Error codes for structured error responses
pub mod error_codes {
    pub const CONFIGURATION_ERROR: &str = "configuration_error";
    pub const MISSING_HOST: &str = "missing_host";
    pub const UPSTREAM_ERROR: &str = "upstream_error";
    pub const UPSTREAM_UNAVAILABLE: &str = "upstream_unavailable";
    pub const CACHE_ERROR: &str = "cache_error";
    pub const NO_AVAILABLE_NUMBER: &str = "no_available_number";
    pub const INVALID_BODY: &str = "invalid_body";
    pub const BODY_TOO_LARGE: &str = "body_too_large";
}

/// Failures of the provisioning flow and the middleware around it.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    /// Required middleware options are missing (raised before any remote call)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The request carries no Host header, so no application name can be derived
    #[error("Request has no Host header")]
    MissingHost,

    /// A Bandwidth API call failed
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Search-and-order returned no number
    #[error("No {0} phone number available for the given criteria")]
    NoAvailableNumber(PhoneType),

    /// The request body could not be read
    #[error("Failed to read request body: {0}")]
    Body(String),

    /// A callback body exceeded the configured limit (in bytes)
    #[error("Request body exceeds {0} bytes")]
    BodyTooLarge(usize),
}

impl ProvisionError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ProvisionError::Configuration(_) => error_codes::CONFIGURATION_ERROR,
            ProvisionError::MissingHost => error_codes::MISSING_HOST,
            ProvisionError::Api(ApiError::Http(_)) => error_codes::UPSTREAM_UNAVAILABLE,
            ProvisionError::Api(_) => error_codes::UPSTREAM_ERROR,
            ProvisionError::Cache(_) => error_codes::CACHE_ERROR,
            ProvisionError::NoAvailableNumber(_) => error_codes::NO_AVAILABLE_NUMBER,
            ProvisionError::Body(_) => error_codes::INVALID_BODY,
            ProvisionError::BodyTooLarge(_) => error_codes::BODY_TOO_LARGE,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ProvisionError::MissingHost | ProvisionError::Body(_) => StatusCode::BAD_REQUEST,
            ProvisionError::BodyTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ProvisionError::Api(ApiError::Http(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ProvisionError::Api(_) | ProvisionError::NoAvailableNumber(_) => {
                StatusCode::BAD_GATEWAY
            }
            ProvisionError::Configuration(_) | ProvisionError::Cache(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Log the error at the appropriate level
    pub fn log(&self) {
        match self {
            ProvisionError::MissingHost
            | ProvisionError::Body(_)
            | ProvisionError::BodyTooLarge(_) => {
                tracing::debug!("{}", self);
            }
            ProvisionError::Api(err) => {
                tracing::warn!(error = %err, "Bandwidth provisioning call failed");
            }
            ProvisionError::NoAvailableNumber(phone_type) => {
                tracing::warn!(phone_type = %phone_type, "No phone number available to order");
            }
            ProvisionError::Configuration(msg) => {
                tracing::error!("Bandwidth middleware misconfigured: {}", msg);
            }
            ProvisionError::Cache(err) => {
                tracing::error!("Provisioning cache error: {}", err);
            }
        }
    }
}

impl IntoResponse for ProvisionError {
    fn into_response(self) -> Response {
        self.log();

        let status = self.status_code();
        let body = Json(json!({
            "error": self.error_code(),
            "message": self.to_string()
        }));

        (status, body).into_response()
    }
}

pub type ProvisionResult<T> = Result<T, ProvisionError>;
