use reqwest::StatusCode;

/// Longest response body kept in an [`ApiError::Status`] message.
pub(crate) const MAX_ERROR_BODY_LEN: usize = 500;

/// Errors returned by a [`BandwidthApi`](super::BandwidthApi) implementation.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Transport-level failure (connection refused, timeout, TLS...)
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status
    #[error("Bandwidth API returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// A create call succeeded but carried no usable `Location` header
    #[error("Missing Location header in response to {0}")]
    MissingLocation(String),

    /// The response could not be interpreted
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// A resource looked up by id does not exist
    #[error("Resource not found: {0}")]
    NotFound(String),
}

impl ApiError {
    /// Builds a [`ApiError::Status`] with the body capped to a readable size.
    pub fn status(status: StatusCode, body: String) -> Self {
        let body = if body.len() > MAX_ERROR_BODY_LEN {
            let mut end = MAX_ERROR_BODY_LEN;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated)", &body[..end])
        } else {
            body
        };
        ApiError::Status { status, body }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_body_is_capped() {
        let err = ApiError::status(StatusCode::BAD_REQUEST, "X".repeat(1000));
        match err {
            ApiError::Status { status, body } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert!(body.len() <= MAX_ERROR_BODY_LEN + 15);
                assert!(body.ends_with("(truncated)"));
            }
            other => panic!("Expected Status error, got {other:?}"),
        }
    }

    #[test]
    fn test_status_short_body_is_kept() {
        let err = ApiError::status(StatusCode::NOT_FOUND, "missing".to_string());
        assert_eq!(err.to_string(), "Bandwidth API returned 404 Not Found: missing");
    }
}
