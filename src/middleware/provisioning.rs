use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::provisioner::{Prepared, Provisioner};
use crate::errors::ProvisionError;

/// Bandwidth middleware for `axum::middleware::from_fn_with_state`.
///
/// Every request is provisioned for its host. Callback posts with a matching
/// handler are answered here; everything else continues down the stack with
/// a [`BandwidthContext`](super::BandwidthContext) extension.
///
/// ```rust,no_run
/// use axum::{Router, middleware, routing::get};
/// use bandwidth_extra::middleware::{Credentials, Provisioner, ProvisioningOptions, provisioning_middleware};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let options = ProvisioningOptions::new("My App", Credentials::new("u-id", "t-token", "secret"));
/// let provisioner = Arc::new(Provisioner::new(options).await?);
///
/// let app: Router = Router::new()
///     .route("/", get(|| async { "ok" }))
///     .layer(middleware::from_fn_with_state(provisioner, provisioning_middleware));
/// # Ok(())
/// # }
/// ```
pub async fn provisioning_middleware(
    State(provisioner): State<Arc<Provisioner>>,
    request: Request,
    next: Next,
) -> Result<Response, ProvisionError> {
    match provisioner.prepare(request).await? {
        Prepared::Respond(response) => Ok(response),
        Prepared::Forward(request) => Ok(next.run(request).await),
    }
}
