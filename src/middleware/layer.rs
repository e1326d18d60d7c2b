use axum::extract::Request;
use axum::response::{IntoResponse, Response};
use futures::future::BoxFuture;
use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

use super::provisioner::{Prepared, Provisioner};

/// Tower layer running the Bandwidth provisioning in front of any service.
///
/// Behaves like [`provisioning_middleware`](super::provisioning_middleware)
/// but needs no axum router, e.g. `ServiceBuilder::new().layer(BandwidthLayer::new(p))`.
#[derive(Debug, Clone)]
pub struct BandwidthLayer {
    provisioner: Arc<Provisioner>,
}

impl BandwidthLayer {
    pub fn new(provisioner: Arc<Provisioner>) -> Self {
        Self { provisioner }
    }
}

impl<S> Layer<S> for BandwidthLayer {
    type Service = BandwidthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        BandwidthService {
            inner,
            provisioner: Arc::clone(&self.provisioner),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BandwidthService<S> {
    inner: S,
    provisioner: Arc<Provisioner>,
}

impl<S> Service<Request> for BandwidthService<S>
where
    S: Service<Request, Response = Response, Error = Infallible> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Response, Infallible>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        // Keep the service that was polled ready for this call.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let provisioner = Arc::clone(&self.provisioner);

        Box::pin(async move {
            match provisioner.prepare(request).await {
                Ok(Prepared::Respond(response)) => Ok(response),
                Ok(Prepared::Forward(request)) => inner.call(request).await,
                Err(e) => Ok(e.into_response()),
            }
        })
    }
}
