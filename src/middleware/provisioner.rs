use axum::body::Body;
use axum::extract::Request;
use axum::http::{Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use std::sync::Arc;
use tracing::{debug, info};

use super::context::BandwidthContext;
use super::options::ProvisioningOptions;
use crate::client::{BandwidthApi, BandwidthClient};
use crate::core::cache::CacheStore;
use crate::errors::{ProvisionError, ProvisionResult};
use crate::provision::{
    CALL_CALLBACK_PATH, MESSAGE_CALLBACK_PATH, get_or_create_application, get_or_create_domain,
    get_or_create_phone_number,
};
use crate::webhook::{CallbackEvent, CallbackHandler, dispatch};

/// Cache key of the domain created when no domain name is configured.
const GENERATED_DOMAIN_KEY: &str = "sip-domain:##generated";

/// What the middleware should do with a request after provisioning.
pub enum Prepared {
    /// A callback was dispatched; send this response.
    Respond(Response),
    /// Pass the request, now carrying a [`BandwidthContext`], to the next service.
    Forward(Request),
}

/// Framework-independent core of the Bandwidth middleware.
///
/// Resolves (and caches) the application, phone number and SIP domain for the
/// request host, then either dispatches a callback or forwards the request.
pub struct Provisioner {
    api: Arc<dyn BandwidthApi>,
    cache: Arc<CacheStore>,
    options: ProvisioningOptions,
}

impl std::fmt::Debug for Provisioner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provisioner")
            .field("options", &self.options)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl Provisioner {
    /// Builds a provisioner talking to the Bandwidth REST API.
    ///
    /// Fails before any remote call when credentials are missing.
    pub async fn new(options: ProvisioningOptions) -> ProvisionResult<Self> {
        options.validate()?;
        let client = BandwidthClient::new(
            options.api_url.clone(),
            options.auth.user_id.clone(),
            options.auth.api_token.clone(),
            options.auth.api_secret.clone(),
            options.api_timeout,
        )?;
        Self::with_api(options, Arc::new(client)).await
    }

    /// Builds a provisioner over any [`BandwidthApi`] implementation.
    pub async fn with_api(
        options: ProvisioningOptions,
        api: Arc<dyn BandwidthApi>,
    ) -> ProvisionResult<Self> {
        options.validate()?;
        let cache = CacheStore::from_config(options.cache.clone()).await?;
        info!(
            name = %options.name,
            cache = cache.backend_type(),
            phone_number = options.phone_number.is_some(),
            sip = options.sip.is_some(),
            "Bandwidth provisioner ready"
        );
        Ok(Self {
            api,
            cache: Arc::new(cache),
            options,
        })
    }

    /// Replaces the cache, e.g. to share one store between provisioners.
    pub fn with_cache(mut self, cache: Arc<CacheStore>) -> Self {
        self.cache = cache;
        self
    }

    pub fn api(&self) -> &Arc<dyn BandwidthApi> {
        &self.api
    }

    pub fn cache(&self) -> &Arc<CacheStore> {
        &self.cache
    }

    pub fn options(&self) -> &ProvisioningOptions {
        &self.options
    }

    /// Resolves every configured resource for `host`, in order: application,
    /// phone number, SIP domain.
    pub async fn resolve(&self, host: &str) -> ProvisionResult<BandwidthContext> {
        let api = self.api.as_ref();
        let options = &self.options;

        let application_id: String = self
            .cache
            .wrap(format!("application:{}##{host}", options.name), || {
                get_or_create_application(api, options.name.as_str(), host, options.use_https)
            })
            .await?;

        let mut context = BandwidthContext::new(
            Arc::clone(&self.api),
            Arc::clone(&self.cache),
            application_id.clone(),
        );

        if let Some(number_options) = &options.phone_number {
            let phone_number: String = self
                .cache
                .wrap(format!("phone-number:{application_id}"), || {
                    get_or_create_phone_number(
                        api,
                        &application_id,
                        number_options,
                        options.phone_type,
                    )
                })
                .await?;
            context = context.with_phone_number(phone_number);
        }

        if let Some(sip) = &options.sip {
            let key = sip
                .domain
                .as_ref()
                .map_or_else(|| GENERATED_DOMAIN_KEY.to_string(), |d| format!("sip-domain:{d}"));
            let domain_id: String = self
                .cache
                .wrap(key, || get_or_create_domain(api, sip.domain.as_deref()))
                .await?;
            context = context.with_domain(domain_id);
        }

        debug!(host = %host, context = ?context, "Bandwidth resources resolved");
        Ok(context)
    }

    /// Callback handler configured for `path`, if any.
    pub fn callback_for(&self, path: &str) -> Option<&CallbackHandler> {
        match path {
            MESSAGE_CALLBACK_PATH => self.options.message_callback.as_ref(),
            CALL_CALLBACK_PATH => self.options.call_callback.as_ref(),
            _ => None,
        }
    }

    /// Provisions for the request's host, then dispatches a callback or
    /// returns the request for the next service.
    ///
    /// A callback is dispatched when the request is a POST to a callback path
    /// with a configured handler and its body is a JSON document; the
    /// response then has status 200 and an empty body, whatever the handler
    /// did. Any other request is forwarded with its body intact.
    pub async fn prepare(&self, mut request: Request) -> ProvisionResult<Prepared> {
        let host = request_host(&request)?;
        let context = self.resolve(&host).await?;

        let path = request.uri().path().to_string();
        let handler = if request.method() == Method::POST {
            self.callback_for(&path)
        } else {
            None
        };

        let Some(handler) = handler else {
            request.extensions_mut().insert(context);
            return Ok(Prepared::Forward(request));
        };

        let (parts, body) = request.into_parts();
        let limit = self.options.max_callback_body;
        let body_bytes = Limited::new(body, limit)
            .collect()
            .await
            .map_err(|e| {
                if e.is::<LengthLimitError>() {
                    ProvisionError::BodyTooLarge(limit)
                } else {
                    ProvisionError::Body(e.to_string())
                }
            })?
            .to_bytes();

        match CallbackEvent::from_slice(&body_bytes) {
            Some(event) => {
                dispatch(handler, event, context, &path).await;
                Ok(Prepared::Respond(StatusCode::OK.into_response()))
            }
            None => {
                debug!(path = %path, "Callback body is not JSON, forwarding request");
                let mut request = Request::from_parts(parts, Body::from(body_bytes));
                request.extensions_mut().insert(context);
                Ok(Prepared::Forward(request))
            }
        }
    }
}

/// Host (with port, if any) the request was addressed to.
fn request_host(request: &Request) -> ProvisionResult<String> {
    let from_header = request
        .headers()
        .get(header::HOST)
        .and_then(|value| value.to_str().ok());
    let from_uri = request.uri().authority().map(|authority| authority.as_str());

    from_header
        .or(from_uri)
        .map(str::trim)
        .filter(|host| !host.is_empty())
        .map(str::to_string)
        .ok_or(ProvisionError::MissingHost)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::InMemoryBandwidthApi;
    use crate::client::memory::ApiOperation;
    use crate::middleware::{Credentials, SipOptions};
    use crate::provision::PhoneNumberOptions;

    fn options() -> ProvisioningOptions {
        ProvisioningOptions::new("app", Credentials::new("u-1", "token", "secret"))
    }

    #[tokio::test]
    async fn test_new_rejects_missing_credentials() {
        let options = ProvisioningOptions::new("app", Credentials::new("", "", ""));
        let err = Provisioner::new(options).await.unwrap_err();
        assert!(matches!(err, ProvisionError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_resolve_caches_per_host() {
        let api = Arc::new(InMemoryBandwidthApi::new());
        let provisioner = Provisioner::with_api(options(), api.clone()).await.unwrap();

        let first = provisioner.resolve("localhost").await.unwrap();
        let second = provisioner.resolve("localhost").await.unwrap();
        assert_eq!(first.application_id, second.application_id);
        assert_eq!(api.call_count(ApiOperation::ListApplications), 1);

        let other = provisioner.resolve("example.com").await.unwrap();
        assert_ne!(other.application_id, first.application_id);
        assert_eq!(api.call_count(ApiOperation::CreateApplication), 2);
        assert!(first.phone_number.is_none());
        assert!(first.endpoint_resolver.is_none());
    }

    #[tokio::test]
    async fn test_resolve_phone_number_and_generated_domain() {
        let api = Arc::new(InMemoryBandwidthApi::new());
        let options = options()
            .with_phone_number(PhoneNumberOptions::new("main"), Default::default())
            .with_sip(SipOptions::default());
        let provisioner = Provisioner::with_api(options, api.clone()).await.unwrap();

        let first = provisioner.resolve("localhost").await.unwrap();
        let second = provisioner.resolve("localhost").await.unwrap();

        assert!(first.phone_number.is_some());
        assert_eq!(first.phone_number, second.phone_number);
        assert_eq!(first.domain_id, second.domain_id);
        assert_eq!(api.call_count(ApiOperation::SearchAndOrder), 1);
        assert_eq!(api.call_count(ApiOperation::CreateDomain), 1);
        assert_eq!(api.domains().len(), 1);
    }

    #[test]
    fn test_request_host() {
        let request = Request::builder()
            .uri("/")
            .header("host", "example.com:3000")
            .body(Body::empty())
            .unwrap();
        assert_eq!(request_host(&request).unwrap(), "example.com:3000");

        let request = Request::builder()
            .uri("http://absolute.example.com/path")
            .body(Body::empty())
            .unwrap();
        assert_eq!(request_host(&request).unwrap(), "absolute.example.com");

        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        assert!(matches!(
            request_host(&request),
            Err(ProvisionError::MissingHost)
        ));
    }
}
