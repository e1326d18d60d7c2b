use std::fmt;
use std::sync::Arc;

use crate::client::{BandwidthApi, Endpoint};
use crate::core::cache::CacheStore;
use crate::errors::{ProvisionError, ProvisionResult};
use crate::provision::{SipAccount, get_or_create_endpoint};

/// Creates SIP endpoints bound to the provisioned application and domain.
#[derive(Clone)]
pub struct EndpointResolver {
    api: Arc<dyn BandwidthApi>,
    application_id: String,
    domain_id: String,
}

impl EndpointResolver {
    pub fn new(
        api: Arc<dyn BandwidthApi>,
        application_id: impl Into<String>,
        domain_id: impl Into<String>,
    ) -> Self {
        Self {
            api,
            application_id: application_id.into(),
            domain_id: domain_id.into(),
        }
    }

    pub fn domain_id(&self) -> &str {
        &self.domain_id
    }

    pub async fn get_or_create(&self, account: impl Into<SipAccount>) -> ProvisionResult<Endpoint> {
        get_or_create_endpoint(
            self.api.as_ref(),
            &self.application_id,
            &self.domain_id,
            account,
        )
        .await
    }
}

impl fmt::Debug for EndpointResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointResolver")
            .field("application_id", &self.application_id)
            .field("domain_id", &self.domain_id)
            .finish()
    }
}

/// Provisioned resources of the current request, available to route
/// handlers as `Extension<BandwidthContext>` and to callback handlers.
#[derive(Clone)]
pub struct BandwidthContext {
    pub api: Arc<dyn BandwidthApi>,
    pub application_id: String,
    /// Set when a phone number is configured.
    pub phone_number: Option<String>,
    /// Set when SIP is configured.
    pub domain_id: Option<String>,
    pub endpoint_resolver: Option<EndpointResolver>,
    pub cache: Arc<CacheStore>,
}

impl BandwidthContext {
    /// Context with only an application; phone number and SIP left unset.
    pub fn new(
        api: Arc<dyn BandwidthApi>,
        cache: Arc<CacheStore>,
        application_id: impl Into<String>,
    ) -> Self {
        Self {
            api,
            application_id: application_id.into(),
            phone_number: None,
            domain_id: None,
            endpoint_resolver: None,
            cache,
        }
    }

    pub fn with_phone_number(mut self, phone_number: impl Into<String>) -> Self {
        self.phone_number = Some(phone_number.into());
        self
    }

    pub fn with_domain(mut self, domain_id: impl Into<String>) -> Self {
        let domain_id = domain_id.into();
        self.endpoint_resolver = Some(EndpointResolver::new(
            Arc::clone(&self.api),
            self.application_id.clone(),
            domain_id.clone(),
        ));
        self.domain_id = Some(domain_id);
        self
    }

    /// Shortcut for `endpoint_resolver.get_or_create`, failing when SIP is
    /// not configured.
    pub async fn get_or_create_endpoint(
        &self,
        account: impl Into<SipAccount>,
    ) -> ProvisionResult<Endpoint> {
        let resolver = self.endpoint_resolver.as_ref().ok_or_else(|| {
            ProvisionError::Configuration("SIP is not configured".to_string())
        })?;
        resolver.get_or_create(account).await
    }
}

impl fmt::Debug for BandwidthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BandwidthContext")
            .field("application_id", &self.application_id)
            .field("phone_number", &self.phone_number)
            .field("domain_id", &self.domain_id)
            .finish_non_exhaustive()
    }
}
