//! SIP domain and endpoint resolver.

use tracing::{debug, info};

use crate::client::{BandwidthApi, Domain, Endpoint, NewEndpoint, NewEndpointCredentials};
use crate::errors::ProvisionResult;
use crate::utils::random;

const DOMAIN_PAGE_SIZE: u32 = 100;
const ENDPOINT_PAGE_SIZE: u32 = 1000;

/// SIP account to resolve inside a domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SipAccount {
    /// User name only; a random password is generated on creation.
    UserName(String),
    Credentials {
        user_name: String,
        password: Option<String>,
    },
}

impl SipAccount {
    pub fn user_name(&self) -> &str {
        match self {
            SipAccount::UserName(user_name) | SipAccount::Credentials { user_name, .. } => {
                user_name
            }
        }
    }

    fn into_parts(self) -> (String, String) {
        match self {
            SipAccount::UserName(user_name) => (user_name, random::sip_password()),
            SipAccount::Credentials {
                user_name,
                password,
            } => (user_name, password.unwrap_or_else(random::sip_password)),
        }
    }
}

impl From<&str> for SipAccount {
    fn from(user_name: &str) -> Self {
        SipAccount::UserName(user_name.to_string())
    }
}

impl From<String> for SipAccount {
    fn from(user_name: String) -> Self {
        SipAccount::UserName(user_name)
    }
}

pub async fn list_domains(api: &dyn BandwidthApi) -> ProvisionResult<Vec<Domain>> {
    Ok(api.list_domains(DOMAIN_PAGE_SIZE).await?)
}

pub async fn get_domain(api: &dyn BandwidthApi, name: &str) -> ProvisionResult<Option<Domain>> {
    Ok(list_domains(api)
        .await?
        .into_iter()
        .find(|domain| domain.name == name))
}

/// Returns the id of the domain called `name`, creating it if needed.
/// Without a name a random one is generated, so a new domain is always created.
pub async fn get_or_create_domain(
    api: &dyn BandwidthApi,
    name: Option<&str>,
) -> ProvisionResult<String> {
    let name = name.map_or_else(random::domain_name, str::to_string);
    debug!(domain = %name, "Getting SIP domain id");

    if let Some(existing) = get_domain(api, &name).await? {
        return Ok(existing.id);
    }

    info!(domain = %name, "Creating new SIP domain");
    Ok(api.create_domain(&name).await?)
}

pub async fn list_endpoints(
    api: &dyn BandwidthApi,
    domain_id: &str,
) -> ProvisionResult<Vec<Endpoint>> {
    Ok(api.list_endpoints(domain_id, ENDPOINT_PAGE_SIZE).await?)
}

pub async fn get_endpoint(
    api: &dyn BandwidthApi,
    domain_id: &str,
    name: &str,
) -> ProvisionResult<Option<Endpoint>> {
    Ok(list_endpoints(api, domain_id)
        .await?
        .into_iter()
        .find(|endpoint| endpoint.name == name))
}

/// Returns the endpoint for `account` in `domain_id`, creating it bound to
/// `application_id` when absent. A created endpoint is fetched again so the
/// caller gets the server's representation (SIP URI, realm).
pub async fn get_or_create_endpoint(
    api: &dyn BandwidthApi,
    application_id: &str,
    domain_id: &str,
    account: impl Into<SipAccount>,
) -> ProvisionResult<Endpoint> {
    let account = account.into();
    if let Some(existing) = get_endpoint(api, domain_id, account.user_name()).await? {
        debug!(endpoint_id = %existing.id, "Found existing SIP endpoint");
        return Ok(existing);
    }

    let (user_name, password) = account.into_parts();
    let endpoint = NewEndpoint {
        name: user_name.to_lowercase(),
        domain_id: domain_id.to_string(),
        application_id: application_id.to_string(),
        enabled: true,
        credentials: NewEndpointCredentials { password },
    };

    info!(name = %endpoint.name, domain_id = %domain_id, "Creating new SIP endpoint");
    let endpoint_id = api.create_endpoint(domain_id, &endpoint).await?;
    Ok(api.get_endpoint(domain_id, &endpoint_id).await?)
}
