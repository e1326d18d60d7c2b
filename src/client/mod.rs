//! Bandwidth provider client.
//!
//! The resolvers in [`crate::provision`] only talk to the [`BandwidthApi`]
//! trait. Two implementations ship with the crate:
//! - [`BandwidthClient`] - reqwest client for the hosted v1 REST API
//! - [`InMemoryBandwidthApi`] - in-process account for development and tests

use async_trait::async_trait;
use std::collections::BTreeMap;

pub mod error;
pub mod memory;
pub mod rest;
pub mod types;

pub use error::{ApiError, ApiResult};
pub use memory::InMemoryBandwidthApi;
pub use rest::{BandwidthClient, DEFAULT_API_URL};
pub use types::{
    Application, Domain, Endpoint, EndpointCredentials, NewApplication, NewEndpoint,
    NewEndpointCredentials, OrderedNumber, PhoneNumber, PhoneNumberQuery, PhoneNumberUpdate,
    PhoneType,
};

/// Search criteria passed through to number search-and-order (`areaCode`, `state`...).
pub type SearchCriteria = BTreeMap<String, String>;

/// Operations the provisioning flow needs from the communications platform.
///
/// Create calls return only the id of the new resource; callers that need the
/// full representation fetch it afterwards.
#[async_trait]
pub trait BandwidthApi: Send + Sync {
    /// Lists up to `size` applications visible to the credentials.
    async fn list_applications(&self, size: u32) -> ApiResult<Vec<Application>>;

    /// Creates an application and returns its id.
    async fn create_application(&self, application: &NewApplication) -> ApiResult<String>;

    /// Lists phone numbers matching the query.
    async fn list_phone_numbers(&self, query: &PhoneNumberQuery) -> ApiResult<Vec<PhoneNumber>>;

    /// Updates the application binding and name of a phone number.
    async fn update_phone_number(&self, id: &str, update: &PhoneNumberUpdate) -> ApiResult<()>;

    /// Searches the inventory and orders every number found.
    async fn search_and_order(
        &self,
        phone_type: PhoneType,
        criteria: &SearchCriteria,
    ) -> ApiResult<Vec<OrderedNumber>>;

    /// Lists up to `size` SIP domains.
    async fn list_domains(&self, size: u32) -> ApiResult<Vec<Domain>>;

    /// Creates a SIP domain and returns its id.
    async fn create_domain(&self, name: &str) -> ApiResult<String>;

    /// Lists up to `size` endpoints of a domain.
    async fn list_endpoints(&self, domain_id: &str, size: u32) -> ApiResult<Vec<Endpoint>>;

    /// Creates an endpoint inside a domain and returns its id.
    async fn create_endpoint(&self, domain_id: &str, endpoint: &NewEndpoint) -> ApiResult<String>;

    /// Fetches one endpoint by id.
    async fn get_endpoint(&self, domain_id: &str, endpoint_id: &str) -> ApiResult<Endpoint>;
}
