use async_trait::async_trait;
use reqwest::header::LOCATION;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;

use super::error::{ApiError, ApiResult};
use super::types::{
    Application, Domain, Endpoint, NewApplication, NewEndpoint, OrderedNumber, PhoneNumber,
    PhoneNumberQuery, PhoneNumberUpdate, PhoneType,
};
use super::{BandwidthApi, SearchCriteria};

/// Production endpoint of the v1 (Catapult) REST API.
pub const DEFAULT_API_URL: &str = "https://api.catapult.inetwork.com";

/// HTTP client for the Bandwidth v1 REST API.
///
/// Requests are authenticated with HTTP basic auth (API token and secret);
/// user-scoped resources live under `/v1/users/{user_id}`.
#[derive(Clone)]
pub struct BandwidthClient {
    base_url: String,
    user_id: String,
    api_token: String,
    api_secret: String,
    client: Client,
}

impl std::fmt::Debug for BandwidthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BandwidthClient")
            .field("base_url", &self.base_url)
            .field("user_id", &self.user_id)
            .field("api_token", &"<redacted>")
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

impl BandwidthClient {
    /// Create a client bound to one set of credentials
    ///
    /// # Arguments
    /// * `base_url` - API root, e.g. [`DEFAULT_API_URL`]
    /// * `user_id` - Account user id (`u-...`)
    /// * `api_token` / `api_secret` - Basic auth credentials
    /// * `timeout` - Per-request timeout
    pub fn new(
        base_url: impl Into<String>,
        user_id: impl Into<String>,
        api_token: impl Into<String>,
        api_secret: impl Into<String>,
        timeout: Duration,
    ) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(10)
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_id: user_id.into(),
            api_token: api_token.into(),
            api_secret: api_secret.into(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn user_url(&self, path: &str) -> String {
        format!("{}/v1/users/{}/{}", self.base_url, self.user_id, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(&self.api_token, Some(&self.api_secret))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
        query: &(impl Serialize + ?Sized),
    ) -> ApiResult<T> {
        let resp = self
            .authorized(self.client.get(&url))
            .query(query)
            .send()
            .await?;
        let resp = ensure_success(resp).await?;
        resp.json::<T>()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("GET {url}: {e}")))
    }

    /// POSTs a create payload and extracts the new resource id from `Location`.
    async fn create(&self, url: String, body: &(impl Serialize + ?Sized)) -> ApiResult<String> {
        let resp = self
            .authorized(self.client.post(&url))
            .json(body)
            .send()
            .await?;
        let resp = ensure_success(resp).await?;

        resp.headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .and_then(id_from_location)
            .ok_or(ApiError::MissingLocation(url))
    }
}

async fn ensure_success(resp: Response) -> ApiResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    if status == StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound(body));
    }
    Err(ApiError::status(status, body))
}

/// Returns the last path segment of a resource location URL.
pub(crate) fn id_from_location(location: &str) -> Option<String> {
    let path = location.split(['?', '#']).next().unwrap_or_default();
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty() && !segment.contains(':'))
        .map(str::to_string)
}

#[async_trait]
impl BandwidthApi for BandwidthClient {
    async fn list_applications(&self, size: u32) -> ApiResult<Vec<Application>> {
        self.get_json(self.user_url("applications"), &[("size", size)])
            .await
    }

    async fn create_application(&self, application: &NewApplication) -> ApiResult<String> {
        self.create(self.user_url("applications"), application).await
    }

    async fn list_phone_numbers(&self, query: &PhoneNumberQuery) -> ApiResult<Vec<PhoneNumber>> {
        self.get_json(self.user_url("phoneNumbers"), query).await
    }

    async fn update_phone_number(&self, id: &str, update: &PhoneNumberUpdate) -> ApiResult<()> {
        let url = self.user_url(&format!("phoneNumbers/{id}"));
        let resp = self
            .authorized(self.client.post(&url))
            .json(update)
            .send()
            .await?;
        ensure_success(resp).await?;
        Ok(())
    }

    async fn search_and_order(
        &self,
        phone_type: PhoneType,
        criteria: &SearchCriteria,
    ) -> ApiResult<Vec<OrderedNumber>> {
        let url = format!("{}/v1/availableNumbers/{}", self.base_url, phone_type);
        let resp = self
            .authorized(self.client.post(&url))
            .query(criteria)
            .send()
            .await?;
        let resp = ensure_success(resp).await?;

        let mut numbers = resp
            .json::<Vec<OrderedNumber>>()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("POST {url}: {e}")))?;

        for number in numbers.iter_mut() {
            if number.id.is_empty()
                && let Some(id) = number.location.as_deref().and_then(id_from_location)
            {
                number.id = id;
            }
        }

        Ok(numbers)
    }

    async fn list_domains(&self, size: u32) -> ApiResult<Vec<Domain>> {
        self.get_json(self.user_url("domains"), &[("size", size)])
            .await
    }

    async fn create_domain(&self, name: &str) -> ApiResult<String> {
        self.create(self.user_url("domains"), &json!({ "name": name }))
            .await
    }

    async fn list_endpoints(&self, domain_id: &str, size: u32) -> ApiResult<Vec<Endpoint>> {
        self.get_json(
            self.user_url(&format!("domains/{domain_id}/endpoints")),
            &[("size", size)],
        )
        .await
    }

    async fn create_endpoint(&self, domain_id: &str, endpoint: &NewEndpoint) -> ApiResult<String> {
        self.create(
            self.user_url(&format!("domains/{domain_id}/endpoints")),
            endpoint,
        )
        .await
    }

    async fn get_endpoint(&self, domain_id: &str, endpoint_id: &str) -> ApiResult<Endpoint> {
        let empty: [(&str, &str); 0] = [];
        self.get_json(
            self.user_url(&format!("domains/{domain_id}/endpoints/{endpoint_id}")),
            &empty,
        )
        .await
    }
}
