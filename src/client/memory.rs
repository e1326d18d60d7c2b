//! In-process [`BandwidthApi`] implementation.
//!
//! Keeps an account's applications, numbers, domains and endpoints in memory
//! and counts every call, so provisioning flows can be exercised offline.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use super::error::{ApiError, ApiResult};
use super::types::{
    Application, Domain, Endpoint, EndpointCredentials, NewApplication, NewEndpoint,
    OrderedNumber, PhoneNumber, PhoneNumberQuery, PhoneNumberUpdate, PhoneType,
};
use super::{BandwidthApi, SearchCriteria};

/// Operations recorded by [`InMemoryBandwidthApi`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiOperation {
    ListApplications,
    CreateApplication,
    ListPhoneNumbers,
    UpdatePhoneNumber,
    SearchAndOrder,
    ListDomains,
    CreateDomain,
    ListEndpoints,
    CreateEndpoint,
    GetEndpoint,
}

#[derive(Default)]
struct Account {
    applications: Vec<Application>,
    phone_numbers: Vec<PhoneNumber>,
    domains: Vec<Domain>,
    endpoints: Vec<Endpoint>,
    endpoint_passwords: HashMap<String, String>,
    calls: HashMap<ApiOperation, usize>,
    next_id: u64,
}

impl Account {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }
}

/// Offline Bandwidth account.
#[derive(Default)]
pub struct InMemoryBandwidthApi {
    account: Mutex<Account>,
    empty_inventory: AtomicBool,
    fail_number_updates: AtomicBool,
}

impl InMemoryBandwidthApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an existing application and returns its id.
    pub fn insert_application(&self, name: impl Into<String>) -> String {
        let mut account = self.account.lock();
        let id = account.next_id("a");
        account.applications.push(Application {
            id: id.clone(),
            name: name.into(),
            incoming_message_url: None,
            incoming_call_url: None,
            auto_answer: true,
            callback_http_method: Some("POST".to_string()),
        });
        id
    }

    /// Seeds a phone number bound to `application_id`.
    pub fn insert_phone_number(
        &self,
        application_id: impl Into<String>,
        name: Option<&str>,
        number: impl Into<String>,
    ) -> String {
        let mut account = self.account.lock();
        let id = account.next_id("n");
        account.phone_numbers.push(PhoneNumber {
            id: id.clone(),
            number: number.into(),
            national_number: None,
            name: name.map(str::to_string),
            application_id: Some(application_id.into()),
        });
        id
    }

    /// Seeds a SIP domain and returns its id.
    pub fn insert_domain(&self, name: impl Into<String>) -> String {
        let mut account = self.account.lock();
        let id = account.next_id("rd");
        account.domains.push(Domain {
            id: id.clone(),
            name: name.into(),
            description: None,
        });
        id
    }

    /// Seeds an endpoint inside `domain_id` and returns its id.
    pub fn insert_endpoint(&self, domain_id: &str, name: impl Into<String>) -> String {
        let mut account = self.account.lock();
        let id = account.next_id("re");
        let name = name.into();
        account.endpoints.push(Endpoint {
            id: id.clone(),
            name: name.clone(),
            domain_id: domain_id.to_string(),
            application_id: None,
            enabled: true,
            description: None,
            sip_uri: None,
            credentials: Some(EndpointCredentials {
                user_name: Some(name),
                realm: None,
                password: None,
            }),
        });
        id
    }

    /// Makes every later search-and-order return no numbers.
    pub fn set_empty_inventory(&self, empty: bool) {
        self.empty_inventory.store(empty, Ordering::SeqCst);
    }

    /// Makes every later phone number update fail with a 500.
    pub fn set_fail_number_updates(&self, fail: bool) {
        self.fail_number_updates.store(fail, Ordering::SeqCst);
    }

    /// Number of times `operation` was called.
    pub fn call_count(&self, operation: ApiOperation) -> usize {
        self.account
            .lock()
            .calls
            .get(&operation)
            .copied()
            .unwrap_or(0)
    }

    pub fn applications(&self) -> Vec<Application> {
        self.account.lock().applications.clone()
    }

    pub fn phone_numbers(&self) -> Vec<PhoneNumber> {
        self.account.lock().phone_numbers.clone()
    }

    pub fn domains(&self) -> Vec<Domain> {
        self.account.lock().domains.clone()
    }

    pub fn endpoints(&self) -> Vec<Endpoint> {
        self.account.lock().endpoints.clone()
    }

    /// Password an endpoint was created with (never returned by the API itself).
    pub fn endpoint_password(&self, endpoint_id: &str) -> Option<String> {
        self.account
            .lock()
            .endpoint_passwords
            .get(endpoint_id)
            .cloned()
    }

    fn record(&self, operation: ApiOperation) -> parking_lot::MutexGuard<'_, Account> {
        let mut account = self.account.lock();
        *account.calls.entry(operation).or_insert(0) += 1;
        account
    }
}

#[async_trait]
impl BandwidthApi for InMemoryBandwidthApi {
    async fn list_applications(&self, size: u32) -> ApiResult<Vec<Application>> {
        let account = self.record(ApiOperation::ListApplications);
        Ok(account
            .applications
            .iter()
            .take(size as usize)
            .cloned()
            .collect())
    }

    async fn create_application(&self, application: &NewApplication) -> ApiResult<String> {
        let mut account = self.record(ApiOperation::CreateApplication);
        let id = account.next_id("a");
        account.applications.push(Application {
            id: id.clone(),
            name: application.name.clone(),
            incoming_message_url: Some(application.incoming_message_url.clone()),
            incoming_call_url: Some(application.incoming_call_url.clone()),
            auto_answer: application.auto_answer,
            callback_http_method: Some(application.callback_http_method.clone()),
        });
        Ok(id)
    }

    async fn list_phone_numbers(&self, query: &PhoneNumberQuery) -> ApiResult<Vec<PhoneNumber>> {
        let account = self.record(ApiOperation::ListPhoneNumbers);
        let matches = |number: &&PhoneNumber| {
            let application_matches = query
                .application_id
                .as_ref()
                .is_none_or(|id| number.application_id.as_ref() == Some(id));
            let name_matches = query
                .name
                .as_ref()
                .filter(|name| !name.is_empty())
                .is_none_or(|name| number.name.as_ref() == Some(name));
            application_matches && name_matches
        };
        Ok(account
            .phone_numbers
            .iter()
            .filter(matches)
            .take(query.size as usize)
            .cloned()
            .collect())
    }

    async fn update_phone_number(&self, id: &str, update: &PhoneNumberUpdate) -> ApiResult<()> {
        let mut account = self.record(ApiOperation::UpdatePhoneNumber);
        if self.fail_number_updates.load(Ordering::SeqCst) {
            return Err(ApiError::status(
                reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                "update failed".to_string(),
            ));
        }
        let number = account
            .phone_numbers
            .iter_mut()
            .find(|number| number.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("phone number {id}")))?;
        number.application_id = Some(update.application_id.clone());
        number.name = update.name.clone();
        Ok(())
    }

    async fn search_and_order(
        &self,
        phone_type: PhoneType,
        criteria: &SearchCriteria,
    ) -> ApiResult<Vec<OrderedNumber>> {
        let mut account = self.record(ApiOperation::SearchAndOrder);
        if self.empty_inventory.load(Ordering::SeqCst) {
            return Ok(Vec::new());
        }

        let quantity = criteria
            .get("quantity")
            .and_then(|q| q.parse::<usize>().ok())
            .unwrap_or(1);
        let prefix = match phone_type {
            PhoneType::Local => criteria
                .get("areaCode")
                .cloned()
                .unwrap_or_else(|| "555".to_string()),
            PhoneType::TollFree => "800".to_string(),
        };

        let mut ordered = Vec::with_capacity(quantity);
        for _ in 0..quantity {
            let id = account.next_id("n");
            let national = format!("{prefix}{:07}", account.next_id);
            let number = format!("+1{national}");
            account.phone_numbers.push(PhoneNumber {
                id: id.clone(),
                number: number.clone(),
                national_number: Some(national.clone()),
                name: None,
                application_id: None,
            });
            ordered.push(OrderedNumber {
                location: Some(format!("/v1/users/memory/phoneNumbers/{id}")),
                id,
                number,
                national_number: Some(national),
                price: Some("0.35".to_string()),
            });
        }
        Ok(ordered)
    }

    async fn list_domains(&self, size: u32) -> ApiResult<Vec<Domain>> {
        let account = self.record(ApiOperation::ListDomains);
        Ok(account.domains.iter().take(size as usize).cloned().collect())
    }

    async fn create_domain(&self, name: &str) -> ApiResult<String> {
        let mut account = self.record(ApiOperation::CreateDomain);
        let id = account.next_id("rd");
        account.domains.push(Domain {
            id: id.clone(),
            name: name.to_string(),
            description: None,
        });
        Ok(id)
    }

    async fn list_endpoints(&self, domain_id: &str, size: u32) -> ApiResult<Vec<Endpoint>> {
        let account = self.record(ApiOperation::ListEndpoints);
        Ok(account
            .endpoints
            .iter()
            .filter(|endpoint| endpoint.domain_id == domain_id)
            .take(size as usize)
            .cloned()
            .collect())
    }

    async fn create_endpoint(&self, domain_id: &str, endpoint: &NewEndpoint) -> ApiResult<String> {
        let mut account = self.record(ApiOperation::CreateEndpoint);
        let domain_name = account
            .domains
            .iter()
            .find(|domain| domain.id == domain_id)
            .map(|domain| domain.name.clone())
            .unwrap_or_else(|| domain_id.to_string());

        let id = account.next_id("re");
        let realm = format!("{domain_name}.bwapp.bwsip.io");
        account.endpoints.push(Endpoint {
            id: id.clone(),
            name: endpoint.name.clone(),
            domain_id: domain_id.to_string(),
            application_id: Some(endpoint.application_id.clone()),
            enabled: endpoint.enabled,
            description: None,
            sip_uri: Some(format!("sip:{}@{realm}", endpoint.name)),
            credentials: Some(EndpointCredentials {
                user_name: Some(endpoint.name.clone()),
                realm: Some(realm),
                password: None,
            }),
        });
        account
            .endpoint_passwords
            .insert(id.clone(), endpoint.credentials.password.clone());
        Ok(id)
    }

    async fn get_endpoint(&self, domain_id: &str, endpoint_id: &str) -> ApiResult<Endpoint> {
        let account = self.record(ApiOperation::GetEndpoint);
        account
            .endpoints
            .iter()
            .find(|endpoint| endpoint.domain_id == domain_id && endpoint.id == endpoint_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("endpoint {endpoint_id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_phone_number_filters() {
        let api = InMemoryBandwidthApi::new();
        api.insert_phone_number("app-1", Some("support"), "+19100000001");
        api.insert_phone_number("app-1", Some("sales"), "+19100000002");
        api.insert_phone_number("app-2", Some("support"), "+19100000003");

        let query = PhoneNumberQuery {
            size: 1000,
            application_id: Some("app-1".to_string()),
            name: Some("support".to_string()),
        };
        let numbers = api.list_phone_numbers(&query).await.unwrap();
        assert_eq!(numbers.len(), 1);
        assert_eq!(numbers[0].number, "+19100000001");

        let query = PhoneNumberQuery {
            size: 1000,
            application_id: Some("app-1".to_string()),
            name: Some(String::new()),
        };
        assert_eq!(api.list_phone_numbers(&query).await.unwrap().len(), 2);
        assert_eq!(api.call_count(ApiOperation::ListPhoneNumbers), 2);
    }

    #[tokio::test]
    async fn test_search_and_order_uses_area_code() {
        let api = InMemoryBandwidthApi::new();
        let mut criteria = SearchCriteria::new();
        criteria.insert("areaCode".to_string(), "910".to_string());
        criteria.insert("quantity".to_string(), "1".to_string());

        let ordered = api
            .search_and_order(PhoneType::Local, &criteria)
            .await
            .unwrap();
        assert_eq!(ordered.len(), 1);
        assert!(ordered[0].number.starts_with("+1910"));
        assert_eq!(api.phone_numbers().len(), 1);
    }

    #[tokio::test]
    async fn test_get_endpoint_not_found() {
        let api = InMemoryBandwidthApi::new();
        let result = api.get_endpoint("rd-1", "missing").await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }
}
