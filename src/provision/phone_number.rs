//! Phone-number resolver.
//!
//! Numbers are found by (application id, name). When none matches, one number
//! is ordered with the caller's search criteria and tagged with both values.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::client::{
    BandwidthApi, PhoneNumber, PhoneNumberQuery, PhoneNumberUpdate, PhoneType, SearchCriteria,
};
use crate::errors::{ProvisionError, ProvisionResult};

const LIST_PAGE_SIZE: u32 = 1000;

/// Lookup name plus search criteria (`areaCode`, `state`, `city`...) for ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneNumberOptions {
    /// Tag of the number; empty means any number of the application.
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub criteria: SearchCriteria,
}

impl PhoneNumberOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            criteria: SearchCriteria::new(),
        }
    }

    /// Adds one search criterion.
    pub fn with_criterion(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.criteria.insert(key.into(), value.into());
        self
    }

    fn name_filter(&self) -> Option<String> {
        (!self.name.is_empty()).then(|| self.name.clone())
    }
}

/// Lists up to 1000 numbers bound to `application_id`.
pub async fn list_phone_numbers(
    api: &dyn BandwidthApi,
    application_id: &str,
) -> ProvisionResult<Vec<PhoneNumber>> {
    let query = PhoneNumberQuery {
        size: LIST_PAGE_SIZE,
        application_id: Some(application_id.to_string()),
        name: None,
    };
    Ok(api.list_phone_numbers(&query).await?)
}

/// Returns the first number bound to `application_id` with tag `name`.
pub async fn get_phone_number(
    api: &dyn BandwidthApi,
    application_id: &str,
    name: Option<&str>,
) -> ProvisionResult<Option<PhoneNumber>> {
    let query = PhoneNumberQuery {
        size: LIST_PAGE_SIZE,
        application_id: Some(application_id.to_string()),
        name: name.filter(|n| !n.is_empty()).map(str::to_string),
    };
    Ok(api.list_phone_numbers(&query).await?.into_iter().next())
}

/// Orders one number matching `options.criteria` and tags it with the
/// application id and `options.name`. Returns the number in E.164 form.
///
/// A failed tag update leaves the purchased number untagged on the account.
pub async fn create_phone_number(
    api: &dyn BandwidthApi,
    application_id: &str,
    options: &PhoneNumberOptions,
    phone_type: PhoneType,
) -> ProvisionResult<String> {
    let mut criteria = options.criteria.clone();
    criteria.remove("name");
    criteria.insert("quantity".to_string(), "1".to_string());

    info!(phone_type = %phone_type, application_id = %application_id, "Ordering new phone number");
    let ordered = api
        .search_and_order(phone_type, &criteria)
        .await?
        .into_iter()
        .next()
        .ok_or(ProvisionError::NoAvailableNumber(phone_type))?;

    let update = PhoneNumberUpdate {
        application_id: application_id.to_string(),
        name: options.name_filter(),
    };
    if let Err(e) = api.update_phone_number(&ordered.id, &update).await {
        warn!(number = %ordered.number, error = %e, "Ordered phone number could not be tagged");
        return Err(e.into());
    }

    Ok(ordered.number)
}

/// Returns the number tagged `options.name` for `application_id`, ordering
/// one when none exists. Existing numbers are never modified.
pub async fn get_or_create_phone_number(
    api: &dyn BandwidthApi,
    application_id: &str,
    options: &PhoneNumberOptions,
    phone_type: PhoneType,
) -> ProvisionResult<String> {
    debug!(application_id = %application_id, name = %options.name, "Getting phone number");
    if let Some(existing) = get_phone_number(api, application_id, Some(&options.name)).await? {
        debug!(number = %existing.number, "Found existing phone number");
        return Ok(existing.number);
    }
    create_phone_number(api, application_id, options, phone_type).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::InMemoryBandwidthApi;
    use crate::client::memory::ApiOperation;

    #[tokio::test]
    async fn test_get_or_create_returns_existing() {
        let api = InMemoryBandwidthApi::new();
        api.insert_phone_number("app", Some("support"), "+19100000001");

        let number = get_or_create_phone_number(
            &api,
            "app",
            &PhoneNumberOptions::new("support"),
            PhoneType::Local,
        )
        .await
        .unwrap();

        assert_eq!(number, "+19100000001");
        assert_eq!(api.call_count(ApiOperation::SearchAndOrder), 0);
        assert_eq!(api.call_count(ApiOperation::UpdatePhoneNumber), 0);
    }

    #[tokio::test]
    async fn test_create_orders_one_and_tags_it() {
        let api = InMemoryBandwidthApi::new();
        let options = PhoneNumberOptions::new("sales")
            .with_criterion("areaCode", "910")
            .with_criterion("quantity", "5");

        let number = get_or_create_phone_number(&api, "app", &options, PhoneType::Local)
            .await
            .unwrap();

        assert!(number.starts_with("+1910"));
        let numbers = api.phone_numbers();
        assert_eq!(numbers.len(), 1);
        assert_eq!(numbers[0].application_id.as_deref(), Some("app"));
        assert_eq!(numbers[0].name.as_deref(), Some("sales"));

        let again = get_or_create_phone_number(&api, "app", &options, PhoneType::Local)
            .await
            .unwrap();
        assert_eq!(again, number);
        assert_eq!(api.call_count(ApiOperation::SearchAndOrder), 1);
    }

    #[tokio::test]
    async fn test_empty_name_matches_any_number_of_application() {
        let api = InMemoryBandwidthApi::new();
        api.insert_phone_number("app", Some("support"), "+19100000001");

        let number =
            get_or_create_phone_number(&api, "app", &PhoneNumberOptions::default(), PhoneType::Local)
                .await
                .unwrap();
        assert_eq!(number, "+19100000001");
    }

    #[tokio::test]
    async fn test_empty_inventory_is_an_error() {
        let api = InMemoryBandwidthApi::new();
        api.set_empty_inventory(true);

        let err = create_phone_number(
            &api,
            "app",
            &PhoneNumberOptions::default(),
            PhoneType::TollFree,
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            ProvisionError::NoAvailableNumber(PhoneType::TollFree)
        ));
        assert_eq!(api.call_count(ApiOperation::UpdatePhoneNumber), 0);
    }

    #[tokio::test]
    async fn test_failed_tag_keeps_purchased_number() {
        let api = InMemoryBandwidthApi::new();
        api.set_fail_number_updates(true);

        let result =
            create_phone_number(&api, "app", &PhoneNumberOptions::new("x"), PhoneType::Local).await;

        assert!(matches!(result, Err(ProvisionError::Api(_))));
        let numbers = api.phone_numbers();
        assert_eq!(numbers.len(), 1);
        assert!(numbers[0].application_id.is_none());
    }

    #[test]
    fn test_options_deserialize_flattened_criteria() {
        let options: PhoneNumberOptions =
            serde_json::from_str(r#"{"name": "main", "areaCode": "910", "state": "NC"}"#).unwrap();
        assert_eq!(options.name, "main");
        assert_eq!(options.criteria.get("areaCode").map(String::as_str), Some("910"));
        assert_eq!(options.criteria.len(), 2);
    }
}
