//! Wire types for the Bandwidth v1 REST API.
//!
//! Responses are deserialized leniently: only `id` and `name` (or `number`)
//! are required, everything else defaults when the API leaves it out.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Application registration receiving message and call callbacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incoming_message_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incoming_call_url: Option<String>,
    #[serde(default)]
    pub auto_answer: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_http_method: Option<String>,
}

/// Payload of an application create call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewApplication {
    pub name: String,
    pub incoming_message_url: String,
    pub incoming_call_url: String,
    pub auto_answer: bool,
    pub callback_http_method: String,
}

/// Phone number owned by the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneNumber {
    pub id: String,
    pub number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub national_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,
}

/// Filter for listing phone numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneNumberQuery {
    pub size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Tags written onto a freshly ordered number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneNumberUpdate {
    pub application_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// One entry of a search-and-order result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderedNumber {
    /// Id of the new phone number resource, taken from `location`
    #[serde(default)]
    pub id: String,
    pub number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub national_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Number inventory to search in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PhoneType {
    #[default]
    Local,
    TollFree,
}

impl PhoneType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhoneType::Local => "local",
            PhoneType::TollFree => "tollFree",
        }
    }

    /// Parses the names accepted in configuration (case insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "local" => Some(PhoneType::Local),
            "tollfree" | "toll_free" | "toll-free" => Some(PhoneType::TollFree),
            _ => None,
        }
    }
}

impl fmt::Display for PhoneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SIP registrar namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// SIP account inside a domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub domain_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sip_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<EndpointCredentials>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointCredentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Payload of an endpoint create call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEndpoint {
    pub name: String,
    pub domain_id: String,
    pub application_id: String,
    pub enabled: bool,
    pub credentials: NewEndpointCredentials,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEndpointCredentials {
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_application_deserializes_camel_case() {
        let app: Application = serde_json::from_value(json!({
            "id": "a-1",
            "name": "app on localhost",
            "incomingCallUrl": "https://localhost/bandwidth/callback/call",
            "autoAnswer": true
        }))
        .unwrap();

        assert_eq!(app.id, "a-1");
        assert_eq!(
            app.incoming_call_url.as_deref(),
            Some("https://localhost/bandwidth/callback/call")
        );
        assert!(app.auto_answer);
        assert!(app.incoming_message_url.is_none());
    }

    #[test]
    fn test_new_endpoint_serializes_nested_password() {
        let endpoint = NewEndpoint {
            name: "user3".to_string(),
            domain_id: "domainId".to_string(),
            application_id: "appId".to_string(),
            enabled: true,
            credentials: NewEndpointCredentials {
                password: "123".to_string(),
            },
        };

        assert_eq!(
            serde_json::to_value(&endpoint).unwrap(),
            json!({
                "name": "user3",
                "domainId": "domainId",
                "applicationId": "appId",
                "enabled": true,
                "credentials": {"password": "123"}
            })
        );
    }

    #[test]
    fn test_phone_type_parse() {
        assert_eq!(PhoneType::parse("local"), Some(PhoneType::Local));
        assert_eq!(PhoneType::parse("TollFree"), Some(PhoneType::TollFree));
        assert_eq!(PhoneType::parse("toll-free"), Some(PhoneType::TollFree));
        assert_eq!(PhoneType::parse("mobile"), None);
        assert_eq!(PhoneType::default().as_str(), "local");
    }

    #[test]
    fn test_phone_number_query_skips_empty_filters() {
        let query = PhoneNumberQuery {
            size: 1000,
            application_id: Some("app".to_string()),
            name: None,
        };
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({"size": 1000, "applicationId": "app"})
        );
    }
}
