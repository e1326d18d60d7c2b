use std::fmt;
use std::time::Duration;

use crate::client::{DEFAULT_API_URL, PhoneType};
use crate::core::cache::CacheConfig;
use crate::errors::{ProvisionError, ProvisionResult};
use crate::provision::PhoneNumberOptions;
use crate::webhook::CallbackHandler;

/// Default per-request timeout of the Bandwidth client.
pub const DEFAULT_API_TIMEOUT: Duration = Duration::from_secs(30);

/// Default limit on callback bodies read by the middleware, in bytes.
pub const DEFAULT_MAX_CALLBACK_BODY: usize = 1024 * 1024;

/// Bandwidth account credentials.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub user_id: String,
    pub api_token: String,
    pub api_secret: String,
}

impl Credentials {
    pub fn new(
        user_id: impl Into<String>,
        api_token: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            api_token: api_token.into(),
            api_secret: api_secret.into(),
        }
    }

    /// Fails when any of the three values is empty.
    pub fn validate(&self) -> ProvisionResult<()> {
        let missing: Vec<&str> = [
            ("userId", &self.user_id),
            ("apiToken", &self.api_token),
            ("apiSecret", &self.api_secret),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ProvisionError::Configuration(format!(
                "missing Bandwidth credentials: {}",
                missing.join(", ")
            )))
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user_id", &self.user_id)
            .field("api_token", &"[redacted]")
            .field("api_secret", &"[redacted]")
            .finish()
    }
}

/// SIP provisioning. Without a domain name a random one is created once per
/// provisioner and reused through the cache.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SipOptions {
    pub domain: Option<String>,
}

impl SipOptions {
    pub fn with_domain(domain: impl Into<String>) -> Self {
        Self {
            domain: Some(domain.into()),
        }
    }
}

/// Configuration of one middleware instance.
#[derive(Debug, Clone)]
pub struct ProvisioningOptions {
    /// Logical application name, combined with the request host.
    pub name: String,
    pub auth: Credentials,
    pub api_url: String,
    pub api_timeout: Duration,
    /// Scheme of the callback URLs registered on the application.
    pub use_https: bool,
    /// Phone number to reserve for the application, if any.
    pub phone_number: Option<PhoneNumberOptions>,
    pub phone_type: PhoneType,
    pub sip: Option<SipOptions>,
    pub message_callback: Option<CallbackHandler>,
    pub call_callback: Option<CallbackHandler>,
    pub cache: CacheConfig,
    /// Larger callback bodies are rejected with 413.
    pub max_callback_body: usize,
}

impl ProvisioningOptions {
    pub fn new(name: impl Into<String>, auth: Credentials) -> Self {
        Self {
            name: name.into(),
            auth,
            api_url: DEFAULT_API_URL.to_string(),
            api_timeout: DEFAULT_API_TIMEOUT,
            use_https: true,
            phone_number: None,
            phone_type: PhoneType::default(),
            sip: None,
            message_callback: None,
            call_callback: None,
            cache: CacheConfig::default(),
            max_callback_body: DEFAULT_MAX_CALLBACK_BODY,
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_api_timeout(mut self, timeout: Duration) -> Self {
        self.api_timeout = timeout;
        self
    }

    pub fn with_use_https(mut self, use_https: bool) -> Self {
        self.use_https = use_https;
        self
    }

    pub fn with_phone_number(mut self, options: PhoneNumberOptions, phone_type: PhoneType) -> Self {
        self.phone_number = Some(options);
        self.phone_type = phone_type;
        self
    }

    pub fn with_sip(mut self, sip: SipOptions) -> Self {
        self.sip = Some(sip);
        self
    }

    pub fn with_message_callback(mut self, handler: CallbackHandler) -> Self {
        self.message_callback = Some(handler);
        self
    }

    pub fn with_call_callback(mut self, handler: CallbackHandler) -> Self {
        self.call_callback = Some(handler);
        self
    }

    pub fn with_max_callback_body(mut self, limit: usize) -> Self {
        self.max_callback_body = limit;
        self
    }

    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// Fails when the application name or a credential is missing.
    pub fn validate(&self) -> ProvisionResult<()> {
        if self.name.trim().is_empty() {
            return Err(ProvisionError::Configuration(
                "application name is required".to_string(),
            ));
        }
        self.auth.validate()
    }
}
