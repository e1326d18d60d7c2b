//! Application resolver.
//!
//! An application is registered once per (logical name, host) pair under the
//! name `"<name> on <host>"`, so several deployments can share one account.

use tracing::{debug, info};

use crate::client::{Application, BandwidthApi, NewApplication};
use crate::errors::ProvisionResult;

/// Path receiving message callbacks.
pub const MESSAGE_CALLBACK_PATH: &str = "/bandwidth/callback/message";

/// Path receiving call callbacks.
pub const CALL_CALLBACK_PATH: &str = "/bandwidth/callback/call";

const LIST_PAGE_SIZE: u32 = 1000;

/// Options for creating an application. Unset fields take the defaults
/// derived from the host (see [`get_or_create_application`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationOptions {
    pub name: String,
    pub incoming_message_url: Option<String>,
    pub incoming_call_url: Option<String>,
    pub auto_answer: Option<bool>,
    pub callback_http_method: Option<String>,
}

impl ApplicationOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Application to resolve: a bare logical name, or full creation options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplicationSpec {
    Name(String),
    Options(ApplicationOptions),
}

impl ApplicationSpec {
    fn into_options(self) -> ApplicationOptions {
        match self {
            ApplicationSpec::Name(name) => ApplicationOptions::new(name),
            ApplicationSpec::Options(options) => options,
        }
    }
}

impl From<&str> for ApplicationSpec {
    fn from(name: &str) -> Self {
        ApplicationSpec::Name(name.to_string())
    }
}

impl From<String> for ApplicationSpec {
    fn from(name: String) -> Self {
        ApplicationSpec::Name(name)
    }
}

impl From<ApplicationOptions> for ApplicationSpec {
    fn from(options: ApplicationOptions) -> Self {
        ApplicationSpec::Options(options)
    }
}

/// Registered name of the application for `name` served from `host`.
pub fn application_name(name: &str, host: &str) -> String {
    format!("{name} on {host}")
}

/// Lists up to 1000 applications, in API order.
pub async fn list_applications(api: &dyn BandwidthApi) -> ProvisionResult<Vec<Application>> {
    Ok(api.list_applications(LIST_PAGE_SIZE).await?)
}

/// Returns the first application named exactly `name`.
pub async fn get_application(
    api: &dyn BandwidthApi,
    name: &str,
) -> ProvisionResult<Option<Application>> {
    Ok(list_applications(api)
        .await?
        .into_iter()
        .find(|app| app.name == name))
}

/// Builds the create payload: host-derived defaults, overridden by `options`.
pub fn new_application(options: ApplicationOptions, host: &str, use_https: bool) -> NewApplication {
    let scheme = if use_https { "https" } else { "http" };
    let base_url = format!("{scheme}://{host}");

    NewApplication {
        name: application_name(&options.name, host),
        incoming_message_url: options
            .incoming_message_url
            .unwrap_or_else(|| format!("{base_url}{MESSAGE_CALLBACK_PATH}")),
        incoming_call_url: options
            .incoming_call_url
            .unwrap_or_else(|| format!("{base_url}{CALL_CALLBACK_PATH}")),
        auto_answer: options.auto_answer.unwrap_or(true),
        callback_http_method: options
            .callback_http_method
            .unwrap_or_else(|| "POST".to_string()),
    }
}

/// Returns the id of the application for (`spec`, `host`), creating it when
/// no application with the composed name exists.
///
/// # Example
/// ```rust,no_run
/// use bandwidth_extra::client::InMemoryBandwidthApi;
/// use bandwidth_extra::provision::application::get_or_create_application;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let api = InMemoryBandwidthApi::new();
/// let application_id = get_or_create_application(&api, "Your App", "your.domain.org", true).await?;
/// # Ok(())
/// # }
/// ```
pub async fn get_or_create_application(
    api: &dyn BandwidthApi,
    spec: impl Into<ApplicationSpec>,
    host: &str,
    use_https: bool,
) -> ProvisionResult<String> {
    debug!(host = %host, "Getting Bandwidth application id");
    let application = new_application(spec.into().into_options(), host, use_https);

    if let Some(existing) = get_application(api, &application.name).await? {
        debug!(application_id = %existing.id, name = %application.name, "Found existing application");
        return Ok(existing.id);
    }

    info!(name = %application.name, "Creating new application on Bandwidth");
    Ok(api.create_application(&application).await?)
}
