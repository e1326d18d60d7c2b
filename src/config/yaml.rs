use serde::Deserialize;
use std::path::PathBuf;

/// Complete YAML configuration structure
///
/// All fields are optional to allow partial configuration; missing values are
/// taken from environment variables, then from defaults.
///
/// # Example YAML structure
/// ```yaml
/// server:
///   host: "0.0.0.0"
///   port: 3001
///
/// bandwidth:
///   user_id: "u-xxxxxxxx"
///   api_token: "t-xxxxxxxx"
///   api_secret: "your-api-secret"
///   api_url: "https://api.catapult.inetwork.com"
///   timeout_seconds: 30
///
/// provision:
///   app_name: "My App"
///   use_https: true
///   phone_number:
///     name: "main"
///     phone_type: "local"
///     area_code: "910"
///   sip:
///     enabled: true
///     domain: "mydomain"
///
/// cache:
///   path: "/var/cache/bandwidth-extra"
///   ttl_seconds: 2592000
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: Option<ServerYaml>,
    pub bandwidth: Option<BandwidthYaml>,
    pub provision: Option<ProvisionYaml>,
    pub cache: Option<CacheYaml>,
}

/// Server configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerYaml {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Bandwidth account configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct BandwidthYaml {
    pub user_id: Option<String>,
    pub api_token: Option<String>,
    pub api_secret: Option<String>,
    pub api_url: Option<String>,
    pub timeout_seconds: Option<u64>,
}

/// What to provision, from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ProvisionYaml {
    pub app_name: Option<String>,
    pub use_https: Option<bool>,
    pub phone_number: Option<PhoneNumberYaml>,
    pub sip: Option<SipYaml>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PhoneNumberYaml {
    pub name: Option<String>,
    /// "local" or "tollFree"
    pub phone_type: Option<String>,
    pub area_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SipYaml {
    pub enabled: Option<bool>,
    pub domain: Option<String>,
}

/// Cache configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct CacheYaml {
    pub path: Option<String>,
    pub ttl_seconds: Option<u64>,
}

impl YamlConfig {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    /// Returns an error if:
    /// - The file cannot be read
    /// - The YAML is malformed
    /// - Required fields have invalid types
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;

        let config: YamlConfig = serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse YAML config: {e}"))?;

        Ok(config)
    }
}
