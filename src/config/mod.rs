//! Configuration of the bandwidth-extra server
//!
//! The server configuration comes from environment variables and, optionally,
//! a YAML file. It is split into submodules:
//! - `yaml`: YAML configuration file loading
//! - `env`: Environment variable loading
//! - `merge`: Merging YAML and environment configurations
//! - `validation`: Configuration validation logic
//! - `utils`: Utility functions for configuration parsing
//!
//! # Example
//! ```rust,no_run
//! use bandwidth_extra::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from YAML file, falling back to environment variables
//! let config = ServerConfig::from_file(&PathBuf::from("config.yaml"))?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use std::time::Duration;

use crate::client::PhoneType;
use crate::core::cache::CacheConfig;
use crate::middleware::{Credentials, ProvisioningOptions, SipOptions};
use crate::provision::PhoneNumberOptions;

mod env;
mod merge;
mod utils;
mod validation;
mod yaml;

/// Default logical application name
pub const DEFAULT_APP_NAME: &str = "bandwidth-extra";

/// Server configuration
///
/// Contains everything needed to run the demo server:
/// - Server settings (host, port)
/// - Bandwidth account credentials and API endpoint
/// - What to provision (application name, phone number, SIP domain)
/// - Cache settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,

    // Bandwidth account
    pub bandwidth_user_id: String,
    pub bandwidth_api_token: String,
    pub bandwidth_api_secret: String,
    pub bandwidth_api_url: String,
    pub bandwidth_timeout_seconds: u64,

    // Provisioning
    pub app_name: String,
    pub use_https: bool,
    pub phone_number_name: Option<String>,
    pub phone_type: PhoneType,
    pub area_code: Option<String>,
    pub sip_enabled: bool,
    pub sip_domain: Option<String>,

    // Cache configuration (filesystem or memory)
    pub cache_path: Option<PathBuf>, // if None, use in-memory cache
    pub cache_ttl_seconds: Option<u64>,
}

impl ServerConfig {
    /// Load configuration from a YAML file with environment variable fallbacks
    ///
    /// Priority order (highest to lowest):
    /// 1. YAML file values
    /// 2. Environment variables
    /// 3. Default values
    ///
    /// # Errors
    /// Returns an error if:
    /// - The YAML file cannot be read or is malformed
    /// - Environment variables have invalid formats
    /// - Configuration validation fails
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        // The .env file is not loaded here: with an explicit config file only
        // real environment variables fill the gaps.
        let yaml_config = yaml::YamlConfig::from_file(path)?;
        let config = merge::merge_config(Some(yaml_config))?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Get the server address as "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(
            self.bandwidth_user_id.clone(),
            self.bandwidth_api_token.clone(),
            self.bandwidth_api_secret.clone(),
        )
    }

    /// Filesystem cache when `cache_path` is set, in-memory cache otherwise
    pub fn cache_config(&self) -> CacheConfig {
        match &self.cache_path {
            Some(path) => CacheConfig::Filesystem {
                path: path.clone(),
                ttl_seconds: self.cache_ttl_seconds,
            },
            None => CacheConfig::Memory {
                max_entries: 10_000,
                ttl_seconds: self.cache_ttl_seconds,
            },
        }
    }

    /// Phone number to provision, when a name or an area code is configured
    pub fn phone_number_options(&self) -> Option<PhoneNumberOptions> {
        if self.phone_number_name.is_none() && self.area_code.is_none() {
            return None;
        }
        let mut options =
            PhoneNumberOptions::new(self.phone_number_name.clone().unwrap_or_default());
        if let Some(area_code) = &self.area_code {
            options = options.with_criterion("areaCode", area_code.clone());
        }
        Some(options)
    }

    /// Middleware options without callbacks; the server registers its own.
    pub fn provisioning_options(&self) -> ProvisioningOptions {
        let mut options = ProvisioningOptions::new(self.app_name.clone(), self.credentials())
            .with_api_url(self.bandwidth_api_url.clone())
            .with_api_timeout(Duration::from_secs(self.bandwidth_timeout_seconds))
            .with_use_https(self.use_https)
            .with_cache(self.cache_config());

        if let Some(phone_number) = self.phone_number_options() {
            options = options.with_phone_number(phone_number, self.phone_type);
        }
        if self.sip_enabled || self.sip_domain.is_some() {
            options = options.with_sip(SipOptions {
                domain: self.sip_domain.clone(),
            });
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use std::fs;
    use tempfile::TempDir;

    fn test_config() -> ServerConfig {
        ServerConfig {
            host: "localhost".to_string(),
            port: 3001,
            bandwidth_user_id: "u-test".to_string(),
            bandwidth_api_token: "t-test".to_string(),
            bandwidth_api_secret: "secret".to_string(),
            bandwidth_api_url: "https://api.catapult.inetwork.com".to_string(),
            bandwidth_timeout_seconds: 30,
            app_name: "test-app".to_string(),
            use_https: true,
            phone_number_name: None,
            phone_type: PhoneType::Local,
            area_code: None,
            sip_enabled: false,
            sip_domain: None,
            cache_path: None,
            cache_ttl_seconds: None,
        }
    }

    fn cleanup_env_vars() {
        unsafe {
            for key in [
                "HOST",
                "PORT",
                "BANDWIDTH_USER_ID",
                "BANDWIDTH_API_TOKEN",
                "BANDWIDTH_API_SECRET",
                "BANDWIDTH_APP_NAME",
                "BANDWIDTH_AREA_CODE",
                "BANDWIDTH_SIP_DOMAIN",
            ] {
                env::remove_var(key);
            }
        }
    }

    #[test]
    fn test_provisioning_options_minimal() {
        let options = test_config().provisioning_options();
        assert_eq!(options.name, "test-app");
        assert_eq!(options.auth.user_id, "u-test");
        assert!(options.phone_number.is_none());
        assert!(options.sip.is_none());
        assert!(matches!(options.cache, CacheConfig::Memory { .. }));
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_provisioning_options_full() {
        let mut config = test_config();
        config.area_code = Some("910".to_string());
        config.phone_type = PhoneType::TollFree;
        config.sip_domain = Some("domain1".to_string());
        config.cache_path = Some(PathBuf::from("/tmp/bw-cache"));
        config.cache_ttl_seconds = Some(60);

        let options = config.provisioning_options();
        let phone_number = options.phone_number.unwrap();
        assert_eq!(phone_number.name, "");
        assert_eq!(
            phone_number.criteria.get("areaCode").map(String::as_str),
            Some("910")
        );
        assert_eq!(options.phone_type, PhoneType::TollFree);
        assert_eq!(options.sip, Some(SipOptions::with_domain("domain1")));
        assert_eq!(
            options.cache,
            CacheConfig::Filesystem {
                path: PathBuf::from("/tmp/bw-cache"),
                ttl_seconds: Some(60)
            }
        );
    }

    #[test]
    fn test_sip_enabled_without_domain() {
        let mut config = test_config();
        config.sip_enabled = true;
        assert_eq!(
            config.provisioning_options().sip,
            Some(SipOptions { domain: None })
        );
    }

    #[test]
    #[serial]
    fn test_from_file_with_env_fallback() {
        cleanup_env_vars();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        fs::write(
            &config_path,
            r#"
server:
  port: 4000
bandwidth:
  user_id: "u-yaml"
  api_token: "t-yaml"
  api_secret: "s-yaml"
provision:
  app_name: "yaml-app"
"#,
        )
        .unwrap();

        unsafe {
            env::set_var("HOST", "127.0.0.1");
            env::set_var("BANDWIDTH_USER_ID", "u-env");
        }

        let config = ServerConfig::from_file(&config_path).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 4000);
        assert_eq!(config.bandwidth_user_id, "u-yaml");
        assert_eq!(config.app_name, "yaml-app");

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_file_rejects_missing_credentials() {
        cleanup_env_vars();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        fs::write(&config_path, "server:\n  port: 4000\n").unwrap();

        let result = ServerConfig::from_file(&config_path);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("BANDWIDTH_USER_ID"));
    }
}
