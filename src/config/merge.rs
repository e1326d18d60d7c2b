use std::env;
use std::path::PathBuf;

use super::utils::{parse_bool, parse_phone_type};
use super::yaml::YamlConfig;
use super::{DEFAULT_APP_NAME, ServerConfig};
use crate::client::{DEFAULT_API_URL, PhoneType};

/// Merge YAML configuration with environment variables
///
/// Priority order (highest to lowest):
/// 1. YAML configuration values
/// 2. Environment variables
/// 3. Default values
///
/// # Arguments
/// * `yaml_config` - Optional YAML configuration to use as overrides
pub fn merge_config(
    yaml_config: Option<YamlConfig>,
) -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let yaml = yaml_config.unwrap_or_default();
    let bandwidth = yaml.bandwidth.unwrap_or_default();
    let provision = yaml.provision.unwrap_or_default();
    let phone_number = provision.phone_number.clone().unwrap_or_default();
    let sip = provision.sip.clone().unwrap_or_default();

    // Helper macro to get value with priority: YAML > ENV > Default
    macro_rules! get_value {
        ($env_var:expr, $yaml_value:expr, $default:expr) => {
            $yaml_value
                .or_else(|| env::var($env_var).ok())
                .unwrap_or_else(|| $default.to_string())
        };
    }

    // Helper macro for optional values: YAML > ENV
    macro_rules! get_optional {
        ($env_var:expr, $yaml_value:expr) => {
            $yaml_value.or_else(|| env::var($env_var).ok())
        };
    }

    // Server configuration
    let host = get_value!(
        "HOST",
        yaml.server.as_ref().and_then(|s| s.host.clone()),
        "0.0.0.0"
    );

    let port = if let Some(yaml_port) = yaml.server.as_ref().and_then(|s| s.port) {
        yaml_port
    } else if let Ok(port_str) = env::var("PORT") {
        port_str
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT environment variable: {e}"))?
    } else {
        3001
    };

    // Bandwidth account
    let bandwidth_user_id = get_value!("BANDWIDTH_USER_ID", bandwidth.user_id, "");
    let bandwidth_api_token = get_value!("BANDWIDTH_API_TOKEN", bandwidth.api_token, "");
    let bandwidth_api_secret = get_value!("BANDWIDTH_API_SECRET", bandwidth.api_secret, "");
    let bandwidth_api_url = get_value!("BANDWIDTH_API_URL", bandwidth.api_url, DEFAULT_API_URL);

    let bandwidth_timeout_seconds = if let Some(timeout) = bandwidth.timeout_seconds {
        timeout
    } else if let Ok(timeout_str) = env::var("BANDWIDTH_TIMEOUT_SECONDS") {
        timeout_str
            .parse::<u64>()
            .map_err(|e| format!("Invalid BANDWIDTH_TIMEOUT_SECONDS environment variable: {e}"))?
    } else {
        30
    };

    // Provisioning
    let app_name = get_value!("BANDWIDTH_APP_NAME", provision.app_name, DEFAULT_APP_NAME);

    let use_https = provision
        .use_https
        .or_else(|| {
            env::var("BANDWIDTH_USE_HTTPS")
                .ok()
                .and_then(|s| parse_bool(&s))
        })
        .unwrap_or(true);

    let phone_number_name = get_optional!("BANDWIDTH_PHONE_NUMBER_NAME", phone_number.name);
    let area_code = get_optional!("BANDWIDTH_AREA_CODE", phone_number.area_code);

    let phone_type = match get_optional!("BANDWIDTH_PHONE_TYPE", phone_number.phone_type) {
        Some(value) => parse_phone_type(&value)?,
        None => PhoneType::default(),
    };

    let sip_domain = get_optional!("BANDWIDTH_SIP_DOMAIN", sip.domain);
    let sip_enabled = sip
        .enabled
        .or_else(|| {
            env::var("BANDWIDTH_SIP_ENABLED")
                .ok()
                .and_then(|s| parse_bool(&s))
        })
        // A `sip:` section without `enabled` turns SIP on
        .unwrap_or(provision.sip.is_some());

    // Cache configuration
    let cache_path = yaml
        .cache
        .as_ref()
        .and_then(|c| c.path.clone())
        .or_else(|| env::var("CACHE_PATH").ok())
        .map(PathBuf::from);

    let cache_ttl_seconds = yaml
        .cache
        .as_ref()
        .and_then(|c| c.ttl_seconds)
        .or_else(|| {
            env::var("CACHE_TTL_SECONDS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
        })
        .or(Some(30 * 24 * 60 * 60)); // Default to 30 days

    Ok(ServerConfig {
        host,
        port,
        bandwidth_user_id,
        bandwidth_api_token,
        bandwidth_api_secret,
        bandwidth_api_url,
        bandwidth_timeout_seconds,
        app_name,
        use_https,
        phone_number_name,
        phone_type,
        area_code,
        sip_enabled,
        sip_domain,
        cache_path,
        cache_ttl_seconds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::yaml::{BandwidthYaml, PhoneNumberYaml, ProvisionYaml, ServerYaml, SipYaml};
    use serial_test::serial;

    const ENV_KEYS: &[&str] = &[
        "HOST",
        "PORT",
        "BANDWIDTH_USER_ID",
        "BANDWIDTH_API_TOKEN",
        "BANDWIDTH_API_SECRET",
        "BANDWIDTH_API_URL",
        "BANDWIDTH_TIMEOUT_SECONDS",
        "BANDWIDTH_APP_NAME",
        "BANDWIDTH_USE_HTTPS",
        "BANDWIDTH_PHONE_NUMBER_NAME",
        "BANDWIDTH_PHONE_TYPE",
        "BANDWIDTH_AREA_CODE",
        "BANDWIDTH_SIP_ENABLED",
        "BANDWIDTH_SIP_DOMAIN",
        "CACHE_PATH",
        "CACHE_TTL_SECONDS",
    ];

    fn cleanup_env_vars() {
        unsafe {
            for key in ENV_KEYS {
                env::remove_var(key);
            }
        }
    }

    #[test]
    #[serial]
    fn test_merge_defaults() {
        cleanup_env_vars();

        let config = merge_config(None).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3001);
        assert_eq!(config.bandwidth_api_url, DEFAULT_API_URL);
        assert_eq!(config.bandwidth_timeout_seconds, 30);
        assert_eq!(config.app_name, DEFAULT_APP_NAME);
        assert!(config.use_https);
        assert_eq!(config.phone_type, PhoneType::Local);
        assert!(!config.sip_enabled);
        assert!(config.cache_path.is_none());
        assert_eq!(config.cache_ttl_seconds, Some(30 * 24 * 60 * 60));
    }

    #[test]
    #[serial]
    fn test_merge_yaml_takes_priority() {
        cleanup_env_vars();
        unsafe {
            env::set_var("PORT", "5000");
            env::set_var("BANDWIDTH_APP_NAME", "env-app");
            env::set_var("BANDWIDTH_AREA_CODE", "704");
            env::set_var("BANDWIDTH_API_TOKEN", "t-env");
        }

        let yaml = YamlConfig {
            server: Some(ServerYaml {
                host: None,
                port: Some(4000),
            }),
            bandwidth: Some(BandwidthYaml {
                api_token: Some("t-yaml".to_string()),
                ..Default::default()
            }),
            provision: Some(ProvisionYaml {
                app_name: Some("yaml-app".to_string()),
                phone_number: Some(PhoneNumberYaml {
                    phone_type: Some("tollFree".to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            cache: None,
        };

        let config = merge_config(Some(yaml)).unwrap();
        assert_eq!(config.port, 4000);
        assert_eq!(config.app_name, "yaml-app");
        assert_eq!(config.bandwidth_api_token, "t-yaml");
        assert_eq!(config.area_code, Some("704".to_string()));
        assert_eq!(config.phone_type, PhoneType::TollFree);

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_merge_sip_section_enables_sip() {
        cleanup_env_vars();

        let yaml = YamlConfig {
            provision: Some(ProvisionYaml {
                sip: Some(SipYaml::default()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let config = merge_config(Some(yaml)).unwrap();
        assert!(config.sip_enabled);
        assert!(config.sip_domain.is_none());

        unsafe {
            env::set_var("BANDWIDTH_SIP_ENABLED", "yes");
        }
        let config = merge_config(None).unwrap();
        assert!(config.sip_enabled);

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_merge_invalid_values() {
        cleanup_env_vars();

        unsafe {
            env::set_var("PORT", "not-a-port");
        }
        let result = merge_config(None);
        assert!(result.unwrap_err().to_string().contains("Invalid PORT"));
        cleanup_env_vars();

        unsafe {
            env::set_var("BANDWIDTH_PHONE_TYPE", "mobile");
        }
        let result = merge_config(None);
        assert!(result.unwrap_err().to_string().contains("mobile"));
        cleanup_env_vars();
    }
}
