use url::Url;

use super::ServerConfig;

/// Run every validation on a merged configuration
pub fn validate(config: &ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    validate_credentials(
        &config.bandwidth_user_id,
        &config.bandwidth_api_token,
        &config.bandwidth_api_secret,
    )?;
    validate_api_url(&config.bandwidth_api_url)?;
    validate_area_code(&config.area_code)?;
    Ok(())
}

/// Validate that all three Bandwidth credentials are present
pub fn validate_credentials(
    user_id: &str,
    api_token: &str,
    api_secret: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let missing: Vec<&str> = [
        ("BANDWIDTH_USER_ID", user_id),
        ("BANDWIDTH_API_TOKEN", api_token),
        ("BANDWIDTH_API_SECRET", api_secret),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(name, _)| name)
    .collect();

    if !missing.is_empty() {
        return Err(format!("Missing Bandwidth credentials: {}", missing.join(", ")).into());
    }

    Ok(())
}

/// Validate that the API URL is an absolute http(s) URL
pub fn validate_api_url(api_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let url =
        Url::parse(api_url).map_err(|e| format!("Invalid BANDWIDTH_API_URL '{api_url}': {e}"))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!(
            "BANDWIDTH_API_URL must use http or https, got '{}'",
            url.scheme()
        )
        .into());
    }

    Ok(())
}

/// Validate that an area code, when set, is three digits
pub fn validate_area_code(area_code: &Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(code) = area_code
        && (code.len() != 3 || !code.chars().all(|c| c.is_ascii_digit()))
    {
        return Err(format!("BANDWIDTH_AREA_CODE must be three digits, got '{code}'").into());
    }

    Ok(())
}
