use crate::client::PhoneType;

/// Parse a boolean value from a string, supporting multiple formats
///
/// Accepts: "true", "false", "1", "0", "yes", "no" (case insensitive)
pub fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Parse a phone number type ("local" or "tollFree", case insensitive)
pub fn parse_phone_type(s: &str) -> Result<PhoneType, String> {
    PhoneType::parse(s).ok_or_else(|| {
        format!("Invalid phone type '{s}', expected one of: local, tollFree")
    })
}
