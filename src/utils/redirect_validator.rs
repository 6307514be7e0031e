use once_cell::sync::Lazy;
use regex::Regex;

// Redirect targets are application routes only; anything that could leave
// the application or walk out of it is refused up front.

static PATH_TRAVERSAL_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.\.").unwrap());

const SCHEME_OR_NETWORK_PATH: &str = r"(?i)^(?:[a-z][a-z0-9+.-]*:)|^/{2,}";
const CONTROL_OR_ESCAPED: &str = r"(?i)[\x00-\x1F\x7F]|\\|%(?:00|0a|0d|09|5c)";

static PROTOCOL_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(SCHEME_OR_NETWORK_PATH).unwrap());

static SUSPICIOUS_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(CONTROL_OR_ESCAPED).unwrap());

/// Validate that `path` is a local application route such as `/login`
///
/// # Errors
///
/// Returns a description of the problem when the path is empty, absolute,
/// protocol-relative, or contains traversal or control sequences
pub fn validate_app_path(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Err("path is empty".to_string());
    }
    if PROTOCOL_PATTERN.is_match(path) {
        return Err(format!("'{path}' is not a local path"));
    }
    if !path.starts_with('/') {
        return Err(format!("'{path}' must start with '/'"));
    }
    if PATH_TRAVERSAL_PATTERN.is_match(path) {
        return Err(format!("'{path}' contains path traversal"));
    }
    if SUSPICIOUS_PATTERN.is_match(path) {
        return Err(format!("'{path}' contains control characters"));
    }
    Ok(())
}
