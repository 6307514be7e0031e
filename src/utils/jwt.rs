// JWT claim helpers; signatures are the identity provider's concern, not ours
use anyhow::{anyhow, Result};
use base64::{engine::general_purpose, Engine as _};
use serde_json::{json, Value};

/// Decode the payload segment of a compact JWT into its claims
///
/// # Errors
///
/// Returns an error if the token does not have three segments, or the payload
/// is not base64url-encoded JSON
pub fn decode_claims(token: &str) -> Result<Value> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(anyhow!("Token has {} segments, expected 3", parts.len()));
    }

    let payload = general_purpose::URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .map_err(|e| anyhow!("Token payload is not base64url: {e}"))?;
    let claims: Value = serde_json::from_slice(&payload)?;
    if !claims.is_object() {
        return Err(anyhow!("Token payload is not a JSON object"));
    }
    Ok(claims)
}

/// Read the `exp` claim (seconds since epoch), if present
///
/// # Errors
///
/// Returns an error if the claims cannot be decoded
pub fn read_expiry(token: &str) -> Result<Option<i64>> {
    let claims = decode_claims(token)?;
    Ok(claims.get("exp").and_then(Value::as_i64))
}

/// Build an unsigned (`alg: none`) token carrying the given claims
///
/// # Errors
///
/// Returns an error if the claims cannot be serialized
pub fn encode_unsigned(claims: &Value) -> Result<String> {
    let header = json!({
        "alg": "none",
        "typ": "JWT"
    });

    let header_b64 = general_purpose::URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?);
    let payload_b64 = general_purpose::URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims)?);

    Ok(format!("{header_b64}.{payload_b64}."))
}
