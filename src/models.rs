use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

pub mod auth;

/// Untyped row shape returned by the managed data service
pub type Record = Map<String, Value>;

/// Credential path a data-access call is made under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AuthMode {
    /// End-user credentials issued by the user pool
    UserPool,
    /// Anonymous / role-based credentials issued by the identity pool
    IdentityPool,
}

impl AuthMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AuthMode::UserPool => "userPool",
            AuthMode::IdentityPool => "identityPool",
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tokens handed out by the identity provider at login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBundle {
    /// Raw JWT; its `exp` claim drives session validity
    pub access_token: String,
    pub id_token: Option<String>,
}

impl TokenBundle {
    #[must_use]
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            id_token: None,
        }
    }

    /// Expiry of the access token in seconds since the epoch
    ///
    /// # Errors
    ///
    /// Returns an error if the access token is not a decodable JWT
    pub fn expires_at(&self) -> anyhow::Result<Option<i64>> {
        crate::utils::jwt::read_expiry(&self.access_token)
    }
}

/// Cached authentication session as reported by the identity provider
///
/// This layer only ever reads sessions; refresh is the provider's job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub tokens: Option<TokenBundle>,
}

impl AuthSession {
    #[must_use]
    pub fn with_tokens(tokens: TokenBundle) -> Self {
        Self {
            tokens: Some(tokens),
        }
    }
}

/// Which sessions a sign-out terminates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOutScope {
    /// Forget the session on this client only
    Local,
    /// Revoke the session's tokens with the provider
    Global,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAttributes {
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub email: Option<String>,
}

impl UserAttributes {
    /// "Given Family", falling back to whichever part exists
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.given_name.as_deref(), self.family_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

/// One entry of the error list a data call may resolve with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteError {
    pub message: String,
}

impl RemoteError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// `{data, errors}` envelope every data call resolves with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<RemoteError>,
}

impl<T> RemoteResponse<T> {
    #[must_use]
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            errors: Vec::new(),
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self {
            data: None,
            errors: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_errors(errors: Vec<RemoteError>) -> Self {
        Self { data: None, errors }
    }

    /// Error messages joined with ", ", or `None` when the list is empty
    #[must_use]
    pub fn joined_errors(&self) -> Option<String> {
        if self.errors.is_empty() {
            return None;
        }
        Some(
            self.errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        )
    }
}

/// Equality filter used by list calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub eq: Value,
}

impl Filter {
    #[must_use]
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            eq: value.into(),
        }
    }

    /// Whether a record satisfies this filter
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        record.get(&self.field) == Some(&self.eq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_joined_errors() {
        let response: RemoteResponse<()> = RemoteResponse::with_errors(vec![
            RemoteError::new("first"),
            RemoteError::new("second"),
        ]);
        assert_eq!(response.joined_errors().as_deref(), Some("first, second"));
        assert_eq!(RemoteResponse::ok(1).joined_errors(), None);
    }

    #[test]
    fn test_response_deserializes_without_errors_field() {
        let body = json!({ "data": { "id": "1" } });
        let response: RemoteResponse<Value> = serde_json::from_value(body).unwrap();
        assert!(response.errors.is_empty());
        assert_eq!(response.data, Some(json!({ "id": "1" })));
    }

    #[test]
    fn test_filter_matches() {
        let record = json!({ "email": "a@b.com", "firmId": "f1" });
        let record = record.as_object().unwrap();
        assert!(Filter::eq("email", "a@b.com").matches(record));
        assert!(!Filter::eq("email", "x@b.com").matches(record));
        assert!(!Filter::eq("missing", "a@b.com").matches(record));
    }

    #[test]
    fn test_display_name() {
        let attrs = UserAttributes {
            given_name: Some("Ada".to_string()),
            family_name: Some("Lovelace".to_string()),
            email: None,
        };
        assert_eq!(attrs.display_name().as_deref(), Some("Ada Lovelace"));

        let only_family = UserAttributes {
            family_name: Some("Hopper".to_string()),
            ..Default::default()
        };
        assert_eq!(only_family.display_name().as_deref(), Some("Hopper"));
        assert_eq!(UserAttributes::default().display_name(), None);
    }

    #[test]
    fn test_auth_mode_serializes_camel_case() {
        assert_eq!(
            serde_json::to_string(&AuthMode::IdentityPool).unwrap(),
            "\"identityPool\""
        );
        assert_eq!(AuthMode::UserPool.to_string(), "userPool");
    }
}
