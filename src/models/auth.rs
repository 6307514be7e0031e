//! Error taxonomy shared by the identity and data-access boundaries
//!
//! Remote collaborators report failures as plain messages. The only
//! classification this crate performs on them is phrase matching for the
//! authorization-denied class, which is the one class eligible for a retry
//! under the alternate authorization mode.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

// Known authorization-denied phrases, matched anywhere in a message
const DENIED_PHRASES: &str = r"(?i)not authorized|unauthorized|missing credentials";
static AUTHORIZATION_DENIED_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(DENIED_PHRASES).unwrap());

/// Whether a failure message belongs to the authorization-denied class
#[must_use]
pub fn is_authorization_denied(message: &str) -> bool {
    AUTHORIZATION_DENIED_PATTERN.is_match(message)
}

/// Failure raised by a remote call (the call itself did not resolve)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RemoteFailure {
    pub message: String,
}

impl RemoteFailure {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_authorization_denied(&self) -> bool {
        is_authorization_denied(&self.message)
    }
}

/// Errors surfaced to callers of the data-access layer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataAccessError {
    /// The call resolved with a non-empty error list; messages are joined
    #[error("{0}")]
    Rejected(String),
    /// The call failed outright and was not eligible for (or exhausted) fallback
    #[error(transparent)]
    Remote(#[from] RemoteFailure),
}

impl DataAccessError {
    /// Message shown to the user in a toast or banner
    #[must_use]
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

/// Failure reported by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct IdentityError {
    pub message: String,
}

impl IdentityError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_authorization_denied(&self) -> bool {
        is_authorization_denied(&self.message)
    }
}
