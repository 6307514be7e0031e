//! Test fixtures providing pre-built test objects

use crate::models::{AuthSession, Record, TokenBundle, UserAttributes};
use crate::session::{Clock, SessionValidityChecker, DEFAULT_BUFFER_SECONDS};
use serde_json::{json, Value};
use std::sync::Arc;

/// Wall-clock instant all fixture sessions are measured against
pub const TEST_NOW: i64 = 1_750_000_000;

/// Clock pinned to one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: i64,
}

impl FixedClock {
    #[must_use]
    pub fn new(now: i64) -> Self {
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now_seconds(&self) -> i64 {
        self.now
    }
}

/// Checker with the default buffer whose clock reads `now`
#[must_use]
pub fn checker_at(now: i64) -> SessionValidityChecker {
    SessionValidityChecker::new(DEFAULT_BUFFER_SECONDS, Arc::new(FixedClock::new(now)))
}

/// Unsigned access token whose `exp` claim is `expires_at`
///
/// # Panics
///
/// Panics if the claims cannot be encoded
#[must_use]
pub fn token_expiring_at(expires_at: i64) -> String {
    crate::utils::jwt::encode_unsigned(&json!({
        "sub": "user-1",
        "token_use": "access",
        "exp": expires_at
    }))
    .unwrap()
}

/// Session whose access token expires at `expires_at`
#[must_use]
pub fn session_expiring_at(expires_at: i64) -> AuthSession {
    AuthSession::with_tokens(TokenBundle::new(token_expiring_at(expires_at)))
}

/// Convert a `json!` object literal into a record
///
/// # Panics
///
/// Panics if `value` is not a JSON object
#[must_use]
pub fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("record fixture must be a JSON object, got {other}"),
    }
}

#[must_use]
pub fn user_with_email(email: &str) -> UserAttributes {
    UserAttributes {
        given_name: Some("Test".to_string()),
        family_name: Some("User".to_string()),
        email: Some(email.to_string()),
    }
}

/// Let spawned tasks run until they block on something other than the scheduler
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
