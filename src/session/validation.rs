//! Session validity checks
//!
//! A cached session is usable only while its access token stays valid for
//! longer than a safety buffer. Every check fails closed.

use crate::models::AuthSession;
use chrono::Utc;
use std::sync::Arc;

/// Default safety buffer before token expiry, in seconds
pub const DEFAULT_BUFFER_SECONDS: i64 = 300;

/// Source of the current time in seconds since the epoch
pub trait Clock: Send + Sync {
    fn now_seconds(&self) -> i64;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_seconds(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// Decides whether a cached session can still be used
#[derive(Clone)]
pub struct SessionValidityChecker {
    buffer_seconds: i64,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for SessionValidityChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionValidityChecker")
            .field("buffer_seconds", &self.buffer_seconds)
            .finish_non_exhaustive()
    }
}

impl Default for SessionValidityChecker {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_SECONDS, Arc::new(SystemClock))
    }
}

impl SessionValidityChecker {
    #[must_use]
    pub fn new(buffer_seconds: i64, clock: Arc<dyn Clock>) -> Self {
        Self {
            buffer_seconds,
            clock,
        }
    }

    #[must_use]
    pub fn buffer_seconds(&self) -> i64 {
        self.buffer_seconds
    }

    /// Check a session against the expiry buffer
    ///
    /// # Returns
    /// * `true` if the access token expires more than `buffer_seconds` from now
    /// * `false` if the session, its tokens or the `exp` claim are missing,
    ///   if the token cannot be decoded, or if expiry is within the buffer
    #[must_use]
    pub fn is_valid(&self, session: Option<&AuthSession>) -> bool {
        let Some(tokens) = session.and_then(|s| s.tokens.as_ref()) else {
            log::debug!("No session tokens present - session invalid");
            return false;
        };

        let expires_at = match tokens.expires_at() {
            Ok(Some(expires_at)) => expires_at,
            Ok(None) => {
                log::debug!("Access token has no exp claim - session invalid");
                return false;
            }
            Err(e) => {
                log::warn!("Failed to inspect access token: {e}");
                return false;
            }
        };

        let now = self.clock.now_seconds();
        let remaining = expires_at.saturating_sub(now);
        if remaining > self.buffer_seconds {
            true
        } else {
            log::debug!(
                "Session expires in {remaining}s, within the {}s buffer",
                self.buffer_seconds
            );
            false
        }
    }

    /// Seconds until the session's access token expires, if known
    #[must_use]
    pub fn seconds_remaining(&self, session: &AuthSession) -> Option<i64> {
        let expires_at = session.tokens.as_ref()?.expires_at().ok()??;
        Some(expires_at.saturating_sub(self.clock.now_seconds()))
    }
}
