//! Guard for guest-only pages (login, sign-up)
//!
//! Runs a single session check on mount and sends an already signed-in user
//! to the landing page. It shares the validity checker with
//! [`SessionMonitor`](crate::session::SessionMonitor) but no state.

use crate::authentication::{IdentityProvider, Navigator};
use crate::session::liveness::Liveness;
use crate::session::validation::SessionValidityChecker;
use crate::utils::logging::LoggingHelper;
use std::sync::Arc;

#[derive(Clone)]
pub struct GuestGuard {
    identity: Arc<dyn IdentityProvider>,
    checker: SessionValidityChecker,
    navigator: Arc<dyn Navigator>,
    landing_path: String,
}

impl GuestGuard {
    #[must_use]
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        checker: SessionValidityChecker,
        navigator: Arc<dyn Navigator>,
        landing_path: impl Into<String>,
    ) -> Self {
        Self {
            identity,
            checker,
            navigator,
            landing_path: landing_path.into(),
        }
    }

    /// Redirect to the landing page if a valid session exists
    ///
    /// Returns whether a redirect was signaled. Nothing happens if `liveness`
    /// was killed while the session was being fetched.
    pub async fn redirect_if_signed_in(&self, liveness: &Liveness) -> bool {
        let session = match self.identity.fetch_session().await {
            Ok(session) => Some(session),
            Err(e) => {
                log::debug!("No session on guest page: {e}");
                None
            }
        };

        if !liveness.is_alive() {
            log::debug!("Guest page torn down before session check completed");
            return false;
        }

        if self.checker.is_valid(session.as_ref()) {
            LoggingHelper::log_redirect(&self.landing_path);
            self.navigator.redirect(&self.landing_path);
            true
        } else {
            false
        }
    }
}
