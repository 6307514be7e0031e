// Centralized logging for the recurring session and data-access events
use crate::models::auth::IdentityError;
use crate::models::AuthMode;
use crate::storage::StoreError;
use log::{debug, info, warn};

pub struct LoggingHelper;

impl LoggingHelper {
    /// Log a primary-mode call being retried under the secondary mode
    pub fn log_fallback_triggered(message: &str) {
        info!(
            "🔁 {} call denied ({message}); retrying once with {}",
            AuthMode::UserPool,
            AuthMode::IdentityPool
        );
    }

    /// Log a call that failed outright and will not be retried
    pub fn log_remote_failure(mode: AuthMode, message: &str) {
        warn!("❌ Remote call failed under {mode}: {message}");
    }

    /// Log a call that resolved with an error list
    pub fn log_rejected(mode: AuthMode, joined: &str) {
        warn!("⚠️  Remote call under {mode} returned errors: {joined}");
    }

    /// Log the start of a session check
    pub fn log_session_check(monitor_id: u64) {
        debug!("[monitor {monitor_id}] Checking session");
    }

    /// Log a session that passed the validity check
    pub fn log_session_valid(monitor_id: u64, seconds_remaining: Option<i64>) {
        match seconds_remaining {
            Some(seconds) => debug!("[monitor {monitor_id}] Session valid for {seconds}s"),
            None => debug!("[monitor {monitor_id}] Session valid"),
        }
    }

    /// Log a session that failed the validity check
    pub fn log_session_invalidated(monitor_id: u64, reason: Option<&str>) {
        match reason {
            Some(reason) => info!("🔒 [monitor {monitor_id}] Session invalidated: {reason}"),
            None => info!("🔒 [monitor {monitor_id}] Session invalidated"),
        }
    }

    /// Log a sign-out that failed during invalidation (never surfaced)
    pub fn log_sign_out_failed(error: &IdentityError) {
        warn!("Sign-out during invalidation failed (ignored): {error}");
    }

    /// Log a redirect being signaled to the UI
    pub fn log_redirect(path: &str) {
        info!("↪️  Redirecting to {path}");
    }

    /// Log a check whose owner was torn down before it completed
    pub fn log_discarded_after_teardown(monitor_id: u64) {
        debug!("[monitor {monitor_id}] Owner torn down - discarding check result");
    }

    /// Log a failed durable-cache read (treated as a miss)
    pub fn log_cache_read_failed(key: &str, error: &StoreError) {
        warn!("Cache read for '{key}' failed, treating as miss: {error}");
    }

    /// Log a failed durable-cache write (dropped)
    pub fn log_cache_write_failed(key: &str, error: &StoreError) {
        warn!("Cache write for '{key}' failed, ignoring: {error}");
    }

    /// Log the service container being assembled
    pub fn log_container_built(store_kind: &str, check_interval_ms: u64) {
        info!("🏭 Services configured (store: {store_kind}, check every {check_interval_ms}ms)");
    }
}
