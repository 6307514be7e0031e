//! Session monitor
//!
//! Each route guard owns one monitor. A monitor walks the state machine
//!
//! ```text
//! Initializing -> Checking -> Valid -> (interval) -> Checking -> ...
//!                          \-> Invalid
//! ```
//!
//! and publishes every transition on a `watch` channel for the UI layer.
//! Checks are strictly sequential. `Invalid` is terminal: the session is
//! signed out (best-effort) and, on routes that require authentication, a
//! redirect to the login page is signaled once.
//!
//! Teardown is cooperative. Stopping the handle clears the liveness flag and
//! cancels the interval timer; a fetch already in flight is allowed to finish
//! but its result is discarded without touching state.

use crate::authentication::{IdentityProvider, Navigator};
use crate::models::{AuthSession, SignOutScope};
use crate::session::liveness::Liveness;
use crate::session::validation::SessionValidityChecker;
use crate::settings::C2bSettings;
use crate::utils::logging::LoggingHelper;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;

static NEXT_MONITOR_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Initializing,
    Checking,
    Valid,
    Invalid,
}

/// What the UI sees of a monitor at one point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorSnapshot {
    pub state: MonitorState,
    /// Last session that passed the check; cleared on invalidation
    pub session: Option<AuthSession>,
    /// Last session-fetch error; cleared by a successful check
    pub error: Option<String>,
}

impl MonitorSnapshot {
    fn initializing() -> Self {
        Self {
            state: MonitorState::Initializing,
            session: None,
            error: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub check_interval: Duration,
    /// Whether the owning route redirects to login on invalidation
    pub requires_auth: bool,
    pub login_path: String,
}

impl MonitorConfig {
    #[must_use]
    pub fn from_settings(settings: &C2bSettings, requires_auth: bool) -> Self {
        Self {
            check_interval: settings.session.check_interval(),
            requires_auth,
            login_path: settings.routes.login_path.clone(),
        }
    }
}

enum CheckOutcome {
    Valid(AuthSession),
    Invalid { error: Option<String> },
}

pub struct SessionMonitor {
    id: u64,
    identity: Arc<dyn IdentityProvider>,
    checker: SessionValidityChecker,
    navigator: Arc<dyn Navigator>,
    config: MonitorConfig,
}

impl SessionMonitor {
    #[must_use]
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        checker: SessionValidityChecker,
        navigator: Arc<dyn Navigator>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            id: NEXT_MONITOR_ID.fetch_add(1, Ordering::Relaxed),
            identity,
            checker,
            navigator,
            config,
        }
    }

    /// Mount the monitor: run the first check now and keep re-checking
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime
    #[must_use]
    pub fn start(self) -> MonitorHandle {
        let id = self.id;
        let liveness = Liveness::new();
        let shutdown = Arc::new(Notify::new());
        let (tx, rx) = watch::channel(MonitorSnapshot::initializing());

        let task = tokio::spawn(self.run(tx, liveness.clone(), shutdown.clone()));

        MonitorHandle {
            id,
            snapshots: rx,
            liveness,
            shutdown,
            task: Some(task),
        }
    }

    async fn run(
        self,
        tx: watch::Sender<MonitorSnapshot>,
        liveness: Liveness,
        shutdown: Arc<Notify>,
    ) {
        loop {
            if !liveness.is_alive() {
                return;
            }
            tx.send_modify(|s| s.state = MonitorState::Checking);
            LoggingHelper::log_session_check(self.id);

            let outcome = self.check().await;
            if !liveness.is_alive() {
                LoggingHelper::log_discarded_after_teardown(self.id);
                return;
            }

            match outcome {
                CheckOutcome::Valid(session) => {
                    LoggingHelper::log_session_valid(
                        self.id,
                        self.checker.seconds_remaining(&session),
                    );
                    tx.send_modify(|s| {
                        s.state = MonitorState::Valid;
                        s.session = Some(session);
                        s.error = None;
                    });

                    tokio::select! {
                        () = tokio::time::sleep(self.config.check_interval) => {}
                        () = shutdown.notified() => return,
                    }
                }
                CheckOutcome::Invalid { error } => {
                    LoggingHelper::log_session_invalidated(self.id, error.as_deref());
                    self.terminate_session().await;
                    if !liveness.is_alive() {
                        LoggingHelper::log_discarded_after_teardown(self.id);
                        return;
                    }

                    tx.send_modify(|s| {
                        s.state = MonitorState::Invalid;
                        s.session = None;
                        s.error = error;
                    });

                    if self.config.requires_auth {
                        LoggingHelper::log_redirect(&self.config.login_path);
                        self.navigator.redirect(&self.config.login_path);
                    }
                    return;
                }
            }
        }
    }

    async fn check(&self) -> CheckOutcome {
        match self.identity.fetch_session().await {
            Ok(session) if self.checker.is_valid(Some(&session)) => CheckOutcome::Valid(session),
            Ok(_) => CheckOutcome::Invalid { error: None },
            Err(e) => CheckOutcome::Invalid {
                error: Some(e.message),
            },
        }
    }

    // Best-effort: the session is being abandoned either way
    async fn terminate_session(&self) {
        if let Err(e) = self.identity.sign_out(SignOutScope::Local).await {
            LoggingHelper::log_sign_out_failed(&e);
        }
    }
}

/// Owner's side of a running monitor; dropping it tears the monitor down
pub struct MonitorHandle {
    id: u64,
    snapshots: watch::Receiver<MonitorSnapshot>,
    liveness: Liveness,
    shutdown: Arc<Notify>,
    task: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn snapshot(&self) -> MonitorSnapshot {
        self.snapshots.borrow().clone()
    }

    #[must_use]
    pub fn state(&self) -> MonitorState {
        self.snapshots.borrow().state
    }

    /// Receiver that observes every published transition
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<MonitorSnapshot> {
        self.snapshots.clone()
    }

    /// Whether the monitor loop is still running and not torn down
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.liveness.is_alive() && self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Tear the monitor down; idempotent
    pub fn stop(&self) {
        if self.liveness.is_alive() {
            self.liveness.kill();
            // notify_one stores a permit if the loop is not parked on the timer yet
            self.shutdown.notify_one();
        }
    }

    /// Wait for the monitor loop to exit (after invalidation or `stop`)
    pub async fn finished(mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                log::warn!("[monitor {}] Monitor task ended abnormally: {e}", self.id);
            }
        }
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
