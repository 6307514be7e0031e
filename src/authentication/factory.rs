//! Service container wiring
//!
//! The identity provider, data client and navigator are constructed once at
//! application start and injected here. Every component that needs one of
//! them receives the same shared instance from the container instead of
//! creating its own.

use crate::authentication::{IdentityProvider, Navigator};
use crate::data::{DataAccess, DataClient, ScopeResolver, TeamDirectory};
use crate::session::{
    Clock, GuestGuard, MonitorConfig, SessionMonitor, SessionValidityChecker, SystemClock,
};
use crate::settings::C2bSettings;
use crate::storage::{DurableStore, FileStore, MemoryStore, ScopeIdCache};
use crate::utils::logging::LoggingHelper;
use anyhow::{anyhow, Result};
use std::sync::Arc;

/// Builder for [`ServiceContainer`]
#[derive(Default)]
pub struct ServiceContainerBuilder {
    settings: C2bSettings,
    identity: Option<Arc<dyn IdentityProvider>>,
    data_client: Option<Arc<dyn DataClient>>,
    navigator: Option<Arc<dyn Navigator>>,
    store: Option<Arc<dyn DurableStore>>,
    clock: Option<Arc<dyn Clock>>,
}

impl ServiceContainerBuilder {
    #[must_use]
    pub fn new(settings: C2bSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_identity_provider(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = Some(identity);
        self
    }

    #[must_use]
    pub fn with_data_client(mut self, client: Arc<dyn DataClient>) -> Self {
        self.data_client = Some(client);
        self
    }

    #[must_use]
    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Use a custom durable store instead of the one chosen from settings
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn DurableStore>) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Assemble the container
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The identity provider, data client or navigator was not supplied
    /// - The settings fail validation
    pub fn build(self) -> Result<ServiceContainer> {
        self.settings.validate()?;

        let identity = self
            .identity
            .ok_or_else(|| anyhow!("No identity provider configured"))?;
        let data_client = self
            .data_client
            .ok_or_else(|| anyhow!("No data client configured"))?;
        let navigator = self
            .navigator
            .ok_or_else(|| anyhow!("No navigator configured"))?;

        let (store, store_kind) = match self.store {
            Some(store) => (store, "custom"),
            None => Self::default_store(self.settings.cache.store_path.as_deref()),
        };
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        let check_interval_ms = self.settings.session.check_interval_ms;
        LoggingHelper::log_container_built(store_kind, check_interval_ms);

        Ok(ServiceContainer {
            scope_cache: ScopeIdCache::new(store, self.settings.cache.firm_id_key.clone()),
            checker: SessionValidityChecker::new(self.settings.session.buffer_seconds, clock),
            data: DataAccess::new(data_client),
            identity,
            navigator,
            settings: self.settings,
        })
    }

    // File-backed when a path is configured, otherwise process memory
    fn default_store(path: Option<&str>) -> (Arc<dyn DurableStore>, &'static str) {
        match path {
            Some(path) => {
                let store: Arc<dyn DurableStore> = Arc::new(FileStore::new(path));
                (store, "file")
            }
            None => {
                let store: Arc<dyn DurableStore> = Arc::new(MemoryStore::new());
                (store, "memory")
            }
        }
    }
}

/// Application-wide services, built once at start
#[derive(Clone)]
pub struct ServiceContainer {
    settings: C2bSettings,
    identity: Arc<dyn IdentityProvider>,
    navigator: Arc<dyn Navigator>,
    data: DataAccess,
    scope_cache: ScopeIdCache,
    checker: SessionValidityChecker,
}

impl ServiceContainer {
    #[must_use]
    pub fn builder(settings: C2bSettings) -> ServiceContainerBuilder {
        ServiceContainerBuilder::new(settings)
    }

    #[must_use]
    pub fn settings(&self) -> &C2bSettings {
        &self.settings
    }

    #[must_use]
    pub fn identity(&self) -> &Arc<dyn IdentityProvider> {
        &self.identity
    }

    #[must_use]
    pub fn data(&self) -> &DataAccess {
        &self.data
    }

    #[must_use]
    pub fn scope_cache(&self) -> &ScopeIdCache {
        &self.scope_cache
    }

    #[must_use]
    pub fn checker(&self) -> &SessionValidityChecker {
        &self.checker
    }

    /// A fresh monitor for one route guard
    #[must_use]
    pub fn session_monitor(&self, requires_auth: bool) -> SessionMonitor {
        SessionMonitor::new(
            self.identity.clone(),
            self.checker.clone(),
            self.navigator.clone(),
            MonitorConfig::from_settings(&self.settings, requires_auth),
        )
    }

    #[must_use]
    pub fn guest_guard(&self) -> GuestGuard {
        GuestGuard::new(
            self.identity.clone(),
            self.checker.clone(),
            self.navigator.clone(),
            self.settings.routes.landing_path.clone(),
        )
    }

    #[must_use]
    pub fn scope_resolver(&self) -> ScopeResolver {
        ScopeResolver::new(
            self.data.clone(),
            self.identity.clone(),
            self.scope_cache.clone(),
            self.settings.data.clone(),
        )
    }

    #[must_use]
    pub fn team_directory(&self) -> TeamDirectory {
        TeamDirectory::new(self.data.clone(), self.settings.data.clone())
    }
}
