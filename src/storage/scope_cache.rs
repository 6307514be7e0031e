use crate::storage::DurableStore;
use crate::utils::logging::LoggingHelper;
use std::sync::Arc;

/// Storage key of the resolved firm id
pub const DEFAULT_FIRM_ID_KEY: &str = "c2b:myFirmId";

/// Best-effort cache of the resolved firm id
///
/// Storage failures never reach the caller: a failed read is a miss and a
/// failed write is dropped. Entries do not expire.
#[derive(Clone)]
pub struct ScopeIdCache {
    store: Arc<dyn DurableStore>,
    key: String,
}

impl ScopeIdCache {
    #[must_use]
    pub fn new(store: Arc<dyn DurableStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn get(&self) -> Option<String> {
        match self.store.get_item(&self.key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                LoggingHelper::log_cache_read_failed(&self.key, &e);
                None
            }
        }
    }

    pub fn set(&self, id: &str) {
        if let Err(e) = self.store.set_item(&self.key, id) {
            LoggingHelper::log_cache_write_failed(&self.key, &e);
        }
    }
}
