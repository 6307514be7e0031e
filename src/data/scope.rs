//! Firm-id resolution
//!
//! Pages that need organizational scope ask for the signed-in user's firm id.
//! A previously resolved id is taken from the durable cache; otherwise the
//! user's record is looked up by email (through the fallback executor) and the
//! firm id found there is persisted for subsequent loads.

use crate::authentication::IdentityProvider;
use crate::data::DataAccess;
use crate::models::auth::{DataAccessError, IdentityError};
use crate::models::Filter;
use crate::settings::DataSettings;
use crate::storage::ScopeIdCache;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    #[error("Failed to read user attributes: {0}")]
    Identity(#[from] IdentityError),
    #[error(transparent)]
    Data(#[from] DataAccessError),
}

#[derive(Clone)]
pub struct ScopeResolver {
    data: DataAccess,
    identity: Arc<dyn IdentityProvider>,
    cache: ScopeIdCache,
    settings: DataSettings,
}

impl ScopeResolver {
    #[must_use]
    pub fn new(
        data: DataAccess,
        identity: Arc<dyn IdentityProvider>,
        cache: ScopeIdCache,
        settings: DataSettings,
    ) -> Self {
        Self {
            data,
            identity,
            cache,
            settings,
        }
    }

    /// Resolve the signed-in user's firm id
    ///
    /// # Returns
    /// * `Ok(Some(id))` from the cache, or from the user's record (then cached)
    /// * `Ok(None)` if the user has no email or no record carries a firm id
    ///
    /// # Errors
    ///
    /// Returns an error if the user attributes cannot be fetched or the
    /// lookup fails under both authorization modes
    pub async fn resolve_firm_id(&self) -> Result<Option<String>, ScopeError> {
        if let Some(cached) = self.cache.get() {
            log::debug!("Using cached firm id {cached}");
            return Ok(Some(cached));
        }

        let attributes = self.identity.fetch_user_attributes().await?;
        let Some(email) = attributes.email.filter(|e| !e.trim().is_empty()) else {
            log::warn!("Signed-in user has no email - cannot resolve firm id");
            return Ok(None);
        };

        let filter = Filter::eq(self.settings.email_field.as_str(), email.trim());
        let model = &self.settings.user_model;
        let record = self.data.find_one(model, &filter).await?;

        let firm_id = record
            .as_ref()
            .and_then(|r| r.get(&self.settings.firm_field))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(ToString::to_string);

        match &firm_id {
            Some(id) => {
                log::info!("Resolved firm id {id} for {email}");
                self.cache.set(id);
            }
            None => log::info!("No firm id found for {email}"),
        }

        Ok(firm_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::RemoteFailure;
    use crate::models::{AuthMode, Record, UserAttributes};
    use crate::storage::{MemoryStore, DEFAULT_FIRM_ID_KEY};
    use crate::testing::constants::TEST_EMAIL;
    use crate::testing::fixtures::{record, user_with_email};
    use crate::testing::mock::{MockDataClient, MockIdentityProvider};
    use serde_json::json;

    struct Fixture {
        client: Arc<MockDataClient>,
        identity: Arc<MockIdentityProvider>,
        store: Arc<MemoryStore>,
        resolver: ScopeResolver,
    }

    fn fixture() -> Fixture {
        let client = Arc::new(MockDataClient::new());
        let identity = Arc::new(MockIdentityProvider::new());
        identity.set_attributes(Ok(user_with_email(TEST_EMAIL)));
        let store = Arc::new(MemoryStore::new());
        let settings = DataSettings::default();
        let resolver = ScopeResolver::new(
            DataAccess::new(client.clone()),
            identity.clone(),
            ScopeIdCache::new(store.clone(), DEFAULT_FIRM_ID_KEY),
            settings,
        );
        Fixture {
            client,
            identity,
            store,
            resolver,
        }
    }

    impl Fixture {
        fn cache(&self) -> ScopeIdCache {
            ScopeIdCache::new(self.store.clone(), DEFAULT_FIRM_ID_KEY)
        }
    }

    fn dispatcher() -> Record {
        let user = json!({ "id": "u1", "email": TEST_EMAIL, "firmId": "firm-9" });
        record(user)
    }

    #[tokio::test]
    async fn test_cache_hit_skips_lookup() {
        let f = fixture();
        f.cache().set("firm-123");

        let resolved = f.resolver.resolve_firm_id().await.unwrap();
        assert_eq!(resolved.as_deref(), Some("firm-123"));
        assert!(f.client.calls().is_empty());
        assert_eq!(f.identity.attribute_calls(), 0);
    }

    #[tokio::test]
    async fn test_lookup_by_email_persists_result() {
        let f = fixture();
        f.client.seed("User", dispatcher());

        let resolved = f.resolver.resolve_firm_id().await.unwrap();
        assert_eq!(resolved.as_deref(), Some("firm-9"));
        assert_eq!(f.cache().get().as_deref(), Some("firm-9"));

        // Second resolution is served from the cache
        let resolved = f.resolver.resolve_firm_id().await.unwrap();
        assert_eq!(resolved.as_deref(), Some("firm-9"));
        assert_eq!(f.client.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_lookup_uses_fallback_mode() {
        let f = fixture();
        f.client.deny_mode(AuthMode::UserPool);
        f.client.seed("User", dispatcher());

        let resolved = f.resolver.resolve_firm_id().await.unwrap();
        assert_eq!(resolved.as_deref(), Some("firm-9"));
        assert_eq!(
            f.client.calls(),
            vec![
                ("list".to_string(), AuthMode::UserPool),
                ("list".to_string(), AuthMode::IdentityPool),
            ]
        );
    }

    #[tokio::test]
    async fn test_no_match_or_no_email_is_none() {
        let f = fixture();
        assert_eq!(f.resolver.resolve_firm_id().await.unwrap(), None);

        f.identity.set_attributes(Ok(UserAttributes::default()));
        assert_eq!(f.resolver.resolve_firm_id().await.unwrap(), None);
        assert!(f.store.is_empty());
    }

    #[tokio::test]
    async fn test_errors_propagate() {
        let f = fixture();
        f.client.fail_with("Network error");
        assert_eq!(
            f.resolver.resolve_firm_id().await.unwrap_err(),
            ScopeError::Data(DataAccessError::Remote(RemoteFailure::new("Network error")))
        );

        f.identity
            .set_attributes(Err(IdentityError::new("No current user")));
        assert!(matches!(
            f.resolver.resolve_firm_id().await.unwrap_err(),
            ScopeError::Identity(_)
        ));
    }
}
