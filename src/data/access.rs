//! CRUD surface over the injected data client
//!
//! Every operation here goes through [`AuthModeFallbackExecutor`], so callers
//! never choose an authorization mode themselves.

use crate::data::{AuthModeFallbackExecutor, DataClient};
use crate::models::auth::DataAccessError;
use crate::models::{Filter, Record};
use std::sync::Arc;

#[derive(Clone)]
pub struct DataAccess {
    client: Arc<dyn DataClient>,
    executor: AuthModeFallbackExecutor,
}

impl DataAccess {
    #[must_use]
    pub fn new(client: Arc<dyn DataClient>) -> Self {
        Self {
            client,
            executor: AuthModeFallbackExecutor::new(),
        }
    }

    /// List records of `model` matching `filter`, at most `limit` of them
    ///
    /// # Errors
    ///
    /// Returns an error if the call is rejected or fails under both modes
    pub async fn list(
        &self,
        model: &str,
        filter: &Filter,
        limit: usize,
    ) -> Result<Vec<Record>, DataAccessError> {
        log::debug!(
            "Listing {model} where {} = {} (limit {limit})",
            filter.field,
            filter.eq
        );
        let items = self
            .executor
            .run(|mode| self.client.list(model, filter, limit, mode))
            .await?;
        Ok(items.unwrap_or_default())
    }

    /// First record of `model` matching `filter`
    ///
    /// # Errors
    ///
    /// Returns an error if the call is rejected or fails under both modes
    pub async fn find_one(
        &self,
        model: &str,
        filter: &Filter,
    ) -> Result<Option<Record>, DataAccessError> {
        Ok(self.list(model, filter, 1).await?.into_iter().next())
    }

    /// Create a record and return it as stored
    ///
    /// # Errors
    ///
    /// Returns an error if the call is rejected or fails under both modes
    pub async fn create(
        &self,
        model: &str,
        input: &Record,
    ) -> Result<Option<Record>, DataAccessError> {
        self.executor
            .run(|mode| self.client.create(model, input, mode))
            .await
    }

    /// Update a record and return it as stored
    ///
    /// # Errors
    ///
    /// Returns an error if the call is rejected or fails under both modes
    pub async fn update(
        &self,
        model: &str,
        input: &Record,
    ) -> Result<Option<Record>, DataAccessError> {
        self.executor
            .run(|mode| self.client.update(model, input, mode))
            .await
    }

    /// Delete a record and return what was removed
    ///
    /// # Errors
    ///
    /// Returns an error if the call is rejected or fails under both modes
    pub async fn delete(&self, model: &str, id: &str) -> Result<Option<Record>, DataAccessError> {
        self.executor
            .run(|mode| self.client.delete(model, id, mode))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::RemoteFailure;
    use crate::models::AuthMode;
    use crate::testing::fixtures::record;
    use crate::testing::mock::MockDataClient;
    use serde_json::json;

    fn access_with(client: &Arc<MockDataClient>) -> DataAccess {
        DataAccess::new(client.clone())
    }

    #[tokio::test]
    async fn test_list_filters_and_limits() {
        let client = Arc::new(MockDataClient::new());
        client.seed("Load", record(json!({ "id": "l1", "firmId": "f1" })));
        client.seed("Load", record(json!({ "id": "l2", "firmId": "f1" })));
        client.seed("Load", record(json!({ "id": "l3", "firmId": "f2" })));

        let access = access_with(&client);
        let filter = Filter::eq("firmId", "f1");
        let all = access.list("Load", &filter, 10).await.unwrap();
        assert_eq!(all.len(), 2);

        let limited = access.list("Load", &filter, 1).await.unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(
            client.calls(),
            vec![
                ("list".to_string(), AuthMode::UserPool),
                ("list".to_string(), AuthMode::UserPool),
            ]
        );
    }

    #[tokio::test]
    async fn test_every_operation_falls_back_when_user_pool_denied() {
        let client = Arc::new(MockDataClient::new());
        client.deny_mode(AuthMode::UserPool);
        let access = access_with(&client);

        let created = access
            .create("Truck", &record(json!({ "id": "t1", "plate": "AB-123" })))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(created["plate"], "AB-123");

        let updated = access
            .update("Truck", &record(json!({ "id": "t1", "plate": "CD-456" })))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated["plate"], "CD-456");

        let by_id = Filter::eq("id", "t1");
        let found = access.find_one("Truck", &by_id).await.unwrap();
        assert!(found.is_some());

        let deleted = access.delete("Truck", "t1").await.unwrap().unwrap();
        assert_eq!(deleted["id"], "t1");

        let modes: Vec<AuthMode> = client.calls().into_iter().map(|(_, mode)| mode).collect();
        assert_eq!(
            modes,
            [AuthMode::UserPool, AuthMode::IdentityPool].repeat(4)
        );
    }

    #[tokio::test]
    async fn test_transport_failure_is_not_retried() {
        let client = Arc::new(MockDataClient::new());
        client.fail_with("Network error");
        let access = access_with(&client);

        let err = access.delete("Truck", "t1").await.unwrap_err();
        assert_eq!(
            err,
            DataAccessError::Remote(RemoteFailure::new("Network error"))
        );
        assert_eq!(client.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_error_list_surfaces_joined_message() {
        let client = Arc::new(MockDataClient::new());
        client.reject_with(&["plate is required", "capacity must be positive"]);
        let access = access_with(&client);

        let input = record(json!({}));
        let err = access.create("Truck", &input).await.unwrap_err();
        assert_eq!(
            err.user_message(),
            "plate is required, capacity must be positive"
        );
        assert_eq!(client.calls().len(), 1);
    }
}
