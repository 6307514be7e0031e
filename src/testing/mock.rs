//! Mock objects and fake implementations for testing
//!
//! This module provides in-memory stand-ins for the identity provider, the
//! managed data service, the router and durable storage. Each mock records
//! the calls it receives so tests can assert on them.

use crate::authentication::{IdentityProvider, Navigator};
use crate::data::DataClient;
use crate::models::auth::{IdentityError, RemoteFailure};
use crate::models::{
    AuthMode, AuthSession, Filter, Record, RemoteError, RemoteResponse, SignOutScope,
    UserAttributes,
};
use crate::storage::{DurableStore, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

use super::constants::NOT_AUTHORIZED;

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct IdentityState {
    session: Result<AuthSession, IdentityError>,
    attributes: Result<UserAttributes, IdentityError>,
    sign_out_error: Option<String>,
    gate: Option<Arc<Notify>>,
    fetch_calls: usize,
    attribute_calls: usize,
    sign_out_calls: Vec<SignOutScope>,
}

/// Identity provider returning whatever the test configured
pub struct MockIdentityProvider {
    state: Mutex<IdentityState>,
}

impl Default for MockIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockIdentityProvider {
    /// Provider with an empty (signed-out) session
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(IdentityState {
                session: Ok(AuthSession::default()),
                attributes: Ok(UserAttributes::default()),
                sign_out_error: None,
                gate: None,
                fetch_calls: 0,
                attribute_calls: 0,
                sign_out_calls: Vec::new(),
            }),
        }
    }

    #[must_use]
    pub fn with_session(session: AuthSession) -> Self {
        let provider = Self::new();
        provider.set_session(Ok(session));
        provider
    }

    pub fn set_session(&self, session: Result<AuthSession, IdentityError>) {
        locked(&self.state).session = session;
    }

    pub fn set_attributes(&self, attributes: Result<UserAttributes, IdentityError>) {
        locked(&self.state).attributes = attributes;
    }

    pub fn fail_sign_out(&self, message: &str) {
        locked(&self.state).sign_out_error = Some(message.to_string());
    }

    /// Hold every session fetch until the returned `Notify` is signaled
    ///
    /// Each signal releases one fetch.
    #[must_use]
    pub fn gate_fetches(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        locked(&self.state).gate = Some(gate.clone());
        gate
    }

    #[must_use]
    pub fn fetch_calls(&self) -> usize {
        locked(&self.state).fetch_calls
    }

    #[must_use]
    pub fn attribute_calls(&self) -> usize {
        locked(&self.state).attribute_calls
    }

    #[must_use]
    pub fn sign_out_calls(&self) -> Vec<SignOutScope> {
        locked(&self.state).sign_out_calls.clone()
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn fetch_session(&self) -> Result<AuthSession, IdentityError> {
        let gate = {
            let mut state = locked(&self.state);
            state.fetch_calls += 1;
            state.gate.clone()
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }
        locked(&self.state).session.clone()
    }

    async fn sign_out(&self, scope: SignOutScope) -> Result<(), IdentityError> {
        let mut state = locked(&self.state);
        state.sign_out_calls.push(scope);
        match &state.sign_out_error {
            Some(message) => Err(IdentityError::new(message.clone())),
            None => Ok(()),
        }
    }

    async fn fetch_user_attributes(&self) -> Result<UserAttributes, IdentityError> {
        let mut state = locked(&self.state);
        state.attribute_calls += 1;
        state.attributes.clone()
    }
}

#[derive(Default)]
struct DataState {
    records: HashMap<String, Vec<Record>>,
    denied: Vec<AuthMode>,
    failure: Option<String>,
    rejection: Option<Vec<String>>,
    calls: Vec<(String, AuthMode)>,
}

/// In-memory data service keyed by model name
#[derive(Default)]
pub struct MockDataClient {
    state: Mutex<DataState>,
}

impl MockDataClient {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, model: &str, record: Record) {
        locked(&self.state)
            .records
            .entry(model.to_string())
            .or_default()
            .push(record);
    }

    /// Fail every call made under `mode` with an authorization-denied message
    pub fn deny_mode(&self, mode: AuthMode) {
        locked(&self.state).denied.push(mode);
    }

    /// Fail every call outright with `message`
    pub fn fail_with(&self, message: &str) {
        locked(&self.state).failure = Some(message.to_string());
    }

    /// Resolve every call with an error list
    pub fn reject_with(&self, messages: &[&str]) {
        locked(&self.state).rejection = Some(messages.iter().map(ToString::to_string).collect());
    }

    /// Operation name and mode of every call, in order
    #[must_use]
    pub fn calls(&self) -> Vec<(String, AuthMode)> {
        locked(&self.state).calls.clone()
    }

    // Shared preamble: record the call, then apply configured failures
    fn begin<T>(
        state: &mut DataState,
        operation: &str,
        model: &str,
        mode: AuthMode,
    ) -> Result<Option<RemoteResponse<T>>, RemoteFailure> {
        state.calls.push((operation.to_string(), mode));

        if let Some(message) = &state.failure {
            return Err(RemoteFailure::new(message.clone()));
        }
        if state.denied.contains(&mode) {
            return Err(RemoteFailure::new(format!(
                "{NOT_AUTHORIZED}: {operation} {model} ({mode})"
            )));
        }
        if let Some(messages) = &state.rejection {
            return Ok(Some(RemoteResponse::with_errors(
                messages.iter().map(RemoteError::new).collect(),
            )));
        }
        Ok(None)
    }

    fn same_id(record: &Record, id: Option<&serde_json::Value>) -> bool {
        id.is_some() && record.get("id") == id
    }
}

#[async_trait]
impl DataClient for MockDataClient {
    async fn list(
        &self,
        model: &str,
        filter: &Filter,
        limit: usize,
        mode: AuthMode,
    ) -> Result<RemoteResponse<Vec<Record>>, RemoteFailure> {
        let mut state = locked(&self.state);
        if let Some(response) = Self::begin(&mut state, "list", model, mode)? {
            return Ok(response);
        }

        let matching = state
            .records
            .get(model)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| filter.matches(r))
                    .take(limit)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(RemoteResponse::ok(matching))
    }

    async fn create(
        &self,
        model: &str,
        input: &Record,
        mode: AuthMode,
    ) -> Result<RemoteResponse<Record>, RemoteFailure> {
        let mut state = locked(&self.state);
        if let Some(response) = Self::begin(&mut state, "create", model, mode)? {
            return Ok(response);
        }

        state
            .records
            .entry(model.to_string())
            .or_default()
            .push(input.clone());
        Ok(RemoteResponse::ok(input.clone()))
    }

    async fn update(
        &self,
        model: &str,
        input: &Record,
        mode: AuthMode,
    ) -> Result<RemoteResponse<Record>, RemoteFailure> {
        let mut state = locked(&self.state);
        if let Some(response) = Self::begin(&mut state, "update", model, mode)? {
            return Ok(response);
        }

        let id = input.get("id");
        let existing = state
            .records
            .get_mut(model)
            .and_then(|records| records.iter_mut().find(|r| Self::same_id(r, id)));

        Ok(match existing {
            Some(record) => {
                for (field, value) in input {
                    record.insert(field.clone(), value.clone());
                }
                RemoteResponse::ok(record.clone())
            }
            None => RemoteResponse::empty(),
        })
    }

    async fn delete(
        &self,
        model: &str,
        id: &str,
        mode: AuthMode,
    ) -> Result<RemoteResponse<Record>, RemoteFailure> {
        let mut state = locked(&self.state);
        if let Some(response) = Self::begin(&mut state, "delete", model, mode)? {
            return Ok(response);
        }

        let id = serde_json::Value::from(id);
        let removed = state.records.get_mut(model).and_then(|records| {
            let index = records.iter().position(|r| Self::same_id(r, Some(&id)))?;
            Some(records.remove(index))
        });

        let response = removed.map_or_else(RemoteResponse::empty, RemoteResponse::ok);
        Ok(response)
    }
}

/// Navigator that remembers every redirect it was asked to perform
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    redirects: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn redirects(&self) -> Vec<String> {
        locked(&self.redirects).clone()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, path: &str) {
        locked(&self.redirects).push(path.to_string());
    }
}

/// Store whose every operation fails, like storage disabled by the browser
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingStore;

impl DurableStore for FailingStore {
    fn get_item(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable("storage disabled".to_string()))
    }

    fn set_item(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("storage disabled".to_string()))
    }
}
