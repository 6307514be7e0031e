//! Data-access layer
//!
//! - [`fallback`] - the one retry policy: primary mode, then once under the secondary mode
//! - [`access`] - CRUD surface that routes every call through the fallback executor
//! - [`scope`] - resolution of the signed-in user's firm id
//! - [`team`] - team listings with normalized roles
//!
//! The managed data service itself is reached through the [`DataClient`]
//! trait, implemented outside this crate.

pub mod access;
pub mod fallback;
pub mod scope;
pub mod team;

use crate::models::auth::RemoteFailure;
use crate::models::{AuthMode, Filter, Record, RemoteResponse};
use async_trait::async_trait;

pub use access::DataAccess;
pub use fallback::AuthModeFallbackExecutor;
pub use scope::{ScopeError, ScopeResolver};
pub use team::{TeamDirectory, TeamMember};

/// Managed data service operations, each bound to an authorization mode
#[async_trait]
pub trait DataClient: Send + Sync {
    /// List records of `model` matching an equality filter
    ///
    /// # Errors
    ///
    /// Returns a failure if the call cannot be completed under `mode`
    async fn list(
        &self,
        model: &str,
        filter: &Filter,
        limit: usize,
        mode: AuthMode,
    ) -> Result<RemoteResponse<Vec<Record>>, RemoteFailure>;

    /// Create a record
    ///
    /// # Errors
    ///
    /// Returns a failure if the call cannot be completed under `mode`
    async fn create(
        &self,
        model: &str,
        input: &Record,
        mode: AuthMode,
    ) -> Result<RemoteResponse<Record>, RemoteFailure>;

    /// Update a record; `input` carries the `id` and the changed fields
    ///
    /// # Errors
    ///
    /// Returns a failure if the call cannot be completed under `mode`
    async fn update(
        &self,
        model: &str,
        input: &Record,
        mode: AuthMode,
    ) -> Result<RemoteResponse<Record>, RemoteFailure>;

    /// Delete a record by id
    ///
    /// # Errors
    ///
    /// Returns a failure if the call cannot be completed under `mode`
    async fn delete(
        &self,
        model: &str,
        id: &str,
        mode: AuthMode,
    ) -> Result<RemoteResponse<Record>, RemoteFailure>;
}
