//! Boundary traits for the external collaborators
//!
//! The managed identity provider and the UI router are never implemented in
//! this crate. Components receive them as `Arc<dyn ...>` so that one instance,
//! constructed at application start, is shared by everything that needs it.

use crate::models::auth::IdentityError;
use crate::models::{AuthSession, SignOutScope, UserAttributes};
use async_trait::async_trait;

/// Managed identity provider operations consumed by this layer
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Fetch the current session, refreshing tokens if the provider can
    ///
    /// # Errors
    ///
    /// Returns an error if there is no signed-in user or the provider is
    /// unreachable
    async fn fetch_session(&self) -> Result<AuthSession, IdentityError>;

    /// Terminate the session locally or globally
    ///
    /// # Errors
    ///
    /// Returns an error if the provider rejects the sign-out
    async fn sign_out(&self, scope: SignOutScope) -> Result<(), IdentityError>;

    /// Fetch the signed-in user's profile attributes
    ///
    /// # Errors
    ///
    /// Returns an error if there is no signed-in user or the provider is
    /// unreachable
    async fn fetch_user_attributes(&self) -> Result<UserAttributes, IdentityError>;
}

/// Client-side router used to signal redirects
pub trait Navigator: Send + Sync {
    /// Navigate to an application path
    fn redirect(&self, path: &str);
}
