//! Authentication collaborators and service wiring
//!
//! This module provides the identity-provider and navigation boundary traits,
//! and the factory that builds the process-wide service container from
//! settings and injected clients.

pub mod factory;
pub mod traits;

pub use factory::{ServiceContainer, ServiceContainerBuilder};
pub use traits::{IdentityProvider, Navigator};
