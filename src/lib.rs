#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

/// Version of the session layer
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod authentication;
pub mod data;
pub mod models;
pub mod roles;
pub mod session;
pub mod settings;
pub mod storage;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Re-export commonly used items
pub use authentication::{IdentityProvider, Navigator, ServiceContainer};
pub use data::{AuthModeFallbackExecutor, DataAccess, DataClient, ScopeResolver};
pub use models::auth::DataAccessError;
pub use models::AuthSession;
pub use roles::{normalize, CanonicalRole};
pub use session::{MonitorHandle, MonitorState, SessionMonitor, SessionValidityChecker};
pub use settings::C2bSettings;
pub use storage::ScopeIdCache;
