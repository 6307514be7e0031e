//! Shared test support for the session and data-access layers
//!
//! - [`fixtures`] - Pre-built sessions, records and a fixed clock
//! - [`mock`] - In-memory identity provider, data client, navigator and store
//!
//! Available to unit tests and, through the `testing` feature, to the
//! integration tests under `tests/`.
//!
//! ```rust,ignore
//! use c2b_session::testing::fixtures::{checker_at, session_expiring_at, TEST_NOW};
//!
//! let checker = checker_at(TEST_NOW);
//! assert!(checker.is_valid(Some(&session_expiring_at(TEST_NOW + 3600))));
//! ```

pub mod fixtures;
pub mod mock;

/// Common test constants
pub mod constants {
    /// Email of the signed-in test user
    pub const TEST_EMAIL: &str = "dispatch@acme-haulage.com";

    /// Firm the test user belongs to
    pub const TEST_FIRM_ID: &str = "firm-acme";

    /// Message the data service uses when a mode is not permitted
    pub const NOT_AUTHORIZED: &str = "Not Authorized to access this resource";
}
