//! Session Management Module
//!
//! Client-side session handling: deciding whether the identity provider's
//! cached session is still usable and acting on the answer.
//!
//! # Modules
//!
//! - [`validation`] - Expiry check with a safety buffer
//! - [`monitor`] - Recurring re-validation state machine for guarded routes
//! - [`guard`] - One-shot redirect for guest-only pages
//! - [`liveness`] - Teardown flag guarding async continuations

pub mod guard;
pub mod liveness;
pub mod monitor;
pub mod validation;

// Re-export commonly used items for convenience
pub use guard::GuestGuard;
pub use liveness::Liveness;
pub use monitor::{MonitorConfig, MonitorHandle, MonitorSnapshot, MonitorState, SessionMonitor};
pub use validation::{Clock, SessionValidityChecker, SystemClock, DEFAULT_BUFFER_SECONDS};
