use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag telling async continuations whether their owner still exists
///
/// Clones observe the same flag. Once killed it never comes back to life.
#[derive(Debug, Clone)]
pub struct Liveness {
    alive: Arc<AtomicBool>,
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

impl Liveness {
    #[must_use]
    pub fn new() -> Self {
        Self {
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    pub fn kill(&self) {
        self.alive.store(false, Ordering::Release);
    }
}
