pub mod models;
pub mod queries;

use std::sync::Mutex;

use tracing::{info, warn};

pub use queries::StoreState;

/// Process-wide collections behind one coarse lock.
///
/// Every read and write, including timer-driven ones, goes through
/// [`Store::with_state`] or [`Store::with_state_mut`], so a fired timer and a
/// concurrent request on the same channel are serialized.
pub struct Store {
    state: Mutex<StoreState>,
}

impl Store {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState::default()),
        }
    }

    pub fn with_state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&StoreState) -> T,
    {
        let state = self.state.lock().unwrap_or_else(|poisoned| {
            warn!("Store lock poisoned, recovering");
            poisoned.into_inner()
        });
        f(&state)
    }

    pub fn with_state_mut<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&mut StoreState) -> T,
    {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| {
            warn!("Store lock poisoned, recovering");
            poisoned.into_inner()
        });
        f(&mut state)
    }

    /// Wipes users, channels and reset codes. Safe to call repeatedly.
    pub fn clear(&self) {
        self.with_state_mut(|state| state.clear());
        info!("Store cleared");
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
