//! Secret manager implementation

use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use super::SecretManager;

/// Holds the in-process application key
///
/// Mutation goes through a mutex so pipelines sharing one keeper serialize
/// their updates.
#[derive(Debug, Default)]
pub struct SecretKeeper {
    state: Mutex<KeyState>,
}

#[derive(Debug, Default)]
struct KeyState {
    key: Option<String>,
    updates: usize,
}

impl SecretKeeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a keeper already holding a key
    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(KeyState {
                key: Some(key.into()),
                updates: 0,
            }),
        }
    }

    /// The current key, if one has been set
    pub fn current(&self) -> Option<String> {
        self.lock().key.clone()
    }

    /// How many times `set_key` has been called
    pub fn update_count(&self) -> usize {
        self.lock().updates
    }

    fn lock(&self) -> MutexGuard<'_, KeyState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SecretManager for SecretKeeper {
    fn set_key(&self, value: &str) {
        debug!(len = value.len(), "SecretKeeper::set_key: called");
        let mut state = self.lock();
        state.key = Some(value.to_string());
        state.updates += 1;
    }
}
