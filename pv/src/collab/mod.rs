//! Collaborators injected into the lifecycle subscriber
//!
//! - [`ConfigStore`] - read access to application settings
//! - [`SecretManager`] - holds the in-process copy of the application key
//! - [`CapabilityRegistry`] - reports which optional integrations exist

mod capabilities;
mod secrets;
mod store;

pub use capabilities::CapabilitySet;
pub use secrets::SecretKeeper;
pub use store::{EnvFileStore, MemoryStore};

/// Key/value settings lookup
pub trait ConfigStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

/// Receives the application key after it has been regenerated
pub trait SecretManager: Send + Sync {
    fn set_key(&self, value: &str);
}

/// Answers whether an optional integration is available
pub trait CapabilityRegistry: Send + Sync {
    fn has_capability(&self, name: &str) -> bool;
}
