//! Capability registry implementation

use std::collections::HashSet;

use super::CapabilityRegistry;

/// A fixed set of capability names
#[derive(Debug, Clone, Default)]
pub struct CapabilitySet {
    names: HashSet<String>,
}

impl CapabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<S: Into<String>> Extend<S> for CapabilitySet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.names.extend(iter.into_iter().map(Into::into));
    }
}

impl CapabilityRegistry for CapabilitySet {
    fn has_capability(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}
