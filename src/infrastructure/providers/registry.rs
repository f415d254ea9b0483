//! # Provider Registry
//!
//! Enum-keyed map from [`ProviderType`] to its adapter.
//!
//! A selected provider without a registered adapter is treated as
//! unreachable by the dispatcher.

use crate::domain::value_objects::ProviderType;
use crate::infrastructure::providers::traits::ProviderAdapter;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Registered provider adapters, at most one per channel.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    adapters: BTreeMap<ProviderType, Arc<dyn ProviderAdapter>>,
}

impl ProviderRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an adapter under its own provider type, replacing any
    /// previous one.
    pub fn register(&mut self, adapter: Arc<dyn ProviderAdapter>) -> Option<Arc<dyn ProviderAdapter>> {
        self.adapters.insert(adapter.provider_type(), adapter)
    }

    /// Builder-style [`ProviderRegistry::register`].
    #[must_use]
    pub fn with(mut self, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.register(adapter);
        self
    }

    /// Returns the adapter for a channel.
    #[must_use]
    pub fn get(&self, provider: ProviderType) -> Option<Arc<dyn ProviderAdapter>> {
        self.adapters.get(&provider).cloned()
    }

    /// Returns true if the channel has an adapter.
    #[must_use]
    pub fn contains(&self, provider: ProviderType) -> bool {
        self.adapters.contains_key(&provider)
    }

    /// Registered channels, in canonical order.
    pub fn providers(&self) -> impl Iterator<Item = ProviderType> + '_ {
        self.adapters.keys().copied()
    }

    /// Number of registered adapters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}
