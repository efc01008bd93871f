// crates/shield-core/src/runtime/store.rs
// ============================================================================
// Module: Shield In-Memory Store
// Description: In-memory configuration store for tests and local runs.
// Purpose: Provide a linearizable store implementation without external deps.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! [`InMemoryConfigurationStore`] keeps every configuration document behind a
//! single mutex. An update runs its mutator while holding the lock, so
//! concurrent updates are linearized and readers see either the old or the
//! new document. It is not durable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use crate::core::ConfigType;
use crate::core::ConfigurationDocument;
use crate::core::ConfigurationSeed;
use crate::interfaces::ConfigurationStore;
use crate::interfaces::DocumentMutator;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// Documents of a provisioned store.
type Documents = BTreeMap<ConfigType, ConfigurationDocument>;

/// In-memory configuration store.
///
/// # Invariants
/// - `None` means the store was never provisioned.
#[derive(Debug, Default, Clone)]
pub struct InMemoryConfigurationStore {
    /// Documents protected by a mutex.
    documents: Arc<Mutex<Option<Documents>>>,
}

impl InMemoryConfigurationStore {
    /// Creates an unprovisioned store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store provisioned with `seed`.
    #[must_use]
    pub fn with_seed(seed: ConfigurationSeed) -> Self {
        Self {
            documents: Arc::new(Mutex::new(Some(provision(seed)))),
        }
    }
}

/// Fills in empty documents for types missing from `seed`.
fn provision(mut seed: ConfigurationSeed) -> Documents {
    for config_type in ConfigType::ALL {
        seed.entry(config_type).or_default();
    }
    seed
}

/// Returns the mutex-poisoned store error.
fn poisoned() -> StoreError {
    StoreError::Store("configuration store mutex poisoned".to_string())
}

impl ConfigurationStore for InMemoryConfigurationStore {
    fn read(&self, config_type: ConfigType) -> Result<ConfigurationDocument, StoreError> {
        let guard = self.documents.lock().map_err(|_| poisoned())?;
        let documents = guard.as_ref().ok_or(StoreError::NotInitialized)?;
        Ok(documents.get(&config_type).cloned().unwrap_or_default())
    }

    fn atomic_update(
        &self,
        config_type: ConfigType,
        mutator: &mut DocumentMutator<'_>,
    ) -> Result<ConfigurationDocument, StoreError> {
        let mut guard = self.documents.lock().map_err(|_| poisoned())?;
        let documents = guard.as_mut().ok_or(StoreError::NotInitialized)?;
        let current = documents.get(&config_type).cloned().unwrap_or_default();
        let next = mutator(&current)?;
        documents.insert(config_type, next.clone());
        Ok(next)
    }

    fn initialize(&self, seed: ConfigurationSeed) -> Result<(), StoreError> {
        let mut guard = self.documents.lock().map_err(|_| poisoned())?;
        if guard.is_some() {
            return Err(StoreError::AlreadyInitialized);
        }
        *guard = Some(provision(seed));
        Ok(())
    }

    fn is_initialized(&self) -> Result<bool, StoreError> {
        let guard = self.documents.lock().map_err(|_| poisoned())?;
        Ok(guard.is_some())
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions.")]

    use serde_json::json;

    use super::InMemoryConfigurationStore;
    use crate::core::ConfigType;
    use crate::core::ConfigurationSeed;
    use crate::interfaces::ConfigurationStore;
    use crate::interfaces::StoreError;

    #[test]
    fn unprovisioned_store_fails_closed() {
        let store = InMemoryConfigurationStore::new();
        assert_eq!(store.read(ConfigType::Roles), Err(StoreError::NotInitialized));
        let result = store.atomic_update(ConfigType::Roles, &mut |doc| Ok(doc.clone()));
        assert_eq!(result, Err(StoreError::NotInitialized));
    }

    #[test]
    fn aborted_mutator_writes_nothing() {
        let store = InMemoryConfigurationStore::with_seed(ConfigurationSeed::new());
        store
            .atomic_update(ConfigType::Config, &mut |doc| Ok(doc.with_field("a", json!(1))))
            .unwrap();
        let result = store.atomic_update(ConfigType::Config, &mut |_| {
            Err(StoreError::Aborted("no".to_string()))
        });
        assert!(result.is_err());
        assert_eq!(store.read(ConfigType::Config).unwrap().get("a"), Some(&json!(1)));
    }

    #[test]
    fn initialize_twice_is_rejected() {
        let store = InMemoryConfigurationStore::new();
        store.initialize(ConfigurationSeed::new()).unwrap();
        assert_eq!(store.initialize(ConfigurationSeed::new()), Err(StoreError::AlreadyInitialized));
    }
}
