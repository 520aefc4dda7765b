//! In-memory [`ConfigStore`] implementation for tests.
//!
//! Records are kept as serialized JSON behind `std::sync::RwLock`, so the
//! save/load contract (including parse errors) matches the filesystem store.

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::CliError;
use crate::models::NamedConfig;

use super::{decode, encode, validate_name, ConfigStore};

/// In-memory configuration store.
pub struct InMemoryConfigStore {
    records: RwLock<BTreeMap<String, String>>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
        }
    }

    /// Seed a raw record, bypassing serialization.
    #[cfg(test)]
    pub(crate) fn insert_raw(&self, name: &str, raw: &str) {
        self.records
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.to_string(), raw.to_string());
    }
}

impl Default for InMemoryConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn save(&self, name: &str, config: &NamedConfig) -> Result<(), CliError> {
        validate_name(name)?;
        let raw = encode(config)?;
        self.records
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.to_string(), raw);
        Ok(())
    }

    fn load(&self, name: &str) -> Result<NamedConfig, CliError> {
        validate_name(name)?;
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        let raw = records
            .get(name)
            .ok_or_else(|| CliError::ConfigNotFound(name.to_string()))?;
        decode(name, raw)
    }

    fn list(&self) -> Result<Vec<String>, CliError> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        Ok(records.keys().cloned().collect())
    }
}
