//! Secret store lookup: the OS keyring, or an in-memory map.

use crate::core::error::StoreError;
use keyring::Entry;
use std::collections::HashMap;
use zeroize::Zeroizing;

/// Lookup capability handed to the sync.
///
/// Implementations return `Ok(None)` when the store has no entry for the key.
/// An empty value is reported as-is; callers decide whether it counts.
pub trait SecretStore {
    fn get(&self, service: &str, key: &str) -> Result<Option<Zeroizing<String>>, StoreError>;

    /// Short label for diagnostics.
    fn backend_name(&self) -> &'static str;
}

/// Platform keyring (macOS Keychain, Windows Credential Manager, Linux
/// kernel keyutils). Entries are addressed by (service, key) the same way
/// `keyring get <service> <key>` does.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyringStore;

impl KeyringStore {
    pub fn new() -> Self {
        Self
    }

    pub fn set(&self, service: &str, key: &str, value: &str) -> Result<(), StoreError> {
        let entry = Entry::new(service, key)?;
        entry.set_password(value)?;
        Ok(())
    }

    /// Delete an entry. Deleting a missing entry is not an error.
    pub fn delete(&self, service: &str, key: &str) -> Result<(), StoreError> {
        let entry = Entry::new(service, key)?;
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl SecretStore for KeyringStore {
    fn get(&self, service: &str, key: &str) -> Result<Option<Zeroizing<String>>, StoreError> {
        let entry = Entry::new(service, key)?;
        match entry.get_password() {
            Ok(value) => Ok(Some(Zeroizing::new(value))),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn backend_name(&self) -> &'static str {
        "keyring"
    }
}

/// In-memory store keyed by (service, key).
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<(String, String), String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, service: &str, key: &str, value: &str) {
        self.entries
            .insert((service.to_string(), key.to_string()), value.to_string());
    }

    pub fn with(mut self, service: &str, key: &str, value: &str) -> Self {
        self.insert(service, key, value);
        self
    }
}

impl SecretStore for MemoryStore {
    fn get(&self, service: &str, key: &str) -> Result<Option<Zeroizing<String>>, StoreError> {
        Ok(self
            .entries
            .get(&(service.to_string(), key.to_string()))
            .map(|v| Zeroizing::new(v.clone())))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_scoped_by_service() {
        let store = MemoryStore::new()
            .with("memex", "OPENAI_API_KEY", "sk-one")
            .with("other", "OPENAI_API_KEY", "sk-two");
        let value = store.get("memex", "OPENAI_API_KEY").unwrap().unwrap();
        assert_eq!(value.as_str(), "sk-one");
        let value = store.get("other", "OPENAI_API_KEY").unwrap().unwrap();
        assert_eq!(value.as_str(), "sk-two");
    }

    #[test]
    fn test_memory_store_missing_is_none() {
        let store = MemoryStore::new();
        assert!(store.get("memex", "CLAUDE_API_KEY").unwrap().is_none());
    }
}
