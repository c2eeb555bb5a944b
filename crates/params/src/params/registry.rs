//! Name index over a set of keys.
//!
//! Resolution never needs names; the registry exists for the edges of the system where keys
//! arrive as text: JSON override files, `--set Name=value` flags and dumps.

use std::collections::BTreeMap;
use std::fmt;

use super::key::AnyKey;
use crate::common::{ParamError, Result};
use crate::keys;

/// Maps key names to keys.
#[derive(Clone)]
pub struct KeyRegistry {
    by_name: BTreeMap<&'static str, &'static dyn AnyKey>,
}

impl KeyRegistry {
    /// Builds a registry over `keys`.
    ///
    /// # Arguments
    ///
    /// * `keys` - Keys to index. Listing the same key twice is harmless.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::DuplicateKey`] if two distinct keys share a name.
    pub fn new(keys: &[&'static dyn AnyKey]) -> Result<Self> {
        let mut by_name: BTreeMap<&'static str, &'static dyn AnyKey> = BTreeMap::new();
        for &key in keys {
            if let Some(existing) = by_name.insert(key.name(), key) {
                if existing.id() != key.id() {
                    return Err(ParamError::DuplicateKey { name: key.name() });
                }
            }
        }
        Ok(Self { by_name })
    }

    /// Registry over every built-in key in [`keys::ALL`].
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::DuplicateKey`] if two built-in keys share a name.
    pub fn builtin() -> Result<Self> {
        Self::new(keys::ALL)
    }

    /// Looks a key up by name.
    pub fn get(&self, name: &str) -> Option<&'static dyn AnyKey> {
        self.by_name.get(name).copied()
    }

    /// Looks a key up by name.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::UnknownKey`] if no registered key has that name.
    pub fn require(&self, name: &str) -> Result<&'static dyn AnyKey> {
        self.get(name).ok_or_else(|| ParamError::UnknownKey {
            name: name.to_string(),
        })
    }

    /// Every registered key, ordered by name.
    pub fn keys(&self) -> Vec<&'static dyn AnyKey> {
        self.by_name.values().copied().collect()
    }

    /// Number of registered keys.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Returns true if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl fmt::Debug for KeyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.by_name.keys()).finish()
    }
}
