//! Immutable resolved views.

use std::collections::HashMap;
use std::fmt;

use super::key::{AnyKey, Erased, Key, KeyId, ParamValue};
use super::resolve::Resolver;
use crate::common::Result;

struct ViewEntry {
    key: &'static dyn AnyKey,
    value: Erased,
}

/// The final key → value mapping produced by one resolution pass.
///
/// Views are read-only; they are never updated after construction.
pub struct ResolvedView {
    stack: String,
    values: HashMap<KeyId, ViewEntry>,
    missing: Vec<&'static str>,
}

impl ResolvedView {
    /// Resolves `keys` through `pass`, skipping keys that nothing supplies.
    pub(crate) fn collect(pass: &mut Resolver, keys: &[&'static dyn AnyKey]) -> Result<Self> {
        let mut values = HashMap::with_capacity(keys.len());
        let mut missing = Vec::new();
        for &key in keys {
            match pass.get_erased(key) {
                Ok(value) => {
                    let _ = values.insert(key.id(), ViewEntry { key, value });
                }
                Err(err) if err.is_missing(key) => missing.push(key.name()),
                Err(err) => return Err(err),
            }
        }
        missing.sort_unstable();
        Ok(Self {
            stack: pass.stack().name().to_string(),
            values,
            missing,
        })
    }

    /// Name of the stack the view was resolved from.
    pub fn stack(&self) -> &str {
        &self.stack
    }

    /// Value of `key`, if the view holds it.
    pub fn get<T: ParamValue>(&self, key: &'static Key<T>) -> Option<&T> {
        self.values
            .get(&key.id())
            .and_then(|entry| entry.value.downcast_ref::<T>())
    }

    /// Returns true if the view holds a value for `key`.
    pub fn contains(&self, key: &dyn AnyKey) -> bool {
        self.values.contains_key(&key.id())
    }

    /// Number of resolved keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no key resolved.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Names of the requested keys that nothing supplied, sorted.
    pub fn missing(&self) -> &[&'static str] {
        &self.missing
    }

    /// Names of the resolved keys, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.values.values().map(|e| e.key.name()).collect();
        names.sort_unstable();
        names
    }

    /// Encodes the view as a JSON object keyed by parameter name.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ParamError::Decode`] if a value fails to serialize.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        let mut object = serde_json::Map::new();
        for entry in self.values.values() {
            let _ = object.insert(entry.key.name().to_string(), entry.key.encode(&entry.value)?);
        }
        Ok(serde_json::Value::Object(object))
    }
}

impl fmt::Debug for ResolvedView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedView")
            .field("stack", &self.stack)
            .field("keys", &self.names())
            .field("missing", &self.missing)
            .finish()
    }
}
