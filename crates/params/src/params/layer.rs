//! Override layers.
//!
//! A [`Layer`] maps keys to rules. Every rule is one of three tagged variants:
//! 1. **Value:** A constant; the layer always supplies the key.
//! 2. **Derived:** Computed from other keys via [`Lookup`]; the layer always supplies the key.
//! 3. **Partial:** Computed, but may yield nothing, in which case resolution falls through to
//!    the layers below as if this layer had no rule for the key.
//!
//! Layers are built with a consuming builder and are immutable afterwards.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::key::{AnyKey, Erased, Key, KeyId, ParamValue};
use super::resolve::Lookup;
use crate::common::Result;

type DeriveFn = Arc<dyn Fn(&mut Lookup<'_>) -> Result<Erased> + Send + Sync>;
type PartialFn = Arc<dyn Fn(&mut Lookup<'_>) -> Result<Option<Erased>> + Send + Sync>;

/// How a layer produces the value of one key.
#[derive(Clone)]
pub enum Rule {
    /// Constant value.
    Value(Erased),
    /// Total rule computed from other parameters.
    Derived(DeriveFn),
    /// Guarded rule; `None` falls through to the layers below.
    Partial(PartialFn),
}

impl Rule {
    /// Evaluates the rule in the context of its layer.
    pub(crate) fn eval(&self, cx: &mut Lookup<'_>) -> Result<Option<Erased>> {
        match self {
            Self::Value(value) => Ok(Some(Arc::clone(value))),
            Self::Derived(rule) => rule(cx).map(Some),
            Self::Partial(rule) => rule(cx),
        }
    }

    /// Short tag used in diagnostics.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Value(_) => "value",
            Self::Derived(_) => "derived",
            Self::Partial(_) => "partial",
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

#[derive(Clone)]
struct Entry {
    key: &'static dyn AnyKey,
    rule: Rule,
}

/// A single override step contributing partial key/value definitions.
///
/// # Examples
///
/// ```
/// use rvconfig_params::{ConfigStack, Key, Layer};
///
/// static SIZE: Key<usize> = Key::new("StoreBufferSize");
/// static THRESHOLD: Key<usize> = Key::new("StoreBufferThreshold");
///
/// let base = Layer::new("base").set(&SIZE, 16).derive(&THRESHOLD, |cx| Ok(cx.site(&SIZE)? - 1));
/// let narrow = Layer::new("narrow").set(&SIZE, 4);
///
/// let stack = ConfigStack::from(narrow) + ConfigStack::from(base);
/// assert_eq!(stack.resolve(&THRESHOLD).unwrap(), 3);
/// ```
#[derive(Clone)]
pub struct Layer {
    name: String,
    entries: HashMap<KeyId, Entry>,
}

impl Layer {
    /// Creates an empty layer.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: HashMap::new(),
        }
    }

    /// Supplies a constant value for `key`.
    #[must_use]
    pub fn set<T: ParamValue>(self, key: &'static Key<T>, value: T) -> Self {
        self.insert(key, Rule::Value(Arc::new(value)))
    }

    /// Supplies `key` through a rule that always produces a value.
    #[must_use]
    pub fn derive<T, F>(self, key: &'static Key<T>, rule: F) -> Self
    where
        T: ParamValue,
        F: Fn(&mut Lookup<'_>) -> Result<T> + Send + Sync + 'static,
    {
        let derived: DeriveFn = Arc::new(move |cx: &mut Lookup<'_>| {
            rule(cx).map(|value| Arc::new(value) as Erased)
        });
        self.insert(key, Rule::Derived(derived))
    }

    /// Supplies `key` through a guarded rule; returning `None` defers to the layers below.
    #[must_use]
    pub fn partial<T, F>(self, key: &'static Key<T>, rule: F) -> Self
    where
        T: ParamValue,
        F: Fn(&mut Lookup<'_>) -> Result<Option<T>> + Send + Sync + 'static,
    {
        let guarded: PartialFn = Arc::new(move |cx: &mut Lookup<'_>| {
            rule(cx).map(|value| value.map(|value| Arc::new(value) as Erased))
        });
        self.insert(key, Rule::Partial(guarded))
    }

    /// Supplies an already type-checked constant through an erased key.
    #[must_use]
    pub(crate) fn set_erased(self, key: &'static dyn AnyKey, value: Erased) -> Self {
        self.insert(key, Rule::Value(value))
    }

    fn insert(mut self, key: &'static dyn AnyKey, rule: Rule) -> Self {
        let _ = self.entries.insert(key.id(), Entry { key, rule });
        self
    }

    /// Name of the layer.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if the layer has a rule for `key`.
    pub fn supplies(&self, key: &dyn AnyKey) -> bool {
        self.entries.contains_key(&key.id())
    }

    /// Number of keys the layer has rules for.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the layer has no rules.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names of the keys this layer has rules for, sorted.
    pub fn key_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.entries.values().map(|e| e.key.name()).collect();
        names.sort_unstable();
        names
    }

    /// Rule for the key with identity `id`, if any.
    pub(crate) fn rule(&self, id: KeyId) -> Option<&Rule> {
        self.entries.get(&id).map(|entry| &entry.rule)
    }
}

impl fmt::Debug for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries: Vec<_> = self
            .entries
            .values()
            .map(|e| (e.key.name(), e.rule.kind()))
            .collect();
        entries.sort_unstable();
        f.debug_struct("Layer")
            .field("name", &self.name)
            .field("entries", &entries)
            .finish()
    }
}
