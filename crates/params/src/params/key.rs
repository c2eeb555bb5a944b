//! Typed parameter keys.
//!
//! A [`Key<T>`] is declared once as a `static` and used everywhere a value of type `T` is
//! looked up. Keys compare by the address of that `static`, never by name, so independently
//! authored keys that happen to share a name cannot shadow each other during resolution.
//!
//! ```
//! use rvconfig_params::Key;
//!
//! static ROB_SIZE: Key<usize> = Key::new("RobSize");
//! static ROB_COPY: Key<usize> = Key::new("RobSize");
//!
//! assert_eq!(ROB_SIZE.name(), ROB_COPY.name());
//! assert_ne!(ROB_SIZE.id(), ROB_COPY.id());
//! ```

use std::any::{Any, type_name};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::resolve::Lookup;
use crate::common::{ParamError, Result};

/// A type-erased resolved value, shared between memo tables and views.
pub type Erased = Arc<dyn Any + Send + Sync>;

/// Bound for every type a key may carry.
///
/// Values are cloned out of a pass, shown in diagnostics and round-tripped through JSON for
/// overrides and dumps.
pub trait ParamValue:
    Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

impl<T> ParamValue for T where
    T: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

/// Identity of a key: the address of its `static` declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyId(usize);

/// Rule evaluated when no layer supplies a key.
///
/// The rule runs below the innermost layer: `site` and `here` see the whole stack and `up`
/// always reports the key as missing.
pub type DefaultRule<T> = fn(&mut Lookup<'_>) -> Result<T>;

/// A named, typed handle for one parameter.
///
/// Declare keys as `static` items; identity is only stable for statics.
pub struct Key<T> {
    name: &'static str,
    default: Option<DefaultRule<T>>,
    _value: PhantomData<fn() -> T>,
}

impl<T> Key<T> {
    /// Defines a key with no default; resolving it requires a supplying layer.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            default: None,
            _value: PhantomData,
        }
    }

    /// Defines a key whose value falls back to `rule` when no layer supplies it.
    pub const fn with_default(name: &'static str, rule: DefaultRule<T>) -> Self {
        Self {
            name,
            default: Some(rule),
            _value: PhantomData,
        }
    }

    /// Human-readable name of the key.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Identity of the key.
    pub fn id(&self) -> KeyId {
        KeyId(std::ptr::from_ref(self) as usize)
    }

    /// Returns true if the key carries a default rule.
    pub const fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

impl<T: ParamValue> Key<T> {
    /// Recovers a typed value from the erased form stored by a pass.
    pub(crate) fn downcast(&self, value: &Erased) -> Result<T> {
        value
            .downcast_ref::<T>()
            .cloned()
            .ok_or(ParamError::TypeMismatch {
                key: self.name,
                expected: type_name::<T>(),
            })
    }
}

impl<T> fmt::Debug for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({}: {})", self.name, type_name::<T>())
    }
}

/// Object-safe view of a key with its value type erased.
///
/// The resolver walks layers through this trait; registries and dumps use it to move values
/// in and out of JSON without knowing their concrete type.
pub trait AnyKey: Send + Sync {
    /// Identity of the key.
    fn id(&self) -> KeyId;

    /// Name of the key.
    fn name(&self) -> &'static str;

    /// Rust type name of the key's values.
    fn type_name(&self) -> &'static str;

    /// Evaluates the default rule, or returns `None` when the key has none.
    fn default_value(&self, cx: &mut Lookup<'_>) -> Option<Result<Erased>>;

    /// Encodes a value of this key's type as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::TypeMismatch`] if `value` is not of the key's type.
    fn encode(&self, value: &Erased) -> Result<serde_json::Value>;

    /// Decodes a JSON value into this key's type.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::Decode`] if `value` does not deserialize into the key's type.
    fn decode(&self, value: serde_json::Value) -> Result<Erased>;
}

impl<T: ParamValue> AnyKey for Key<T> {
    fn id(&self) -> KeyId {
        Self::id(self)
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn default_value(&self, cx: &mut Lookup<'_>) -> Option<Result<Erased>> {
        self.default
            .map(|rule| rule(cx).map(|value| Arc::new(value) as Erased))
    }

    fn encode(&self, value: &Erased) -> Result<serde_json::Value> {
        let typed = self.downcast(value)?;
        serde_json::to_value(typed).map_err(|source| ParamError::Decode {
            key: self.name.to_string(),
            source,
        })
    }

    fn decode(&self, value: serde_json::Value) -> Result<Erased> {
        let typed: T = serde_json::from_value(value).map_err(|source| ParamError::Decode {
            key: self.name.to_string(),
            source,
        })?;
        Ok(Arc::new(typed))
    }
}

impl fmt::Debug for dyn AnyKey + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({}: {})", self.name(), self.type_name())
    }
}
