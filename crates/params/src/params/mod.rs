//! Layered parameter resolution engine.
//!
//! This module implements the mechanism shared by every preset. It provides:
//! 1. **Keys:** [`Key<T>`] handles and their erased form [`AnyKey`].
//! 2. **Layers:** [`Layer`] rule sets with value, derived and partial rules.
//! 3. **Stacks:** [`ConfigStack`] composition (`++`) and per-pass resolution via [`Resolver`].
//! 4. **Views:** [`ResolvedView`] snapshots and the [`KeyRegistry`] name index.

/// Typed keys and their erased form.
pub mod key;

/// Override layers and rules.
pub mod layer;

/// Name index over keys.
pub mod registry;

/// Resolution passes and the rule-facing lookup view.
pub mod resolve;

/// Config stacks and composition.
pub mod stack;

/// Immutable resolved views.
pub mod view;

pub use key::{AnyKey, DefaultRule, Erased, Key, KeyId, ParamValue};
pub use layer::{Layer, Rule};
pub use registry::KeyRegistry;
pub use resolve::{Lookup, Resolver};
pub use stack::ConfigStack;
pub use view::ResolvedView;
