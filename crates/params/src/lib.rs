//! Typed, layered parameter resolution for RISC-V core and SoC generators.
//!
//! This crate turns named configuration presets into one consistent parameter set. It provides:
//! 1. **Keys:** Statically typed parameter handles compared by identity, plus a name registry.
//! 2. **Layers:** Override steps whose rules may consult `site`, `here` and `up` views.
//! 3. **Stacks:** Ordered, immutable layer sequences with an associative `++` operator.
//! 4. **Presets:** A compiled-in catalog (base, default, minimal, L2/L3 debug variants, ...).
//! 5. **Validation:** Exhaustive geometry, pipeline and flag-exclusivity checks before use.
//!
//! ```
//! use rvconfig_params::{build_stack, resolve, resolve_all, keys};
//!
//! let stack = build_stack("minimal-l3-debug", 1).unwrap();
//! assert!(!resolve(&stack, &keys::USE_FAKE_L2_CACHE).unwrap());
//!
//! let soc = resolve_all(&stack).unwrap();
//! assert_eq!(soc.cores.len(), 1);
//! assert_eq!(soc.cores[0].decode_width, 2);
//! ```

/// Shared constants and the crate error type.
pub mod common;
/// Parameter value types (cache, TLB, dispatch, core and SoC bundles).
pub mod config;
/// The built-in parameter keys.
pub mod keys;
/// JSON override layers applied on top of a preset.
pub mod overrides;
/// Resolution engine: keys, layers, stacks, passes and views.
pub mod params;
/// The compiled-in preset catalog.
pub mod presets;
/// Assembly of per-hart and SoC-wide parameter sets.
pub mod soc;
/// Post-resolution invariant checks.
pub mod validate;

pub use crate::common::{ParamError, Result};
pub use crate::config::{CoreParameterSet, SocParameterSet};
pub use crate::params::{ConfigStack, Key, Layer, Lookup, ResolvedView};
pub use crate::presets::build_stack;
pub use crate::soc::resolve_all;

/// Resolves a single key against `stack` in a fresh resolution pass.
///
/// # Arguments
///
/// * `stack` - The stack to resolve against.
/// * `key` - The key to look up.
///
/// # Errors
///
/// Returns [`ParamError::Missing`] when nothing supplies the key, or any other error raised by
/// the rules involved.
pub fn resolve<T: params::ParamValue>(stack: &ConfigStack, key: &'static Key<T>) -> Result<T> {
    stack.resolve(key)
}
