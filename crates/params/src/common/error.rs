//! Resolution and validation errors.
//!
//! This module defines every failure the engine can report. It provides:
//! 1. **Resolution Errors:** Missing keys, cyclic `site` dependencies and type mismatches.
//! 2. **Validation Errors:** An aggregate [`InvariantReport`] listing every violated predicate.
//! 3. **Input Errors:** Unknown presets or key names and undecodable override values.

use std::fmt;

use serde::Serialize;

use crate::params::{AnyKey, KeyId};

/// Convenience alias used throughout the crate.
pub type Result<T, E = ParamError> = std::result::Result<T, E>;

/// Errors raised while building, resolving or validating a configuration.
///
/// All of them are deterministic for a given stack; nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum ParamError {
    /// No layer supplies the key and the key has no default rule.
    ///
    /// Aborts the lookup of this key only; a layer may recover through `Lookup::up_opt`.
    #[error("missing parameter '{key}' in stack '{stack}'")]
    Missing {
        /// Name of the key that could not be resolved.
        key: &'static str,
        /// Identity of that key.
        id: KeyId,
        /// Name of the stack the lookup was made against.
        stack: String,
    },

    /// A rule depends on its own result through `site`, `here` or `up`.
    ///
    /// Aborts the whole resolution pass.
    #[error("cyclic parameter resolution in stack '{stack}': {}", .path.join(" -> "))]
    Cycle {
        /// Name of the stack being resolved.
        stack: String,
        /// Lookups forming the cycle, first to last, as `Key@position`.
        path: Vec<String>,
    },

    /// The resolved parameter set breaks one or more invariants.
    #[error("{0}")]
    Invariant(InvariantReport),

    /// A stored value does not have the key's declared type.
    #[error("parameter '{key}' does not hold a value of type {expected}")]
    TypeMismatch {
        /// Name of the key.
        key: &'static str,
        /// Type the key declares.
        expected: &'static str,
    },

    /// Two distinct keys registered under the same name.
    #[error("duplicate parameter key name '{name}'")]
    DuplicateKey {
        /// The shared name.
        name: &'static str,
    },

    /// An override names a key the registry does not know.
    #[error("unknown parameter key '{name}'")]
    UnknownKey {
        /// The unrecognised name.
        name: String,
    },

    /// `build_stack` was asked for a preset the catalog does not contain.
    #[error("unknown preset '{name}'")]
    UnknownPreset {
        /// The unrecognised preset name.
        name: String,
    },

    /// An override value could not be decoded into the key's type.
    #[error("cannot decode value for '{key}': {source}")]
    Decode {
        /// Name of the key (or the document) being decoded.
        key: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A command-line override is not of the form `KEY=VALUE`.
    #[error("expected KEY=VALUE, got '{text}'")]
    Assignment {
        /// The malformed assignment.
        text: String,
    },

    /// An override file could not be read.
    #[error("cannot read '{path}': {source}")]
    Io {
        /// Path of the file.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl ParamError {
    /// Returns true if this is a `Missing` error for `key` itself.
    ///
    /// Keys are compared by identity; another key with the same name does not match.
    pub fn is_missing(&self, key: &dyn AnyKey) -> bool {
        matches!(self, Self::Missing { id, .. } if *id == key.id())
    }
}

/// A single violated invariant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Where the violation was found: `soc` or `core N`.
    pub scope: String,
    /// Names of the keys involved.
    pub keys: Vec<&'static str>,
    /// The predicate that failed, with the offending values substituted.
    pub predicate: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.scope, self.predicate, self.keys.join(", "))
    }
}

/// Every violation found by one validation run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct InvariantReport {
    /// Violations in the order they were checked.
    pub violations: Vec<Violation>,
}

impl InvariantReport {
    /// Returns true if no violation was recorded.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Number of recorded violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if any violation involves the key named `key`.
    pub fn mentions(&self, key: &str) -> bool {
        self.violations.iter().any(|v| v.keys.contains(&key))
    }
}

impl fmt::Display for InvariantReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} configuration invariant(s) violated", self.violations.len())?;
        for violation in &self.violations {
            write!(f, "\n  {violation}")?;
        }
        Ok(())
    }
}
