//! Resolution passes.
//!
//! A [`Resolver`] is one pass over a [`ConfigStack`]. It performs:
//! 1. **Layer walk:** From a start position towards the innermost layer; the first rule that
//!    yields a value wins, partial rules that yield nothing fall through.
//! 2. **Scoping:** Rules see the stack through a [`Lookup`] bound to their own position, so
//!    `up` continues below the calling layer instead of restarting at the top.
//! 3. **Defaults:** When no layer supplies a key, its default rule runs below the innermost layer.
//! 4. **Memoization:** Results are cached per `(key, start)` for the lifetime of the pass only.
//! 5. **Cycle detection:** Re-entering an in-flight `(key, start)` lookup aborts the pass. Every
//!    later lookup in the same pass fails with the same cycle, even if a rule discarded the
//!    first error, so a pass never returns values computed around a cycle.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use super::key::{AnyKey, Erased, Key, KeyId, ParamValue};
use super::stack::ConfigStack;
use crate::common::{ParamError, Result};

/// An in-flight lookup, kept for cycle detection and reporting.
#[derive(Debug, Clone, Copy)]
struct Frame {
    id: KeyId,
    name: &'static str,
    start: usize,
}

impl Frame {
    fn label(&self) -> String {
        format!("{}@{}", self.name, self.start)
    }
}

/// One resolution pass over a stack.
///
/// Lookups made through the same pass share a memo table; separate passes never do.
pub struct Resolver {
    stack: ConfigStack,
    memo: HashMap<(KeyId, usize), Erased>,
    active: Vec<Frame>,
    cycle: Option<Vec<String>>,
}

impl Resolver {
    /// Opens a new pass over `stack`.
    pub fn new(stack: ConfigStack) -> Self {
        debug!(stack = %stack.name(), layers = stack.len(), "opening resolution pass");
        Self {
            stack,
            memo: HashMap::new(),
            active: Vec::new(),
            cycle: None,
        }
    }

    /// The stack this pass resolves against.
    pub const fn stack(&self) -> &ConfigStack {
        &self.stack
    }

    /// Resolves `key` against the whole stack.
    ///
    /// # Arguments
    ///
    /// * `key` - The key to resolve.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::Missing`] if nothing supplies the key and [`ParamError::Cycle`] if
    /// its rules depend on themselves. Once a cycle is found every later lookup in the pass
    /// returns that same cycle.
    pub fn get<T: ParamValue>(&mut self, key: &'static Key<T>) -> Result<T> {
        let value = self.lookup(key, 0)?;
        key.downcast(&value)
    }

    /// Resolves a type-erased key against the whole stack.
    ///
    /// # Errors
    ///
    /// Same as [`Resolver::get`].
    pub fn get_erased(&mut self, key: &'static dyn AnyKey) -> Result<Erased> {
        self.lookup(key, 0)
    }

    /// Number of memoized `(key, start)` results held by the pass.
    pub fn memoized(&self) -> usize {
        self.memo.len()
    }

    /// Returns true once a cycle has aborted the pass.
    pub const fn is_aborted(&self) -> bool {
        self.cycle.is_some()
    }

    fn cycle_error(&self, path: Vec<String>) -> ParamError {
        ParamError::Cycle {
            stack: self.stack.name().to_string(),
            path,
        }
    }

    fn lookup(&mut self, key: &'static dyn AnyKey, start: usize) -> Result<Erased> {
        if let Some(path) = &self.cycle {
            return Err(self.cycle_error(path.clone()));
        }

        let id = key.id();
        if let Some(value) = self.memo.get(&(id, start)) {
            return Ok(Arc::clone(value));
        }

        if let Some(first) = self
            .active
            .iter()
            .position(|frame| frame.id == id && frame.start == start)
        {
            let mut path: Vec<String> = self.active[first..].iter().map(Frame::label).collect();
            path.push(format!("{}@{start}", key.name()));
            debug!(stack = %self.stack.name(), path = %path.join(" -> "), "cycle detected");
            self.cycle = Some(path.clone());
            return Err(self.cycle_error(path));
        }

        self.active.push(Frame {
            id,
            name: key.name(),
            start,
        });
        let result = self.search(key, start);
        let _ = self.active.pop();

        let value = result?;
        // A rule may have swallowed the cycle error; its value is not trustworthy.
        if let Some(path) = &self.cycle {
            return Err(self.cycle_error(path.clone()));
        }
        let _ = self.memo.insert((id, start), Arc::clone(&value));
        Ok(value)
    }

    fn search(&mut self, key: &'static dyn AnyKey, start: usize) -> Result<Erased> {
        let id = key.id();
        let bottom = self.stack.len();

        for position in start..bottom {
            let layer = self.stack.layer_at(position);
            let Some(rule) = layer.rule(id) else {
                continue;
            };
            let mut cx = Lookup {
                resolver: self,
                position,
            };
            if let Some(value) = rule.eval(&mut cx)? {
                trace!(
                    key = key.name(),
                    layer = layer.name(),
                    position,
                    rule = rule.kind(),
                    "parameter supplied"
                );
                return Ok(value);
            }
        }

        // A default sits directly below the innermost layer; `up` from the default itself
        // starts past it and finds nothing.
        if start <= bottom {
            let mut cx = Lookup {
                resolver: self,
                position: bottom,
            };
            if let Some(value) = key.default_value(&mut cx) {
                trace!(key = key.name(), "parameter defaulted");
                return value;
            }
        }

        Err(ParamError::Missing {
            key: key.name(),
            id,
            stack: self.stack.name().to_string(),
        })
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("stack", &self.stack.name())
            .field("memoized", &self.memo.len())
            .field("active", &self.active)
            .field("aborted", &self.is_aborted())
            .finish()
    }
}

/// The view a rule gets of the stack while it is being evaluated.
///
/// * `site` resolves against the whole stack, including layers above the caller.
/// * `here` resolves from the caller's own layer downwards.
/// * `up` resolves from the layer directly below the caller.
pub struct Lookup<'a> {
    resolver: &'a mut Resolver,
    position: usize,
}

impl Lookup<'_> {
    /// Resolves `key` against the complete stack.
    ///
    /// # Errors
    ///
    /// Propagates any resolution error; callers usually forward it with `?`.
    pub fn site<T: ParamValue>(&mut self, key: &'static Key<T>) -> Result<T> {
        self.fetch(key, 0)
    }

    /// Resolves `key` starting at the calling layer.
    ///
    /// # Errors
    ///
    /// Propagates any resolution error.
    pub fn here<T: ParamValue>(&mut self, key: &'static Key<T>) -> Result<T> {
        self.fetch(key, self.position)
    }

    /// Resolves `key` using only the layers below the calling layer.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::Missing`] when no layer below supplies `key` and it has no default.
    pub fn up<T: ParamValue>(&mut self, key: &'static Key<T>) -> Result<T> {
        self.fetch(key, self.position + 1)
    }

    /// Like [`Lookup::up`], but reports "nothing below supplies `key`" as `None`.
    ///
    /// # Errors
    ///
    /// Any other error, including a missing dependency of a rule below, is still returned.
    pub fn up_opt<T: ParamValue>(&mut self, key: &'static Key<T>) -> Result<Option<T>> {
        optional(key, self.up(key))
    }

    /// Like [`Lookup::site`], but reports "nothing supplies `key`" as `None`.
    ///
    /// # Errors
    ///
    /// Any error other than `key` itself being missing.
    pub fn site_opt<T: ParamValue>(&mut self, key: &'static Key<T>) -> Result<Option<T>> {
        optional(key, self.site(key))
    }

    /// Position of the calling layer in the stack (0 is outermost).
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Name of the stack being resolved.
    pub fn stack_name(&self) -> &str {
        self.resolver.stack.name()
    }

    fn fetch<T: ParamValue>(&mut self, key: &'static Key<T>, start: usize) -> Result<T> {
        let value = self.resolver.lookup(key, start)?;
        key.downcast(&value)
    }
}

fn optional<T: ParamValue>(key: &'static Key<T>, result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_missing(key) => Ok(None),
        Err(err) => Err(err),
    }
}

impl fmt::Debug for Lookup<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lookup")
            .field("stack", &self.resolver.stack.name())
            .field("position", &self.position)
            .finish()
    }
}
