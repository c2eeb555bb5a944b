//! Config stacks and their composition operator.

use std::fmt;
use std::ops::Add;
use std::sync::Arc;

use super::key::{AnyKey, Key, ParamValue};
use super::layer::Layer;
use super::resolve::Resolver;
use super::view::ResolvedView;
use crate::common::Result;

/// An immutable, ordered sequence of layers, outermost first.
///
/// Stacks are cheap to clone and never change once built: [`ConfigStack::concat`] and
/// [`ConfigStack::alter`] return new stacks that share layers with their inputs.
///
/// `a + b` (written `a ++ b` in the docs) places every layer of `b` below those of `a`, so `a`
/// overrides `b`. The operator is associative but not commutative.
#[derive(Clone)]
pub struct ConfigStack {
    name: Arc<str>,
    layers: Arc<[Arc<Layer>]>,
}

impl ConfigStack {
    /// Creates a stack with no layers.
    pub fn empty(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            layers: Arc::from(Vec::new()),
        }
    }

    /// Name of the stack, used in error messages.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns true if the stack has no layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Layers from outermost to innermost.
    pub fn layers(&self) -> impl Iterator<Item = &Layer> + '_ {
        self.layers.iter().map(|layer| &**layer)
    }

    /// Layer at `position`, shared.
    pub(crate) fn layer_at(&self, position: usize) -> Arc<Layer> {
        Arc::clone(&self.layers[position])
    }

    /// Returns the same layers under a new name.
    #[must_use]
    pub fn named(&self, name: &str) -> Self {
        Self {
            name: Arc::from(name),
            layers: Arc::clone(&self.layers),
        }
    }

    /// Composes `self ++ below`: the layers of `below` sit under the layers of `self`.
    #[must_use]
    pub fn concat(&self, below: &Self) -> Self {
        let layers: Vec<Arc<Layer>> = self
            .layers
            .iter()
            .chain(below.layers.iter())
            .cloned()
            .collect();
        let name = match (self.is_empty(), below.is_empty()) {
            (true, _) => below.name.to_string(),
            (false, true) => self.name.to_string(),
            (false, false) => format!("{} ++ {}", self.name, below.name),
        };
        Self {
            name: Arc::from(name),
            layers: Arc::from(layers),
        }
    }

    /// Puts `layer` on top of the stack, keeping the stack's name.
    #[must_use]
    pub fn alter(&self, layer: Layer) -> Self {
        let layers: Vec<Arc<Layer>> = std::iter::once(Arc::new(layer))
            .chain(self.layers.iter().cloned())
            .collect();
        Self {
            name: Arc::clone(&self.name),
            layers: Arc::from(layers),
        }
    }

    /// Opens a fresh resolution pass over this stack.
    pub fn pass(&self) -> Resolver {
        Resolver::new(self.clone())
    }

    /// Resolves every key in `keys` in one shared pass.
    ///
    /// Keys nothing supplies are left out of the view (and listed by
    /// [`ResolvedView::missing`]).
    ///
    /// # Errors
    ///
    /// Any resolution error other than a missing key aborts the pass.
    pub fn view(&self, keys: &[&'static dyn AnyKey]) -> Result<ResolvedView> {
        ResolvedView::collect(&mut self.pass(), keys)
    }

    /// Resolves one key in a fresh pass.
    ///
    /// # Arguments
    ///
    /// * `key` - The key to resolve.
    ///
    /// # Errors
    ///
    /// Returns the error that aborted the lookup.
    pub fn resolve<T: ParamValue>(&self, key: &'static Key<T>) -> Result<T> {
        self.pass().get(key)
    }
}

impl From<Layer> for ConfigStack {
    fn from(layer: Layer) -> Self {
        let name = layer.name().to_string();
        Self {
            name: Arc::from(name),
            layers: Arc::from(vec![Arc::new(layer)]),
        }
    }
}

impl Add for ConfigStack {
    type Output = Self;

    fn add(self, below: Self) -> Self {
        self.concat(&below)
    }
}

impl Add for &ConfigStack {
    type Output = ConfigStack;

    fn add(self, below: Self) -> ConfigStack {
        self.concat(below)
    }
}

impl fmt::Debug for ConfigStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigStack")
            .field("name", &self.name)
            .field(
                "layers",
                &self.layers.iter().map(|l| l.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl fmt::Display for ConfigStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
