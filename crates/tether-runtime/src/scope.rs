#![forbid(unsafe_code)]

//! Lifecycle management for groups of bindings.

use tether_core::{BindError, with_index_scratch};
use tracing::debug;

use crate::binding::Binding;

/// Collects the bindings of one logical scope (e.g. a view subtree).
///
/// When the scope is dropped every binding is unbound, cleanly
/// disconnecting the scope from its view-models.
///
/// # Invariants
///
/// 1. Bindings are unbound in reverse registration order.
/// 2. After drop, no handler from this scope fires.
/// 3. `bind_all` only touches bindings that are currently unbound.
pub struct BindingScope {
    bindings: Vec<Binding>,
}

impl BindingScope {
    #[must_use]
    pub fn new() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// Take ownership of `binding`. Returns its index in the scope.
    pub fn hold(&mut self, binding: Binding) -> usize {
        self.bindings.push(binding);
        self.bindings.len() - 1
    }

    /// Bind every unbound binding in registration order.
    ///
    /// Returns how many bindings were activated.
    ///
    /// # Errors
    ///
    /// Stops at the first failing binding and returns its error. Bindings
    /// activated before it stay bound.
    pub fn bind_all(&mut self) -> Result<usize, BindError> {
        let bindings = &mut self.bindings;
        let activated = with_index_scratch(|pending| {
            pending.extend(
                bindings
                    .iter()
                    .enumerate()
                    .filter(|(_, b)| !b.is_bound())
                    .map(|(idx, _)| idx),
            );
            for &idx in pending.iter() {
                bindings[idx].bind()?;
            }
            Ok::<_, BindError>(pending.len())
        })?;
        debug!(activated, total = self.bindings.len(), "scope bound");
        Ok(activated)
    }

    /// Unbind everything, newest first. The bindings stay in the scope.
    pub fn unbind_all(&mut self) {
        for binding in self.bindings.iter_mut().rev() {
            binding.unbind();
        }
    }

    /// Unbind and drop every binding.
    pub fn clear(&mut self) {
        self.unbind_all();
        self.bindings.clear();
    }

    #[must_use]
    pub fn get(&self, idx: usize) -> Option<&Binding> {
        self.bindings.get(idx)
    }

    #[must_use]
    pub fn get_mut(&mut self, idx: usize) -> Option<&mut Binding> {
        self.bindings.get_mut(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter()
    }

    /// Bindings currently bound.
    #[must_use]
    pub fn bound_count(&self) -> usize {
        self.bindings.iter().filter(|b| b.is_bound()).count()
    }

    /// Bindings held, bound or not.
    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Default for BindingScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for BindingScope {
    fn drop(&mut self) {
        self.unbind_all();
    }
}

impl std::fmt::Debug for BindingScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingScope")
            .field("binding_count", &self.bindings.len())
            .field("bound_count", &self.bound_count())
            .finish()
    }
}
