#![forbid(unsafe_code)]

//! Adapter registry: id index, output-type index, and the global instance.
//!
//! # Invariants
//!
//! 1. Adapter ids are unique; registering a duplicate fails the build.
//! 2. Every id query returns ids in ascending alphabetical order.
//! 3. The empty id resolves to the identity sentinel (`Ok(None)`); any other
//!    unknown id is a [`ConfigurationError::UnknownAdapter`].
//! 4. The global registry is built at most once, on first use, unless a
//!    host installs its own.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Duplicate id | Two adapters claim one id | `build()` returns `DuplicateAdapter` |
//! | Unknown id | Adapter renamed or removed | `resolve()` returns `UnknownAdapter` |
//! | No match | Predicate rejects everything | Empty `Vec` |

use std::sync::{Arc, OnceLock};

use ahash::AHashMap;
use arc_swap::ArcSwap;
use tether_core::{ConfigurationError, ValueType};
use tracing::{debug, info};

use crate::adapter::{Adapter, AdapterDescriptor};
use crate::builtin;
use crate::options::AdapterOptions;

static GLOBAL: OnceLock<ArcSwap<AdapterRegistry>> = OnceLock::new();

fn global_slot() -> &'static ArcSwap<AdapterRegistry> {
    GLOBAL.get_or_init(|| ArcSwap::from_pointee(AdapterRegistry::builtin()))
}

/// Index of known adapters.
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: AHashMap<String, Arc<dyn Adapter>>,
    by_output: AHashMap<ValueType, Vec<String>>,
}

impl AdapterRegistry {
    #[must_use]
    pub fn builder() -> AdapterRegistryBuilder {
        AdapterRegistryBuilder::default()
    }

    /// Registry holding only the stock adapters.
    #[must_use]
    pub fn builtin() -> Self {
        Self::builder()
            .register_all(builtin::adapters())
            .build()
            .expect("stock adapter ids are unique")
    }

    /// The process-wide registry, built from the stock adapters on first use.
    #[must_use]
    pub fn global() -> Arc<Self> {
        global_slot().load_full()
    }

    /// Replace the process-wide registry. Returns the previous one.
    ///
    /// A binding captures the global registry when it is constructed, so
    /// bindings created before the swap keep resolving against the old
    /// registry, bound or not.
    pub fn install_global(registry: Self) -> Arc<Self> {
        info!(adapters = registry.len(), "installing global adapter registry");
        global_slot().swap(Arc::new(registry))
    }

    /// Ids whose descriptor satisfies `predicate`, sorted alphabetically.
    #[must_use]
    pub fn adapter_ids(&self, predicate: impl Fn(&AdapterDescriptor) -> bool) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .adapters
            .values()
            .map(|a| a.descriptor())
            .filter(|&d| predicate(d))
            .map(|d| d.id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Ids of adapters producing `out_type`, sorted alphabetically.
    #[must_use]
    pub fn adapter_ids_by_output(&self, out_type: ValueType) -> Vec<&str> {
        self.by_output
            .get(&out_type)
            .map(|ids| ids.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Ids of adapters converting `in_type` into `out_type`, sorted alphabetically.
    #[must_use]
    pub fn adapter_ids_between(&self, in_type: ValueType, out_type: ValueType) -> Vec<&str> {
        self.adapter_ids_by_output(out_type)
            .into_iter()
            .filter(|id| {
                self.descriptor(id)
                    .is_some_and(|d| d.in_type == in_type)
            })
            .collect()
    }

    /// Resolve `id`: `Ok(None)` is identity (empty id).
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::UnknownAdapter`] for a non-empty unknown id.
    pub fn resolve(&self, id: &str) -> Result<Option<Arc<dyn Adapter>>, ConfigurationError> {
        if id.is_empty() {
            return Ok(None);
        }
        self.adapters
            .get(id)
            .cloned()
            .map(Some)
            .ok_or_else(|| ConfigurationError::UnknownAdapter { id: id.to_owned() })
    }

    #[must_use]
    pub fn descriptor(&self, id: &str) -> Option<&AdapterDescriptor> {
        self.adapters.get(id).map(|a| a.descriptor())
    }

    /// Options type required by adapter `id`, if any.
    #[must_use]
    pub fn options_type_of(&self, id: &str) -> Option<&'static str> {
        self.descriptor(id).and_then(|d| d.options_type)
    }

    /// Fresh default options for adapter `id`.
    #[must_use]
    pub fn default_options(&self, id: &str) -> Option<AdapterOptions> {
        self.adapters.get(id).and_then(|a| a.default_options())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("adapters", &self.adapter_ids(|_| true))
            .finish()
    }
}

/// Explicit registration list for an [`AdapterRegistry`].
#[derive(Default)]
pub struct AdapterRegistryBuilder {
    pending: Vec<Arc<dyn Adapter>>,
}

impl AdapterRegistryBuilder {
    #[must_use]
    pub fn register(mut self, adapter: impl Adapter + 'static) -> Self {
        self.pending.push(Arc::new(adapter));
        self
    }

    #[must_use]
    pub fn register_all(mut self, adapters: impl IntoIterator<Item = Arc<dyn Adapter>>) -> Self {
        self.pending.extend(adapters);
        self
    }

    /// Build the indices.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::DuplicateAdapter`] if two adapters share an id.
    pub fn build(self) -> Result<AdapterRegistry, ConfigurationError> {
        let mut registry = AdapterRegistry::default();
        for adapter in self.pending {
            let desc = adapter.descriptor();
            if registry.adapters.contains_key(&desc.id) {
                return Err(ConfigurationError::DuplicateAdapter {
                    id: desc.id.clone(),
                });
            }
            registry
                .by_output
                .entry(desc.out_type)
                .or_default()
                .push(desc.id.clone());
            registry.adapters.insert(desc.id.clone(), Arc::clone(&adapter));
        }
        for ids in registry.by_output.values_mut() {
            ids.sort_unstable();
        }
        debug!(adapters = registry.len(), "adapter registry built");
        Ok(registry)
    }
}

impl std::fmt::Debug for AdapterRegistryBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistryBuilder")
            .field("pending", &self.pending.len())
            .finish()
    }
}
