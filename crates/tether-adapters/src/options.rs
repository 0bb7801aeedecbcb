#![forbid(unsafe_code)]

//! Per-binding adapter options.
//!
//! An [`AdapterOptions`] blob belongs to exactly one adapter id. When a
//! binding switches adapters the old blob is discarded and replaced with the
//! new adapter's defaults; a blob is never reinterpreted for another adapter.

use std::collections::BTreeMap;

use tether_core::{Rgba, Value};
use tracing::warn;

use crate::adapter::Adapter;

/// Typed configuration blob keyed by adapter id.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdapterOptions {
    adapter_id: String,
    #[cfg_attr(feature = "serde", serde(default))]
    entries: BTreeMap<String, Value>,
}

impl AdapterOptions {
    #[must_use]
    pub fn new(adapter_id: impl Into<String>) -> Self {
        Self {
            adapter_id: adapter_id.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn adapter_id(&self) -> &str {
        &self.adapter_id
    }

    /// Whether this blob was made for adapter `id`.
    #[must_use]
    pub fn is_for(&self, id: &str) -> bool {
        self.adapter_id == id
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    #[must_use]
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_int)
    }

    #[must_use]
    pub fn get_text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_text)
    }

    #[must_use]
    pub fn get_color(&self, key: &str) -> Option<Rgba> {
        self.get(key).and_then(Value::as_color)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Options a binding should hand to `adapter`.
///
/// `supplied` wins when it was made for this adapter. A blob made for some
/// other adapter is discarded in favor of the adapter's defaults.
#[must_use]
pub fn options_for(adapter: &dyn Adapter, supplied: Option<&AdapterOptions>) -> Option<AdapterOptions> {
    let id = adapter.descriptor().id.as_str();
    match supplied {
        Some(options) if options.is_for(id) => Some(options.clone()),
        Some(options) => {
            warn!(
                adapter = id,
                stale = options.adapter_id(),
                "discarding options made for another adapter"
            );
            adapter.default_options()
        }
        None => adapter.default_options(),
    }
}
