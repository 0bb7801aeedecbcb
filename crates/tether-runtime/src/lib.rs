#![forbid(unsafe_code)]

//! Runtime for Tether view bindings.
//!
//! A [`Binding`] keeps one view property and one view-model property in sync
//! through adapters resolved from an
//! [`AdapterRegistry`](tether_adapters::AdapterRegistry). A
//! [`BindingScope`] owns the bindings of one view subtree and unbinds them
//! together.
//!
//! # Example
//!
//! ```ignore
//! use tether_core::DynObject;
//! use tether_runtime::{Binding, BindingConfig};
//!
//! let view = DynObject::builder("Label").property("text", "").event("edited").build();
//! let vm = DynObject::builder("Player").property("name", "Ada").notify_changes().build();
//!
//! let mut binding = Binding::new(BindingConfig::two_way("edited", "text", "name"), view.clone(), vm.clone());
//! binding.bind()?;
//! assert_eq!(view.get("text"), Some("Ada".into()));
//! ```
//!
//! # Feature Flags
//!
//! - `serde`: serialize and deserialize [`BindingConfig`].
//! - `config`: load binding sheets from TOML or JSON files.

pub mod binding;
pub mod config;
pub mod scope;

pub use binding::{Binding, BindingState};
pub use config::{BindingConfig, BindingMode};
#[cfg(feature = "config")]
pub use config::{BindingSheet, NamedBinding, SheetError};
pub use scope::BindingScope;
