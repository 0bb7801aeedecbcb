#![forbid(unsafe_code)]

//! Tether: view/view-model bindings with typed adapters.
//!
//! This crate re-exports the public surface of the workspace:
//!
//! - [`tether_core`]: values, the [`Bindable`](tether_core::Bindable)
//!   trait, member discovery, and scratch pools.
//! - [`tether_adapters`]: the adapter contract, options, and registry.
//! - [`tether_runtime`]: bindings and binding scopes.
//!
//! Most applications only need the [`prelude`].

pub use tether_adapters;
pub use tether_core;
pub use tether_runtime;

pub mod prelude {
    //! Common imports for hosts wiring views to view-models.

    pub use tether_adapters::{
        Adapter, AdapterDescriptor, AdapterOptions, AdapterRegistry, FnAdapter, builtin,
    };
    pub use tether_core::{
        BindError, Bindable, BindableMember, ConfigurationError, ConversionError, DynObject,
        MemberAccess, MemberCatalog, MemberInfo, PropertyError, Rgba, Signal, Subscription, Value,
        ValueType,
    };
    pub use tether_runtime::{Binding, BindingConfig, BindingMode, BindingScope, BindingState};
}
