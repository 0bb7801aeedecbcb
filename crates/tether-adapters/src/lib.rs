#![forbid(unsafe_code)]

//! Value adapters for Tether bindings.
//!
//! An adapter is a pure, synchronous converter between a declared input and
//! output [`ValueType`](tether_core::ValueType), optionally parameterized
//! by an [`AdapterOptions`] blob. Adapters are registered explicitly into an
//! [`AdapterRegistry`]; nothing is discovered by scanning types.
//!
//! - [`Adapter`] / [`AdapterDescriptor`]: the converter contract.
//! - [`AdapterOptions`]: per-binding configuration keyed by adapter id.
//! - [`AdapterRegistry`]: id and output-type index, plus a lazily built
//!   process-wide instance.
//! - [`builtin`]: the stock converters installed in the global registry.

pub mod adapter;
pub mod builtin;
pub mod options;
pub mod registry;

pub use adapter::{Adapter, AdapterDescriptor, FnAdapter};
pub use options::{AdapterOptions, options_for};
pub use registry::{AdapterRegistry, AdapterRegistryBuilder};
