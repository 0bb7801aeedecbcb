#![forbid(unsafe_code)]

//! Core primitives for Tether view bindings.
//!
//! This crate provides everything a binding needs to talk to host objects
//! without ambient reflection:
//!
//! - [`Value`] / [`ValueType`]: the closed dynamic value model carried
//!   between a view and a view-model.
//! - [`Bindable`]: the capability trait a host object implements once to
//!   expose its properties, events, and change notifications.
//! - [`Signal`] / [`Subscription`]: single-threaded notification channel
//!   with RAII unsubscription.
//! - [`DynObject`]: a ready-made `Bindable` host object.
//! - [`MemberCatalog`]: discovery of bindable properties and events.
//! - [`ScratchPool`]: leased reusable buffers for bulk discovery scans.
//!
//! # Architecture
//!
//! Host objects are shared through `Rc` and mutate through interior
//! mutability, so every type that touches them is `!Send`. All discovery,
//! activation, and dispatch happen on the host's control thread.
//!
//! # Invariants
//!
//! 1. A `Value` always reports the `ValueType` of its variant.
//! 2. Member discovery only ever returns members marked bindable.
//! 3. Discovery results are ordered by declaring type, then member name.
//! 4. A `ScratchPool` is never lent out twice at the same time.

pub mod catalog;
pub mod error;
pub mod member;
pub mod object;
pub mod scratch;
pub mod signal;
pub mod value;

pub use catalog::MemberCatalog;
pub use error::{
    BindError, ConfigurationError, ConversionError, MemberKind, PropertyError, PropertyFault,
};
pub use member::{
    Bindable, BindableMember, ChangeHandler, EventHandler, MemberAccess, MemberInfo,
};
pub use object::{DynObject, DynObjectBuilder};
pub use scratch::{ScratchError, ScratchLease, ScratchPool, with_index_scratch, with_member_scratch};
pub use signal::{Signal, Subscription};
pub use value::{ErrorValue, Rgba, Value, ValueType};
