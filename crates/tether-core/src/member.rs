#![forbid(unsafe_code)]

//! Member metadata and the [`Bindable`] capability trait.
//!
//! Host objects describe themselves through [`Bindable`] instead of being
//! inspected reflectively. Each host type implements it once; the binding
//! engine never depends on anything else.

use bitflags::bitflags;

use crate::error::BindError;
use crate::signal::Subscription;
use crate::value::{Value, ValueType};

bitflags! {
    /// What a member can do.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MemberAccess: u8 {
        const READ = 1 << 0;
        const WRITE = 1 << 1;
        const EVENT = 1 << 2;
        const READ_WRITE = Self::READ.bits() | Self::WRITE.bits();
    }
}

/// Handler invoked when a view event fires.
pub type EventHandler = Box<dyn Fn() -> Result<(), BindError>>;

/// Handler invoked with the name of a view-model property that changed.
pub type ChangeHandler = Box<dyn Fn(&str) -> Result<(), BindError>>;

/// Raw listing entry reported by a host object.
///
/// Only entries with `bindable` set are ever surfaced by discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    pub declaring_type: &'static str,
    pub name: String,
    /// `None` for events.
    pub member_type: Option<ValueType>,
    pub access: MemberAccess,
    pub bindable: bool,
}

impl MemberInfo {
    /// A bindable property.
    #[must_use]
    pub fn property(
        declaring_type: &'static str,
        name: impl Into<String>,
        member_type: ValueType,
        access: MemberAccess,
    ) -> Self {
        Self {
            declaring_type,
            name: name.into(),
            member_type: Some(member_type),
            access: access & MemberAccess::READ_WRITE,
            bindable: true,
        }
    }

    /// A bindable event.
    #[must_use]
    pub fn event(declaring_type: &'static str, name: impl Into<String>) -> Self {
        Self {
            declaring_type,
            name: name.into(),
            member_type: None,
            access: MemberAccess::EVENT,
            bindable: true,
        }
    }

    /// Drop the bindable marker.
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.bindable = false;
        self
    }
}

/// A discovered member that may take part in a binding.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BindableMember {
    pub declaring_type: &'static str,
    pub name: String,
    pub member_type: Option<ValueType>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub access: MemberAccess,
}

impl BindableMember {
    #[must_use]
    pub fn is_readable(&self) -> bool {
        self.access.contains(MemberAccess::READ)
    }

    #[must_use]
    pub fn is_writable(&self) -> bool {
        self.access.contains(MemberAccess::WRITE)
    }

    #[must_use]
    pub fn is_event(&self) -> bool {
        self.access.contains(MemberAccess::EVENT)
    }

    /// `DeclaringType.name`, the form configuration tools persist.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.declaring_type, self.name)
    }

    /// Match against a plain `name` or a qualified `DeclaringType.name`.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        if self.name == name {
            return true;
        }
        match name.rsplit_once('.') {
            Some((ty, member)) => ty == self.declaring_type && member == self.name,
            None => false,
        }
    }
}

impl From<MemberInfo> for BindableMember {
    fn from(info: MemberInfo) -> Self {
        Self {
            declaring_type: info.declaring_type,
            name: info.name,
            member_type: info.member_type,
            access: info.access,
        }
    }
}

/// Capability a host object implements to take part in bindings.
///
/// Views implement properties and events; view-models implement properties
/// and, optionally, [`subscribe_property_changed`](Self::subscribe_property_changed).
pub trait Bindable {
    /// Name reported in diagnostics.
    fn type_name(&self) -> &'static str;

    /// Append every property (bindable or not) to `out`.
    fn list_properties(&self, out: &mut Vec<MemberInfo>);

    /// Append every event (bindable or not) to `out`.
    fn list_events(&self, out: &mut Vec<MemberInfo>);

    /// Current value of `name`, or `None` if there is no such property.
    fn get_property(&self, name: &str) -> Option<Value>;

    /// Write `value` into `name`.
    ///
    /// Errors raised by change handlers triggered by the write are returned
    /// here as well.
    fn set_property(&self, name: &str, value: Value) -> Result<(), BindError>;

    /// Subscribe to the event `name`. `None` when there is no such event.
    fn subscribe_event(&self, name: &str, handler: EventHandler) -> Option<Subscription>;

    /// Subscribe to property-change notifications. `None` when unsupported.
    fn subscribe_property_changed(&self, handler: ChangeHandler) -> Option<Subscription> {
        let _ = handler;
        None
    }
}
