#![forbid(unsafe_code)]

//! Error taxonomy for binding configuration and live synchronization.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | [`ConfigurationError`] | Missing member, type mismatch, unknown adapter | Fatal at bind; binding stays unbound |
//! | [`ConversionError`] | Adapter rejected a value during a push | Channeled to the exception property, else propagated |
//! | [`PropertyError`] | Host refused a get/set at runtime | Propagated to the caller |
//! | Empty discovery | Nothing marked bindable | Empty `Vec`, not an error |

use core::fmt;

use crate::value::{ErrorValue, ValueType};

/// Which kind of member a lookup was after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Property,
    Event,
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Property => write!(f, "property"),
            Self::Event => write!(f, "event"),
        }
    }
}

/// A binding that cannot be activated as configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// No bindable member with this name exists on the object.
    MissingMember {
        type_name: String,
        member: String,
        kind: MemberKind,
    },
    /// The member exists but lacks a required access (`"readable"`, `"writable"`).
    AccessDenied {
        type_name: String,
        member: String,
        required: &'static str,
    },
    /// An adapter endpoint or member type does not line up.
    TypeMismatch {
        context: String,
        expected: ValueType,
        found: ValueType,
    },
    /// A non-empty adapter id that the registry does not know.
    UnknownAdapter { id: String },
    /// Two adapters registered under the same id.
    DuplicateAdapter { id: String },
    /// Exception property and exception adapter must be configured together.
    ExceptionChannel { reason: &'static str },
    /// One-way bindings never write the view-model, so they take no view-model adapter.
    OneWayAdapter { id: String },
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingMember {
                type_name,
                member,
                kind,
            } => write!(f, "no bindable {kind} '{member}' on '{type_name}'"),
            Self::AccessDenied {
                type_name,
                member,
                required,
            } => write!(f, "'{type_name}.{member}' must be {required}"),
            Self::TypeMismatch {
                context,
                expected,
                found,
            } => write!(f, "{context}: expected {expected}, found {found}"),
            Self::UnknownAdapter { id } => write!(f, "unknown adapter '{id}'"),
            Self::DuplicateAdapter { id } => write!(f, "adapter '{id}' registered twice"),
            Self::ExceptionChannel { reason } => write!(f, "exception channel: {reason}"),
            Self::OneWayAdapter { id } => {
                write!(f, "one-way binding cannot use view-model adapter '{id}'")
            }
        }
    }
}

impl std::error::Error for ConfigurationError {}

/// An adapter failed to convert a value during a live push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionError {
    pub message: String,
    pub adapter_id: Option<String>,
}

impl ConversionError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            adapter_id: None,
        }
    }

    /// Failure raised when an adapter receives a value of the wrong type.
    #[must_use]
    pub fn unexpected_input(expected: ValueType, found: ValueType) -> Self {
        Self::new(format!("expected {expected} input, found {found}"))
    }

    /// Attach the id of the adapter that failed.
    #[must_use]
    pub fn with_adapter(mut self, id: impl Into<String>) -> Self {
        self.adapter_id = Some(id.into());
        self
    }

    /// Reify this failure as a value for an exception adapter.
    #[must_use]
    pub fn to_error_value(&self) -> ErrorValue {
        ErrorValue {
            message: self.message.clone(),
            adapter_id: self.adapter_id.clone(),
        }
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.adapter_id {
            Some(id) => write!(f, "adapter '{id}' failed: {}", self.message),
            None => write!(f, "conversion failed: {}", self.message),
        }
    }
}

impl std::error::Error for ConversionError {}

/// Why a host refused a property access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyFault {
    Missing,
    /// The member named is an event, and no such event exists.
    MissingEvent,
    ReadOnly,
    TypeMismatch { expected: ValueType, found: ValueType },
}

/// A host object refused a property read or write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyError {
    pub type_name: String,
    pub property: String,
    pub fault: PropertyFault,
}

impl PropertyError {
    #[must_use]
    pub fn new(type_name: impl Into<String>, property: impl Into<String>, fault: PropertyFault) -> Self {
        Self {
            type_name: type_name.into(),
            property: property.into(),
            fault,
        }
    }
}

impl fmt::Display for PropertyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let target = format!("{}.{}", self.type_name, self.property);
        match &self.fault {
            PropertyFault::Missing => write!(f, "no property '{target}'"),
            PropertyFault::MissingEvent => write!(f, "no event '{target}'"),
            PropertyFault::ReadOnly => write!(f, "property '{target}' is read-only"),
            PropertyFault::TypeMismatch { expected, found } => {
                write!(f, "property '{target}' holds {expected}, got {found}")
            }
        }
    }
}

impl std::error::Error for PropertyError {}

/// Any error surfaced by binding activation or a live push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    Configuration(ConfigurationError),
    Conversion(ConversionError),
    Property(PropertyError),
}

impl BindError {
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    #[must_use]
    pub const fn is_conversion(&self) -> bool {
        matches!(self, Self::Conversion(_))
    }
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(e) => write!(f, "configuration error: {e}"),
            Self::Conversion(e) => write!(f, "{e}"),
            Self::Property(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for BindError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Configuration(e) => Some(e),
            Self::Conversion(e) => Some(e),
            Self::Property(e) => Some(e),
        }
    }
}

impl From<ConfigurationError> for BindError {
    fn from(e: ConfigurationError) -> Self {
        Self::Configuration(e)
    }
}

impl From<ConversionError> for BindError {
    fn from(e: ConversionError) -> Self {
        Self::Conversion(e)
    }
}

impl From<PropertyError> for BindError {
    fn from(e: PropertyError) -> Self {
        Self::Property(e)
    }
}
