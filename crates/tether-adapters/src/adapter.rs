#![forbid(unsafe_code)]

//! The adapter contract.

use core::fmt;

use tether_core::{ConversionError, Value, ValueType};

use crate::options::AdapterOptions;

/// Static description of an adapter. Immutable once registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterDescriptor {
    pub id: String,
    pub in_type: ValueType,
    pub out_type: ValueType,
    /// Name of the options type this adapter reads, if any.
    pub options_type: Option<&'static str>,
}

impl AdapterDescriptor {
    #[must_use]
    pub fn new(id: impl Into<String>, in_type: ValueType, out_type: ValueType) -> Self {
        Self {
            id: id.into(),
            in_type,
            out_type,
            options_type: None,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options_type: &'static str) -> Self {
        self.options_type = Some(options_type);
        self
    }
}

impl fmt::Display for AdapterDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} -> {})", self.id, self.in_type, self.out_type)
    }
}

/// A pure converter between two value types.
///
/// Implementations must not block and must not keep state across calls.
pub trait Adapter: Send + Sync {
    fn descriptor(&self) -> &AdapterDescriptor;

    /// Options a binding starts with when it selects this adapter.
    fn default_options(&self) -> Option<AdapterOptions> {
        None
    }

    /// Convert `value`. Only called with values of the declared input type.
    fn convert(
        &self,
        value: Value,
        options: Option<&AdapterOptions>,
    ) -> Result<Value, ConversionError>;

    /// Check the input type, convert, and tag any failure with this
    /// adapter's id.
    fn apply(
        &self,
        value: Value,
        options: Option<&AdapterOptions>,
    ) -> Result<Value, ConversionError> {
        let desc = self.descriptor();
        let result = if value.value_type() == desc.in_type {
            self.convert(value, options)
        } else {
            Err(ConversionError::unexpected_input(
                desc.in_type,
                value.value_type(),
            ))
        };
        result.map_err(|err| match err.adapter_id {
            Some(_) => err,
            None => err.with_adapter(desc.id.clone()),
        })
    }
}

impl fmt::Debug for dyn Adapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Adapter").field(self.descriptor()).finish()
    }
}

type ConvertFn =
    dyn Fn(Value, Option<&AdapterOptions>) -> Result<Value, ConversionError> + Send + Sync;

/// Adapter backed by a closure, for host-specific converters.
pub struct FnAdapter {
    descriptor: AdapterDescriptor,
    defaults: Option<AdapterOptions>,
    convert: Box<ConvertFn>,
}

impl FnAdapter {
    #[must_use]
    pub fn new(
        descriptor: AdapterDescriptor,
        convert: impl Fn(Value, Option<&AdapterOptions>) -> Result<Value, ConversionError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            descriptor,
            defaults: None,
            convert: Box::new(convert),
        }
    }

    /// Default options handed to bindings that select this adapter.
    #[must_use]
    pub fn with_defaults(mut self, defaults: AdapterOptions) -> Self {
        self.defaults = Some(defaults);
        self
    }
}

impl Adapter for FnAdapter {
    fn descriptor(&self) -> &AdapterDescriptor {
        &self.descriptor
    }

    fn default_options(&self) -> Option<AdapterOptions> {
        self.defaults.clone()
    }

    fn convert(
        &self,
        value: Value,
        options: Option<&AdapterOptions>,
    ) -> Result<Value, ConversionError> {
        (self.convert)(value, options)
    }
}

impl fmt::Debug for FnAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnAdapter")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}
