#![forbid(unsafe_code)]

//! Stock adapters installed in the global registry.
//!
//! | Id | In | Out | Options |
//! |----|----|-----|---------|
//! | `bool-to-color` | bool | color | `true_color`, `false_color` |
//! | `bool-to-text` | bool | text | `true_text`, `false_text` |
//! | `bool-negate` | bool | bool | |
//! | `int-to-text` | int | text | |
//! | `text-to-int` | text | int | |
//! | `float-to-text` | float | text | `precision` |
//! | `text-to-float` | text | float | |
//! | `error-to-text` | error | text | |

use std::sync::Arc;

use tether_core::{ConversionError, Rgba, Value, ValueType};

use crate::adapter::{Adapter, AdapterDescriptor};
use crate::options::AdapterOptions;

pub const BOOL_TO_COLOR: &str = "bool-to-color";
pub const BOOL_TO_TEXT: &str = "bool-to-text";
pub const BOOL_NEGATE: &str = "bool-negate";
pub const INT_TO_TEXT: &str = "int-to-text";
pub const TEXT_TO_INT: &str = "text-to-int";
pub const FLOAT_TO_TEXT: &str = "float-to-text";
pub const TEXT_TO_FLOAT: &str = "text-to-float";
pub const ERROR_TO_TEXT: &str = "error-to-text";

/// Every stock adapter, ready for registration.
#[must_use]
pub fn adapters() -> Vec<Arc<dyn Adapter>> {
    vec![
        Arc::new(BoolToColor::new()),
        Arc::new(BoolToText::new()),
        Arc::new(BoolNegate::new()),
        Arc::new(IntToText::new()),
        Arc::new(TextToInt::new()),
        Arc::new(FloatToText::new()),
        Arc::new(TextToFloat::new()),
        Arc::new(ErrorToText::new()),
    ]
}

fn mismatch(expected: ValueType, value: &Value) -> ConversionError {
    ConversionError::unexpected_input(expected, value.value_type())
}

#[derive(Debug)]
pub struct BoolToColor {
    descriptor: AdapterDescriptor,
}

impl BoolToColor {
    pub const TRUE_COLOR: &'static str = "true_color";
    pub const FALSE_COLOR: &'static str = "false_color";

    #[must_use]
    pub fn new() -> Self {
        Self {
            descriptor: AdapterDescriptor::new(BOOL_TO_COLOR, ValueType::Bool, ValueType::Color)
                .with_options("BoolToColorOptions"),
        }
    }
}

impl Default for BoolToColor {
    fn default() -> Self {
        Self::new()
    }
}

impl Adapter for BoolToColor {
    fn descriptor(&self) -> &AdapterDescriptor {
        &self.descriptor
    }

    fn default_options(&self) -> Option<AdapterOptions> {
        Some(
            AdapterOptions::new(BOOL_TO_COLOR)
                .with(Self::TRUE_COLOR, Rgba::GREEN)
                .with(Self::FALSE_COLOR, Rgba::RED),
        )
    }

    fn convert(&self, value: Value, options: Option<&AdapterOptions>) -> Result<Value, ConversionError> {
        let flag = value.as_bool().ok_or_else(|| mismatch(ValueType::Bool, &value))?;
        let (key, fallback) = if flag {
            (Self::TRUE_COLOR, Rgba::GREEN)
        } else {
            (Self::FALSE_COLOR, Rgba::RED)
        };
        let color = options.and_then(|o| o.get_color(key)).unwrap_or(fallback);
        Ok(Value::Color(color))
    }
}

#[derive(Debug)]
pub struct BoolToText {
    descriptor: AdapterDescriptor,
}

impl BoolToText {
    pub const TRUE_TEXT: &'static str = "true_text";
    pub const FALSE_TEXT: &'static str = "false_text";

    #[must_use]
    pub fn new() -> Self {
        Self {
            descriptor: AdapterDescriptor::new(BOOL_TO_TEXT, ValueType::Bool, ValueType::Text)
                .with_options("BoolToTextOptions"),
        }
    }
}

impl Default for BoolToText {
    fn default() -> Self {
        Self::new()
    }
}

impl Adapter for BoolToText {
    fn descriptor(&self) -> &AdapterDescriptor {
        &self.descriptor
    }

    fn default_options(&self) -> Option<AdapterOptions> {
        Some(
            AdapterOptions::new(BOOL_TO_TEXT)
                .with(Self::TRUE_TEXT, "true")
                .with(Self::FALSE_TEXT, "false"),
        )
    }

    fn convert(&self, value: Value, options: Option<&AdapterOptions>) -> Result<Value, ConversionError> {
        let flag = value.as_bool().ok_or_else(|| mismatch(ValueType::Bool, &value))?;
        let (key, fallback) = if flag {
            (Self::TRUE_TEXT, "true")
        } else {
            (Self::FALSE_TEXT, "false")
        };
        let text = options.and_then(|o| o.get_text(key)).unwrap_or(fallback);
        Ok(Value::from(text))
    }
}

#[derive(Debug)]
pub struct BoolNegate {
    descriptor: AdapterDescriptor,
}

impl BoolNegate {
    #[must_use]
    pub fn new() -> Self {
        Self {
            descriptor: AdapterDescriptor::new(BOOL_NEGATE, ValueType::Bool, ValueType::Bool),
        }
    }
}

impl Default for BoolNegate {
    fn default() -> Self {
        Self::new()
    }
}

impl Adapter for BoolNegate {
    fn descriptor(&self) -> &AdapterDescriptor {
        &self.descriptor
    }

    fn convert(&self, value: Value, _options: Option<&AdapterOptions>) -> Result<Value, ConversionError> {
        let flag = value.as_bool().ok_or_else(|| mismatch(ValueType::Bool, &value))?;
        Ok(Value::Bool(!flag))
    }
}

#[derive(Debug)]
pub struct IntToText {
    descriptor: AdapterDescriptor,
}

impl IntToText {
    #[must_use]
    pub fn new() -> Self {
        Self {
            descriptor: AdapterDescriptor::new(INT_TO_TEXT, ValueType::Int, ValueType::Text),
        }
    }
}

impl Default for IntToText {
    fn default() -> Self {
        Self::new()
    }
}

impl Adapter for IntToText {
    fn descriptor(&self) -> &AdapterDescriptor {
        &self.descriptor
    }

    fn convert(&self, value: Value, _options: Option<&AdapterOptions>) -> Result<Value, ConversionError> {
        let n = value.as_int().ok_or_else(|| mismatch(ValueType::Int, &value))?;
        Ok(Value::Text(n.to_string()))
    }
}

#[derive(Debug)]
pub struct TextToInt {
    descriptor: AdapterDescriptor,
}

impl TextToInt {
    #[must_use]
    pub fn new() -> Self {
        Self {
            descriptor: AdapterDescriptor::new(TEXT_TO_INT, ValueType::Text, ValueType::Int),
        }
    }
}

impl Default for TextToInt {
    fn default() -> Self {
        Self::new()
    }
}

impl Adapter for TextToInt {
    fn descriptor(&self) -> &AdapterDescriptor {
        &self.descriptor
    }

    fn convert(&self, value: Value, _options: Option<&AdapterOptions>) -> Result<Value, ConversionError> {
        let text = value.as_text().ok_or_else(|| mismatch(ValueType::Text, &value))?;
        text.trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| ConversionError::new(format!("'{text}' is not an integer")))
    }
}

#[derive(Debug)]
pub struct FloatToText {
    descriptor: AdapterDescriptor,
}

impl FloatToText {
    /// Digits after the decimal point. Negative or absent means shortest form.
    pub const PRECISION: &'static str = "precision";

    #[must_use]
    pub fn new() -> Self {
        Self {
            descriptor: AdapterDescriptor::new(FLOAT_TO_TEXT, ValueType::Float, ValueType::Text)
                .with_options("FloatToTextOptions"),
        }
    }
}

impl Default for FloatToText {
    fn default() -> Self {
        Self::new()
    }
}

impl Adapter for FloatToText {
    fn descriptor(&self) -> &AdapterDescriptor {
        &self.descriptor
    }

    fn default_options(&self) -> Option<AdapterOptions> {
        Some(AdapterOptions::new(FLOAT_TO_TEXT).with(Self::PRECISION, -1))
    }

    fn convert(&self, value: Value, options: Option<&AdapterOptions>) -> Result<Value, ConversionError> {
        let v = value.as_float().ok_or_else(|| mismatch(ValueType::Float, &value))?;
        let precision = options
            .and_then(|o| o.get_int(Self::PRECISION))
            .and_then(|p| usize::try_from(p).ok());
        let text = match precision {
            Some(p) => format!("{v:.p$}"),
            None => v.to_string(),
        };
        Ok(Value::Text(text))
    }
}

#[derive(Debug)]
pub struct TextToFloat {
    descriptor: AdapterDescriptor,
}

impl TextToFloat {
    #[must_use]
    pub fn new() -> Self {
        Self {
            descriptor: AdapterDescriptor::new(TEXT_TO_FLOAT, ValueType::Text, ValueType::Float),
        }
    }
}

impl Default for TextToFloat {
    fn default() -> Self {
        Self::new()
    }
}

impl Adapter for TextToFloat {
    fn descriptor(&self) -> &AdapterDescriptor {
        &self.descriptor
    }

    fn convert(&self, value: Value, _options: Option<&AdapterOptions>) -> Result<Value, ConversionError> {
        let text = value.as_text().ok_or_else(|| mismatch(ValueType::Text, &value))?;
        text.trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| ConversionError::new(format!("'{text}' is not a number")))
    }
}

/// Exception adapter: turns a conversion failure into its message.
#[derive(Debug)]
pub struct ErrorToText {
    descriptor: AdapterDescriptor,
}

impl ErrorToText {
    #[must_use]
    pub fn new() -> Self {
        Self {
            descriptor: AdapterDescriptor::new(ERROR_TO_TEXT, ValueType::Error, ValueType::Text),
        }
    }
}

impl Default for ErrorToText {
    fn default() -> Self {
        Self::new()
    }
}

impl Adapter for ErrorToText {
    fn descriptor(&self) -> &AdapterDescriptor {
        &self.descriptor
    }

    fn convert(&self, value: Value, _options: Option<&AdapterOptions>) -> Result<Value, ConversionError> {
        let err = value.as_error().ok_or_else(|| mismatch(ValueType::Error, &value))?;
        Ok(Value::Text(err.message.clone()))
    }
}
