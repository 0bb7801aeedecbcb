#![forbid(unsafe_code)]

//! Binding configuration records.
//!
//! A [`BindingConfig`] is plain data: member names and adapter ids are
//! strings, resolved against the live objects only when the binding is
//! activated. Stale names are caught at bind time, never here.

use tether_adapters::{AdapterOptions, AdapterRegistry};

/// Direction(s) a binding synchronizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BindingMode {
    /// View-model changes reach the view and view edits reach the view-model.
    #[default]
    TwoWay,
    /// Only view-model changes reach the view. No view event is observed.
    OneWay,
}

/// Configuration of one view/view-model link.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BindingConfig {
    /// View event signalling a user edit.
    pub view_event_name: String,
    pub view_property_name: String,
    /// Adapter from view-model value to view value. Empty means identity.
    pub view_adapter_id: String,
    pub view_adapter_options: Option<AdapterOptions>,
    pub view_model_property_name: String,
    /// Adapter from view value to view-model value. Empty means identity.
    pub view_model_adapter_id: String,
    pub view_model_adapter_options: Option<AdapterOptions>,
    /// View-model property receiving converted conversion failures.
    pub exception_property_name: String,
    pub exception_adapter_id: String,
    pub exception_adapter_options: Option<AdapterOptions>,
    pub mode: BindingMode,
}

impl BindingConfig {
    /// Two-way link between `view_property` and `view_model_property`, with
    /// view edits signalled by `view_event`.
    #[must_use]
    pub fn two_way(
        view_event: impl Into<String>,
        view_property: impl Into<String>,
        view_model_property: impl Into<String>,
    ) -> Self {
        Self {
            view_event_name: view_event.into(),
            view_property_name: view_property.into(),
            view_model_property_name: view_model_property.into(),
            ..Self::default()
        }
    }

    /// One-way link pushing `view_model_property` into `view_property`.
    #[must_use]
    pub fn one_way(view_property: impl Into<String>, view_model_property: impl Into<String>) -> Self {
        Self {
            view_property_name: view_property.into(),
            view_model_property_name: view_model_property.into(),
            mode: BindingMode::OneWay,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_view_adapter(mut self, id: impl Into<String>, options: Option<AdapterOptions>) -> Self {
        self.view_adapter_id = id.into();
        self.view_adapter_options = options;
        self
    }

    #[must_use]
    pub fn with_view_model_adapter(
        mut self,
        id: impl Into<String>,
        options: Option<AdapterOptions>,
    ) -> Self {
        self.view_model_adapter_id = id.into();
        self.view_model_adapter_options = options;
        self
    }

    #[must_use]
    pub fn with_exception(
        mut self,
        property: impl Into<String>,
        adapter_id: impl Into<String>,
        options: Option<AdapterOptions>,
    ) -> Self {
        self.exception_property_name = property.into();
        self.exception_adapter_id = adapter_id.into();
        self.exception_adapter_options = options;
        self
    }

    /// Select the view adapter. When the id changes the options are
    /// replaced wholesale by the new adapter's defaults.
    pub fn set_view_adapter(&mut self, id: &str, registry: &AdapterRegistry) {
        swap_adapter(
            &mut self.view_adapter_id,
            &mut self.view_adapter_options,
            id,
            registry,
        );
    }

    /// Select the view-model adapter, replacing options on change.
    pub fn set_view_model_adapter(&mut self, id: &str, registry: &AdapterRegistry) {
        swap_adapter(
            &mut self.view_model_adapter_id,
            &mut self.view_model_adapter_options,
            id,
            registry,
        );
    }

    /// Select the exception adapter, replacing options on change.
    pub fn set_exception_adapter(&mut self, id: &str, registry: &AdapterRegistry) {
        swap_adapter(
            &mut self.exception_adapter_id,
            &mut self.exception_adapter_options,
            id,
            registry,
        );
    }

    /// Whether any part of an exception channel is configured. Binding
    /// fails unless both the property and the adapter are set.
    #[must_use]
    pub fn has_exception_channel(&self) -> bool {
        !self.exception_property_name.is_empty() || !self.exception_adapter_id.is_empty()
    }

    /// `view.property <-> view_model.property`, for diagnostics.
    #[must_use]
    pub fn describe(&self) -> String {
        let arrow = match self.mode {
            BindingMode::TwoWay => "<->",
            BindingMode::OneWay => "<-",
        };
        format!(
            "{} {arrow} {}",
            self.view_property_name, self.view_model_property_name
        )
    }
}

fn swap_adapter(
    id_slot: &mut String,
    options_slot: &mut Option<AdapterOptions>,
    id: &str,
    registry: &AdapterRegistry,
) {
    if id_slot.as_str() == id {
        return;
    }
    id.clone_into(id_slot);
    *options_slot = if id.is_empty() {
        None
    } else {
        registry.default_options(id)
    };
}

#[cfg(feature = "config")]
pub use sheet::{BindingSheet, NamedBinding, SheetError};

#[cfg(feature = "config")]
mod sheet {
    use std::fmt;
    use std::path::Path;

    use super::BindingConfig;

    /// Error loading a [`BindingSheet`].
    #[derive(Debug)]
    pub enum SheetError {
        Io(std::io::Error),
        Toml(toml::de::Error),
        Json(serde_json::Error),
        /// File extension is neither `.toml` nor `.json`.
        UnsupportedFormat(String),
        DuplicateName(String),
    }

    impl fmt::Display for SheetError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Self::Io(e) => write!(f, "failed to read binding sheet: {e}"),
                Self::Toml(e) => write!(f, "invalid TOML binding sheet: {e}"),
                Self::Json(e) => write!(f, "invalid JSON binding sheet: {e}"),
                Self::UnsupportedFormat(ext) => {
                    write!(f, "unsupported binding sheet format '{ext}'")
                }
                Self::DuplicateName(name) => write!(f, "binding '{name}' declared twice"),
            }
        }
    }

    impl std::error::Error for SheetError {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            match self {
                Self::Io(e) => Some(e),
                Self::Toml(e) => Some(e),
                Self::Json(e) => Some(e),
                Self::UnsupportedFormat(_) | Self::DuplicateName(_) => None,
            }
        }
    }

    impl From<std::io::Error> for SheetError {
        fn from(e: std::io::Error) -> Self {
            Self::Io(e)
        }
    }

    /// A binding record with the name it is declared under.
    #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
    pub struct NamedBinding {
        pub name: String,
        #[serde(flatten)]
        pub config: BindingConfig,
    }

    /// A list of named binding records, as persisted by tooling.
    ///
    /// ```toml
    /// [[binding]]
    /// name = "online"
    /// view_property_name = "tint"
    /// view_model_property_name = "online"
    /// view_adapter_id = "bool-to-color"
    /// mode = "one_way"
    /// ```
    #[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
    pub struct BindingSheet {
        #[serde(default, rename = "binding")]
        pub bindings: Vec<NamedBinding>,
    }

    impl BindingSheet {
        /// Parse a TOML sheet.
        pub fn from_toml_str(text: &str) -> Result<Self, SheetError> {
            let sheet: Self = toml::from_str(text).map_err(SheetError::Toml)?;
            sheet.validated()
        }

        /// Parse a JSON sheet.
        pub fn from_json_str(text: &str) -> Result<Self, SheetError> {
            let sheet: Self = serde_json::from_str(text).map_err(SheetError::Json)?;
            sheet.validated()
        }

        /// Load a sheet, picking the format from the file extension.
        pub fn load(path: impl AsRef<Path>) -> Result<Self, SheetError> {
            let path = path.as_ref();
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or_default()
                .to_ascii_lowercase();
            let text = std::fs::read_to_string(path)?;
            match ext.as_str() {
                "toml" => Self::from_toml_str(&text),
                "json" => Self::from_json_str(&text),
                _ => Err(SheetError::UnsupportedFormat(ext)),
            }
        }

        /// Serialize as pretty JSON.
        pub fn to_json_string(&self) -> Result<String, SheetError> {
            serde_json::to_string_pretty(self).map_err(SheetError::Json)
        }

        #[must_use]
        pub fn get(&self, name: &str) -> Option<&BindingConfig> {
            self.bindings
                .iter()
                .find(|b| b.name == name)
                .map(|b| &b.config)
        }

        #[must_use]
        pub fn len(&self) -> usize {
            self.bindings.len()
        }

        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.bindings.is_empty()
        }

        fn validated(self) -> Result<Self, SheetError> {
            let mut seen = std::collections::HashSet::new();
            for b in &self.bindings {
                if !seen.insert(b.name.as_str()) {
                    return Err(SheetError::DuplicateName(b.name.clone()));
                }
            }
            Ok(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_adapters::builtin;

    #[test]
    fn two_way_defaults() {
        let config = BindingConfig::two_way("changed", "text", "name");
        assert_eq!(config.mode, BindingMode::TwoWay);
        assert!(config.view_adapter_id.is_empty());
        assert!(!config.has_exception_channel());
        assert_eq!(config.describe(), "text <-> name");
    }

    #[test]
    fn exception_channel_reported_when_half_configured() {
        let config = BindingConfig::two_way("changed", "text", "name");
        assert!(config.clone().with_exception("problem", "", None).has_exception_channel());
        assert!(
            config
                .clone()
                .with_exception("", builtin::ERROR_TO_TEXT, None)
                .has_exception_channel()
        );
        assert!(
            config
                .with_exception("problem", builtin::ERROR_TO_TEXT, None)
                .has_exception_channel()
        );
    }

    #[test]
    fn changing_adapter_replaces_options() {
        let registry = AdapterRegistry::builtin();
        let mut config = BindingConfig::one_way("tint", "online");
        config.set_view_adapter(builtin::BOOL_TO_COLOR, &registry);
        let opts = config.view_adapter_options.clone().unwrap();
        assert!(opts.is_for(builtin::BOOL_TO_COLOR));

        config.set_view_adapter(builtin::BOOL_TO_TEXT, &registry);
        let opts = config.view_adapter_options.clone().unwrap();
        assert!(opts.is_for(builtin::BOOL_TO_TEXT));
        assert!(opts.get(builtin::BoolToText::TRUE_TEXT).is_some());

        config.set_view_adapter("", &registry);
        assert!(config.view_adapter_options.is_none());
    }

    #[test]
    fn reselecting_same_adapter_keeps_options() {
        let registry = AdapterRegistry::builtin();
        let custom = AdapterOptions::new(builtin::BOOL_TO_TEXT).with(builtin::BoolToText::TRUE_TEXT, "on");
        let mut config = BindingConfig::one_way("label", "online")
            .with_view_adapter(builtin::BOOL_TO_TEXT, Some(custom.clone()));
        config.set_view_adapter(builtin::BOOL_TO_TEXT, &registry);
        assert_eq!(config.view_adapter_options, Some(custom));
    }
}
