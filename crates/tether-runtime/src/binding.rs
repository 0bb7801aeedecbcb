#![forbid(unsafe_code)]

//! The view/view-model binding state machine.
//!
//! A [`Binding`] links one view property to one view-model property through
//! optional adapters. It starts [`Unbound`](BindingState::Unbound);
//! [`bind`](Binding::bind) resolves every name and adapter, subscribes to
//! both sides, and pushes the view-model value into the view once.
//!
//! # Invariants
//!
//! 1. Adapter endpoints match the member types exactly; an empty adapter id
//!    requires the member types to be equal.
//! 2. A failed `bind` leaves the binding `Unbound` with no live subscriptions.
//! 3. While the binding writes into the view, view events are ignored, so a
//!    view that raises its edit event on programmatic writes cannot echo the
//!    value back into the view-model.
//! 4. After the initial push, a view-model notification only writes the view
//!    when the converted value differs from what the view already holds.
//! 5. `unbind` is idempotent, and dropping a `Binding` unbinds it.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Stale member name | Renamed property or event | `bind` returns `ConfigurationError` |
//! | View-model adapter fails | Bad user input | Exception property written, or error propagates |
//! | View adapter fails | Unexpected view-model value | Error propagates to the notifier |
//! | Exception adapter fails | Broken exception adapter | Error propagates to the event raiser |

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use tether_adapters::{Adapter, AdapterOptions, AdapterRegistry, options_for};
use tether_core::{
    BindError, Bindable, BindableMember, ConfigurationError, ConversionError, MemberCatalog,
    MemberKind, PropertyError, PropertyFault, Subscription, Value, ValueType,
};
use tracing::{debug, trace, warn};

use crate::config::{BindingConfig, BindingMode};

/// Activation state of a [`Binding`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingState {
    Unbound,
    Bound,
}

/// An activatable link between a view member and a view-model member.
pub struct Binding {
    config: BindingConfig,
    view: Rc<dyn Bindable>,
    view_model: Rc<dyn Bindable>,
    registry: Arc<AdapterRegistry>,
    active: Option<Active>,
}

/// Everything that only exists while bound. Dropping it unsubscribes.
struct Active {
    link: Rc<Link>,
    _view_event: Option<Subscription>,
    _view_model_changes: Option<Subscription>,
}

/// A resolved adapter plus the options it runs with.
struct Stage {
    adapter: Option<Arc<dyn Adapter>>,
    options: Option<AdapterOptions>,
}

impl Stage {
    fn apply(&self, value: Value) -> Result<Value, ConversionError> {
        match &self.adapter {
            Some(adapter) => adapter.apply(value, self.options.as_ref()),
            None => Ok(value),
        }
    }
}

struct ExceptionChannel {
    property: String,
    stage: Stage,
}

/// Resolved binding, shared with the subscription callbacks.
struct Link {
    view: Rc<dyn Bindable>,
    view_model: Rc<dyn Bindable>,
    view_event: Option<String>,
    view_property: String,
    view_model_property: String,
    to_view: Stage,
    to_view_model: Stage,
    exception: Option<ExceptionChannel>,
    pushing: Cell<bool>,
}

/// Clears the pushing flag on scope exit, including on error.
struct PushGuard<'a>(&'a Cell<bool>);

impl<'a> PushGuard<'a> {
    fn engage(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for PushGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl Link {
    fn read(obj: &dyn Bindable, property: &str) -> Result<Value, BindError> {
        obj.get_property(property).ok_or_else(|| {
            PropertyError::new(obj.type_name(), property, PropertyFault::Missing).into()
        })
    }

    /// View-model -> view. `force` writes even when the view already holds
    /// the converted value.
    fn push_to_view(&self, force: bool) -> Result<(), BindError> {
        let source = Self::read(self.view_model.as_ref(), &self.view_model_property)?;
        let converted = self.to_view.apply(source)?;
        if !force
            && self
                .view
                .get_property(&self.view_property)
                .is_some_and(|current| current == converted)
        {
            trace!(property = %self.view_property, "view already up to date");
            return Ok(());
        }
        trace!(property = %self.view_property, value = %converted, "push to view");
        let _guard = PushGuard::engage(&self.pushing);
        self.view.set_property(&self.view_property, converted)
    }

    /// View -> view-model, taking the exception path on conversion failure.
    fn push_to_view_model(&self) -> Result<(), BindError> {
        if self.pushing.get() {
            trace!(property = %self.view_property, "suppressed echo of view write");
            return Ok(());
        }
        let source = Self::read(self.view.as_ref(), &self.view_property)?;
        match self.to_view_model.apply(source) {
            Ok(converted) => {
                trace!(property = %self.view_model_property, value = %converted, "push to view-model");
                self.view_model
                    .set_property(&self.view_model_property, converted)
            }
            Err(err) => self.channel(err),
        }
    }

    fn channel(&self, err: ConversionError) -> Result<(), BindError> {
        let Some(exception) = &self.exception else {
            return Err(err.into());
        };
        warn!(
            property = %exception.property,
            error = %err,
            "conversion failed, writing exception property"
        );
        let reported = exception.stage.apply(Value::Error(err.to_error_value()))?;
        self.view_model.set_property(&exception.property, reported)
    }

    fn on_view_model_changed(&self, property: &str) -> Result<(), BindError> {
        if property == self.view_model_property {
            self.push_to_view(false)
        } else {
            Ok(())
        }
    }
}

impl Binding {
    /// New unbound binding resolving adapters against the global registry
    /// as installed right now.
    #[must_use]
    pub fn new(config: BindingConfig, view: Rc<dyn Bindable>, view_model: Rc<dyn Bindable>) -> Self {
        Self::with_registry(config, view, view_model, AdapterRegistry::global())
    }

    /// New unbound binding resolving adapters against `registry`.
    #[must_use]
    pub fn with_registry(
        config: BindingConfig,
        view: Rc<dyn Bindable>,
        view_model: Rc<dyn Bindable>,
        registry: Arc<AdapterRegistry>,
    ) -> Self {
        Self {
            config,
            view,
            view_model,
            registry,
            active: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &BindingConfig {
        &self.config
    }

    /// Replace the configuration. Takes effect on the next `bind`.
    pub fn set_config(&mut self, config: BindingConfig) {
        self.config = config;
    }

    #[must_use]
    pub fn state(&self) -> BindingState {
        if self.active.is_some() {
            BindingState::Bound
        } else {
            BindingState::Unbound
        }
    }

    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.active.is_some()
    }

    /// Resolve, subscribe, and push the view-model value into the view.
    ///
    /// Binding an already bound binding does nothing.
    ///
    /// # Errors
    ///
    /// [`BindError::Configuration`] for a stale name, an access or type
    /// mismatch, or an unknown adapter. Errors from the initial push are
    /// returned as well. On any error the binding stays unbound.
    pub fn bind(&mut self) -> Result<(), BindError> {
        if self.active.is_some() {
            debug!(binding = %self.config.describe(), "already bound");
            return Ok(());
        }
        let link = Rc::new(self.resolve()?);

        let view_event = match &link.view_event {
            Some(event) => {
                let weak = Rc::downgrade(&link);
                let sub = self
                    .view
                    .subscribe_event(
                        event,
                        Box::new(move || {
                            weak.upgrade()
                                .map_or(Ok(()), |link| link.push_to_view_model())
                        }),
                    )
                    .ok_or_else(|| missing(self.view.as_ref(), event, MemberKind::Event))?;
                Some(sub)
            }
            None => None,
        };

        let weak = Rc::downgrade(&link);
        let view_model_changes = self.view_model.subscribe_property_changed(Box::new(move |name| {
            weak.upgrade()
                .map_or(Ok(()), |link| link.on_view_model_changed(name))
        }));
        if view_model_changes.is_none() {
            debug!(
                view_model = self.view_model.type_name(),
                "view-model has no change notification; pushes are manual"
            );
        }

        // Subscriptions drop with `active` if the initial push fails.
        let active = Active {
            link,
            _view_event: view_event,
            _view_model_changes: view_model_changes,
        };
        active.link.push_to_view(true)?;
        self.active = Some(active);
        debug!(binding = %self.config.describe(), "bound");
        Ok(())
    }

    /// Drop both subscriptions. Unbinding an unbound binding does nothing.
    pub fn unbind(&mut self) {
        if self.active.take().is_some() {
            debug!(binding = %self.config.describe(), "unbound");
        }
    }

    /// Push the current view-model value into the view.
    ///
    /// Skips the write when the view already holds the converted value. An
    /// unbound binding does nothing.
    pub fn push_to_view(&self) -> Result<(), BindError> {
        match &self.active {
            Some(active) => active.link.push_to_view(false),
            None => Ok(()),
        }
    }

    /// Push the current view value into the view-model, as if the view event
    /// fired. An unbound or one-way binding does nothing.
    pub fn push_to_view_model(&self) -> Result<(), BindError> {
        match (&self.active, self.config.mode) {
            (Some(active), BindingMode::TwoWay) => active.link.push_to_view_model(),
            _ => Ok(()),
        }
    }

    fn resolve(&self) -> Result<Link, ConfigurationError> {
        let config = &self.config;
        let two_way = config.mode == BindingMode::TwoWay;
        let view = self.view.as_ref();
        let view_model = self.view_model.as_ref();

        let view_event = if two_way {
            let event = MemberCatalog::find_event(view, &config.view_event_name)
                .ok_or_else(|| missing(view, &config.view_event_name, MemberKind::Event))?;
            Some(event.name)
        } else {
            None
        };

        let view_prop = property(view, &config.view_property_name)?;
        require(view, &view_prop, "writable", view_prop.is_writable())?;
        if two_way {
            require(view, &view_prop, "readable", view_prop.is_readable())?;
        }

        let vm_prop = property(view_model, &config.view_model_property_name)?;
        require(view_model, &vm_prop, "readable", vm_prop.is_readable())?;
        if two_way {
            require(view_model, &vm_prop, "writable", vm_prop.is_writable())?;
        }

        let view_type = member_type(&view_prop);
        let vm_type = member_type(&vm_prop);

        let to_view = self.stage(
            &config.view_adapter_id,
            config.view_adapter_options.as_ref(),
            vm_type,
            view_type,
            "view adapter",
        )?;

        let to_view_model = if two_way {
            self.stage(
                &config.view_model_adapter_id,
                config.view_model_adapter_options.as_ref(),
                view_type,
                vm_type,
                "view-model adapter",
            )?
        } else if config.view_model_adapter_id.is_empty() {
            Stage {
                adapter: None,
                options: None,
            }
        } else {
            return Err(ConfigurationError::OneWayAdapter {
                id: config.view_model_adapter_id.clone(),
            });
        };

        let exception = self.exception_channel()?;

        Ok(Link {
            view: Rc::clone(&self.view),
            view_model: Rc::clone(&self.view_model),
            view_event,
            view_property: view_prop.name,
            view_model_property: vm_prop.name,
            to_view,
            to_view_model,
            exception,
            pushing: Cell::new(false),
        })
    }

    fn exception_channel(&self) -> Result<Option<ExceptionChannel>, ConfigurationError> {
        let config = &self.config;
        match (
            config.exception_property_name.is_empty(),
            config.exception_adapter_id.is_empty(),
        ) {
            (true, true) => Ok(None),
            (false, true) => Err(ConfigurationError::ExceptionChannel {
                reason: "exception property requires an exception adapter",
            }),
            (true, false) => Err(ConfigurationError::ExceptionChannel {
                reason: "exception adapter requires an exception property",
            }),
            (false, false) => {
                let view_model = self.view_model.as_ref();
                let target = property(view_model, &config.exception_property_name)?;
                require(view_model, &target, "writable", target.is_writable())?;
                let stage = self.stage(
                    &config.exception_adapter_id,
                    config.exception_adapter_options.as_ref(),
                    ValueType::Error,
                    member_type(&target),
                    "exception adapter",
                )?;
                Ok(Some(ExceptionChannel {
                    property: target.name,
                    stage,
                }))
            }
        }
    }

    /// Resolve `id` and check that it converts `input` into `output`.
    fn stage(
        &self,
        id: &str,
        supplied: Option<&AdapterOptions>,
        input: ValueType,
        output: ValueType,
        role: &str,
    ) -> Result<Stage, ConfigurationError> {
        let Some(adapter) = self.registry.resolve(id)? else {
            if input != output {
                return Err(ConfigurationError::TypeMismatch {
                    context: format!("{role} (identity)"),
                    expected: output,
                    found: input,
                });
            }
            return Ok(Stage {
                adapter: None,
                options: None,
            });
        };
        let desc = adapter.descriptor();
        if desc.in_type != input {
            return Err(ConfigurationError::TypeMismatch {
                context: format!("{role} '{id}' input"),
                expected: input,
                found: desc.in_type,
            });
        }
        if desc.out_type != output {
            return Err(ConfigurationError::TypeMismatch {
                context: format!("{role} '{id}' output"),
                expected: output,
                found: desc.out_type,
            });
        }
        let options = options_for(adapter.as_ref(), supplied);
        Ok(Stage {
            adapter: Some(adapter),
            options,
        })
    }
}

impl Drop for Binding {
    fn drop(&mut self) {
        self.unbind();
    }
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("view", &self.view.type_name())
            .field("view_model", &self.view_model.type_name())
            .field("link", &self.config.describe())
            .field("state", &self.state())
            .finish()
    }
}

fn missing(obj: &dyn Bindable, member: &str, kind: MemberKind) -> ConfigurationError {
    ConfigurationError::MissingMember {
        type_name: obj.type_name().to_owned(),
        member: member.to_owned(),
        kind,
    }
}

fn property(obj: &dyn Bindable, name: &str) -> Result<BindableMember, ConfigurationError> {
    MemberCatalog::find_property(obj, name).ok_or_else(|| missing(obj, name, MemberKind::Property))
}

fn require(
    obj: &dyn Bindable,
    member: &BindableMember,
    required: &'static str,
    satisfied: bool,
) -> Result<(), ConfigurationError> {
    if satisfied {
        Ok(())
    } else {
        Err(ConfigurationError::AccessDenied {
            type_name: obj.type_name().to_owned(),
            member: member.name.clone(),
            required,
        })
    }
}

fn member_type(member: &BindableMember) -> ValueType {
    member.member_type.unwrap_or(ValueType::Unit)
}
