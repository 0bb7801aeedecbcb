//! Behavioral laws of the binding state machine.

use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use proptest::prelude::*;
use tether_adapters::{AdapterDescriptor, AdapterRegistry, FnAdapter, builtin};
use tether_core::{
    BindError, Bindable, ChangeHandler, ConversionError, DynObject, EventHandler, MemberAccess,
    MemberInfo, Rgba, Signal, Subscription, Value, ValueType,
};
use tether_runtime::{Binding, BindingConfig, BindingState};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_test::traced_test;

fn registry() -> Arc<AdapterRegistry> {
    Arc::new(AdapterRegistry::builtin())
}

fn text_view() -> Rc<DynObject> {
    DynObject::builder("Field")
        .property("text", "")
        .event("edited")
        .raises_on_change("text", "edited")
        .build()
}

fn text_model(initial: &str) -> Rc<DynObject> {
    DynObject::builder("Model")
        .property("value", initial)
        .property("error", "")
        .notify_changes()
        .build()
}

fn bound(config: BindingConfig, view: &Rc<DynObject>, vm: &Rc<DynObject>, reg: Arc<AdapterRegistry>) -> Binding {
    let mut binding = Binding::with_registry(config, view.clone(), vm.clone(), reg);
    binding.bind().unwrap();
    binding
}

proptest! {
    #[test]
    fn identity_law(v in ".*") {
        let (view, vm) = (text_view(), text_model(""));
        let _binding = bound(BindingConfig::two_way("edited", "text", "value"), &view, &vm, registry());
        vm.set("value", v.as_str()).unwrap();
        prop_assert_eq!(view.get("text"), Some(Value::Text(v)));
    }

    #[test]
    fn round_trip_law(n in any::<i64>()) {
        let view = text_view();
        let vm = DynObject::builder("Counter").property("count", 0).notify_changes().build();
        let config = BindingConfig::two_way("edited", "text", "count")
            .with_view_adapter(builtin::INT_TO_TEXT, None)
            .with_view_model_adapter(builtin::TEXT_TO_INT, None);
        let binding = bound(config, &view, &vm, registry());

        vm.set("count", n).unwrap();
        binding.push_to_view_model().unwrap();
        prop_assert_eq!(vm.get("count"), Some(Value::Int(n)));
        prop_assert_eq!(view.get("text"), Some(Value::Text(n.to_string())));
    }

    #[test]
    fn view_edits_reach_view_model(v in "[a-z]{1,12}") {
        let (view, vm) = (text_view(), text_model("seed"));
        let _binding = bound(BindingConfig::two_way("edited", "text", "value"), &view, &vm, registry());
        view.set("text", v.as_str()).unwrap();
        prop_assert_eq!(vm.get("value"), Some(Value::Text(v)));
    }
}

/// View-model that notifies on every `poke`, even when nothing changed.
struct Chatty {
    value: std::cell::RefCell<Value>,
    writes: std::cell::Cell<usize>,
    changes: Signal<String>,
}

impl Chatty {
    fn new(value: impl Into<Value>) -> Rc<Self> {
        Rc::new(Self {
            value: std::cell::RefCell::new(value.into()),
            writes: std::cell::Cell::new(0),
            changes: Signal::new(),
        })
    }

    fn poke(&self) -> Result<(), BindError> {
        self.changes.emit(&"flag".to_owned())
    }
}

impl Bindable for Chatty {
    fn type_name(&self) -> &'static str {
        "Chatty"
    }

    fn list_properties(&self, out: &mut Vec<MemberInfo>) {
        out.push(MemberInfo::property("Chatty", "flag", ValueType::Bool, MemberAccess::READ_WRITE));
    }

    fn list_events(&self, _out: &mut Vec<MemberInfo>) {}

    fn get_property(&self, name: &str) -> Option<Value> {
        (name == "flag").then(|| self.value.borrow().clone())
    }

    fn set_property(&self, _name: &str, value: Value) -> Result<(), BindError> {
        self.writes.set(self.writes.get() + 1);
        *self.value.borrow_mut() = value;
        Ok(())
    }

    fn subscribe_event(&self, _name: &str, _handler: EventHandler) -> Option<Subscription> {
        None
    }

    fn subscribe_property_changed(&self, handler: ChangeHandler) -> Option<Subscription> {
        Some(self.changes.subscribe(move |name: &String| handler(name.as_str())))
    }
}

#[test]
fn repeated_notifications_do_not_rewrite_the_view() {
    let swatch = DynObject::builder("Swatch")
        .property("tint", Rgba::BLACK)
        .event("picked")
        .raises_on_change("tint", "picked")
        .build();
    let vm = Chatty::new(true);
    let config = BindingConfig::two_way("picked", "tint", "flag")
        .with_view_adapter(builtin::BOOL_TO_COLOR, None)
        .with_view_model_adapter("color-to-bool", None);
    let color_to_bool = FnAdapter::new(
        AdapterDescriptor::new("color-to-bool", ValueType::Color, ValueType::Bool),
        |value, _| Ok(Value::Bool(value.as_color() == Some(Rgba::GREEN))),
    );
    let reg = AdapterRegistry::builder()
        .register_all(builtin::adapters())
        .register(color_to_bool)
        .build()
        .unwrap();
    let mut binding = Binding::with_registry(config, swatch.clone(), vm.clone(), Arc::new(reg));
    binding.bind().unwrap();

    for _ in 0..10 {
        vm.poke().unwrap();
    }
    assert_eq!(swatch.version("tint"), Some(1));
    assert_eq!(swatch.get("tint"), Some(Value::Color(Rgba::GREEN)));
    assert_eq!(vm.writes.get(), 0);
}

#[test]
fn exception_channel_swallows_conversion_failure() {
    let always_fails = FnAdapter::new(
        AdapterDescriptor::new("reject", ValueType::Text, ValueType::Text),
        |_, _| Err(ConversionError::new("E")),
    );
    let to_err = FnAdapter::new(
        AdapterDescriptor::new("to-err", ValueType::Error, ValueType::Text),
        |_, _| Ok(Value::from("err")),
    );
    let reg = AdapterRegistry::builder()
        .register(always_fails)
        .register(to_err)
        .build()
        .unwrap();
    let (view, vm) = (text_view(), text_model("start"));
    let config = BindingConfig::two_way("edited", "text", "value")
        .with_view_model_adapter("reject", None)
        .with_exception("error", "to-err", None);
    let _binding = bound(config, &view, &vm, Arc::new(reg));

    assert!(view.set("text", "typed").is_ok());
    assert_eq!(vm.get("error"), Some(Value::from("err")));
    assert_eq!(vm.get("value"), Some(Value::from("start")));
}

#[test]
fn rebinding_leaves_no_subscribers() {
    let (view, vm) = (text_view(), text_model("a"));
    let mut binding = Binding::with_registry(
        BindingConfig::two_way("edited", "text", "value"),
        view.clone(),
        vm.clone(),
        registry(),
    );
    for _ in 0..2 {
        binding.bind().unwrap();
        assert_eq!(binding.state(), BindingState::Bound);
        assert_eq!(view.event_subscriber_count("edited"), 1);
        assert_eq!(vm.change_subscriber_count(), 1);
        binding.unbind();
    }
    assert_eq!(view.event_subscriber_count("edited"), 0);
    assert_eq!(vm.change_subscriber_count(), 0);
}

#[test]
fn failed_initial_push_leaves_binding_unbound() {
    let failing = FnAdapter::new(
        AdapterDescriptor::new("fail-out", ValueType::Text, ValueType::Text),
        |_, _| Err(ConversionError::new("no")),
    );
    let reg = AdapterRegistry::builder().register(failing).build().unwrap();
    let (view, vm) = (text_view(), text_model("a"));
    let mut binding = Binding::with_registry(
        BindingConfig::two_way("edited", "text", "value").with_view_adapter("fail-out", None),
        view.clone(),
        vm.clone(),
        Arc::new(reg),
    );
    let err = binding.bind().unwrap_err();
    assert!(err.is_conversion());
    assert!(!binding.is_bound());
    assert_eq!(view.event_subscriber_count("edited"), 0);
    assert_eq!(vm.change_subscriber_count(), 0);
}

#[test]
fn hidden_members_cannot_be_bound() {
    let view = DynObject::builder("Field")
        .hidden("text", "")
        .event("edited")
        .build();
    let vm = text_model("a");
    let mut binding = Binding::with_registry(
        BindingConfig::two_way("edited", "text", "value"),
        view.clone(),
        vm.clone(),
        registry(),
    );
    assert!(binding.bind().unwrap_err().is_configuration());
}

#[traced_test]
#[test]
fn bind_and_unbind_are_logged() {
    let (view, vm) = (text_view(), text_model("a"));
    let mut binding = bound(BindingConfig::two_way("edited", "text", "value"), &view, &vm, registry());
    binding.unbind();
    assert!(logs_contain("bound"));
    assert!(logs_contain("unbound"));
}

/// Counts events whose message matches.
struct MessageCounter {
    needle: &'static str,
    hits: Arc<AtomicUsize>,
}

struct MessageVisitor<'a>(&'a mut String);

impl Visit for MessageVisitor<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.0 = format!("{value:?}");
        }
    }
}

impl<S: Subscriber> Layer<S> for MessageCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut message = String::new();
        event.record(&mut MessageVisitor(&mut message));
        if message.contains(self.needle) {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
    }
}

#[test]
fn echo_of_initial_push_is_traced_as_suppressed() {
    let hits = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(MessageCounter {
        needle: "suppressed echo",
        hits: Arc::clone(&hits),
    });
    let version = tracing::subscriber::with_default(subscriber, || {
        let (view, vm) = (text_view(), text_model("hello"));
        let _binding = bound(BindingConfig::two_way("edited", "text", "value"), &view, &vm, registry());
        vm.version("value")
    });
    assert_eq!(hits.load(Ordering::Relaxed), 1);
    // The echo never reached the view-model.
    assert_eq!(version, Some(0));
}

#[test]
fn binding_keeps_the_registry_it_was_created_with() {
    let upper = FnAdapter::new(
        AdapterDescriptor::new("upper", ValueType::Text, ValueType::Text),
        |value, _| Ok(Value::Text(value.as_text().unwrap_or_default().to_uppercase())),
    );
    AdapterRegistry::install_global(
        AdapterRegistry::builder()
            .register_all(builtin::adapters())
            .register(upper)
            .build()
            .unwrap(),
    );
    let (view, vm) = (text_view(), text_model("quiet"));
    let config = BindingConfig::one_way("text", "value").with_view_adapter("upper", None);
    let mut early = Binding::new(config.clone(), view.clone(), vm.clone());

    // Swap before binding: the early binding still sees "upper".
    AdapterRegistry::install_global(AdapterRegistry::builtin());
    early.bind().unwrap();
    assert_eq!(view.get("text"), Some(Value::from("QUIET")));

    let mut late = Binding::new(config, view.clone(), vm.clone());
    let err = late.bind().unwrap_err();
    assert!(err.is_configuration());
    assert!(!late.is_bound());
}
