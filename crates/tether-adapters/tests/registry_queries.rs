//! Registry queries and adapter laws over the stock adapters.

use proptest::prelude::*;
use tether_adapters::{Adapter, AdapterDescriptor, AdapterOptions, AdapterRegistry, FnAdapter, builtin};
use tether_core::{ConversionError, Value, ValueType};
use tracing_test::traced_test;

fn registry() -> AdapterRegistry {
    AdapterRegistry::builtin()
}

#[test]
fn color_adapters_from_bool() {
    let reg = registry();
    assert_eq!(
        reg.adapter_ids_between(ValueType::Bool, ValueType::Color),
        vec![builtin::BOOL_TO_COLOR]
    );
    assert_eq!(
        reg.adapter_ids(|d| d.in_type == ValueType::Error),
        vec![builtin::ERROR_TO_TEXT]
    );
}

#[test]
fn custom_adapters_extend_the_stock_set() {
    let shout = FnAdapter::new(
        AdapterDescriptor::new("shout", ValueType::Text, ValueType::Text),
        |value, _| match value {
            Value::Text(s) => Ok(Value::Text(s.to_uppercase())),
            other => Err(ConversionError::unexpected_input(ValueType::Text, other.value_type())),
        },
    );
    let reg = AdapterRegistry::builder()
        .register_all(builtin::adapters())
        .register(shout)
        .build()
        .unwrap();
    let adapter = reg.resolve("shout").unwrap().unwrap();
    assert_eq!(adapter.apply(Value::from("hi"), None), Ok(Value::from("HI")));
    assert!(reg.adapter_ids_between(ValueType::Text, ValueType::Text).contains(&"shout"));
}

#[test]
fn global_registry_can_be_replaced() {
    let before = AdapterRegistry::global();
    assert!(before.resolve(builtin::INT_TO_TEXT).unwrap().is_some());

    let previous = AdapterRegistry::install_global(AdapterRegistry::builtin());
    assert_eq!(previous.len(), before.len());
    assert_eq!(AdapterRegistry::global().len(), before.len());
}

#[traced_test]
#[test]
fn stale_options_are_logged() {
    let reg = registry();
    let adapter = reg.resolve(builtin::BOOL_TO_TEXT).unwrap().unwrap();
    let stale = AdapterOptions::new(builtin::BOOL_TO_COLOR);
    let resolved = tether_adapters::options_for(adapter.as_ref(), Some(&stale)).unwrap();
    assert!(resolved.is_for(builtin::BOOL_TO_TEXT));
    assert!(logs_contain("discarding options made for another adapter"));
}

proptest! {
    #[test]
    fn int_text_round_trip(n in any::<i64>()) {
        let reg = registry();
        let to_text = reg.resolve(builtin::INT_TO_TEXT).unwrap().unwrap();
        let to_int = reg.resolve(builtin::TEXT_TO_INT).unwrap().unwrap();
        let text = to_text.apply(Value::Int(n), None).unwrap();
        prop_assert_eq!(to_int.apply(text, None).unwrap(), Value::Int(n));
    }

    #[test]
    fn negate_is_an_involution(b in any::<bool>()) {
        let reg = registry();
        let negate = reg.resolve(builtin::BOOL_NEGATE).unwrap().unwrap();
        let once = negate.apply(Value::Bool(b), None).unwrap();
        prop_assert_eq!(negate.apply(once, None).unwrap(), Value::Bool(b));
    }

    #[test]
    fn float_text_round_trip(x in -1.0e12f64..1.0e12f64) {
        let reg = registry();
        let to_text = reg.resolve(builtin::FLOAT_TO_TEXT).unwrap().unwrap();
        let to_float = reg.resolve(builtin::TEXT_TO_FLOAT).unwrap().unwrap();
        let text = to_text.apply(Value::Float(x), None).unwrap();
        prop_assert_eq!(to_float.apply(text, None).unwrap(), Value::Float(x));
    }
}
