#![forbid(unsafe_code)]

//! A ready-made [`Bindable`] host object.
//!
//! [`DynObject`] is a property bag with declared, typed members. Hosts that
//! do not want to hand-write a `Bindable` impl can describe their view or
//! view-model with a [`DynObjectBuilder`] and get events, change
//! notification, and write counters for free.
//!
//! # Invariants
//!
//! 1. A property's type is fixed by its initial value.
//! 2. Setting a value equal to the current value is a no-op (no version
//!    bump, no notifications).
//! 3. A successful change bumps the property version exactly once, then
//!    notifies change subscribers, then raises any linked event.
//! 4. No internal borrow is held while handlers run, so handlers may read
//!    and write the same object.

use std::cell::RefCell;
use std::rc::Rc;

use ahash::AHashMap;

use crate::error::{BindError, PropertyError, PropertyFault};
use crate::member::{Bindable, ChangeHandler, EventHandler, MemberAccess, MemberInfo};
use crate::signal::{Signal, Subscription};
use crate::value::Value;

#[derive(Debug)]
struct Slot {
    info: MemberInfo,
    value: Value,
    version: u64,
    raises: Option<String>,
}

#[derive(Debug)]
struct EventSlot {
    info: MemberInfo,
    signal: Signal<()>,
}

/// Dynamic host object with typed properties and named events.
#[derive(Debug)]
pub struct DynObject {
    type_name: &'static str,
    slots: RefCell<Vec<Slot>>,
    index: AHashMap<String, usize>,
    events: Vec<EventSlot>,
    changes: Option<Signal<String>>,
}

impl DynObject {
    #[must_use]
    pub fn builder(type_name: &'static str) -> DynObjectBuilder {
        DynObjectBuilder {
            type_name,
            slots: Vec::new(),
            events: Vec::new(),
            notify_changes: false,
        }
    }

    /// Current value of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        let idx = *self.index.get(name)?;
        Some(self.slots.borrow()[idx].value.clone())
    }

    /// Host-side write. Ignores the write-access bit, which only restricts
    /// bindings. Returns whether the value changed.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<bool, BindError> {
        self.write(name, value.into(), false)
    }

    /// Raise the event `name` as if the user triggered it.
    pub fn raise(&self, name: &str) -> Result<(), BindError> {
        match self.event(name) {
            Some(slot) => slot.signal.emit(&()),
            None => {
                Err(PropertyError::new(self.type_name, name, PropertyFault::MissingEvent).into())
            }
        }
    }

    /// Number of successful writes to `name`.
    #[must_use]
    pub fn version(&self, name: &str) -> Option<u64> {
        let idx = *self.index.get(name)?;
        Some(self.slots.borrow()[idx].version)
    }

    /// Live subscriptions on the event `name`.
    #[must_use]
    pub fn event_subscriber_count(&self, name: &str) -> usize {
        self.event(name).map_or(0, |slot| slot.signal.subscriber_count())
    }

    /// Live subscriptions on the change notification.
    #[must_use]
    pub fn change_subscriber_count(&self) -> usize {
        self.changes.as_ref().map_or(0, Signal::subscriber_count)
    }

    fn event(&self, name: &str) -> Option<&EventSlot> {
        self.events.iter().find(|slot| slot.info.name == name)
    }

    fn missing(&self, name: &str) -> PropertyError {
        PropertyError::new(self.type_name, name, PropertyFault::Missing)
    }

    fn write(&self, name: &str, value: Value, enforce_access: bool) -> Result<bool, BindError> {
        let idx = *self.index.get(name).ok_or_else(|| self.missing(name))?;
        let raises = {
            let mut slots = self.slots.borrow_mut();
            let slot = &mut slots[idx];
            if enforce_access && !slot.info.access.contains(MemberAccess::WRITE) {
                return Err(PropertyError::new(self.type_name, name, PropertyFault::ReadOnly).into());
            }
            let expected = slot.value.value_type();
            if value.value_type() != expected {
                return Err(PropertyError::new(
                    self.type_name,
                    name,
                    PropertyFault::TypeMismatch {
                        expected,
                        found: value.value_type(),
                    },
                )
                .into());
            }
            if slot.value == value {
                return Ok(false);
            }
            slot.value = value;
            slot.version += 1;
            slot.raises.clone()
        };

        if let Some(changes) = &self.changes {
            changes.emit(&name.to_owned())?;
        }
        if let Some(event) = raises {
            self.raise(&event)?;
        }
        Ok(true)
    }
}

impl Bindable for DynObject {
    fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn list_properties(&self, out: &mut Vec<MemberInfo>) {
        out.extend(self.slots.borrow().iter().map(|slot| slot.info.clone()));
    }

    fn list_events(&self, out: &mut Vec<MemberInfo>) {
        out.extend(self.events.iter().map(|slot| slot.info.clone()));
    }

    fn get_property(&self, name: &str) -> Option<Value> {
        self.get(name)
    }

    fn set_property(&self, name: &str, value: Value) -> Result<(), BindError> {
        self.write(name, value, true).map(|_| ())
    }

    fn subscribe_event(&self, name: &str, handler: EventHandler) -> Option<Subscription> {
        let slot = self.event(name)?;
        Some(slot.signal.subscribe(move |()| handler()))
    }

    fn subscribe_property_changed(&self, handler: ChangeHandler) -> Option<Subscription> {
        let changes = self.changes.as_ref()?;
        Some(changes.subscribe(move |name: &String| handler(name.as_str())))
    }
}

/// Builder for [`DynObject`].
#[derive(Debug)]
pub struct DynObjectBuilder {
    type_name: &'static str,
    slots: Vec<Slot>,
    events: Vec<EventSlot>,
    notify_changes: bool,
}

impl DynObjectBuilder {
    /// Bindable read/write property.
    #[must_use]
    pub fn property(self, name: &str, initial: impl Into<Value>) -> Self {
        self.slot(name, initial.into(), MemberAccess::READ_WRITE, true)
    }

    /// Bindable read-only property.
    #[must_use]
    pub fn read_only(self, name: &str, initial: impl Into<Value>) -> Self {
        self.slot(name, initial.into(), MemberAccess::READ, true)
    }

    /// Read/write property that discovery never reports.
    #[must_use]
    pub fn hidden(self, name: &str, initial: impl Into<Value>) -> Self {
        self.slot(name, initial.into(), MemberAccess::READ_WRITE, false)
    }

    /// Bindable event.
    #[must_use]
    pub fn event(mut self, name: &str) -> Self {
        self.events.push(EventSlot {
            info: MemberInfo::event(self.type_name, name),
            signal: Signal::new(),
        });
        self
    }

    /// Raise `event` whenever `property` changes, like a widget firing its
    /// value-changed callback on programmatic writes.
    ///
    /// # Panics
    ///
    /// Panics if `property` was not declared before this call.
    #[must_use]
    pub fn raises_on_change(mut self, property: &str, event: &str) -> Self {
        let slot = self
            .slots
            .iter_mut()
            .find(|slot| slot.info.name == property)
            .expect("raises_on_change requires a declared property");
        slot.raises = Some(event.to_owned());
        self
    }

    /// Enable the property-change notification channel.
    #[must_use]
    pub fn notify_changes(mut self) -> Self {
        self.notify_changes = true;
        self
    }

    #[must_use]
    pub fn build(self) -> Rc<DynObject> {
        let index = self
            .slots
            .iter()
            .enumerate()
            .map(|(idx, slot)| (slot.info.name.clone(), idx))
            .collect();
        Rc::new(DynObject {
            type_name: self.type_name,
            slots: RefCell::new(self.slots),
            index,
            events: self.events,
            changes: self.notify_changes.then(Signal::new),
        })
    }

    fn slot(mut self, name: &str, value: Value, access: MemberAccess, bindable: bool) -> Self {
        let mut info = MemberInfo::property(self.type_name, name, value.value_type(), access);
        info.bindable = bindable;
        self.slots.push(Slot {
            info,
            value,
            version: 0,
            raises: None,
        });
        self
    }
}
