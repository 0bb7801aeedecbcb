#![forbid(unsafe_code)]

//! Discovery of bindable members on host objects.
//!
//! Discovery runs at configuration and bind time only, never per frame, so
//! a linear scan of the object's listing is fine. Listings are gathered into
//! the thread-local member scratch buffer to avoid reallocating per scan.
//!
//! Only members whose listing entry carries the `bindable` marker are
//! reported: this is an allow-list, not "every public member".

use crate::member::{Bindable, BindableMember, MemberAccess, MemberInfo};
use crate::scratch::with_member_scratch;

/// Stateless member discovery over the [`Bindable`] capability.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemberCatalog;

impl MemberCatalog {
    /// Bindable readable and/or writable properties of `obj`, sorted by
    /// declaring type name, then member name.
    #[must_use]
    pub fn find_bindable_properties(obj: &dyn Bindable) -> Vec<BindableMember> {
        with_member_scratch(|scratch| {
            obj.list_properties(scratch);
            collect(scratch, |info| {
                info.access.intersects(MemberAccess::READ_WRITE)
                    && !info.access.contains(MemberAccess::EVENT)
            })
        })
    }

    /// Bindable events of `obj`, in the same order as properties.
    #[must_use]
    pub fn find_bindable_events(obj: &dyn Bindable) -> Vec<BindableMember> {
        with_member_scratch(|scratch| {
            obj.list_events(scratch);
            collect(scratch, |info| info.access.contains(MemberAccess::EVENT))
        })
    }

    /// Bindable property named `name` (plain or `DeclaringType.name`).
    #[must_use]
    pub fn find_property(obj: &dyn Bindable, name: &str) -> Option<BindableMember> {
        Self::find_bindable_properties(obj)
            .into_iter()
            .find(|member| member.matches(name))
    }

    /// Bindable event named `name` (plain or `DeclaringType.name`).
    #[must_use]
    pub fn find_event(obj: &dyn Bindable, name: &str) -> Option<BindableMember> {
        Self::find_bindable_events(obj)
            .into_iter()
            .find(|member| member.matches(name))
    }
}

fn collect(scratch: &mut Vec<MemberInfo>, keep: impl Fn(&MemberInfo) -> bool) -> Vec<BindableMember> {
    #[cfg(feature = "tracing")]
    let _span = tracing::trace_span!("member_scan", listed = scratch.len()).entered();

    let mut found: Vec<BindableMember> = scratch
        .drain(..)
        .filter(|info| info.bindable && keep(info))
        .map(BindableMember::from)
        .collect();
    found.sort_by(|a, b| {
        a.declaring_type
            .cmp(b.declaring_type)
            .then_with(|| a.name.cmp(&b.name))
    });
    found
}
