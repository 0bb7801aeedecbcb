#![forbid(unsafe_code)]

//! Leased scratch buffers for bulk discovery scans.
//!
//! Discovery walks (listing members, gathering bindings to activate) run
//! often enough at configuration time that reallocating their temporary
//! vectors on every scan shows up. A [`ScratchPool`] keeps one backing
//! `Vec` per container kind and lends it out through a [`ScratchLease`].
//!
//! # Invariants
//!
//! 1. Acquiring clears the storage; callers never observe stale entries.
//! 2. At most one lease per pool is live. A second `acquire` fails with
//!    [`ScratchError::InUse`] rather than aliasing the buffer.
//! 3. Dropping the lease returns the storage (and its capacity) to the pool.
//!
//! The process-wide pools are thread-local, matching the single control
//! thread the binding engine runs on.

use core::fmt;
use std::cell::{RefCell, RefMut};
use std::ops::{Deref, DerefMut};

use crate::member::MemberInfo;

thread_local! {
    static MEMBER_SCRATCH: ScratchPool<MemberInfo> = ScratchPool::new("members", 64);
    static INDEX_SCRATCH: ScratchPool<usize> = ScratchPool::new("indices", 32);
}

/// Errors from scratch pool operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScratchError {
    /// The pool is already lent out.
    InUse { pool: &'static str },
}

impl fmt::Display for ScratchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InUse { pool } => write!(f, "scratch pool '{pool}' is already leased"),
        }
    }
}

impl std::error::Error for ScratchError {}

/// A named, pre-sized, reusable buffer.
pub struct ScratchPool<T> {
    name: &'static str,
    storage: RefCell<Vec<T>>,
}

impl<T> ScratchPool<T> {
    #[must_use]
    pub fn new(name: &'static str, capacity: usize) -> Self {
        Self {
            name,
            storage: RefCell::new(Vec::with_capacity(capacity)),
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Check out the cleared backing storage.
    ///
    /// # Errors
    ///
    /// [`ScratchError::InUse`] while another lease is live.
    pub fn acquire(&self) -> Result<ScratchLease<'_, T>, ScratchError> {
        let mut buf = self
            .storage
            .try_borrow_mut()
            .map_err(|_| ScratchError::InUse { pool: self.name })?;
        buf.clear();
        Ok(ScratchLease { buf })
    }

    /// Run `f` with the pooled buffer, or with a fresh one if the pool is
    /// already leased further up the stack.
    pub fn with<R>(&self, f: impl FnOnce(&mut Vec<T>) -> R) -> R {
        match self.acquire() {
            Ok(mut lease) => f(&mut *lease),
            Err(_) => {
                #[cfg(feature = "tracing")]
                tracing::trace!(pool = self.name, "scratch pool busy, allocating");
                f(&mut Vec::new())
            }
        }
    }

    /// Capacity retained between leases. `None` while leased.
    #[must_use]
    pub fn retained_capacity(&self) -> Option<usize> {
        self.storage.try_borrow().ok().map(|buf| buf.capacity())
    }

    #[must_use]
    pub fn is_leased(&self) -> bool {
        self.storage.try_borrow_mut().is_err()
    }
}

impl<T> fmt::Debug for ScratchPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScratchPool")
            .field("name", &self.name)
            .field("leased", &self.is_leased())
            .finish()
    }
}

/// Checked-out scratch storage. Returned to its pool on drop.
pub struct ScratchLease<'a, T> {
    buf: RefMut<'a, Vec<T>>,
}

impl<T> Deref for ScratchLease<'_, T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Self::Target {
        &self.buf
    }
}

impl<T> DerefMut for ScratchLease<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.buf
    }
}

/// Run `f` with the thread-local member-listing buffer.
pub fn with_member_scratch<R>(f: impl FnOnce(&mut Vec<MemberInfo>) -> R) -> R {
    MEMBER_SCRATCH.with(|pool| pool.with(f))
}

/// Run `f` with the thread-local index buffer.
pub fn with_index_scratch<R>(f: impl FnOnce(&mut Vec<usize>) -> R) -> R {
    INDEX_SCRATCH.with(|pool| pool.with(f))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_clears_previous_contents() {
        let pool = ScratchPool::new("test", 4);
        {
            let mut lease = pool.acquire().unwrap();
            lease.extend([1, 2, 3]);
        }
        let lease = pool.acquire().unwrap();
        assert!(lease.is_empty());
    }

    #[test]
    fn second_acquire_is_rejected() {
        let pool = ScratchPool::<u8>::new("busy", 4);
        let _lease = pool.acquire().unwrap();
        assert!(pool.is_leased());
        assert_eq!(
            pool.acquire().err(),
            Some(ScratchError::InUse { pool: "busy" })
        );
    }

    #[test]
    fn capacity_survives_between_leases() {
        let pool = ScratchPool::new("grow", 2);
        {
            let mut lease = pool.acquire().unwrap();
            lease.extend(0..100);
        }
        assert!(pool.retained_capacity().unwrap() >= 100);
    }

    #[test]
    fn nested_with_falls_back_to_fresh_buffer() {
        let pool = ScratchPool::new("nested", 4);
        let total = pool.with(|outer| {
            outer.push(1);
            let inner_len = pool.with(|inner| {
                inner.push(2);
                inner.len()
            });
            outer.len() + inner_len
        });
        assert_eq!(total, 2);
    }

    #[test]
    fn thread_local_pools_are_reusable() {
        let n = with_index_scratch(|buf| {
            buf.extend([3, 1, 2]);
            buf.len()
        });
        assert_eq!(n, 3);
        assert!(with_index_scratch(|buf| buf.is_empty()));
    }

    #[test]
    fn error_display() {
        let err = ScratchError::InUse { pool: "members" };
        assert_eq!(err.to_string(), "scratch pool 'members' is already leased");
    }
}
