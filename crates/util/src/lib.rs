//! Real-time support code shared by the mixing engine crates.
//!
//! Nothing in here allocates or blocks on the real-time side of an API unless documented
//! otherwise.
use std::ops::{Deref, DerefMut};

pub mod alloc_guard;
pub mod collections;
pub mod macros;
pub mod swappable;
pub mod sync;
pub mod thread;

/// Asserts that a value can be shared between threads.
///
/// Used for cells whose access pattern is serialized by a schedule (e.g. a processor that is only
/// ever run by one task at a time) rather than by the type system.
#[repr(transparent)]
pub struct IsSendSync<T: ?Sized>(T);

impl<T> IsSendSync<T> {
    pub const fn new(value: T) -> Self {
        Self(value)
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

unsafe impl<T: ?Sized> Send for IsSendSync<T> {}
unsafe impl<T: ?Sized> Sync for IsSendSync<T> {}

impl<T: ?Sized> Deref for IsSendSync<T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: ?Sized> DerefMut for IsSendSync<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T: ?Sized> AsRef<T> for IsSendSync<T> {
    fn as_ref(&self) -> &T {
        &self.0
    }
}
