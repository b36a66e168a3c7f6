//! Instrumentation for catching allocations on the audio thread.
//!
//! Install [GuardedAllocator] as the `#[global_allocator]` of a test or debug binary, wrap
//! real-time code in [forbid], then check [violations].
use std::{
    alloc::{GlobalAlloc, Layout, System},
    cell::Cell,
    sync::atomic::{AtomicUsize, Ordering},
};

thread_local! {
    static FORBIDDEN: Cell<bool> = const { Cell::new(false) };
}

static VIOLATIONS: AtomicUsize = AtomicUsize::new(0);

/// Counts every allocation or deallocation made inside [forbid] on the calling thread.
pub struct GuardedAllocator<A = System>(A);

impl<A> GuardedAllocator<A> {
    pub const fn new(inner: A) -> Self {
        Self(inner)
    }
}

fn check() {
    if FORBIDDEN.try_with(Cell::get).unwrap_or(false) {
        VIOLATIONS.fetch_add(1, Ordering::Relaxed);
    }
}

unsafe impl<A: GlobalAlloc> GlobalAlloc for GuardedAllocator<A> {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        check();
        unsafe { self.0.alloc(layout) }
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        check();
        unsafe { self.0.alloc_zeroed(layout) }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        check();
        unsafe { self.0.dealloc(ptr, layout) }
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        check();
        unsafe { self.0.realloc(ptr, layout, new_size) }
    }
}

struct Reset(bool);

impl Drop for Reset {
    fn drop(&mut self) {
        FORBIDDEN.with(|forbidden| forbidden.set(self.0));
    }
}

/// Run `f` with allocation forbidden on the calling thread.
pub fn forbid<R>(f: impl FnOnce() -> R) -> R {
    let _reset = Reset(FORBIDDEN.with(|forbidden| forbidden.replace(true)));
    f()
}

/// The number of allocator calls made inside [forbid] so far, across all threads.
pub fn violations() -> usize {
    VIOLATIONS.load(Ordering::Relaxed)
}
