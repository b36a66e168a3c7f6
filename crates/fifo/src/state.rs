use std::{
    alloc::{Layout, alloc_zeroed, dealloc},
    sync::atomic::AtomicUsize,
};

use crossbeam::utils::CachePadded;

/// Planar sample storage shared by both ends of a stream. Each channel is its own ring of
/// `capacity` frames; `head` and `tail` count frames and are shared by every channel.
pub(crate) struct State {
    pub(crate) head: CachePadded<AtomicUsize>,
    pub(crate) tail: CachePadded<AtomicUsize>,
    pub(crate) capacity: usize,
    pub(crate) num_channels: usize,
    layout: Layout,
    data: *mut f32,
}

impl State {
    pub(crate) fn new(num_channels: usize, capacity: usize) -> Self {
        debug_assert!(
            capacity.is_power_of_two(),
            "stream capacity must be a power of two"
        );
        let size = (num_channels * capacity * size_of::<f32>()).max(1);
        let Ok(layout) = Layout::from_size_align(size, 64) else {
            unreachable!("stream size overflow")
        };
        let data = unsafe { alloc_zeroed(layout) };
        if data.is_null() {
            std::alloc::handle_alloc_error(layout);
        }
        Self {
            head: CachePadded::new(AtomicUsize::new(0)),
            tail: CachePadded::new(AtomicUsize::new(0)),
            capacity,
            num_channels,
            layout,
            data: data.cast(),
        }
    }

    /// Pointer to frame `start` of `channel`.
    pub(crate) unsafe fn channel(&self, channel: usize, start: usize) -> *mut f32 {
        debug_assert!(channel < self.num_channels && start < self.capacity);
        unsafe { self.data.add(channel * self.capacity + start) }
    }
}

impl Drop for State {
    fn drop(&mut self) {
        unsafe {
            dealloc(self.data.cast(), self.layout);
        }
    }
}

unsafe impl Send for State {}
unsafe impl Sync for State {}
