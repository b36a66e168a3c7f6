//! Time-stamped control values.
//!
//! An [EventBuffer] holds the events of one port for one block, ordered by offset and stable for
//! equal offsets. Its storage is carved out of an [EventArena] once, when the executor is built,
//! and is reused block after block: clearing a buffer never releases memory and inserting never
//! allocates.
use std::{
    alloc::Layout,
    any::TypeId,
    ops::Deref,
    ptr::NonNull,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

/// A value at a sample offset within the current block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Event<T> {
    offset: usize,
    value: T,
}

impl<T> Event<T> {
    pub fn new(offset: usize, value: T) -> Self {
        Self { offset, value }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn value(&self) -> &T {
        &self.value
    }
}

/// A bump allocator for event storage.
pub struct EventArena {
    slab: NonNull<u8>,
    layout: Layout,
    used: AtomicUsize,
}

/// The events of one port for one block.
pub struct EventBuffer<T> {
    events: NonNull<Event<T>>,
    len: usize,
    capacity: usize,
    _arena: Arc<EventArena>,
}

/// Type-erased access to an [EventBuffer], tagged with the event type.
pub trait AnyEventBuffer: Send {
    /// The [TypeId] of the event value type.
    fn event_type(&self) -> TypeId;

    /// Remove every event, keeping the storage.
    fn clear(&mut self);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventArena {
    /// Create an arena with room for `size` bytes of events.
    pub fn new(size: usize) -> Self {
        let Ok(layout) = Layout::from_size_align(size.max(1), 64) else {
            unreachable!("event arena size overflow")
        };
        let slab = unsafe { std::alloc::alloc(layout) };
        let Some(slab) = NonNull::new(slab) else {
            std::alloc::handle_alloc_error(layout)
        };
        Self {
            slab,
            layout,
            used: AtomicUsize::new(0),
        }
    }

    /// The number of arena bytes needed for a buffer of `capacity` events of type `T`, including
    /// worst case alignment padding.
    pub fn required<T>(capacity: usize) -> usize {
        let layout = Layout::new::<Event<T>>();
        layout.size() * capacity + layout.align() - 1
    }

    /// Bytes handed out so far.
    pub fn used(&self) -> usize {
        self.used.load(Ordering::Relaxed)
    }

    pub fn size(&self) -> usize {
        self.layout.size()
    }

    fn alloc<T>(&self, capacity: usize) -> Option<NonNull<Event<T>>> {
        let layout = Layout::array::<Event<T>>(capacity).ok()?;
        let base = self.slab.as_ptr() as usize;
        let mut offset = 0;
        self.used
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                let start = (base + used).next_multiple_of(layout.align()) - base;
                let end = start.checked_add(layout.size())?;
                offset = start;
                (end <= self.layout.size()).then_some(end)
            })
            .ok()?;
        NonNull::new(unsafe { self.slab.as_ptr().add(offset) }.cast())
    }
}

impl Drop for EventArena {
    fn drop(&mut self) {
        unsafe {
            std::alloc::dealloc(self.slab.as_ptr(), self.layout);
        }
    }
}

unsafe impl Send for EventArena {}
unsafe impl Sync for EventArena {}

impl<T: Copy + Send + 'static> EventBuffer<T> {
    /// Create a buffer of `capacity` events in `arena`. Returns None if the arena is exhausted.
    pub fn new_in(arena: &Arc<EventArena>, capacity: usize) -> Option<Self> {
        let events = arena.alloc::<T>(capacity)?;
        Some(Self {
            events,
            len: 0,
            capacity,
            _arena: arena.clone(),
        })
    }

    /// Create a buffer backed by its own arena.
    pub fn with_capacity(capacity: usize) -> Self {
        let arena = Arc::new(EventArena::new(EventArena::required::<T>(capacity)));
        let Some(buffer) = Self::new_in(&arena, capacity) else {
            unreachable!("arena was sized for this buffer")
        };
        buffer
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert an event after any events with the same or an earlier offset.
    ///
    /// The buffer never grows. Inserting into a full buffer is a logic error; in release builds the
    /// event is dropped.
    pub fn insert(&mut self, offset: usize, value: T) {
        debug_assert!(self.len < self.capacity, "event buffer overflow");
        if self.len == self.capacity {
            return;
        }

        // Events usually arrive in order, so search from the back.
        let mut index = self.len;
        while index > 0 && self.as_slice()[index - 1].offset > offset {
            index -= 1;
        }

        unsafe {
            let base = self.events.as_ptr();
            std::ptr::copy(base.add(index), base.add(index + 1), self.len - index);
            std::ptr::write(base.add(index), Event { offset, value });
        }
        self.len += 1;
    }

    pub fn as_slice(&self) -> &[Event<T>] {
        unsafe { std::slice::from_raw_parts(self.events.as_ptr(), self.len) }
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl<T: Copy + Send + 'static> Deref for EventBuffer<T> {
    type Target = [Event<T>];
    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl<T: Copy + Send + std::fmt::Debug + 'static> std::fmt::Debug for EventBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

unsafe impl<T: Send> Send for EventBuffer<T> {}

impl<T: Copy + Send + 'static> AnyEventBuffer for EventBuffer<T> {
    fn event_type(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn clear(&mut self) {
        EventBuffer::clear(self);
    }

    fn len(&self) -> usize {
        self.len
    }
}

impl dyn AnyEventBuffer {
    /// Downcast to a concrete buffer. The type must match; this is only checked in debug builds.
    pub fn downcast_ref<T: Copy + Send + 'static>(&self) -> &EventBuffer<T> {
        debug_assert_eq!(self.event_type(), TypeId::of::<T>(), "event type mismatch");
        unsafe { &*(self as *const dyn AnyEventBuffer).cast::<EventBuffer<T>>() }
    }

    /// Downcast to a concrete buffer. The type must match; this is only checked in debug builds.
    pub fn downcast_mut<T: Copy + Send + 'static>(&mut self) -> &mut EventBuffer<T> {
        debug_assert_eq!(self.event_type(), TypeId::of::<T>(), "event type mismatch");
        unsafe { &mut *(self as *mut dyn AnyEventBuffer).cast::<EventBuffer<T>>() }
    }
}

#[cfg(test)]
mod tests {
    use super::{AnyEventBuffer, Event, EventArena, EventBuffer};
    use proptest::prelude::*;
    use std::sync::Arc;

    #[test]
    fn ordered_by_offset() {
        let mut buffer = EventBuffer::with_capacity(8);
        buffer.insert(5, 'a');
        buffer.insert(1, 'b');
        buffer.insert(3, 'c');
        let offsets = buffer.iter().map(Event::offset).collect::<Vec<_>>();
        assert_eq!(offsets, vec![1, 3, 5]);
    }

    #[test]
    fn stable_at_equal_offsets() {
        let mut buffer = EventBuffer::with_capacity(8);
        buffer.insert(2, 1);
        buffer.insert(0, 2);
        buffer.insert(2, 3);
        buffer.insert(2, 4);
        let values = buffer.iter().map(|e| *e.value()).collect::<Vec<_>>();
        assert_eq!(values, vec![2, 1, 3, 4]);
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut buffer = EventBuffer::with_capacity(2);
        buffer.insert(0, 1.0f32);
        buffer.insert(0, 2.0f32);
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), 2);
        buffer.insert(1, 3.0);
        assert_eq!(buffer.as_slice(), &[Event::new(1, 3.0)]);
    }

    #[test]
    #[should_panic(expected = "event buffer overflow")]
    #[cfg(debug_assertions)]
    fn overflow_asserts() {
        let mut buffer = EventBuffer::with_capacity(1);
        buffer.insert(0, 1u8);
        buffer.insert(0, 2u8);
    }

    #[test]
    fn shared_arena() {
        let size = EventArena::required::<f32>(4) + EventArena::required::<(f32, f32)>(4);
        let arena = Arc::new(EventArena::new(size));
        let mut a = EventBuffer::<f32>::new_in(&arena, 4).unwrap();
        let mut b = EventBuffer::<(f32, f32)>::new_in(&arena, 4).unwrap();
        assert!(EventBuffer::<f32>::new_in(&arena, 4).is_none());
        a.insert(0, 1.0);
        b.insert(0, (2.0, 3.0));
        assert_eq!(*a[0].value(), 1.0);
        assert_eq!(*b[0].value(), (2.0, 3.0));
        assert!(arena.used() <= arena.size());
    }

    #[test]
    fn downcast() {
        let mut buffer: Box<dyn AnyEventBuffer> = Box::new(EventBuffer::<i32>::with_capacity(4));
        buffer.downcast_mut::<i32>().insert(3, 7);
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.downcast_ref::<i32>()[0], Event::new(3, 7));
        buffer.clear();
        assert!(buffer.is_empty());
    }

    #[test]
    #[should_panic(expected = "event type mismatch")]
    #[cfg(debug_assertions)]
    fn downcast_mismatch_asserts() {
        let buffer: Box<dyn AnyEventBuffer> = Box::new(EventBuffer::<i32>::with_capacity(4));
        let _ = buffer.downcast_ref::<f32>();
    }

    proptest! {
        #[test]
        fn iteration_is_sorted_and_stable(offsets in prop::collection::vec(0usize..16, 0..64)) {
            let mut buffer = EventBuffer::with_capacity(64);
            for (order, offset) in offsets.iter().enumerate() {
                buffer.insert(*offset, order);
            }
            prop_assert_eq!(buffer.len(), offsets.len());
            for pair in buffer.windows(2) {
                prop_assert!(pair[0].offset() <= pair[1].offset());
                if pair[0].offset() == pair[1].offset() {
                    prop_assert!(pair[0].value() < pair[1].value());
                }
            }
        }
    }
}
