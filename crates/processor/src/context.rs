//! The block-scoped view handed to [crate::Processor::process].
use std::{any::TypeId, ptr::NonNull};

use buffer::{AnyEventBuffer, Event, EventBuffer, Inputs, Outputs, Results};

/// Everything a processor may touch during one block.
pub struct Context<'a> {
    /// Number of frames in this block.
    pub buffer_size: usize,

    /// One slice per audio input.
    pub inputs: Inputs<'a>,

    /// One scratch buffer per audio output, `buffer_size` samples long.
    pub outputs: Outputs<'a>,

    /// What each audio output produced. Every output starts out as its own buffer.
    pub results: Results<'a>,

    /// One (possibly unconnected) buffer per event input.
    pub event_inputs: EventInputs<'a>,

    /// One buffer per event output, empty at the start of the block.
    pub event_outputs: EventOutputs<'a>,
}

/// The event input buffers of a processor for one block.
#[derive(Clone, Copy)]
pub struct EventInputs<'a> {
    buffers: &'a [Option<NonNull<dyn AnyEventBuffer>>],
}

/// The event output buffers of a processor for one block.
pub struct EventOutputs<'a> {
    buffers: &'a mut [Box<dyn AnyEventBuffer>],
}

impl<'a> EventInputs<'a> {
    /// # Safety
    /// Every connected pointer must reference a live buffer that is not written during `'a`.
    pub unsafe fn from_raw(buffers: &'a [Option<NonNull<dyn AnyEventBuffer>>]) -> Self {
        Self { buffers }
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    pub fn is_connected(&self, index: usize) -> bool {
        self.buffers[index].is_some()
    }

    /// The type of the connected buffer, if any.
    pub fn event_type(&self, index: usize) -> Option<TypeId> {
        self.buffers[index].map(|buffer| unsafe { buffer.as_ref() }.event_type())
    }

    /// The events on input `index`. Unconnected inputs have none.
    pub fn get<T: Copy + Send + 'static>(&self, index: usize) -> &'a [Event<T>] {
        match self.buffers[index] {
            Some(buffer) => unsafe { buffer.as_ref() }.downcast_ref::<T>().as_slice(),
            None => &[],
        }
    }
}

impl<'a> EventOutputs<'a> {
    pub fn new(buffers: &'a mut [Box<dyn AnyEventBuffer>]) -> Self {
        Self { buffers }
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    pub fn event_type(&self, index: usize) -> TypeId {
        self.buffers[index].event_type()
    }

    pub fn get_mut<T: Copy + Send + 'static>(&mut self, index: usize) -> &mut EventBuffer<T> {
        self.buffers[index].downcast_mut::<T>()
    }

    /// Borrow two distinct outputs at once. Requires `first < second`.
    pub fn pair_mut<T, U>(
        &mut self,
        first: usize,
        second: usize,
    ) -> (&mut EventBuffer<T>, &mut EventBuffer<U>)
    where
        T: Copy + Send + 'static,
        U: Copy + Send + 'static,
    {
        assert!(first < second, "outputs must be distinct and ordered");
        let (lo, hi) = self.buffers.split_at_mut(second);
        (lo[first].downcast_mut::<T>(), hi[0].downcast_mut::<U>())
    }
}
