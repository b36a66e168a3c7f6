//! Audio buffer storage and per-block views.
//!
//! - [Arena]: a slab of aligned, fixed size channel buffers handed out to processor outputs when
//!   an executor is compiled.
//! - [Inputs]: the slices bound to a processor's inputs for one block.
//! - [Outputs]: the processor's own output buffers, trimmed to the block size.
//! - [Results]: what each output produced, read by downstream inputs.
use std::{
    alloc::Layout,
    marker::PhantomData,
    ops::{Index, IndexMut},
    ptr::NonNull,
};

use util::collections::Stack;

use crate::slice::{Produced, RawSlice, Slice};

/// Alignment of every channel buffer, in bytes.
pub const ALIGNMENT: usize = 64;

const FLOATS_PER_LINE: usize = ALIGNMENT / std::mem::size_of::<f32>();

pub struct Arena {
    slab: NonNull<f32>,
    layout: Layout,
    stride: usize,
    max_num_channels: usize,
    max_num_frames: usize,
    stack: Stack<NonNull<f32>>,
}

/// The audio inputs of a processor for one block.
#[derive(Clone, Copy)]
pub struct Inputs<'a> {
    slices: &'a [*const RawSlice],
    _p: PhantomData<Slice<'a>>,
}

/// The audio output buffers of a processor for one block.
pub struct Outputs<'a> {
    channels: &'a [NonNull<f32>],
    num_frames: usize,
}

/// The result cells of a processor for one block.
pub struct Results<'a> {
    slots: &'a mut [RawSlice],
    channels: &'a [NonNull<f32>],
    num_frames: usize,
    _p: PhantomData<Slice<'a>>,
}

impl Arena {
    /// Create an arena holding `max_num_channels` buffers of `max_num_frames` samples each.
    pub fn new(max_num_channels: usize, max_num_frames: usize) -> Self {
        // Pad each channel to a whole number of cache lines so every channel stays aligned.
        let stride = max_num_frames.div_ceil(FLOATS_PER_LINE).max(1) * FLOATS_PER_LINE;
        let size = (max_num_channels * stride * std::mem::size_of::<f32>()).max(ALIGNMENT);
        let Ok(layout) = Layout::from_size_align(size, ALIGNMENT) else {
            unreachable!("audio arena size overflow")
        };

        // Allocate the slab.
        let slab = unsafe { std::alloc::alloc_zeroed(layout) };
        let Some(slab) = NonNull::new(slab.cast::<f32>()) else {
            std::alloc::handle_alloc_error(layout)
        };

        let mut arena = Self {
            slab,
            layout,
            stride,
            max_num_channels,
            max_num_frames,
            stack: Stack::new(max_num_channels),
        };
        arena.reset();
        arena
    }

    pub fn max_num_frames(&self) -> usize {
        self.max_num_frames
    }

    pub fn max_num_channels(&self) -> usize {
        self.max_num_channels
    }

    /// Number of channels that can still be acquired.
    pub fn available(&self) -> usize {
        self.stack.len()
    }

    /// Take a zeroed channel buffer of `max_num_frames` samples. Returns None when exhausted.
    pub fn acquire(&mut self) -> Option<NonNull<f32>> {
        let channel = self.stack.pop()?;
        unsafe {
            std::ptr::write_bytes(channel.as_ptr(), 0, self.max_num_frames);
        }
        Some(channel)
    }

    /// Return a buffer previously taken from [Arena::acquire].
    pub fn release(&mut self, channel: NonNull<f32>) {
        debug_assert!(self.owns(channel), "channel was not allocated by this arena");
        self.stack.push(channel);
    }

    /// Make every channel available again. Outstanding pointers must no longer be used.
    pub fn reset(&mut self) {
        self.stack.clear();
        for idx in (0..self.max_num_channels).rev() {
            let channel = unsafe { NonNull::new_unchecked(self.slab.as_ptr().add(idx * self.stride)) };
            self.stack.push(channel);
        }
    }

    fn owns(&self, channel: NonNull<f32>) -> bool {
        let start = self.slab.as_ptr() as usize;
        let end = start + self.max_num_channels * self.stride * std::mem::size_of::<f32>();
        let ptr = channel.as_ptr() as usize;
        (start..end).contains(&ptr)
    }
}

impl Drop for Arena {
    fn drop(&mut self) {
        unsafe {
            std::alloc::dealloc(self.slab.as_ptr().cast(), self.layout);
        }
    }
}

unsafe impl Send for Arena {}

impl<'a> Inputs<'a> {
    /// # Safety
    /// Every pointer must reference a live [RawSlice] whose samples outlive `'a`.
    pub unsafe fn from_raw(slices: &'a [*const RawSlice]) -> Self {
        Self {
            slices,
            _p: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    pub fn get(&self, index: usize) -> Slice<'a> {
        debug_assert!(index < self.slices.len(), "input {index} out of bounds");
        unsafe { (**self.slices.get_unchecked(index)).get() }
    }

    pub fn iter(&self) -> impl Iterator<Item = Slice<'a>> + '_ {
        (0..self.len()).map(|index| self.get(index))
    }
}

impl<'a> Outputs<'a> {
    /// # Safety
    /// Every channel must point to at least `num_frames` samples that nothing else accesses
    /// for `'a`.
    pub unsafe fn from_raw(channels: &'a [NonNull<f32>], num_frames: usize) -> Self {
        Self {
            channels,
            num_frames,
        }
    }

    /// Number of output channels.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Number of frames in this block.
    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    /// Iterate the output channels.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut [f32]> + '_ {
        let num_frames = self.num_frames;
        self.channels
            .iter()
            .map(move |channel| unsafe { std::slice::from_raw_parts_mut(channel.as_ptr(), num_frames) })
    }
}

impl Index<usize> for Outputs<'_> {
    type Output = [f32];
    fn index(&self, index: usize) -> &Self::Output {
        debug_assert!(index < self.channels.len(), "output {index} out of bounds");
        unsafe {
            let channel = *self.channels.get_unchecked(index);
            std::slice::from_raw_parts(channel.as_ptr(), self.num_frames)
        }
    }
}

impl IndexMut<usize> for Outputs<'_> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        debug_assert!(index < self.channels.len(), "output {index} out of bounds");
        unsafe {
            let channel = *self.channels.get_unchecked(index);
            std::slice::from_raw_parts_mut(channel.as_ptr(), self.num_frames)
        }
    }
}

impl<'a> Results<'a> {
    /// Bind the result cells of a processor and point every one at its own output buffer.
    ///
    /// # Safety
    /// `channels` must satisfy the requirements of [Outputs::from_raw].
    pub unsafe fn from_raw(
        slots: &'a mut [RawSlice],
        channels: &'a [NonNull<f32>],
        num_frames: usize,
    ) -> Self {
        debug_assert_eq!(slots.len(), channels.len(), "one result per output");
        for (slot, channel) in slots.iter_mut().zip(channels) {
            *slot = RawSlice::from_raw_parts(channel.as_ptr(), num_frames);
        }
        Self {
            slots,
            channels,
            num_frames,
            _p: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Record what output `index` produced this block.
    pub fn set(&mut self, index: usize, produced: Produced<'a>) {
        debug_assert!(index < self.slots.len(), "result {index} out of bounds");
        self.slots[index] = match produced {
            Produced::Buffer => {
                RawSlice::from_raw_parts(self.channels[index].as_ptr(), self.num_frames)
            }
            Produced::Slice(slice) => slice.into(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::{Arena, Inputs, Outputs, Results, ALIGNMENT};
    use crate::slice::{Produced, RawSlice, Slice};

    #[test]
    fn channels_are_aligned_and_distinct() {
        let mut arena = Arena::new(3, 100);
        let a = arena.acquire().unwrap();
        let b = arena.acquire().unwrap();
        let c = arena.acquire().unwrap();
        assert!(arena.acquire().is_none());
        for channel in [a, b, c] {
            assert_eq!(channel.as_ptr() as usize % ALIGNMENT, 0);
        }
        assert!((b.as_ptr() as usize).abs_diff(a.as_ptr() as usize) >= 100 * 4);
        assert!((c.as_ptr() as usize).abs_diff(b.as_ptr() as usize) >= 100 * 4);
    }

    #[test]
    fn acquire_zeroes() {
        let mut arena = Arena::new(1, 16);
        let channel = arena.acquire().unwrap();
        unsafe { std::slice::from_raw_parts_mut(channel.as_ptr(), 16) }.fill(1.0);
        arena.release(channel);
        let channel = arena.acquire().unwrap();
        let samples = unsafe { std::slice::from_raw_parts(channel.as_ptr(), 16) };
        assert!(samples.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn reset() {
        let mut arena = Arena::new(2, 8);
        arena.acquire();
        arena.acquire();
        assert_eq!(arena.available(), 0);
        arena.reset();
        assert_eq!(arena.available(), 2);
    }

    #[test]
    fn views() {
        let mut arena = Arena::new(1, 4);
        let channels = [arena.acquire().unwrap()];
        let mut outputs = unsafe { Outputs::from_raw(&channels, 4) };
        outputs[0].copy_from_slice(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(outputs.len(), 1);

        let results = [RawSlice::span(&outputs[0]), RawSlice::constant(0.5)];
        let pointers = [&results[0] as *const RawSlice, &results[1] as *const RawSlice];
        let inputs = unsafe { Inputs::from_raw(&pointers) };
        assert_eq!(inputs.get(0), Slice::Span(&[1.0, 2.0, 3.0, 4.0]));
        assert_eq!(inputs.get(1), Slice::Constant(0.5));
        assert_eq!(inputs.iter().count(), 2);
    }

    #[test]
    fn results_default_to_the_output_buffer() {
        let mut arena = Arena::new(2, 4);
        let channels = [arena.acquire().unwrap(), arena.acquire().unwrap()];
        let mut slots = [RawSlice::SILENCE; 2];
        let forwarded = [9.0; 4];
        {
            let mut results = unsafe { Results::from_raw(&mut slots, &channels, 4) };
            results.set(1, Produced::Slice(Slice::Span(&forwarded)));
            results.set(1, Produced::Slice(Slice::Constant(0.25)));
        }
        let first = unsafe { slots[0].get() };
        assert_eq!(first.span().map(|span| span.as_ptr()), Some(channels[0].as_ptr().cast_const()));
        assert_eq!(unsafe { slots[1].get() }, Slice::Constant(0.25));
    }
}
