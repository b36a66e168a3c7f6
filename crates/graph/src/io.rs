//! Processors bridging the graph and the audio device.
use std::{ptr::NonNull, sync::Arc};

use buffer::{Arena, Produced, Slice};
use processor::{Context, Processor};

/// Aligned channel buffers shared between the device callback and an io processor.
pub(crate) struct DeviceChannels {
    channels: Box<[NonNull<f32>]>,
    max_num_frames: usize,
    _arena: Arena,
}

// Accesses are serialized by the audio callback: device inputs are converted before the executor
// runs, device outputs are converted after it returned.
unsafe impl Send for DeviceChannels {}
unsafe impl Sync for DeviceChannels {}

impl DeviceChannels {
    pub fn new(num_channels: usize, max_num_frames: usize) -> Self {
        let mut arena = Arena::new(num_channels, max_num_frames);
        let channels = (0..num_channels)
            .map(|_| {
                let Some(channel) = arena.acquire() else {
                    unreachable!("arena holds every device channel")
                };
                channel
            })
            .collect();
        Self {
            channels,
            max_num_frames,
            _arena: arena,
        }
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// # Safety
    /// No other reference to the channel may be alive.
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn channel_mut<'a>(&self, index: usize, num_frames: usize) -> &'a mut [f32] {
        debug_assert!(num_frames <= self.max_num_frames);
        unsafe { std::slice::from_raw_parts_mut(self.channels[index].as_ptr(), num_frames) }
    }

    /// # Safety
    /// No mutable reference to the channel may be alive.
    pub unsafe fn channel<'a>(&self, index: usize, num_frames: usize) -> &'a [f32] {
        debug_assert!(num_frames <= self.max_num_frames);
        unsafe { std::slice::from_raw_parts(self.channels[index].as_ptr(), num_frames) }
    }
}

/// Exposes the device input channels as its outputs.
pub struct InputProcessor {
    channels: Arc<DeviceChannels>,
}

/// Copies its inputs into the device output channels. Unconnected inputs write silence.
pub struct OutputProcessor {
    channels: Arc<DeviceChannels>,
}

impl InputProcessor {
    pub(crate) fn new(channels: Arc<DeviceChannels>) -> Self {
        Self { channels }
    }
}

impl OutputProcessor {
    pub(crate) fn new(channels: Arc<DeviceChannels>) -> Self {
        Self { channels }
    }
}

impl Processor for InputProcessor {
    fn type_name(&self) -> &str {
        "input"
    }

    fn num_inputs(&self) -> usize {
        0
    }

    fn num_outputs(&self) -> usize {
        self.channels.len()
    }

    fn process(&mut self, mut context: Context<'_>) {
        for index in 0..self.channels.len() {
            let samples = unsafe { self.channels.channel(index, context.buffer_size) };
            context.results.set(index, Produced::Slice(Slice::Span(samples)));
        }
    }
}

impl Processor for OutputProcessor {
    fn type_name(&self) -> &str {
        "output"
    }

    fn num_inputs(&self) -> usize {
        self.channels.len()
    }

    fn num_outputs(&self) -> usize {
        0
    }

    fn process(&mut self, context: Context<'_>) {
        for (index, input) in context.inputs.iter().enumerate() {
            input.copy_to(unsafe { self.channels.channel_mut(index, context.buffer_size) });
        }
    }
}
