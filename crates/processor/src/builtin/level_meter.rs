use buffer::Slice;

use crate::{Context, EventPort, Processor};

/// Levels below this are reported as silence.
pub const MIN_LEVEL: f32 = 0.001;

/// Release time of the peak envelope, in seconds.
const RELEASE: f32 = 0.4;

/// Peak envelope follower with instant attack and exponential release.
#[derive(Clone, Copy, Debug)]
pub struct LevelMeter {
    release: f32,
    peak: f32,
}

impl LevelMeter {
    pub fn new(sample_rate: f32) -> Self {
        debug_assert!(sample_rate > 0.0);
        Self {
            release: 9.0_f32.powf(-1.0 / (RELEASE * sample_rate)),
            peak: 0.0,
        }
    }

    #[inline]
    pub fn push(&mut self, sample: f32) {
        let abs = sample.abs();
        self.peak = if abs > self.peak {
            abs
        } else {
            abs + self.release * (self.peak - abs)
        };
    }

    pub fn extend(&mut self, samples: &[f32]) {
        for sample in samples {
            self.push(*sample);
        }
    }

    /// Feed `count` repetitions of `value`.
    pub fn push_constant(&mut self, value: f32, count: usize) {
        for _ in 0..count {
            self.push(value);
        }
    }

    /// The current peak, or zero below [MIN_LEVEL].
    pub fn peak_level(&self) -> f32 {
        if self.peak < MIN_LEVEL { 0.0 } else { self.peak }
    }
}

/// Meters one audio input and emits the peak level once per block at offset 0.
pub struct LevelMeterProcessor {
    meter: LevelMeter,
    ports: [EventPort; 1],
}

impl LevelMeterProcessor {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            meter: LevelMeter::new(sample_rate),
            ports: [EventPort::new::<f32>("peak")],
        }
    }
}

impl Processor for LevelMeterProcessor {
    fn type_name(&self) -> &str {
        "level_meter"
    }

    fn num_inputs(&self) -> usize {
        1
    }

    fn num_outputs(&self) -> usize {
        0
    }

    fn event_outputs(&self) -> &[EventPort] {
        &self.ports
    }

    fn process(&mut self, mut context: Context<'_>) {
        match context.inputs.get(0) {
            Slice::Constant(value) => self.meter.push_constant(value, context.buffer_size),
            Slice::Span(span) => self.meter.extend(span),
        }
        context
            .event_outputs
            .get_mut::<f32>(0)
            .insert(0, self.meter.peak_level());
    }
}
