use buffer::{Produced, Slice};

use crate::{Context, EventPort, Processor};

/// Ramp length used by [EventToAudio::default].
pub const DEFAULT_SMOOTH_LENGTH: usize = 128;

/// Turns `f32` events into an audio rate signal, ramping linearly to every new value.
///
/// While no ramp is running the output is a constant.
pub struct EventToAudio {
    ports: [EventPort; 1],
    smooth_length: usize,
    smoother: Smoother,
}

/// Linear ramp towards a target value.
#[derive(Clone, Copy, Debug, Default)]
struct Smoother {
    current: f32,
    target: f32,
    increment: f32,
    remaining: usize,
}

impl Smoother {
    fn set(&mut self, target: f32, length: usize) {
        if target == self.target {
            return;
        }
        self.target = target;
        self.remaining = length;
        if length == 0 {
            self.current = target;
            self.increment = 0.0;
        } else {
            self.increment = (target - self.current) / length as f32;
        }
    }

    fn is_running(&self) -> bool {
        self.remaining != 0
    }

    fn advance(&mut self) {
        if self.remaining == 0 {
            return;
        }
        self.current += self.increment;
        self.remaining -= 1;
        if self.remaining == 0 {
            self.current = self.target;
        }
    }

    fn fill(&mut self, out: &mut [f32]) {
        if !self.is_running() {
            out.fill(self.current);
            return;
        }
        for out in out {
            *out = self.current;
            self.advance();
        }
    }
}

impl EventToAudio {
    pub fn new(smooth_length: usize) -> Self {
        Self {
            ports: [EventPort::new::<f32>("in")],
            smooth_length,
            smoother: Smoother::default(),
        }
    }
}

impl Default for EventToAudio {
    fn default() -> Self {
        Self::new(DEFAULT_SMOOTH_LENGTH)
    }
}

impl Processor for EventToAudio {
    fn type_name(&self) -> &str {
        "event_to_audio"
    }

    fn num_inputs(&self) -> usize {
        0
    }

    fn num_outputs(&self) -> usize {
        1
    }

    fn event_inputs(&self) -> &[EventPort] {
        &self.ports
    }

    fn process(&mut self, mut context: Context<'_>) {
        let events = context.event_inputs.get::<f32>(0);
        if events.is_empty() && !self.smoother.is_running() {
            let constant = Slice::Constant(self.smoother.current);
            context.results.set(0, Produced::Slice(constant));
            return;
        }

        let out = &mut context.outputs[0];
        let mut from = 0;
        for event in events {
            let to = event.offset().min(out.len());
            self.smoother.fill(&mut out[from..to]);
            self.smoother.set(*event.value(), self.smooth_length);
            from = to;
        }
        self.smoother.fill(&mut out[from..]);
    }
}
