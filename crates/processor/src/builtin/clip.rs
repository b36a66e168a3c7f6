use buffer::slice;

use crate::{Context, Processor};

/// Clamps every sample of its single input to `[min, max]`.
pub struct Clip {
    min: f32,
    max: f32,
}

impl Clip {
    pub fn new(min: f32, max: f32) -> Self {
        debug_assert!(min <= max);
        Self { min, max }
    }
}

impl Processor for Clip {
    fn type_name(&self) -> &str {
        "clip"
    }

    fn num_inputs(&self) -> usize {
        1
    }

    fn num_outputs(&self) -> usize {
        1
    }

    fn process(&mut self, mut context: Context<'_>) {
        let produced = slice::clip(
            context.inputs.get(0),
            self.min,
            self.max,
            &mut context.outputs[0],
        );
        context.results.set(0, produced);
    }
}
