use buffer::{Produced, Slice};

use crate::{Context, Processor};

/// Multiplies its inputs sample by sample.
pub struct Multiply {
    num_inputs: usize,
}

impl Multiply {
    pub fn new(num_inputs: usize) -> Self {
        debug_assert!(num_inputs > 1, "multiplying fewer than two inputs");
        Self { num_inputs }
    }
}

impl Processor for Multiply {
    fn type_name(&self) -> &str {
        "multiply"
    }

    fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    fn num_outputs(&self) -> usize {
        1
    }

    fn process(&mut self, mut context: Context<'_>) {
        let out = &mut context.outputs[0];
        let mut gain = 1.0;
        let mut pending: Option<&[f32]> = None;
        let mut accumulated = false;

        for input in context.inputs.iter() {
            match input {
                Slice::Constant(value) => gain *= value,
                Slice::Span(span) if accumulated => {
                    for (out, x) in out.iter_mut().zip(span) {
                        *out *= x;
                    }
                }
                Slice::Span(span) => match pending.take() {
                    Some(first) => {
                        for ((out, a), b) in out.iter_mut().zip(first).zip(span) {
                            *out = a * b;
                        }
                        accumulated = true;
                    }
                    None => pending = Some(span),
                },
            }
        }

        let produced = if gain == 0.0 {
            Produced::Slice(Slice::SILENCE)
        } else if accumulated {
            if gain != 1.0 {
                out.iter_mut().for_each(|out| *out *= gain);
            }
            Produced::Buffer
        } else if let Some(span) = pending {
            buffer::slice::multiply(Slice::Span(span), Slice::Constant(gain), out)
        } else {
            Produced::Slice(Slice::Constant(gain))
        };
        context.results.set(0, produced);
    }
}
