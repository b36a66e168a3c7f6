use buffer::{Produced, Slice};

use crate::{Context, Processor};

/// Sums its inputs into one output.
///
/// Constant inputs fold into a single offset and a lone span input is forwarded untouched, so
/// mixing silence costs nothing.
pub struct Mix {
    num_inputs: usize,
}

impl Mix {
    pub fn new(num_inputs: usize) -> Self {
        debug_assert!(num_inputs > 1, "mixing fewer than two inputs");
        Self { num_inputs }
    }
}

impl Processor for Mix {
    fn type_name(&self) -> &str {
        "mix"
    }

    fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    fn num_outputs(&self) -> usize {
        1
    }

    fn process(&mut self, mut context: Context<'_>) {
        let out = &mut context.outputs[0];
        let mut offset = 0.0;
        let mut pending: Option<&[f32]> = None;
        let mut accumulated = false;

        for input in context.inputs.iter() {
            match input {
                Slice::Constant(value) => offset += value,
                Slice::Span(span) if accumulated => {
                    for (out, x) in out.iter_mut().zip(span) {
                        *out += x;
                    }
                }
                Slice::Span(span) => match pending.take() {
                    Some(first) => {
                        for ((out, a), b) in out.iter_mut().zip(first).zip(span) {
                            *out = a + b;
                        }
                        accumulated = true;
                    }
                    None => pending = Some(span),
                },
            }
        }

        let produced = if accumulated {
            if offset != 0.0 {
                out.iter_mut().for_each(|out| *out += offset);
            }
            Produced::Buffer
        } else if let Some(span) = pending {
            buffer::slice::add(Slice::Span(span), Slice::Constant(offset), out)
        } else {
            Produced::Slice(Slice::Constant(offset))
        };
        context.results.set(0, produced);
    }
}
