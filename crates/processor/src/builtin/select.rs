use buffer::{Produced, Slice};

use crate::{Context, EventPort, Processor};

/// Forwards one of its inputs, chosen by index events.
///
/// An index past the last input selects silence. When the selection holds for the whole block
/// the input is forwarded without copying.
pub struct Select {
    num_inputs: usize,
    selected: usize,
    ports: [EventPort; 1],
}

impl Select {
    pub fn new(num_inputs: usize) -> Self {
        debug_assert!(num_inputs > 0, "selecting from no inputs");
        Self {
            num_inputs,
            selected: 0,
            ports: [EventPort::new::<usize>("select")],
        }
    }
}

impl Processor for Select {
    fn type_name(&self) -> &str {
        "select"
    }

    fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    fn num_outputs(&self) -> usize {
        1
    }

    fn event_inputs(&self) -> &[EventPort] {
        &self.ports
    }

    fn process(&mut self, mut context: Context<'_>) {
        let inputs = context.inputs;
        let source = |index: usize| {
            if index < inputs.len() {
                inputs.get(index)
            } else {
                Slice::SILENCE
            }
        };

        let events = context.event_inputs.get::<usize>(0);
        if events.iter().all(|event| event.offset() == 0) {
            if let Some(event) = events.last() {
                self.selected = *event.value();
            }
            context.results.set(0, Produced::Slice(source(self.selected)));
            return;
        }

        let out = &mut context.outputs[0];
        let mut start = 0;
        for event in events {
            copy_range(source(self.selected), start, &mut out[start..event.offset()]);
            self.selected = *event.value();
            start = event.offset();
        }
        copy_range(source(self.selected), start, &mut out[start..context.buffer_size]);
        context.results.set(0, Produced::Buffer);
    }
}

fn copy_range(slice: Slice<'_>, start: usize, out: &mut [f32]) {
    match slice {
        Slice::Constant(value) => out.fill(value),
        Slice::Span(span) => out.copy_from_slice(&span[start..start + out.len()]),
    }
}

#[cfg(test)]
mod tests {
    use super::Select;
    use crate::harness::{Harness, Rendered};

    fn harness(select: &Select) -> Harness {
        let mut harness = Harness::new(select, 16);
        harness.set_constant(0, 0.25);
        harness.set_constant(1, 0.5);
        harness.set_constant(2, 0.75);
        harness
    }

    #[test]
    fn selects_first_input_by_default() {
        let mut select = Select::new(3);
        let mut harness = harness(&select);
        harness.run(&mut select);
        assert_eq!(harness.output(0), Rendered::Constant(0.25));
    }

    #[test]
    fn selection_at_block_start_forwards() {
        let mut select = Select::new(3);
        let mut harness = harness(&select);
        harness.event_input::<usize>(0).insert(0, 1);
        harness.run(&mut select);
        assert_eq!(harness.output(0), Rendered::Constant(0.5));

        harness.run(&mut select);
        assert_eq!(harness.output(0), Rendered::Constant(0.5));
    }

    #[test]
    fn switches_within_a_block() {
        let mut select = Select::new(3);
        let mut harness = harness(&select);
        harness.event_input::<usize>(0).insert(8, 1);
        harness.run(&mut select);
        let mut expected = vec![0.25; 8];
        expected.extend([0.5; 8]);
        assert_eq!(harness.output(0), Rendered::Samples(expected));

        harness.event_input::<usize>(0).insert(0, 1);
        harness.event_input::<usize>(0).insert(4, 2);
        harness.run(&mut select);
        let mut expected = vec![0.5; 4];
        expected.extend([0.75; 12]);
        assert_eq!(harness.output(0), Rendered::Samples(expected));
    }

    #[test]
    fn spans_are_copied_in_place() {
        let mut select = Select::new(2);
        let mut harness = Harness::new(&select, 4);
        harness.set_samples(0, &[1.0, 2.0, 3.0, 4.0]);
        harness.set_samples(1, &[5.0, 6.0, 7.0, 8.0]);
        harness.event_input::<usize>(0).insert(2, 1);
        harness.run(&mut select);
        assert_eq!(harness.output(0), Rendered::Samples(vec![1.0, 2.0, 7.0, 8.0]));
    }

    #[test]
    fn out_of_range_is_silent() {
        let mut select = Select::new(3);
        let mut harness = harness(&select);
        harness.event_input::<usize>(0).insert(0, 10);
        harness.run(&mut select);
        assert_eq!(harness.output(0), Rendered::Constant(0.0));
    }
}
