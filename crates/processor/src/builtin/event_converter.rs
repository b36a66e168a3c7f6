use std::marker::PhantomData;

use buffer::Event;

use crate::{Context, EventPort, Processor};

/// Combines two event streams into one.
///
/// Inputs are walked in lockstep by offset. At every offset carrying an event on either input the
/// latest value of each input is passed to the conversion function and its result emitted.
pub struct EventConverter<A, B, O, F> {
    convert: F,
    name: &'static str,
    inputs: [EventPort; 2],
    outputs: [EventPort; 1],
    last: (A, B),
    _p: PhantomData<fn() -> O>,
}

impl<A, B, O, F> EventConverter<A, B, O, F>
where
    A: Copy + Default + Send + 'static,
    B: Copy + Default + Send + 'static,
    O: Copy + Send + 'static,
    F: FnMut(A, B) -> O + Send + 'static,
{
    pub fn new(
        name: &'static str,
        input_names: [&'static str; 2],
        output_name: &'static str,
        convert: F,
    ) -> Self {
        Self {
            convert,
            name,
            inputs: [
                EventPort::new::<A>(input_names[0]),
                EventPort::new::<B>(input_names[1]),
            ],
            outputs: [EventPort::new::<O>(output_name)],
            last: (A::default(), B::default()),
            _p: PhantomData,
        }
    }
}

impl<A, B, O, F> Processor for EventConverter<A, B, O, F>
where
    A: Copy + Default + Send + 'static,
    B: Copy + Default + Send + 'static,
    O: Copy + Send + 'static,
    F: FnMut(A, B) -> O + Send + 'static,
{
    fn type_name(&self) -> &str {
        "convert"
    }

    fn name(&self) -> &str {
        self.name
    }

    fn num_inputs(&self) -> usize {
        0
    }

    fn num_outputs(&self) -> usize {
        0
    }

    fn event_inputs(&self) -> &[EventPort] {
        &self.inputs
    }

    fn event_outputs(&self) -> &[EventPort] {
        &self.outputs
    }

    fn process(&mut self, mut context: Context<'_>) {
        let a = context.event_inputs.get::<A>(0);
        let b = context.event_inputs.get::<B>(1);
        let out = context.event_outputs.get_mut::<O>(0);
        lockstep(a, b, &mut self.last, |offset, a, b| {
            out.insert(offset, (self.convert)(a, b));
        });
    }
}

/// Walk two event streams by offset, calling `f` with the latest value of each stream at every
/// offset that carries an event on either of them. `last` holds the values between blocks.
pub(crate) fn lockstep<A: Copy, B: Copy>(
    a: &[Event<A>],
    b: &[Event<B>],
    last: &mut (A, B),
    mut f: impl FnMut(usize, A, B),
) {
    let mut a = a.iter().peekable();
    let mut b = b.iter().peekable();
    loop {
        let offset = match (a.peek(), b.peek()) {
            (Some(x), Some(y)) => x.offset().min(y.offset()),
            (Some(x), None) => x.offset(),
            (None, Some(y)) => y.offset(),
            (None, None) => break,
        };
        if let Some(event) = a.next_if(|event| event.offset() == offset) {
            last.0 = *event.value();
        }
        if let Some(event) = b.next_if(|event| event.offset() == offset) {
            last.1 = *event.value();
        }
        f(offset, last.0, last.1);
    }
}

#[cfg(test)]
mod tests {
    use super::EventConverter;
    use crate::harness::Harness;
    use buffer::Event;

    #[test]
    fn lockstep() {
        let mut converter =
            EventConverter::new("sum", ["a", "b"], "sum", |a: f32, b: i32| a + b as f32);
        let mut harness = Harness::new(&converter, 16);
        harness.event_input::<f32>(0).insert(2, 1.0);
        harness.event_input::<f32>(0).insert(8, 2.0);
        harness.event_input::<i32>(1).insert(2, 10);
        harness.event_input::<i32>(1).insert(5, 20);
        harness.run(&mut converter);
        assert_eq!(
            harness.events::<f32>(0),
            vec![Event::new(2, 11.0), Event::new(5, 21.0), Event::new(8, 22.0)]
        );
    }

    #[test]
    fn remembers_values_across_blocks() {
        let mut converter =
            EventConverter::new("pair", ["l", "r"], "lr", |l: f32, r: f32| (l, r));
        let mut harness = Harness::new(&converter, 16);
        harness.event_input::<f32>(0).insert(0, 0.5);
        harness.run(&mut converter);
        assert_eq!(harness.events::<(f32, f32)>(0), vec![Event::new(0, (0.5, 0.0))]);

        harness.event_input::<f32>(1).insert(4, 0.25);
        harness.run(&mut converter);
        assert_eq!(harness.events::<(f32, f32)>(0), vec![Event::new(4, (0.5, 0.25))]);

        harness.run(&mut converter);
        assert!(harness.events::<(f32, f32)>(0).is_empty());
    }
}
