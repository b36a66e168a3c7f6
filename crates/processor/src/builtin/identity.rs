use std::marker::PhantomData;

use buffer::Produced;

use crate::{Context, EventPort, Processor};

/// Type tag of [EventIdentity]. Graphs remove these processors before compiling.
pub const EVENT_IDENTITY: &str = "event_identity";

/// Forwards every audio input to the output with the same index.
pub struct Identity {
    num_channels: usize,
}

/// A typed event junction. Components expose these as stable endpoints; the graph rewires around
/// them so they never run.
pub struct EventIdentity<T> {
    ports: [EventPort; 1],
    _p: PhantomData<fn() -> T>,
}

impl Identity {
    pub fn new(num_channels: usize) -> Self {
        Self { num_channels }
    }
}

impl Processor for Identity {
    fn type_name(&self) -> &str {
        "identity"
    }

    fn num_inputs(&self) -> usize {
        self.num_channels
    }

    fn num_outputs(&self) -> usize {
        self.num_channels
    }

    fn process(&mut self, mut context: Context<'_>) {
        for (index, input) in context.inputs.iter().enumerate() {
            context.results.set(index, Produced::Slice(input));
        }
    }
}

impl<T: Copy + Send + 'static> EventIdentity<T> {
    pub fn new() -> Self {
        Self {
            ports: [EventPort::new::<T>("")],
            _p: PhantomData,
        }
    }
}

impl<T: Copy + Send + 'static> Default for EventIdentity<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + Send + 'static> Processor for EventIdentity<T> {
    fn type_name(&self) -> &str {
        EVENT_IDENTITY
    }

    fn num_inputs(&self) -> usize {
        0
    }

    fn num_outputs(&self) -> usize {
        0
    }

    fn event_inputs(&self) -> &[EventPort] {
        &self.ports
    }

    fn event_outputs(&self) -> &[EventPort] {
        &self.ports
    }

    fn process(&mut self, mut context: Context<'_>) {
        debug_assert!(false, "event identity processors must be bypassed");
        let input = context.event_inputs.get::<T>(0);
        let output = context.event_outputs.get_mut::<T>(0);
        for event in input {
            output.insert(event.offset(), *event.value());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Identity;
    use crate::harness::{Harness, Rendered};

    #[test]
    fn forwards_inputs() {
        let mut identity = Identity::new(2);
        let mut harness = Harness::new(&identity, 4);
        harness.set_constant(0, 0.5);
        harness.set_samples(1, &[1.0, 2.0, 3.0, 4.0]);
        harness.run(&mut identity);
        assert_eq!(harness.output(0), Rendered::Constant(0.5));
        assert_eq!(harness.output(1), Rendered::Samples(vec![1.0, 2.0, 3.0, 4.0]));
    }
}
