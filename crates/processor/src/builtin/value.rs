//! Processors bridging single values between the control thread and the audio thread.
//!
//! Each constructor returns the processor for the graph together with the handle the control
//! thread keeps. Handles report [ValueInput::is_orphaned] once the graph has dropped the processor.
use std::borrow::Cow;

use util::sync::{slot, Consumer, Producer};

use crate::{Context, EventPort, Processor};

/// Emits the value set by the control thread, only when it changes.
///
/// Values are compared when they arrive, so a value unequal to itself (NaN) is emitted once per
/// `set` and not on every block.
pub struct ValueInputProcessor<T: Send> {
    name: Cow<'static, str>,
    ports: [EventPort; 1],
    consumer: Consumer<T>,
    value: T,
    sent: Option<T>,
}

/// Control thread side of a [ValueInputProcessor].
pub struct ValueInput<T: Send> {
    producer: Producer<T>,
}

/// Publishes the last event received to the control thread.
pub struct ValueOutputProcessor<T: Send> {
    name: Cow<'static, str>,
    ports: [EventPort; 1],
    producer: Producer<T>,
}

/// Control thread side of a [ValueOutputProcessor].
pub struct ValueOutput<T: Send> {
    consumer: Consumer<T>,
    value: T,
}

/// Both of the above: values set by the control thread are emitted, input events are forwarded
/// and the last one is published.
pub struct ValueIoProcessor<T: Send> {
    name: Cow<'static, str>,
    ports: [EventPort; 1],
    consumer: Consumer<T>,
    producer: Producer<T>,
    value: T,
    sent: Option<T>,
}

/// Control thread side of a [ValueIoProcessor].
pub struct ValueIo<T: Send> {
    producer: Producer<T>,
    consumer: Consumer<T>,
    value: T,
}

pub fn value_input<T>(
    name: impl Into<Cow<'static, str>>,
    initial: T,
) -> (ValueInputProcessor<T>, ValueInput<T>)
where
    T: Copy + Default + PartialEq + Send + 'static,
{
    let (producer, consumer) = slot();
    let processor = ValueInputProcessor {
        name: name.into(),
        ports: [EventPort::new::<T>("out")],
        consumer,
        value: initial,
        sent: None,
    };
    (processor, ValueInput { producer })
}

pub fn value_output<T>(
    name: impl Into<Cow<'static, str>>,
) -> (ValueOutputProcessor<T>, ValueOutput<T>)
where
    T: Copy + Default + Send + 'static,
{
    let (producer, consumer) = slot();
    let processor = ValueOutputProcessor {
        name: name.into(),
        ports: [EventPort::new::<T>("in")],
        producer,
    };
    let handle = ValueOutput {
        consumer,
        value: T::default(),
    };
    (processor, handle)
}

pub fn value_io<T>(
    name: impl Into<Cow<'static, str>>,
    initial: T,
) -> (ValueIoProcessor<T>, ValueIo<T>)
where
    T: Copy + Default + PartialEq + Send + 'static,
{
    let (to_audio, from_control) = slot();
    let (to_control, from_audio) = slot();
    let processor = ValueIoProcessor {
        name: name.into(),
        ports: [EventPort::new::<T>("value")],
        consumer: from_control,
        producer: to_control,
        value: initial,
        sent: None,
    };
    let handle = ValueIo {
        producer: to_audio,
        consumer: from_audio,
        value: initial,
    };
    (processor, handle)
}

impl<T: Copy + Default + PartialEq + Send + 'static> Processor for ValueInputProcessor<T> {
    fn type_name(&self) -> &str {
        "value_input"
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn num_inputs(&self) -> usize {
        0
    }

    fn num_outputs(&self) -> usize {
        0
    }

    fn event_outputs(&self) -> &[EventPort] {
        &self.ports
    }

    fn process(&mut self, mut context: Context<'_>) {
        let updated = self.consumer.pull(&mut self.value);
        if self.sent.is_none() || (updated && self.sent != Some(self.value)) {
            context.event_outputs.get_mut::<T>(0).insert(0, self.value);
            self.sent = Some(self.value);
        }
    }
}

impl<T: Send> ValueInput<T> {
    pub fn set(&mut self, value: T) {
        self.producer.push(value);
    }

    pub fn is_orphaned(&self) -> bool {
        self.producer.is_orphaned()
    }
}

impl<T: Copy + Default + Send + 'static> Processor for ValueOutputProcessor<T> {
    fn type_name(&self) -> &str {
        "value_output"
    }

    fn name(&self) -> &str {
        &self.name
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

    fn process(&mut self, context: Context<'_>) {
        if let Some(event) = context.event_inputs.get::<T>(0).last() {
            self.producer.push(*event.value());
        }
    }
}

impl<T: Copy + Send> ValueOutput<T> {
    /// The latest published value.
    pub fn get(&mut self) -> T {
        self.consumer.pull(&mut self.value);
        self.value
    }

    /// Call `f` if a value was published since the last call.
    pub fn consume(&mut self, f: impl FnOnce(T)) {
        if self.consumer.pull(&mut self.value) {
            f(self.value);
        }
    }

    pub fn is_orphaned(&self) -> bool {
        self.consumer.is_orphaned()
    }
}

impl<T: Copy + Default + PartialEq + Send + 'static> Processor for ValueIoProcessor<T> {
    fn type_name(&self) -> &str {
        "value_io"
    }

    fn name(&self) -> &str {
        &self.name
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
        let input = context.event_inputs.get::<T>(0);
        let output = context.event_outputs.get_mut::<T>(0);

        let updated = self.consumer.pull(&mut self.value);
        if self.sent.is_none() || (updated && self.sent != Some(self.value)) {
            output.insert(0, self.value);
            self.sent = Some(self.value);
        }

        for event in input {
            output.insert(event.offset(), *event.value());
            self.sent = Some(*event.value());
        }
        if let Some(event) = input.last() {
            self.value = *event.value();
            self.producer.push(self.value);
        }
    }
}

impl<T: Copy + Send> ValueIo<T> {
    pub fn set(&mut self, value: T) {
        self.producer.push(value);
    }

    /// The latest value seen by the processor on its event input.
    pub fn get(&mut self) -> T {
        self.consumer.pull(&mut self.value);
        self.value
    }

    pub fn consume(&mut self, f: impl FnOnce(T)) {
        if self.consumer.pull(&mut self.value) {
            f(self.value);
        }
    }

    pub fn is_orphaned(&self) -> bool {
        self.producer.is_orphaned()
    }
}

#[cfg(test)]
mod tests {
    use super::{value_input, value_io, value_output};
    use crate::harness::Harness;
    use buffer::Event;

    #[test]
    fn input_emits_initial_value_once() {
        let (mut processor, _handle) = value_input("gain", 0.5_f32);
        let mut harness = Harness::new(&processor, 16);
        harness.run(&mut processor);
        assert_eq!(harness.events::<f32>(0), vec![Event::new(0, 0.5)]);
        harness.run(&mut processor);
        assert!(harness.events::<f32>(0).is_empty());
    }

    #[test]
    fn input_suppresses_unchanged_values() {
        let (mut processor, mut handle) = value_input("mute", false);
        let mut harness = Harness::new(&processor, 16);
        harness.run(&mut processor);

        handle.set(true);
        harness.run(&mut processor);
        assert_eq!(harness.events::<bool>(0), vec![Event::new(0, true)]);

        handle.set(true);
        harness.run(&mut processor);
        assert!(harness.events::<bool>(0).is_empty());

        handle.set(false);
        handle.set(true);
        harness.run(&mut processor);
        assert!(harness.events::<bool>(0).is_empty());
    }

    #[test]
    fn nan_is_emitted_once_per_set() {
        let (mut processor, mut handle) = value_input("gain", 1.0_f32);
        let mut harness = Harness::new(&processor, 16);
        harness.run(&mut processor);

        handle.set(f32::NAN);
        harness.run(&mut processor);
        let events = harness.events::<f32>(0);
        assert_eq!(events.len(), 1);
        assert!(events[0].value().is_nan());

        harness.run(&mut processor);
        assert!(harness.events::<f32>(0).is_empty());
        harness.run(&mut processor);
        assert!(harness.events::<f32>(0).is_empty());
    }

    #[test]
    fn output_keeps_last_event() {
        let (mut processor, mut handle) = value_output::<i32>("level");
        let mut harness = Harness::new(&processor, 16);
        assert_eq!(handle.get(), 0);

        harness.event_input::<i32>(0).insert(1, 7);
        harness.event_input::<i32>(0).insert(9, 8);
        harness.run(&mut processor);
        let mut seen = Vec::new();
        handle.consume(|value| seen.push(value));
        handle.consume(|value| seen.push(value));
        assert_eq!(seen, vec![8]);
        assert_eq!(handle.get(), 8);

        harness.run(&mut processor);
        assert_eq!(handle.get(), 8);
    }

    #[test]
    fn io_forwards_and_publishes() {
        let (mut processor, mut handle) = value_io("solo", 1_i32);
        let mut harness = Harness::new(&processor, 16);
        harness.run(&mut processor);
        assert_eq!(harness.events::<i32>(0), vec![Event::new(0, 1)]);

        handle.set(2);
        harness.event_input::<i32>(0).insert(4, 3);
        harness.event_input::<i32>(0).insert(4, 5);
        harness.run(&mut processor);
        assert_eq!(
            harness.events::<i32>(0),
            vec![Event::new(0, 2), Event::new(4, 3), Event::new(4, 5)]
        );
        assert_eq!(handle.get(), 5);

        harness.run(&mut processor);
        assert!(harness.events::<i32>(0).is_empty());
    }

    #[test]
    fn handles_notice_dropped_processors() {
        let (processor, handle) = value_input("gain", 0.0_f32);
        drop(processor);
        assert!(handle.is_orphaned());
    }
}
