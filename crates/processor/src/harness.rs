//! Runs a single processor outside of a graph.
use std::{ptr::NonNull, sync::Arc};

use buffer::{
    AnyEventBuffer, Arena, Event, EventArena, EventBuffer, Inputs, Outputs, RawSlice, Results,
    Slice,
};

use crate::{verify_process_context, Context, EventInputs, EventOutputs, EventPort, Processor};

const EVENT_CAPACITY: usize = 64;

#[derive(Clone, Debug, PartialEq)]
pub enum Rendered {
    Constant(f32),
    Samples(Vec<f32>),
}

pub struct Harness {
    buffer_size: usize,
    _arena: Arena,
    input_channels: Vec<NonNull<f32>>,
    inputs: Vec<RawSlice>,
    outputs: Vec<NonNull<f32>>,
    results: Vec<RawSlice>,
    event_input_ports: Vec<EventPort>,
    event_inputs: Vec<Option<Box<dyn AnyEventBuffer>>>,
    event_outputs: Vec<Box<dyn AnyEventBuffer>>,
}

fn make_buffer(port: &EventPort) -> Box<dyn AnyEventBuffer> {
    let arena = Arc::new(EventArena::new(port.required_arena_size(EVENT_CAPACITY)));
    port.make_buffer(&arena, EVENT_CAPACITY)
        .expect("arena sized for the port")
}

impl Harness {
    pub fn new(processor: &dyn Processor, buffer_size: usize) -> Self {
        let num_inputs = processor.num_inputs();
        let num_outputs = processor.num_outputs();
        let mut arena = Arena::new(num_inputs + num_outputs, buffer_size);
        let input_channels = (0..num_inputs)
            .map(|_| arena.acquire().unwrap())
            .collect();
        let outputs = (0..num_outputs)
            .map(|_| arena.acquire().unwrap())
            .collect();
        Self {
            buffer_size,
            _arena: arena,
            input_channels,
            inputs: vec![RawSlice::SILENCE; num_inputs],
            outputs,
            results: vec![RawSlice::SILENCE; num_outputs],
            event_input_ports: processor.event_inputs().to_vec(),
            event_inputs: processor.event_inputs().iter().map(|_| None).collect(),
            event_outputs: processor.event_outputs().iter().map(make_buffer).collect(),
        }
    }

    pub fn set_constant(&mut self, index: usize, value: f32) {
        self.inputs[index] = RawSlice::constant(value);
    }

    pub fn set_samples(&mut self, index: usize, samples: &[f32]) {
        assert_eq!(samples.len(), self.buffer_size);
        let channel = self.input_channels[index];
        let span = unsafe { std::slice::from_raw_parts_mut(channel.as_ptr(), self.buffer_size) };
        span.copy_from_slice(samples);
        self.inputs[index] = RawSlice::span(span);
    }

    /// Connect event input `index`, returning its buffer.
    pub fn event_input<T: Copy + Send + 'static>(&mut self, index: usize) -> &mut EventBuffer<T> {
        let port = &self.event_input_ports[index];
        self.event_inputs[index]
            .get_or_insert_with(|| make_buffer(port))
            .downcast_mut::<T>()
    }

    pub fn run(&mut self, processor: &mut dyn Processor) {
        for buffer in &mut self.event_outputs {
            buffer.clear();
        }
        let inputs: Vec<*const RawSlice> = self.inputs.iter().map(|slice| slice as *const _).collect();
        let event_inputs: Vec<Option<NonNull<dyn AnyEventBuffer>>> = self
            .event_inputs
            .iter()
            .map(|buffer| buffer.as_ref().map(|buffer| NonNull::from(&**buffer)))
            .collect();
        let context = Context {
            buffer_size: self.buffer_size,
            inputs: unsafe { Inputs::from_raw(&inputs) },
            outputs: unsafe { Outputs::from_raw(&self.outputs, self.buffer_size) },
            results: unsafe { Results::from_raw(&mut self.results, &self.outputs, self.buffer_size) },
            event_inputs: unsafe { EventInputs::from_raw(&event_inputs) },
            event_outputs: EventOutputs::new(&mut self.event_outputs),
        };
        verify_process_context(processor, &context);
        processor.process(context);
        for buffer in self.event_inputs.iter_mut().flatten() {
            buffer.clear();
        }
    }

    pub fn output(&self, index: usize) -> Rendered {
        match unsafe { self.results[index].get() } {
            Slice::Constant(value) => Rendered::Constant(value),
            Slice::Span(span) => Rendered::Samples(span.to_vec()),
        }
    }

    pub fn events<T: Copy + Send + 'static>(&self, index: usize) -> Vec<Event<T>> {
        self.event_outputs[index].downcast_ref::<T>().to_vec()
    }
}
