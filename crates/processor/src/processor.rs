use buffer::{Slice, ALIGNMENT};

use crate::{context as cx, EventPort};

/// A unit of real-time audio or event processing.
///
/// Arities and ports are fixed for the lifetime of the processor. [Processor::process] runs on
/// the audio thread and must not allocate, lock or block.
pub trait Processor
where
    Self: Send + 'static,
{
    /// A stable tag for the kind of processor, e.g. `"clip"`.
    fn type_name(&self) -> &str;

    /// An instance name used for diagnostics.
    fn name(&self) -> &str {
        ""
    }

    fn num_inputs(&self) -> usize;

    fn num_outputs(&self) -> usize;

    fn event_inputs(&self) -> &[EventPort] {
        &[]
    }

    fn event_outputs(&self) -> &[EventPort] {
        &[]
    }

    /// Real time processing.
    fn process(&mut self, context: cx::Context<'_>);
}

/// Check that `context` has the shape `processor` declared. Only active in debug builds.
pub fn verify_process_context(processor: &dyn Processor, context: &cx::Context<'_>) {
    if !cfg!(debug_assertions) {
        return;
    }

    debug_assert_eq!(context.inputs.len(), processor.num_inputs(), "input arity");
    debug_assert_eq!(context.outputs.len(), processor.num_outputs(), "output arity");
    debug_assert_eq!(context.results.len(), processor.num_outputs(), "result arity");
    debug_assert_eq!(context.outputs.num_frames(), context.buffer_size, "output size");

    for input in context.inputs.iter() {
        if let Slice::Span(span) = input {
            debug_assert_eq!(span.len(), context.buffer_size, "input size");
            debug_assert_eq!(span.as_ptr() as usize % ALIGNMENT, 0, "input alignment");
        }
    }

    let event_inputs = processor.event_inputs();
    debug_assert_eq!(context.event_inputs.len(), event_inputs.len(), "event input arity");
    for (index, port) in event_inputs.iter().enumerate() {
        if let Some(event_type) = context.event_inputs.event_type(index) {
            debug_assert_eq!(event_type, port.event_type(), "event input {index} type");
        }
    }

    let event_outputs = processor.event_outputs();
    debug_assert_eq!(context.event_outputs.len(), event_outputs.len(), "event output arity");
    for (index, port) in event_outputs.iter().enumerate() {
        debug_assert_eq!(
            context.event_outputs.event_type(index),
            port.event_type(),
            "event output {index} type"
        );
    }
}
