use std::{ptr::NonNull, sync::Arc};

use buffer::{AnyEventBuffer, Arena, Inputs, Outputs, RawSlice, Results};
use processor::{verify_process_context, Context, EventInputs, EventOutputs};
use util::{collections::Array, IsSendSync};

use crate::Node;

/// Read by every unconnected audio input.
pub(crate) static SILENCE: IsSendSync<RawSlice> = IsSendSync::new(RawSlice::SILENCE);

/// Everything needed to run one processor for a block.
///
/// Inputs point at the result cells of upstream jobs and event inputs at their output buffers.
/// The dag guarantees upstream jobs finished before this one runs.
pub(crate) struct ProcessorJob {
    pub node: Node,
    pub inputs: Array<*const RawSlice>,
    pub outputs: Array<NonNull<f32>>,
    pub results: Array<RawSlice>,
    pub event_inputs: Array<Option<NonNull<dyn AnyEventBuffer>>>,
    pub event_outputs: Array<Box<dyn AnyEventBuffer>>,
    pub _arena: Arc<IsSendSync<Arena>>,
}

unsafe impl Send for ProcessorJob {}

impl ProcessorJob {
    pub fn run(&mut self, buffer_size: usize) {
        for buffer in self.event_outputs.iter_mut() {
            buffer.clear();
        }

        // Safety: the processor is only run by this job, and the buffers bound to it are live for
        // as long as the executor owning the job.
        let processor = unsafe { self.node.processor_mut() };
        let context = unsafe {
            Context {
                buffer_size,
                inputs: Inputs::from_raw(&self.inputs),
                outputs: Outputs::from_raw(&self.outputs, buffer_size),
                results: Results::from_raw(&mut self.results, &self.outputs, buffer_size),
                event_inputs: EventInputs::from_raw(&self.event_inputs),
                event_outputs: EventOutputs::new(&mut self.event_outputs),
            }
        };
        verify_process_context(processor, &context);
        processor.process(context);
    }
}
