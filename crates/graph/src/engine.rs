//! The audio engine: device bridges, executor compilation and the executor hot-swap.
use std::sync::Arc;

use util::swappable::{self, Reader, Swap, Writer};

use crate::{
    algorithms::bypass_event_identity_processors,
    compile::graph_to_dag,
    executor::{Executor, SingleThreaded},
    io::{DeviceChannels, InputProcessor, OutputProcessor},
    worker::WorkerPool,
    Graph, Node, Options, Result,
};

/// Converts one device input channel into samples.
pub type InputConverter = Box<dyn FnMut(&mut [f32]) + Send>;

/// Converts samples into one device output channel.
pub type OutputConverter = Box<dyn FnMut(&[f32]) + Send>;

/// The control thread side of the engine.
pub struct Engine {
    options: Options,
    pool: Arc<WorkerPool>,
    input: Node,
    output: Node,
    writer: Writer<Box<dyn Executor>>,
}

/// The audio thread side of the engine.
pub struct Process {
    reader: Reader<Box<dyn Executor>>,
    executor: Box<dyn Executor>,
    inputs: Arc<DeviceChannels>,
    outputs: Arc<DeviceChannels>,
    input_converters: Vec<InputConverter>,
    output_converters: Vec<OutputConverter>,
    max_period_size: usize,
}

/// Create an engine for a device with `num_inputs` input and `num_outputs` output channels.
///
/// Starts the worker threads named in `options`.
pub fn engine(options: Options, num_inputs: usize, num_outputs: usize) -> Result<(Engine, Process)> {
    options.validate()?;
    let pool = Arc::new(WorkerPool::new(&options.workers)?);
    let inputs = Arc::new(DeviceChannels::new(num_inputs, options.max_period_size));
    let outputs = Arc::new(DeviceChannels::new(num_outputs, options.max_period_size));
    let (reader, writer) = swappable::swappable();

    let process = Process {
        reader,
        executor: Box::new(SingleThreaded::default()),
        inputs: inputs.clone(),
        outputs: outputs.clone(),
        input_converters: Vec::new(),
        output_converters: Vec::new(),
        max_period_size: options.max_period_size,
    };
    let engine = Engine {
        pool,
        input: Node::new(InputProcessor::new(inputs)),
        output: Node::new(OutputProcessor::new(outputs)),
        writer,
        options,
    };
    Ok((engine, process))
}

impl Engine {
    /// The processor whose outputs are the device inputs.
    pub fn input(&self) -> &Node {
        &self.input
    }

    /// The processor whose inputs are the device outputs.
    pub fn output(&self) -> &Node {
        &self.output
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Compile `graph` and swap it in. Returns false if the audio thread did not pick it up in
    /// time, in which case the new executor was discarded.
    pub fn rebuild(&mut self, graph: &Graph) -> bool {
        let mut graph = graph.clone();
        bypass_event_identity_processors(&mut graph);
        let dag = graph_to_dag(&graph, &[self.output.clone()], &self.options);
        log::debug!("rebuilt graph with {} processors", dag.len());
        let executor = dag.make_runnable_with(&self.pool);
        self.swap_executor(executor)
    }

    /// Hand `executor` to the audio thread and drop the one it replaces. Returns false if the
    /// audio thread did not pick it up within [Options::swap_timeout].
    pub fn swap_executor(&mut self, executor: Box<dyn Executor>) -> bool {
        match self.writer.write(executor, self.options.swap_timeout) {
            Swap::Retired(previous) => {
                log::debug!("swapped executor");
                drop(previous);
                true
            }
            Swap::TimedOut(executor) => {
                log::warn!(
                    "audio thread did not take the new executor within {:?}, discarding it",
                    self.options.swap_timeout
                );
                drop(executor);
                false
            }
        }
    }
}

impl Process {
    /// Install one converter per device channel. Call before the first [Process::process].
    pub fn init_process(
        &mut self,
        input_converters: Vec<InputConverter>,
        output_converters: Vec<OutputConverter>,
    ) {
        debug_assert_eq!(input_converters.len(), self.inputs.len(), "one converter per input");
        debug_assert_eq!(output_converters.len(), self.outputs.len(), "one converter per output");
        self.input_converters = input_converters;
        self.output_converters = output_converters;
    }

    /// Process one block. Real time safe.
    pub fn process(&mut self, buffer_size: usize) {
        debug_assert!(buffer_size <= self.max_period_size, "period too large");
        for (index, convert) in self.input_converters.iter_mut().enumerate() {
            convert(unsafe { self.inputs.channel_mut(index, buffer_size) });
        }

        self.reader.read(&mut self.executor);
        self.executor.run(buffer_size);

        for (index, convert) in self.output_converters.iter_mut().enumerate() {
            convert(unsafe { self.outputs.channel(index, buffer_size) });
        }
    }
}
