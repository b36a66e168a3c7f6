//! Audio processing graphs and their real-time execution.
//!
//! ## Usage
//!
//! ```rs
//! use rtmix_graph as graph;
//!
//! let (mut engine, mut process) = graph::engine(graph::Options::default(), 2, 2)?;
//!
//! // The audio callback owns `process`.
//! process.init_process(input_converters, output_converters);
//! let stream = audio_backend::start(move |num_frames| process.process(num_frames));
//!
//! // The control thread edits a graph and swaps it in.
//! let mut graph = graph::Graph::new();
//! let amp = graph::components::Amplifier::stereo();
//! amp.connect(&mut graph);
//! graph::algorithms::connect(&mut graph, engine.input().port(0), amp.inputs()[0].clone());
//! graph::algorithms::connect(&mut graph, amp.outputs()[0].clone(), engine.output().port(0));
//! engine.rebuild(&graph);
//! ```
pub mod algorithms;
pub mod components;
pub mod dag;
pub mod engine;
pub mod executor;
pub mod graph;
pub mod io;
pub mod params;

mod compile;
mod component;
mod error;
#[cfg(test)]
mod harness;
mod job;
mod node;
mod options;
mod worker;

pub use compile::graph_to_dag;
pub use component::Component;
pub use dag::{Dag, TaskId, ThreadContext};
pub use engine::{engine, Engine, InputConverter, OutputConverter, Process};
pub use error::{Error, Result};
pub use executor::Executor;
pub use graph::{Endpoint, Graph, Wires};
pub use node::Node;
pub use options::Options;
pub use worker::WorkerPool;
