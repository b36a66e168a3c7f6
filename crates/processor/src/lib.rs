pub mod builtin;
pub mod context;
pub mod port;
pub mod processor;

#[cfg(test)]
pub(crate) mod harness;

pub use context::{Context, EventInputs, EventOutputs};
pub use port::EventPort;
pub use processor::{verify_process_context, Processor};
