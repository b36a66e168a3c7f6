//! Compiled, runnable forms of a [crate::Dag].
mod multi_threaded;
mod single_threaded;

pub use multi_threaded::MultiThreaded;
pub use single_threaded::SingleThreaded;

/// Runs every task of a compiled dag once per call.
pub trait Executor: Send {
    /// Process one block of `buffer_size` frames. Returns when every task has run.
    fn run(&mut self, buffer_size: usize);
}
