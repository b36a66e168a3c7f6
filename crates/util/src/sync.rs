//! Wait-free and lock-free primitives used across the real-time boundary.
pub mod semaphore;
pub mod slot;

pub use semaphore::Semaphore;
pub use slot::{slot, Consumer, Producer};
