//! Block-scoped audio and event data.
//!
//! - [Slice]: one block of one audio signal, either a constant or a span of samples.
//! - [audio::Arena]: aligned scratch storage for processor outputs.
//! - [EventBuffer]: time-stamped control values for one block, backed by an [EventArena].
pub mod audio;
pub mod event;
pub mod slice;

pub use audio::{Arena, Inputs, Outputs, Results, ALIGNMENT};
pub use event::{AnyEventBuffer, Event, EventArena, EventBuffer};
pub use slice::{Produced, RawSlice, Slice};
