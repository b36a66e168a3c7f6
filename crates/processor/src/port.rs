use core::fmt;
use std::{any::TypeId, borrow::Cow, sync::Arc};

use buffer::{AnyEventBuffer, EventArena, EventBuffer};

/// A typed event input or output of a processor.
///
/// The port knows how to size and create an event buffer for its type, so graphs can allocate
/// storage for heterogeneous ports without knowing the concrete types.
#[derive(Clone)]
pub struct EventPort {
    name: Cow<'static, str>,
    event_type: TypeId,
    type_name: &'static str,
    required: fn(usize) -> usize,
    make_buffer: fn(&Arc<EventArena>, usize) -> Option<Box<dyn AnyEventBuffer>>,
}

fn make_buffer<T: Copy + Send + 'static>(
    arena: &Arc<EventArena>,
    capacity: usize,
) -> Option<Box<dyn AnyEventBuffer>> {
    let buffer = EventBuffer::<T>::new_in(arena, capacity)?;
    Some(Box::new(buffer))
}

impl EventPort {
    pub fn new<T: Copy + Send + 'static>(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            event_type: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            required: EventArena::required::<T>,
            make_buffer: make_buffer::<T>,
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_ref()
    }

    /// The [TypeId] of the event value type.
    pub fn event_type(&self) -> TypeId {
        self.event_type
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns true if events can flow from `self` into `other`.
    pub fn is_compatible(&self, other: &Self) -> bool {
        self.event_type == other.event_type
    }

    /// Arena bytes needed by a buffer of `capacity` events for this port.
    pub fn required_arena_size(&self, capacity: usize) -> usize {
        (self.required)(capacity)
    }

    /// Create an empty buffer for this port in `arena`.
    pub fn make_buffer(
        &self,
        arena: &Arc<EventArena>,
        capacity: usize,
    ) -> Option<Box<dyn AnyEventBuffer>> {
        (self.make_buffer)(arena, capacity)
    }
}

impl fmt::Debug for EventPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventPort")
            .field("name", &self.name)
            .field("type", &self.type_name)
            .finish()
    }
}

impl fmt::Display for EventPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.type_name)
    }
}
