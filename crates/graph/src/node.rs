use std::{
    cell::UnsafeCell,
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

use processor::{builtin::EVENT_IDENTITY, EventPort, Processor};
use util::IsSendSync;

use crate::graph::Endpoint;

/// A shared handle to a processor.
///
/// Nodes compare, order and hash by identity. The processor is dropped with the last handle, so a
/// graph or an executor holding a node keeps the processor alive.
#[derive(Clone)]
pub struct Node {
    inner: Arc<Inner>,
}

struct Inner {
    type_name: String,
    name: String,
    num_inputs: usize,
    num_outputs: usize,
    event_inputs: Vec<EventPort>,
    event_outputs: Vec<EventPort>,
    processor: IsSendSync<UnsafeCell<Box<dyn Processor>>>,
}

impl Node {
    pub fn new(processor: impl Processor) -> Self {
        Self::from_boxed(Box::new(processor))
    }

    pub fn from_boxed(processor: Box<dyn Processor>) -> Self {
        let inner = Inner {
            type_name: processor.type_name().to_owned(),
            name: processor.name().to_owned(),
            num_inputs: processor.num_inputs(),
            num_outputs: processor.num_outputs(),
            event_inputs: processor.event_inputs().to_vec(),
            event_outputs: processor.event_outputs().to_vec(),
            processor: IsSendSync::new(UnsafeCell::new(processor)),
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.inner.type_name
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn num_inputs(&self) -> usize {
        self.inner.num_inputs
    }

    pub fn num_outputs(&self) -> usize {
        self.inner.num_outputs
    }

    pub fn event_inputs(&self) -> &[EventPort] {
        &self.inner.event_inputs
    }

    pub fn event_outputs(&self) -> &[EventPort] {
        &self.inner.event_outputs
    }

    /// The endpoint for `port` of this node, used for either direction.
    pub fn port(&self, port: usize) -> Endpoint {
        Endpoint::new(self.clone(), port)
    }

    pub fn is_event_identity(&self) -> bool {
        self.type_name() == EVENT_IDENTITY
    }

    pub fn is_mix(&self) -> bool {
        self.type_name() == "mix"
    }

    /// # Safety
    /// The caller must be the only one accessing the processor, which executors guarantee by
    /// running each node from a single task.
    #[allow(clippy::mut_from_ref)]
    pub(crate) unsafe fn processor_mut(&self) -> &mut dyn Processor {
        unsafe { &mut **self.inner.processor.get() }
    }

    fn address(&self) -> *const () {
        Arc::as_ptr(&self.inner).cast()
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Node {}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        self.address().cmp(&other.address())
    }
}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address().hash(state);
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name().is_empty() {
            write!(f, "{}", self.type_name())
        } else {
            write!(f, "{} ({})", self.name(), self.type_name())
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({self} @ {:p})", self.address())
    }
}
