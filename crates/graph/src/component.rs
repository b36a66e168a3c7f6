use crate::{Endpoint, Graph};

/// A group of processors that is wired into a graph as one unit.
///
/// The endpoint lists may refer to internal processors or nested components. Only the flattened
/// processors and wires reach the executor.
pub trait Component {
    fn inputs(&self) -> &[Endpoint];

    fn outputs(&self) -> &[Endpoint];

    fn event_inputs(&self) -> &[Endpoint] {
        &[]
    }

    fn event_outputs(&self) -> &[Endpoint] {
        &[]
    }

    /// Add the internal wires. Must be called once per graph.
    fn connect(&self, graph: &mut Graph);
}
