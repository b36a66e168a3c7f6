use crate::{Component, Endpoint, Graph, Node};

/// Pass-through channels. Gives other components a stable place to connect to.
pub struct Identity {
    endpoints: Vec<Endpoint>,
}

impl Identity {
    pub fn new(num_channels: usize) -> Self {
        let endpoints = (0..num_channels)
            .map(|_| Node::new(processor::builtin::Identity::new(1)).port(0))
            .collect();
        Self { endpoints }
    }
}

impl Component for Identity {
    fn inputs(&self) -> &[Endpoint] {
        &self.endpoints
    }

    fn outputs(&self) -> &[Endpoint] {
        &self.endpoints
    }

    fn connect(&self, _graph: &mut Graph) {}
}
