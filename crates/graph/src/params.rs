//! Control thread access to the parameters of a graph.
use std::hash::Hash;

use ahash::AHashMap;
use processor::builtin::{ValueInput, ValueOutput};

/// Value handles by key.
///
/// The registry only holds the control side of each value processor, so it never keeps a
/// processor alive. Handles of processors the graph has dropped are removed by
/// [Parameters::clear_expired].
pub struct Parameters<K, T: Send> {
    inputs: AHashMap<K, ValueInput<T>>,
    outputs: AHashMap<K, ValueOutput<T>>,
}

impl<K, T: Send> Default for Parameters<K, T> {
    fn default() -> Self {
        Self {
            inputs: AHashMap::default(),
            outputs: AHashMap::default(),
        }
    }
}

impl<K: Eq + Hash, T: Copy + Send> Parameters<K, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handle of a value input. Returns the handle it replaces.
    pub fn add_input(&mut self, key: K, handle: ValueInput<T>) -> Option<ValueInput<T>> {
        self.inputs.insert(key, handle)
    }

    /// Register the handle of a value output. Returns the handle it replaces.
    pub fn add_output(&mut self, key: K, handle: ValueOutput<T>) -> Option<ValueOutput<T>> {
        self.outputs.insert(key, handle)
    }

    pub fn len(&self) -> usize {
        self.inputs.len() + self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty() && self.outputs.is_empty()
    }

    /// Send `value` to the input registered as `key`. Returns false for unknown keys.
    pub fn set(&mut self, key: &K, value: T) -> bool {
        match self.inputs.get_mut(key) {
            Some(input) => {
                input.set(value);
                true
            }
            None => false,
        }
    }

    /// The latest value published by the output registered as `key`.
    pub fn get(&mut self, key: &K) -> Option<T> {
        self.outputs.get_mut(key).map(ValueOutput::get)
    }

    /// Call `f` if the output registered as `key` published a value since the last call.
    pub fn consume(&mut self, key: &K, f: impl FnOnce(T)) {
        if let Some(output) = self.outputs.get_mut(key) {
            output.consume(f);
        }
    }

    /// Drop the handles whose processor is gone. Returns the number removed.
    pub fn clear_expired(&mut self) -> usize {
        let before = self.len();
        self.inputs.retain(|_, input| !input.is_orphaned());
        self.outputs.retain(|_, output| !output.is_orphaned());
        let removed = before - self.len();
        if removed > 0 {
            log::debug!("dropped {removed} expired parameters");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::Parameters;
    use crate::{compile::graph_to_dag, executor::Executor, Graph, Node, Options};
    use processor::builtin::{value_input, value_output};

    #[test]
    fn set_and_get_through_a_graph() {
        let mut params = Parameters::new();
        let (input, handle) = value_input("volume", 0.0_f32);
        params.add_input("volume in", handle);
        let (output, handle) = value_output::<f32>("volume");
        params.add_output("volume out", handle);

        let (input, output) = (Node::new(input), Node::new(output));
        let mut graph = Graph::new();
        graph.insert_event(input.port(0), output.port(0));
        let mut executor = graph_to_dag(&graph, &[], &Options::default()).make_runnable();

        assert!(params.set(&"volume in", 0.75));
        assert!(!params.set(&"missing", 1.0));
        executor.run(16);
        assert_eq!(params.get(&"volume out"), Some(0.75));
        assert_eq!(params.get(&"missing"), None);

        let mut seen = None;
        params.consume(&"volume out", |value| seen = Some(value));
        assert_eq!(seen, None);
        params.set(&"volume in", 0.5);
        executor.run(16);
        params.consume(&"volume out", |value| seen = Some(value));
        assert_eq!(seen, Some(0.5));
    }

    #[test]
    fn clear_expired() {
        let mut params = Parameters::new();
        let (kept, handle) = value_input("kept", 1_i32);
        params.add_input(1, handle);
        let (dropped, handle) = value_output::<i32>("dropped");
        params.add_output(2, handle);
        assert_eq!(params.len(), 2);

        drop(dropped);
        assert_eq!(params.clear_expired(), 1);
        assert_eq!(params.len(), 1);
        assert!(params.set(&1, 2));
        drop(kept);
        assert_eq!(params.clear_expired(), 1);
        assert!(params.is_empty());
    }
}
