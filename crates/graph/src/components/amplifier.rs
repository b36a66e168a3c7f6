use processor::builtin::{EventToAudio, Multiply};

use crate::{Component, Endpoint, Graph, Node};

/// Applies smoothed gain events to one or two channels.
pub struct Amplifier {
    wires: Vec<(Endpoint, Endpoint)>,
    inputs: Vec<Endpoint>,
    event_inputs: Vec<Endpoint>,
}

impl Amplifier {
    /// One channel, one gain.
    pub fn mono() -> Self {
        let gain = Node::new(EventToAudio::default());
        let amp = Node::new(Multiply::new(2));
        Self {
            wires: vec![(gain.port(0), amp.port(1))],
            inputs: vec![amp.port(0)],
            event_inputs: vec![gain.port(0)],
        }
    }

    /// Two channels sharing one gain.
    pub fn stereo() -> Self {
        let gain = Node::new(EventToAudio::default());
        let left = Node::new(Multiply::new(2));
        let right = Node::new(Multiply::new(2));
        Self {
            wires: vec![(gain.port(0), left.port(1)), (gain.port(0), right.port(1))],
            inputs: vec![left.port(0), right.port(0)],
            event_inputs: vec![gain.port(0)],
        }
    }

    /// Two channels with a gain each.
    pub fn stereo_split() -> Self {
        let left_gain = Node::new(EventToAudio::default());
        let right_gain = Node::new(EventToAudio::default());
        let left = Node::new(Multiply::new(2));
        let right = Node::new(Multiply::new(2));
        Self {
            wires: vec![
                (left_gain.port(0), left.port(1)),
                (right_gain.port(0), right.port(1)),
            ],
            inputs: vec![left.port(0), right.port(0)],
            event_inputs: vec![left_gain.port(0), right_gain.port(0)],
        }
    }
}

impl Component for Amplifier {
    fn inputs(&self) -> &[Endpoint] {
        &self.inputs
    }

    // A multiplier's first input and its output share port 0.
    fn outputs(&self) -> &[Endpoint] {
        &self.inputs
    }

    fn event_inputs(&self) -> &[Endpoint] {
        &self.event_inputs
    }

    fn connect(&self, graph: &mut Graph) {
        for (source, destination) in &self.wires {
            graph.insert(source.clone(), destination.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Amplifier;
    use crate::{Component, Graph};

    #[test]
    fn shapes() {
        for (amp, channels, gains) in [
            (Amplifier::mono(), 1, 1),
            (Amplifier::stereo(), 2, 1),
            (Amplifier::stereo_split(), 2, 2),
        ] {
            assert_eq!(amp.inputs().len(), channels);
            assert_eq!(amp.outputs().len(), channels);
            assert_eq!(amp.event_inputs().len(), gains);
            assert!(amp.event_outputs().is_empty());

            let mut graph = Graph::new();
            amp.connect(&mut graph);
            assert_eq!(graph.audio().len(), channels);
            for input in amp.inputs() {
                assert_eq!(input.node.type_name(), "multiply");
            }
        }
    }
}
