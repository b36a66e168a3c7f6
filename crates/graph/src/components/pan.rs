use processor::builtin::{self, PanLaw};

use crate::{Component, Endpoint, Graph, Node, components::Amplifier};

/// A pan or balance control in front of a stereo split amplifier.
pub struct Pan {
    pan: Node,
    amplifier: Amplifier,
    event_inputs: [Endpoint; 1],
}

impl Pan {
    /// Constant power panning of a mono source onto two channels.
    pub fn pan() -> Self {
        Self::new(PanLaw::Pan)
    }

    /// Balance of a stereo source.
    pub fn stereo_balance() -> Self {
        Self::new(PanLaw::Balance)
    }

    fn new(law: PanLaw) -> Self {
        let pan = Node::new(builtin::Pan::new(law));
        let event_inputs = [pan.port(0)];
        Self {
            pan,
            amplifier: Amplifier::stereo_split(),
            event_inputs,
        }
    }
}

impl Component for Pan {
    fn inputs(&self) -> &[Endpoint] {
        self.amplifier.inputs()
    }

    fn outputs(&self) -> &[Endpoint] {
        self.amplifier.outputs()
    }

    fn event_inputs(&self) -> &[Endpoint] {
        &self.event_inputs
    }

    fn connect(&self, graph: &mut Graph) {
        self.amplifier.connect(graph);
        let gains = self.amplifier.event_inputs();
        graph.insert_event(self.pan.port(0), gains[0].clone());
        graph.insert_event(self.pan.port(1), gains[1].clone());
    }
}

#[cfg(test)]
mod tests {
    use super::Pan;
    use crate::{
        Component, Graph, Node, Options,
        executor::Executor,
        graph_to_dag,
        harness::{capture, source},
    };
    use approx::assert_relative_eq;
    use processor::builtin::value_input;

    #[test]
    fn wires_gains_into_the_amplifier() {
        let pan = Pan::pan();
        let mut graph = Graph::new();
        pan.connect(&mut graph);
        assert_eq!(graph.audio().len(), 2);
        assert_eq!(graph.event().len(), 2);
        assert_eq!(pan.event_inputs()[0].node.type_name(), "pan");
        assert_eq!(Pan::stereo_balance().event_inputs()[0].node.type_name(), "balance");
    }

    // Renders a full scale signal through `pan` at each position and returns the settled
    // (left, right) levels.
    fn settled_levels(pan: Pan, positions: &[f32]) -> Vec<(f32, f32)> {
        let mut graph = Graph::new();
        pan.connect(&mut graph);
        let (signal, _level) = source(&mut graph, 1.0);
        graph.insert(signal.clone(), pan.inputs()[0].clone());
        graph.insert(signal, pan.inputs()[1].clone());
        let (position, mut position_handle) = value_input("position", positions[0]);
        graph.insert_event(Node::new(position).port(0), pan.event_inputs()[0].clone());
        let mut reader = capture(&mut graph, pan.outputs());

        let mut executor = graph_to_dag(&graph, &[], &Options::default()).make_runnable();
        positions
            .iter()
            .map(|&position| {
                position_handle.set(position);
                executor.run(256);
                executor.run(256);
                let channels = reader.consume();
                (channels[0][511], channels[1][511])
            })
            .collect()
    }

    #[test]
    fn pan_positions_reach_their_channel() {
        let levels = settled_levels(Pan::pan(), &[-1.0, 1.0, 0.0]);
        assert_relative_eq!(levels[0].0, 1.0, epsilon = 1e-2);
        assert_relative_eq!(levels[0].1, 0.0, epsilon = 1e-2);
        assert_relative_eq!(levels[1].0, 0.0, epsilon = 1e-2);
        assert_relative_eq!(levels[1].1, 1.0, epsilon = 1e-2);
        assert_relative_eq!(levels[2].0, std::f32::consts::FRAC_1_SQRT_2, epsilon = 1e-2);
        assert_relative_eq!(levels[2].1, std::f32::consts::FRAC_1_SQRT_2, epsilon = 1e-2);
    }

    #[test]
    fn balance_attenuates_the_opposite_side() {
        let levels = settled_levels(Pan::stereo_balance(), &[-1.0, 1.0, 0.0]);
        assert_eq!(levels, vec![(1.0, 0.0), (0.0, 1.0), (1.0, 1.0)]);
    }
}
