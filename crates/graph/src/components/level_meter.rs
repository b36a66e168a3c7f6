use processor::builtin::{EventConverter, LevelMeterProcessor};

use crate::{Component, Endpoint, Graph, Node};

/// Meters two channels and emits `(left, right)` peak level events.
pub struct StereoLevelMeter {
    left: Node,
    right: Node,
    converter: Node,
    inputs: [Endpoint; 2],
    event_outputs: [Endpoint; 1],
}

impl StereoLevelMeter {
    pub fn new(sample_rate: f32) -> Self {
        let left = Node::new(LevelMeterProcessor::new(sample_rate));
        let right = Node::new(LevelMeterProcessor::new(sample_rate));
        let converter = Node::new(EventConverter::new(
            "stereo_level",
            ["level l", "level r"],
            "stereo_level",
            |left: f32, right: f32| (left, right),
        ));
        Self {
            inputs: [left.port(0), right.port(0)],
            event_outputs: [converter.port(0)],
            left,
            right,
            converter,
        }
    }
}

impl Component for StereoLevelMeter {
    fn inputs(&self) -> &[Endpoint] {
        &self.inputs
    }

    fn outputs(&self) -> &[Endpoint] {
        &[]
    }

    fn event_outputs(&self) -> &[Endpoint] {
        &self.event_outputs
    }

    fn connect(&self, graph: &mut Graph) {
        graph.insert_event(self.left.port(0), self.converter.port(0));
        graph.insert_event(self.right.port(0), self.converter.port(1));
    }
}

#[cfg(test)]
mod tests {
    use super::StereoLevelMeter;
    use crate::{
        Component, Graph, Node, Options, executor::Executor, graph_to_dag, harness::source,
    };
    use processor::builtin::value_output;

    #[test]
    fn meters_feed_the_converter() {
        let meter = StereoLevelMeter::new(48_000.0);
        let mut graph = Graph::new();
        meter.connect(&mut graph);
        assert_eq!(graph.event().len(), 2);
        assert_eq!(meter.inputs().len(), 2);
        assert!(meter.outputs().is_empty());
        let output = &meter.event_outputs()[0];
        assert_eq!(output.node.name(), "stereo_level");
        assert_eq!(output.node.event_outputs()[0].type_name(), std::any::type_name::<(f32, f32)>());
    }

    #[test]
    fn emits_left_then_right() {
        let meter = StereoLevelMeter::new(48_000.0);
        let mut graph = Graph::new();
        meter.connect(&mut graph);
        let (left, _left_level) = source(&mut graph, 0.5);
        let (right, mut right_level) = source(&mut graph, -0.25);
        graph.insert(left, meter.inputs()[0].clone());
        graph.insert(right, meter.inputs()[1].clone());
        let (levels, mut levels_handle) = value_output::<(f32, f32)>("levels");
        graph.insert_event(meter.event_outputs()[0].clone(), Node::new(levels).port(0));

        let mut executor = graph_to_dag(&graph, &[], &Options::default()).make_runnable();
        executor.run(64);
        assert_eq!(levels_handle.get(), (0.5, 0.25));

        right_level.set(0.75);
        executor.run(64);
        assert_eq!(levels_handle.get(), (0.5, 0.75));
    }
}
