use std::borrow::Cow;

use processor::builtin;

use crate::{Component, Endpoint, Graph, Node, components::Amplifier};

/// Silences a stereo channel while it is muted or another channel is soloed.
///
/// Event inputs are the `bool` mute state and the `Option<usize>` index of the soloed channel.
pub struct MuteSolo {
    mute_solo: Node,
    amplifier: Amplifier,
    event_inputs: [Endpoint; 2],
}

impl MuteSolo {
    /// `solo_index` identifies this channel among the soloable ones.
    pub fn new(name: impl Into<Cow<'static, str>>, solo_index: usize) -> Self {
        let mute_solo = Node::new(builtin::MuteSolo::new(name, solo_index));
        let event_inputs = [mute_solo.port(0), mute_solo.port(1)];
        Self {
            mute_solo,
            amplifier: Amplifier::stereo(),
            event_inputs,
        }
    }
}

impl Component for MuteSolo {
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
        graph.insert_event(
            self.mute_solo.port(0),
            self.amplifier.event_inputs()[0].clone(),
        );
    }
}
