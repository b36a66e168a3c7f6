//! Signal sources and taps for rendering small graphs.
use processor::builtin::{value_input, EventToAudio, StreamProcessor, StreamReader, ValueInput};

use crate::{Endpoint, Graph, Node};

/// A constant signal whose level the returned handle controls.
pub(crate) fn source(graph: &mut Graph, level: f32) -> (Endpoint, ValueInput<f32>) {
    let (input, handle) = value_input("level", level);
    let input = Node::new(input);
    let to_audio = Node::new(EventToAudio::new(0));
    graph.insert_event(input.port(0), to_audio.port(0));
    (to_audio.port(0), handle)
}

/// Records every block of `sources`, one channel each.
pub(crate) fn capture(graph: &mut Graph, sources: &[Endpoint]) -> StreamReader {
    let (stream, reader) = StreamProcessor::new(sources.len(), 4096);
    let stream = Node::new(stream);
    for (index, source) in sources.iter().enumerate() {
        graph.insert(source.clone(), stream.port(index));
    }
    reader
}
