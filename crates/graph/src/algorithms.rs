//! Editing operations built on [Graph].
use std::fmt::{self, Write};

use ahash::AHashMap;
use processor::builtin::Mix;

use crate::{Component, Endpoint, Graph, Node, Wires};

const AUDIO_COLOR: &str = "#00ff00";
const EVENT_COLOR: &str = "#ff00ff";

/// The source wired into `destination`, if any.
pub fn connected_source(wires: &Wires, destination: &Endpoint) -> Option<Endpoint> {
    wires.source_of(destination).cloned()
}

pub fn has_wire(wires: &Wires, source: &Endpoint, destination: &Endpoint) -> bool {
    wires.contains(source, destination)
}

/// Connect `source` to `destination`, mixing with whatever already feeds `destination`.
///
/// The first extra source inserts a two input mixer. Later ones replace that mixer by a wider
/// one, as long as it feeds nothing else.
pub fn connect(graph: &mut Graph, source: Endpoint, destination: Endpoint) {
    let Some(existing) = connected_source(graph.audio(), &destination) else {
        graph.insert(source, destination);
        return;
    };
    if existing == source {
        return;
    }

    let previous = existing.node.clone();
    let widen = previous.is_mix() && graph.audio().destinations(&existing).len() == 1;
    graph.erase(&existing, &destination);

    if widen {
        let num_inputs = previous.num_inputs();
        let mixer = Node::new(Mix::new(num_inputs + 1));
        for port in 0..num_inputs {
            let input = previous.port(port);
            if let Some(upstream) = connected_source(graph.audio(), &input) {
                graph.erase(&upstream, &input);
                graph.insert(upstream, mixer.port(port));
            }
        }
        graph.insert(source, mixer.port(num_inputs));
        graph.insert(mixer.port(0), destination);
    } else {
        let mixer = Node::new(Mix::new(2));
        graph.insert(existing, mixer.port(0));
        graph.insert(source, mixer.port(1));
        graph.insert(mixer.port(0), destination);
    }
}

/// Connect every output of `source` to the input of `destination` with the same index.
pub fn connect_component(graph: &mut Graph, source: &dyn Component, destination: &dyn Component) {
    debug_assert_eq!(source.outputs().len(), destination.inputs().len());
    for (output, input) in source.outputs().iter().zip(destination.inputs()) {
        connect(graph, output.clone(), input.clone());
    }
}

/// Rewire event sources around event identity processors and drop the identities.
pub fn bypass_event_identity_processors(graph: &mut Graph) {
    loop {
        let next = graph
            .event()
            .iter()
            .find(|(source, _)| source.node.is_event_identity())
            .map(|(source, destination)| (source.clone(), destination.clone()));
        let Some((identity, destination)) = next else {
            break;
        };
        let upstream = connected_source(graph.event(), &identity.node.port(0));
        graph.erase_event(&identity, &destination);
        if let Some(upstream) = upstream {
            graph.insert_event(upstream, destination);
        }
    }
    graph.erase_event_if(|source, destination| {
        source.node.is_event_identity() || destination.node.is_event_identity()
    });
}

/// Render `graph` as a Graphviz digraph: one table per processor with its ports, audio wires in
/// green and event wires in magenta.
pub fn export_graph_as_dot(graph: &Graph) -> String {
    let mut dot = String::new();
    // Formatting into a String only fails if a Display impl does.
    let _ = write_dot(graph, &mut dot);
    dot
}

/// [export_graph_as_dot] into any writer.
pub fn write_dot(graph: &Graph, out: &mut impl Write) -> fmt::Result {
    let nodes = graph.nodes();
    let ids: AHashMap<&Node, String> = nodes
        .iter()
        .enumerate()
        .map(|(index, node)| (node, format!("{}_{index}", node.type_name())))
        .collect();

    writeln!(out, "digraph {{")?;
    writeln!(out, "node [shape=plaintext]")?;
    for node in &nodes {
        write_node(out, &ids[node], node)?;
    }
    for (source, destination) in graph.audio().iter() {
        write_wire(out, &ids, source, destination, 'a', AUDIO_COLOR)?;
    }
    for (source, destination) in graph.event().iter() {
        write_wire(out, &ids, source, destination, 'e', EVENT_COLOR)?;
    }
    writeln!(out, "}}")
}

fn write_node(out: &mut impl Write, id: &str, node: &Node) -> fmt::Result {
    let (event_inputs, event_outputs) = (node.event_inputs(), node.event_outputs());
    writeln!(out, "{id} [label=<<table>")?;

    if node.num_inputs() + event_inputs.len() > 0 {
        writeln!(out, "<tr>")?;
        for port in 0..node.num_inputs() {
            writeln!(out, "<td port=\"ai{port}\" bgcolor=\"{AUDIO_COLOR}\">a{port}</td>")?;
        }
        for (port, event) in event_inputs.iter().enumerate() {
            let name = escape_html(event.name());
            writeln!(out, "<td port=\"ei{port}\" bgcolor=\"{EVENT_COLOR}\">{name}</td>")?;
        }
        writeln!(out, "</tr>")?;
    }

    let span = (node.num_inputs() + event_inputs.len())
        .max(node.num_outputs() + event_outputs.len());
    writeln!(
        out,
        "<tr><td colspan=\"{span}\">{}:{}</td></tr>",
        node.type_name(),
        escape_html(node.name())
    )?;

    if node.num_outputs() + event_outputs.len() > 0 {
        writeln!(out, "<tr>")?;
        for port in 0..node.num_outputs() {
            writeln!(out, "<td port=\"ao{port}\" bgcolor=\"{AUDIO_COLOR}\">a{port}</td>")?;
        }
        for (port, event) in event_outputs.iter().enumerate() {
            let name = escape_html(event.name());
            writeln!(out, "<td port=\"eo{port}\" bgcolor=\"{EVENT_COLOR}\">{name}</td>")?;
        }
        writeln!(out, "</tr>")?;
    }
    writeln!(out, "</table>>]")
}

fn write_wire(
    out: &mut impl Write,
    ids: &AHashMap<&Node, String>,
    source: &Endpoint,
    destination: &Endpoint,
    kind: char,
    color: &str,
) -> fmt::Result {
    writeln!(
        out,
        "{}:{kind}o{} -> {}:{kind}i{} [color=\"{color}\"]",
        ids[&source.node], source.port, ids[&destination.node], destination.port
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
