//! Turning a [Graph] into a [Dag] of processor jobs.
use std::{collections::BTreeSet, ptr::NonNull, sync::Arc};

use ahash::AHashMap;
use buffer::{Arena, EventArena, RawSlice};
use util::{collections::Array, IsSendSync};

use crate::{
    job::{ProcessorJob, SILENCE},
    Dag, Graph, Node, Options,
};

/// Compile every processor appearing in `graph`, plus `extra`, into a dag with one task per
/// processor and a dependency per pair of wired processors.
///
/// Output buffers and event buffers are allocated here, sized by `options`. Event identity
/// processors must have been bypassed.
pub fn graph_to_dag(graph: &Graph, extra: &[Node], options: &Options) -> Dag {
    let mut nodes = graph.nodes();
    nodes.extend(extra.iter().cloned());
    debug_assert!(
        nodes.iter().all(|node| !node.is_event_identity()),
        "event identities must be bypassed before compiling"
    );

    let num_channels = nodes.iter().map(Node::num_outputs).sum();
    let event_arena_size = nodes
        .iter()
        .flat_map(Node::event_outputs)
        .map(|port| port.required_arena_size(options.max_events_per_buffer))
        .sum();
    let mut arena = Arena::new(num_channels, options.max_period_size);
    let event_arena = Arc::new(EventArena::new(event_arena_size));

    let mut outputs = Vec::with_capacity(nodes.len());
    for node in &nodes {
        let channels = (0..node.num_outputs())
            .map(|_| {
                let Some(channel) = arena.acquire() else {
                    unreachable!("audio arena holds every output")
                };
                channel
            })
            .collect::<Array<_>>();
        outputs.push(channels);
    }
    let arena = Arc::new(IsSendSync::new(arena));

    let mut index = AHashMap::with_capacity(nodes.len());
    let mut jobs = Vec::with_capacity(nodes.len());
    for (node, outputs) in nodes.iter().zip(outputs) {
        let results = outputs
            .iter()
            .map(|channel| RawSlice::from_raw_parts(channel.as_ptr(), options.max_period_size))
            .collect();
        let event_outputs = node
            .event_outputs()
            .iter()
            .map(|port| {
                let Some(buffer) = port.make_buffer(&event_arena, options.max_events_per_buffer)
                else {
                    unreachable!("event arena holds every event output")
                };
                buffer
            })
            .collect();
        index.insert(node.clone(), jobs.len());
        jobs.push(ProcessorJob {
            node: node.clone(),
            inputs: Array::filled(node.num_inputs(), &*SILENCE as *const RawSlice),
            outputs,
            results,
            event_inputs: Array::filled(node.event_inputs().len(), None),
            event_outputs,
            _arena: arena.clone(),
        });
    }

    let mut edges = BTreeSet::new();
    for (source, destination) in graph.audio().iter() {
        let (src, dst) = (index[&source.node], index[&destination.node]);
        let result = &jobs[src].results[source.port] as *const RawSlice;
        jobs[dst].inputs[destination.port] = result;
        edges.insert((src, dst));
    }
    for (source, destination) in graph.event().iter() {
        let (src, dst) = (index[&source.node], index[&destination.node]);
        let buffer = NonNull::from(&mut *jobs[src].event_outputs[source.port]);
        jobs[dst].event_inputs[destination.port] = Some(buffer);
        edges.insert((src, dst));
    }

    log::debug!(
        "compiled {} processors, {} audio wires, {} event wires",
        jobs.len(),
        graph.audio().len(),
        graph.event().len()
    );

    let mut dag = Dag::new();
    for mut job in jobs {
        dag.add_task(move |context| job.run(context.buffer_size));
    }
    for (parent, child) in edges {
        dag.add_child(parent, child);
    }
    dag
}
