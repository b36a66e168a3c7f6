//! Processors connected by audio and event wires.
use std::collections::{BTreeMap, BTreeSet, VecDeque};

use ahash::AHashMap;

use crate::{Error, Node, Result};

/// A port of a node. Whether it is an input or an output depends on which side of a wire it is.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Endpoint {
    pub node: Node,
    pub port: usize,
}

/// A set of wires. Every destination has at most one source; a source may feed any number of
/// destinations.
#[derive(Clone, Debug, Default)]
pub struct Wires {
    by_source: BTreeMap<Endpoint, Vec<Endpoint>>,
    by_destination: AHashMap<Endpoint, Endpoint>,
}

/// The audio and event wiring of a set of processors.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    audio: Wires,
    event: Wires,
}

impl Endpoint {
    pub fn new(node: Node, port: usize) -> Self {
        Self { node, port }
    }
}

impl Wires {
    pub fn len(&self) -> usize {
        self.by_destination.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_destination.is_empty()
    }

    /// Iterate `(source, destination)` pairs, grouped by source.
    pub fn iter(&self) -> impl Iterator<Item = (&Endpoint, &Endpoint)> + '_ {
        self.by_source
            .iter()
            .flat_map(|(source, destinations)| destinations.iter().map(move |dst| (source, dst)))
    }

    /// The source wired into `destination`.
    pub fn source_of(&self, destination: &Endpoint) -> Option<&Endpoint> {
        self.by_destination.get(destination)
    }

    /// The destinations fed by `source`.
    pub fn destinations(&self, source: &Endpoint) -> &[Endpoint] {
        self.by_source.get(source).map_or(&[], Vec::as_slice)
    }

    pub fn contains(&self, source: &Endpoint, destination: &Endpoint) -> bool {
        self.source_of(destination) == Some(source)
    }

    /// Every wire leaving any port of `node`.
    pub fn outgoing<'a>(
        &'a self,
        node: &'a Node,
    ) -> impl Iterator<Item = (&'a Endpoint, &'a Endpoint)> + 'a {
        let start = Endpoint::new(node.clone(), 0);
        let end = Endpoint::new(node.clone(), usize::MAX);
        self.by_source
            .range(start..=end)
            .flat_map(|(source, destinations)| destinations.iter().map(move |dst| (source, dst)))
    }

    fn insert(&mut self, source: Endpoint, destination: Endpoint) {
        debug_assert!(!self.by_destination.contains_key(&destination));
        self.by_destination.insert(destination.clone(), source.clone());
        self.by_source.entry(source).or_default().push(destination);
    }

    fn remove(&mut self, source: &Endpoint, destination: &Endpoint) -> bool {
        if !self.contains(source, destination) {
            return false;
        }
        self.by_destination.remove(destination);
        if let Some(destinations) = self.by_source.get_mut(source) {
            destinations.retain(|dst| dst != destination);
            if destinations.is_empty() {
                self.by_source.remove(source);
            }
        }
        true
    }

    fn retain(&mut self, mut f: impl FnMut(&Endpoint, &Endpoint) -> bool) -> usize {
        let before = self.len();
        self.by_source.retain(|source, destinations| {
            destinations.retain(|dst| f(source, dst));
            !destinations.is_empty()
        });
        let by_source = &self.by_source;
        self.by_destination.retain(|dst, source| {
            by_source
                .get(source)
                .is_some_and(|destinations| destinations.contains(dst))
        });
        before - self.len()
    }
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn audio(&self) -> &Wires {
        &self.audio
    }

    pub fn event(&self) -> &Wires {
        &self.event
    }

    /// Every node that appears in a wire.
    pub fn nodes(&self) -> BTreeSet<Node> {
        self.audio
            .iter()
            .chain(self.event.iter())
            .flat_map(|(source, destination)| [source.node.clone(), destination.node.clone()])
            .collect()
    }

    /// Connect audio output `source` to audio input `destination`.
    pub fn try_insert(&mut self, source: Endpoint, destination: Endpoint) -> Result<()> {
        check_port(&source, source.node.num_outputs())?;
        check_port(&destination, destination.node.num_inputs())?;
        check_unconnected(&self.audio, &destination)?;
        self.check_acyclic(&source.node, &destination.node)?;
        self.audio.insert(source, destination);
        Ok(())
    }

    /// Connect event output `source` to event input `destination`. The port types must match.
    pub fn try_insert_event(&mut self, source: Endpoint, destination: Endpoint) -> Result<()> {
        check_port(&source, source.node.event_outputs().len())?;
        check_port(&destination, destination.node.event_inputs().len())?;
        let output = &source.node.event_outputs()[source.port];
        let input = &destination.node.event_inputs()[destination.port];
        if !output.is_compatible(input) {
            return Err(Error::EventTypeMismatch {
                expected: input.type_name(),
                found: output.type_name(),
            });
        }
        check_unconnected(&self.event, &destination)?;
        self.check_acyclic(&source.node, &destination.node)?;
        self.event.insert(source, destination);
        Ok(())
    }

    /// Like [Graph::try_insert], but an invalid wire is a bug: it panics in debug builds and is
    /// logged and ignored otherwise.
    pub fn insert(&mut self, source: Endpoint, destination: Endpoint) {
        if let Err(error) = self.try_insert(source, destination) {
            rejected("audio", &error);
        }
    }

    /// The event counterpart of [Graph::insert].
    pub fn insert_event(&mut self, source: Endpoint, destination: Endpoint) {
        if let Err(error) = self.try_insert_event(source, destination) {
            rejected("event", &error);
        }
    }

    /// Remove an audio wire. Returns false if it did not exist.
    pub fn erase(&mut self, source: &Endpoint, destination: &Endpoint) -> bool {
        self.audio.remove(source, destination)
    }

    pub fn erase_event(&mut self, source: &Endpoint, destination: &Endpoint) -> bool {
        self.event.remove(source, destination)
    }

    /// Remove every audio wire matching `f`. Returns the number of wires removed.
    pub fn erase_if(&mut self, mut f: impl FnMut(&Endpoint, &Endpoint) -> bool) -> usize {
        self.audio.retain(|source, destination| !f(source, destination))
    }

    pub fn erase_event_if(&mut self, mut f: impl FnMut(&Endpoint, &Endpoint) -> bool) -> usize {
        self.event.retain(|source, destination| !f(source, destination))
    }

    /// Fails if `to` already reaches `from`, through wires of either kind.
    fn check_acyclic(&self, from: &Node, to: &Node) -> Result<()> {
        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::from([to.clone()]);
        while let Some(node) = queue.pop_front() {
            if &node == from {
                return Err(Error::CycleDetected);
            }
            if !visited.insert(node.clone()) {
                continue;
            }
            let next = self
                .audio
                .outgoing(&node)
                .chain(self.event.outgoing(&node))
                .map(|(_, destination)| destination.node.clone());
            queue.extend(next);
        }
        Ok(())
    }
}

fn check_port(endpoint: &Endpoint, num_ports: usize) -> Result<()> {
    if endpoint.port < num_ports {
        Ok(())
    } else {
        Err(Error::InvalidPort {
            processor: endpoint.node.to_string(),
            port: endpoint.port,
        })
    }
}

fn check_unconnected(wires: &Wires, destination: &Endpoint) -> Result<()> {
    if wires.source_of(destination).is_some() {
        return Err(Error::AlreadyConnected {
            processor: destination.node.to_string(),
            port: destination.port,
        });
    }
    Ok(())
}

fn rejected(kind: &str, error: &Error) {
    if cfg!(debug_assertions) {
        panic!("invalid {kind} wire: {error}");
    }
    log::error!("ignoring invalid {kind} wire: {error}");
}
