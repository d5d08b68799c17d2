//! Source discovery and execution ordering for a single run.
//!
//! Scheduling happens in two steps before any node executes:
//!
//! 1. Walk backward from each sink to discover the source nodes feeding it.
//! 2. Walk forward from those sources, Kahn style, producing the order.
//!
//! Both steps only read the port links. The forward step also maintains each
//! node's in-degree and visited flag, which the caller restores once the node
//! has executed.

use crate::{
    Edge, Node,
    error::{Cycle, RunError},
    node, port,
};
use petgraph::{graphmap::DiGraphMap, stable_graph::StableDiGraph, visit::EdgeRef};
use std::collections::{HashMap, HashSet, VecDeque};

/// The node arena owned by a graph.
pub(crate) type Arena = StableDiGraph<Node, Edge>;

/// The result of scheduling a run.
#[derive(Debug, Default)]
pub(crate) struct Schedule {
    /// The order in which nodes should execute.
    pub order: Vec<node::Id>,
    /// Every node whose traversal state was modified, in the order first
    /// touched. Includes nodes that did not make it into `order`.
    pub touched: Vec<node::Id>,
}

/// The state built up while walking backward from the sinks.
#[derive(Debug, Default)]
struct Discovery {
    /// Sources in discovery order. May contain duplicates.
    sources: VecDeque<node::Id>,
    /// Every node upstream of a sink that is expected to be scheduled.
    closure: Vec<node::Id>,
    /// Nodes already walked, so that cycles terminate.
    walked: HashSet<node::Id>,
}

/// An entry in the forward work queue.
#[derive(Clone, Copy, Debug)]
enum Entry {
    /// Found during discovery. Skipped if already visited.
    Source(node::Id),
    /// All inputs satisfied. Marked visited when enqueued.
    Ready(node::Id),
}

/// Produce the execution order for the given sinks.
///
/// On error, all traversal state is restored before returning.
pub(crate) fn schedule(arena: &mut Arena, sinks: &[node::Id]) -> Result<Schedule, RunError> {
    let discovery = discover(arena, sinks)?;
    log::debug!(
        "discovered {} source(s) across {} upstream node(s) of {} sink(s)",
        discovery.sources.len(),
        discovery.closure.len(),
        sinks.len(),
    );

    let schedule = order(arena, discovery.sources);

    let scheduled: HashSet<_> = schedule.order.iter().copied().collect();
    let blocked: Vec<_> = discovery
        .closure
        .iter()
        .copied()
        .filter(|n| !scheduled.contains(n))
        .collect();
    if !blocked.is_empty() {
        for &id in &schedule.touched {
            if let Some(node) = arena.node_weight_mut(id) {
                node.reset_state();
            }
        }
        let cycles = cycles(arena, &blocked);
        return Err(RunError::CycleDetected(Cycle { blocked, cycles }));
    }

    Ok(schedule)
}

/// Walk backward from each sink, collecting the sources that feed it.
fn discover(arena: &Arena, sinks: &[node::Id]) -> Result<Discovery, RunError> {
    let mut discovery = Discovery::default();
    for &sink in sinks {
        let node = arena
            .node_weight(sink)
            .ok_or(RunError::UnregisteredDependency { node: sink })?;
        // A sink with nothing linked into it has nothing to run.
        if node.has_linked_inputs() {
            discover_upstream(arena, sink, &mut discovery)?;
        }
    }
    Ok(discovery)
}

/// Walk backward from `sink` depth first, in port then link order.
///
/// Each frame on the stack holds the upstream links a node has left to visit,
/// so the depth of the graph never grows the call stack.
fn discover_upstream(
    arena: &Arena,
    sink: node::Id,
    discovery: &mut Discovery,
) -> Result<(), RunError> {
    let Some(links) = enter(arena, sink, discovery)? else {
        return Ok(());
    };
    let mut stack = vec![links.into_iter()];
    while let Some(links) = stack.last_mut() {
        let Some(addr) = links.next() else {
            stack.pop();
            continue;
        };
        let upstream = arena
            .node_weight(addr.node)
            .ok_or(RunError::UnregisteredDependency { node: addr.node })?;
        if upstream.has_linked_inputs() {
            if let Some(links) = enter(arena, addr.node, discovery)? {
                stack.push(links.into_iter());
            }
        } else {
            if discovery.walked.insert(addr.node) {
                discovery.closure.push(addr.node);
            }
            discovery.sources.push_back(addr.node);
        }
    }
    Ok(())
}

/// Record the node as walked, returning the links feeding its inputs.
///
/// Returns `None` if the node was already walked.
fn enter(
    arena: &Arena,
    id: node::Id,
    discovery: &mut Discovery,
) -> Result<Option<Vec<port::Addr>>, RunError> {
    if !discovery.walked.insert(id) {
        return Ok(None);
    }
    discovery.closure.push(id);
    let node = arena
        .node_weight(id)
        .ok_or(RunError::UnregisteredDependency { node: id })?;
    let links = node
        .input_ports()
        .flat_map(|p| p.links().iter().copied())
        .collect();
    Ok(Some(links))
}

/// Recount a node's in-degree, then satisfy every input that has no link.
///
/// An unlinked input is fed by whatever value it already holds.
fn prime(node: &mut Node) {
    node.reset_indegree();
    let unlinked = node.input_ports().filter(|p| p.is_unlinked()).count();
    node.satisfy(unlinked);
}

/// Walk forward from the discovered sources producing the execution order.
fn order(arena: &mut Arena, sources: VecDeque<node::Id>) -> Schedule {
    let mut schedule = Schedule::default();
    let mut primed = HashSet::new();
    // Sources still outstanding for each linked input port.
    let mut remaining: HashMap<port::Addr, usize> = HashMap::new();
    let mut queue: VecDeque<Entry> = sources.into_iter().map(Entry::Source).collect();

    while let Some(entry) = queue.pop_front() {
        let id = match entry {
            Entry::Source(id) => {
                let Some(node) = arena.node_weight_mut(id) else {
                    continue;
                };
                if node.is_visited() {
                    continue;
                }
                node.set_visited(true);
                if primed.insert(id) {
                    prime(node);
                    schedule.touched.push(id);
                }
                id
            }
            Entry::Ready(id) => id,
        };
        schedule.order.push(id);

        // Relax every edge leaving this node.
        let consumers: Vec<port::Addr> = arena[id]
            .output_ports()
            .flat_map(|p| p.links().iter().copied())
            .collect();
        for addr in consumers {
            let Some(consumer) = arena.node_weight_mut(addr.node) else {
                continue;
            };
            if primed.insert(addr.node) {
                prime(consumer);
                schedule.touched.push(addr.node);
            }
            let n_sources = consumer.port(addr.port).map_or(0, |p| p.links().len());
            let left = remaining.entry(addr).or_insert(n_sources);
            *left = left.saturating_sub(1);
            if *left > 0 {
                continue;
            }
            if consumer.satisfy(1) == 0 && !consumer.is_visited() {
                consumer.set_visited(true);
                queue.push_back(Entry::Ready(addr.node));
            }
        }
    }

    schedule
}

/// Find the cycles among the blocked nodes.
fn cycles(arena: &Arena, blocked: &[node::Id]) -> Vec<Vec<node::Id>> {
    let mut g = DiGraphMap::<node::Id, ()>::new();
    for &n in blocked {
        g.add_node(n);
    }
    for &n in blocked {
        for e in arena.edges_directed(n, petgraph::Outgoing) {
            if g.contains_node(e.target()) {
                g.add_edge(n, e.target(), ());
            }
        }
    }
    let mut cycles: Vec<_> = petgraph::algo::kosaraju_scc(&g)
        .into_iter()
        .filter(|scc| scc.len() > 1 || g.contains_edge(scc[0], scc[0]))
        .map(|mut scc| {
            scc.sort();
            scc
        })
        .collect();
    cycles.sort();
    cycles
}
