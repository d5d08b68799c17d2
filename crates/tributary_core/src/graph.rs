//! The [`Graph`] owns nodes, links their ports and runs them.

use crate::{
    Edge,
    error::{GraphError, LinkError, NodeError, NodeErrors, RunError},
    node::{self, Node},
    port::{Addr, Direction, Port, PortRef},
    schedule::{self, Arena},
    value::Value,
};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// An owning collection of nodes along with the subset registered as sinks.
///
/// Node IDs remain stable across removals of other nodes.
#[derive(Debug, Default)]
pub struct Graph {
    arena: Arena,
    sinks: Vec<node::Id>,
    conf: Conf,
}

/// Configuration for how a [`Graph`] behaves during a run.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Deserialize, Serialize)]
pub struct Conf {
    /// What to do with the nodes downstream of a node that fails to execute.
    pub on_error: OnError,
}

/// The policy applied to nodes downstream of a failed node.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Deserialize, Serialize)]
pub enum OnError {
    /// Do not execute any node with a failed (or skipped) node upstream.
    #[default]
    SkipDependents,
    /// Keep executing. Dependents see whatever their inputs held before the
    /// failure, either a previous run's values or the port defaults.
    Continue,
}

/// A summary of a successful run.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Pass {
    /// The nodes in the order they were executed.
    pub order: Vec<node::Id>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_conf(conf: Conf) -> Self {
        Graph {
            conf,
            ..Default::default()
        }
    }

    pub fn conf(&self) -> &Conf {
        &self.conf
    }

    pub fn conf_mut(&mut self) -> &mut Conf {
        &mut self.conf
    }

    /// Take ownership of the node, returning its ID.
    pub fn add_node(&mut self, node: Node) -> node::Id {
        let id = self.arena.add_node(node);
        self.arena[id].set_id(Some(id));
        id
    }

    /// Register the node as one of the graph's sinks.
    ///
    /// The ID is not validated until the next [`Graph::run`]. Registering the
    /// same node twice has no effect.
    pub fn add_sink(&mut self, id: node::Id) {
        if !self.sinks.contains(&id) {
            self.sinks.push(id);
        }
    }

    /// Shorthand for [`Graph::add_node`] followed by [`Graph::add_sink`].
    pub fn add_sink_node(&mut self, node: Node) -> node::Id {
        let id = self.add_node(node);
        self.add_sink(id);
        id
    }

    /// Remove the node, unlinking all of its ports and dropping it from the
    /// set of sinks.
    pub fn remove_node(&mut self, id: node::Id) -> Option<Node> {
        let node = self.arena.node_weight(id)?;
        let links: Vec<(Addr, Addr)> = node
            .ports()
            .iter()
            .enumerate()
            .flat_map(move |(ix, p)| p.links().iter().map(move |&other| (Addr::new(id, ix), other)))
            .collect();
        for (own, other) in links {
            if let Some(port) = self.port_at_mut(other) {
                port.remove_link(own);
            }
        }
        self.sinks.retain(|&s| s != id);
        let mut node = self.arena.remove_node(id)?;
        node.set_id(None);
        for port in node.ports_mut() {
            port.clear_links();
        }
        log::trace!("removed node {} ({id:?})", node.name());
        Some(node)
    }

    pub fn contains(&self, id: node::Id) -> bool {
        self.arena.contains_node(id)
    }

    pub fn node(&self, id: node::Id) -> Option<&Node> {
        self.arena.node_weight(id)
    }

    pub fn node_mut(&mut self, id: node::Id) -> Option<&mut Node> {
        self.arena.node_weight_mut(id)
    }

    /// All nodes owned by the graph along with their IDs, in ID order.
    pub fn nodes(&self) -> impl Iterator<Item = (node::Id, &Node)> {
        self.arena
            .node_indices()
            .map(move |id| (id, &self.arena[id]))
    }

    pub fn node_count(&self) -> usize {
        self.arena.node_count()
    }

    /// The registered sinks, in registration order.
    pub fn sinks(&self) -> &[node::Id] {
        &self.sinks
    }

    /// Every link as `(source node, destination node, edge)`.
    pub fn edges(&self) -> impl Iterator<Item = (node::Id, node::Id, Edge)> {
        self.arena
            .edge_references()
            .map(|e| (e.source(), e.target(), *e.weight()))
    }

    /// Resolve a reference to a port's address.
    pub fn resolve(&self, port: &PortRef) -> Result<Addr, GraphError> {
        let node = self
            .arena
            .node_weight(port.node)
            .ok_or(GraphError::NodeNotFound(port.node))?;
        let ix = node
            .ports()
            .resolve(&port.port)
            .map_err(|source| GraphError::PortNotFound {
                node: port.node,
                source,
            })?;
        Ok(Addr::new(port.node, ix))
    }

    pub fn port(&self, port: impl Into<PortRef>) -> Result<&Port, GraphError> {
        let addr = self.resolve(&port.into())?;
        Ok(&self.arena[addr.node].ports()[addr.port])
    }

    pub fn port_mut(&mut self, port: impl Into<PortRef>) -> Result<&mut Port, GraphError> {
        let addr = self.resolve(&port.into())?;
        Ok(&mut self.arena[addr.node].ports_mut()[addr.port])
    }

    /// Write a value to a port, marking it dirty.
    pub fn set_value(
        &mut self,
        port: impl Into<PortRef>,
        value: impl Into<Value>,
    ) -> Result<(), GraphError> {
        self.port_mut(port)?.set_value(value);
        Ok(())
    }

    fn port_at_mut(&mut self, addr: Addr) -> Option<&mut Port> {
        self.arena.node_weight_mut(addr.node)?.port_mut(addr.port)
    }

    /// Resolve both ends, returning `(output, input)`.
    fn link_ends(&self, a: PortRef, b: PortRef) -> Result<(Addr, Addr), LinkError> {
        let a = self.resolve(&a)?;
        let b = self.resolve(&b)?;
        let direction = self.arena[a.node].ports()[a.port].direction();
        if direction == self.arena[b.node].ports()[b.port].direction() {
            return Err(LinkError::SameDirection { direction });
        }
        match direction {
            Direction::Output => Ok((a, b)),
            Direction::Input => Ok((b, a)),
        }
    }

    /// Link an output port with an input port, in either argument order.
    ///
    /// Returns `Ok(false)` if the two ports were already linked, in which
    /// case nothing changes.
    pub fn link(
        &mut self,
        a: impl Into<PortRef>,
        b: impl Into<PortRef>,
    ) -> Result<bool, LinkError> {
        let (output, input) = self.link_ends(a.into(), b.into())?;
        if !self.arena[output.node].ports_mut()[output.port].insert_link(input) {
            return Ok(false);
        }
        self.arena[input.node].ports_mut()[input.port].insert_link(output);
        self.arena
            .add_edge(output.node, input.node, Edge::new(output.port, input.port));
        log::trace!("linked {output:?} -> {input:?}");
        Ok(true)
    }

    /// Remove the link between two ports, in either argument order.
    ///
    /// Returns `Ok(false)` if the ports were not linked.
    pub fn unlink(
        &mut self,
        a: impl Into<PortRef>,
        b: impl Into<PortRef>,
    ) -> Result<bool, LinkError> {
        let (output, input) = self.link_ends(a.into(), b.into())?;
        if !self.arena[output.node].ports_mut()[output.port].remove_link(input) {
            return Ok(false);
        }
        self.arena[input.node].ports_mut()[input.port].remove_link(output);
        let weight = Edge::new(output.port, input.port);
        let edge = self
            .arena
            .edges_directed(output.node, petgraph::Outgoing)
            .find(|e| e.target() == input.node && *e.weight() == weight)
            .map(|e| e.id());
        if let Some(edge) = edge {
            self.arena.remove_edge(edge);
        }
        log::trace!("unlinked {output:?} -> {input:?}");
        Ok(true)
    }

    /// Run a single full pass over the graph.
    ///
    /// 1. Discover the sources feeding each sink.
    /// 2. Order the nodes so each follows everything feeding it.
    /// 3. Execute each node, pushing its outputs along its links.
    ///
    /// Structural errors are returned before any node executes. Node
    /// failures are collected and returned once the pass completes, with
    /// dependents handled according to [`Conf::on_error`]. Either way every
    /// node's traversal state is restored, so the graph may be run again.
    pub fn run(&mut self) -> Result<Pass, RunError> {
        let schedule = schedule::schedule(&mut self.arena, &self.sinks)?;
        log::debug!("executing {} node(s)", schedule.order.len());

        let mut errors = NodeErrors::default();
        // Nodes that failed, or were skipped because of a failure upstream.
        let mut failed = HashSet::new();
        for &id in &schedule.order {
            let skip = self.conf.on_error == OnError::SkipDependents
                && !failed.is_empty()
                && self.depends_on_any(id, &failed);
            let node = &mut self.arena[id];
            if skip {
                log::warn!("skipping node {} ({id:?}): upstream failure", node.name());
                errors.skipped.push(id);
                failed.insert(id);
            } else {
                log::trace!("executing node {} ({id:?})", node.name());
                match node.execute() {
                    Ok(()) => self.propagate(id),
                    Err(error) => {
                        log::warn!("node {} ({id:?}) failed: {error}", node.name());
                        let name = node.name().to_string();
                        errors.errors.push(NodeError {
                            node: id,
                            name,
                            error,
                        });
                        failed.insert(id);
                    }
                }
            }
            let node = &mut self.arena[id];
            node.clean();
            node.reset_state();
        }

        // Restore anything that was touched but never became ready. Such a
        // node may still have received values from upstream.
        for &id in &schedule.touched {
            if let Some(node) = self.arena.node_weight_mut(id) {
                node.clean();
                node.reset_state();
            }
        }

        if !errors.errors.is_empty() {
            return Err(RunError::Execute(errors));
        }
        Ok(Pass {
            order: schedule.order,
        })
    }

    /// Whether any of the node's inputs are linked to one of the given nodes.
    fn depends_on_any(&self, id: node::Id, nodes: &HashSet<node::Id>) -> bool {
        self.arena[id]
            .input_ports()
            .flat_map(Port::links)
            .any(|addr| nodes.contains(&addr.node))
    }

    /// Write each of the node's output values into every linked input.
    fn propagate(&mut self, id: node::Id) {
        let updates: Vec<(Addr, Value)> = self.arena[id]
            .output_ports()
            .flat_map(|p| p.links().iter().map(move |&addr| (addr, p.value().clone())))
            .collect();
        for (addr, value) in updates {
            if let Some(port) = self.port_at_mut(addr) {
                port.set_value(value);
            }
        }
    }
}
