pub use ports::Ports;

use crate::{
    error::{ExecuteError, PortError, PortNotFound},
    port::{Direction, Port, PortKey},
};
use std::{any::Any, fmt};

pub mod ports;

/// Type used to represent a node's ID within a graph.
pub type Id = petgraph::graph::NodeIndex;

/// The behaviour of a kind of node.
///
/// Implementors declare their ports via [`Execute::ports`] and compute their
/// outputs from their inputs in [`Execute::execute`]. A graph re-runs every
/// node on each pass, so `execute` must be safe to call repeatedly and
/// should have no effects beyond writing its ports (logging aside).
pub trait Execute: AsAny + fmt::Debug {
    /// The display name used for nodes of this kind.
    fn name(&self) -> &str;

    /// The ports a node of this kind starts out with, in order.
    fn ports(&self) -> Vec<Port> {
        vec![]
    }

    /// Read values from the input ports and write results to the outputs.
    fn execute(&mut self, ports: &mut Ports) -> Result<(), ExecuteError>;
}

/// Allows for downcasting a `dyn Execute` to its concrete kind.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A unit of computation: an ordered set of ports and some behaviour.
///
/// Nodes are owned by a [`Graph`](crate::Graph) once added. The in-degree
/// and visited state are maintained by the graph while it schedules a run,
/// and are always restored by the time the run returns.
#[derive(Debug)]
pub struct Node {
    id: Option<Id>,
    name: String,
    ports: Ports,
    indegree: usize,
    visited: bool,
    kind: Box<dyn Execute>,
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl Node {
    /// Create a node of the given kind, adding each of its declared ports.
    pub fn new(kind: impl Execute) -> Result<Self, PortError> {
        Self::from_boxed(Box::new(kind))
    }

    /// Create a node from an already boxed kind.
    pub fn from_boxed(kind: Box<dyn Execute>) -> Result<Self, PortError> {
        let mut node = Node {
            id: None,
            name: kind.name().to_string(),
            ports: Ports::new(),
            indegree: 0,
            visited: false,
            kind,
        };
        for port in node.kind.ports() {
            node.add_port(port)?;
        }
        Ok(node)
    }

    /// Consume the node and return it with the given display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// The node's ID, once added to a graph.
    pub fn id(&self) -> Option<Id> {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: Option<Id>) {
        self.id = id;
        for port in &mut self.ports {
            port.set_owner(id);
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Append a port, returning its position.
    ///
    /// Fails if the node already has a port with the same identifier.
    pub fn add_port(&mut self, mut port: Port) -> Result<usize, PortError> {
        port.set_owner(self.id);
        let is_input = port.is_input();
        let ix = self.ports.push(port)?;
        if is_input {
            self.indegree += 1;
        }
        Ok(ix)
    }

    pub fn ports(&self) -> &Ports {
        &self.ports
    }

    /// Mutable access to the ports' values.
    ///
    /// Links are not affected by anything reachable through here.
    pub fn ports_mut(&mut self) -> &mut Ports {
        &mut self.ports
    }

    /// The port at the given position.
    pub fn port(&self, ix: usize) -> Option<&Port> {
        self.ports.get(ix)
    }

    pub fn port_mut(&mut self, ix: usize) -> Option<&mut Port> {
        self.ports.get_mut(ix)
    }

    pub fn port_by_id(&self, id: &str) -> Option<&Port> {
        self.ports.by_id(id)
    }

    pub fn port_by_id_mut(&mut self, id: &str) -> Option<&mut Port> {
        self.ports.by_id_mut(id)
    }

    /// Look up a port by position or identifier.
    pub fn try_port(&self, key: impl Into<PortKey>) -> Result<&Port, PortNotFound> {
        self.ports.try_get(key)
    }

    pub fn try_port_mut(&mut self, key: impl Into<PortKey>) -> Result<&mut Port, PortNotFound> {
        self.ports.try_get_mut(key)
    }

    /// Input ports in sequence order.
    pub fn input_ports(&self) -> impl Iterator<Item = &Port> {
        self.ports.directed(Direction::Input).map(|(_, p)| p)
    }

    /// Output ports in sequence order.
    pub fn output_ports(&self) -> impl Iterator<Item = &Port> {
        self.ports.directed(Direction::Output).map(|(_, p)| p)
    }

    pub fn inputs_len(&self) -> usize {
        self.ports.count(Direction::Input)
    }

    pub fn outputs_len(&self) -> usize {
        self.ports.count(Direction::Output)
    }

    /// The number of inputs not yet satisfied during the current traversal.
    ///
    /// Outside of a run this equals the number of input ports.
    pub fn indegree(&self) -> usize {
        self.indegree
    }

    /// Recount the in-degree from the current input ports.
    pub fn reset_indegree(&mut self) {
        self.indegree = self.inputs_len();
    }

    pub fn is_visited(&self) -> bool {
        self.visited
    }

    pub(crate) fn set_visited(&mut self, visited: bool) {
        self.visited = visited;
    }

    /// Satisfy one input, returning the remaining in-degree.
    pub(crate) fn satisfy(&mut self, n: usize) -> usize {
        self.indegree = self.indegree.saturating_sub(n);
        self.indegree
    }

    /// Restore the node's traversal state, ready for another run.
    pub fn reset_state(&mut self) {
        self.reset_indegree();
        self.visited = false;
    }

    /// Clear the dirty flag on every port.
    pub fn clean(&mut self) {
        for port in &mut self.ports {
            port.set_dirty(false);
        }
    }

    /// Run the node's behaviour against its ports.
    pub fn execute(&mut self) -> Result<(), ExecuteError> {
        self.kind.execute(&mut self.ports)
    }

    /// Whether any input port is linked to an upstream output.
    pub fn has_linked_inputs(&self) -> bool {
        self.input_ports().any(Port::is_linked)
    }

    /// True if the node has no input ports.
    pub fn is_source_by_shape(&self) -> bool {
        self.input_ports().next().is_none()
    }

    /// True if the node has no output ports.
    ///
    /// Note that the sinks used for scheduling are those registered via
    /// [`Graph::add_sink`](crate::Graph::add_sink), not this.
    pub fn is_sink_by_shape(&self) -> bool {
        self.output_ports().next().is_none()
    }

    pub fn kind(&self) -> &dyn Execute {
        &*self.kind
    }

    pub fn kind_mut(&mut self) -> &mut dyn Execute {
        &mut *self.kind
    }

    /// Downcast the node's behaviour to its concrete kind.
    pub fn kind_as<T: Execute>(&self) -> Option<&T> {
        let kind: &dyn Execute = &*self.kind;
        kind.as_any().downcast_ref()
    }

    pub fn kind_as_mut<T: Execute>(&mut self) -> Option<&mut T> {
        let kind: &mut dyn Execute = &mut *self.kind;
        kind.as_any_mut().downcast_mut()
    }
}
