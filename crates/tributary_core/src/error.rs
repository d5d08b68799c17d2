//! Error types shared by ports, nodes and the graph.

use crate::{
    node,
    port::{Direction, PortKey},
    value::Kind,
};
use std::fmt;
use thiserror::Error;

/// A port's value could not be interpreted as the requested type.
#[derive(Clone, Copy, Debug, Error, Eq, Hash, PartialEq)]
#[error("type mismatch: expected {expected}, found {found}")]
pub struct TypeMismatch {
    pub expected: Kind,
    pub found: Kind,
}

/// No port exists for the given index or identifier.
#[derive(Clone, Debug, Error, Eq, Hash, PartialEq)]
#[error("no port found for {key}")]
pub struct PortNotFound {
    pub key: PortKey,
}

/// Failed to add a port to a node.
#[derive(Clone, Debug, Error, Eq, Hash, PartialEq)]
pub enum PortError {
    /// The node already has a port with this identifier.
    #[error("node already has a port with id `{0}`")]
    Duplicate(String),
}

/// A lookup into the graph failed.
#[derive(Clone, Debug, Error, Eq, Hash, PartialEq)]
pub enum GraphError {
    /// The graph does not own a node with the given ID.
    #[error("no node {0:?} in graph")]
    NodeNotFound(node::Id),
    /// The node exists but has no such port.
    #[error("node {node:?}: {source}")]
    PortNotFound {
        node: node::Id,
        #[source]
        source: PortNotFound,
    },
}

/// Failed to link (or unlink) two ports.
#[derive(Clone, Debug, Error, Eq, Hash, PartialEq)]
pub enum LinkError {
    /// One of the two ends could not be resolved.
    #[error(transparent)]
    Graph(#[from] GraphError),
    /// Links only connect an input port with an output port.
    #[error("cannot link two {direction:?} ports")]
    SameDirection { direction: Direction },
}

/// Returned by a node's [`Execute::execute`](crate::Execute::execute)
/// implementation.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ExecuteError {
    #[error(transparent)]
    TypeMismatch(#[from] TypeMismatch),
    #[error(transparent)]
    PortNotFound(#[from] PortNotFound),
    #[error("{0}")]
    Custom(String),
}

/// A node's execution failed during a run.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("node {name} ({node:?}) failed: {error}")]
pub struct NodeError {
    pub node: node::Id,
    pub name: String,
    #[source]
    pub error: ExecuteError,
}

/// All node failures from a single run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeErrors {
    /// One entry per failed node, in execution order.
    pub errors: Vec<NodeError>,
    /// Nodes that were not executed because something upstream failed.
    pub skipped: Vec<node::Id>,
}

/// Nodes that could never be scheduled because of a cycle.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Cycle {
    /// Every node upstream of a sink that was left out of the execution order.
    pub blocked: Vec<node::Id>,
    /// The strongly connected components among the blocked nodes.
    pub cycles: Vec<Vec<node::Id>>,
}

/// Failed to run the graph.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum RunError {
    /// A sink, or a node linked upstream of one, is not owned by the graph.
    #[error("node {node:?} is reachable from a sink but is not owned by the graph")]
    UnregisteredDependency { node: node::Id },
    /// Some node upstream of a sink can never have all its inputs satisfied.
    #[error(transparent)]
    CycleDetected(#[from] Cycle),
    /// One or more nodes failed while executing.
    #[error(transparent)]
    Execute(#[from] NodeErrors),
}

impl TypeMismatch {
    pub fn new(expected: Kind, found: Kind) -> Self {
        Self { expected, found }
    }
}

impl From<String> for ExecuteError {
    fn from(s: String) -> Self {
        ExecuteError::Custom(s)
    }
}

impl From<&str> for ExecuteError {
    fn from(s: &str) -> Self {
        ExecuteError::Custom(s.to_string())
    }
}

impl fmt::Display for NodeErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{err}")?;
        }
        if !self.skipped.is_empty() {
            write!(f, " ({} dependent node(s) skipped)", self.skipped.len())?;
        }
        Ok(())
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cycle detected: {} node(s) never became ready", self.blocked.len())?;
        for cycle in &self.cycles {
            write!(f, ", cycle through {cycle:?}")?;
        }
        Ok(())
    }
}

impl std::error::Error for NodeErrors {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.errors.first().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

impl std::error::Error for Cycle {}
