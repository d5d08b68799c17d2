//! Ports are the named, directional data slots through which nodes exchange
//! values.

use crate::{
    error::TypeMismatch,
    node,
    value::{FromValue, Value},
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a port receives values or produces them.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Deserialize, Serialize)]
pub enum Direction {
    Input,
    Output,
}

/// A named, typed, directional data slot on a node.
///
/// Input ports link to the output ports that feed them. Output ports link
/// to the input ports that consume them. Links are plain addresses into the
/// owning [`Graph`](crate::Graph) and are only created through
/// [`Graph::link`](crate::Graph::link).
#[derive(Clone, Debug, PartialEq)]
pub struct Port {
    id: String,
    direction: Direction,
    value: Value,
    default: Value,
    dirty: bool,
    links: Vec<Addr>,
    owner: Option<node::Id>,
}

/// The resolved location of a port within a graph.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Deserialize, Serialize)]
pub struct Addr {
    /// The node that owns the port.
    pub node: node::Id,
    /// The port's position within the node's port sequence.
    pub port: usize,
}

/// Refers to a port on a node either by position or by identifier.
#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Deserialize, Serialize)]
pub enum PortKey {
    Index(usize),
    Id(String),
}

/// A caller-facing reference to a port within a graph.
///
/// ```
/// use tributary_core::{PortRef, node};
/// let a = PortRef::new(node::Id::new(0), "num1");
/// let b: PortRef = (node::Id::new(1), 0usize).into();
/// # let _ = (a, b);
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
pub struct PortRef {
    pub node: node::Id,
    pub port: PortKey,
}

impl Port {
    /// Create a port with the given identifier, direction and default value.
    ///
    /// The port's value starts out as the default.
    pub fn new(id: impl Into<String>, direction: Direction, default: impl Into<Value>) -> Self {
        let default = default.into();
        Port {
            id: id.into(),
            direction,
            value: default.clone(),
            default,
            dirty: false,
            links: vec![],
            owner: None,
        }
    }

    /// Shorthand for `Port::new(id, Direction::Input, default)`.
    pub fn input(id: impl Into<String>, default: impl Into<Value>) -> Self {
        Self::new(id, Direction::Input, default)
    }

    /// Shorthand for `Port::new(id, Direction::Output, default)`.
    pub fn output(id: impl Into<String>, default: impl Into<Value>) -> Self {
        Self::new(id, Direction::Output, default)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_input(&self) -> bool {
        self.direction == Direction::Input
    }

    pub fn is_output(&self) -> bool {
        self.direction == Direction::Output
    }

    /// The current value. Reading does not clear the dirty flag.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Overwrite the current value and mark the port dirty.
    pub fn set_value(&mut self, value: impl Into<Value>) {
        self.value = value.into();
        self.dirty = true;
    }

    /// Read the current value as `T`.
    pub fn read<T: FromValue>(&self) -> Result<T, TypeMismatch> {
        T::from_value(&self.value)
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }

    /// Change the value that [`Port::reset`] restores.
    pub fn set_default_value(&mut self, value: impl Into<Value>) {
        self.default = value.into();
    }

    /// Restore the current value to the default. The dirty flag is untouched.
    pub fn reset(&mut self) {
        self.value = self.default.clone();
    }

    /// Whether the value has been written since the flag was last cleared.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }

    /// For inputs, the output ports feeding this port. For outputs, the
    /// input ports consuming it. In the order they were linked.
    pub fn links(&self) -> &[Addr] {
        &self.links
    }

    pub fn is_linked(&self) -> bool {
        !self.links.is_empty()
    }

    pub fn is_unlinked(&self) -> bool {
        self.links.is_empty()
    }

    /// The node that owns this port, once that node is added to a graph.
    pub fn owner(&self) -> Option<node::Id> {
        self.owner
    }

    pub(crate) fn set_owner(&mut self, owner: Option<node::Id>) {
        self.owner = owner;
    }

    /// Returns `false` if the address was already linked.
    pub(crate) fn insert_link(&mut self, addr: Addr) -> bool {
        if self.links.contains(&addr) {
            return false;
        }
        self.links.push(addr);
        true
    }

    /// Returns `false` if the address was not linked.
    pub(crate) fn remove_link(&mut self, addr: Addr) -> bool {
        let len = self.links.len();
        self.links.retain(|a| *a != addr);
        self.links.len() != len
    }

    pub(crate) fn clear_links(&mut self) {
        self.links.clear();
    }
}

impl Addr {
    pub fn new(node: node::Id, port: usize) -> Self {
        Addr { node, port }
    }
}

impl PortRef {
    pub fn new(node: node::Id, port: impl Into<PortKey>) -> Self {
        let port = port.into();
        PortRef { node, port }
    }
}

impl From<usize> for PortKey {
    fn from(ix: usize) -> Self {
        PortKey::Index(ix)
    }
}

impl From<&str> for PortKey {
    fn from(id: &str) -> Self {
        PortKey::Id(id.to_string())
    }
}

impl From<String> for PortKey {
    fn from(id: String) -> Self {
        PortKey::Id(id)
    }
}

impl<K> From<(node::Id, K)> for PortRef
where
    K: Into<PortKey>,
{
    fn from((node, port): (node::Id, K)) -> Self {
        PortRef::new(node, port)
    }
}

impl From<Addr> for PortRef {
    fn from(addr: Addr) -> Self {
        PortRef::new(addr.node, addr.port)
    }
}

impl fmt::Display for PortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortKey::Index(ix) => write!(f, "index {ix}"),
            PortKey::Id(id) => write!(f, "id `{id}`"),
        }
    }
}
