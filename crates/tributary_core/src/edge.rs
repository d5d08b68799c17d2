use crate::{node, port};
use serde::{Deserialize, Serialize};

/// Describes a link between an output port on one node and an input port on
/// another.
///
/// Used as the edge weight of the graph's node arena. The nodes themselves
/// are the edge's endpoints.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Edge {
    /// Position of the output port on the source node.
    pub output: usize,
    /// Position of the input port on the destination node.
    pub input: usize,
}

impl Edge {
    /// Create an edge from the output at position `output` to the input at
    /// position `input`.
    pub fn new(output: usize, input: usize) -> Self {
        Edge { output, input }
    }

    /// The edge's source port address, given the source node.
    pub fn output_addr(&self, node: node::Id) -> port::Addr {
        port::Addr::new(node, self.output)
    }

    /// The edge's destination port address, given the destination node.
    pub fn input_addr(&self, node: node::Id) -> port::Addr {
        port::Addr::new(node, self.input)
    }
}
