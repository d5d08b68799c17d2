//! The core types of tributary: [`Port`]s, [`Node`]s and the [`Graph`] that
//! owns, schedules and runs them.
//!
//! A run is a single full pass. Sources are discovered by walking backward
//! from the graph's sink nodes, an execution order is produced with a
//! variant of Kahn's algorithm, then each node is executed in turn with its
//! output values pushed along links into downstream input ports.

pub use edge::Edge;
pub use error::{ExecuteError, RunError, TypeMismatch};
pub use graph::{Conf, Graph, OnError, Pass};
pub use node::{Execute, Node};
pub use port::{Direction, Port, PortKey, PortRef};
pub use value::{FromValue, Kind, Value};

pub mod edge;
pub mod error;
pub mod graph;
pub mod node;
pub mod port;
mod schedule;
pub mod value;
