mod error;
mod graph;
mod load;
mod node;
mod parse;

pub use error::{LayoutError, Result};
pub use graph::{Edge, LayoutGraph, LayoutNode, UNASSIGNED_DEPTH};
pub use load::{demo_nodes, load_nodes};
pub use node::Node;
pub use parse::parse_nodes;
