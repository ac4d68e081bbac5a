use std::path::Path;

use anyhow::{Context, Result};

use super::node::Node;
use super::parse::parse_nodes;

pub fn load_nodes(path: &Path) -> Result<Vec<Node>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read node list {}", path.display()))?;
    parse_nodes(&raw).with_context(|| format!("failed to parse node list {}", path.display()))
}

/// Small graph shown when no node list is given.
pub fn demo_nodes() -> Vec<Node> {
    vec![
        Node::new("root", ["dep1", "dep2"]),
        Node::new("dep1", ["dep3"]),
        Node::new("dep2", ["dep3"]),
        Node::new("dep3", ["dep4"]),
        Node::new("dep4", ["dep5", "dep6", "dep7"]),
        Node::new("dep5", Vec::<String>::new()),
        Node::new("dep6", Vec::<String>::new()),
        Node::new("dep7", Vec::<String>::new()),
        Node::new("dep8", Vec::<String>::new()),
    ]
}
