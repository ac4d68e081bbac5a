use std::collections::HashMap;
use std::collections::hash_map::Entry;

use eframe::egui::Vec2;
use tracing::{debug, warn};

use super::error::{LayoutError, Result};
use super::node::Node;

pub const UNASSIGNED_DEPTH: i32 = -1;

/// A node as the layout engine sees it.
#[derive(Clone, Debug)]
pub struct LayoutNode {
    pub node: Node,
    pub depth: i32,
    /// How many dependency entries across the graph name this node.
    pub in_degree: usize,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Set only while the node is being dragged.
    pub pin: Option<Vec2>,
}

impl LayoutNode {
    fn new(node: Node) -> Self {
        Self {
            node,
            depth: UNASSIGNED_DEPTH,
            in_degree: 0,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            pin: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.node.name
    }

    pub fn is_root(&self) -> bool {
        self.in_degree == 0
    }
}

/// One dependency entry, resolved: `source` declares `target` as a dependency.
/// Both fields index into [`LayoutGraph::nodes`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
    pub source: usize,
    pub target: usize,
}

/// Nodes in input order plus the resolved edges between them.
#[derive(Clone, Debug, Default)]
pub struct LayoutGraph {
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<Edge>,
    index_by_name: HashMap<String, usize>,
}

impl LayoutGraph {
    /// Indexes, assigns depths and resolves links in one go. Any malformed
    /// input fails the whole build.
    pub fn build(nodes: &[Node]) -> Result<Self> {
        let mut graph = Self::index(nodes)?;
        graph.assign_depths()?;
        graph.edges = graph.build_links()?;

        debug!(
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            roots = graph.roots().count(),
            max_depth = graph.max_depth(),
            "built lineage graph"
        );
        Ok(graph)
    }

    /// Name index over the nodes in input order, with `in_degree` counted and
    /// every dependency name checked. Duplicate names are rejected. Depths
    /// start unassigned and no edges are resolved yet.
    pub fn index(nodes: &[Node]) -> Result<Self> {
        let mut index_by_name = HashMap::with_capacity(nodes.len());
        let mut layout_nodes = Vec::with_capacity(nodes.len());
        for node in nodes {
            match index_by_name.entry(node.name.clone()) {
                Entry::Occupied(_) => {
                    return Err(LayoutError::NameCollision {
                        name: node.name.clone(),
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(layout_nodes.len());
                    layout_nodes.push(LayoutNode::new(node.clone()));
                }
            }
        }

        for node in nodes {
            for dependency in &node.dependencies {
                let Some(&target) = index_by_name.get(dependency) else {
                    return Err(LayoutError::UnresolvedReference {
                        node: node.name.clone(),
                        dependency: dependency.clone(),
                    });
                };
                layout_nodes[target].in_degree += 1;
            }
        }

        Ok(Self {
            nodes: layout_nodes,
            edges: Vec::new(),
            index_by_name,
        })
    }

    /// Longest-path depth from the roots. Re-running it yields the same
    /// depths.
    ///
    /// Members of a cycle get a best-effort depth: a path never revisits a
    /// node it already passed through. Nodes that no root reaches (a cycle
    /// nobody outside depends on) are seeded afterwards in input order.
    pub fn assign_depths(&mut self) -> Result<()> {
        for node in &mut self.nodes {
            node.depth = UNASSIGNED_DEPTH;
        }

        let roots = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.is_root())
            .map(|(index, _)| index)
            .collect::<Vec<_>>();
        self.propagate_depths(&roots)?;

        while let Some(seed) = self
            .nodes
            .iter()
            .position(|node| node.depth == UNASSIGNED_DEPTH)
        {
            warn!(
                node = self.nodes[seed].name(),
                "node is not reachable from any root, seeding it as depth 0"
            );
            self.propagate_depths(&[seed])?;
        }

        Ok(())
    }

    fn propagate_depths(&mut self, seeds: &[usize]) -> Result<()> {
        let mut stack = seeds
            .iter()
            .rev()
            .map(|&index| (index, Vec::<usize>::new()))
            .collect::<Vec<_>>();

        while let Some((index, mut path)) = stack.pop() {
            let candidate = path.len() as i32;
            let node = &mut self.nodes[index];
            if node.depth != UNASSIGNED_DEPTH && candidate <= node.depth {
                continue;
            }
            node.depth = candidate;

            path.push(index);
            let node = &self.nodes[index];
            for dependency in &node.node.dependencies {
                let dependency_index = self.index_of(dependency).ok_or_else(|| {
                    LayoutError::UnresolvedReference {
                        node: node.node.name.clone(),
                        dependency: dependency.clone(),
                    }
                })?;
                if path.contains(&dependency_index) {
                    continue;
                }
                stack.push((dependency_index, path.clone()));
            }
        }

        Ok(())
    }

    /// One edge per dependency entry, duplicates included.
    pub fn build_links(&self) -> Result<Vec<Edge>> {
        let mut edges = Vec::new();
        for (source, node) in self.nodes.iter().enumerate() {
            for dependency in &node.node.dependencies {
                let target = self.index_of(dependency).ok_or_else(|| {
                    LayoutError::UnresolvedReference {
                        node: node.node.name.clone(),
                        dependency: dependency.clone(),
                    }
                })?;
                edges.push(Edge { source, target });
            }
        }
        Ok(edges)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&LayoutNode> {
        self.index_of(name).map(|index| &self.nodes[index])
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index_by_name.get(name).copied()
    }

    pub fn depth_of(&self, name: &str) -> Option<i32> {
        self.get(name).map(|node| node.depth)
    }

    pub fn roots(&self) -> impl Iterator<Item = &LayoutNode> {
        self.nodes.iter().filter(|node| node.is_root())
    }

    pub fn max_depth(&self) -> i32 {
        self.nodes
            .iter()
            .map(|node| node.depth)
            .max()
            .unwrap_or(UNASSIGNED_DEPTH)
    }

    pub fn positions(&self) -> Vec<Vec2> {
        self.nodes.iter().map(|node| node.position).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> Vec<Node> {
        vec![
            Node::new("root", ["dep1", "dep2"]),
            Node::new("dep1", ["dep3"]),
            Node::new("dep2", ["dep3"]),
            Node::new("dep3", ["dep4"]),
            Node::new("dep4", Vec::<String>::new()),
        ]
    }

    #[test]
    fn index_counts_in_degree_and_keeps_input_order() {
        let graph = LayoutGraph::index(&chain()).expect("valid graph");
        let names = graph.nodes.iter().map(LayoutNode::name).collect::<Vec<_>>();
        assert_eq!(names, vec!["root", "dep1", "dep2", "dep3", "dep4"]);
        assert_eq!(graph.nodes[0].in_degree, 0);
        assert_eq!(graph.get("dep1").map(|node| node.in_degree), Some(1));
        assert_eq!(graph.get("dep3").map(|node| node.in_degree), Some(2));
        assert!(graph.nodes.iter().all(|node| node.depth == UNASSIGNED_DEPTH));
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn index_rejects_duplicate_names() {
        let nodes = vec![
            Node::new("a", Vec::<String>::new()),
            Node::new("a", ["b"]),
            Node::new("b", Vec::<String>::new()),
        ];
        assert_eq!(
            LayoutGraph::index(&nodes).unwrap_err(),
            LayoutError::NameCollision {
                name: "a".to_owned()
            }
        );
    }

    #[test]
    fn depths_follow_the_longest_chain() {
        let graph = LayoutGraph::build(&chain()).expect("valid graph");
        let depths = graph
            .nodes
            .iter()
            .map(|node| (node.name(), node.depth))
            .collect::<Vec<_>>();
        assert_eq!(
            depths,
            vec![("root", 0), ("dep1", 1), ("dep2", 1), ("dep3", 2), ("dep4", 3)]
        );
    }

    #[test]
    fn shortcut_edge_does_not_pull_a_node_shallower() {
        let nodes = vec![
            Node::new("app", ["lib", "core"]),
            Node::new("lib", ["util"]),
            Node::new("util", ["core"]),
            Node::new("core", Vec::<String>::new()),
        ];
        let graph = LayoutGraph::build(&nodes).expect("valid graph");
        assert_eq!(graph.depth_of("core"), Some(3));
    }

    #[test]
    fn cycle_terminates_with_non_negative_depths() {
        let nodes = vec![
            Node::new("root", ["a"]),
            Node::new("a", ["b"]),
            Node::new("b", ["a"]),
        ];
        let graph = LayoutGraph::build(&nodes).expect("cycles are not fatal");
        assert_eq!(graph.depth_of("root"), Some(0));
        assert_eq!(graph.depth_of("a"), Some(1));
        assert_eq!(graph.depth_of("b"), Some(2));
    }

    #[test]
    fn rootless_cycle_is_seeded_in_input_order() {
        let nodes = vec![
            Node::new("x", ["y"]),
            Node::new("y", ["x"]),
            Node::new("self", ["self"]),
        ];
        let graph = LayoutGraph::build(&nodes).expect("cycles are not fatal");
        assert_eq!(graph.depth_of("x"), Some(0));
        assert_eq!(graph.depth_of("y"), Some(1));
        assert_eq!(graph.depth_of("self"), Some(0));
        assert_eq!(graph.roots().count(), 0);
    }

    #[test]
    fn links_keep_every_dependency_entry() {
        let graph = LayoutGraph::build(&chain()).expect("valid graph");
        assert_eq!(graph.edges.len(), 5);
        assert_eq!(graph.edges[0], Edge { source: 0, target: 1 });
        assert_eq!(graph.edges[1], Edge { source: 0, target: 2 });
    }

    #[test]
    fn unresolved_dependency_fails_the_build() {
        let nodes = vec![Node::new("a", ["ghost"])];
        assert_eq!(
            LayoutGraph::build(&nodes).unwrap_err(),
            LayoutError::UnresolvedReference {
                node: "a".to_owned(),
                dependency: "ghost".to_owned(),
            }
        );
    }
}
