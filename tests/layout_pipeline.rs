use lineage_graph::lineage::{LayoutError, LayoutGraph, Node, parse_nodes};
use proptest::prelude::*;

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
fn chain_depths_follow_the_longest_path() {
    let graph = LayoutGraph::build(&chain()).expect("valid graph");

    let depths = graph
        .nodes
        .iter()
        .map(|node| (node.name().to_owned(), node.depth))
        .collect::<Vec<_>>();
    assert_eq!(
        depths,
        vec![
            ("root".to_owned(), 0),
            ("dep1".to_owned(), 1),
            ("dep2".to_owned(), 1),
            ("dep3".to_owned(), 2),
            ("dep4".to_owned(), 3),
        ]
    );
}

#[test]
fn every_dependency_sits_deeper_than_its_dependent() {
    let nodes = vec![
        Node::new("report", ["orders", "customers", "calendar"]),
        Node::new("orders", ["orders_raw", "calendar"]),
        Node::new("customers", ["crm_export"]),
        Node::new("orders_raw", Vec::<String>::new()),
        Node::new("crm_export", Vec::<String>::new()),
        Node::new("calendar", Vec::<String>::new()),
    ];
    let graph = LayoutGraph::build(&nodes).expect("valid graph");

    for root in graph.roots() {
        assert_eq!(root.depth, 0);
    }
    for edge in &graph.edges {
        let dependent = &graph.nodes[edge.source];
        let dependency = &graph.nodes[edge.target];
        assert!(
            dependency.depth >= dependent.depth + 1,
            "{} ({}) -> {} ({})",
            dependent.name(),
            dependent.depth,
            dependency.name(),
            dependency.depth
        );
    }
}

#[test]
fn reassigning_depths_changes_nothing() {
    let mut graph = LayoutGraph::build(&chain()).expect("valid graph");
    let before = graph.nodes.iter().map(|node| node.depth).collect::<Vec<_>>();

    graph.assign_depths().expect("still valid");

    let after = graph.nodes.iter().map(|node| node.depth).collect::<Vec<_>>();
    assert_eq!(before, after);
}

#[test]
fn one_edge_per_dependency_entry() {
    let nodes = vec![
        Node::new("a", ["b", "b", "c"]),
        Node::new("b", ["c"]),
        Node::new("c", Vec::<String>::new()),
    ];
    let graph = LayoutGraph::build(&nodes).expect("valid graph");

    let expected = nodes.iter().map(|node| node.dependencies.len()).sum::<usize>();
    assert_eq!(graph.edges.len(), expected);
    assert!(
        graph
            .edges
            .iter()
            .all(|edge| edge.source < graph.len() && edge.target < graph.len())
    );
}

#[test]
fn unresolved_dependency_fails_the_whole_build() {
    let nodes = vec![
        Node::new("a", ["b"]),
        Node::new("c", ["ghost"]),
        Node::new("b", Vec::<String>::new()),
    ];

    let error = LayoutGraph::build(&nodes).unwrap_err();

    assert_eq!(
        error,
        LayoutError::UnresolvedReference {
            node: "c".to_owned(),
            dependency: "ghost".to_owned(),
        }
    );
}

#[test]
fn cycles_terminate_with_non_negative_depths() {
    let nodes = vec![
        Node::new("entry", ["a"]),
        Node::new("a", ["b"]),
        Node::new("b", ["a"]),
        Node::new("x", ["y"]),
        Node::new("y", ["x"]),
    ];
    let graph = LayoutGraph::build(&nodes).expect("cycles are not fatal");

    assert!(graph.nodes.iter().all(|node| node.depth >= 0));
    assert_eq!(graph.depth_of("entry"), Some(0));
}

#[test]
fn json_input_keeps_payload_fields() {
    let nodes = parse_nodes(
        r#"{ "nodes": [
            { "name": "orders", "dependencies": ["orders_raw"], "owner": "sales" },
            { "name": "orders_raw", "dependencies": [] }
        ] }"#,
    )
    .expect("valid JSON");
    let graph = LayoutGraph::build(&nodes).expect("valid graph");

    let orders = graph.get("orders").expect("indexed");
    assert_eq!(orders.node.payload.get("owner"), Some(&serde_json::json!("sales")));
    assert_eq!(graph.edges.len(), 1);
}

/// Acyclic node lists: node `i` may only depend on nodes with a larger
/// index, and the list is handed over in shuffled order.
fn acyclic_nodes() -> impl Strategy<Value = Vec<Node>> {
    (1usize..12)
        .prop_flat_map(|count| {
            (
                prop::collection::vec(any::<bool>(), count * count),
                Just((0..count).collect::<Vec<_>>()).prop_shuffle(),
            )
        })
        .prop_map(|(links, order)| {
            let count = order.len();
            order
                .into_iter()
                .map(|index| {
                    let dependencies = (index + 1..count)
                        .filter(|&dependency| links[index * count + dependency])
                        .map(|dependency| format!("n{dependency}"));
                    Node::new(format!("n{index}"), dependencies)
                })
                .collect()
        })
}

proptest! {
    #[test]
    fn acyclic_depths_are_longest_paths(nodes in acyclic_nodes()) {
        let graph = LayoutGraph::build(&nodes).expect("acyclic graphs are valid");

        for root in graph.roots() {
            prop_assert_eq!(root.depth, 0);
        }
        for edge in &graph.edges {
            let dependent = &graph.nodes[edge.source];
            let dependency = &graph.nodes[edge.target];
            prop_assert!(dependency.depth >= dependent.depth + 1);
        }
        for (index, node) in graph.nodes.iter().enumerate() {
            if node.is_root() {
                continue;
            }
            let deepest_dependent = graph
                .edges
                .iter()
                .filter(|edge| edge.target == index)
                .map(|edge| graph.nodes[edge.source].depth)
                .max();
            prop_assert_eq!(deepest_dependent.map(|depth| depth + 1), Some(node.depth));
        }
    }
}
