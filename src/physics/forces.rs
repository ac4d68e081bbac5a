use eframe::egui::Vec2;

use crate::config::LayoutConfig;
use crate::lineage::{Edge, LayoutNode};
use crate::util::{fallback_direction, jiggle};

use super::quadtree::QuadTree;

/// Share of a link's correction that moves the target: the busier end moves
/// less.
pub(super) fn link_biases(node_count: usize, edges: &[Edge]) -> Vec<f32> {
    let mut degree = vec![0u32; node_count];
    for edge in edges {
        degree[edge.source] += 1;
        degree[edge.target] += 1;
    }

    edges
        .iter()
        .map(|edge| {
            let source = degree[edge.source] as f32;
            let target = degree[edge.target] as f32;
            source / (source + target)
        })
        .collect()
}

/// Springs every edge toward `link_distance`. Velocities are updated in
/// place, edge by edge.
pub(super) fn apply_links(
    nodes: &mut [LayoutNode],
    edges: &[Edge],
    biases: &[f32],
    config: &LayoutConfig,
    alpha: f32,
) {
    for (edge, &bias) in edges.iter().zip(biases) {
        if edge.source == edge.target {
            continue;
        }
        let source = &nodes[edge.source];
        let target = &nodes[edge.target];

        let mut delta =
            (target.position + target.velocity) - (source.position + source.velocity);
        if delta.length_sq() <= f32::EPSILON {
            delta = jiggle(source.name());
        }
        let distance = delta.length();
        let correction =
            delta * ((distance - config.link_distance) / distance * alpha * config.link_strength);

        nodes[edge.target].velocity -= correction * bias;
        nodes[edge.source].velocity += correction * (1.0 - bias);
    }
}

/// Pushes apart nodes whose clearance circles overlap. Works on the
/// positions the nodes are about to move to.
pub(super) fn apply_collisions(
    nodes: &mut [LayoutNode],
    predicted: &mut Vec<Vec2>,
    config: &LayoutConfig,
) {
    predicted.clear();
    predicted.extend(nodes.iter().map(|node| node.position + node.velocity));

    let Some(tree) = QuadTree::build(predicted) else {
        return;
    };

    let reach = config.collision_radius * 2.0;
    let strength = config.collision_strength;
    let positions = predicted.as_slice();
    tree.for_each_close_pair(reach, &mut |from, to| {
        let mut delta = positions[from] - positions[to];
        let distance_sq = delta.length_sq();
        if distance_sq >= reach * reach {
            return;
        }
        if distance_sq <= f32::EPSILON {
            delta = fallback_direction(from, to) * 1.0e-3;
        }
        let distance = delta.length();
        let push = delta * ((reach - distance) / distance * strength);

        // Equal radii, so both nodes take half the push.
        nodes[from].velocity += push * 0.5;
        nodes[to].velocity -= push * 0.5;
    });
}

/// Pulls every node toward the vertical middle of the viewport.
pub(super) fn apply_alignment(
    nodes: &mut [LayoutNode],
    center_y: f32,
    config: &LayoutConfig,
    alpha: f32,
) {
    let strength = config.align_strength * alpha;
    for node in nodes {
        node.velocity.y += (center_y - node.position.y) * strength;
    }
}

/// Horizontal slot for a depth: roots sit at `depth_anchor` of the width and
/// each level further down moves one `depth_spacing` to the left.
pub fn depth_target_x(depth: i32, viewport_width: f32, config: &LayoutConfig) -> f32 {
    viewport_width * config.depth_anchor - config.depth_spacing * depth.max(0) as f32
}

pub(super) fn apply_depth_placement(
    nodes: &mut [LayoutNode],
    viewport_width: f32,
    config: &LayoutConfig,
    alpha: f32,
) {
    let strength = config.depth_strength * alpha;
    for node in nodes {
        let target = depth_target_x(node.depth, viewport_width, config);
        node.velocity.x += (target - node.position.x) * strength;
    }
}

/// Shifts positions so the centroid moves onto `center`.
pub(super) fn apply_centering(nodes: &mut [LayoutNode], center: Vec2, config: &LayoutConfig) {
    if nodes.is_empty() {
        return;
    }

    let centroid = nodes.iter().fold(Vec2::ZERO, |sum, node| sum + node.position)
        / nodes.len() as f32;
    let shift = (centroid - center) * config.center_strength;
    for node in nodes {
        node.position -= shift;
    }
}
