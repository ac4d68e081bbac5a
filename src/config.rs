use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Tunables for the layout, routing and interaction layers.
///
/// Every field has a default matching the stock lineage view, so a config
/// file only needs to name the values it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Width of a node box in world units.
    pub node_width: f32,
    /// Height of a node box in world units.
    pub node_height: f32,
    pub node_corner_radius: f32,

    /// Rest length of the spring between a node and each of its dependencies.
    pub link_distance: f32,
    pub link_strength: f32,
    /// Clearance radius per node; two nodes repel once closer than twice this.
    pub collision_radius: f32,
    pub collision_strength: f32,
    /// Pull toward the vertical middle of the viewport.
    pub align_strength: f32,
    /// Fraction of the viewport width where depth 0 is anchored.
    pub depth_anchor: f32,
    /// Horizontal distance between consecutive depths.
    pub depth_spacing: f32,
    pub depth_strength: f32,
    pub center_strength: f32,

    /// Energy below which the simulation counts as settled.
    pub alpha_min: f32,
    pub alpha_decay: f32,
    /// Energy the simulation is held at while a node is being dragged.
    pub drag_alpha_target: f32,
    pub velocity_decay: f32,
    /// Upper bound on ticks per simulation run.
    pub max_ticks: u32,

    /// Slack before an edge is considered to run right-to-left.
    pub backward_threshold: f32,
    /// Horizontal reach of the loop drawn for backward edges.
    pub loop_reach: f32,
    /// Vertical bow of the loop drawn for backward edges.
    pub loop_bow: f32,

    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Share of the viewport the fitted graph may occupy.
    pub fit_fill: f32,
    pub fit_duration_secs: f32,
    pub wheel_zoom_sensitivity: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let alpha_min = 0.001_f32;
        Self {
            node_width: 250.0,
            node_height: 50.0,
            node_corner_radius: 10.0,
            link_distance: 200.0,
            link_strength: 0.1,
            collision_radius: 100.0,
            collision_strength: 0.1,
            align_strength: 0.1,
            depth_anchor: 0.75,
            depth_spacing: 300.0,
            depth_strength: 1.0,
            center_strength: 1.0,
            alpha_min,
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            drag_alpha_target: 0.1,
            velocity_decay: 0.4,
            max_ticks: 1_000,
            backward_threshold: 20.0,
            loop_reach: 80.0,
            loop_bow: 120.0,
            min_zoom: 0.5,
            max_zoom: 5.0,
            fit_fill: 0.9,
            fit_duration_secs: 0.75,
            wheel_zoom_sensitivity: 0.002,
        }
    }
}

impl LayoutConfig {
    pub fn half_width(&self) -> f32 {
        self.node_width * 0.5
    }

    pub fn half_height(&self) -> f32 {
        self.node_height * 0.5
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("invalid layout config JSON")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read layout config {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("in {}", path.display()))
    }
}
