//! Pointer handling for a graph view: zoom and pan, drag-to-pin, clicking
//! nodes, and the one-shot fit-to-view once the layout first settles.

mod fit;
mod transform;

use eframe::egui::{Pos2, Rect, Vec2, vec2};
use tracing::{debug, info};

use crate::config::LayoutConfig;
use crate::lineage::LayoutGraph;
use crate::physics::Simulation;
use crate::selection::SelectionStore;

pub use fit::{FitAnimation, ease_cubic_in_out, fit_transform};
pub use transform::ZoomTransform;

/// World-space box of a node centered on `center`.
pub fn node_box(center: Vec2, config: &LayoutConfig) -> Rect {
    Rect::from_center_size(center.to_pos2(), vec2(config.node_width, config.node_height))
}

#[derive(Clone, Copy, Debug)]
struct ActiveDrag {
    node: usize,
    /// Node position minus the pointer's world position at grab time.
    grab_offset: Vec2,
}

pub struct InteractionController {
    config: LayoutConfig,
    viewport: Vec2,
    transform: ZoomTransform,
    animation: Option<FitAnimation>,
    fitted: bool,
    drags: Vec<ActiveDrag>,
}

impl InteractionController {
    pub fn new(viewport: Vec2, config: LayoutConfig) -> Self {
        Self {
            config,
            viewport,
            transform: ZoomTransform::IDENTITY,
            animation: None,
            fitted: false,
            drags: Vec::new(),
        }
    }

    pub fn transform(&self) -> ZoomTransform {
        self.transform
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn has_fitted(&self) -> bool {
        self.fitted
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn is_dragging(&self) -> bool {
        !self.drags.is_empty()
    }

    pub fn is_dragging_node(&self, node: usize) -> bool {
        self.drags.iter().any(|drag| drag.node == node)
    }

    /// Wheel zoom around `anchor`. Positive `scroll` zooms in.
    pub fn zoom(&mut self, anchor: Pos2, scroll: f32) {
        if scroll.abs() <= f32::EPSILON {
            return;
        }
        self.animation = None;
        let factor = 2.0_f32.powf(scroll * self.config.wheel_zoom_sensitivity);
        self.transform
            .zoom_about(anchor, factor, self.config.min_zoom, self.config.max_zoom);
    }

    pub fn pan(&mut self, delta: Vec2) {
        if delta == Vec2::ZERO {
            return;
        }
        self.animation = None;
        self.transform.pan_by(delta);
    }

    /// Topmost node whose box contains `screen`. Later nodes paint over
    /// earlier ones, so the search runs back to front.
    pub fn hit_test(&self, graph: &LayoutGraph, screen: Pos2) -> Option<usize> {
        let world = self.transform.invert(screen);
        graph
            .nodes
            .iter()
            .enumerate()
            .rev()
            .find(|(_, node)| node_box(node.position, &self.config).contains(world))
            .map(|(index, _)| index)
    }

    /// Pins `node` where it is and heats the simulation if nothing else is
    /// being dragged. Returns `false` when the node is already held.
    pub fn drag_start(
        &mut self,
        graph: &mut LayoutGraph,
        simulation: &mut Simulation,
        node: usize,
        screen: Pos2,
    ) -> bool {
        if self.is_dragging_node(node) {
            return false;
        }
        let Some(layout_node) = graph.nodes.get_mut(node) else {
            return false;
        };

        let world = self.transform.invert(screen).to_vec2();
        let grab_offset = layout_node.position - world;
        layout_node.pin = Some(layout_node.position);

        if self.drags.is_empty() {
            simulation.set_alpha_target(self.config.drag_alpha_target);
            simulation.restart();
        }
        self.drags.push(ActiveDrag { node, grab_offset });
        debug!(node = layout_node.name(), "drag started");
        true
    }

    pub fn drag_move(&mut self, graph: &mut LayoutGraph, node: usize, screen: Pos2) {
        let Some(drag) = self.drags.iter().find(|drag| drag.node == node) else {
            return;
        };
        let world = self.transform.invert(screen).to_vec2();
        if let Some(layout_node) = graph.nodes.get_mut(node) {
            layout_node.pin = Some(world + drag.grab_offset);
        }
    }

    /// Releases the pin. The simulation cools again once the last drag ends.
    pub fn drag_end(&mut self, graph: &mut LayoutGraph, simulation: &mut Simulation, node: usize) {
        let before = self.drags.len();
        self.drags.retain(|drag| drag.node != node);
        if self.drags.len() == before {
            return;
        }

        if let Some(layout_node) = graph.nodes.get_mut(node) {
            layout_node.pin = None;
        }
        if self.drags.is_empty() {
            simulation.set_alpha_target(0.0);
        }
    }

    /// Publishes the node under `screen`, if any, and returns its index. A
    /// click on empty canvas leaves the selection as it was.
    pub fn click(
        &self,
        graph: &LayoutGraph,
        store: &SelectionStore,
        screen: Pos2,
    ) -> Option<usize> {
        let index = self.hit_test(graph, screen)?;
        let name = graph.nodes[index].name().to_owned();
        select_by_name(graph, store, &name);
        Some(index)
    }

    /// Starts the fit-to-view animation the first time it is called and
    /// never again. Returns whether this call fired it.
    pub fn fit_once(&mut self, bounds: Rect, now: f64) -> bool {
        if self.fitted {
            return false;
        }
        self.fitted = true;

        let Some(target) = fit_transform(bounds, self.viewport, self.config.fit_fill) else {
            debug!(?bounds, "nothing to fit");
            return false;
        };
        info!(scale = target.scale, "fitting graph to view");
        self.animation = Some(FitAnimation::new(
            self.transform,
            target,
            now,
            self.config.fit_duration_secs,
        ));
        true
    }

    /// Moves a running fit animation forward. Returns whether it is still
    /// running afterwards.
    pub fn advance(&mut self, now: f64) -> bool {
        let Some(animation) = self.animation else {
            return false;
        };
        let (transform, done) = animation.sample(now);
        self.transform = transform;
        if done {
            self.animation = None;
        }
        !done
    }
}

/// Resolves `name` in `graph` and publishes it, or publishes no selection
/// when the name is unknown.
pub fn select_by_name(graph: &LayoutGraph, store: &SelectionStore, name: &str) {
    store.set_node(graph.get(name).map(|node| node.node.clone()));
}
