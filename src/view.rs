//! One mounted graph view.
//!
//! A `GraphView` owns everything a single lineage diagram needs for its
//! lifetime: the layout graph, the force simulation, the routed edge curves,
//! the pointer controller and its handle on the selection store. The host
//! calls [`GraphView::frame`] once per frame, forwards pointer events in
//! canvas coordinates and paints from the accessors.

use std::cell::Cell;
use std::rc::Rc;

use eframe::egui::{Pos2, Rect, Vec2};
use tracing::{debug, info};

use crate::config::LayoutConfig;
use crate::interaction::{InteractionController, ZoomTransform, node_box, select_by_name};
use crate::lineage::{self, LayoutGraph, Node};
use crate::physics::{Simulation, SimulationState, TickOutcome};
use crate::routing::{CubicCurve, EdgeRouter};
use crate::selection::{SelectionStore, Subscription};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameOutcome {
    /// Node positions changed this frame.
    pub moved: bool,
    /// This frame started the fit-to-view animation.
    pub fitted: bool,
    /// The host should schedule another frame.
    pub wants_repaint: bool,
}

pub struct GraphView {
    config: LayoutConfig,
    graph: LayoutGraph,
    simulation: Simulation,
    router: EdgeRouter,
    curves: Vec<CubicCurve>,
    controller: InteractionController,
    store: SelectionStore,
    subscriptions: Vec<Subscription>,
    store_dirty: Rc<Cell<bool>>,
}

impl GraphView {
    /// Builds the layout for `nodes` and starts its simulation. `viewport`
    /// is the canvas size and is read only here.
    pub fn new(
        nodes: &[Node],
        viewport: Vec2,
        config: LayoutConfig,
        store: SelectionStore,
    ) -> lineage::Result<Self> {
        let mut graph = LayoutGraph::build(nodes)?;
        let simulation = Simulation::new(&mut graph, viewport, config.clone());
        let router = EdgeRouter::new(&config);
        let mut curves = Vec::with_capacity(graph.edges.len());
        router.route_all(&graph, &mut curves);
        let controller = InteractionController::new(viewport, config.clone());

        let store_dirty = Rc::new(Cell::new(false));
        let node_flag = Rc::clone(&store_dirty);
        let fullscreen_flag = Rc::clone(&store_dirty);
        let subscriptions = vec![
            store.subscribe(move |_| node_flag.set(true)),
            store.subscribe_fullscreen(move |_| fullscreen_flag.set(true)),
        ];

        info!(
            nodes = graph.len(),
            edges = graph.edges.len(),
            width = viewport.x,
            height = viewport.y,
            "graph view mounted"
        );

        Ok(Self {
            config,
            graph,
            simulation,
            router,
            curves,
            controller,
            store,
            subscriptions,
            store_dirty,
        })
    }

    /// Advances the simulation by one tick, reroutes the edges when anything
    /// moved and fires fit-to-view on the first convergence.
    pub fn frame(&mut self, now: f64) -> FrameOutcome {
        let mut outcome = FrameOutcome::default();
        if self.is_stopped() {
            return outcome;
        }

        let tick = self.simulation.tick(&mut self.graph);
        if tick != TickOutcome::Idle {
            outcome.moved = true;
            self.router.route_all(&self.graph, &mut self.curves);
        }
        if tick == (TickOutcome::Settled { first: true }) {
            outcome.fitted = self.controller.fit_once(self.bounds(), now);
        }

        let animating = self.controller.advance(now);
        outcome.wants_repaint = self.simulation.is_running()
            || animating
            || outcome.fitted
            || self.store_dirty.replace(false);
        outcome
    }

    /// Union of every node box and every edge curve, in world space.
    pub fn bounds(&self) -> Rect {
        let nodes = self
            .graph
            .nodes
            .iter()
            .map(|node| node_box(node.position, &self.config));
        let edges = self.curves.iter().map(CubicCurve::bounds);
        nodes.chain(edges).fold(Rect::NOTHING, |bounds, rect| bounds.union(rect))
    }

    pub fn hit_test(&self, screen: Pos2) -> Option<usize> {
        self.controller.hit_test(&self.graph, screen)
    }

    pub fn drag_start(&mut self, node: usize, screen: Pos2) -> bool {
        if self.is_stopped() {
            return false;
        }
        self.controller
            .drag_start(&mut self.graph, &mut self.simulation, node, screen)
    }

    pub fn drag_move(&mut self, node: usize, screen: Pos2) {
        self.controller.drag_move(&mut self.graph, node, screen);
    }

    pub fn drag_end(&mut self, node: usize) {
        self.controller
            .drag_end(&mut self.graph, &mut self.simulation, node);
    }

    pub fn click(&self, screen: Pos2) -> Option<usize> {
        self.controller.click(&self.graph, &self.store, screen)
    }

    pub fn select(&self, name: &str) {
        select_by_name(&self.graph, &self.store, name);
    }

    pub fn zoom(&mut self, anchor: Pos2, scroll: f32) {
        self.controller.zoom(anchor, scroll);
    }

    pub fn pan(&mut self, delta: Vec2) {
        self.controller.pan(delta);
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.store.is_selected(name)
    }

    pub fn graph(&self) -> &LayoutGraph {
        &self.graph
    }

    pub fn curves(&self) -> &[CubicCurve] {
        &self.curves
    }

    pub fn transform(&self) -> ZoomTransform {
        self.controller.transform()
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn store(&self) -> &SelectionStore {
        &self.store
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn is_stopped(&self) -> bool {
        self.simulation.state() == SimulationState::Stopped
    }

    /// Halts the simulation, drops the view's store subscriptions and clears
    /// the picked node, which belongs to this view. The fullscreen flag is
    /// left alone. Calling it again does nothing.
    pub fn stop(&mut self) {
        if self.is_stopped() {
            return;
        }
        self.simulation.stop();
        let released = self
            .subscriptions
            .drain(..)
            .map(Subscription::unsubscribe)
            .filter(|removed| *removed)
            .count();
        if self.store.selected_name().is_some() {
            self.store.set_node(None);
        }
        debug!(released, "graph view stopped");
    }
}

impl Drop for GraphView {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;

    const VIEWPORT: Vec2 = vec2(1200.0, 800.0);

    fn chain() -> Vec<Node> {
        vec![
            Node::new("root", ["dep1", "dep2"]),
            Node::new("dep1", ["dep3"]),
            Node::new("dep2", ["dep3"]),
            Node::new("dep3", ["dep4"]),
            Node::new("dep4", Vec::<String>::new()),
        ]
    }

    fn mount(nodes: &[Node], store: SelectionStore) -> GraphView {
        GraphView::new(nodes, VIEWPORT, LayoutConfig::default(), store).expect("valid graph")
    }

    fn settle(view: &mut GraphView, now: &mut f64) -> u32 {
        let mut fits = 0;
        for _ in 0..2_000 {
            *now += 1.0 / 60.0;
            if view.frame(*now).fitted {
                fits += 1;
            }
            if !view.simulation().is_running() && !view.controller().is_animating() {
                break;
            }
        }
        fits
    }

    #[test]
    fn curves_follow_every_edge() {
        let view = mount(&chain(), SelectionStore::default());
        assert_eq!(view.curves().len(), 5);
    }

    #[test]
    fn first_convergence_fits_the_whole_graph() {
        let mut view = mount(&chain(), SelectionStore::default());
        let mut now = 0.0;

        assert_eq!(settle(&mut view, &mut now), 1);

        let screen_bounds = view.transform().apply_rect(view.bounds());
        let viewport = Rect::from_min_size(Pos2::ZERO, VIEWPORT);
        assert!(viewport.expand(1.0).contains_rect(screen_bounds));
    }

    #[test]
    fn bounds_include_node_boxes() {
        let view = mount(&[Node::new("only", Vec::<String>::new())], SelectionStore::default());
        let bounds = view.bounds();
        assert!((bounds.width() - 250.0).abs() < 1.0e-3);
        assert!((bounds.height() - 50.0).abs() < 1.0e-3);
    }

    #[test]
    fn stop_releases_store_subscriptions() {
        let store = SelectionStore::default();
        let mut view = mount(&chain(), store.clone());
        assert_eq!(store.node_subscriber_count(), 1);
        assert_eq!(store.fullscreen_subscriber_count(), 1);

        view.stop();

        assert_eq!(store.node_subscriber_count(), 0);
        assert_eq!(store.fullscreen_subscriber_count(), 0);
        assert_eq!(view.frame(1.0), FrameOutcome::default());
        assert!(!view.drag_start(0, Pos2::ZERO));
    }

    #[test]
    fn stop_clears_the_selection_but_keeps_fullscreen() {
        let store = SelectionStore::new(true);
        let mut view = mount(&chain(), store.clone());
        view.select("dep2");
        assert!(store.is_selected("dep2"));

        view.stop();

        assert!(store.node().is_none());
        assert!(store.fullscreen());
    }

    #[test]
    fn remounting_on_the_same_store_starts_unselected() {
        let store = SelectionStore::default();
        let view = mount(&chain(), store.clone());
        view.select("dep1");
        drop(view);

        let fresh = mount(&chain(), store.clone());
        assert!(!fresh.is_selected("dep1"));
        assert!(store.selected_name().is_none());
    }

    #[test]
    fn dropping_the_view_unsubscribes() {
        let store = SelectionStore::default();
        let view = mount(&chain(), store.clone());
        drop(view);
        assert_eq!(store.node_subscriber_count(), 0);
    }

    #[test]
    fn store_changes_request_a_repaint() {
        let store = SelectionStore::default();
        let mut view = mount(&chain(), store.clone());
        let mut now = 0.0;
        settle(&mut view, &mut now);
        assert!(!view.frame(now + 1.0).wants_repaint);

        store.toggle_fullscreen();
        assert!(view.frame(now + 2.0).wants_repaint);
        assert!(!view.frame(now + 3.0).wants_repaint);
    }
}
