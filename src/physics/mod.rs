//! Force layout engine.
//!
//! Five forces act on every tick: edge springs, clearance collisions, a weak
//! pull toward the vertical middle, a strong pull toward each node's depth
//! slot, and a shift that keeps the centroid on the viewport center. The
//! simulation cools by decaying `alpha` toward `alpha_target`; it settles
//! once `alpha` drops below `alpha_min`.

mod forces;
mod quadtree;

use std::f32::consts::PI;

use eframe::egui::{Vec2, vec2};
use tracing::debug;

use crate::config::LayoutConfig;
use crate::lineage::LayoutGraph;

pub use forces::depth_target_x;

const INITIAL_RADIUS: f32 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimulationState {
    Running,
    Settled,
    /// Torn down. Nothing restarts a stopped simulation.
    Stopped,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing ran because the simulation is settled or stopped.
    Idle,
    Moved,
    /// This tick settled the simulation. `first` is set only for the first
    /// settle in the simulation's lifetime.
    Settled { first: bool },
}

pub struct Simulation {
    config: LayoutConfig,
    viewport: Vec2,
    alpha: f32,
    alpha_target: f32,
    state: SimulationState,
    ticks_since_restart: u32,
    settle_count: u32,
    link_biases: Vec<f32>,
    predicted: Vec<Vec2>,
}

impl Simulation {
    /// Seeds node positions around the viewport center and starts hot.
    pub fn new(graph: &mut LayoutGraph, viewport: Vec2, config: LayoutConfig) -> Self {
        seed_positions(graph, viewport * 0.5);
        let link_biases = forces::link_biases(graph.len(), &graph.edges);

        Self {
            config,
            viewport,
            alpha: 1.0,
            alpha_target: 0.0,
            state: SimulationState::Running,
            ticks_since_restart: 0,
            settle_count: 0,
            link_biases,
            predicted: Vec::with_capacity(graph.len()),
        }
    }

    pub fn tick(&mut self, graph: &mut LayoutGraph) -> TickOutcome {
        if self.state != SimulationState::Running {
            return TickOutcome::Idle;
        }

        self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
        let alpha = self.alpha;
        let config = &self.config;
        let nodes = &mut graph.nodes;

        forces::apply_links(nodes, &graph.edges, &self.link_biases, config, alpha);
        forces::apply_collisions(nodes, &mut self.predicted, config);
        forces::apply_alignment(nodes, self.viewport.y * 0.5, config, alpha);
        forces::apply_depth_placement(nodes, self.viewport.x, config, alpha);
        forces::apply_centering(nodes, self.viewport * 0.5, config);

        let retained = 1.0 - config.velocity_decay;
        for node in nodes.iter_mut() {
            if let Some(pin) = node.pin {
                node.position = pin;
                node.velocity = Vec2::ZERO;
            } else {
                node.velocity *= retained;
                node.position += node.velocity;
            }
        }

        self.ticks_since_restart += 1;
        let cooling = self.alpha_target < config.alpha_min;
        let budget_spent = cooling && self.ticks_since_restart >= config.max_ticks;
        if self.alpha < config.alpha_min || budget_spent {
            self.state = SimulationState::Settled;
            self.settle_count += 1;
            debug!(
                ticks = self.ticks_since_restart,
                alpha = self.alpha,
                budget_spent,
                settle_count = self.settle_count,
                "simulation settled"
            );
            return TickOutcome::Settled {
                first: self.settle_count == 1,
            };
        }

        TickOutcome::Moved
    }

    /// Ticks until the simulation settles or is no longer running. Returns
    /// the number of ticks taken.
    pub fn run_until_settled(&mut self, graph: &mut LayoutGraph) -> u32 {
        let mut ticks = 0;
        loop {
            match self.tick(graph) {
                TickOutcome::Moved => ticks += 1,
                TickOutcome::Settled { .. } => return ticks + 1,
                TickOutcome::Idle => return ticks,
            }
        }
    }

    /// Wakes a settled simulation. A stopped one stays stopped.
    pub fn restart(&mut self) {
        if self.state == SimulationState::Stopped {
            return;
        }
        self.state = SimulationState::Running;
        self.ticks_since_restart = 0;
    }

    pub fn stop(&mut self) {
        self.state = SimulationState::Stopped;
    }

    pub fn set_alpha_target(&mut self, alpha_target: f32) {
        self.alpha_target = alpha_target;
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn alpha_target(&self) -> f32 {
        self.alpha_target
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SimulationState::Running
    }

    pub fn settle_count(&self) -> u32 {
        self.settle_count
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }
}

/// Sunflower spiral around `center`, in input order.
fn seed_positions(graph: &mut LayoutGraph, center: Vec2) {
    let golden_angle = PI * (3.0 - 5.0_f32.sqrt());
    for (index, node) in graph.nodes.iter_mut().enumerate() {
        let radius = INITIAL_RADIUS * (0.5 + index as f32).sqrt();
        let angle = index as f32 * golden_angle;
        node.position = center + vec2(angle.cos(), angle.sin()) * radius;
        node.velocity = Vec2::ZERO;
        node.pin = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lineage::Node;

    const VIEWPORT: Vec2 = vec2(1200.0, 800.0);

    fn chain_graph() -> LayoutGraph {
        LayoutGraph::build(&[
            Node::new("root", ["dep1", "dep2"]),
            Node::new("dep1", ["dep3"]),
            Node::new("dep2", ["dep3"]),
            Node::new("dep3", ["dep4"]),
            Node::new("dep4", Vec::<String>::new()),
        ])
        .expect("valid graph")
    }

    fn x_of(graph: &LayoutGraph, name: &str) -> f32 {
        graph.get(name).map(|node| node.position.x).unwrap_or(f32::NAN)
    }

    #[test]
    fn settles_within_the_cooling_schedule() {
        let mut graph = chain_graph();
        let mut simulation = Simulation::new(&mut graph, VIEWPORT, LayoutConfig::default());

        let ticks = simulation.run_until_settled(&mut graph);

        assert!(ticks <= 305, "took {ticks} ticks");
        assert_eq!(simulation.state(), SimulationState::Settled);
        assert_eq!(simulation.settle_count(), 1);
        assert!(graph.nodes.iter().all(|node| node.position.x.is_finite()));
    }

    #[test]
    fn deeper_nodes_end_up_further_left() {
        let mut graph = chain_graph();
        let mut simulation = Simulation::new(&mut graph, VIEWPORT, LayoutConfig::default());
        simulation.run_until_settled(&mut graph);

        assert!(x_of(&graph, "root") > x_of(&graph, "dep1") + 150.0);
        assert!(x_of(&graph, "dep1") > x_of(&graph, "dep3") + 150.0);
        assert!(x_of(&graph, "dep3") > x_of(&graph, "dep4") + 150.0);
        assert!((x_of(&graph, "dep1") - x_of(&graph, "dep2")).abs() < 100.0);
    }

    #[test]
    fn same_depth_siblings_are_separated() {
        let mut graph = chain_graph();
        let mut simulation = Simulation::new(&mut graph, VIEWPORT, LayoutConfig::default());
        simulation.run_until_settled(&mut graph);

        let dep1 = graph.get("dep1").map(|node| node.position).unwrap_or_default();
        let dep2 = graph.get("dep2").map(|node| node.position).unwrap_or_default();
        assert!((dep1 - dep2).length() > 100.0);
    }

    #[test]
    fn centroid_stays_on_viewport_center() {
        let mut graph = chain_graph();
        let mut simulation = Simulation::new(&mut graph, VIEWPORT, LayoutConfig::default());
        simulation.run_until_settled(&mut graph);

        let centroid = graph
            .nodes
            .iter()
            .fold(Vec2::ZERO, |sum, node| sum + node.position)
            / graph.len() as f32;
        assert!((centroid - VIEWPORT * 0.5).length() < 5.0);
    }

    #[test]
    fn pinned_node_holds_its_pin() {
        let mut graph = chain_graph();
        let mut simulation = Simulation::new(&mut graph, VIEWPORT, LayoutConfig::default());
        graph.nodes[2].pin = Some(vec2(42.0, 24.0));

        for _ in 0..20 {
            simulation.tick(&mut graph);
        }

        assert_eq!(graph.nodes[2].position, vec2(42.0, 24.0));
        assert_eq!(graph.nodes[2].velocity, Vec2::ZERO);
    }

    #[test]
    fn raised_alpha_target_keeps_running_past_the_budget() {
        let mut graph = chain_graph();
        let config = LayoutConfig {
            max_ticks: 50,
            ..LayoutConfig::default()
        };
        let mut simulation = Simulation::new(&mut graph, VIEWPORT, config);
        simulation.set_alpha_target(0.1);

        for _ in 0..200 {
            assert_ne!(simulation.tick(&mut graph), TickOutcome::Idle);
        }
        assert!(simulation.is_running());

        simulation.set_alpha_target(0.0);
        simulation.run_until_settled(&mut graph);
        assert_eq!(simulation.state(), SimulationState::Settled);
    }

    #[test]
    fn tick_budget_settles_a_slow_schedule() {
        let mut graph = chain_graph();
        let config = LayoutConfig {
            alpha_decay: 0.0001,
            max_ticks: 40,
            ..LayoutConfig::default()
        };
        let mut simulation = Simulation::new(&mut graph, VIEWPORT, config);

        assert_eq!(simulation.run_until_settled(&mut graph), 40);
    }

    #[test]
    fn restart_reports_later_settles_as_not_first() {
        let mut graph = chain_graph();
        let mut simulation = Simulation::new(&mut graph, VIEWPORT, LayoutConfig::default());
        simulation.run_until_settled(&mut graph);

        simulation.restart();
        let mut last = TickOutcome::Idle;
        while simulation.is_running() {
            last = simulation.tick(&mut graph);
        }

        assert_eq!(last, TickOutcome::Settled { first: false });
        assert_eq!(simulation.settle_count(), 2);
    }

    #[test]
    fn stopped_simulation_ignores_restart() {
        let mut graph = chain_graph();
        let mut simulation = Simulation::new(&mut graph, VIEWPORT, LayoutConfig::default());
        simulation.stop();
        simulation.restart();

        assert_eq!(simulation.tick(&mut graph), TickOutcome::Idle);
        assert_eq!(simulation.state(), SimulationState::Stopped);
    }
}
