use eframe::egui::{self, Align, Context, Layout};

use crate::config::LayoutConfig;
use crate::lineage::Node;
use crate::physics::SimulationState;
use crate::selection::SelectionStore;

use super::super::{DefaultNodeRenderer, ViewModel};

impl ViewModel {
    pub(in crate::app) fn new(
        nodes: Vec<Node>,
        source_label: String,
        config: LayoutConfig,
        store: SelectionStore,
    ) -> Self {
        Self {
            renderer: Box::new(DefaultNodeRenderer {
                corner_radius: config.node_corner_radius,
            }),
            nodes,
            source_label,
            config,
            store,
            view: None,
            layout_error: None,
            layout_revision: 0,
            search: String::new(),
            search_match_cache: None,
            dragging: None,
        }
    }

    pub(in crate::app) fn show(&mut self, ctx: &Context) {
        let fullscreen = self.store.fullscreen();

        if !fullscreen {
            egui::TopBottomPanel::top("top_bar")
                .resizable(false)
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        ui.heading("lineage-graph");
                        ui.separator();
                        ui.label(format!("source: {}", self.source_label));
                        ui.label(format!("nodes: {}", self.nodes.len()));
                        if let Some(view) = &self.view {
                            ui.label(format!("edges: {}", view.graph().edges.len()));
                            ui.label(format!("depths: {}", view.graph().max_depth() + 1));
                        }
                        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                            ui.label(self.layout_status_text());
                        });
                    });
                });

            egui::SidePanel::left("controls")
                .resizable(true)
                .default_width(280.0)
                .show(ctx, |ui| self.draw_controls(ui));

            egui::SidePanel::right("details")
                .resizable(true)
                .default_width(320.0)
                .show(ctx, |ui| self.draw_details(ui));
        }

        egui::CentralPanel::default().show(ctx, |ui| self.draw_graph(ui));
    }

    /// Drops the mounted view so the next frame lays the same nodes out
    /// from scratch.
    pub(in crate::app) fn request_relayout(&mut self) {
        self.view = None;
        self.layout_error = None;
        self.dragging = None;
        self.search_match_cache = None;
        self.layout_revision += 1;
    }

    fn layout_status_text(&self) -> String {
        let Some(view) = &self.view else {
            return "layout: pending".to_owned();
        };
        let simulation = view.simulation();
        match simulation.state() {
            SimulationState::Running => {
                format!("layout: running (alpha {:.3})", simulation.alpha())
            }
            SimulationState::Settled => "layout: settled".to_owned(),
            SimulationState::Stopped => "layout: stopped".to_owned(),
        }
    }
}
