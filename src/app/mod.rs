use std::cell::Cell;
use std::collections::HashSet;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::thread;

use eframe::egui::{self, Context, ViewportCommand};
use tracing::{info, warn};

use crate::config::LayoutConfig;
use crate::lineage::{Node, demo_nodes, load_nodes};
use crate::selection::SelectionStore;
use crate::view::GraphView;

mod canvas;
mod render;
mod search;
mod ui;

pub use render::{DefaultNodeRenderer, NodeRenderer, NodeStyle};

/// Where the node list comes from.
#[derive(Clone, Debug)]
pub enum NodeSource {
    File(PathBuf),
    Demo,
}

impl NodeSource {
    pub fn label(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Demo => "built-in demo".to_owned(),
        }
    }

    /// Reads the node list. Layout errors surface when the view mounts.
    fn load(&self) -> anyhow::Result<Vec<Node>> {
        match self {
            Self::File(path) => load_nodes(path),
            Self::Demo => Ok(demo_nodes()),
        }
    }
}

pub struct LineageApp {
    source: NodeSource,
    config: LayoutConfig,
    store: SelectionStore,
    state: AppState,
    pending_fullscreen: Rc<Cell<Option<bool>>>,
}

enum AppState {
    Loading { rx: Receiver<Result<Vec<Node>, String>> },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    nodes: Vec<Node>,
    source_label: String,
    config: LayoutConfig,
    store: SelectionStore,
    renderer: Box<dyn NodeRenderer>,
    view: Option<GraphView>,
    layout_error: Option<String>,
    layout_revision: u64,
    search: String,
    search_match_cache: Option<SearchMatchCache>,
    dragging: Option<usize>,
}

struct SearchMatchCache {
    query: String,
    layout_revision: u64,
    matches: Arc<HashSet<usize>>,
}

impl LineageApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        source: NodeSource,
        config: LayoutConfig,
        fullscreen: bool,
    ) -> Self {
        let store = SelectionStore::new(fullscreen);
        let pending_fullscreen = Rc::new(Cell::new(None));
        let pending = Rc::clone(&pending_fullscreen);
        // Shares the store's lifetime, so it is never unsubscribed.
        store.subscribe_fullscreen(move |fullscreen| pending.set(Some(fullscreen)));

        Self {
            state: Self::start_load(source.clone()),
            source,
            config,
            store,
            pending_fullscreen,
        }
    }

    fn start_load(source: NodeSource) -> AppState {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = source.load().map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        AppState::Loading { rx }
    }
}

impl eframe::App for LineageApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        if let Some(fullscreen) = self.pending_fullscreen.take() {
            ctx.send_viewport_cmd(ViewportCommand::Fullscreen(fullscreen));
        }

        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(match result {
                        Ok(nodes) => {
                            info!(
                                nodes = nodes.len(),
                                source = %self.source.label(),
                                "nodes loaded"
                            );
                            AppState::Ready(Box::new(ViewModel::new(
                                nodes,
                                self.source.label(),
                                self.config.clone(),
                                self.store.clone(),
                            )))
                        }
                        Err(error) => {
                            warn!(%error, "failed to load nodes");
                            AppState::Error(error)
                        }
                    });
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading lineage graph...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
                ctx.request_repaint();
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load lineage graph");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.source.clone()));
                    }
                });
            }
            AppState::Ready(model) => model.show(ctx),
        }

        if let Some(next_state) = transition {
            self.state = next_state;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn loading_leaves_layout_checks_to_the_view() {
        let path = std::env::temp_dir().join(format!(
            "lineage-graph-unresolved-{}.json",
            std::process::id()
        ));
        fs::write(&path, r#"[{ "name": "a", "dependencies": ["missing"] }]"#)
            .expect("write fixture");

        let nodes = NodeSource::File(path.clone()).load();
        let _ = fs::remove_file(&path);

        let nodes = nodes.expect("parse succeeds without building the layout");
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].dependencies, vec!["missing".to_owned()]);
    }

    #[test]
    fn demo_source_loads() {
        let nodes = NodeSource::Demo.load().expect("demo nodes");
        assert!(!nodes.is_empty());
    }
}
