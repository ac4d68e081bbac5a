use eframe::egui::{self, RichText, Ui};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Selection Details");
        ui.add_space(6.0);

        let Some(node) = self.store.node() else {
            ui.label("Click a node in the graph to inspect it.");
            return;
        };

        ui.label(RichText::new(node.name.as_str()).strong());
        let layout_node = self.view.as_ref().and_then(|view| view.graph().get(&node.name));
        if let Some(layout_node) = layout_node {
            ui.small(format!(
                "depth {}  |  {} dependents",
                layout_node.depth, layout_node.in_degree
            ));
        }
        ui.add_space(6.0);

        ui.separator();
        ui.label(RichText::new("Fields").strong());
        egui::Grid::new("selected_node_fields")
            .num_columns(2)
            .striped(true)
            .show(ui, |ui| {
                for (key, value) in node.display_fields() {
                    ui.label(key);
                    ui.label(value);
                    ui.end_row();
                }
            });

        ui.separator();
        ui.label(RichText::new("Dependencies").strong());
        if node.dependencies.is_empty() {
            ui.label("None, this node is a source.");
        }
        let mut pick = None;
        for dependency in &node.dependencies {
            if ui.link(dependency.as_str()).clicked() {
                pick = Some(dependency.clone());
            }
        }

        let dependents = self
            .nodes
            .iter()
            .filter(|other| other.dependencies.iter().any(|name| *name == node.name))
            .map(|other| other.name.clone())
            .collect::<Vec<_>>();
        ui.separator();
        ui.label(RichText::new("Dependents").strong());
        if dependents.is_empty() {
            ui.label("None, this node is a root.");
        }
        for dependent in dependents {
            if ui.link(dependent.as_str()).clicked() {
                pick = Some(dependent);
            }
        }

        ui.add_space(10.0);
        if ui.button("Clear selection").clicked() {
            self.store.set_node(None);
        }

        if let Some(name) = pick
            && let Some(view) = &self.view
        {
            view.select(&name);
        }
    }
}
