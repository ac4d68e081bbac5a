use eframe::egui::Ui;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Graph Controls");
        ui.separator();
        ui.add_space(4.0);

        ui.label("Search node names")
            .on_hover_text("Fuzzy-highlight matching nodes without changing the layout.");
        ui.text_edit_singleline(&mut self.search)
            .on_hover_text("Type to highlight matching nodes, then click one to select it.");

        if let Some(matches) = self.cached_search_matches() {
            ui.small(format!("{} matching nodes", matches.len()));
        }

        ui.separator();

        ui.horizontal_wrapped(|ui| {
            if ui
                .button("Fullscreen")
                .on_hover_text("Hide the side panels and fill the window with the graph.")
                .clicked()
            {
                self.store.toggle_fullscreen();
            }

            if ui
                .button("Relayout")
                .on_hover_text("Discard the current positions and lay the graph out again.")
                .clicked()
            {
                self.request_relayout();
            }
        });

        ui.separator();
        ui.label("Scroll to zoom, drag the canvas to pan.");
        ui.label("Drag a node to pin it while the layout adjusts.");
        ui.label("Press F to toggle fullscreen, Escape to leave it.");

        if let Some(view) = &self.view {
            let transform = view.transform();
            ui.add_space(6.0);
            ui.small(format!(
                "zoom {:.2}  |  offset ({:.0}, {:.0})",
                transform.scale, transform.translate.x, transform.translate.y
            ));
        }
    }
}
