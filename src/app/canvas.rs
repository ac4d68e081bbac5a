use eframe::egui::{
    self, Align2, Color32, FontId, Key, PointerButton, Pos2, Rect, Sense, Ui, Vec2, vec2,
};
use tracing::warn;

use crate::interaction::node_box;
use crate::routing::CubicCurve;
use crate::view::GraphView;

use super::ViewModel;
use super::render::{NodeStyle, draw_background, draw_edge};

/// Canvas-local position of a screen point.
fn local(rect: Rect, screen: Pos2) -> Pos2 {
    (screen - rect.min).to_pos2()
}

impl ViewModel {
    fn mount_view(&mut self, viewport: Vec2) {
        match GraphView::new(&self.nodes, viewport, self.config.clone(), self.store.clone()) {
            Ok(view) => self.view = Some(view),
            Err(error) => {
                warn!(%error, "layout failed");
                self.layout_error = Some(error.to_string());
            }
        }
    }

    fn handle_fullscreen_keys(&self, ui: &Ui) {
        let typing = ui.memory(|memory| memory.focused().is_some());
        let (toggle, escape) =
            ui.input(|input| (input.key_pressed(Key::F), input.key_pressed(Key::Escape)));
        if toggle && !typing {
            self.store.toggle_fullscreen();
        } else if escape && self.store.fullscreen() {
            self.store.set_fullscreen(false);
        }
    }

    fn handle_graph_zoom(ui: &Ui, rect: Rect, response: &egui::Response, view: &mut GraphView) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        view.zoom(local(rect, pointer), scroll);
    }

    /// Primary drag on a node moves it, anywhere else pans. Secondary and
    /// middle drags always pan.
    fn handle_graph_pointer(
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
        view: &mut GraphView,
        dragging: &mut Option<usize>,
    ) {
        if response.drag_started_by(PointerButton::Primary) {
            let origin = ui
                .input(|input| input.pointer.press_origin())
                .or(response.interact_pointer_pos());
            if let Some(origin) = origin
                && let Some(index) = view.hit_test(local(rect, origin))
                && view.drag_start(index, local(rect, origin))
            {
                *dragging = Some(index);
            }
        }

        if response.dragged() {
            match *dragging {
                Some(index) => {
                    if let Some(pointer) = response.interact_pointer_pos() {
                        view.drag_move(index, local(rect, pointer));
                    }
                }
                None => view.pan(response.drag_delta()),
            }
        }

        if response.drag_stopped()
            && let Some(index) = dragging.take()
        {
            view.drag_end(index);
        }

        if response.clicked_by(PointerButton::Primary)
            && let Some(pointer) = response.interact_pointer_pos()
        {
            view.click(local(rect, pointer));
        }
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        if self.view.is_none() && self.layout_error.is_none() {
            self.mount_view(rect.size());
        }
        self.handle_fullscreen_keys(ui);
        let search_matches = self.cached_search_matches();

        let Some(view) = self.view.as_mut() else {
            draw_background(&painter, rect, rect.center(), 1.0);
            if let Some(error) = &self.layout_error {
                painter.text(
                    rect.center(),
                    Align2::CENTER_CENTER,
                    format!("Layout failed: {error}"),
                    FontId::proportional(15.0),
                    Color32::from_rgb(240, 140, 120),
                );
            }
            return;
        };

        Self::handle_graph_zoom(ui, rect, &response, view);
        Self::handle_graph_pointer(ui, rect, &response, view, &mut self.dragging);

        let now = ui.input(|input| input.time);
        let outcome = view.frame(now);
        if outcome.wants_repaint || self.dragging.is_some() {
            ui.ctx().request_repaint();
        }

        let transform = view.transform();
        let to_screen = |world: Pos2| rect.min + transform.apply(world).to_vec2();
        draw_background(&painter, rect, to_screen(Pos2::ZERO), transform.scale);

        let graph = view.graph();
        let selected_index = view
            .store()
            .selected_name()
            .and_then(|name| graph.index_of(&name));

        for (edge, curve) in graph.edges.iter().zip(view.curves()) {
            let screen_curve = CubicCurve {
                start: to_screen(curve.start),
                control1: to_screen(curve.control1),
                control2: to_screen(curve.control2),
                end: to_screen(curve.end),
                kind: curve.kind,
            };
            if !rect.intersects(screen_curve.bounds().expand(4.0)) {
                continue;
            }
            let highlighted =
                selected_index.is_some_and(|index| edge.source == index || edge.target == index);
            draw_edge(&painter, &screen_curve, highlighted, transform.scale);
        }

        let hovered = response
            .hover_pos()
            .and_then(|pointer| view.hit_test(local(rect, pointer)));
        if hovered.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        let search_active = search_matches
            .as_ref()
            .is_some_and(|matches| !matches.is_empty());
        let mut selection_animating = false;

        for (index, node) in graph.nodes.iter().enumerate() {
            let world = node_box(node.position, view.config());
            let screen_rect = Rect::from_min_max(to_screen(world.min), to_screen(world.max));
            if !rect.intersects(screen_rect) {
                continue;
            }

            let selection = ui.ctx().animate_bool(
                ui.make_persistent_id(("node-selection", node.name())),
                view.is_selected(node.name()),
            );
            if selection > 0.0 && selection < 1.0 {
                selection_animating = true;
            }

            let search_match = search_matches
                .as_ref()
                .is_some_and(|matches| matches.contains(&index));
            let style = NodeStyle {
                selection,
                hovered: hovered == Some(index),
                search_match,
                dimmed: search_active && !search_match,
                scale: transform.scale,
            };
            self.renderer.paint(&painter, screen_rect, node, style);
        }

        if selection_animating {
            ui.ctx().request_repaint();
        }

        if let Some(node) = hovered.and_then(|index| graph.nodes.get(index)) {
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                format!(
                    "{}  |  depth {}  |  deps {}",
                    node.name(),
                    node.depth,
                    node.node.dependencies.len()
                ),
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        if self.store.fullscreen() {
            let button_rect =
                Rect::from_min_size(rect.right_top() + vec2(-130.0, 10.0), vec2(120.0, 24.0));
            if ui.put(button_rect, egui::Button::new("Exit fullscreen")).clicked() {
                self.store.set_fullscreen(false);
            }
        }
    }
}
