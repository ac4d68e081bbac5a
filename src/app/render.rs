use eframe::egui::epaint::CubicBezierShape;
use eframe::egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Shape, Stroke, StrokeKind, Vec2};

use crate::lineage::LayoutNode;
use crate::routing::{CubicCurve, RouteKind};

const DEPTH_PALETTE: [Color32; 6] = [
    Color32::from_rgb(70, 130, 180),
    Color32::from_rgb(87, 160, 122),
    Color32::from_rgb(176, 132, 70),
    Color32::from_rgb(150, 98, 170),
    Color32::from_rgb(181, 92, 92),
    Color32::from_rgb(88, 150, 160),
];

/// How a node should be emphasised this frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct NodeStyle {
    /// 0 when unselected, 1 when fully selected; in between while animating.
    pub selection: f32,
    pub hovered: bool,
    pub search_match: bool,
    /// A search is active and this node does not match it.
    pub dimmed: bool,
    pub scale: f32,
}

/// Paints one node box. Swap the implementation to change how nodes look
/// without touching layout or interaction.
pub trait NodeRenderer {
    fn paint(&self, painter: &Painter, screen_rect: Rect, node: &LayoutNode, style: NodeStyle);
}

pub struct DefaultNodeRenderer {
    pub corner_radius: f32,
}

impl NodeRenderer for DefaultNodeRenderer {
    fn paint(&self, painter: &Painter, screen_rect: Rect, node: &LayoutNode, style: NodeStyle) {
        let base = depth_color(node.depth);
        let mut fill = if style.hovered {
            blend_color(base, Color32::from_rgb(255, 164, 101), 0.45)
        } else if style.search_match {
            blend_color(base, Color32::from_rgb(103, 196, 255), 0.6)
        } else if style.dimmed {
            dim_color(base, 0.4)
        } else {
            base
        };
        fill = blend_color(fill, Color32::from_rgb(245, 206, 93), style.selection * 0.8);

        let radius = self.corner_radius * style.scale;
        painter.rect_filled(screen_rect, radius, fill);
        painter.rect_stroke(
            screen_rect,
            radius,
            Stroke::new(
                1.0 + style.selection * 1.5,
                Color32::from_rgba_unmultiplied(15, 15, 15, 190),
            ),
            StrokeKind::Inside,
        );

        let font_size = 14.0 * style.scale;
        if font_size >= 5.0 {
            painter.text(
                screen_rect.center(),
                Align2::CENTER_CENTER,
                node.name(),
                FontId::proportional(font_size),
                Color32::from_gray(240),
            );
        }
    }
}

pub(super) fn depth_color(depth: i32) -> Color32 {
    DEPTH_PALETTE[depth.max(0) as usize % DEPTH_PALETTE.len()]
}

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

/// Grid that moves with the view. `origin` is where world (0, 0) lands on
/// screen.
pub(super) fn draw_background(painter: &Painter, rect: Rect, origin: Pos2, scale: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = (56.0 * scale.clamp(0.6, 1.8)).max(20.0);
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

/// Paints an edge curve already mapped to screen space, with a small arrow
/// head where it enters the downstream box.
pub(super) fn draw_edge(painter: &Painter, curve: &CubicCurve, highlighted: bool, scale: f32) {
    let color = match (highlighted, curve.kind) {
        (true, _) => Color32::from_rgb(246, 206, 104),
        (false, RouteKind::Forward) => Color32::from_rgba_unmultiplied(150, 160, 172, 200),
        (false, RouteKind::Backward) => Color32::from_rgba_unmultiplied(214, 128, 98, 200),
    };
    let width = if highlighted { 2.6 } else { 1.4 } * scale.sqrt().clamp(0.6, 2.0);
    let stroke = Stroke::new(width, color);

    painter.add(CubicBezierShape::from_points_stroke(
        curve.points(),
        false,
        Color32::TRANSPARENT,
        stroke,
    ));

    let direction = curve.end - curve.sample(0.97);
    if direction.length_sq() > f32::EPSILON {
        let size = (6.0 * scale).clamp(3.0, 12.0);
        let back = direction.normalized() * size;
        let side = Vec2::new(-back.y, back.x) * 0.5;
        painter.add(Shape::convex_polygon(
            vec![curve.end, curve.end - back + side, curve.end - back - side],
            color,
            Stroke::NONE,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_colors_cycle() {
        assert_eq!(depth_color(0), depth_color(DEPTH_PALETTE.len() as i32));
        assert_eq!(depth_color(-1), depth_color(0));
    }

    #[test]
    fn blend_extremes_return_inputs() {
        let base = Color32::from_rgb(10, 20, 30);
        let overlay = Color32::from_rgb(200, 100, 50);
        assert_eq!(blend_color(base, overlay, 0.0), base);
        assert_eq!(blend_color(base, overlay, 1.0), overlay);
    }
}
