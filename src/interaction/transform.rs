use eframe::egui::{Pos2, Rect, Vec2};

/// Maps world coordinates onto the canvas: `screen = translate + world * scale`.
///
/// Screen coordinates are relative to the canvas' top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomTransform {
    pub translate: Vec2,
    pub scale: f32,
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ZoomTransform {
    pub const IDENTITY: Self = Self {
        translate: Vec2::ZERO,
        scale: 1.0,
    };

    pub fn new(translate: Vec2, scale: f32) -> Self {
        Self { translate, scale }
    }

    pub fn apply(&self, world: Pos2) -> Pos2 {
        (self.translate + world.to_vec2() * self.scale).to_pos2()
    }

    pub fn invert(&self, screen: Pos2) -> Pos2 {
        ((screen.to_vec2() - self.translate) / self.scale).to_pos2()
    }

    pub fn apply_rect(&self, world: Rect) -> Rect {
        Rect::from_min_max(self.apply(world.min), self.apply(world.max))
    }

    /// Multiplies the scale by `factor`, clamped to `[min_scale, max_scale]`,
    /// keeping the world point under `anchor` fixed on screen.
    pub fn zoom_about(&mut self, anchor: Pos2, factor: f32, min_scale: f32, max_scale: f32) {
        let world_before = self.invert(anchor);
        self.scale = (self.scale * factor).clamp(min_scale, max_scale);
        self.translate = anchor.to_vec2() - world_before.to_vec2() * self.scale;
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.translate += delta;
    }

    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            translate: self.translate + (other.translate - self.translate) * t,
            scale: self.scale + (other.scale - self.scale) * t,
        }
    }
}
