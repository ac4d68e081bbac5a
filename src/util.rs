use std::collections::hash_map::DefaultHasher;
use std::f32::consts::TAU;
use std::hash::{Hash, Hasher};

use eframe::egui::{Vec2, vec2};

/// Two values in `[-1, 1]` derived from `id`, stable across runs.
pub fn stable_pair(id: &str) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}

/// Unit direction used to separate two coincident points.
pub fn fallback_direction(from: usize, to: usize) -> Vec2 {
    let angle = ((from as f32) * 0.618_034 + (to as f32) * 0.414_214) * TAU;
    vec2(angle.cos(), angle.sin())
}

/// Tiny deterministic offset for a zero-length spring.
pub fn jiggle(id: &str) -> Vec2 {
    let (x, y) = stable_pair(id);
    vec2(x, y) * 1.0e-3
}
