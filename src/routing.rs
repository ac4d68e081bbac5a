//! Edge curves between node boxes.
//!
//! A curve always leaves the upstream box (the dependency) from its right
//! edge and enters the downstream box (the dependent) from its left edge,
//! so data reads left to right like the depth layout. When the downstream
//! box sits to the left of the upstream one, a plain S-curve would cut
//! through both boxes, so the curve loops around instead.

use eframe::egui::{Pos2, Rect, pos2, vec2};

use crate::config::LayoutConfig;
use crate::lineage::{Edge, LayoutGraph};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteKind {
    Forward,
    Backward,
}

/// Cubic Bézier from `start` to `end`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicCurve {
    pub start: Pos2,
    pub control1: Pos2,
    pub control2: Pos2,
    pub end: Pos2,
    pub kind: RouteKind,
}

impl CubicCurve {
    pub fn points(&self) -> [Pos2; 4] {
        [self.start, self.control1, self.control2, self.end]
    }

    pub fn sample(&self, t: f32) -> Pos2 {
        let u = 1.0 - t;
        let weights = [u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t];
        let mut point = vec2(0.0, 0.0);
        for (control, weight) in self.points().iter().zip(weights) {
            point += control.to_vec2() * weight;
        }
        point.to_pos2()
    }

    /// Tight bounding box, found from the curve's axis extrema.
    pub fn bounds(&self) -> Rect {
        let [p0, p1, p2, p3] = self.points();
        let mut extremes = vec![self.start, self.end];
        for axis in 0..2 {
            let [a0, a1, a2, a3] = [p0[axis], p1[axis], p2[axis], p3[axis]];
            let roots = derivative_roots(
                -a0 + 3.0 * a1 - 3.0 * a2 + a3,
                2.0 * (a0 - 2.0 * a1 + a2),
                a1 - a0,
            );
            for t in roots.into_iter().flatten() {
                if t > 0.0 && t < 1.0 {
                    extremes.push(self.sample(t));
                }
            }
        }
        Rect::from_points(&extremes)
    }

    /// Path data in SVG syntax: `M x,y C x1,y1 x2,y2 x,y`.
    pub fn to_svg_path(&self) -> String {
        format!(
            "M{},{} C{},{} {},{} {},{}",
            self.start.x,
            self.start.y,
            self.control1.x,
            self.control1.y,
            self.control2.x,
            self.control2.y,
            self.end.x,
            self.end.y
        )
    }
}

/// Real roots of `a t² + b t + c`.
fn derivative_roots(a: f32, b: f32, c: f32) -> [Option<f32>; 2] {
    if a.abs() < 1.0e-6 {
        if b.abs() < 1.0e-6 {
            return [None, None];
        }
        return [Some(-c / b), None];
    }

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return [None, None];
    }
    let root = discriminant.sqrt();
    [Some((-b + root) / (2.0 * a)), Some((-b - root) / (2.0 * a))]
}

#[derive(Clone, Copy, Debug)]
pub struct EdgeRouter {
    half_width: f32,
    backward_threshold: f32,
    loop_reach: f32,
    loop_bow: f32,
}

impl EdgeRouter {
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            half_width: config.half_width(),
            backward_threshold: config.backward_threshold,
            loop_reach: config.loop_reach,
            loop_bow: config.loop_bow,
        }
    }

    /// Curve between two box centers, upstream box first.
    pub fn route(&self, upstream: Pos2, downstream: Pos2) -> CubicCurve {
        let start = upstream + vec2(self.half_width, 0.0);
        let end = downstream - vec2(self.half_width, 0.0);

        if end.x >= start.x - self.backward_threshold {
            let mid_x = start.x + (end.x - start.x) / 2.0;
            return CubicCurve {
                start,
                control1: pos2(mid_x, start.y),
                control2: pos2(mid_x, end.y),
                end,
                kind: RouteKind::Forward,
            };
        }

        let bow = if end.y >= start.y { self.loop_bow } else { -self.loop_bow };
        CubicCurve {
            start,
            control1: pos2(start.x + self.loop_reach, start.y + bow),
            control2: pos2(end.x - self.loop_reach, end.y + bow),
            end,
            kind: RouteKind::Backward,
        }
    }

    /// Routes a dependency edge: the curve runs from the dependency
    /// (`edge.target`) into the node that declared it (`edge.source`).
    pub fn route_edge(&self, graph: &LayoutGraph, edge: Edge) -> CubicCurve {
        let upstream = graph.nodes[edge.target].position.to_pos2();
        let downstream = graph.nodes[edge.source].position.to_pos2();
        self.route(upstream, downstream)
    }

    pub fn route_all(&self, graph: &LayoutGraph, curves: &mut Vec<CubicCurve>) {
        curves.clear();
        curves.extend(graph.edges.iter().map(|&edge| self.route_edge(graph, edge)));
    }
}
