use eframe::egui::{Vec2, vec2};

const LEAF_CAPACITY: usize = 8;
const MAX_DEPTH: usize = 10;

/// Axis-aligned square cell.
#[derive(Clone, Copy, Debug)]
pub(super) struct Cell {
    pub(super) center: Vec2,
    pub(super) half_extent: f32,
}

impl Cell {
    fn enclosing(points: &[Vec2]) -> Option<Self> {
        let mut min = vec2(f32::INFINITY, f32::INFINITY);
        let mut max = vec2(f32::NEG_INFINITY, f32::NEG_INFINITY);
        for point in points {
            min = min.min(*point);
            max = max.max(*point);
        }

        if !min.x.is_finite() || !min.y.is_finite() || !max.x.is_finite() || !max.y.is_finite() {
            return None;
        }

        let span = (max - min).max_elem().max(1.0);
        Some(Self {
            center: (min + max) * 0.5,
            half_extent: span * 0.5 + 1.0,
        })
    }

    fn quadrant(self, quadrant: usize) -> Self {
        let quarter = self.half_extent * 0.5;
        let offset = vec2(
            if quadrant & 1 == 0 { -quarter } else { quarter },
            if quadrant & 2 == 0 { -quarter } else { quarter },
        );
        Self {
            center: self.center + offset,
            half_extent: quarter,
        }
    }

    fn quadrant_of(self, point: Vec2) -> usize {
        usize::from(point.x >= self.center.x) | (usize::from(point.y >= self.center.y) << 1)
    }

    /// Squared gap between two cells, zero when they touch or overlap.
    pub(super) fn gap_sq(self, other: Self) -> f32 {
        let reach = self.half_extent + other.half_extent;
        let dx = ((self.center.x - other.center.x).abs() - reach).max(0.0);
        let dy = ((self.center.y - other.center.y).abs() - reach).max(0.0);
        dx * dx + dy * dy
    }
}

/// Point quadtree over node positions. Leaves hold point indices.
pub(super) struct QuadTree {
    pub(super) cell: Cell,
    pub(super) points: Vec<usize>,
    pub(super) children: [Option<Box<QuadTree>>; 4],
}

impl QuadTree {
    pub(super) fn build(positions: &[Vec2]) -> Option<Self> {
        let cell = Cell::enclosing(positions)?;
        Some(Self::subdivide(cell, (0..positions.len()).collect(), positions, 0))
    }

    fn subdivide(cell: Cell, points: Vec<usize>, positions: &[Vec2], depth: usize) -> Self {
        let mut tree = Self {
            cell,
            points,
            children: std::array::from_fn(|_| None),
        };
        if depth >= MAX_DEPTH || tree.points.len() <= LEAF_CAPACITY {
            return tree;
        }

        let mut buckets: [Vec<usize>; 4] = std::array::from_fn(|_| Vec::new());
        for &index in &tree.points {
            buckets[cell.quadrant_of(positions[index])].push(index);
        }
        if buckets.iter().filter(|bucket| !bucket.is_empty()).count() <= 1 {
            return tree;
        }

        for (quadrant, bucket) in buckets.into_iter().enumerate() {
            if !bucket.is_empty() {
                tree.children[quadrant] = Some(Box::new(Self::subdivide(
                    cell.quadrant(quadrant),
                    bucket,
                    positions,
                    depth + 1,
                )));
            }
        }
        tree.points.clear();
        tree
    }

    pub(super) fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    pub(super) fn children(&self) -> impl Iterator<Item = &QuadTree> {
        self.children.iter().filter_map(|child| child.as_deref())
    }

    /// Calls `visit(a, b)` once for every unordered pair of points whose
    /// cells lie within `reach` of each other. Pairs further apart than that
    /// are never visited.
    pub(super) fn for_each_close_pair(&self, reach: f32, visit: &mut impl FnMut(usize, usize)) {
        Self::pairs_between(self, self, true, reach * reach, visit);
    }

    fn pairs_between(
        a: &QuadTree,
        b: &QuadTree,
        same: bool,
        reach_sq: f32,
        visit: &mut impl FnMut(usize, usize),
    ) {
        if a.cell.gap_sq(b.cell) > reach_sq {
            return;
        }

        if a.is_leaf() && b.is_leaf() {
            if same {
                for (offset, &from) in a.points.iter().enumerate() {
                    for &to in &a.points[offset + 1..] {
                        visit(from, to);
                    }
                }
            } else {
                for &from in &a.points {
                    for &to in &b.points {
                        visit(from, to);
                    }
                }
            }
            return;
        }

        if same {
            let children = a.children().collect::<Vec<_>>();
            for (offset, first) in children.iter().enumerate() {
                Self::pairs_between(first, first, true, reach_sq, visit);
                for second in &children[offset + 1..] {
                    Self::pairs_between(first, second, false, reach_sq, visit);
                }
            }
            return;
        }

        let split_a = !a.is_leaf() && (b.is_leaf() || a.cell.half_extent >= b.cell.half_extent);
        if split_a {
            for child in a.children() {
                Self::pairs_between(child, b, false, reach_sq, visit);
            }
        } else {
            for child in b.children() {
                Self::pairs_between(a, child, false, reach_sq, visit);
            }
        }
    }
}
