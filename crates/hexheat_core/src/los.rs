//! Corner-to-corner line-of-sight through hexagon obstacles.
//!
//! Works in a fixed internal pointy-top pixel layout with unit cell size,
//! independent of any rendering layout. Obstacle polygons are the 6 corners
//! of each blocking cell, inflated outward from the cell center so that
//! shared-edge floating-point ties cannot let a ray graze through.
//!
//! The rule is permissive on purpose: if any one of the 36 corner-pair
//! segments escapes every obstacle, sight exists. A thin obstacle can be
//! seen around at grazing angles; only an obstacle set that genuinely seals
//! the corridor blocks.

use smallvec::SmallVec;

use crate::hex::Hex;
use crate::types::CORNER_INFLATION;

/// Layout size for the internal geometry; corners of an uninflated cell sit
/// at this radius from its center.
const LAYOUT_SIZE: f64 = 1.0;

/// Tolerance for treating a cross product as zero (collinear / on-edge).
const GEOM_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy)]
struct Vec2 {
    x: f64,
    y: f64,
}

type Polygon = SmallVec<[Vec2; 6]>;

/// Visibility test between cells `a` and `b` through `obstacles`.
///
/// Returns the hex distance when an unobstructed corner-to-corner segment
/// exists, `None` when every one of the 36 corner pairs is blocked.
pub fn line_of_sight(a: Hex, b: Hex, obstacles: &[Hex]) -> Option<i32> {
    if a == b {
        return Some(0);
    }
    let polygons: Vec<Polygon> = obstacles
        .iter()
        .map(|&cell| corners(cell, CORNER_INFLATION))
        .collect();
    let from = corners(a, 1.0);
    let to = corners(b, 1.0);
    for &p in &from {
        for &q in &to {
            if polygons.iter().all(|poly| !segment_hits_polygon(p, q, poly)) {
                return Some(a.distance(b));
            }
        }
    }
    None
}

/// The 6 pixel corners of `cell`, scaled outward from its center.
fn corners(cell: Hex, inflation: f64) -> Polygon {
    let (cx, cy) = cell.to_pixel(LAYOUT_SIZE);
    let radius = LAYOUT_SIZE * inflation;
    (0..6)
        .map(|i| {
            // Pointy-top corner angles: 60°·i − 30°.
            let angle = (60.0 * f64::from(i) - 30.0).to_radians();
            Vec2 {
                x: cx + radius * angle.cos(),
                y: cy + radius * angle.sin(),
            }
        })
        .collect()
}

/// Signed area cross product of `(b - a) × (c - a)`.
fn orient(a: Vec2, b: Vec2, c: Vec2) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn on_segment(a: Vec2, b: Vec2, p: Vec2) -> bool {
    p.x >= a.x.min(b.x) - GEOM_EPSILON
        && p.x <= a.x.max(b.x) + GEOM_EPSILON
        && p.y >= a.y.min(b.y) - GEOM_EPSILON
        && p.y <= a.y.max(b.y) + GEOM_EPSILON
}

/// Proper and collinear-overlap segment intersection via orientation signs.
fn segments_intersect(p1: Vec2, q1: Vec2, p2: Vec2, q2: Vec2) -> bool {
    let d1 = orient(p2, q2, p1);
    let d2 = orient(p2, q2, q1);
    let d3 = orient(p1, q1, p2);
    let d4 = orient(p1, q1, q2);

    if ((d1 > GEOM_EPSILON && d2 < -GEOM_EPSILON) || (d1 < -GEOM_EPSILON && d2 > GEOM_EPSILON))
        && ((d3 > GEOM_EPSILON && d4 < -GEOM_EPSILON) || (d3 < -GEOM_EPSILON && d4 > GEOM_EPSILON))
    {
        return true;
    }

    (d1.abs() <= GEOM_EPSILON && on_segment(p2, q2, p1))
        || (d2.abs() <= GEOM_EPSILON && on_segment(p2, q2, q1))
        || (d3.abs() <= GEOM_EPSILON && on_segment(p1, q1, p2))
        || (d4.abs() <= GEOM_EPSILON && on_segment(p1, q1, q2))
}

/// Point-in-convex-polygon: all edge cross products carry the same sign.
fn point_in_polygon(p: Vec2, polygon: &Polygon) -> bool {
    let mut sign = 0i8;
    for i in 0..polygon.len() {
        let a = polygon[i];
        let b = polygon[(i + 1) % polygon.len()];
        let o = orient(a, b, p);
        if o.abs() <= GEOM_EPSILON {
            continue;
        }
        let s = if o > 0.0 { 1 } else { -1 };
        if sign == 0 {
            sign = s;
        } else if s != sign {
            return false;
        }
    }
    true
}

/// True when segment `p..q` crosses any polygon edge, or lies fully inside
/// (the degenerate case no edge test catches — checked at the midpoint).
fn segment_hits_polygon(p: Vec2, q: Vec2, polygon: &Polygon) -> bool {
    for i in 0..polygon.len() {
        let a = polygon[i];
        let b = polygon[(i + 1) % polygon.len()];
        if segments_intersect(p, q, a, b) {
            return true;
        }
    }
    let midpoint = Vec2 {
        x: (p.x + q.x) / 2.0,
        y: (p.y + q.y) / 2.0,
    };
    point_in_polygon(midpoint, polygon)
}
