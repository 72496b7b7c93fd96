//! Geometric predicates over raw edge cycles.
//!
//! These operate on `&[Edge]` directly (rather than on [`crate::Face`])
//! so they can be reused both by [`crate::Face`]'s own methods and by
//! transformation code that is still assembling cycles that aren't yet
//! faces.

use crate::Edge;
use mapfix_math::{Plane, Tolerance, Vec3};

/// Normal of a closed edge cycle via Newell's formula, unit-normalized.
///
/// Returns the zero vector for a degenerate (non-planar-enough or
/// collinear) cycle; callers that require a valid normal should check
/// `norm() > 0` themselves.
pub fn cycle_normal(edges: &[Edge]) -> Vec3 {
    let mut n = Vec3::zeros();
    for e in edges {
        n.x += (e.v1.y - e.v2.y) * (e.v1.z + e.v2.z);
        n.y += (e.v1.z - e.v2.z) * (e.v1.x + e.v2.x);
        n.z += (e.v1.x - e.v2.x) * (e.v1.y + e.v2.y);
    }
    let len = n.norm();
    if len <= f64::EPSILON {
        n
    } else {
        n / len
    }
}

/// Are two vectors parallel (cross product is zero under tolerance)?
pub fn vectors_parallel(a: &Vec3, b: &Vec3, tol: &Tolerance) -> bool {
    tol.vec_is_zero(&a.cross(b))
}

/// Does `p` lie on some edge of `edges` (segment containment, endpoints
/// included)?
pub fn point_is_on_cycle(p: &Vec3, edges: &[Edge], tol: &Tolerance) -> bool {
    edges.iter().any(|e| e.contains_point(p, tol))
}

/// Winding-number containment test: is `p` inside the closed cycle
/// `edges`, which lies (approximately) in the plane with normal `normal`?
///
/// Boundary points are *not* considered inside. Built from two auxiliary
/// planes through `p`: one containing `p`, `normal`, and the first edge's
/// direction, and a second perpendicular to the first within the cycle's
/// plane, used to decide which crossings of the first plane actually
/// pass "through" `p` rather than merely crossing its infinite line.
pub fn point_in_cycle(p: &Vec3, edges: &[Edge], normal: &Vec3, tol: &Tolerance) -> bool {
    if edges.is_empty() {
        return false;
    }
    let dir0 = edges[0].vec();
    let plane1_normal = normal.cross(&dir0);
    if tol.vec_is_zero(&plane1_normal) {
        return false;
    }
    let plane1 = Plane::new(plane1_normal.normalize(), -plane1_normal.normalize().dot(p));
    let plane2_normal = normal.cross(&plane1.normal);
    let plane2 = Plane::new(plane2_normal.normalize(), -plane2_normal.normalize().dot(p));

    let mut winding = 0i32;
    for e in edges {
        let s1 = plane1.signed_offset(&e.v1);
        let s2 = plane1.signed_offset(&e.v2);
        // signed_offset is negative in front (n.v + d < 0); crossing from
        // negative to positive is a "forward" crossing of plane1.
        if s1 < 0.0 && s2 >= 0.0 {
            let ip = plane1.intersect(&e.v1, &e.v2);
            if plane2.signed_offset(&ip) < 0.0 {
                winding += 1;
            }
        } else if s1 >= 0.0 && s2 < 0.0 {
            let ip = plane1.intersect(&e.v1, &e.v2);
            if plane2.signed_offset(&ip) < 0.0 {
                winding -= 1;
            }
        }
    }
    winding != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(z: f64) -> Vec<Edge> {
        vec![
            Edge::new(Vec3::new(0.0, 0.0, z), Vec3::new(1.0, 0.0, z)),
            Edge::new(Vec3::new(1.0, 0.0, z), Vec3::new(1.0, 1.0, z)),
            Edge::new(Vec3::new(1.0, 1.0, z), Vec3::new(0.0, 1.0, z)),
            Edge::new(Vec3::new(0.0, 1.0, z), Vec3::new(0.0, 0.0, z)),
        ]
    }

    #[test]
    fn cycle_normal_of_ccw_square_points_up() {
        let n = cycle_normal(&square(0.0));
        assert!(n.z > 0.9);
    }

    #[test]
    fn point_in_cycle_inside_and_outside() {
        let tol = Tolerance::DEFAULT;
        let edges = square(0.0);
        let normal = Vec3::new(0.0, 0.0, 1.0);
        assert!(point_in_cycle(&Vec3::new(0.5, 0.5, 0.0), &edges, &normal, &tol));
        assert!(!point_in_cycle(&Vec3::new(2.0, 0.5, 0.0), &edges, &normal, &tol));
    }

    #[test]
    fn point_is_on_cycle_detects_boundary() {
        let tol = Tolerance::DEFAULT;
        let edges = square(0.0);
        assert!(point_is_on_cycle(&Vec3::new(0.5, 0.0, 0.0), &edges, &tol));
        assert!(!point_is_on_cycle(&Vec3::new(0.5, 0.5, 0.0), &edges, &tol));
    }
}
