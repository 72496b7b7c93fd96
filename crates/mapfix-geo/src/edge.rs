use mapfix_math::{Plane, Side, Tolerance, Vec3};

/// A directed edge between two points.
///
/// `index` is an opaque debug-correlation field; it has no effect on any
/// geometric predicate and is not required to be unique.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    /// Tail.
    pub v1: Vec3,
    /// Head.
    pub v2: Vec3,
    /// Debug-only index, preserved across transformations where convenient.
    pub index: i32,
}

impl Edge {
    /// Build an edge, defaulting its debug index to 0.
    pub fn new(v1: Vec3, v2: Vec3) -> Self {
        Self { v1, v2, index: 0 }
    }

    /// Direction `v2 - v1`.
    pub fn vec(&self) -> Vec3 {
        self.v2 - self.v1
    }

    /// Reverse direction `v1 - v2`.
    pub fn rvec(&self) -> Vec3 {
        self.v1 - self.v2
    }

    /// The edge with endpoints swapped (same index).
    pub fn reversed(&self) -> Edge {
        Edge {
            v1: self.v2,
            v2: self.v1,
            index: self.index,
        }
    }

    /// Endpoints match in order, within tolerance.
    pub fn equals(&self, other: &Edge, tol: &Tolerance) -> bool {
        tol.vec_eq(&self.v1, &other.v1) && tol.vec_eq(&self.v2, &other.v2)
    }

    /// Endpoints match reversed, within tolerance: `self` and `other` are
    /// the same edge traversed in opposite directions.
    pub fn is_reverse_of(&self, other: &Edge, tol: &Tolerance) -> bool {
        tol.vec_eq(&self.v1, &other.v2) && tol.vec_eq(&self.v2, &other.v1)
    }

    /// Classify an endpoint of this edge against a plane.
    pub fn side_of_v1(&self, plane: &Plane, tol: &Tolerance) -> Side {
        plane.side_of(&self.v1, tol)
    }

    /// Classify the other endpoint of this edge against a plane.
    pub fn side_of_v2(&self, plane: &Plane, tol: &Tolerance) -> Side {
        plane.side_of(&self.v2, tol)
    }

    /// This edge entirely within the plane (both endpoints `In`).
    pub fn is_in_plane(&self, plane: &Plane, tol: &Tolerance) -> bool {
        self.side_of_v1(plane, tol) == Side::In && self.side_of_v2(plane, tol) == Side::In
    }

    /// Point where this edge's segment crosses `plane`.
    ///
    /// Only meaningful when the segment actually straddles the plane.
    pub fn intersect(&self, plane: &Plane) -> Vec3 {
        plane.intersect(&self.v1, &self.v2)
    }

    /// Does `p` lie on this edge's segment (collinear and within its
    /// bounding box, endpoints included)?
    pub fn contains_point(&self, p: &Vec3, tol: &Tolerance) -> bool {
        let d = self.vec();
        let to_p = p - self.v1;
        if !tol.vec_is_zero(&d.cross(&to_p)) {
            return false;
        }
        for axis in 0..3 {
            let (lo, hi) = if d[axis] >= 0.0 {
                (self.v1[axis], self.v2[axis])
            } else {
                (self.v2[axis], self.v1[axis])
            };
            if p[axis] < lo - tol.epsilon || p[axis] > hi + tol.epsilon {
                return false;
            }
        }
        true
    }

    /// Are `self` and `other` collinear (each endpoint of one lies on the
    /// infinite line of the other)?
    pub fn is_collinear_with(&self, other: &Edge, tol: &Tolerance) -> bool {
        let d = self.vec();
        if tol.vec_is_zero(&d) {
            return false;
        }
        let on_line = |p: &Vec3| {
            let to_p = p - self.v1;
            tol.vec_is_zero(&d.cross(&to_p))
        };
        on_line(&other.v1) && on_line(&other.v2)
    }
}
