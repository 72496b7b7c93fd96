use crate::predicates::{cycle_normal, point_in_cycle};
use crate::Edge;
use mapfix_math::{Plane, Tolerance, Vec3};

/// Texture projection metadata carried by a face.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    /// Texture name.
    pub name: String,
    /// U projection axis (unit).
    pub uaxis: Vec3,
    /// U shift.
    pub ushift: f64,
    /// V projection axis (unit).
    pub vaxis: Vec3,
    /// V shift.
    pub vshift: f64,
    /// Rotation in degrees.
    pub rotation: f64,
    /// U scale.
    pub uscale: f64,
    /// V scale.
    pub vscale: f64,
}

impl Texture {
    /// The placeholder texture used for cap faces with no donor
    /// (name `NULL`, unit axes derived from `edge_dir` and `plane_normal`,
    /// zero shift/rotation, unit scale).
    pub fn default_cap(edge_dir: &Vec3, plane_normal: &Vec3) -> Self {
        let uaxis = edge_dir.cross(plane_normal).normalize();
        let vaxis = uaxis.cross(plane_normal).normalize();
        Self {
            name: "NULL".to_string(),
            uaxis,
            ushift: 0.0,
            vaxis,
            vshift: 0.0,
            rotation: 0.0,
            uscale: 1.0,
            vscale: 1.0,
        }
    }

    /// The placeholder texture used for faces synthesised outside the
    /// solid cutter's own cap path (name `AAATRIGGER`, axis-aligned on
    /// the face's own first edge and normal).
    pub fn default_generated(first_edge_dir: &Vec3, face_normal: &Vec3) -> Self {
        let uaxis = first_edge_dir.normalize();
        let vaxis = face_normal.cross(&uaxis).normalize();
        Self {
            name: "AAATRIGGER".to_string(),
            uaxis,
            ushift: 0.0,
            vaxis,
            vshift: 0.0,
            rotation: 0.0,
            uscale: 1.0,
            vscale: 1.0,
        }
    }
}

/// A planar polygon: one outer boundary cycle plus zero or more inner
/// (hole) cycles, with texture projection metadata.
#[derive(Debug, Clone)]
pub struct Face {
    /// Outer boundary, a closed ordered cycle of edges.
    pub edges: Vec<Edge>,
    /// Inner boundaries (holes), each a closed ordered cycle wound
    /// opposite to `edges` when viewed along the face normal.
    pub inner_edges: Vec<Vec<Edge>>,
    /// Texture projection.
    pub texture: Texture,
}

impl Face {
    /// Build a face with no holes.
    pub fn new(edges: Vec<Edge>, texture: Texture) -> Self {
        Self {
            edges,
            inner_edges: Vec::new(),
            texture,
        }
    }

    /// Outward normal via Newell's formula over the outer cycle.
    pub fn normal(&self) -> Vec3 {
        cycle_normal(&self.edges)
    }

    /// The face's own plane: Newell normal, offset centered between the
    /// minimum and maximum of `-(n.v)` over the outer vertices.
    ///
    /// Centering the offset rather than anchoring it at the first vertex
    /// spreads whatever numerical drift the outer cycle has evenly
    /// across the planarity threshold.
    pub fn plane(&self) -> Plane {
        let n = self.normal();
        if self.edges.is_empty() {
            return Plane::new(n, 0.0);
        }
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for e in &self.edges {
            let s = -n.dot(&e.v1);
            lo = lo.min(s);
            hi = hi.max(s);
        }
        Plane::new(n, (lo + hi) / 2.0)
    }

    /// Every outer vertex satisfies `|n.v + d| <= epsilon` against the
    /// face's own plane.
    pub fn is_planar(&self, tol: &Tolerance) -> bool {
        let plane = self.plane();
        self.edges
            .iter()
            .all(|e| tol.is_zero(plane.signed_offset(&e.v1)))
    }

    /// Is `p` inside the outer cycle and outside (and not on) every inner
    /// cycle?
    pub fn contains_point(&self, p: &Vec3, tol: &Tolerance) -> bool {
        let n = self.normal();
        if !point_in_cycle(p, &self.edges, &n, tol) {
            return false;
        }
        for hole in &self.inner_edges {
            if point_in_cycle(p, hole, &n, tol) {
                return false;
            }
        }
        true
    }

    /// Is `other`'s outer cycle the exact reverse of this face's outer
    /// cycle (same edges, opposite direction, any rotation)?
    pub fn is_reverse_of(&self, other: &Face, tol: &Tolerance) -> bool {
        if self.edges.len() != other.edges.len() || self.edges.is_empty() {
            return false;
        }
        let rev_other: Vec<Edge> = other.edges.iter().rev().map(|e| e.reversed()).collect();
        cyclic_eq(&self.edges, &rev_other, tol)
    }

    /// All cycles (outer first, then each inner), for code that needs to
    /// walk every edge of the face regardless of which cycle it is in.
    pub fn all_cycles(&self) -> impl Iterator<Item = &Vec<Edge>> {
        std::iter::once(&self.edges).chain(self.inner_edges.iter())
    }

    /// Mutable counterpart of [`Face::all_cycles`].
    pub fn all_cycles_mut(&mut self) -> impl Iterator<Item = &mut Vec<Edge>> {
        std::iter::once(&mut self.edges).chain(self.inner_edges.iter_mut())
    }
}

fn cyclic_eq(a: &[Edge], b: &[Edge], tol: &Tolerance) -> bool {
    let n = a.len();
    if n != b.len() {
        return false;
    }
    (0..n).any(|offset| (0..n).all(|i| a[i].equals(&b[(i + offset) % n], tol)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texture() -> Texture {
        Texture {
            name: "A".to_string(),
            uaxis: Vec3::new(1.0, 0.0, 0.0),
            ushift: 0.0,
            vaxis: Vec3::new(0.0, 1.0, 0.0),
            vshift: 0.0,
            rotation: 0.0,
            uscale: 1.0,
            vscale: 1.0,
        }
    }

    fn square(z: f64) -> Vec<Edge> {
        vec![
            Edge::new(Vec3::new(0.0, 0.0, z), Vec3::new(1.0, 0.0, z)),
            Edge::new(Vec3::new(1.0, 0.0, z), Vec3::new(1.0, 1.0, z)),
            Edge::new(Vec3::new(1.0, 1.0, z), Vec3::new(0.0, 1.0, z)),
            Edge::new(Vec3::new(0.0, 1.0, z), Vec3::new(0.0, 0.0, z)),
        ]
    }

    #[test]
    fn planar_face_is_planar() {
        let tol = Tolerance::DEFAULT;
        let f = Face::new(square(0.0), texture());
        assert!(f.is_planar(&tol));
    }

    #[test]
    fn non_planar_face_fails_planarity() {
        let tol = Tolerance::DEFAULT;
        let mut edges = square(0.0);
        edges[2].v1.z = 0.5;
        edges[1].v2.z = 0.5;
        let f = Face::new(edges, texture());
        assert!(!f.is_planar(&tol));
    }

    #[test]
    fn contains_point_respects_hole() {
        let tol = Tolerance::DEFAULT;
        let mut f = Face::new(square(0.0), texture());
        // a small inner hole in the middle, wound opposite the outer cycle
        let hole = vec![
            Edge::new(Vec3::new(0.4, 0.4, 0.0), Vec3::new(0.4, 0.6, 0.0)),
            Edge::new(Vec3::new(0.4, 0.6, 0.0), Vec3::new(0.6, 0.6, 0.0)),
            Edge::new(Vec3::new(0.6, 0.6, 0.0), Vec3::new(0.6, 0.4, 0.0)),
            Edge::new(Vec3::new(0.6, 0.4, 0.0), Vec3::new(0.4, 0.4, 0.0)),
        ];
        f.inner_edges.push(hole);
        assert!(f.contains_point(&Vec3::new(0.1, 0.1, 0.0), &tol));
        assert!(!f.contains_point(&Vec3::new(0.5, 0.5, 0.0), &tol));
    }

    #[test]
    fn is_reverse_of_detects_flipped_cycle() {
        let tol = Tolerance::DEFAULT;
        let a = Face::new(square(0.0), texture());
        let mut rev_edges: Vec<Edge> = square(0.0).iter().rev().map(|e| e.reversed()).collect();
        rev_edges.rotate_left(1);
        let b = Face::new(rev_edges, texture());
        assert!(a.is_reverse_of(&b, &tol));
        assert!(!a.is_reverse_of(&a, &tol));
    }
}
