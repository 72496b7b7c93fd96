use crate::Face;
use mapfix_math::Tolerance;

/// An 8-bit RGB color, carried through from the scene file for display
/// purposes only; no transformation inspects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
}

impl Default for Color {
    fn default() -> Self {
        Self {
            r: 255,
            g: 255,
            b: 255,
        }
    }
}

/// An unordered collection of faces forming one polyhedron.
#[derive(Debug, Clone)]
pub struct Solid {
    /// The solid's faces, order-insignificant.
    pub faces: Vec<Face>,
    /// Display color.
    pub color: Color,
    /// Visibility-group identifier (0 is always visible).
    pub visgroup: i32,
    /// Debug-only index, preserved across transformations where convenient.
    pub index: i32,
}

impl Solid {
    /// An empty solid with the given debug index.
    pub fn new(index: i32) -> Self {
        Self {
            faces: Vec::new(),
            color: Color::default(),
            visgroup: 0,
            index,
        }
    }

    /// Is every directed edge of every face matched by exactly one
    /// reverse partner elsewhere in this solid?
    ///
    /// A well-formed solid's surface is closed; this is the invariant
    /// that solid reconstruction (face-adjacency walking) is required to
    /// restore after any cut.
    pub fn is_well_formed(&self, tol: &Tolerance) -> bool {
        for face in &self.faces {
            for cycle in face.all_cycles() {
                for edge in cycle {
                    if !self.has_reverse_partner(edge, tol) {
                        return false;
                    }
                }
            }
        }
        true
    }

    fn has_reverse_partner(&self, edge: &crate::Edge, tol: &Tolerance) -> bool {
        self.faces.iter().any(|f| {
            f.all_cycles()
                .any(|cycle| cycle.iter().any(|e2| e2.is_reverse_of(edge, tol)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Edge, Texture};
    use mapfix_math::Vec3;

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

    /// Two triangles sharing one edge in opposite directions: a
    /// (degenerate, two-sided) but well-formed solid for testing the
    /// reverse-partner invariant in isolation.
    #[test]
    fn well_formed_detects_matching_reverse_edges() {
        let tol = Tolerance::DEFAULT;
        let shared_a = Edge::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        let shared_b = shared_a.reversed();
        let f1 = Face::new(
            vec![
                shared_a,
                Edge::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)),
                Edge::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 0.0, 0.0)),
            ],
            texture(),
        );
        let f2 = Face::new(
            vec![
                shared_b,
                Edge::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, -1.0, 0.0)),
                Edge::new(Vec3::new(0.0, -1.0, 0.0), Vec3::new(1.0, 0.0, 0.0)),
            ],
            texture(),
        );
        let solid = Solid {
            faces: vec![f1, f2],
            color: Color::default(),
            visgroup: 0,
            index: 0,
        };
        // The two non-shared boundary edges have no partner, so this is
        // NOT well-formed — confirms the check actually inspects every edge.
        assert!(!solid.is_well_formed(&tol));
    }

    #[test]
    fn empty_solid_is_vacuously_well_formed() {
        let tol = Tolerance::DEFAULT;
        let solid = Solid::new(0);
        assert!(solid.is_well_formed(&tol));
    }
}
