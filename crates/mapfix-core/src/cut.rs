//! The face cutter: split a single face's boundary by a plane.

use crate::error::{CoreError, CoreErrorKind};
use crate::Context;
use mapfix_geo::{Edge, Face};
use mapfix_math::{Plane, Side, Vec3};

/// The four edge pools produced by cutting one face against a plane.
#[derive(Debug, Clone, Default)]
pub struct FaceCutResult {
    /// Whole and partial edges on the front side of the plane.
    pub front_edges: Vec<Edge>,
    /// Whole and partial edges on the back side of the plane.
    pub back_edges: Vec<Edge>,
    /// New boundary edges lying on the cutting plane, oriented for a
    /// face built with the front solid's outward normal.
    pub front_plane_edges: Vec<Edge>,
    /// New boundary edges lying on the cutting plane, oriented for a
    /// face built with the back solid's outward normal.
    pub back_plane_edges: Vec<Edge>,
}

/// Split `face`'s outer cycle and every inner cycle against `cutplane`.
///
/// See the module-level cases in [`classify_cycle`]. Fails with
/// [`CoreErrorKind::DegenerateCutCycle`] if some cycle lies entirely
/// within the plane, or [`CoreErrorKind::OddCutCount`] if the plane
/// crossings on either side don't pair up evenly.
pub fn split_face_by_plane(
    face: &Face,
    cutplane: &Plane,
    ctx: &Context,
) -> Result<FaceCutResult, CoreError> {
    let face_normal = face.normal();
    let sort_axis = cutplane.normal.cross(&face_normal);

    let mut result = FaceCutResult::default();
    let mut front_verts: Vec<Vec3> = Vec::new();
    let mut back_verts: Vec<Vec3> = Vec::new();

    for cycle in face.all_cycles() {
        classify_cycle(
            cycle,
            cutplane,
            ctx,
            &mut result.front_edges,
            &mut result.back_edges,
            &mut front_verts,
            &mut back_verts,
        )?;
    }

    if front_verts.len() % 2 != 0 || back_verts.len() % 2 != 0 {
        return Err(CoreError::new(CoreErrorKind::OddCutCount, ctx));
    }

    sort_along_axis(&mut front_verts, &sort_axis);
    sort_along_axis(&mut back_verts, &sort_axis);

    // Each pair of plane vertices closes the per-face remainder into a
    // valid cycle (pushed onto the side's own edge list) and contributes
    // the mirror-oriented edge to that side's plane-edge pool, which feeds
    // the shared cap face synthesised once per solid in `split_solid_by_plane`.
    for pair in front_verts.chunks(2) {
        if !ctx.tol.vec_eq(&pair[0], &pair[1]) {
            result.front_edges.push(Edge::new(pair[0], pair[1]));
            result.front_plane_edges.push(Edge::new(pair[1], pair[0]));
        }
    }
    for pair in back_verts.chunks(2) {
        if !ctx.tol.vec_eq(&pair[0], &pair[1]) {
            result.back_edges.push(Edge::new(pair[1], pair[0]));
            result.back_plane_edges.push(Edge::new(pair[0], pair[1]));
        }
    }

    Ok(result)
}

fn sort_along_axis(verts: &mut [Vec3], axis: &Vec3) {
    verts.sort_by(|a, b| {
        a.dot(axis)
            .partial_cmp(&b.dot(axis))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Walk one closed cycle once, classifying each edge against `cutplane`
/// by `(side_of(v1), side_of(v2))` and routing it to the appropriate
/// output list; strict crossings also contribute a cap vertex to both
/// sides, and one-sided touches contribute a cap vertex to that side
/// only. An edge lying entirely in the plane is dropped.
fn classify_cycle(
    cycle: &[Edge],
    cutplane: &Plane,
    ctx: &Context,
    front_edges: &mut Vec<Edge>,
    back_edges: &mut Vec<Edge>,
    front_verts: &mut Vec<Vec3>,
    back_verts: &mut Vec<Vec3>,
) -> Result<(), CoreError> {
    let n = cycle.len();
    let start = cycle
        .iter()
        .position(|e| !e.is_in_plane(cutplane, &ctx.tol));
    let Some(start) = start else {
        return Err(CoreError::new(CoreErrorKind::DegenerateCutCycle, ctx));
    };

    for i in 0..n {
        let e = &cycle[(start + i) % n];
        let s1 = e.side_of_v1(cutplane, &ctx.tol);
        let s2 = e.side_of_v2(cutplane, &ctx.tol);
        match (s1, s2) {
            (Side::Back, Side::Back) => back_edges.push(*e),
            (Side::Front, Side::Front) => front_edges.push(*e),
            (Side::Back, Side::Front) => {
                let ip = e.intersect(cutplane);
                back_edges.push(Edge::new(e.v1, ip));
                front_edges.push(Edge::new(ip, e.v2));
                front_verts.push(ip);
                back_verts.push(ip);
            }
            (Side::Front, Side::Back) => {
                let ip = e.intersect(cutplane);
                front_edges.push(Edge::new(e.v1, ip));
                back_edges.push(Edge::new(ip, e.v2));
                front_verts.push(ip);
                back_verts.push(ip);
            }
            (Side::Back, Side::In) => {
                back_edges.push(*e);
                back_verts.push(e.v2);
            }
            (Side::Front, Side::In) => {
                front_edges.push(*e);
                front_verts.push(e.v2);
            }
            (Side::In, Side::Front) => {
                front_edges.push(*e);
                front_verts.push(e.v1);
            }
            (Side::In, Side::Back) => {
                back_edges.push(*e);
                back_verts.push(e.v1);
            }
            (Side::In, Side::In) => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Context;
    use mapfix_geo::Texture;

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

    fn unit_square_xy(z: f64) -> Face {
        Face::new(
            vec![
                Edge::new(Vec3::new(0.0, 0.0, z), Vec3::new(1.0, 0.0, z)),
                Edge::new(Vec3::new(1.0, 0.0, z), Vec3::new(1.0, 1.0, z)),
                Edge::new(Vec3::new(1.0, 1.0, z), Vec3::new(0.0, 1.0, z)),
                Edge::new(Vec3::new(0.0, 1.0, z), Vec3::new(0.0, 0.0, z)),
            ],
            texture(),
        )
    }

    #[test]
    fn cuts_square_in_half_through_the_middle() {
        let ctx = Context::default();
        let face = unit_square_xy(0.0);
        // plane x=0.5, front half-space is x > 0.5 (n.v+d<0 => -x+0.5<0 => x>0.5)
        let cutplane = Plane::new(Vec3::new(-1.0, 0.0, 0.0), 0.5);
        let result = split_face_by_plane(&face, &cutplane, &ctx).unwrap();
        assert_eq!(result.front_plane_edges.len(), 1);
        assert_eq!(result.back_plane_edges.len(), 1);
        assert!(!result.front_edges.is_empty());
        assert!(!result.back_edges.is_empty());
    }

    #[test]
    fn entirely_front_face_produces_no_cap_edges() {
        let ctx = Context::default();
        let face = unit_square_xy(0.0);
        // plane x=-10, whole face is in front (x > -10)
        let cutplane = Plane::new(Vec3::new(-1.0, 0.0, 0.0), -10.0);
        let result = split_face_by_plane(&face, &cutplane, &ctx).unwrap();
        assert_eq!(result.front_edges.len(), 4);
        assert!(result.back_edges.is_empty());
        assert!(result.front_plane_edges.is_empty());
        assert!(result.back_plane_edges.is_empty());
    }

    #[test]
    fn entirely_coplanar_face_fails_degenerate() {
        let ctx = Context::default();
        let face = unit_square_xy(0.0);
        let cutplane = Plane::new(Vec3::new(0.0, 0.0, 1.0), 0.0);
        let err = split_face_by_plane(&face, &cutplane, &ctx).unwrap_err();
        assert_eq!(err.kind, CoreErrorKind::DegenerateCutCycle);
    }

    #[test]
    fn tangent_vertex_does_not_produce_odd_cut_count() {
        let ctx = Context::default();
        // Triangle with one vertex exactly on the cut plane (x=1), the
        // opposite edge straddling nothing else: should not be OddCutCount.
        let face = Face::new(
            vec![
                Edge::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)),
                Edge::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)),
                Edge::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 0.0, 0.0)),
            ],
            texture(),
        );
        let cutplane = Plane::new(Vec3::new(-1.0, 0.0, 0.0), 1.0);
        let result = split_face_by_plane(&face, &cutplane, &ctx);
        assert!(result.is_ok());
    }
}
