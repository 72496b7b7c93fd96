//! Ear-clipping tesselation of non-planar faces, optionally synchronized
//! with a reverse face elsewhere in the scene.

use crate::error::{CoreError, CoreErrorKind};
use crate::Context;
use mapfix_geo::predicates::cycle_normal;
use mapfix_geo::{Edge, Face};
use mapfix_math::Plane;

/// New ear triangles peeled off by [`tesselate_non_planar_face`]. The
/// last triangle of each cycle is never peeled off as a separate face —
/// it's already a triangle, so it's left in place as `face`/`reverse`'s
/// own (now-shrunk) edge list.
#[derive(Debug, Default)]
pub struct TesselationOutput {
    /// Ear triangles clipped from `face`, each inheriting its texture.
    pub faces: Vec<Face>,
    /// Ear triangles clipped from `reverse`, if a reverse face was given,
    /// each inheriting *its* texture.
    pub reverse_faces: Vec<Face>,
}

/// Ear-clip `face`'s outer cycle down to a single remaining triangle,
/// returning every triangle peeled off along the way.
///
/// If `reverse` is `Some`, its cycle is expected to be the exact reverse
/// of `face`'s (see [`Face::is_reverse_of`]) and is clipped in lockstep
/// so a shared, watertight surface stays watertight. When `reverse` is
/// `None`, only `face` is clipped; there is no separate "reverse edge"
/// argument capable of falling out of sync with it, matching the source
/// tool's null-list-pointer contract but enforced here by the type.
///
/// The union of the returned ears plus the final triangle left in
/// `face.edges` covers the same boundary as the original cycle.
///
/// Fails with [`CoreErrorKind::TesselationDeadlock`] if a full lap of
/// the cycle finds no valid ear.
pub fn tesselate_non_planar_face(
    face: &mut Face,
    mut reverse: Option<&mut Face>,
    ctx: &Context,
) -> Result<TesselationOutput, CoreError> {
    let mut output = TesselationOutput::default();
    if face.edges.len() <= 3 {
        return Ok(output);
    }

    // Align the reverse cycle so that its i-th edge from the end
    // corresponds to `face`'s i-th edge, reversed. `is_reverse_of`
    // already establishes this correspondence exists; find the rotation
    // offset that makes reverse.edges[rev_index_for(i)] line up.
    let rev_offset = reverse.as_ref().and_then(|r| rotation_offset(face, r, ctx));

    let mut normal = face.normal();
    let mut anchor = 0usize;
    let mut since_clip = 0usize;

    while face.edges.len() > 3 {
        let n = face.edges.len();
        let i1 = anchor % n;
        let i2 = (anchor + 1) % n;

        let convex = is_convex_corner(&face.edges[i1], &face.edges[i2], &normal);
        let empty = convex && ear_is_empty(&face.edges, i1, i2, &normal, ctx);

        if convex && empty {
            let e1 = face.edges[i1];
            let e2 = face.edges[i2];
            output.faces.push(Face::new(
                vec![Edge::new(e1.v1, e1.v2), Edge::new(e2.v1, e2.v2), Edge::new(e2.v2, e1.v1)],
                face.texture.clone(),
            ));
            face.edges[i1].v2 = e2.v2;
            face.edges.remove(i2);
            normal = cycle_normal(&face.edges);

            if let (Some(r), Some(offset)) = (reverse.as_deref_mut(), rev_offset) {
                let rn = r.edges.len();
                let ri1 = (offset + n - 1 - i1) % rn;
                if ri1 < r.edges.len() {
                    let ri2 = (ri1 + 1) % rn;
                    let re1 = r.edges[ri1];
                    let re2 = r.edges[ri2];
                    output.reverse_faces.push(Face::new(
                        vec![Edge::new(re1.v1, re1.v2), Edge::new(re2.v1, re2.v2), Edge::new(re2.v2, re1.v1)],
                        r.texture.clone(),
                    ));
                    r.edges[ri1].v2 = re2.v2;
                    r.edges.remove(ri2);
                }
            }

            anchor = i1;
            since_clip = 0;
            continue;
        }

        anchor = (anchor + 1) % n;
        since_clip += 1;
        if since_clip > n {
            return Err(CoreError::new(CoreErrorKind::TesselationDeadlock, ctx));
        }
    }

    Ok(output)
}

/// Find the rotation offset aligning `reverse`'s cycle (reversed) against
/// `face`'s, given that they are known reverses of one another.
fn rotation_offset(face: &Face, reverse: &Face, ctx: &Context) -> Option<usize> {
    if !face.is_reverse_of(reverse, &ctx.tol) {
        return None;
    }
    let n = reverse.edges.len();
    for offset in 0..n {
        let matches = (0..n).all(|i| {
            let rev_idx = (offset + n - 1 - i) % n;
            face.edges[i].is_reverse_of(&reverse.edges[rev_idx], &ctx.tol)
        });
        if matches {
            return Some(offset);
        }
    }
    None
}

fn is_convex_corner(e1: &Edge, e2: &Edge, normal: &mapfix_math::Vec3) -> bool {
    e2.vec().cross(&e1.rvec()).dot(normal) > 0.0
}

/// Is the candidate ear `(e1.v1, e1.v2, e2.v2)` free of any other cycle
/// vertex strictly inside it?
///
/// Checked by three half-space tests against the triangle's own edges
/// (closing `e2.v2` back to `e1.v1`), projected through `normal`. Tests
/// only each edge's `v1`, which suffices because every cycle vertex
/// appears as some edge's `v1` when the whole cycle is scanned.
fn ear_is_empty(edges: &[Edge], i1: usize, i2: usize, normal: &mapfix_math::Vec3, ctx: &Context) -> bool {
    let a = edges[i1].v1;
    let b = edges[i1].v2;
    let c = edges[i2].v2;

    let tri_edges = [Edge::new(a, b), Edge::new(b, c), Edge::new(c, a)];
    let planes: Vec<Plane> = tri_edges
        .iter()
        .filter_map(|e| {
            let side_normal = e.vec().cross(normal);
            if side_normal.norm() <= f64::EPSILON {
                None
            } else {
                let n = side_normal.normalize();
                Some(Plane::new(n, -n.dot(&e.v1)))
            }
        })
        .collect();
    if planes.len() < 3 {
        return true;
    }

    for (idx, edge) in edges.iter().enumerate() {
        if idx == i1 || idx == i2 {
            continue;
        }
        let p = edge.v1;
        if ctx.tol.vec_eq(&p, &a) || ctx.tol.vec_eq(&p, &b) || ctx.tol.vec_eq(&p, &c) {
            continue;
        }
        let inside = planes
            .iter()
            .all(|plane| plane.side_of(&p, &ctx.tol) == mapfix_math::Side::Front);
        if inside {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapfix_geo::Texture;
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

    #[test]
    fn non_planar_quad_tesselates_into_two_triangles() {
        let ctx = Context::default();
        let edges = vec![
            Edge::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)),
            Edge::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 0.1)),
            Edge::new(Vec3::new(1.0, 1.0, 0.1), Vec3::new(0.0, 1.0, 0.0)),
            Edge::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 0.0, 0.0)),
        ];
        let mut face = Face::new(edges, texture());
        assert!(!face.is_planar(&ctx.tol));
        let output = tesselate_non_planar_face(&mut face, None, &ctx).unwrap();
        assert_eq!(face.edges.len(), 3);
        assert!(face.is_planar(&ctx.tol));
        assert_eq!(output.faces.len(), 1);
        assert_eq!(output.faces[0].edges.len(), 3);
        assert!(output.reverse_faces.is_empty());
    }

    #[test]
    fn already_triangular_face_is_a_no_op() {
        let ctx = Context::default();
        let edges = vec![
            Edge::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)),
            Edge::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0)),
            Edge::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 0.0, 0.0)),
        ];
        let mut face = Face::new(edges.clone(), texture());
        let output = tesselate_non_planar_face(&mut face, None, &ctx).unwrap();
        assert_eq!(face.edges, edges);
        assert!(output.faces.is_empty());
    }

    #[test]
    fn reverse_face_is_clipped_in_lockstep() {
        let ctx = Context::default();
        let edges = vec![
            Edge::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)),
            Edge::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 0.1)),
            Edge::new(Vec3::new(1.0, 1.0, 0.1), Vec3::new(0.0, 1.0, 0.0)),
            Edge::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 0.0, 0.0)),
        ];
        let mut face = Face::new(edges.clone(), texture());
        let rev_edges: Vec<Edge> = edges.iter().rev().map(|e| e.reversed()).collect();
        let mut reverse = Face::new(rev_edges, texture());
        assert!(face.is_reverse_of(&reverse, &ctx.tol));
        let output = tesselate_non_planar_face(&mut face, Some(&mut reverse), &ctx).unwrap();
        assert_eq!(face.edges.len(), 3);
        assert_eq!(reverse.edges.len(), 3);
        assert!(face.is_reverse_of(&reverse, &ctx.tol));
        assert_eq!(output.faces.len(), 1);
        assert_eq!(output.reverse_faces.len(), 1);
        assert_eq!(output.reverse_faces[0].edges.len(), 3);
    }
}
