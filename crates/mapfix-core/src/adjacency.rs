//! Face-adjacency search and solid reconstruction from a flat face soup.

use crate::error::{CoreError, CoreErrorKind};
use crate::Context;
use mapfix_geo::{Edge, Face};
use mapfix_math::{internal_angle, Vec3};

/// Find the face across `edge` from `start_normal`, among `faces` (every
/// face including `exclude_face`'s own set — a face can be adjacent to
/// itself across one of its own other edges), excluding the edge's own
/// owning face only when choosing its reverse partner would be a no-op.
///
/// A candidate is any edge (outer or inner cycle) on another face that is
/// the exact reverse of `edge`. When several qualify — a non-manifold
/// edge shared by more than two faces — the one minimising
/// `internal_angle(start_normal, -candidate.normal, edge.vec)` wins: the
/// face that lies immediately across the edge on the outward side,
/// walking around the edge from `start_normal` with the smallest turn.
/// Returns `None` instead of the source tool's `999.0`-angle sentinel for
/// "no match".
pub fn find_adjacent_across_edge(
    faces: &[Face],
    exclude_face: usize,
    edge: &Edge,
    start_normal: &Vec3,
    tol: &mapfix_math::Tolerance,
) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize, f64)> = None;
    for (fi, face) in faces.iter().enumerate() {
        if fi == exclude_face {
            continue;
        }
        let candidate_normal = face.normal();
        for cycle in face.all_cycles() {
            for (ei, candidate) in cycle.iter().enumerate() {
                if !candidate.is_reverse_of(edge, tol) {
                    continue;
                }
                let angle = internal_angle(start_normal, &(-candidate_normal), &edge.vec());
                match best {
                    Some((_, _, best_angle)) if best_angle <= angle => {}
                    _ => best = Some((fi, ei, angle)),
                }
            }
        }
    }
    best.map(|(fi, ei, _)| (fi, ei))
}

/// Legacy name kept for the cycle-assembly-flavoured angle lookup used by
/// callers that already have a reference direction rather than a pair of
/// face normals (kept distinct from [`find_adjacent_across_edge`], which
/// is specifically the dihedral-angle lookup of the decomposer and the
/// solid reconstructor).
pub fn find_adjacent_face(
    faces: &[Face],
    exclude_face: usize,
    edge: &Edge,
    reference_dir: &Vec3,
    normal: &Vec3,
    tol: &mapfix_math::Tolerance,
) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize, f64)> = None;
    for (fi, face) in faces.iter().enumerate() {
        if fi == exclude_face {
            continue;
        }
        for (ei, candidate) in face.edges.iter().enumerate() {
            if !candidate.is_reverse_of(edge, tol) {
                continue;
            }
            let angle = internal_angle(&candidate.vec(), reference_dir, normal);
            match best {
                Some((_, _, best_angle)) if best_angle <= angle => {}
                _ => best = Some((fi, ei, angle)),
            }
        }
    }
    best.map(|(fi, ei, _)| (fi, ei))
}

/// Group a flat list of faces into separate solids by adjacency walking.
///
/// Starting from an unvisited face, depth-first walk every edge of every
/// cycle, following [`find_adjacent_across_edge`] to the face immediately
/// across that edge, marking faces as they're reached. When the walk
/// exhausts, the marked set is one solid; repeat on whatever remains
/// unmarked. After partitioning, every edge of every face in a solid must
/// find a reverse partner within that same solid — a face with an edge
/// lacking one is an orphan and the whole partition fails with
/// [`CoreErrorKind::OrphanFace`].
pub fn partition_faces_into_solids(
    faces: Vec<Face>,
    ctx: &Context,
) -> Result<Vec<Vec<Face>>, CoreError> {
    let n = faces.len();
    let mut visited = vec![false; n];
    let mut components: Vec<Vec<usize>> = Vec::new();

    for start in 0..n {
        if visited[start] {
            continue;
        }
        let mut component = Vec::new();
        let mut stack = vec![start];
        visited[start] = true;
        while let Some(fi) = stack.pop() {
            component.push(fi);
            let normal = faces[fi].normal();
            for cycle in faces[fi].all_cycles() {
                for edge in cycle {
                    if let Some((nfi, _)) =
                        find_adjacent_across_edge(&faces, fi, edge, &normal, &ctx.tol)
                    {
                        if !visited[nfi] {
                            visited[nfi] = true;
                            stack.push(nfi);
                        }
                    }
                }
            }
        }
        components.push(component);
    }

    let mut solids: Vec<Vec<Face>> = Vec::new();
    for component in &components {
        let group: Vec<Face> = component.iter().map(|&i| faces[i].clone()).collect();
        for face in &group {
            for cycle in face.all_cycles() {
                for edge in cycle {
                    let has_partner = group.iter().any(|other| {
                        other
                            .all_cycles()
                            .any(|c| c.iter().any(|e2| e2.is_reverse_of(edge, &ctx.tol)))
                    });
                    if !has_partner {
                        return Err(CoreError::new(CoreErrorKind::OrphanFace, ctx));
                    }
                }
            }
        }
        solids.push(group);
    }
    Ok(solids)
}

#[cfg(test)]
mod tests {
    use super::*;
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

    fn square(z: f64, reverse: bool) -> Vec<Edge> {
        let pts = [
            Vec3::new(0.0, 0.0, z),
            Vec3::new(1.0, 0.0, z),
            Vec3::new(1.0, 1.0, z),
            Vec3::new(0.0, 1.0, z),
        ];
        let mut edges: Vec<Edge> = (0..4).map(|i| Edge::new(pts[i], pts[(i + 1) % 4])).collect();
        if reverse {
            edges = edges.iter().rev().map(|e| e.reversed()).collect();
        }
        edges
    }

    #[test]
    fn finds_the_reverse_edge_on_another_face() {
        let tol = mapfix_math::Tolerance::DEFAULT;
        let shared = Edge::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        let face_a = Face::new(vec![shared], texture());
        let face_b = Face::new(vec![shared.reversed()], texture());
        let faces = vec![face_a, face_b];
        let found = find_adjacent_face(
            &faces,
            0,
            &shared,
            &Vec3::new(0.0, 1.0, 0.0),
            &Vec3::new(0.0, 0.0, 1.0),
            &tol,
        );
        assert_eq!(found, Some((1, 0)));
    }

    #[test]
    fn no_partner_returns_none() {
        let tol = mapfix_math::Tolerance::DEFAULT;
        let shared = Edge::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        let face_a = Face::new(vec![shared], texture());
        let faces = vec![face_a];
        let found = find_adjacent_face(
            &faces,
            1,
            &shared,
            &Vec3::new(0.0, 1.0, 0.0),
            &Vec3::new(0.0, 0.0, 1.0),
            &tol,
        );
        assert_eq!(found, None);
    }

    /// A two-triangle "tent": each triangle's two non-shared edges are
    /// each other's reverse, closing both triangles into one well-formed
    /// (if degenerate) solid sharing all three edges pairwise.
    fn tent() -> Vec<Face> {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(1.0, 0.0, 0.0);
        let c = Vec3::new(0.5, 1.0, 0.5);
        let d = Vec3::new(0.5, -1.0, 0.5);
        let f1 = Face::new(
            vec![Edge::new(a, b), Edge::new(b, c), Edge::new(c, a)],
            texture(),
        );
        let f2 = Face::new(
            vec![Edge::new(b, a), Edge::new(a, d), Edge::new(d, b)],
            texture(),
        );
        vec![f1, f2]
    }

    #[test]
    fn partitions_two_disjoint_quads_into_two_groups() {
        let ctx = Context::default();
        let top = Face::new(square(1.0, false), texture());
        let bottom = Face::new(square(0.0, true), texture());
        let other_top = {
            let mut edges = square(1.0, false);
            for e in edges.iter_mut() {
                e.v1.x += 10.0;
                e.v2.x += 10.0;
            }
            Face::new(edges, texture())
        };
        let other_bottom = {
            let mut edges = square(0.0, true);
            for e in edges.iter_mut() {
                e.v1.x += 10.0;
                e.v2.x += 10.0;
            }
            Face::new(edges, texture())
        };
        let faces = vec![top, bottom, other_top, other_bottom];
        let groups = partition_faces_into_solids(faces, &ctx).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[1].len(), 2);
    }

    #[test]
    fn orphan_edge_fails_partition() {
        let ctx = Context::default();
        let faces = tent();
        // Remove the reverse partner of one shared edge so it's orphaned.
        let mut faces = faces;
        faces[1].edges.remove(0);
        let err = partition_faces_into_solids(faces, &ctx).unwrap_err();
        assert_eq!(err.kind, CoreErrorKind::OrphanFace);
    }
}
