//! The solid cutter: split a whole solid's face set by a plane, capping
//! the cut with newly synthesised faces on each side and reconstructing
//! the (possibly several) resulting solids by face adjacency.

use crate::adjacency::partition_faces_into_solids;
use crate::error::CoreError;
use crate::facegen::generate_faces;
use crate::Context;
use mapfix_geo::predicates::point_is_on_cycle;
use mapfix_geo::{Face, Solid, Texture};
use mapfix_math::{Plane, Side};

/// Outcome of cutting one solid against a plane.
pub enum SolidSplit {
    /// The solid lay entirely in front; no split was needed.
    FrontOnly(Solid),
    /// The solid lay entirely behind; no split was needed.
    BackOnly(Solid),
    /// The solid straddled the plane; each side may itself be more than
    /// one solid if the cut disconnected a non-convex shape.
    Split(Vec<Solid>, Vec<Solid>),
}

/// Split `solid` against `cutplane`.
///
/// Each face is classified as entirely front, entirely back, coplanar
/// with the cut (a texture donor for the cap, kept in neither half), or
/// straddling (cut via [`crate::cut::split_face_by_plane`]). Each
/// source face's own front/back remainder is reassembled independently
/// via [`generate_faces`] (preserving its own texture), and the pooled
/// plane edges from every straddling face are assembled into cap faces
/// once per side, textured from whichever donor face contains the cap
/// (falling back to [`Texture::default_cap`]). The two resulting face
/// sets are each partitioned back into solids by adjacency walking.
pub fn split_solid_by_plane(
    solid: &Solid,
    cutplane: &Plane,
    ctx: &Context,
) -> Result<SolidSplit, CoreError> {
    let mut front_faces: Vec<Face> = Vec::new();
    let mut back_faces: Vec<Face> = Vec::new();
    let mut front_plane_pool = Vec::new();
    let mut back_plane_pool = Vec::new();
    let mut old_cut_front: Vec<&Face> = Vec::new();
    let mut old_cut_back: Vec<&Face> = Vec::new();

    for face in &solid.faces {
        let all_in = face
            .all_cycles()
            .flatten()
            .all(|e| e.side_of_v1(cutplane, &ctx.tol) == Side::In);
        if all_in {
            if face.normal().dot(&cutplane.normal) <= 0.0 {
                old_cut_front.push(face);
            } else {
                old_cut_back.push(face);
            }
            continue;
        }

        let sides: Vec<Side> = face
            .all_cycles()
            .flatten()
            .map(|e| e.side_of_v1(cutplane, &ctx.tol))
            .collect();
        let has_front = sides.iter().any(|s| *s == Side::Front);
        let has_back = sides.iter().any(|s| *s == Side::Back);

        if has_front && !has_back {
            front_faces.push(face.clone());
            continue;
        }
        if has_back && !has_front {
            back_faces.push(face.clone());
            continue;
        }

        let cut = crate::cut::split_face_by_plane(face, cutplane, ctx)?;
        let face_normal = face.normal();
        if !cut.front_edges.is_empty() {
            front_faces.extend(generate_faces(
                cut.front_edges,
                &face_normal,
                &face.texture,
                ctx,
            )?);
        }
        if !cut.back_edges.is_empty() {
            back_faces.extend(generate_faces(
                cut.back_edges,
                &face_normal,
                &face.texture,
                ctx,
            )?);
        }
        front_plane_pool.extend(cut.front_plane_edges);
        back_plane_pool.extend(cut.back_plane_edges);
    }

    if front_faces.is_empty() && front_plane_pool.is_empty() {
        return Ok(SolidSplit::BackOnly(rebuild(solid, back_faces)));
    }
    if back_faces.is_empty() && back_plane_pool.is_empty() {
        return Ok(SolidSplit::FrontOnly(rebuild(solid, front_faces)));
    }

    if !front_plane_pool.is_empty() {
        let front_normal = -cutplane.normal;
        let placeholder = Texture::default_cap(&front_plane_pool[0].vec(), &front_normal);
        let caps = generate_faces(front_plane_pool, &front_normal, &placeholder, ctx)?;
        for mut cap in caps {
            if let Some(tex) = find_texture(&cap, &old_cut_front, ctx) {
                cap.texture = tex;
            } else if !cap.edges.is_empty() {
                cap.texture = Texture::default_cap(&cap.edges[0].vec(), &front_normal);
            }
            front_faces.push(cap);
        }
    }
    if !back_plane_pool.is_empty() {
        let back_normal = cutplane.normal;
        let placeholder = Texture::default_cap(&back_plane_pool[0].vec(), &back_normal);
        let caps = generate_faces(back_plane_pool, &back_normal, &placeholder, ctx)?;
        for mut cap in caps {
            if let Some(tex) = find_texture(&cap, &old_cut_back, ctx) {
                cap.texture = tex;
            } else if !cap.edges.is_empty() {
                cap.texture = Texture::default_cap(&cap.edges[0].vec(), &back_normal);
            }
            back_faces.push(cap);
        }
    }

    let fronts = partition_faces_into_solids(front_faces, ctx)?
        .into_iter()
        .map(|faces| rebuild(solid, faces))
        .collect();
    let backs = partition_faces_into_solids(back_faces, ctx)?
        .into_iter()
        .map(|faces| rebuild(solid, faces))
        .collect();

    Ok(SolidSplit::Split(fronts, backs))
}

fn rebuild(solid: &Solid, faces: Vec<Face>) -> Solid {
    Solid {
        faces,
        color: solid.color,
        visgroup: solid.visgroup,
        index: solid.index,
    }
}

/// Pick the first donor face among `donors` that either has every vertex
/// of its outer cycle on the boundary of `cap`, or has some vertex
/// strictly inside `cap`; copy its texture. Warns (by returning the
/// first match rather than erroring) when more than one donor matches
/// with a different texture, per the source tool's deterministic
/// first-seen-donor-wins rule.
fn find_texture(cap: &Face, donors: &[&Face], ctx: &Context) -> Option<Texture> {
    let mut chosen: Option<&Texture> = None;
    for donor in donors {
        if !donor.plane().equals_unoriented(&cap.plane(), &ctx.tol) {
            continue;
        }
        let fully_on_boundary = donor
            .edges
            .iter()
            .all(|e| point_is_on_cycle(&e.v1, &cap.edges, &ctx.tol));
        let has_interior = donor
            .edges
            .iter()
            .any(|e| cap.contains_point(&e.v1, &ctx.tol));
        if fully_on_boundary || has_interior {
            match chosen {
                None => chosen = Some(&donor.texture),
                Some(existing) if *existing != donor.texture => {
                    eprintln!(
                        "warning (entity {}, brush {}): cap face has multiple texture donors with different textures; keeping the first",
                        ctx.current_entity, ctx.current_brush
                    );
                }
                _ => {}
            }
        }
    }
    chosen.cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapfix_geo::{Color, Edge};
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

    fn unit_cube() -> Solid {
        let side = |axis: usize, at: f64, flip: bool| -> Vec<Edge> {
            let mut pts = Vec::new();
            for &(u, v) in &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
                let mut p = Vec3::new(0.0, 0.0, 0.0);
                let others: Vec<usize> = (0..3).filter(|&a| a != axis).collect();
                p[axis] = at;
                p[others[0]] = u;
                p[others[1]] = v;
                pts.push(p);
            }
            let mut edges: Vec<Edge> = (0..4).map(|i| Edge::new(pts[i], pts[(i + 1) % 4])).collect();
            if flip {
                edges = edges.iter().rev().map(|e| e.reversed()).collect();
            }
            edges
        };
        Solid {
            faces: vec![
                Face::new(side(2, 0.0, true), texture()),
                Face::new(side(2, 1.0, false), texture()),
                Face::new(side(1, 0.0, false), texture()),
                Face::new(side(1, 1.0, true), texture()),
                Face::new(side(0, 0.0, true), texture()),
                Face::new(side(0, 1.0, false), texture()),
            ],
            color: Color { r: 1, g: 1, b: 1 },
            visgroup: 0,
            index: 0,
        }
    }

    #[test]
    fn solid_entirely_in_front_is_not_split() {
        let ctx = Context::default();
        let solid = unit_cube();
        let cutplane = Plane::new(Vec3::new(0.0, 0.0, -1.0), -10.0);
        match split_solid_by_plane(&solid, &cutplane, &ctx).unwrap() {
            SolidSplit::FrontOnly(s) => assert_eq!(s.faces.len(), 6),
            _ => panic!("expected FrontOnly"),
        }
    }

    #[test]
    fn solid_straddling_the_plane_splits_into_two_closed_pieces() {
        let ctx = Context::default();
        let solid = unit_cube();
        let cutplane = Plane::new(Vec3::new(0.0, 0.0, -1.0), 0.5);
        match split_solid_by_plane(&solid, &cutplane, &ctx).unwrap() {
            SolidSplit::Split(fronts, backs) => {
                assert_eq!(fronts.len(), 1);
                assert_eq!(backs.len(), 1);
                assert!(fronts[0].is_well_formed(&ctx.tol));
                assert!(backs[0].is_well_formed(&ctx.tol));
            }
            _ => panic!("expected Split"),
        }
    }
}
