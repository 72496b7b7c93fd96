//! Coplanar face union: merge faces on a convex solid that share a plane.

use crate::error::CoreError;
use crate::facegen::generate_faces;
use crate::Context;
use mapfix_geo::{Edge, Face};

/// Merge all sets of coplanar faces on `solid`'s face list into single
/// faces, in place. Invoked only on convex solids, once per solid.
///
/// For each face not yet consumed by an earlier union in this pass,
/// gather every other not-yet-visited face coplanar with it (same plane,
/// same orientation), pool every edge of the whole group, and cancel
/// reverse-edge pairs until none remain. If nothing ever cancelled
/// (the "coplanar" faces turn out to share no edge), the group is left
/// untouched. Otherwise the remaining pool is reassembled via
/// [`generate_faces`] — inheriting the triggering face's texture — and
/// each rebuilt face has its consecutive collinear edges merged.
///
/// If the consumed faces disagreed on texture, a warning is printed
/// (never aborts) and the triggering face's texture wins.
pub fn unite_coplanar_faces(solid: &mut mapfix_geo::Solid, ctx: &Context) -> Result<(), CoreError> {
    let mut visited = vec![false; solid.faces.len()];
    let mut rebuilt: Vec<Face> = Vec::new();

    for i in 0..solid.faces.len() {
        if visited[i] {
            continue;
        }
        visited[i] = true;
        let plane = solid.faces[i].plane();
        let normal = solid.faces[i].normal();

        let mut group_indices = vec![i];
        for j in (i + 1)..solid.faces.len() {
            if visited[j] {
                continue;
            }
            let other = &solid.faces[j];
            if other.plane().equals_unoriented(&plane, &ctx.tol) && other.normal().dot(&normal) > 0.0
            {
                visited[j] = true;
                group_indices.push(j);
            }
        }

        if group_indices.len() == 1 {
            rebuilt.push(solid.faces[i].clone());
            continue;
        }

        let mut pool: Vec<Edge> = Vec::new();
        let mut mixed_textures = false;
        let trigger_texture = solid.faces[i].texture.clone();
        for &idx in &group_indices {
            let f = &solid.faces[idx];
            if f.texture != trigger_texture {
                mixed_textures = true;
            }
            for cycle in f.all_cycles() {
                pool.extend(cycle.iter().copied());
            }
        }

        let cancelled = cancel_reverse_pairs(&mut pool, ctx);
        if !cancelled {
            for &idx in &group_indices {
                rebuilt.push(solid.faces[idx].clone());
            }
            continue;
        }

        if mixed_textures {
            eprintln!(
                "warning (entity {}, brush {}): united faces had mixed textures; keeping the first",
                ctx.current_entity, ctx.current_brush
            );
        }

        let mut faces = generate_faces(pool, &normal, &trigger_texture, ctx)?;
        for face in faces.iter_mut() {
            merge_collinear_edges(&mut face.edges, ctx);
            for hole in face.inner_edges.iter_mut() {
                merge_collinear_edges(hole, ctx);
            }
        }
        rebuilt.extend(faces);
    }

    solid.faces = rebuilt;
    Ok(())
}

/// Repeatedly find and remove any two edges in `pool` that are reverses
/// of each other. Returns whether any pair was ever cancelled.
fn cancel_reverse_pairs(pool: &mut Vec<Edge>, ctx: &Context) -> bool {
    let mut any = false;
    loop {
        let mut found = None;
        'search: for a in 0..pool.len() {
            for b in (a + 1)..pool.len() {
                if pool[a].is_reverse_of(&pool[b], &ctx.tol) {
                    found = Some((a, b));
                    break 'search;
                }
            }
        }
        match found {
            Some((a, b)) => {
                pool.remove(b);
                pool.remove(a);
                any = true;
            }
            None => break,
        }
    }
    any
}

/// Merge consecutive collinear edges within one cycle: while the edge
/// following `ie` is collinear with it, splice `ie.v2 := following.v2`
/// and drop `following`.
fn merge_collinear_edges(cycle: &mut Vec<Edge>, ctx: &Context) {
    let mut i = 0;
    while cycle.len() > 1 && i < cycle.len() {
        let next = (i + 1) % cycle.len();
        if next == i {
            break;
        }
        if cycle[i].is_collinear_with(&cycle[next], &ctx.tol) {
            let new_v2 = cycle[next].v2;
            cycle[i].v2 = new_v2;
            cycle.remove(next);
            if next < i {
                i -= 1;
            }
            continue;
        }
        i += 1;
    }
}
