//! Face-set synthesis: turn a pool of cut edges into faces with their
//! inner cycles (holes) correctly nested under an outer cycle.

use crate::cycle::assemble_cycle;
use crate::error::{CoreError, CoreErrorKind};
use crate::Context;
use mapfix_geo::predicates::{cycle_normal, point_in_cycle, point_is_on_cycle};
use mapfix_geo::{Edge, Face, Texture};
use mapfix_math::Vec3;

/// Consume `pool`, assembling it into faces oriented along `normal`.
///
/// Runs [`assemble_cycle`] until the pool is empty. Cycles of two edges
/// or fewer are discarded as degenerate. Remaining cycles are split into
/// outer cycles (normal agrees with `normal`) and inner cycles/holes
/// (normal opposes it); each hole is attached to the first outer cycle
/// found (in production order) whose boundary contains its first vertex
/// — on the boundary counts as containing, not just strictly interior —
/// failing with [`CoreErrorKind::OrphanInnerCycle`] if none does.
pub fn generate_faces(
    mut pool: Vec<Edge>,
    normal: &Vec3,
    texture: &Texture,
    ctx: &Context,
) -> Result<Vec<Face>, CoreError> {
    let mut cycles: Vec<Vec<Edge>> = Vec::new();
    while !pool.is_empty() {
        let cycle = assemble_cycle(&mut pool, normal, ctx)?;
        if cycle.len() > 2 {
            cycles.push(cycle);
        }
    }

    let mut outer: Vec<Face> = Vec::new();
    let mut holes: Vec<Vec<Edge>> = Vec::new();
    for cycle in cycles {
        if cycle_normal(&cycle).dot(normal) > 0.0 {
            outer.push(Face::new(cycle, texture.clone()));
        } else {
            holes.push(cycle);
        }
    }

    for hole in holes {
        let first_v = hole[0].v1;
        let mut attached = false;
        for face in outer.iter_mut() {
            let contained = point_in_cycle(&first_v, &face.edges, normal, &ctx.tol)
                || point_is_on_cycle(&first_v, &face.edges, &ctx.tol);
            if contained {
                face.inner_edges.push(hole);
                attached = true;
                break;
            }
        }
        if !attached {
            return Err(CoreError::new(CoreErrorKind::OrphanInnerCycle, ctx));
        }
    }

    Ok(outer)
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

    fn square_ccw(z: f64) -> Vec<Edge> {
        vec![
            Edge::new(Vec3::new(0.0, 0.0, z), Vec3::new(1.0, 0.0, z)),
            Edge::new(Vec3::new(1.0, 0.0, z), Vec3::new(1.0, 1.0, z)),
            Edge::new(Vec3::new(1.0, 1.0, z), Vec3::new(0.0, 1.0, z)),
            Edge::new(Vec3::new(0.0, 1.0, z), Vec3::new(0.0, 0.0, z)),
        ]
    }

    #[test]
    fn single_outer_cycle_becomes_one_face() {
        let ctx = Context::default();
        let normal = Vec3::new(0.0, 0.0, 1.0);
        let faces = generate_faces(square_ccw(0.0), &normal, &texture(), &ctx).unwrap();
        assert_eq!(faces.len(), 1);
        assert!(faces[0].inner_edges.is_empty());
    }

    #[test]
    fn inner_cycle_attaches_as_a_hole() {
        let ctx = Context::default();
        let normal = Vec3::new(0.0, 0.0, 1.0);
        let mut pool = square_ccw(0.0);
        // a small square hole, wound opposite (normal dot < 0)
        let hole_ccw: Vec<Edge> = vec![
            Edge::new(Vec3::new(0.4, 0.4, 0.0), Vec3::new(0.4, 0.6, 0.0)),
            Edge::new(Vec3::new(0.4, 0.6, 0.0), Vec3::new(0.6, 0.6, 0.0)),
            Edge::new(Vec3::new(0.6, 0.6, 0.0), Vec3::new(0.6, 0.4, 0.0)),
            Edge::new(Vec3::new(0.6, 0.4, 0.0), Vec3::new(0.4, 0.4, 0.0)),
        ];
        let hole_cw: Vec<Edge> = hole_ccw.iter().rev().map(|e| e.reversed()).collect();
        pool.extend(hole_cw);
        let faces = generate_faces(pool, &normal, &texture(), &ctx).unwrap();
        assert_eq!(faces.len(), 1);
        assert_eq!(faces[0].inner_edges.len(), 1);
    }

    #[test]
    fn hole_touching_the_outer_boundary_still_attaches() {
        let ctx = Context::default();
        let normal = Vec3::new(0.0, 0.0, 1.0);
        let mut pool = square_ccw(0.0);
        // a hole whose first vertex sits exactly on the outer cycle's
        // x=1 edge, wound opposite the outer cycle (normal dot < 0).
        let hole = vec![
            Edge::new(Vec3::new(1.0, 0.5, 0.0), Vec3::new(0.7, 0.5, 0.0)),
            Edge::new(Vec3::new(0.7, 0.5, 0.0), Vec3::new(0.7, 0.7, 0.0)),
            Edge::new(Vec3::new(0.7, 0.7, 0.0), Vec3::new(1.0, 0.7, 0.0)),
            Edge::new(Vec3::new(1.0, 0.7, 0.0), Vec3::new(1.0, 0.5, 0.0)),
        ];
        pool.extend(hole);
        let faces = generate_faces(pool, &normal, &texture(), &ctx).unwrap();
        assert_eq!(faces.len(), 1);
        assert_eq!(faces[0].inner_edges.len(), 1);
    }

    #[test]
    fn orphan_hole_fails() {
        let ctx = Context::default();
        let normal = Vec3::new(0.0, 0.0, 1.0);
        // Only the hole cycle, no outer cycle to contain it.
        let hole_ccw: Vec<Edge> = vec![
            Edge::new(Vec3::new(0.4, 0.4, 0.0), Vec3::new(0.4, 0.6, 0.0)),
            Edge::new(Vec3::new(0.4, 0.6, 0.0), Vec3::new(0.6, 0.6, 0.0)),
            Edge::new(Vec3::new(0.6, 0.6, 0.0), Vec3::new(0.6, 0.4, 0.0)),
            Edge::new(Vec3::new(0.6, 0.4, 0.0), Vec3::new(0.4, 0.4, 0.0)),
        ];
        let hole_cw: Vec<Edge> = hole_ccw.iter().rev().map(|e| e.reversed()).collect();
        let err = generate_faces(hole_cw, &normal, &texture(), &ctx).unwrap_err();
        assert_eq!(err.kind, CoreErrorKind::OrphanInnerCycle);
    }
}
