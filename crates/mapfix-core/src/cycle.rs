//! Cycle assembly: pull one closed edge cycle out of an unordered pool.

use crate::error::{CoreError, CoreErrorKind};
use crate::Context;
use mapfix_geo::Edge;
use mapfix_math::{internal_angle, Vec3};

/// Pull a single closed cycle out of `pool`, removing its edges, and
/// leaving whatever remains for further calls.
///
/// Starts from `pool`'s first edge. Repeatedly looks among the
/// remaining edges for those whose tail matches the current cycle
/// head, and of those picks the one minimising
/// [`internal_angle`] against the current edge's reverse direction
/// (the smallest left turn). Fails with [`CoreErrorKind::IncompleteCycle`]
/// if no continuation is ever found before the cycle can close.
pub fn assemble_cycle(
    pool: &mut Vec<Edge>,
    normal: &Vec3,
    ctx: &Context,
) -> Result<Vec<Edge>, CoreError> {
    assert!(!pool.is_empty(), "assemble_cycle called on an empty pool");

    let start = pool.remove(0);
    let start_v1 = start.v1;
    let mut head = start.v2;
    let mut cycle = vec![start];

    loop {
        if ctx.tol.vec_eq(&head, &start_v1) {
            break;
        }

        let mut best: Option<(usize, f64)> = None;
        for (i, candidate) in pool.iter().enumerate() {
            if !ctx.tol.vec_eq(&candidate.v1, &head) {
                continue;
            }
            let prev = cycle.last().unwrap();
            let angle = internal_angle(&candidate.vec(), &prev.rvec(), normal);
            match best {
                Some((_, best_angle)) if best_angle <= angle => {}
                _ => best = Some((i, angle)),
            }
        }

        let Some((idx, _)) = best else {
            return Err(CoreError::new(CoreErrorKind::IncompleteCycle, ctx));
        };

        let next = pool.remove(idx);
        head = next.v2;
        cycle.push(next);
    }

    Ok(cycle)
}
