//! Vertex snapping: heal sub-epsilon drift between coordinates that are
//! meant to be identical, using a fixed tolerance independent of `ε`.

use mapfix_geo::Solid;
use mapfix_math::{Vec3, SNAP_TOLERANCE};

/// Snap vertices within `solid` directionally by face order: for every
/// later face's edge endpoint, if it differs from some earlier face's
/// edge endpoint by less than [`SNAP_TOLERANCE`] in every coordinate,
/// overwrite the later endpoint with the earlier one in place.
///
/// This is not symmetric (later faces move to match earlier ones, never
/// the reverse) and not applied across solids; the scene walker brings
/// sibling solids into alignment by running this over a flattened solid
/// list in tree order, not by this function reaching across solid
/// boundaries itself.
pub fn snap_vertices(solid: &mut Solid) {
    let n = solid.faces.len();
    for later in 1..n {
        for earlier in 0..later {
            let anchors: Vec<Vec3> = solid.faces[earlier]
                .all_cycles()
                .flatten()
                .flat_map(|e| [e.v1, e.v2])
                .collect();
            for cycle in solid.faces[later].all_cycles_mut() {
                for edge in cycle.iter_mut() {
                    if let Some(anchor) = anchors.iter().find(|a| within_snap(a, &edge.v1)) {
                        edge.v1 = *anchor;
                    }
                    if let Some(anchor) = anchors.iter().find(|a| within_snap(a, &edge.v2)) {
                        edge.v2 = *anchor;
                    }
                }
            }
        }
    }
}

fn within_snap(a: &Vec3, b: &Vec3) -> bool {
    (a.x - b.x).abs() < SNAP_TOLERANCE && (a.y - b.y).abs() < SNAP_TOLERANCE && (a.z - b.z).abs() < SNAP_TOLERANCE
}
