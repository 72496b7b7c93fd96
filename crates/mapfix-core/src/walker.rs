//! Scene tree walk: visibility pruning, texture regeneration for
//! synthesised faces, and driving the geometry transformations over
//! every solid in the tree in a fixed order.

use crate::decompose::decompose_into_convex;
use crate::error::CoreError;
use crate::snap::snap_vertices;
use crate::tesselate::tesselate_non_planar_face;
use crate::unite::unite_coplanar_faces;
use crate::Context;
use mapfix_geo::{Face, Group, GroupChild, Solid, Texture, VisGroup};

/// Which transformations [`walk_scene`] applies, and in what combination.
/// The fixed order prune -> snap -> tesselate -> decompose -> unite is
/// not configurable; these flags only turn individual stages on or off.
#[derive(Debug, Clone, Copy)]
pub struct WalkOptions {
    /// Remove invisible subtrees before transforming anything.
    pub prune: bool,
    /// Ear-clip non-planar faces.
    pub tesselate: bool,
    /// Split non-convex solids on their most reflex plane.
    pub decompose: bool,
    /// Merge coplanar faces on convex solids.
    pub unite: bool,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            prune: true,
            tesselate: true,
            decompose: true,
            unite: true,
        }
    }
}

/// Assign a face a default trigger texture and axis-aligned projection:
/// u-axis is the first edge's direction, v-axis is `normal x uaxis`,
/// shifts 0, scale 1x1, rotation 0.
///
/// Distinct from the cap-specific default texture of the solid cutter;
/// this is the general-purpose placeholder for a face synthesised
/// outside that path which still needs *some* texture info.
pub fn generate_face_texture(face: &Face) -> Texture {
    let normal = face.normal();
    let first_dir = face.edges[0].vec();
    Texture::default_generated(&first_dir, &normal)
}

/// Is visibility group `id` visible, given the scene's declared groups?
/// Group 0 is always visible regardless of declarations.
fn group_visible(visgroups: &[VisGroup], id: i32) -> bool {
    id == 0 || visgroups.iter().any(|vg| vg.index == id && vg.visible)
}

/// Remove every group, entity, and solid in the tree whose own
/// visibility group is not visible, recursing depth-first. The root
/// group is never itself removed.
pub fn prune_invisible(map: &mut mapfix_geo::Map) {
    let visgroups = map.visgroups.clone();
    prune_group(&mut map.world, &visgroups);
}

fn prune_group(group: &mut Group, visgroups: &[VisGroup]) {
    let mut kept = Vec::with_capacity(group.children.len());
    for child in group.children.drain(..) {
        match child {
            GroupChild::Solid(solid) => {
                if group_visible(visgroups, solid.visgroup) {
                    kept.push(GroupChild::Solid(solid));
                }
            }
            GroupChild::Entity(mut entity) => {
                if group_visible(visgroups, entity.visgroup) {
                    entity
                        .solids
                        .retain(|s| group_visible(visgroups, s.visgroup));
                    kept.push(GroupChild::Entity(entity));
                }
            }
            GroupChild::Group(mut g) => {
                if group_visible(visgroups, g.visgroup) {
                    prune_group(&mut g, visgroups);
                    kept.push(GroupChild::Group(g));
                }
            }
        }
    }
    group.children = kept;
}

/// Apply every enabled transformation, in fixed order, to every solid in
/// `map`'s tree. `ctx.current_entity`/`current_brush` are updated to the
/// node being processed as the walk descends, so an error raised deep in
/// a transformation reports the right location.
///
/// A transformation failure on one solid is logged to stderr with its
/// entity/brush context and that solid is left untransformed; the walk
/// always continues to the next solid, entity, or group.
pub fn walk_scene(map: &mut mapfix_geo::Map, ctx: &mut Context, opts: &WalkOptions) {
    if opts.prune {
        prune_invisible(map);
    }
    walk_group(&mut map.world, ctx, opts);
}

fn walk_group(group: &mut Group, ctx: &mut Context, opts: &WalkOptions) {
    let mut new_children = Vec::with_capacity(group.children.len());
    for child in group.children.drain(..) {
        match child {
            GroupChild::Solid(solid) => {
                ctx.current_brush = solid.index;
                new_children.extend(apply_to_solid(solid, ctx, opts).into_iter().map(GroupChild::Solid));
            }
            GroupChild::Entity(mut entity) => {
                ctx.current_entity = entity.index;
                let mut new_solids = Vec::with_capacity(entity.solids.len());
                for solid in entity.solids.drain(..) {
                    ctx.current_brush = solid.index;
                    new_solids.extend(apply_to_solid(solid, ctx, opts));
                }
                entity.solids = new_solids;
                new_children.push(GroupChild::Entity(entity));
            }
            GroupChild::Group(mut g) => {
                walk_group(&mut g, ctx, opts);
                new_children.push(GroupChild::Group(g));
            }
        }
    }
    group.children = new_children;
}

fn apply_to_solid(solid: Solid, ctx: &Context, opts: &WalkOptions) -> Vec<Solid> {
    let fallback = solid.clone();
    match process_solid(solid, ctx, opts) {
        Ok(result) => result,
        Err(e) => {
            eprintln!(
                "warning (entity {}, brush {}): {} - leaving solid untransformed",
                e.entity, e.brush, e.kind
            );
            vec![fallback]
        }
    }
}

fn process_solid(mut solid: Solid, ctx: &Context, opts: &WalkOptions) -> Result<Vec<Solid>, CoreError> {
    snap_vertices(&mut solid);

    if opts.tesselate {
        let mut new_ears = Vec::new();
        for i in 0..solid.faces.len() {
            if !solid.faces[i].is_planar(&ctx.tol) {
                let mut face = solid.faces[i].clone();
                let output = tesselate_non_planar_face(&mut face, None, ctx)?;
                solid.faces[i] = face;
                new_ears.extend(output.faces);
            }
        }
        solid.faces.extend(new_ears);
    }

    let mut solids = if opts.decompose {
        let mut out = Vec::new();
        decompose_into_convex(solid, ctx, &mut out)?;
        out
    } else {
        vec![solid]
    };

    if opts.unite {
        for s in solids.iter_mut() {
            unite_coplanar_faces(s, ctx)?;
        }
    }

    Ok(solids)
}
