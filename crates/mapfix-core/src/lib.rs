#![warn(missing_docs)]

//! The geometry-repair engine: cycle assembly, face and solid cutting,
//! convex decomposition, ear-clipping tesselation, coplanar face union,
//! and the scene walker that drives all of them over a brush tree.

mod adjacency;
mod context;
mod cut;
mod cycle;
mod decompose;
mod error;
mod facegen;
mod snap;
mod solidcut;
mod tesselate;
mod unite;
mod walker;

pub use adjacency::{find_adjacent_across_edge, find_adjacent_face, partition_faces_into_solids};
pub use context::Context;
pub use cut::{split_face_by_plane, FaceCutResult};
pub use cycle::assemble_cycle;
pub use decompose::{decompose_into_convex, is_convex};
pub use error::{CoreError, CoreErrorKind};
pub use facegen::generate_faces;
pub use snap::snap_vertices;
pub use solidcut::{split_solid_by_plane, SolidSplit};
pub use tesselate::{tesselate_non_planar_face, TesselationOutput};
pub use unite::unite_coplanar_faces;
pub use walker::{generate_face_texture, prune_invisible, walk_scene, WalkOptions};
