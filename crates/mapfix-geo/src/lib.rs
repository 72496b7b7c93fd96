#![warn(missing_docs)]

//! Edge/face/solid data model and group/entity/solid scene tree for
//! brush geometry repair, plus the geometric predicates that operate on
//! them.

mod edge;
mod face;
pub mod predicates;
mod scene;
mod solid;

pub use edge::Edge;
pub use face::{Face, Texture};
pub use scene::{Corner, Entity, EntityDef, Group, GroupChild, Key, Map, Path, PathType, VisGroup};
pub use solid::{Color, Solid};
