use crate::{Color, Solid};
use mapfix_math::Vec3;

/// A single key/value pair attached to an entity, corner, or path.
#[derive(Debug, Clone, PartialEq)]
pub struct Key {
    /// Key name.
    pub name: String,
    /// Key value.
    pub value: String,
}

/// An entity's classname, spawn flags, and custom key/value data.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntityDef {
    /// Entity classname (e.g. `"worldspawn"`, `"light"`).
    pub classname: String,
    /// Spawn flags bitmask.
    pub flags: i32,
    /// Custom key/value pairs.
    pub keys: Vec<Key>,
}

/// A point entity or brush entity: a classname/keys definition, solids,
/// and (for point entities) a location.
#[derive(Debug, Clone)]
pub struct Entity {
    /// Visibility-group identifier.
    pub visgroup: i32,
    /// Display color.
    pub color: Color,
    /// Brushes owned by this entity (empty for a pure point entity).
    pub solids: Vec<Solid>,
    /// Point-entity location (meaningful only when `solids` is empty).
    pub location: Vec3,
    /// Classname, flags, and keys.
    pub def: EntityDef,
    /// Debug-only index.
    pub index: i32,
}

/// A declared visibility group.
#[derive(Debug, Clone, PartialEq)]
pub struct VisGroup {
    /// Display name.
    pub name: String,
    /// Display color.
    pub color: Color,
    /// Debug-only index.
    pub index: i32,
    /// Whether members of this group are shown.
    pub visible: bool,
}

/// One waypoint of a [`Path`].
#[derive(Debug, Clone)]
pub struct Corner {
    /// World position.
    pub location: Vec3,
    /// Debug-only index.
    pub index: i32,
    /// Explicit name, if the corner was given one in the editor.
    pub name: String,
    /// Custom key/value pairs.
    pub keys: Vec<Key>,
}

/// How a path's corners are linked into `target`/`targetname` chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathType {
    /// Forward chain; the last corner has no `target`.
    OneWay,
    /// Forward chain; the last corner targets the first, closing the loop.
    Circular,
    /// Forward chain, then back down through the corners in reverse.
    PingPong,
}

/// A sequence of corners exported as chained point entities.
#[derive(Debug, Clone)]
pub struct Path {
    /// Path name, used to derive corner `targetname`s.
    pub name: String,
    /// Classname given to every expanded corner entity.
    pub classname: String,
    /// Linking behavior.
    pub path_type: PathType,
    /// Waypoints in path order.
    pub corners: Vec<Corner>,
}

/// A child of a [`Group`].
#[derive(Debug, Clone)]
pub enum GroupChild {
    /// A standalone brush.
    Solid(Solid),
    /// A point or brush entity.
    Entity(Entity),
    /// A nested group.
    Group(Group),
}

/// A node in the scene tree: a container of child groups, entities, and
/// solids.
#[derive(Debug, Clone)]
pub struct Group {
    /// Visibility-group identifier.
    pub visgroup: i32,
    /// Display color.
    pub color: Color,
    /// Children in declaration order.
    pub children: Vec<GroupChild>,
    /// Debug-only index.
    pub index: i32,
}

impl Group {
    /// An empty group.
    pub fn new(index: i32) -> Self {
        Self {
            visgroup: 0,
            color: Color::default(),
            children: Vec::new(),
            index,
        }
    }
}

/// The whole scene: the world group tree, its `worldspawn` definition,
/// visibility groups, paths, and (serialization-only) wad file list.
#[derive(Debug, Clone)]
pub struct Map {
    /// Declared visibility groups.
    pub visgroups: Vec<VisGroup>,
    /// The root group. Its own `children` are the top-level solids,
    /// entities, and subgroups.
    pub world: Group,
    /// The root entity definition; classname must read `"worldspawn"`.
    pub worldspawn: EntityDef,
    /// Path definitions.
    pub paths: Vec<Path>,
    /// Wad file paths, carried through for the textual writer's `"wad"` key.
    pub wads: Vec<String>,
}

impl Map {
    /// An empty scene with an empty `worldspawn`.
    pub fn new() -> Self {
        Self {
            visgroups: Vec::new(),
            world: Group::new(0),
            worldspawn: EntityDef {
                classname: "worldspawn".to_string(),
                flags: 0,
                keys: Vec::new(),
            },
            paths: Vec::new(),
            wads: Vec::new(),
        }
    }

    /// Is this visibility group (by id) marked visible, or is it the
    /// always-visible group 0?
    pub fn visgroup_is_visible(&self, id: i32) -> bool {
        id == 0
            || self
                .visgroups
                .iter()
                .any(|vg| vg.index == id && vg.visible)
    }
}

impl Default for Map {
    fn default() -> Self {
        Self::new()
    }
}
