//! Reader and writer for the little-endian binary scene format.

use crate::error::IoError;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use mapfix_geo::{
    Color, Corner, Edge, Entity, EntityDef, Face, Group, GroupChild, Key, Map, Path, PathType,
    Solid, Texture, VisGroup,
};
use mapfix_math::Vec3;
use std::io::{Read, Write};

const MAGIC: &[u8; 3] = b"RMF";
const SKIPPED_PREFIX_LEN: usize = 4;

/// Read a whole scene from `r`.
///
/// Fails with [`IoError::InvalidHeader`] if the leading magic doesn't
/// read `"RMF"`, or [`IoError::PrematureInput`] if the stream ends
/// before any field's declared length is satisfied.
pub fn read_scene(r: &mut impl Read) -> Result<Map, IoError> {
    let mut prefix = [0u8; SKIPPED_PREFIX_LEN];
    r.read_exact(&mut prefix)
        .map_err(|_| IoError::PrematureInput("version prefix"))?;

    let mut magic = [0u8; 3];
    r.read_exact(&mut magic)
        .map_err(|_| IoError::PrematureInput("magic"))?;
    if &magic != MAGIC {
        return Err(IoError::InvalidHeader("magic"));
    }

    let mut map = Map::new();
    let visgroup_count = read_i32(r, "visgroup count")?;
    for _ in 0..visgroup_count {
        map.visgroups.push(read_visgroup(r)?);
    }

    let disc = read_pascal_string(r, "root discriminator", 64)?;
    if disc != "CMapWorld" {
        return Err(IoError::InvalidHeader("root discriminator"));
    }

    let (group, worldspawn, paths) = read_world_group(r)?;
    map.world = group;
    map.worldspawn = worldspawn;
    if map.worldspawn.classname != "worldspawn" {
        return Err(IoError::InvalidHeader("worldspawn classname"));
    }
    map.paths = paths;

    Ok(map)
}

fn read_world_group(r: &mut impl Read) -> Result<(Group, EntityDef, Vec<Path>), IoError> {
    let visgroup = read_i32(r, "group visgroup")?;
    let color = read_color(r)?;
    let child_count = read_i32(r, "group child count")?;
    let mut children = Vec::with_capacity(child_count.max(0) as usize);
    for _ in 0..child_count {
        children.push(read_group_child(r)?);
    }

    let worldspawn = read_entity_def(r)?;
    skip(r, 12, "root group trailing padding")?;

    let path_count = read_i32(r, "path count")?;
    let mut paths = Vec::with_capacity(path_count.max(0) as usize);
    for _ in 0..path_count {
        paths.push(read_path(r)?);
    }

    Ok((
        Group {
            visgroup,
            color,
            children,
            index: 0,
        },
        worldspawn,
        paths,
    ))
}

fn read_group_child(r: &mut impl Read) -> Result<GroupChild, IoError> {
    let disc = read_pascal_string(r, "child discriminator", 64)?;
    match disc.as_str() {
        "CMapSolid" => Ok(GroupChild::Solid(read_solid(r)?)),
        "CMapEntity" => Ok(GroupChild::Entity(read_entity(r)?)),
        "CMapGroup" => Ok(GroupChild::Group(read_group(r)?)),
        _ => Err(IoError::InvalidHeader("child discriminator")),
    }
}

fn read_group(r: &mut impl Read) -> Result<Group, IoError> {
    let visgroup = read_i32(r, "group visgroup")?;
    let color = read_color(r)?;
    let child_count = read_i32(r, "group child count")?;
    let mut children = Vec::with_capacity(child_count.max(0) as usize);
    for _ in 0..child_count {
        children.push(read_group_child(r)?);
    }
    Ok(Group {
        visgroup,
        color,
        children,
        index: 0,
    })
}

fn read_solid(r: &mut impl Read) -> Result<Solid, IoError> {
    let visgroup = read_i32(r, "solid visgroup")?;
    let color = read_color(r)?;
    skip(r, 4, "solid padding")?;
    let face_count = read_i32(r, "face count")?;
    let mut faces = Vec::with_capacity(face_count.max(0) as usize);
    for _ in 0..face_count {
        faces.push(read_face(r)?);
    }
    Ok(Solid {
        faces,
        color,
        visgroup,
        index: 0,
    })
}

fn read_face(r: &mut impl Read) -> Result<Face, IoError> {
    let name = read_fixed_string(r, 256, "texture name")?;
    skip(r, 4, "face padding")?;
    let uaxis = read_vec3(r)?;
    let ushift = read_f32(r)?;
    let vaxis = read_vec3(r)?;
    let vshift = read_f32(r)?;
    let rotation = read_f32(r)?;
    let uscale = read_f32(r)?;
    let vscale = read_f32(r)?;
    skip(r, 16, "face padding")?;

    let vertex_count = read_i32(r, "face vertex count")? as usize;
    let mut verts = Vec::with_capacity(vertex_count);
    for _ in 0..vertex_count {
        verts.push(read_vec3(r)?);
    }
    // three more plane-point vertices, redundant with the first three.
    for _ in 0..3 {
        let _ = read_vec3(r)?;
    }
    skip(r, 36, "face trailing padding")?;

    // Serialised vertices are in reverse order relative to the in-memory
    // edge cycle; un-reverse them and build the forward edge cycle.
    let mut forward = verts;
    forward.reverse();
    let n = forward.len();
    let edges: Vec<Edge> = (0..n)
        .map(|i| Edge::new(forward[i], forward[(i + 1) % n]))
        .collect();

    Ok(Face::new(
        edges,
        Texture {
            name,
            uaxis,
            ushift,
            vaxis,
            vshift,
            rotation,
            uscale,
            vscale,
        },
    ))
}

fn read_entity(r: &mut impl Read) -> Result<Entity, IoError> {
    let visgroup = read_i32(r, "entity visgroup")?;
    let color = read_color(r)?;
    let solid_count = read_i32(r, "entity solid count")?;
    let mut solids = Vec::with_capacity(solid_count.max(0) as usize);
    for _ in 0..solid_count {
        let disc = read_pascal_string(r, "entity solid discriminator", 64)?;
        if disc != "CMapSolid" {
            return Err(IoError::InvalidHeader("entity solid discriminator"));
        }
        solids.push(read_solid(r)?);
    }
    let def = read_entity_def(r)?;
    skip(r, 14, "entity padding")?;
    let location = read_vec3(r)?;
    skip(r, 4, "entity trailing padding")?;
    Ok(Entity {
        visgroup,
        color,
        solids,
        location,
        def,
        index: 0,
    })
}

fn read_entity_def(r: &mut impl Read) -> Result<EntityDef, IoError> {
    let classname = read_pascal_string(r, "classname", 128)?;
    skip(r, 4, "entity def padding")?;
    let flags = read_i32(r, "entity flags")?;
    let key_count = read_i32(r, "key count")?;
    let mut keys = Vec::with_capacity(key_count.max(0) as usize);
    for _ in 0..key_count {
        let name = read_pascal_string(r, "key name", 32)?;
        let value = read_pascal_string(r, "key value", 100)?;
        keys.push(Key { name, value });
    }
    Ok(EntityDef {
        classname,
        flags,
        keys,
    })
}

fn read_path(r: &mut impl Read) -> Result<Path, IoError> {
    let name = read_fixed_string(r, 128, "path name")?;
    let classname = read_fixed_string(r, 128, "path classname")?;
    let path_type = match read_i32(r, "path type")? {
        0 => PathType::OneWay,
        1 => PathType::Circular,
        2 => PathType::PingPong,
        _ => return Err(IoError::InvalidHeader("path type")),
    };
    let corner_count = read_i32(r, "corner count")?;
    let mut corners = Vec::with_capacity(corner_count.max(0) as usize);
    for _ in 0..corner_count {
        corners.push(read_corner(r)?);
    }
    Ok(Path {
        name,
        classname,
        path_type,
        corners,
    })
}

fn read_corner(r: &mut impl Read) -> Result<Corner, IoError> {
    let location = read_vec3(r)?;
    let index = read_i32(r, "corner index")?;
    let name = read_fixed_string(r, 128, "corner name")?;
    let key_count = read_i32(r, "corner key count")?;
    let mut keys = Vec::with_capacity(key_count.max(0) as usize);
    for _ in 0..key_count {
        let kname = read_pascal_string(r, "corner key name", 32)?;
        let kvalue = read_pascal_string(r, "corner key value", 100)?;
        keys.push(Key {
            name: kname,
            value: kvalue,
        });
    }
    Ok(Corner {
        location,
        index,
        name,
        keys,
    })
}

fn read_visgroup(r: &mut impl Read) -> Result<VisGroup, IoError> {
    let name = read_fixed_string(r, 128, "visgroup name")?;
    let color = read_color(r)?;
    let index = read_i32(r, "visgroup index")?;
    let visible = r.read_u8().map_err(|_| IoError::PrematureInput("visgroup visible"))? != 0;
    skip(r, 3, "visgroup padding")?;
    Ok(VisGroup {
        name,
        color,
        index,
        visible,
    })
}

fn read_i32(r: &mut impl Read, field: &'static str) -> Result<i32, IoError> {
    r.read_i32::<LittleEndian>()
        .map_err(|_| IoError::PrematureInput(field))
}

fn read_f32(r: &mut impl Read) -> Result<f64, IoError> {
    Ok(r.read_f32::<LittleEndian>()
        .map_err(|_| IoError::PrematureInput("float"))? as f64)
}

fn read_vec3(r: &mut impl Read) -> Result<Vec3, IoError> {
    let x = read_f32(r)?;
    let y = read_f32(r)?;
    let z = read_f32(r)?;
    Ok(Vec3::new(x, y, z))
}

fn read_color(r: &mut impl Read) -> Result<Color, IoError> {
    let mut buf = [0u8; 3];
    r.read_exact(&mut buf)
        .map_err(|_| IoError::PrematureInput("color"))?;
    Ok(Color {
        r: buf[0],
        g: buf[1],
        b: buf[2],
    })
}

fn skip(r: &mut impl Read, n: usize, field: &'static str) -> Result<(), IoError> {
    let mut buf = vec![0u8; n];
    r.read_exact(&mut buf).map_err(|_| IoError::PrematureInput(field))?;
    Ok(())
}

/// Length-byte-prefixed, null-terminated string: one length byte, then
/// that many bytes whose last byte must be the null terminator.
fn read_pascal_string(r: &mut impl Read, field: &'static str, max_len: usize) -> Result<String, IoError> {
    let len = r
        .read_u8()
        .map_err(|_| IoError::PrematureInput(field))? as usize;
    if len == 0 {
        return Ok(String::new());
    }
    if len > max_len {
        return Err(IoError::InvalidHeader(field));
    }
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf).map_err(|_| IoError::PrematureInput(field))?;
    if *buf.last().unwrap() != 0 {
        return Err(IoError::InvalidHeader(field));
    }
    Ok(String::from_utf8_lossy(&buf[..buf.len() - 1]).into_owned())
}

/// Fixed-width raw string: `width` bytes, not necessarily null-terminated
/// within that width.
fn read_fixed_string(r: &mut impl Read, width: usize, field: &'static str) -> Result<String, IoError> {
    let mut buf = vec![0u8; width];
    r.read_exact(&mut buf).map_err(|_| IoError::PrematureInput(field))?;
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    Ok(String::from_utf8_lossy(&buf[..end]).into_owned())
}

/// Write a whole scene to `w` in the binary format [`read_scene`] reads.
pub fn write_scene(w: &mut impl Write, map: &Map) -> Result<(), IoError> {
    w.write_all(&[0u8; SKIPPED_PREFIX_LEN])?;
    w.write_all(MAGIC)?;

    w.write_i32::<LittleEndian>(map.visgroups.len() as i32)?;
    for vg in &map.visgroups {
        write_visgroup(w, vg)?;
    }

    write_pascal_string(w, "CMapWorld")?;
    write_i32(w, map.world.visgroup)?;
    write_color(w, &map.world.color)?;
    write_i32(w, map.world.children.len() as i32)?;
    for child in &map.world.children {
        write_group_child(w, child)?;
    }

    write_entity_def(w, &map.worldspawn)?;
    w.write_all(&[0u8; 12])?;

    write_i32(w, map.paths.len() as i32)?;
    for path in &map.paths {
        write_path(w, path)?;
    }

    Ok(())
}

fn write_group_child(w: &mut impl Write, child: &GroupChild) -> Result<(), IoError> {
    match child {
        GroupChild::Solid(s) => {
            write_pascal_string(w, "CMapSolid")?;
            write_solid(w, s)
        }
        GroupChild::Entity(e) => {
            write_pascal_string(w, "CMapEntity")?;
            write_entity(w, e)
        }
        GroupChild::Group(g) => {
            write_pascal_string(w, "CMapGroup")?;
            write_group(w, g)
        }
    }
}

fn write_group(w: &mut impl Write, group: &Group) -> Result<(), IoError> {
    write_i32(w, group.visgroup)?;
    write_color(w, &group.color)?;
    write_i32(w, group.children.len() as i32)?;
    for child in &group.children {
        write_group_child(w, child)?;
    }
    Ok(())
}

fn write_solid(w: &mut impl Write, solid: &Solid) -> Result<(), IoError> {
    write_i32(w, solid.visgroup)?;
    write_color(w, &solid.color)?;
    w.write_all(&[0u8; 4])?;
    write_i32(w, solid.faces.len() as i32)?;
    for face in &solid.faces {
        write_face(w, face)?;
    }
    Ok(())
}

fn write_face(w: &mut impl Write, face: &Face) -> Result<(), IoError> {
    write_fixed_string(w, &face.texture.name, 256)?;
    w.write_all(&[0u8; 4])?;
    write_vec3(w, &face.texture.uaxis)?;
    write_f32(w, face.texture.ushift)?;
    write_vec3(w, &face.texture.vaxis)?;
    write_f32(w, face.texture.vshift)?;
    write_f32(w, face.texture.rotation)?;
    write_f32(w, face.texture.uscale)?;
    write_f32(w, face.texture.vscale)?;
    w.write_all(&[0u8; 16])?;

    let verts: Vec<Vec3> = face.edges.iter().map(|e| e.v1).collect();
    write_i32(w, verts.len() as i32)?;
    for v in verts.iter().rev() {
        write_vec3(w, v)?;
    }
    for v in verts.iter().rev().take(3) {
        write_vec3(w, v)?;
    }
    w.write_all(&[0u8; 36])?;
    Ok(())
}

fn write_entity(w: &mut impl Write, entity: &Entity) -> Result<(), IoError> {
    write_i32(w, entity.visgroup)?;
    write_color(w, &entity.color)?;
    write_i32(w, entity.solids.len() as i32)?;
    for solid in &entity.solids {
        write_pascal_string(w, "CMapSolid")?;
        write_solid(w, solid)?;
    }
    write_entity_def(w, &entity.def)?;
    w.write_all(&[0u8; 14])?;
    write_vec3(w, &entity.location)?;
    w.write_all(&[0u8; 4])?;
    Ok(())
}

fn write_entity_def(w: &mut impl Write, def: &EntityDef) -> Result<(), IoError> {
    write_pascal_string(w, &def.classname)?;
    w.write_all(&[0u8; 4])?;
    write_i32(w, def.flags)?;
    write_i32(w, def.keys.len() as i32)?;
    for key in &def.keys {
        write_pascal_string(w, &key.name)?;
        write_pascal_string(w, &key.value)?;
    }
    Ok(())
}

fn write_path(w: &mut impl Write, path: &Path) -> Result<(), IoError> {
    write_fixed_string(w, &path.name, 128)?;
    write_fixed_string(w, &path.classname, 128)?;
    let ty = match path.path_type {
        PathType::OneWay => 0,
        PathType::Circular => 1,
        PathType::PingPong => 2,
    };
    write_i32(w, ty)?;
    write_i32(w, path.corners.len() as i32)?;
    for corner in &path.corners {
        write_corner(w, corner)?;
    }
    Ok(())
}

fn write_corner(w: &mut impl Write, corner: &Corner) -> Result<(), IoError> {
    write_vec3(w, &corner.location)?;
    write_i32(w, corner.index)?;
    write_fixed_string(w, &corner.name, 128)?;
    write_i32(w, corner.keys.len() as i32)?;
    for key in &corner.keys {
        write_pascal_string(w, &key.name)?;
        write_pascal_string(w, &key.value)?;
    }
    Ok(())
}

fn write_visgroup(w: &mut impl Write, vg: &VisGroup) -> Result<(), IoError> {
    write_fixed_string(w, &vg.name, 128)?;
    write_color(w, &vg.color)?;
    write_i32(w, vg.index)?;
    w.write_u8(if vg.visible { 1 } else { 0 })?;
    w.write_all(&[0u8; 3])?;
    Ok(())
}

fn write_i32(w: &mut impl Write, v: i32) -> Result<(), IoError> {
    w.write_i32::<LittleEndian>(v)?;
    Ok(())
}

fn write_f32(w: &mut impl Write, v: f64) -> Result<(), IoError> {
    w.write_f32::<LittleEndian>(v as f32)?;
    Ok(())
}

fn write_vec3(w: &mut impl Write, v: &Vec3) -> Result<(), IoError> {
    write_f32(w, v.x)?;
    write_f32(w, v.y)?;
    write_f32(w, v.z)?;
    Ok(())
}

fn write_color(w: &mut impl Write, c: &Color) -> Result<(), IoError> {
    w.write_all(&[c.r, c.g, c.b])?;
    Ok(())
}

fn write_pascal_string(w: &mut impl Write, s: &str) -> Result<(), IoError> {
    let mut bytes = s.as_bytes().to_vec();
    bytes.push(0);
    w.write_u8(bytes.len() as u8)?;
    w.write_all(&bytes)?;
    Ok(())
}

fn write_fixed_string(w: &mut impl Write, s: &str, width: usize) -> Result<(), IoError> {
    let mut buf = vec![0u8; width];
    let bytes = s.as_bytes();
    let n = bytes.len().min(width);
    buf[..n].copy_from_slice(&bytes[..n]);
    w.write_all(&buf)?;
    Ok(())
}
