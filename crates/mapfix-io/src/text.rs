//! Writer for the textual, brace-delimited "map" format.

use crate::error::IoError;
use mapfix_geo::{Entity, Face, Group, GroupChild, Map, Path, PathType, Solid};
use std::io::Write;

/// Texture projection form used when writing faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionForm {
    /// `[ux uy uz ushift] [vx vy vz vshift] rot uscale vscale`.
    Modern220,
    /// `ushift vshift flagbits uscale vscale`.
    Legacy100,
}

/// Write `map` as a textual map file to `w`.
///
/// Worldspawn keys, then the root group's solids (depth-first: child
/// groups first, their own entities deferred to the very end), then
/// every non-root entity collected along the way, each its own brace
/// block. Path definitions are expanded into chained corner entities.
pub fn write_map(w: &mut impl Write, map: &Map, form: ProjectionForm) -> Result<(), IoError> {
    writeln!(w, "{{")?;
    writeln!(w, "\"mapversion\" \"220\"")?;
    if !map.wads.is_empty() {
        writeln!(w, "\"wad\" \"{}\"", map.wads.join(";"))?;
    }
    writeln!(w, "\"classname\" \"worldspawn\"")?;
    if map.worldspawn.flags != 0 {
        writeln!(w, "\"spawnflags\" \"{}\"", map.worldspawn.flags)?;
    }
    for key in &map.worldspawn.keys {
        writeln!(w, "\"{}\" \"{}\"", key.name, key.value)?;
    }

    let mut deferred_entities: Vec<&Entity> = Vec::new();
    write_group_solids(w, &map.world, form, &mut deferred_entities)?;
    writeln!(w, "}}")?;

    for entity in deferred_entities {
        write_entity_block(w, entity, form)?;
    }

    for path in &map.paths {
        write_expanded_path(w, path)?;
    }

    Ok(())
}

/// Depth-first: recurse into child groups first (writing their solids
/// inline into the current brace block), collecting that group's own
/// entities into `deferred` rather than writing them immediately, then
/// write this group's own directly-owned solids.
fn write_group_solids<'a>(
    w: &mut impl Write,
    group: &'a Group,
    form: ProjectionForm,
    deferred: &mut Vec<&'a Entity>,
) -> Result<(), IoError> {
    let mut own_solids = Vec::new();
    for child in &group.children {
        match child {
            GroupChild::Group(g) => write_group_solids(w, g, form, deferred)?,
            GroupChild::Entity(e) => deferred.push(e),
            GroupChild::Solid(s) => own_solids.push(s),
        }
    }
    for solid in own_solids {
        write_solid_block(w, solid, form)?;
    }
    Ok(())
}

fn write_entity_block(w: &mut impl Write, entity: &Entity, form: ProjectionForm) -> Result<(), IoError> {
    writeln!(w, "{{")?;
    writeln!(w, "\"classname\" \"{}\"", entity.def.classname)?;
    if entity.def.flags != 0 {
        writeln!(w, "\"spawnflags\" \"{}\"", entity.def.flags)?;
    }
    for key in &entity.def.keys {
        writeln!(w, "\"{}\" \"{}\"", key.name, key.value)?;
    }
    if entity.solids.is_empty() {
        writeln!(
            w,
            "\"origin\" \"{} {} {}\"",
            entity.location.x, entity.location.y, entity.location.z
        )?;
    } else {
        for solid in &entity.solids {
            write_solid_block(w, solid, form)?;
        }
    }
    writeln!(w, "}}")?;
    Ok(())
}

fn write_solid_block(w: &mut impl Write, solid: &Solid, form: ProjectionForm) -> Result<(), IoError> {
    writeln!(w, "{{")?;
    for face in &solid.faces {
        write_face_line(w, face, form)?;
    }
    writeln!(w, "}}")?;
    Ok(())
}

fn write_face_line(w: &mut impl Write, face: &Face, form: ProjectionForm) -> Result<(), IoError> {
    let rev: Vec<_> = face.edges.iter().rev().take(3).map(|e| e.v1).collect();
    if rev.len() < 3 {
        return Err(IoError::InvalidHeader("face with fewer than 3 vertices"));
    }
    write!(
        w,
        "( {} {} {} ) ( {} {} {} ) ( {} {} {} ) {} ",
        rev[0].x, rev[0].y, rev[0].z,
        rev[1].x, rev[1].y, rev[1].z,
        rev[2].x, rev[2].y, rev[2].z,
        face.texture.name,
    )?;
    match form {
        ProjectionForm::Modern220 => {
            writeln!(
                w,
                "[ {} {} {} {} ] [ {} {} {} {} ] {} {} {}",
                face.texture.uaxis.x, face.texture.uaxis.y, face.texture.uaxis.z, face.texture.ushift,
                face.texture.vaxis.x, face.texture.vaxis.y, face.texture.vaxis.z, face.texture.vshift,
                face.texture.rotation, face.texture.uscale, face.texture.vscale,
            )?;
        }
        ProjectionForm::Legacy100 => {
            let flags = legacy_flags(face)?;
            if face.texture.ushift % 16.0 != 0.0 || face.texture.vshift % 16.0 != 0.0 {
                return Err(IoError::UnsupportedTextureForLegacyMap);
            }
            writeln!(
                w,
                "{} {} {} {} {}",
                face.texture.ushift, face.texture.vshift, flags, face.texture.uscale, face.texture.vscale,
            )?;
        }
    }
    Ok(())
}

/// Flag bit 1 = u-scale was negative, bit 2 = v-scale was negative, both
/// set -> 7. Fails if the axes aren't an orthonormal pair consistent
/// with the face's normal.
fn legacy_flags(face: &Face) -> Result<u32, IoError> {
    let normal = face.normal();
    let u = face.texture.uaxis;
    let v = face.texture.vaxis;
    let orthonormal = (u.norm() - 1.0).abs() < 1e-3
        && (v.norm() - 1.0).abs() < 1e-3
        && u.dot(&v).abs() < 1e-3
        && (u.cross(&v).normalize() - normal.normalize()).norm() < 1e-2;
    if !orthonormal {
        return Err(IoError::UnsupportedTextureForLegacyMap);
    }
    let mut flags = 0u32;
    if face.texture.uscale < 0.0 {
        flags |= 1;
    }
    if face.texture.vscale < 0.0 {
        flags |= 2;
    }
    Ok(flags)
}

/// Expand one path into chained point entities: consecutive corners
/// linked by `<name><NN>` target chains (zero-padded to two digits,
/// or the corner's own explicit name), closing the loop for a circular
/// path and doubling back for a ping-pong path.
fn write_expanded_path(w: &mut impl Write, path: &Path) -> Result<(), IoError> {
    let n = path.corners.len();
    if n == 0 {
        return Ok(());
    }

    let name_of = |i: usize| -> String {
        let corner = &path.corners[i];
        if !corner.name.is_empty() {
            corner.name.clone()
        } else {
            format!("{}{:02}", path.name, i)
        }
    };

    // The walk order: forward through every corner once, and for a
    // ping-pong path back down through the interior corners to the
    // first one, which is re-emitted (without a further target) to
    // close the chain.
    let sequence: Vec<usize> = match path.path_type {
        PathType::OneWay | PathType::Circular => (0..n).collect(),
        PathType::PingPong => {
            let mut seq: Vec<usize> = (0..n).collect();
            seq.extend((0..n).rev().skip(1));
            seq.push(0);
            seq
        }
    };

    for (step, &i) in sequence.iter().enumerate() {
        let corner = &path.corners[i];
        writeln!(w, "{{")?;
        writeln!(w, "\"classname\" \"{}\"", path.classname)?;
        writeln!(w, "\"targetname\" \"{}\"", name_of(i))?;
        writeln!(
            w,
            "\"origin\" \"{} {} {}\"",
            corner.location.x, corner.location.y, corner.location.z
        )?;
        for key in &corner.keys {
            writeln!(w, "\"{}\" \"{}\"", key.name, key.value)?;
        }

        let is_last = step + 1 == sequence.len();
        let target = match path.path_type {
            PathType::OneWay if is_last => None,
            PathType::PingPong if is_last => None,
            PathType::Circular if is_last => Some(name_of(sequence[0])),
            _ => Some(name_of(sequence[step + 1])),
        };
        if let Some(target) = target {
            writeln!(w, "\"target\" \"{}\"", target)?;
        }
        writeln!(w, "}}")?;
    }
    Ok(())
}
