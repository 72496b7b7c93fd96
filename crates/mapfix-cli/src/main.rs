//! mapfix CLI - repairs and normalizes brush geometry in a scene file.
//!
//! Reads a binary scene file, runs the geometry-repair engine's scene
//! walker over it, and writes either a repaired binary scene or a
//! textual map file.

use anyhow::{bail, Context as _, Result};
use clap::Parser;
use mapfix_core::{walk_scene, Context, WalkOptions};
use mapfix_io::{read_scene, write_map, write_scene, ProjectionForm};
use mapfix_math::Tolerance;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

const DEFAULT_WADLIST: &str = "wad.txt";

/// Repairs and normalizes BSP-style brush geometry in a scene file.
#[derive(Parser, Debug)]
#[command(name = "mapfix", about = "Repair and normalize brush geometry", long_about = None)]
struct Cli {
    /// Input scene file. Defaults to a `.rmf` extension if given no extension at all.
    input: PathBuf,

    /// Output file path (default: input stem with `.map` or `.rmf`).
    #[arg(short = 'o')]
    output: Option<PathBuf>,

    /// Read a wad list; optionally give its path (default: wad.txt).
    #[arg(short = 'w', num_args = 0..=1)]
    wadlist: Option<Option<PathBuf>>,

    /// Legacy map texture projection form: 100 or 220 (default 220).
    #[arg(short = 'm', value_parser = ["100", "220"])]
    projection: Option<String>,

    /// Write a repaired binary scene instead of a textual map.
    #[arg(short = 'r')]
    binary_out: bool,

    /// Disable tesselation of non-planar faces.
    #[arg(long = "nt")]
    no_tesselate: bool,
    /// Disable convex decomposition.
    #[arg(long = "nd")]
    no_decompose: bool,
    /// Disable coplanar face union.
    #[arg(long = "nu")]
    no_unite: bool,
    /// Disable every transformation (snapping still runs).
    #[arg(long = "na")]
    no_all: bool,

    /// Only keep visible groups/entities/solids.
    #[arg(short = 'v')]
    visible_only: bool,

    /// Scale factor applied to the comparison epsilon.
    #[arg(short = 'e')]
    epsilon_factor: Option<f64>,

    /// Print verbose geometry-transformation diagnostics.
    #[arg(long = "gd")]
    debug_geometry: bool,
    /// Print verbose binary-read diagnostics.
    #[arg(long = "rd")]
    debug_read: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let input_path = resolve_input_path(&cli.input);
    let output_path = resolve_output_path(cli.output.as_deref(), &input_path, cli.binary_out);

    if output_path == input_path {
        bail!(
            "output path {} is the same as the input path",
            output_path.display()
        );
    }

    println!("Reading input file {}...", input_path.display());
    let file = File::open(&input_path)
        .with_context(|| format!("cannot open {}", input_path.display()))?;
    let mut reader = BufReader::new(file);
    let mut map = read_scene(&mut reader)
        .with_context(|| format!("failed to read {}", input_path.display()))?;

    if let Some(wadlist) = &cli.wadlist {
        let path = wadlist
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_WADLIST));
        println!("Reading wad list {}...", path.display());
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read wad list {}", path.display()))?;
        map.wads = contents.lines().map(|l| l.trim().to_string()).filter(|l| !l.is_empty()).collect();
    }

    let tol = match cli.epsilon_factor {
        Some(factor) => Tolerance::scaled(factor),
        None => Tolerance::DEFAULT,
    };
    let mut ctx = Context::new(tol);
    ctx.debug_geometry = cli.debug_geometry;
    ctx.debug_read = cli.debug_read;

    let opts = WalkOptions {
        prune: cli.visible_only,
        tesselate: !cli.no_all && !cli.no_tesselate,
        decompose: !cli.no_all && !cli.no_decompose,
        unite: !cli.no_all && !cli.no_unite,
    };

    println!("Snapping vertices, tesselating, decomposing, and uniting...");
    walk_scene(&mut map, &mut ctx, &opts);

    println!("Writing output file {}...", output_path.display());
    let out_file = File::create(&output_path)
        .with_context(|| format!("cannot create {}", output_path.display()))?;
    let mut writer = BufWriter::new(out_file);
    if cli.binary_out {
        write_scene(&mut writer, &map)
            .with_context(|| format!("failed to write {}", output_path.display()))?;
    } else {
        let form = match cli.projection.as_deref() {
            Some("100") => ProjectionForm::Legacy100,
            _ => ProjectionForm::Modern220,
        };
        write_map(&mut writer, &map, form)
            .with_context(|| format!("failed to write {}", output_path.display()))?;
    }

    println!("Done.");
    Ok(())
}

/// Add a `.rmf` extension to `input` if it was given with none at all.
fn resolve_input_path(input: &Path) -> PathBuf {
    if input.extension().is_some() {
        input.to_path_buf()
    } else {
        input.with_extension("rmf")
    }
}

/// Derive the output path: the given `-o` value, or the input stem with
/// `.rmf` (binary out) or `.map` (textual out, the default).
fn resolve_output_path(given: Option<&Path>, input: &Path, binary_out: bool) -> PathBuf {
    if let Some(out) = given {
        return out.to_path_buf();
    }
    let ext = if binary_out { "rmf" } else { "map" };
    input.with_extension(ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_with_no_extension_gets_rmf() {
        assert_eq!(
            resolve_input_path(Path::new("mymap")),
            PathBuf::from("mymap.rmf")
        );
    }

    #[test]
    fn input_with_extension_is_left_alone() {
        assert_eq!(
            resolve_input_path(Path::new("mymap.rmf")),
            PathBuf::from("mymap.rmf")
        );
        assert_eq!(
            resolve_input_path(Path::new("mymap.bsp")),
            PathBuf::from("mymap.bsp")
        );
    }

    #[test]
    fn default_output_is_map_unless_binary_requested() {
        let input = PathBuf::from("mymap.rmf");
        assert_eq!(
            resolve_output_path(None, &input, false),
            PathBuf::from("mymap.map")
        );
        assert_eq!(
            resolve_output_path(None, &input, true),
            PathBuf::from("mymap.rmf")
        );
    }

    #[test]
    fn explicit_output_overrides_derivation() {
        let input = PathBuf::from("mymap.rmf");
        let out = PathBuf::from("elsewhere.map");
        assert_eq!(
            resolve_output_path(Some(&out), &input, false),
            out
        );
    }
}
