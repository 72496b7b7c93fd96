#![warn(missing_docs)]

//! Scene file I/O: the binary `RMF`-style reader/writer and the textual
//! brace-delimited map writer, kept separate from the core geometry
//! engine so the core crate never depends on any file format.

mod binary;
mod error;
mod text;

pub use binary::{read_scene, write_scene};
pub use error::IoError;
pub use text::{write_map, ProjectionForm};
