//! Error types for the geometry-repair engine.

use thiserror::Error;

/// The kind of failure a transformation encountered, without the
/// entity/brush diagnostic context (see [`CoreError`]).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CoreErrorKind {
    /// Cycle assembly could not find a continuation edge before closing.
    #[error("incomplete edge cycle")]
    IncompleteCycle,
    /// A face cutter cycle lies entirely within the cutting plane.
    #[error("face entirely within cutting plane")]
    DegenerateCutCycle,
    /// Plane-vertex pairing found an odd number of intersection points.
    #[error("odd number of front/back intersection points")]
    OddCutCount,
    /// An inner cycle was generated with no containing outer cycle.
    #[error("inner edge cycle generated with no containing outer cycle")]
    OrphanInnerCycle,
    /// A reconstructed solid contains a face with an edge lacking a
    /// reverse partner within the same solid.
    #[error("orphaned face in reconstructed solid")]
    OrphanFace,
    /// Ear-clipping could not find a valid ear before completing a lap.
    #[error("tesselation deadlock")]
    TesselationDeadlock,
    /// Face-adjacency search found no adjacent face across an edge.
    #[error("incomplete solid: no adjacent face found")]
    IncompleteSolid,
}

/// A core transformation error, annotated with the entity/brush indices
/// active when it was raised.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("(entity {entity}, brush {brush}): {kind}")]
pub struct CoreError {
    /// What went wrong.
    pub kind: CoreErrorKind,
    /// The scene walker's current entity index at the time of failure.
    pub entity: i32,
    /// The scene walker's current brush index at the time of failure.
    pub brush: i32,
}

impl CoreError {
    /// Build an error tagged with the context's current entity/brush.
    pub fn new(kind: CoreErrorKind, ctx: &crate::Context) -> Self {
        Self {
            kind,
            entity: ctx.current_entity,
            brush: ctx.current_brush,
        }
    }
}
