use mapfix_math::Tolerance;

/// Process-wide state threaded explicitly through the scene walker and
/// every transformation, instead of held as module-level statics.
///
/// `current_entity`/`current_brush` are diagnostic counters updated by
/// the scene walker as it descends the tree; they exist only so errors
/// and warnings can report where in the scene they occurred.
#[derive(Debug, Clone, Copy)]
pub struct Context {
    /// The scalar tolerance used by every geometric predicate.
    pub tol: Tolerance,
    /// Index of the entity currently being processed (0 for the world).
    pub current_entity: i32,
    /// Index of the brush currently being processed.
    pub current_brush: i32,
    /// Print verbose geometry-transformation diagnostics (`-gd`).
    pub debug_geometry: bool,
    /// Print verbose binary-read diagnostics (`-rd`).
    pub debug_read: bool,
}

impl Context {
    /// A context with the given tolerance and all counters/flags zeroed.
    pub fn new(tol: Tolerance) -> Self {
        Self {
            tol,
            current_entity: 0,
            current_brush: 0,
            debug_geometry: false,
            debug_read: false,
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(Tolerance::DEFAULT)
    }
}
