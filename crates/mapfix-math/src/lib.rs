#![warn(missing_docs)]

//! Scalar, vector, and plane primitives for brush geometry repair.
//!
//! Everything here funnels through a single tolerance-aware comparator
//! so that floating-point equality stays consistent across the crate:
//! no caller should write a bare `(a - b).abs() < C` for anything that
//! is meant to behave like "the same point" or "the same plane".

use nalgebra::Vector3;

/// A vector (or point, depending on context) in 3D space.
pub type Vec3 = Vector3<f64>;

/// Fixed vertex-snap tolerance, independent of [`Tolerance::epsilon`].
///
/// Snapping heals sub-epsilon drift between vertices that are meant to
/// be identical; it intentionally uses its own constant rather than the
/// scene's configurable epsilon.
pub const SNAP_TOLERANCE: f64 = 0.1;

/// The default scalar epsilon before any user scale factor is applied.
pub const DEFAULT_EPSILON: f64 = 0.004;

/// A single epsilon governing every floating-point comparison in the crate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// The comparison threshold: `a` and `b` are equal iff `|a - b| <= epsilon`.
    pub epsilon: f64,
}

impl Tolerance {
    /// The default tolerance ([`DEFAULT_EPSILON`], scale factor 1.0).
    pub const DEFAULT: Self = Self {
        epsilon: DEFAULT_EPSILON,
    };

    /// Build a tolerance from a user-supplied scale factor (the CLI's `-e`).
    pub fn scaled(factor: f64) -> Self {
        Self {
            epsilon: DEFAULT_EPSILON * factor,
        }
    }

    /// Scalar equality within epsilon.
    pub fn eq(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.epsilon
    }

    /// Is this scalar effectively zero?
    pub fn is_zero(&self, v: f64) -> bool {
        v.abs() <= self.epsilon
    }

    /// Componentwise vector equality within epsilon.
    pub fn vec_eq(&self, a: &Vec3, b: &Vec3) -> bool {
        self.eq(a.x, b.x) && self.eq(a.y, b.y) && self.eq(a.z, b.z)
    }

    /// Is this vector effectively the zero vector?
    pub fn vec_is_zero(&self, v: &Vec3) -> bool {
        self.is_zero(v.x) && self.is_zero(v.y) && self.is_zero(v.z)
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Which side of a directed [`Plane`] a point falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Behind the plane (`n.v + d > 0`, opposite the front half-space).
    Back,
    /// On the plane, within tolerance.
    In,
    /// In front of the plane (`n.v + d < 0`).
    Front,
}

/// A directed plane `n.v + d = 0`, whose front half-space is `n.v + d < 0`.
///
/// `(n, d)` and `(-n, -d)` are different directed planes even though they
/// describe the same set of points: their front half-spaces differ. Use
/// [`Plane::canonical`] when orientation should not matter (see the
/// decomposer's reflex-count table).
#[derive(Debug, Clone, Copy)]
pub struct Plane {
    /// Unit normal.
    pub normal: Vec3,
    /// Signed offset.
    pub d: f64,
}

impl Plane {
    /// Build a plane from an already-unit normal and offset.
    pub fn new(normal: Vec3, d: f64) -> Self {
        Self { normal, d }
    }

    /// Build the plane through three points, outward normal via `(p1-p0) x (p2-p0)`.
    ///
    /// Returns `None` if the three points are collinear (zero-area normal).
    pub fn from_points(p0: &Vec3, p1: &Vec3, p2: &Vec3) -> Option<Self> {
        let n = (p1 - p0).cross(&(p2 - p0));
        let len = n.norm();
        if len <= f64::EPSILON {
            return None;
        }
        let normal = n / len;
        let d = -normal.dot(p0);
        Some(Self { normal, d })
    }

    /// Classify a point against this plane.
    pub fn side_of(&self, v: &Vec3, tol: &Tolerance) -> Side {
        let s = -self.normal.dot(v);
        if tol.eq(s, self.d) {
            Side::In
        } else if s > self.d {
            Side::Front
        } else {
            Side::Back
        }
    }

    /// Signed distance-like scalar used by [`Plane::side_of`]; `0` means on-plane.
    pub fn signed_offset(&self, v: &Vec3) -> f64 {
        -self.normal.dot(v) - self.d
    }

    /// Intersection of the segment `v1..v2` with this plane.
    ///
    /// Only meaningful when the segment actually crosses or touches the
    /// plane; callers are expected to have classified the endpoints first.
    pub fn intersect(&self, v1: &Vec3, v2: &Vec3) -> Vec3 {
        let dir = v2 - v1;
        let denom = self.normal.dot(&dir);
        let t = -(self.normal.dot(v1) + self.d) / denom;
        v1 + dir * t
    }

    /// Flip this plane so both its normal and offset are negated.
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            d: -self.d,
        }
    }

    /// Canonicalize so that orientation is irrelevant to equality: if
    /// `n.x + n.y + n.z < 0`, flip the plane.
    ///
    /// Used by the decomposer to accumulate reflex-edge counts per
    /// geometric plane regardless of which of the two coplanar faces'
    /// orientations produced it.
    pub fn canonical(&self) -> Self {
        if self.normal.x + self.normal.y + self.normal.z < 0.0 {
            self.flipped()
        } else {
            *self
        }
    }

    /// Orientation-insensitive equality: are `self` and `other` the same
    /// geometric plane, ignoring which way either is directed?
    pub fn equals_unoriented(&self, other: &Plane, tol: &Tolerance) -> bool {
        let ca = self.canonical();
        let cb = other.canonical();
        tol.vec_eq(&ca.normal, &cb.normal) && tol.eq(ca.d, cb.d)
    }
}

/// A fixed, geometry-epsilon-independent tolerance used only to order
/// canonicalized planes as map keys (see [`PlaneKey`]).
///
/// Rust's [`Ord`] cannot carry the scene's runtime-configured epsilon, so
/// this key comparison uses a small fixed threshold instead. It only
/// needs to dedupe planes that are the *same* plane to machine precision
/// after canonicalization; it does not participate in any geometric
/// decision that the rest of the crate makes under the real epsilon.
const PLANE_KEY_EPSILON: f64 = 1e-9;

/// Wraps a [`Plane`] so it can be used as a `BTreeMap` key with
/// orientation-insensitive, tolerance-aware ordering.
///
/// Mirrors the source tool's reflex-count table, which is keyed by plane
/// under a custom less-than that canonicalizes orientation first.
#[derive(Debug, Clone, Copy)]
pub struct PlaneKey(pub Plane);

impl PlaneKey {
    fn canon(&self) -> Plane {
        self.0.canonical()
    }

    fn tuple(&self) -> (f64, f64, f64, f64) {
        let c = self.canon();
        (c.normal.x, c.normal.y, c.normal.z, c.d)
    }
}

impl PartialEq for PlaneKey {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (self.tuple(), other.tuple());
        (a.0 - b.0).abs() <= PLANE_KEY_EPSILON
            && (a.1 - b.1).abs() <= PLANE_KEY_EPSILON
            && (a.2 - b.2).abs() <= PLANE_KEY_EPSILON
            && (a.3 - b.3).abs() <= PLANE_KEY_EPSILON
    }
}

impl Eq for PlaneKey {}

impl PartialOrd for PlaneKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PlaneKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use std::cmp::Ordering;
        let (a, b) = (self.tuple(), other.tuple());
        let components = [(a.0, b.0), (a.1, b.1), (a.2, b.2), (a.3, b.3)];
        for (x, y) in components {
            if (x - y).abs() > PLANE_KEY_EPSILON {
                return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
            }
        }
        Ordering::Equal
    }
}

/// Map an interior angle at a vertex onto `(0, 4]`, monotonically in the
/// angle, without computing an arccosine.
///
/// `a` and `b` are the two edge directions meeting at the vertex and
/// `norm` orients the turn. If `b` lies to the left of `a` (a left turn,
/// `0`-`180°`), the result is `1 - a.b` in `(0, 2]`; otherwise (a right
/// turn, `180°`-`360°`) it is `3 + a.b` in `(2, 4]`. Parallel vectors
/// compare as a full `360°` turn. Smaller results are "more convex"
/// continuations, letting cycle-assembly and adjacency code pick the
/// smallest left-turning candidate by numeric minimum.
pub fn internal_angle(a: &Vec3, b: &Vec3, norm: &Vec3) -> f64 {
    let au = a.normalize();
    let bu = b.normalize();
    if au.cross(&bu).dot(norm) > 0.0 {
        1.0 - au.dot(&bu)
    } else {
        3.0 + au.dot(&bu)
    }
}
