//! Linear algebra type aliases and crate-wide tolerances.

/// The scalar type used throughout this crate.
pub type Real = f32;

/// The default tolerance used for geometric operations.
pub const DEFAULT_EPSILON: Real = Real::EPSILON;

/// The dimension of the space.
pub const DIM: usize = 3;

/// Absolute tolerance below which squared lengths are treated as degenerate.
///
/// Unlike [`DEFAULT_EPSILON`] this is not a relative machine epsilon: every
/// iterative algorithm in this crate guards its normalizations and divisions
/// against this fixed threshold.
pub const EPSILON: Real = 1.0e-7;

/// A looser absolute tolerance used by acceptance tests that must tolerate
/// the accumulated error of an iterative search.
pub const BIG_EPSILON: Real = 1.0e-5;

/// The point type.
pub type Point = na::Point3<Real>;

/// The vector type.
pub type Vector = na::Vector3<Real>;

/// The unit vector type.
pub type UnitVector = na::UnitVector3<Real>;

/// The matrix type.
pub type Matrix = na::Matrix3<Real>;

/// The transformation matrix type.
pub type Isometry = na::Isometry3<Real>;

/// The rotation type.
pub type Rotation = na::UnitQuaternion<Real>;

/// The translation type.
pub type Translation = na::Translation3<Real>;
