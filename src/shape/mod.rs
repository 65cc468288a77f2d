//! Shapes supported by the collision queries.

pub use self::ball::Ball;
pub use self::cuboid::Cuboid;
pub use self::support_map::SupportMap;
pub use self::triangle::{Triangle, TriangleSidedness};

use crate::math::Real;

/// The collision margin given to every shape built without an explicit one.
pub const DEFAULT_MARGIN: Real = 0.04;

mod ball;
mod cuboid;
mod support_map;
mod triangle;
