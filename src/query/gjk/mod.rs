//! The GJK algorithm for boolean and closest points queries.

pub use self::gjk::{closest_points, intersection_test, GJKResult};
pub use self::pair_simplex::{CachedSimplex, PairSimplex, SimplexState};
pub use self::simple_simplex::SimpleSimplex;

mod gjk;
mod pair_simplex;
mod simple_simplex;
