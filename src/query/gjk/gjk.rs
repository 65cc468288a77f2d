use crate::math::{Isometry, Point, Vector, BIG_EPSILON, EPSILON};
use crate::query::gjk::{CachedSimplex, PairSimplex, SimpleSimplex};
use crate::query::minkowski;
use crate::shape::SupportMap;

/// Maximum number of iterations a GJK run will do. Past this the run quits
/// with whatever information it has at the time.
pub(crate) const MAX_GJK_ITERATIONS: usize = 15;
/// Number of iterations past which a GJK run is considered probably stuck,
/// enabling protective convergence measures.
pub(crate) const HIGH_GJK_ITERATIONS: usize = 8;

/// Result of the closest points query between two shapes.
#[derive(Copy, Clone, Debug)]
pub enum GJKResult {
    /// The shapes intersect, so no closest points exist.
    Intersection,
    /// The closest points on each shape, in the local frame of the first.
    ClosestPoints(Point, Point),
}

/// Tests whether two margin-expanded shapes intersect.
///
/// `separating_axis` warm-starts the test and is updated with the latest
/// separating axis whenever the shapes turn out to be separated. A zero axis
/// is a valid, if uninformed, first guess.
pub fn intersection_test<G1, G2>(
    pos12: &Isometry,
    g1: &G1,
    g2: &G2,
    separating_axis: &mut Vector,
) -> bool
where
    G1: SupportMap + ?Sized,
    G2: SupportMap + ?Sized,
{
    let mut simplex = SimpleSimplex::new();
    let extreme = minkowski::support_point(pos12, g1, g2, separating_axis);
    simplex.add_point(extreme.coords);

    let mut count = 0;
    while count < MAX_GJK_ITERATIONS {
        count += 1;
        let closest = match simplex.project_origin_and_reduce() {
            Some(closest)
                if closest.norm_squared() > simplex.error_tolerance() * BIG_EPSILON =>
            {
                closest
            }
            // Intersecting, or so close to it that telling the difference
            // would be difficult and expensive.
            _ => return true,
        };

        let direction = -closest;
        let extreme = minkowski::support_point(pos12, g1, g2, &direction);
        if extreme.coords.dot(&closest) > 0.0 {
            // The extreme point along the direction towards the origin did not
            // go past it, so the origin cannot be inside the CSO.
            *separating_axis = direction;
            return false;
        }

        simplex.add_point(extreme.coords);
    }
    false
}

/// Computes the closest points between the marginless cores of two shapes,
/// warm-started from `cache`.
///
/// The cache is updated after every run, whatever the outcome. Use a fresh
/// [`CachedSimplex`] when no previous run exists.
pub fn closest_points<G1, G2>(
    pos12: &Isometry,
    g1: &G1,
    g2: &G2,
    cache: &mut CachedSimplex,
) -> GJKResult
where
    G1: SupportMap + ?Sized,
    G2: SupportMap + ?Sized,
{
    let mut simplex = PairSimplex::from_cache(cache, pos12);

    let mut count = 0;
    loop {
        let closest = match simplex.project_origin_and_reduce() {
            Some(closest)
                if closest.norm_squared() > EPSILON * simplex.error_tolerance() =>
            {
                closest
            }
            _ => {
                simplex.update_cache(cache);
                return GJKResult::Intersection;
            }
        };

        count += 1;
        if count > MAX_GJK_ITERATIONS {
            // Quitting before a new vertex is added guarantees the final
            // simplex is not a tetrahedron.
            break;
        }

        if simplex.add_new_point(g1, g2, count, &closest) {
            // No more progress towards the origin can be made.
            break;
        }
    }

    let (point1, point2) = simplex.closest_points();
    simplex.update_cache(cache);
    GJKResult::ClosestPoints(point1, point2)
}
