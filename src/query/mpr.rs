//! Minkowski Portal Refinement for overlap tests, deep contacts and sweeps.

use crate::math::{Isometry, Point, Real, UnitVector, Vector, EPSILON};
use crate::query::contact::ContactData;
use crate::query::minkowski::{self, CSOPoint};
use crate::query::QuerySettings;
use crate::shape::SupportMap;
use crate::utils;

/// Time and place of impact reported by [`sweep`].
#[derive(Copy, Clone, Debug)]
pub struct SweepHit {
    /// Fraction of the sweep at which the shapes first touch, in `[0, 1]`.
    pub toi: Real,
    /// World-space impact normal. Zero when the shapes already overlap and
    /// have no relative motion.
    pub normal: Vector,
    /// World-space witness point of the impact.
    pub witness: Point,
}

/// Tests whether two shapes overlap, with shape B positioned relative to A.
///
/// `origin_ray` must point from a point known to be inside the CSO towards
/// the origin. The offset between the shape centers is the usual choice; pass
/// something else when a shape's origin is not contained in its geometry.
pub fn local_shapes_overlap<G1, G2>(
    pos12: &Isometry,
    g1: &G1,
    g2: &G2,
    origin_ray: &Vector,
    settings: &QuerySettings,
) -> bool
where
    G1: SupportMap + ?Sized,
    G2: SupportMap + ?Sized,
{
    // The shape centers may coincide or very nearly so. Obviously colliding.
    if origin_ray.norm_squared() < EPSILON {
        return true;
    }

    // In A's local space, the interior point A - B is just -B.
    let v0 = -origin_ray;

    // Guess a portal through which the origin ray passes. 'n' is the support
    // direction used throughout.
    let mut n = *origin_ray;
    let mut v1 = minkowski::support_point(pos12, g1, g2, &n).coords;

    n = v1.cross(&v0);
    if n.norm_squared() < EPSILON {
        // v1 and v0 are parallel: the ray, followed out to the surface,
        // arrives exactly at the extreme point. Containment reduces to a
        // one dimensional comparison.
        return v1.dot(origin_ray) >= 0.0;
    }
    let mut v2 = minkowski::support_point(pos12, g1, g2, &n).coords;

    n = (v1 - v0).cross(&(v2 - v0));

    let mut v3;
    let mut count = 0;
    loop {
        v3 = minkowski::support_point(pos12, g1, g2, &n).coords;
        if count > settings.outer_iteration_limit() {
            break;
        }
        count += 1;

        // The simplex is a tetrahedron now, but the origin ray does not
        // necessarily pass through the portal (v1, v2, v3) yet.
        if v1.cross(&v3).dot(&v0) < 0.0 {
            // Origin outside the (v1, v0, v3) plane; v2 was on its inside.
            v2 = v3;
            n = (v1 - v0).cross(&(v3 - v0));
            continue;
        }
        if v3.cross(&v2).dot(&v0) < 0.0 {
            // Origin outside the (v3, v0, v2) plane; v1 was on its inside.
            v1 = v3;
            n = (v2 - v0).cross(&(v3 - v0));
            continue;
        }
        break;
    }

    // Refine the portal.
    loop {
        // Done as soon as the origin ends up behind the portal.
        n = (v3 - v2).cross(&(v1 - v2));
        let dot = n.dot(&v1);
        if dot >= 0.0 {
            return true;
        }

        let v4 = minkowski::support_point(pos12, g1, g2, &n).coords;
        let dot2 = v4.dot(&n);
        if dot2 < 0.0 {
            // The origin lies beyond the most extreme point along the portal
            // normal. It cannot be inside.
            return false;
        }

        // When the portal plane is this close to the extreme point, the
        // origin is at best barely inside. Assume it is outside.
        if dot2 - dot < settings.surface_epsilon() || count > settings.inner_iteration_limit() {
            return false;
        }
        count += 1;

        // Test the origin against the three planes separating the new portal
        // candidates: (v1, v4, v0), (v2, v4, v0), (v3, v4, v0).
        let temp = v4.cross(&v0);
        if v1.dot(&temp) >= 0.0 {
            if v2.dot(&temp) >= 0.0 {
                v1 = v4;
            } else {
                v3 = v4;
            }
        } else if v3.dot(&temp) >= 0.0 {
            v2 = v4;
        } else {
            v1 = v4;
        }
    }
}

/// Finds a point inside the overlap volume of two shapes, in A's local space.
///
/// Returns `None` when the shapes do not overlap. `origin_ray` follows the
/// same contract as [`local_shapes_overlap`].
pub fn local_overlap_position<G1, G2>(
    pos12: &Isometry,
    g1: &G1,
    g2: &G2,
    origin_ray: &Vector,
    settings: &QuerySettings,
) -> Option<Point>
where
    G1: SupportMap + ?Sized,
    G2: SupportMap + ?Sized,
{
    if origin_ray.norm_squared() < EPSILON {
        return Some(Point::origin());
    }

    let v0 = -origin_ray;

    let mut n = *origin_ray;
    let mut v1 = CSOPoint::from_shapes(pos12, g1, g2, &n);

    n = v1.point.coords.cross(&v0);
    if n.norm_squared() < EPSILON {
        // The ray is exactly aligned with the extreme point offset, so the
        // simplex is a segment from v0 to v1.
        let dot = v1.point.coords.dot(origin_ray);
        if dot < 0.0 {
            return None;
        }
        let dot_v0 = v0.dot(origin_ray);
        let barycentric = -dot_v0 / (dot - dot_v0);
        return Some(Point::from(v1.orig1.coords * barycentric));
    }
    let mut v2 = CSOPoint::from_shapes(pos12, g1, g2, &n);

    n = (v1.point.coords - v0).cross(&(v2.point.coords - v0));

    let mut v3;
    let mut count = 0;
    loop {
        v3 = CSOPoint::from_shapes(pos12, g1, g2, &n);
        if count > settings.outer_iteration_limit() {
            break;
        }
        count += 1;

        if v1.point.coords.cross(&v3.point.coords).dot(&v0) < 0.0 {
            v2 = v3;
            n = (v1.point.coords - v0).cross(&(v3.point.coords - v0));
            continue;
        }
        if v3.point.coords.cross(&v2.point.coords).dot(&v0) < 0.0 {
            v1 = v3;
            n = (v2.point.coords - v0).cross(&(v3.point.coords - v0));
            continue;
        }
        break;
    }

    // Refine the portal.
    loop {
        n = (v3.point.coords - v2.point.coords).cross(&(v1.point.coords - v2.point.coords));
        let dot = n.dot(&v1.point.coords);
        if dot >= 0.0 {
            // The origin is behind the portal. Blend the shape A witness
            // points with the barycentric volume weights of the origin in
            // the v0v1v2v3 tetrahedron. v0 contributes A's center, which is
            // the local origin.
            let temp1 = v1.point.coords - v0;
            let temp2 = v2.point.coords - v0;
            let temp3 = v3.point.coords - v0;

            let total_volume = temp1.cross(&temp2).dot(&temp3);
            let o_v1v2v3 = v1.point.coords.cross(&v2.point.coords).dot(&v3.point.coords);
            let v0_o_v2v3 = origin_ray.cross(&temp2).dot(&temp3);
            let v0v1_o_v3 = temp1.cross(origin_ray).dot(&temp3);

            if total_volume > EPSILON * 0.01 {
                let inverse_total_volume = 1.0 / total_volume;
                let v0_weight = o_v1v2v3 * inverse_total_volume;
                let v1_weight = v0_o_v2v3 * inverse_total_volume;
                let v2_weight = v0v1_o_v3 * inverse_total_volume;
                let v3_weight = 1.0 - v0_weight - v1_weight - v2_weight;
                return Some(Point::from(
                    v1.orig1.coords * v1_weight
                        + v2.orig1.coords * v2_weight
                        + v3.orig1.coords * v3_weight,
                ));
            }
            return Some(Point::origin());
        }

        let v4 = CSOPoint::from_shapes(pos12, g1, g2, &n);
        let dot2 = v4.point.coords.dot(&n);
        if dot2 < 0.0 {
            return None;
        }

        if dot2 - dot < settings.surface_epsilon() || count > settings.inner_iteration_limit() {
            return None;
        }
        count += 1;

        let temp = v4.point.coords.cross(&v0);
        if v1.point.coords.dot(&temp) >= 0.0 {
            if v2.point.coords.dot(&temp) >= 0.0 {
                v1 = v4;
            } else {
                v3 = v4;
            }
        } else if v3.point.coords.dot(&temp) >= 0.0 {
            v2 = v4;
        } else {
            v1 = v4;
        }
    }
}

/// Casts a ray from the origin towards the surface of the CSO.
///
/// The origin must be inside the CSO. Returns the ray parameter of the
/// surface hit, in units of `direction`'s length, and the outward surface
/// normal. A failed portal construction reports the sentinel
/// `(Real::MAX, +y)`.
pub fn local_surface_cast<G1, G2>(
    pos12: &Isometry,
    g1: &G1,
    g2: &G2,
    direction: &Vector,
    settings: &QuerySettings,
) -> (Real, Vector)
where
    G1: SupportMap + ?Sized,
    G2: SupportMap + ?Sized,
{
    // Just like the overlap test, except the ray starts at the origin, a
    // point known to be inside the CSO, and runs until the surface. The
    // terminating portal gives the surface normal, and the distance along
    // the direction is the ray parameter.

    let mut n = *direction;
    let mut v1 = minkowski::support_point(pos12, g1, g2, &n).coords;

    n = direction.cross(&v1);
    if n.norm_squared() < EPSILON {
        // The direction is exactly aligned with the extreme point offset, so
        // following the ray out to the surface arrives at the extreme point.
        let ray_length_squared = direction.norm_squared();
        let normal = if ray_length_squared > EPSILON * 0.01 {
            direction / ray_length_squared.sqrt()
        } else {
            Vector::zeros()
        };
        let rate = normal.dot(direction);
        let distance = normal.dot(&v1);
        let t = if rate > 0.0 { distance / rate } else { 0.0 };
        return (t, normal);
    }
    let mut v2 = minkowski::support_point(pos12, g1, g2, &n).coords;

    n = v1.cross(&v2);

    // v1 and v2 may wind the wrong way around the direction vector.
    if n.dot(direction) > 0.0 {
        std::mem::swap(&mut v1, &mut v2);
        n = -n;
    }

    let mut v3;
    let mut count = 0;
    loop {
        v3 = minkowski::support_point(pos12, g1, g2, &n).coords;

        if count > settings.outer_iteration_limit() {
            // The portal never enclosed the ray; something degenerate is
            // going on. Report an unreachable hit.
            log::debug!("surface cast portal construction exceeded the iteration limit");
            return (Real::MAX, Vector::y());
        }
        count += 1;

        if v1.cross(&v3).dot(direction) < 0.0 {
            v2 = v3;
            n = v1.cross(&v3);
            continue;
        }
        if v3.cross(&v2).dot(direction) < 0.0 {
            v1 = v3;
            n = v2.cross(&v3);
            continue;
        }
        break;
    }

    // Refine the portal.
    count = 0;
    loop {
        n = (v1 - v2).cross(&(v3 - v2));

        let v4 = minkowski::support_point(pos12, g1, g2, &n).coords;

        let dot = n.dot(&v1);
        let support_dot = v4.dot(&n);

        if support_dot - dot < settings.surface_epsilon() || count > settings.inner_iteration_limit()
        {
            // The portal is flush with the surface, and the ray is known to
            // pass through it.
            let length_squared = n.norm_squared();
            if length_squared > EPSILON * 0.01 {
                let normal = n / length_squared.sqrt();
                let rate = normal.dot(direction);
                let distance = normal.dot(&v1);
                let t = if rate > 0.0 { distance / rate } else { 0.0 };
                return (t, normal);
            }
            return (0.0, Vector::y());
        }

        // 'Inside' here means on the positive side of a plane. The planes are
        // wound consistently, so the relationship of the ray with two of the
        // three candidate planes determines which vertex the extreme point
        // replaces. v4 x direction reorders the scalar triple product
        // (v1 x v4) * direction, saving the inner cross products.
        let temp = v4.cross(direction);
        if v1.dot(&temp) >= 0.0 {
            if v2.dot(&temp) >= 0.0 {
                v1 = v4;
            } else {
                v3 = v4;
            }
        } else if v3.dot(&temp) >= 0.0 {
            v2 = v4;
        } else {
            v1 = v4;
        }

        count += 1;
    }
}

/// Same cast as [`local_surface_cast`], additionally recovering the witness
/// point of the hit on shape A.
pub fn local_surface_cast_with_position<G1, G2>(
    pos12: &Isometry,
    g1: &G1,
    g2: &G2,
    direction: &Vector,
    settings: &QuerySettings,
) -> (Real, Vector, Point)
where
    G1: SupportMap + ?Sized,
    G2: SupportMap + ?Sized,
{
    let mut n = *direction;
    let mut v1 = CSOPoint::from_shapes(pos12, g1, g2, &n);

    n = direction.cross(&v1.point.coords);
    if n.norm_squared() < EPSILON {
        let ray_length_squared = direction.norm_squared();
        let normal = if ray_length_squared > EPSILON * 0.01 {
            direction / ray_length_squared.sqrt()
        } else {
            Vector::zeros()
        };
        let rate = normal.dot(direction);
        let distance = normal.dot(&v1.point.coords);
        let t = if rate > 0.0 { distance / rate } else { 0.0 };
        return (t, normal, v1.orig1);
    }
    let mut v2 = CSOPoint::from_shapes(pos12, g1, g2, &n);

    n = v1.point.coords.cross(&v2.point.coords);

    if n.dot(direction) > 0.0 {
        std::mem::swap(&mut v1, &mut v2);
        n = -n;
    }

    let mut v3;
    let mut count = 0;
    loop {
        v3 = CSOPoint::from_shapes(pos12, g1, g2, &n);

        if count > settings.outer_iteration_limit() {
            log::debug!("surface cast portal construction exceeded the iteration limit");
            return (Real::MAX, Vector::y(), Point::origin());
        }
        count += 1;

        if v1.point.coords.cross(&v3.point.coords).dot(direction) < 0.0 {
            n = v1.point.coords.cross(&v3.point.coords);
            v2 = v3;
            continue;
        }
        if v3.point.coords.cross(&v2.point.coords).dot(direction) < 0.0 {
            n = v2.point.coords.cross(&v3.point.coords);
            v1 = v3;
            continue;
        }
        break;
    }

    // Refine the portal.
    count = 0;
    loop {
        n = (v1.point.coords - v2.point.coords).cross(&(v3.point.coords - v2.point.coords));

        let v4 = CSOPoint::from_shapes(pos12, g1, g2, &n);

        let dot = n.dot(&v1.point.coords);
        let support_dot = v4.point.coords.dot(&n);

        if support_dot - dot < settings.surface_epsilon() || count > settings.inner_iteration_limit()
        {
            let length_squared = n.norm_squared();
            let (t, normal) = if length_squared > EPSILON * 0.01 {
                let normal = n / length_squared.sqrt();
                let rate = normal.dot(direction);
                let distance = normal.dot(&v1.point.coords);
                let t = if rate > 0.0 { distance / rate } else { 0.0 };
                (t, normal)
            } else {
                (0.0, Vector::y())
            };

            // The hit lies on the portal triangle; blend the shape A
            // witnesses with its barycentric coordinates there.
            let hit = Point::from(direction * t);
            let (v1_weight, v2_weight, v3_weight) = utils::barycentric_coordinates(
                &hit,
                &v1.point,
                &v2.point,
                &v3.point,
            );
            let position = v1.orig1.coords * v1_weight
                + v2.orig1.coords * v2_weight
                + v3.orig1.coords * v3_weight;
            return (t, normal, Point::from(position));
        }

        let temp = v4.point.coords.cross(direction);
        if v1.point.coords.dot(&temp) >= 0.0 {
            if v2.point.coords.dot(&temp) >= 0.0 {
                v1 = v4;
            } else {
                v3 = v4;
            }
        } else if v3.point.coords.dot(&temp) >= 0.0 {
            v2 = v4;
        } else {
            v1 = v4;
        }

        count += 1;
    }
}

/// Incrementally refines a penetration depth and normal towards the local
/// minimum by repeated surface casts.
///
/// Returns `(depth, normal, witness on A)`, all in A's local space. On the
/// convergence exit the previous normal is kept with the latest depth, since
/// that is the normal the last cast actually measured.
pub fn refine_penetration<G1, G2>(
    pos12: &Isometry,
    g1: &G1,
    g2: &G2,
    initial_depth: Real,
    initial_normal: &Vector,
    settings: &QuerySettings,
) -> (Real, Vector, Point)
where
    G1: SupportMap + ?Sized,
    G2: SupportMap + ?Sized,
{
    let mut refined_normal = *initial_normal;
    let mut penetration_depth = initial_depth;
    let mut optimizing_count = 0;
    loop {
        let (candidate_depth, candidate_normal, position) =
            local_surface_cast_with_position(pos12, g1, g2, &refined_normal, settings);
        optimizing_count += 1;
        if penetration_depth - candidate_depth <= settings.depth_refinement_epsilon()
            || optimizing_count >= settings.max_depth_refinement_iterations()
        {
            return (candidate_depth, refined_normal, position);
        }

        penetration_depth = candidate_depth;
        refined_normal = candidate_normal;
    }
}

/// Computes a contact between two penetrating shapes.
///
/// `penetration_axis` seeds the depth search, in A's local space; a
/// separating axis from a previous shallow contact or the relative velocity
/// both work well, and a zero axis is acceptable. It is updated with the
/// refined axis for reuse. Returns `None` when the shapes do not overlap.
pub fn contact<G1, G2>(
    pos1: &Isometry,
    g1: &G1,
    pos2: &Isometry,
    g2: &G2,
    penetration_axis: &mut Vector,
    settings: &QuerySettings,
) -> Option<ContactData>
where
    G1: SupportMap + ?Sized,
    G2: SupportMap + ?Sized,
{
    let pos12 = minkowski::local_transform(pos1, pos2);
    if !local_shapes_overlap(&pos12, g1, g2, &pos12.translation.vector, settings) {
        return None;
    }

    // First try the heuristic direction.
    let mut depth = Real::MAX;
    let mut normal = Vector::y();
    let length_squared = penetration_axis.norm_squared();
    if length_squared > EPSILON {
        let direction = *penetration_axis / length_squared.sqrt();
        let (t, n) = local_surface_cast(&pos12, g1, g2, &direction, settings);
        depth = t;
        normal = n;
    }

    // The offset between the centers is sometimes the better choice.
    let length_squared = pos12.translation.vector.norm_squared();
    if length_squared > EPSILON {
        let direction = pos12.translation.vector / length_squared.sqrt();
        let (candidate_depth, candidate_normal) =
            local_surface_cast(&pos12, g1, g2, &direction, settings);
        if candidate_depth < depth {
            depth = candidate_depth;
            normal = candidate_normal;
        }
    }

    let (depth, normal, position) =
        refine_penetration(&pos12, g1, g2, depth, &normal, settings);
    *penetration_axis = normal;

    Some(ContactData::new(
        pos1 * position,
        // The casts and the refinement only produce normalized directions,
        // and the rotation preserves the length.
        UnitVector::new_unchecked(pos1 * normal),
        depth,
    ))
}

/// Sweeps two moving shapes against each other and reports the first impact,
/// if any.
pub fn sweep<G1, G2>(
    pos1: &Isometry,
    g1: &G1,
    pos2: &Isometry,
    g2: &G2,
    sweep1: &Vector,
    sweep2: &Vector,
    settings: &QuerySettings,
) -> Option<SweepHit>
where
    G1: SupportMap + ?Sized,
    G2: SupportMap + ?Sized,
{
    // The ray the algorithm works with points opposite the relative motion,
    // hence A minus B.
    let velocity_world = sweep1 - sweep2;
    let local_direction = pos1.inverse_transform_vector(&velocity_world);
    let pos12 = minkowski::local_transform(pos1, pos2);

    // The surface cast needs the origin inside the CSO, which rarely holds
    // for a sweep query. Expand the CSO along the sweep just far enough to
    // cover the plane through the origin; a hit then guarantees containment.
    let mut ray_length_squared = local_direction.norm_squared();
    let mut sweep_length;
    if ray_length_squared > EPSILON * 0.01 {
        sweep_length = pos12.translation.vector.dot(&local_direction) / ray_length_squared;
        // The margins, pulled into terms of the ray length.
        sweep_length +=
            (g1.maximum_radius() + g2.maximum_radius()) / ray_length_squared.sqrt();
    } else {
        ray_length_squared = 0.0;
        sweep_length = 0.0;
    }
    // A negative length means the ray points away from the shape. Do not
    // sweep backward.
    let negative_length = sweep_length < 0.0;
    if negative_length {
        sweep_length = 0.0;
    }

    let sweep_vector = local_direction * sweep_length;
    let overlap_position = swept_shapes_intersect(&pos12, g1, g2, &sweep_vector, settings)?;
    if negative_length {
        // Contained, but moving apart. The impact is immediate.
        return Some(SweepHit {
            toi: 0.0,
            normal: pos1 * local_direction.normalize(),
            witness: pos1 * overlap_position,
        });
    }

    let (toi, normal) = local_sweep_cast(
        &pos12,
        g1,
        g2,
        sweep_length,
        ray_length_squared,
        &local_direction,
        &sweep_vector,
        settings,
    )?;

    // Recover the witness on shape A from the hit on the CSO surface.
    let minkowski_hit = local_direction * -toi;
    let witness = local_position(&pos12, g1, g2, &minkowski_hit, settings);
    Some(SweepHit {
        toi,
        normal: pos1 * normal,
        witness: pos1 * witness + sweep1 * toi,
    })
}

/// Tests whether two shapes overlap once the CSO is expanded by `sweep`.
///
/// Returns a point of the overlap volume in A's local space on success.
pub fn swept_shapes_intersect<G1, G2>(
    pos12: &Isometry,
    g1: &G1,
    g2: &G2,
    sweep: &Vector,
    settings: &QuerySettings,
) -> Option<Point>
where
    G1: SupportMap + ?Sized,
    G2: SupportMap + ?Sized,
{
    if pos12.translation.vector.norm_squared() < EPSILON {
        return Some(Point::origin());
    }

    let v0 = -pos12.translation.vector;

    let mut n = pos12.translation.vector;
    let mut v1 = swept_cso_point(pos12, g1, g2, sweep, &n);

    n = v1.point.coords.cross(&v0);
    if n.norm_squared() < EPSILON {
        let dot = v1.point.coords.dot(&pos12.translation.vector);
        if dot < 0.0 {
            return None;
        }
        let dot_v0 = v0.dot(&pos12.translation.vector);
        let barycentric = -dot_v0 / (dot - dot_v0);
        return Some(Point::from(v1.orig1.coords * barycentric));
    }
    let mut v2 = swept_cso_point(pos12, g1, g2, sweep, &n);

    n = (v1.point.coords - v0).cross(&(v2.point.coords - v0));

    let mut v3;
    let mut count = 0;
    loop {
        v3 = swept_cso_point(pos12, g1, g2, sweep, &n);
        if count > settings.outer_iteration_limit() {
            break;
        }
        count += 1;

        if v1.point.coords.cross(&v3.point.coords).dot(&v0) < 0.0 {
            v2 = v3;
            n = (v1.point.coords - v0).cross(&(v3.point.coords - v0));
            continue;
        }
        if v3.point.coords.cross(&v2.point.coords).dot(&v0) < 0.0 {
            v1 = v3;
            n = (v2.point.coords - v0).cross(&(v3.point.coords - v0));
            continue;
        }
        break;
    }

    // Refine the portal.
    loop {
        n = (v3.point.coords - v2.point.coords).cross(&(v1.point.coords - v2.point.coords));
        let dot = n.dot(&v1.point.coords);
        if dot >= 0.0 {
            let temp1 = v1.point.coords - v0;
            let temp2 = v2.point.coords - v0;
            let temp3 = v3.point.coords - v0;

            let total_volume = temp1.cross(&temp2).dot(&temp3);
            let o_v1v2v3 = v1.point.coords.cross(&v2.point.coords).dot(&v3.point.coords);
            let v0_o_v2v3 = pos12.translation.vector.cross(&temp2).dot(&temp3);
            let v0v1_o_v3 = temp1.cross(&pos12.translation.vector).dot(&temp3);

            if total_volume > EPSILON * 0.01 {
                let inverse_total_volume = 1.0 / total_volume;
                let v0_weight = o_v1v2v3 * inverse_total_volume;
                let v1_weight = v0_o_v2v3 * inverse_total_volume;
                let v2_weight = v0v1_o_v3 * inverse_total_volume;
                let v3_weight = 1.0 - v0_weight - v1_weight - v2_weight;
                return Some(Point::from(
                    v1.orig1.coords * v1_weight
                        + v2.orig1.coords * v2_weight
                        + v3.orig1.coords * v3_weight,
                ));
            }
            return Some(Point::origin());
        }

        let v4 = swept_cso_point(pos12, g1, g2, sweep, &n);
        let dot2 = v4.point.coords.dot(&n);
        if dot2 < 0.0 {
            return None;
        }

        if dot2 - dot < settings.surface_epsilon() || count > settings.inner_iteration_limit() {
            return None;
        }
        count += 1;

        let temp = v4.point.coords.cross(&v0);
        if v1.point.coords.dot(&temp) >= 0.0 {
            if v2.point.coords.dot(&temp) >= 0.0 {
                v1 = v4;
            } else {
                v3 = v4;
            }
        } else if v3.point.coords.dot(&temp) >= 0.0 {
            v2 = v4;
        } else {
            v1 = v4;
        }
    }
}

/// Surface cast against the sweep-expanded CSO. The returned ray parameter
/// counts back from the expanded surface, so it is already a fraction of the
/// sweep; a value above one means the impact happens beyond this sweep.
#[allow(clippy::too_many_arguments)]
fn local_sweep_cast<G1, G2>(
    pos12: &Isometry,
    g1: &G1,
    g2: &G2,
    sweep_length: Real,
    ray_length_squared: Real,
    local_direction: &Vector,
    sweep: &Vector,
    settings: &QuerySettings,
) -> Option<(Real, Vector)>
where
    G1: SupportMap + ?Sized,
    G2: SupportMap + ?Sized,
{
    let mut n = *local_direction;
    let mut v1 = minkowski::swept_support_point(pos12, g1, g2, sweep, &n).coords;

    n = local_direction.cross(&v1);
    if n.norm_squared() < EPSILON * 0.01 {
        // Direction aligned with the extreme point offset; the cast
        // degenerates to the one dimensional case.
        let normal = if ray_length_squared > EPSILON * 0.01 {
            local_direction / ray_length_squared.sqrt()
        } else {
            Vector::zeros()
        };
        let rate = normal.dot(local_direction);
        let distance = normal.dot(&v1);
        let t = if rate > 0.0 {
            (sweep_length - distance / rate).max(0.0)
        } else {
            sweep_length
        };
        return if t <= 1.0 { Some((t, normal)) } else { None };
    }
    let mut v2 = minkowski::swept_support_point(pos12, g1, g2, sweep, &n).coords;

    n = v1.cross(&v2);

    if n.dot(local_direction) > 0.0 {
        std::mem::swap(&mut v1, &mut v2);
        n = -n;
    }

    let mut v3;
    let mut count = 0;
    loop {
        v3 = minkowski::swept_support_point(pos12, g1, g2, sweep, &n).coords;

        if count > settings.outer_iteration_limit() {
            // The preparation guaranteed enclosure, so this is a numerical
            // failure. Report a miss.
            log::debug!("sweep cast portal construction exceeded the iteration limit");
            return None;
        }
        count += 1;

        if v1.cross(&v3).dot(local_direction) < 0.0 {
            v2 = v3;
            n = v1.cross(&v3);
            continue;
        }
        if v3.cross(&v2).dot(local_direction) < 0.0 {
            v1 = v3;
            n = v2.cross(&v3);
            continue;
        }
        break;
    }

    // Refine the portal.
    count = 0;
    loop {
        n = (v1 - v2).cross(&(v3 - v2));

        let v4 = minkowski::swept_support_point(pos12, g1, g2, sweep, &n).coords;

        let dot = n.dot(&v1);
        let support_dot = v4.dot(&n);

        if support_dot - dot < settings.ray_cast_surface_epsilon()
            || count > settings.inner_iteration_limit()
        {
            let length_squared = n.norm_squared();
            let (t, normal) = if length_squared > EPSILON * 0.00001 {
                let normal = n / length_squared.sqrt();
                let rate = normal.dot(local_direction);
                let distance = normal.dot(&v1);
                (sweep_length - distance / rate, normal)
            } else {
                (sweep_length, local_direction.normalize())
            };
            // Already intersecting pairs can produce a negative parameter.
            let t = t.max(0.0);
            return if t <= 1.0 { Some((t, normal)) } else { None };
        }

        let temp = v4.cross(local_direction);
        if v1.dot(&temp) >= 0.0 {
            if v2.dot(&temp) >= 0.0 {
                v1 = v4;
            } else {
                v3 = v4;
            }
        } else if v3.dot(&temp) >= 0.0 {
            v2 = v4;
        } else {
            v1 = v4;
        }

        count += 1;
    }
}

/// Recovers the shape A witness of a point on the CSO surface.
///
/// The point must be contained in, or lie very close to, the CSO.
fn local_position<G1, G2>(
    pos12: &Isometry,
    g1: &G1,
    g2: &G2,
    minkowski_position: &Vector,
    settings: &QuerySettings,
) -> Point
where
    G1: SupportMap + ?Sized,
    G2: SupportMap + ?Sized,
{
    // Ray from the interior point towards the target minkowski position.
    let ray_direction = minkowski_position + pos12.translation.vector;

    // The target is almost at the CSO center. A's center is its witness.
    if ray_direction.norm_squared() < EPSILON {
        return Point::origin();
    }

    let v0 = -pos12.translation.vector;

    let mut n = ray_direction;
    let mut v1 = CSOPoint::from_shapes(pos12, g1, g2, &n);

    n = v1.point.coords.cross(&v0);
    if n.norm_squared() < EPSILON {
        // The target is guaranteed near or inside the CSO, so unlike the
        // overlap tests there is no outside case to report here.
        let dot = (v1.point.coords - minkowski_position).dot(&ray_direction);
        let dot_v0 = (v0 - minkowski_position).dot(&ray_direction);
        let barycentric = -dot_v0 / (dot - dot_v0);
        return Point::from(v1.orig1.coords * barycentric);
    }
    let mut v2 = CSOPoint::from_shapes(pos12, g1, g2, &n);

    n = (v1.point.coords - v0).cross(&(v2.point.coords - v0));

    let point_to_v0 = v0 - minkowski_position;
    let mut v3;
    let mut count = 0;
    loop {
        v3 = CSOPoint::from_shapes(pos12, g1, g2, &n);
        if count > settings.outer_iteration_limit() {
            break;
        }
        count += 1;

        let v0v1 = v1.point.coords - v0;
        let v0v3 = v3.point.coords - v0;
        if v0v1.cross(&v0v3).dot(&point_to_v0) < 0.0 {
            v2 = v3;
            n = v0v1.cross(&v0v3);
            continue;
        }
        let v0v2 = v2.point.coords - v0;
        if v0v3.cross(&v0v2).dot(&point_to_v0) < 0.0 {
            v1 = v3;
            n = v0v2.cross(&v0v3);
            continue;
        }
        break;
    }

    // Refine the portal around the target point. Termination relies on the
    // surface push case alone.
    loop {
        n = (v3.point.coords - v2.point.coords).cross(&(v1.point.coords - v2.point.coords));
        let point_to_v1 = v1.point.coords - minkowski_position;
        let dot = point_to_v1.dot(&n);

        let v4 = CSOPoint::from_shapes(pos12, g1, g2, &n);
        let point_to_v4 = v4.point.coords - minkowski_position;
        let dot2 = point_to_v4.dot(&n);

        if dot2 - dot < settings.ray_cast_surface_epsilon()
            || count > settings.inner_iteration_limit()
        {
            // The portal is flush with the surface near the target, so the
            // target's barycentric coordinates on it blend the witnesses.
            let (weight1, weight2, weight3) = utils::barycentric_coordinates(
                &Point::from(*minkowski_position),
                &v1.point,
                &v2.point,
                &v3.point,
            );
            return Point::from(
                v1.orig1.coords * weight1
                    + v2.orig1.coords * weight2
                    + v3.orig1.coords * weight3,
            );
        }
        count += 1;

        let temp = point_to_v4.cross(&point_to_v0);
        if point_to_v1.dot(&temp) >= 0.0 {
            let point_to_v2 = v2.point.coords - minkowski_position;
            if point_to_v2.dot(&temp) >= 0.0 {
                v1 = v4;
            } else {
                v3 = v4;
            }
        } else {
            let point_to_v3 = v3.point.coords - minkowski_position;
            if point_to_v3.dot(&temp) >= 0.0 {
                v2 = v4;
            } else {
                v1 = v4;
            }
        }
    }
}

fn swept_cso_point<G1, G2>(
    pos12: &Isometry,
    g1: &G1,
    g2: &G2,
    sweep: &Vector,
    dir: &Vector,
) -> CSOPoint
where
    G1: SupportMap + ?Sized,
    G2: SupportMap + ?Sized,
{
    let mut point = CSOPoint::from_shapes(pos12, g1, g2, dir);
    if dir.dot(sweep) > 0.0 {
        point.point += sweep;
    }
    point
}

#[cfg(test)]
mod test {
    use super::{contact, local_overlap_position, local_shapes_overlap, local_surface_cast, sweep};
    use crate::math::{Isometry, Vector};
    use crate::query::QuerySettings;
    use crate::shape::Ball;

    #[test]
    fn overlap_test_agrees_with_ball_geometry() {
        let settings = QuerySettings::default();
        let ball = Ball::new(1.0);

        let touching = Isometry::translation(1.5, 0.0, 0.0);
        assert!(local_shapes_overlap(
            &touching,
            &ball,
            &ball,
            &touching.translation.vector,
            &settings
        ));

        let apart = Isometry::translation(2.5, 0.0, 0.0);
        assert!(!local_shapes_overlap(
            &apart,
            &ball,
            &ball,
            &apart.translation.vector,
            &settings
        ));
    }

    #[test]
    fn surface_cast_depth_matches_ball_overlap() {
        let settings = QuerySettings::default();
        let ball = Ball::new(1.0);
        let pos12 = Isometry::translation(1.0, 0.0, 0.0);

        let (t, normal) = local_surface_cast(
            &pos12,
            &ball,
            &ball,
            &Vector::new(1.0, 0.0, 0.0),
            &settings,
        );
        assert_relative_eq!(t, 1.0, epsilon = 1.0e-3);
        assert_relative_eq!(normal, Vector::new(1.0, 0.0, 0.0), epsilon = 1.0e-3);
    }

    #[test]
    fn overlap_position_exists_only_during_overlap() {
        let settings = QuerySettings::default();
        let ball = Ball::new(1.0);

        let overlapping = Isometry::translation(0.5, 0.0, 0.0);
        assert!(local_overlap_position(
            &overlapping,
            &ball,
            &ball,
            &overlapping.translation.vector,
            &settings
        )
        .is_some());

        let apart = Isometry::translation(3.0, 0.0, 0.0);
        assert!(local_overlap_position(
            &apart,
            &ball,
            &ball,
            &apart.translation.vector,
            &settings
        )
        .is_none());
    }

    #[test]
    fn contact_reports_depth_and_world_normal() {
        let settings = QuerySettings::default();
        let ball = Ball::new(1.0);
        let pos1 = Isometry::identity();
        let pos2 = Isometry::translation(1.2, 0.0, 0.0);

        let mut axis = Vector::zeros();
        let contact = contact(&pos1, &ball, &pos2, &ball, &mut axis, &settings)
            .expect("overlapping balls must produce a contact");
        assert_relative_eq!(contact.depth, 0.8, epsilon = 1.0e-3);
        assert_relative_eq!(contact.normal.x, 1.0, epsilon = 1.0e-3);
        assert!(axis.norm() > 0.0);
    }

    #[test]
    fn sweep_hits_head_on_and_misses_sideways() {
        let settings = QuerySettings::default();
        let ball = Ball::new(0.5);
        let pos1 = Isometry::identity();
        let pos2 = Isometry::translation(3.0, 0.0, 0.0);

        let hit = sweep(
            &pos1,
            &ball,
            &pos2,
            &ball,
            &Vector::new(4.0, 0.0, 0.0),
            &Vector::zeros(),
            &settings,
        )
        .expect("head-on sweep must hit");
        assert_relative_eq!(hit.toi, 0.5, epsilon = 1.0e-2);
        assert_relative_eq!(hit.normal.x, 1.0, epsilon = 1.0e-2);
        assert_relative_eq!(hit.witness.x, 2.5, epsilon = 1.0e-2);

        let far = Isometry::translation(3.0, 5.0, 0.0);
        assert!(sweep(
            &pos1,
            &ball,
            &far,
            &ball,
            &Vector::new(4.0, 0.0, 0.0),
            &Vector::zeros(),
            &settings,
        )
        .is_none());
    }
}
