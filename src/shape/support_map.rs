use crate::math::{Isometry, Point, Real, Vector, EPSILON};

/// Trait implemented by convex shapes usable by the support-mapping based queries.
///
/// A support mapping yields the point of a shape with the greatest projection on a
/// given direction. Every shape is split into a marginless core and a collision
/// margin expanding that core in all directions: the shape actually collided
/// against is the expanded one, but most queries run on the core and reintroduce
/// the margins analytically afterwards.
pub trait SupportMap {
    /// The support point of the marginless core of this shape, in its local frame.
    fn local_support_point(&self, dir: &Vector) -> Point;

    /// The collision margin surrounding the core of this shape.
    fn margin(&self) -> Real;

    /// The radius of the largest sphere centered at the shape's local origin and
    /// fully contained by the shape.
    fn minimum_radius(&self) -> Real;

    /// The radius of the smallest sphere centered at the shape's local origin and
    /// fully containing the shape.
    fn maximum_radius(&self) -> Real;

    /// The support point of the core of this shape expanded by its collision
    /// margin, in its local frame.
    fn local_support_point_with_margin(&self, dir: &Vector) -> Point {
        let mut pt = self.local_support_point(dir);
        let sq_length = dir.norm_squared();
        if sq_length > EPSILON {
            pt += dir * (self.margin() / sq_length.sqrt());
        }
        pt
    }

    /// The support point of the marginless core of this shape transformed by
    /// `transform`, along a direction given in the frame `transform` maps into.
    fn support_point(&self, transform: &Isometry, dir: &Vector) -> Point {
        let local_dir = transform.inverse_transform_vector(dir);
        transform * self.local_support_point(&local_dir)
    }

    /// Same as [`SupportMap::support_point`], with the collision margin applied.
    fn support_point_with_margin(&self, transform: &Isometry, dir: &Vector) -> Point {
        let local_dir = transform.inverse_transform_vector(dir);
        transform * self.local_support_point_with_margin(&local_dir)
    }
}
