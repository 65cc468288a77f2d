//! Support mapping of the Minkowski difference of two shapes.

use crate::math::{Isometry, Point, Vector};
use crate::shape::SupportMap;

/// The pose of the second shape of a pair expressed in the local frame of the
/// first.
///
/// All the iterative queries of this crate run in that frame: only one
/// transform has to be applied per support point, and results convert back to
/// world space by the first shape's pose alone.
#[inline]
pub fn local_transform(pos1: &Isometry, pos2: &Isometry) -> Isometry {
    pos1.inv_mul(pos2)
}

/// A point of the Configuration-Space Obstacle of two shapes.
///
/// The CSO of two shapes is their Minkowski difference: each of its points is
/// the difference between one support point of each shape. The two original
/// support points are kept alongside the difference so the queries can recover
/// witness points on the original shapes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CSOPoint {
    /// The point of the CSO, equal to `orig1 - orig2`.
    pub point: Point,
    /// The support point of the first shape used to compute `point`.
    pub orig1: Point,
    /// The support point of the second shape used to compute `point`.
    pub orig2: Point,
}

impl CSOPoint {
    /// Creates a CSO point from its two witness points.
    #[inline]
    pub fn new(orig1: Point, orig2: Point) -> Self {
        CSOPoint {
            point: Point::from(orig1 - orig2),
            orig1,
            orig2,
        }
    }

    /// The CSO point at the origin, with both witnesses at their shape's origin.
    #[inline]
    pub fn origin() -> Self {
        CSOPoint::new(Point::origin(), Point::origin())
    }

    /// The support point of the margin-expanded CSO of `g1` and `g2` along
    /// `dir`, every coordinate expressed in the local frame of the first shape.
    pub fn from_shapes<G1, G2>(pos12: &Isometry, g1: &G1, g2: &G2, dir: &Vector) -> Self
    where
        G1: SupportMap + ?Sized,
        G2: SupportMap + ?Sized,
    {
        let orig1 = g1.local_support_point_with_margin(dir);
        let orig2 = g2.support_point_with_margin(pos12, &-dir);
        CSOPoint::new(orig1, orig2)
    }

    /// The support point of the CSO of the marginless cores of `g1` and `g2`
    /// along `dir`, every coordinate expressed in the local frame of the first
    /// shape.
    pub fn from_shapes_without_margin<G1, G2>(pos12: &Isometry, g1: &G1, g2: &G2, dir: &Vector) -> Self
    where
        G1: SupportMap + ?Sized,
        G2: SupportMap + ?Sized,
    {
        let orig1 = g1.local_support_point(dir);
        let orig2 = g2.support_point(pos12, &-dir);
        CSOPoint::new(orig1, orig2)
    }
}

/// The support point of the margin-expanded CSO of `g1` and `g2` along `dir`.
#[inline]
pub fn support_point<G1, G2>(pos12: &Isometry, g1: &G1, g2: &G2, dir: &Vector) -> Point
where
    G1: SupportMap + ?Sized,
    G2: SupportMap + ?Sized,
{
    CSOPoint::from_shapes(pos12, g1, g2, dir).point
}

/// The support point of the CSO of the marginless cores of `g1` and `g2` along
/// `dir`.
#[inline]
pub fn support_point_without_margin<G1, G2>(
    pos12: &Isometry,
    g1: &G1,
    g2: &G2,
    dir: &Vector,
) -> Point
where
    G1: SupportMap + ?Sized,
    G2: SupportMap + ?Sized,
{
    CSOPoint::from_shapes_without_margin(pos12, g1, g2, dir).point
}

/// The support point of the margin-expanded CSO of `g1` and `g2` swept along
/// `sweep`, along the direction `dir`.
///
/// The swept CSO is the union of the CSO at its initial pose and of the CSO
/// translated by the full sweep, so its support point only picks up the sweep
/// when the direction points into it.
pub fn swept_support_point<G1, G2>(
    pos12: &Isometry,
    g1: &G1,
    g2: &G2,
    sweep: &Vector,
    dir: &Vector,
) -> Point
where
    G1: SupportMap + ?Sized,
    G2: SupportMap + ?Sized,
{
    let mut pt = support_point(pos12, g1, g2, dir);
    if dir.dot(sweep) > 0.0 {
        pt += *sweep;
    }
    pt
}

#[cfg(test)]
mod test {
    use super::{local_transform, support_point, CSOPoint};
    use crate::math::{Isometry, Point, Vector};
    use crate::shape::Cuboid;

    #[test]
    fn cso_point_tracks_its_witnesses() {
        let pt = CSOPoint::new(Point::new(1.0, 2.0, 3.0), Point::new(0.5, 0.5, 0.5));
        assert_eq!(pt.point, Point::new(0.5, 1.5, 2.5));
    }

    #[test]
    fn separated_cuboids_keep_the_origin_outside_the_cso() {
        let cuboid = Cuboid::new(Vector::new(0.5, 0.5, 0.5));
        let pos12 = local_transform(
            &Isometry::identity(),
            &Isometry::translation(3.0, 0.0, 0.0),
        );
        // The CSO lies entirely on the negative x side, so even the support
        // along +x stays below zero.
        let support = support_point(&pos12, &cuboid, &cuboid, &Vector::new(1.0, 0.0, 0.0));
        assert_relative_eq!(support.x, -2.0, epsilon = 1.0e-5);
    }
}
