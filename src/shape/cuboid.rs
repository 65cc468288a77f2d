use crate::math::{Point, Real, Vector};
use crate::shape::{SupportMap, DEFAULT_MARGIN};
use crate::utils;

/// A box shape centered at its local origin and aligned with its local axes.
///
/// The half-extents describe the full collision shape, margin included. The
/// marginless core used by the iterative queries is the box shrunk by the
/// collision margin on every face.
#[derive(PartialEq, Debug, Copy, Clone)]
pub struct Cuboid {
    /// The half-extents of the cuboid along each local axis.
    pub half_extents: Vector,
    margin: Real,
}

impl Cuboid {
    /// Creates a new cuboid from its half-extents, with the default collision margin.
    pub fn new(half_extents: Vector) -> Cuboid {
        Cuboid {
            half_extents,
            margin: DEFAULT_MARGIN,
        }
    }

    /// Creates a new cuboid with an explicit collision margin.
    ///
    /// Negative margins are clamped to zero.
    pub fn with_margin(half_extents: Vector, margin: Real) -> Cuboid {
        Cuboid {
            half_extents,
            margin: margin.max(0.0),
        }
    }
}

impl SupportMap for Cuboid {
    fn local_support_point(&self, dir: &Vector) -> Point {
        Point::new(
            utils::sign(dir.x) * (self.half_extents.x - self.margin),
            utils::sign(dir.y) * (self.half_extents.y - self.margin),
            utils::sign(dir.z) * (self.half_extents.z - self.margin),
        )
    }

    #[inline]
    fn margin(&self) -> Real {
        self.margin
    }

    fn minimum_radius(&self) -> Real {
        self.half_extents
            .x
            .min(self.half_extents.y)
            .min(self.half_extents.z)
    }

    fn maximum_radius(&self) -> Real {
        self.half_extents.norm()
    }
}

#[cfg(test)]
mod test {
    use super::Cuboid;
    use crate::math::{Point, Vector};
    use crate::shape::SupportMap;

    #[test]
    fn support_point_reaches_the_shrunk_corner() {
        let cuboid = Cuboid::with_margin(Vector::new(1.0, 2.0, 3.0), 0.1);
        let support = cuboid.local_support_point(&Vector::new(1.0, -1.0, 1.0));
        assert_eq!(support, Point::new(0.9, -1.9, 2.9));
    }

    #[test]
    fn zero_direction_component_maps_to_the_face_center() {
        let cuboid = Cuboid::with_margin(Vector::new(1.0, 1.0, 1.0), 0.0);
        let support = cuboid.local_support_point(&Vector::new(0.0, 1.0, 0.0));
        assert_eq!(support, Point::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn margin_expansion_restores_the_full_extent() {
        let cuboid = Cuboid::new(Vector::new(1.0, 1.0, 1.0));
        let support = cuboid.local_support_point_with_margin(&Vector::new(1.0, 0.0, 0.0));
        assert_relative_eq!(support, Point::new(1.0, 0.0, 0.0));
    }
}
