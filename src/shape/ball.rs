use crate::math::{Point, Real, Vector};
use crate::shape::SupportMap;

/// A ball shape centered at its local origin.
///
/// A ball is entirely made of collision margin: its marginless core degenerates
/// to a single point, which keeps the iterative queries operating on it trivial.
#[derive(PartialEq, Debug, Copy, Clone)]
pub struct Ball {
    /// The radius of the ball.
    pub radius: Real,
}

impl Ball {
    /// Creates a new ball from its radius.
    pub fn new(radius: Real) -> Ball {
        Ball { radius }
    }
}

impl SupportMap for Ball {
    #[inline]
    fn local_support_point(&self, _: &Vector) -> Point {
        Point::origin()
    }

    #[inline]
    fn margin(&self) -> Real {
        self.radius
    }

    #[inline]
    fn minimum_radius(&self) -> Real {
        self.radius
    }

    #[inline]
    fn maximum_radius(&self) -> Real {
        self.radius
    }
}
