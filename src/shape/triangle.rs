use crate::math::{Point, Real, UnitVector, Vector, DEFAULT_EPSILON};
use crate::shape::{SupportMap, DEFAULT_MARGIN};

/// The sides of a triangle able to generate contacts.
///
/// One-sided triangles let objects approaching from their back side pass
/// through, which is the usual setup for closed meshes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TriangleSidedness {
    /// Both sides of the triangle generate contacts.
    DoubleSided,
    /// Only the side from which the winding appears clockwise generates contacts.
    Clockwise,
    /// Only the side from which the winding appears counterclockwise generates contacts.
    Counterclockwise,
}

/// A triangle shape.
#[derive(PartialEq, Debug, Copy, Clone)]
pub struct Triangle {
    /// The first vertex of the triangle.
    pub a: Point,
    /// The second vertex of the triangle.
    pub b: Point,
    /// The third vertex of the triangle.
    pub c: Point,
    /// The sides of this triangle able to generate contacts.
    pub sidedness: TriangleSidedness,
    margin: Real,
}

impl Triangle {
    /// Creates a double-sided triangle from its vertices, with the default
    /// collision margin.
    pub fn new(a: Point, b: Point, c: Point) -> Triangle {
        Triangle {
            a,
            b,
            c,
            sidedness: TriangleSidedness::DoubleSided,
            margin: DEFAULT_MARGIN,
        }
    }

    /// Creates a triangle with an explicit collision margin.
    ///
    /// Negative margins are clamped to zero.
    pub fn with_margin(a: Point, b: Point, c: Point, margin: Real) -> Triangle {
        Triangle {
            a,
            b,
            c,
            sidedness: TriangleSidedness::DoubleSided,
            margin: margin.max(0.0),
        }
    }

    /// Creates a triangle recentered so that its local origin matches its
    /// centroid. Also returns the centroid the vertices were shifted by.
    ///
    /// Shapes fed to the iterative queries work best when they contain their
    /// local origin.
    pub fn centered(a: Point, b: Point, c: Point) -> (Triangle, Point) {
        let center = Point::from((a.coords + b.coords + c.coords) / 3.0);
        let triangle = Triangle::new(a - center.coords, b - center.coords, c - center.coords);
        (triangle, center)
    }

    /// The normal of this triangle scaled by twice its area.
    pub fn scaled_normal(&self) -> Vector {
        let ab = self.b - self.a;
        let ac = self.c - self.a;
        ab.cross(&ac)
    }

    /// The unit normal of this triangle, or `None` if it is degenerate.
    ///
    /// The normal points towards the side from which the vertices appear in
    /// counterclockwise order.
    pub fn normal(&self) -> Option<UnitVector> {
        UnitVector::try_new(self.scaled_normal(), DEFAULT_EPSILON)
    }
}

impl SupportMap for Triangle {
    fn local_support_point(&self, dir: &Vector) -> Point {
        let dot_a = dir.dot(&self.a.coords);
        let dot_b = dir.dot(&self.b.coords);
        let dot_c = dir.dot(&self.c.coords);
        if dot_a > dot_b && dot_a > dot_c {
            self.a
        } else if dot_b > dot_c {
            self.b
        } else {
            self.c
        }
    }

    #[inline]
    fn margin(&self) -> Real {
        self.margin
    }

    #[inline]
    fn minimum_radius(&self) -> Real {
        0.0
    }

    fn maximum_radius(&self) -> Real {
        self.margin
            + self
                .a
                .coords
                .norm()
                .max(self.b.coords.norm())
                .max(self.c.coords.norm())
    }
}
