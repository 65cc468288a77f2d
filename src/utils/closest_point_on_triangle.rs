use crate::math::Point;

/// The Voronoi region of a triangle containing a query point.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VoronoiRegion {
    /// The region of the vertex `a`.
    A,
    /// The region of the vertex `b`.
    B,
    /// The region of the vertex `c`.
    C,
    /// The region of the edge `ab`.
    AB,
    /// The region of the edge `ac`.
    AC,
    /// The region of the edge `bc`.
    BC,
    /// The region of the triangle face itself.
    ABC,
}

/// Computes the point of the triangle `abc` closest to `p`, as well as the
/// Voronoi region containing that closest point.
pub fn closest_point_on_triangle(
    a: &Point,
    b: &Point,
    c: &Point,
    p: &Point,
) -> (Point, VoronoiRegion) {
    let ab = b - a;
    let ac = c - a;

    // Vertex region A.
    let ap = p - a;
    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 < 0.0 {
        return (*a, VoronoiRegion::A);
    }

    // Vertex region B.
    let bp = p - b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return (*b, VoronoiRegion::B);
    }

    // Edge region AB.
    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return (a + ab * v, VoronoiRegion::AB);
    }

    // Vertex region C.
    let cp = p - c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return (*c, VoronoiRegion::C);
    }

    // Edge region AC.
    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return (a + ac * w, VoronoiRegion::AC);
    }

    // Edge region BC.
    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return (b + (c - b) * w, VoronoiRegion::BC);
    }

    // The projection lies on the face itself.
    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    (a + ab * v + ac * w, VoronoiRegion::ABC)
}
