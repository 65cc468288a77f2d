use crate::math::{Point, Real};

/// Computes the barycentric coordinates of `p` with respect to the triangle
/// `abc`, returned as the weights `(u, v, w)` of `a`, `b`, and `c`.
///
/// If the triangle is degenerate, the vertex nearest to `p` receives a weight
/// of one and the others zero.
pub fn barycentric_coordinates(p: &Point, a: &Point, b: &Point, c: &Point) -> (Real, Real, Real) {
    let ab = b - a;
    let ac = c - a;
    let normal = ab.cross(&ac);
    let x = normal.x.abs();
    let y = normal.y.abs();
    let z = normal.z.abs();

    // Project on the coordinate plane where the triangle's shadow is largest.
    let (numerator_u, numerator_v, denominator) = if x >= y && x >= z {
        (
            (p.y - b.y) * (b.z - c.z) - (b.y - c.y) * (p.z - b.z),
            (p.y - c.y) * (c.z - a.z) - (c.y - a.y) * (p.z - c.z),
            normal.x,
        )
    } else if y >= z {
        (
            (p.x - b.x) * (b.z - c.z) - (b.x - c.x) * (p.z - b.z),
            (p.x - c.x) * (c.z - a.z) - (c.x - a.x) * (p.z - c.z),
            -normal.y,
        )
    } else {
        (
            (p.x - b.x) * (b.y - c.y) - (b.x - c.x) * (p.y - b.y),
            (p.x - c.x) * (c.y - a.y) - (c.x - a.x) * (p.y - c.y),
            normal.z,
        )
    };

    if denominator < -1.0e-9 || denominator > 1.0e-9 {
        let inv = 1.0 / denominator;
        let u = numerator_u * inv;
        let v = numerator_v * inv;
        (u, v, 1.0 - u - v)
    } else {
        // Degenerate triangle. Fall back to the nearest vertex.
        let distance1 = na::distance_squared(p, a);
        let distance2 = na::distance_squared(p, b);
        let distance3 = na::distance_squared(p, c);
        if distance1 < distance2 && distance1 < distance3 {
            (1.0, 0.0, 0.0)
        } else if distance2 < distance3 {
            (0.0, 1.0, 0.0)
        } else {
            (0.0, 0.0, 1.0)
        }
    }
}

#[cfg(test)]
mod test {
    use super::barycentric_coordinates;
    use crate::math::Point;

    #[test]
    fn weights_recover_the_point() {
        let a = Point::new(1.0, 0.0, 0.0);
        let b = Point::new(3.0, 1.0, 0.5);
        let c = Point::new(0.0, 2.0, -1.0);
        let p = a + (b - a) * 0.25 + (c - a) * 0.5;
        let (u, v, w) = barycentric_coordinates(&p, &a, &b, &c);
        assert_relative_eq!(u, 0.25, epsilon = 1.0e-5);
        assert_relative_eq!(v, 0.25, epsilon = 1.0e-5);
        assert_relative_eq!(w, 0.5, epsilon = 1.0e-5);
    }

    #[test]
    fn degenerate_triangle_picks_nearest_vertex() {
        let a = Point::new(0.0, 0.0, 0.0);
        let b = Point::new(1.0, 0.0, 0.0);
        let c = Point::new(2.0, 0.0, 0.0);
        let (u, v, w) = barycentric_coordinates(&Point::new(1.9, 1.0, 0.0), &a, &b, &c);
        assert_eq!((u, v, w), (0.0, 0.0, 1.0));
    }
}
