use crate::math::{Point, Real, EPSILON};

/// Computes the closest points between the segments `p1q1` and `p2q2`.
///
/// Returns the parameters `s` and `t` locating the closest points along each
/// segment, followed by the closest points themselves.
pub fn closest_points_between_segments(
    p1: &Point,
    q1: &Point,
    p2: &Point,
    q2: &Point,
) -> (Real, Real, Point, Point) {
    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;
    let a = d1.norm_squared();
    let e = d2.norm_squared();
    let f = d2.dot(&r);

    if a <= EPSILON && e <= EPSILON {
        // These segments are more like points.
        return (0.0, 0.0, *p1, *p2);
    }

    let s;
    let t;
    if a <= EPSILON {
        // First segment is basically a point.
        s = 0.0;
        t = (f / e).clamp(0.0, 1.0);
    } else {
        let c = d1.dot(&r);
        if e <= EPSILON {
            // Second segment is basically a point.
            t = 0.0;
            s = (-c / a).clamp(0.0, 1.0);
        } else {
            let b = d1.dot(&d2);
            let denom = a * e - b * b;

            // If the segments are not parallel, compute the closest point on
            // the first line to the second and clamp to the segment.
            let s0 = if denom != 0.0 {
                ((b * f - c * e) / denom).clamp(0.0, 1.0)
            } else {
                0.5
            };

            let t0 = (b * s0 + f) / e;
            if t0 < 0.0 {
                t = 0.0;
                s = (-c / a).clamp(0.0, 1.0);
            } else if t0 > 1.0 {
                t = 1.0;
                s = ((b - c) / a).clamp(0.0, 1.0);
            } else {
                t = t0;
                s = s0;
            }
        }
    }

    (s, t, p1 + d1 * s, p2 + d2 * t)
}

#[cfg(test)]
mod test {
    use super::closest_points_between_segments;
    use crate::math::Point;

    #[test]
    fn crossing_segments() {
        let (s, t, c1, c2) = closest_points_between_segments(
            &Point::new(-1.0, 0.0, 0.0),
            &Point::new(1.0, 0.0, 0.0),
            &Point::new(0.0, -1.0, 1.0),
            &Point::new(0.0, 1.0, 1.0),
        );
        assert_relative_eq!(s, 0.5);
        assert_relative_eq!(t, 0.5);
        assert_relative_eq!(c1, Point::new(0.0, 0.0, 0.0));
        assert_relative_eq!(c2, Point::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn clamped_to_endpoints() {
        let (s, t, c1, c2) = closest_points_between_segments(
            &Point::new(0.0, 0.0, 0.0),
            &Point::new(1.0, 0.0, 0.0),
            &Point::new(2.0, 1.0, 0.0),
            &Point::new(3.0, 1.0, 0.0),
        );
        assert_eq!(s, 1.0);
        assert_eq!(t, 0.0);
        assert_eq!(c1, Point::new(1.0, 0.0, 0.0));
        assert_eq!(c2, Point::new(2.0, 1.0, 0.0));
    }
}
