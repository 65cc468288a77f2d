use crate::math::{Point, UnitVector, Vector, EPSILON};
use crate::query::ContactData;
use crate::shape::{Ball, SupportMap, Triangle, TriangleSidedness};
use crate::utils::{self, VoronoiRegion};

/// Contact between a triangle and a ball centered at the origin of the
/// triangle's frame.
///
/// Also returns the Voronoi region of the triangle the contact belongs to.
/// One-sided triangles reject balls approaching from their pass-through side.
pub fn contact_triangle_ball(
    triangle: &Triangle,
    ball: &Ball,
) -> Option<(ContactData, VoronoiRegion)> {
    let ab = triangle.b - triangle.a;
    let ac = triangle.c - triangle.a;
    let mut normal = ab.cross(&ac);
    if normal.norm_squared() < EPSILON * 0.01 {
        // The triangle is degenerate. Use the offset between its center and
        // the ball instead.
        normal = (triangle.a.coords + triangle.b.coords + triangle.c.coords) / 3.0;
        if normal.norm_squared() < EPSILON * 0.01 {
            normal = Vector::y();
        }
    }

    // Orient the plane normal away from the ball, rejecting pass-through sides.
    let dot = normal.dot(&triangle.a.coords);
    match triangle.sidedness {
        TriangleSidedness::DoubleSided => {
            if dot < 0.0 {
                normal = -normal;
            }
        }
        TriangleSidedness::Clockwise => {
            if dot > 0.0 {
                return None;
            }
            normal = -normal;
        }
        TriangleSidedness::Counterclockwise => {
            if dot < 0.0 {
                return None;
            }
        }
    }

    let (closest, region) = utils::closest_point_on_triangle(
        &triangle.a,
        &triangle.b,
        &triangle.c,
        &Point::origin(),
    );
    let sq_length = closest.coords.norm_squared();
    let margin_sum = triangle.margin() + ball.radius;

    if sq_length <= margin_sum * margin_sum {
        if sq_length < EPSILON {
            // The ball's center is right on the triangle. Normalizing the
            // offset would be dangerous, so fall back to the plane normal.
            let normal = UnitVector::new_normalize(-normal);
            let contact = ContactData::new(Point::origin(), normal, margin_sum);
            return Some((contact, region));
        }

        let length = sq_length.sqrt();
        let normal = UnitVector::new_unchecked(-closest.coords / length);
        let contact = ContactData::new(closest, normal, margin_sum - length);
        return Some((contact, region));
    }

    None
}
