use crate::math::{Point, UnitVector, Vector, BIG_EPSILON};
use crate::query::{ContactData, QuerySettings};
use crate::shape::Ball;

/// Contact between two balls, if they lie within the maximum contact distance
/// of each other.
///
/// Since balls are rotationally invariant, only their positions matter.
pub fn contact_ball_ball(
    pos1: &Point,
    ball1: &Ball,
    pos2: &Point,
    ball2: &Ball,
    settings: &QuerySettings,
) -> Option<ContactData> {
    let radius_sum = ball1.radius + ball2.radius;
    let displacement = pos2 - pos1;
    let sq_length = displacement.norm_squared();
    let threshold = radius_sum + settings.maximum_contact_distance();

    if sq_length < threshold * threshold {
        let position = if radius_sum > 0.0 {
            pos1 + displacement * (ball1.radius / radius_sum)
        } else {
            pos1 + displacement * 0.5
        };

        let length = sq_length.sqrt();
        let normal = if length > BIG_EPSILON {
            UnitVector::new_unchecked(displacement / length)
        } else {
            Vector::y_axis()
        };

        Some(ContactData::new(position, normal, radius_sum - length))
    } else {
        None
    }
}
