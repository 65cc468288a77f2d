use crate::math::{Isometry, Point, UnitVector, Vector, EPSILON};
use crate::query::{ContactData, QuerySettings};
use crate::shape::{Ball, Cuboid};

/// Contact between a cuboid and a ball, if they lie within the maximum contact
/// distance of each other.
///
/// The contact position sits on the cuboid at the point closest to the ball's
/// center. A ball whose center is inside the cuboid exits through the nearest
/// face.
pub fn contact_cuboid_ball(
    pos1: &Isometry,
    cuboid: &Cuboid,
    pos2: &Point,
    ball: &Ball,
    settings: &QuerySettings,
) -> Option<ContactData> {
    let half_extents = cuboid.half_extents;
    let local_position = pos1.inverse_transform_point(pos2);
    let local_closest = Point::new(
        local_position.x.clamp(-half_extents.x, half_extents.x),
        local_position.y.clamp(-half_extents.y, half_extents.y),
        local_position.z.clamp(-half_extents.z, half_extents.z),
    );

    let position = pos1 * local_closest;
    let offset = pos2 - position;
    let sq_length = offset.norm_squared();
    let threshold = ball.radius + settings.maximum_contact_distance();
    if sq_length > threshold * threshold {
        return None;
    }

    if sq_length > EPSILON {
        // The ball's center lies outside of the cuboid.
        let length = sq_length.sqrt();
        let normal = UnitVector::new_unchecked(offset / length);
        Some(ContactData::new(position, normal, ball.radius - length))
    } else {
        // The ball's center lies inside of the cuboid. Exit through the face
        // nearest to the center.
        let depths = Vector::new(
            if local_closest.x < 0.0 {
                local_closest.x + half_extents.x
            } else {
                half_extents.x - local_closest.x
            },
            if local_closest.y < 0.0 {
                local_closest.y + half_extents.y
            } else {
                half_extents.y - local_closest.y
            },
            if local_closest.z < 0.0 {
                local_closest.z + half_extents.z
            } else {
                half_extents.z - local_closest.z
            },
        );

        let (local_normal, depth) = if depths.x < depths.y && depths.x < depths.z {
            let normal = if local_closest.x > 0.0 {
                Vector::x()
            } else {
                -Vector::x()
            };
            (normal, depths.x)
        } else if depths.y < depths.z {
            let normal = if local_closest.y > 0.0 {
                Vector::y()
            } else {
                -Vector::y()
            };
            (normal, depths.y)
        } else {
            let normal = if local_closest.z > 0.0 {
                Vector::z()
            } else {
                -Vector::z()
            };
            (normal, depths.z)
        };

        let normal = UnitVector::new_unchecked(pos1 * local_normal);
        Some(ContactData::new(position, normal, depth + ball.radius))
    }
}

#[cfg(test)]
mod test {
    use super::contact_cuboid_ball;
    use crate::math::{Isometry, Point, Vector};
    use crate::query::QuerySettings;
    use crate::shape::{Ball, Cuboid};

    #[test]
    fn ball_resting_on_a_face() {
        let settings = QuerySettings::default();
        let cuboid = Cuboid::new(Vector::new(1.0, 1.0, 1.0));
        let ball = Ball::new(0.5);
        let contact = contact_cuboid_ball(
            &Isometry::identity(),
            &cuboid,
            &Point::new(0.0, 1.4, 0.0),
            &ball,
            &settings,
        )
        .unwrap();
        assert_relative_eq!(contact.position, Point::new(0.0, 1.0, 0.0));
        assert_relative_eq!(contact.normal.y, 1.0);
        assert_relative_eq!(contact.depth, 0.1, epsilon = 1.0e-6);
    }

    #[test]
    fn center_inside_exits_through_the_nearest_face() {
        let settings = QuerySettings::default();
        let cuboid = Cuboid::new(Vector::new(2.0, 2.0, 1.0));
        let ball = Ball::new(0.25);
        let contact = contact_cuboid_ball(
            &Isometry::identity(),
            &cuboid,
            &Point::new(0.0, 0.0, 0.5),
            &ball,
            &settings,
        )
        .unwrap();
        assert_relative_eq!(contact.normal.z, 1.0);
        assert_relative_eq!(contact.depth, 0.75);
    }

    #[test]
    fn ball_beyond_the_contact_distance() {
        let settings = QuerySettings::default();
        let cuboid = Cuboid::new(Vector::new(1.0, 1.0, 1.0));
        let ball = Ball::new(0.5);
        let contact = contact_cuboid_ball(
            &Isometry::identity(),
            &cuboid,
            &Point::new(0.0, 2.0, 0.0),
            &ball,
            &settings,
        );
        assert!(contact.is_none());
    }

    #[test]
    fn rotated_cuboid_reports_world_frame_results() {
        let settings = QuerySettings::default();
        let cuboid = Cuboid::new(Vector::new(1.0, 1.0, 1.0));
        let ball = Ball::new(0.5);
        let pos1 = Isometry::rotation(Vector::z() * core::f32::consts::FRAC_PI_2);
        let contact = contact_cuboid_ball(
            &pos1,
            &cuboid,
            &Point::new(1.4, 0.0, 0.0),
            &ball,
            &settings,
        )
        .unwrap();
        assert_relative_eq!(contact.position, Point::new(1.0, 0.0, 0.0), epsilon = 1.0e-6);
        assert_relative_eq!(contact.normal.x, 1.0, epsilon = 1.0e-6);
    }
}
