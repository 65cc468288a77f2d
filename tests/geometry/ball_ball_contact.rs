use riposte3d::math::{Point, Vector};
use riposte3d::query::contact::contact_ball_ball;
use riposte3d::query::QuerySettings;
use riposte3d::shape::Ball;

// Two unit balls accept a contact up to radius sum plus the maximum contact
// distance, 2.1 with the defaults. Within the speculative band the depth is
// negative.
#[test]
fn contact_acceptance_ends_at_the_maximum_contact_distance() {
    let settings = QuerySettings::default();
    let ball = Ball::new(1.0);
    let center1 = Point::origin();

    let speculative = contact_ball_ball(
        &center1,
        &ball,
        &Point::new(2.09, 0.0, 0.0),
        &ball,
        &settings,
    )
    .unwrap();
    assert_relative_eq!(speculative.depth, -0.09, epsilon = 1.0e-5);
    assert_relative_eq!(*speculative.normal, Vector::x(), epsilon = 1.0e-6);
    assert_relative_eq!(speculative.position, Point::new(1.045, 0.0, 0.0), epsilon = 1.0e-5);

    assert!(contact_ball_ball(
        &center1,
        &ball,
        &Point::new(2.11, 0.0, 0.0),
        &ball,
        &settings,
    )
    .is_none());
}

#[test]
fn overlapping_balls_have_a_positive_depth() {
    let settings = QuerySettings::default();
    let ball = Ball::new(1.0);

    let contact = contact_ball_ball(
        &Point::origin(),
        &ball,
        &Point::new(0.0, 1.9, 0.0),
        &ball,
        &settings,
    )
    .unwrap();
    assert_relative_eq!(contact.depth, 0.1, epsilon = 1.0e-5);
    assert_relative_eq!(*contact.normal, Vector::y(), epsilon = 1.0e-6);
    // Equal radii put the contact point halfway between the centers.
    assert_relative_eq!(contact.position, Point::new(0.0, 0.95, 0.0), epsilon = 1.0e-5);
}

// The acceptance band follows the setting, not a hardcoded constant.
#[test]
fn widening_the_contact_distance_widens_the_acceptance_band() {
    let mut settings = QuerySettings::default();
    settings.set_maximum_contact_distance(0.2).unwrap();
    let ball = Ball::new(1.0);

    let contact = contact_ball_ball(
        &Point::origin(),
        &ball,
        &Point::new(2.15, 0.0, 0.0),
        &ball,
        &settings,
    )
    .unwrap();
    assert_relative_eq!(contact.depth, -0.15, epsilon = 1.0e-5);
}
