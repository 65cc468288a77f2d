use riposte3d::math::{Point, Real, Vector};
use riposte3d::query::pair::{TriangleConvexPairTester, TrianglePairState};
use riposte3d::query::QuerySettings;
use riposte3d::shape::{Ball, SupportMap, Triangle};

// A floor patch right under the ball. The face region covers the ball center,
// so the cheap plane test owns this pair.
fn floor_triangle() -> Triangle {
    Triangle::new(
        Point::new(-2.0, -0.45, -2.0),
        Point::new(2.0, -0.45, -2.0),
        Point::new(0.0, -0.45, 2.0),
    )
}

// Same patch shifted sideways until the ball hangs off its edge.
fn edge_triangle() -> Triangle {
    Triangle::new(
        Point::new(0.3, -0.2, -1.0),
        Point::new(0.3, -0.2, 1.0),
        Point::new(1.3, -0.2, 0.0),
    )
}

fn far_triangle() -> Triangle {
    Triangle::new(
        Point::new(100.3, -0.2, -1.0),
        Point::new(100.3, -0.2, 1.0),
        Point::new(101.3, -0.2, 0.0),
    )
}

// One tester, one ball, a sequence of triangle positions mimicking the ball
// rolling off a mesh patch and coming back. The tester must move between the
// plane test, the external states and back, and produce the right contact in
// each of them.
#[test]
fn ball_rolling_off_a_patch_walks_the_states() {
    let settings = QuerySettings::default();
    let mut tester = TriangleConvexPairTester::new();
    let ball = Ball::new(0.5);
    let margin_sum = ball.margin() + floor_triangle().margin();

    // Resting on the face: one plane contact pointing down into the floor.
    let contacts = tester.generate_contacts(&ball, &floor_triangle(), &settings);
    assert_eq!(tester.state(), TrianglePairState::Plane);
    assert_eq!(contacts.len(), 1);
    assert_relative_eq!(*contacts[0].normal, -Vector::y(), epsilon = 1.0e-6);
    assert_relative_eq!(contacts[0].depth, margin_sum - 0.45, epsilon = 1.0e-5);

    // The patch moves far away; the face region no longer covers the ball.
    let contacts = tester.generate_contacts(&ball, &far_triangle(), &settings);
    assert!(contacts.is_empty());
    assert_eq!(tester.state(), TrianglePairState::ExternalSeparated);

    // Hanging off the edge: a near contact against the closest edge point.
    let contacts = tester.generate_contacts(&ball, &edge_triangle(), &settings);
    assert_eq!(tester.state(), TrianglePairState::ExternalNear);
    assert!(!tester.should_correct_contact_normal());
    assert_eq!(contacts.len(), 1);
    let edge_point = Vector::new(0.3, -0.2, 0.0);
    let distance = edge_point.norm();
    assert_relative_eq!(contacts[0].depth, margin_sum - distance, epsilon = 1.0e-3);
    assert_relative_eq!(
        *contacts[0].normal,
        edge_point / distance,
        epsilon = 1.0e-3
    );

    // Gone again. After enough consecutive misses the tester escapes back to
    // the cheap plane test instead of paying for GJK forever.
    let mut calls = 0;
    loop {
        let contacts = tester.generate_contacts(&ball, &far_triangle(), &settings);
        assert!(contacts.is_empty());
        calls += 1;
        if tester.state() == TrianglePairState::Plane {
            break;
        }
        assert!(calls < 25, "the tester never escaped to the plane test");
    }

    // And the floor is back under the ball.
    let contacts = tester.generate_contacts(&ball, &floor_triangle(), &settings);
    assert_eq!(tester.state(), TrianglePairState::Plane);
    assert_eq!(contacts.len(), 1);
    assert_relative_eq!(contacts[0].depth, margin_sum - 0.45, epsilon = 1.0e-5);
}

// Driving the ball into the triangle plane keeps the contact set within its
// two point bound and the depths consistent with the drop.
#[test]
fn plane_contact_depth_follows_the_ball() {
    let settings = QuerySettings::default();
    let mut tester = TriangleConvexPairTester::new();
    let margin_sum = Ball::new(0.5).margin() + floor_triangle().margin();

    let mut previous_depth = -Real::MAX;
    // Lower the floor towards the ball, one step per frame.
    for step in 0..4 {
        let height = -0.53 + 0.04 * step as Real;
        let triangle = Triangle::new(
            Point::new(-2.0, height, -2.0),
            Point::new(2.0, height, -2.0),
            Point::new(0.0, height, 2.0),
        );
        let contacts = tester.generate_contacts(&Ball::new(0.5), &triangle, &settings);
        assert!(contacts.len() <= 2);
        assert_eq!(contacts.len(), 1);
        assert_relative_eq!(contacts[0].depth, margin_sum + height, epsilon = 1.0e-5);
        assert!(contacts[0].depth > previous_depth);
        previous_depth = contacts[0].depth;
    }
}
