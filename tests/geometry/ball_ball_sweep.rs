use riposte3d::math::{Isometry, Point, Vector};
use riposte3d::query::{mpr, QuerySettings};
use riposte3d::shape::Ball;

// A ball sweeping straight at another must hit when the gap closes, at the
// fraction of the sweep where the surfaces meet.
#[test]
fn closing_balls_hit_at_the_expected_time() {
    let settings = QuerySettings::default();
    let ball = Ball::new(0.5);
    let pos1 = Isometry::identity();
    let pos2 = Isometry::translation(0.0, 10.0, 0.0);
    let sweep1 = Vector::new(0.0, 10.0, 0.0);
    let sweep2 = Vector::zeros();

    let hit = mpr::sweep(&pos1, &ball, &pos2, &ball, &sweep1, &sweep2, &settings).unwrap();
    // Centers 10 apart, surfaces 9 apart, covered at 10 per unit time.
    assert_relative_eq!(hit.toi, 0.9, epsilon = 1.0e-3);
    assert_relative_eq!(hit.normal, Vector::y(), epsilon = 1.0e-3);
    assert_relative_eq!(hit.witness, Point::new(0.0, 9.5, 0.0), epsilon = 2.0e-2);
}

#[test]
fn receding_balls_never_hit() {
    let settings = QuerySettings::default();
    let ball = Ball::new(0.5);
    let pos1 = Isometry::identity();
    let pos2 = Isometry::translation(0.0, 10.0, 0.0);
    let sweep1 = Vector::new(0.0, -10.0, 0.0);
    let sweep2 = Vector::zeros();

    assert!(mpr::sweep(&pos1, &ball, &pos2, &ball, &sweep1, &sweep2, &settings).is_none());
}

#[test]
fn sweeps_falling_short_of_the_gap_miss() {
    let settings = QuerySettings::default();
    let ball = Ball::new(0.5);
    let pos1 = Isometry::identity();
    let pos2 = Isometry::translation(0.0, 10.0, 0.0);
    // Surfaces are 9 apart; this only covers 8.
    let sweep1 = Vector::new(0.0, 8.0, 0.0);
    let sweep2 = Vector::zeros();

    assert!(mpr::sweep(&pos1, &ball, &pos2, &ball, &sweep1, &sweep2, &settings).is_none());
}

// Both shapes moving: only the relative sweep matters.
#[test]
fn relative_motion_decides_the_impact_time() {
    let settings = QuerySettings::default();
    let ball = Ball::new(0.5);
    let pos1 = Isometry::identity();
    let pos2 = Isometry::translation(0.0, 10.0, 0.0);
    let sweep1 = Vector::new(0.0, 5.0, 0.0);
    let sweep2 = Vector::new(0.0, -5.0, 0.0);

    let hit = mpr::sweep(&pos1, &ball, &pos2, &ball, &sweep1, &sweep2, &settings).unwrap();
    assert_relative_eq!(hit.toi, 0.9, epsilon = 1.0e-3);
}
