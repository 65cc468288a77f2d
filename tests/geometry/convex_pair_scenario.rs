use riposte3d::math::{Isometry, Real, Vector};
use riposte3d::query::pair::{CollisionState, ConvexPairTester};
use riposte3d::query::QuerySettings;
use riposte3d::shape::{Cuboid, SupportMap};

fn step(tester: &mut ConvexPairTester, distance: Real, settings: &QuerySettings) -> Option<Real> {
    let cuboid = Cuboid::new(Vector::repeat(0.5));
    let pos1 = Isometry::identity();
    let pos2 = Isometry::translation(distance, 0.0, 0.0);
    tester
        .generate_contact(&pos1, &cuboid, &pos2, &cuboid, None, settings)
        .map(|contact| contact.depth)
}

// Drive a box past another and back out again, one frame per distance. The
// tester must follow with its state machine and report depths that grow on
// the way in and shrink on the way out.
#[test]
fn approach_and_retreat_walks_the_state_machine() {
    let settings = QuerySettings::default();
    let mut tester = ConvexPairTester::new();
    // Half-extents 0.5 with the default margin: margins meet at 1.0, the
    // cores at 0.92.
    let margin_sum = 2.0 * Cuboid::new(Vector::repeat(0.5)).margin();

    assert!(step(&mut tester, 3.0, &settings).is_none());
    assert_eq!(tester.state(), CollisionState::Separated);

    let shallow = step(&mut tester, 0.98, &settings).unwrap();
    assert_eq!(tester.state(), CollisionState::ShallowContact);
    assert_relative_eq!(shallow, margin_sum - (0.98 - 0.92), epsilon = 1.0e-4);

    let deep = step(&mut tester, 0.8, &settings).unwrap();
    assert_eq!(tester.state(), CollisionState::DeepContact);
    assert!(deep > shallow);
    assert_relative_eq!(deep, 0.2, epsilon = 1.0e-2);

    let emerging = step(&mut tester, 0.98, &settings).unwrap();
    assert_eq!(tester.state(), CollisionState::ShallowContact);
    assert!(emerging < deep);

    assert!(step(&mut tester, 3.0, &settings).is_none());
    assert_eq!(tester.state(), CollisionState::Separated);
}

// Teleporting straight into a deep overlap skips the shallow frames, so no
// closest points exist to seed the penetration cast. The relative velocity
// takes over as the seed.
#[test]
fn velocity_seeds_a_deep_contact_from_a_standing_start() {
    let settings = QuerySettings::default();
    let mut tester = ConvexPairTester::new();

    let cuboid = Cuboid::new(Vector::repeat(0.5));
    let pos1 = Isometry::identity();
    let pos2 = Isometry::translation(0.7, 0.0, 0.0);
    let velocity = Vector::new(3.0, 0.0, 0.0);

    let contact = tester
        .generate_contact(&pos1, &cuboid, &pos2, &cuboid, Some(&velocity), &settings)
        .unwrap();
    assert_eq!(tester.state(), CollisionState::DeepContact);
    assert!(contact.normal.x > 0.99);
    assert_relative_eq!(contact.depth, 0.3, epsilon = 1.0e-2);
}
