use riposte3d::math::{Isometry, Rotation, Translation, Vector};
use riposte3d::na::Quaternion;
use riposte3d::query::sat::{
    cuboid_cuboid_distance, cuboid_cuboid_intersects, cuboid_cuboid_penetration,
};
use riposte3d::query::{gjk, mpr, QuerySettings};
use riposte3d::shape::Cuboid;

fn random_pose(rng: &mut oorandom::Rand32) -> Isometry {
    let rotation = riposte3d::na::Unit::try_new(
        Quaternion::new(
            rng.rand_float() - 0.5,
            rng.rand_float() - 0.5,
            rng.rand_float() - 0.5,
            rng.rand_float() - 0.5,
        ),
        1.0e-5,
    )
    .unwrap_or(Rotation::identity());
    let translation = Translation::new(
        rng.rand_float() * 8.0 - 4.0,
        rng.rand_float() * 8.0 - 4.0,
        rng.rand_float() * 8.0 - 4.0,
    );
    Isometry::from_parts(translation, rotation)
}

// The three boolean intersection paths must agree on any box pair that is not
// right at the touching boundary. Marginless boxes make the GJK and MPR
// shapes coincide with the ones the exact test sees.
#[test]
fn sat_gjk_and_mpr_agree_on_random_box_pairs() {
    let mut rng = oorandom::Rand32::new(42);
    let settings = QuerySettings::default();
    let cuboid1 = Cuboid::with_margin(Vector::new(1.0, 0.75, 0.5), 0.0);
    let cuboid2 = Cuboid::with_margin(Vector::new(0.6, 1.0, 0.8), 0.0);

    let mut checked = 0;
    let mut overlapping = 0;
    for _ in 0..1000 {
        let pos12 = random_pose(&mut rng);

        let (intersecting, distance, axis) = cuboid_cuboid_penetration(&cuboid1, &cuboid2, &pos12);
        // Near the touching boundary the iterative methods may legitimately
        // land on the other side of the exact answer.
        if distance < 5.0e-2 {
            continue;
        }
        checked += 1;
        overlapping += intersecting as usize;

        assert_eq!(
            cuboid_cuboid_intersects(&cuboid1, &cuboid2, &pos12),
            intersecting
        );

        let mut separating_axis = Vector::zeros();
        assert_eq!(
            gjk::intersection_test(&pos12, &cuboid1, &cuboid2, &mut separating_axis),
            intersecting
        );

        assert_eq!(
            mpr::local_shapes_overlap(
                &pos12,
                &cuboid1,
                &cuboid2,
                &pos12.translation.vector,
                &settings
            ),
            intersecting
        );

        assert_relative_eq!(axis.norm(), 1.0, epsilon = 1.0e-4);
    }
    // The pose distribution must actually exercise both outcomes.
    assert!(checked > 500);
    assert!(overlapping > 5);
}

#[test]
fn distance_and_penetration_agree_on_separated_pairs() {
    let mut rng = oorandom::Rand32::new(7);
    let cuboid1 = Cuboid::with_margin(Vector::new(1.0, 0.75, 0.5), 0.0);
    let cuboid2 = Cuboid::with_margin(Vector::new(0.6, 1.0, 0.8), 0.0);

    let mut separated = 0;
    for _ in 0..1000 {
        let pos12 = random_pose(&mut rng);
        let (intersecting, separation, axis) = cuboid_cuboid_distance(&cuboid1, &cuboid2, &pos12);
        if intersecting {
            assert_eq!(separation, 0.0);
            assert_eq!(axis, Vector::zeros());
            continue;
        }
        separated += 1;

        assert!(separation >= 0.0);
        assert_relative_eq!(axis.norm(), 1.0, epsilon = 1.0e-4);

        let (also_intersecting, distance, penetration_axis) =
            cuboid_cuboid_penetration(&cuboid1, &cuboid2, &pos12);
        assert!(!also_intersecting);
        assert_relative_eq!(distance, separation, epsilon = 1.0e-5);
        assert_relative_eq!(penetration_axis, axis, epsilon = 1.0e-5);
    }
    assert!(separated > 300);
}
