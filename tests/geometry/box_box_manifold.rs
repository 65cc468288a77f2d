use riposte3d::math::{Isometry, Rotation, Vector};
use riposte3d::query::sat::cuboid_cuboid_manifold;
use riposte3d::shape::Cuboid;

// Two marginless unit boxes overlapping by 0.1 along x. The textbook resting
// contact: one face pair, four corner points, uniform depth.
#[test]
fn offset_unit_boxes_make_four_face_contacts() {
    let cuboid = Cuboid::with_margin(Vector::repeat(0.5), 0.0);
    let pos12 = Isometry::translation(0.9, 0.0, 0.0);

    let manifold = cuboid_cuboid_manifold(&cuboid, &cuboid, &pos12).unwrap();
    assert_relative_eq!(*manifold.normal, Vector::x(), epsilon = 1.0e-6);
    assert_relative_eq!(manifold.depth, 0.1, epsilon = 1.0e-6);
    assert_eq!(manifold.contacts.len(), 4);

    for contact in &manifold.contacts {
        assert_relative_eq!(contact.depth, 0.1, epsilon = 1.0e-6);
        assert_relative_eq!(contact.position.x, 0.4, epsilon = 1.0e-6);
        assert!(contact.position.y.abs() <= 0.5 + 1.0e-6);
        assert!(contact.position.z.abs() <= 0.5 + 1.0e-6);
    }

    let mut ids: Vec<_> = manifold.contacts.iter().map(|c| c.id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![0, 2, 4, 6]);
}

// A tiny nudge of the second box must not change which features produce the
// manifold, or the identifiers tracking them across frames are worthless.
#[test]
fn feature_identifiers_survive_a_small_perturbation() {
    let cuboid = Cuboid::with_margin(Vector::repeat(0.5), 0.0);

    let baseline = cuboid_cuboid_manifold(&cuboid, &cuboid, &Isometry::translation(0.9, 0.0, 0.0))
        .unwrap();
    let mut baseline_ids: Vec<_> = baseline.contacts.iter().map(|c| c.id).collect();
    baseline_ids.sort_unstable();

    let perturbed_pos = Isometry::from_parts(
        riposte3d::math::Translation::new(0.9, 1.0e-4, -2.0e-4),
        Rotation::from_scaled_axis(Vector::new(1.0e-3, -1.0e-3, 5.0e-4)),
    );
    let perturbed = cuboid_cuboid_manifold(&cuboid, &cuboid, &perturbed_pos).unwrap();
    let mut perturbed_ids: Vec<_> = perturbed.contacts.iter().map(|c| c.id).collect();
    perturbed_ids.sort_unstable();

    assert_eq!(baseline_ids, perturbed_ids);
    assert_relative_eq!(perturbed.depth, baseline.depth, epsilon = 1.0e-3);
}

// Whatever the pose, reduction caps a manifold at four points.
#[test]
fn manifolds_never_exceed_four_contacts() {
    let mut rng = oorandom::Rand32::new(1234);
    let cuboid1 = Cuboid::with_margin(Vector::new(1.0, 0.75, 0.5), 0.0);
    let cuboid2 = Cuboid::with_margin(Vector::new(0.6, 1.0, 0.8), 0.0);

    let mut found = 0;
    for _ in 0..500 {
        let rotation = riposte3d::na::Unit::try_new(
            riposte3d::na::Quaternion::new(
                rng.rand_float() - 0.5,
                rng.rand_float() - 0.5,
                rng.rand_float() - 0.5,
                rng.rand_float() - 0.5,
            ),
            1.0e-5,
        )
        .unwrap_or(Rotation::identity());
        let translation = riposte3d::math::Translation::new(
            rng.rand_float() * 2.0 - 1.0,
            rng.rand_float() * 2.0 - 1.0,
            rng.rand_float() * 2.0 - 1.0,
        );
        let pos12 = Isometry::from_parts(translation, rotation);

        if let Some(manifold) = cuboid_cuboid_manifold(&cuboid1, &cuboid2, &pos12) {
            found += 1;
            assert!(manifold.contacts.len() <= 4);
            assert!(manifold.depth >= 0.0);
        }
    }
    assert!(found > 100);
}
