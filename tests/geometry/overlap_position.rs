use riposte3d::math::{Isometry, Vector};
use riposte3d::query::{mpr, QuerySettings};
use riposte3d::shape::Cuboid;

// The overlap position is used as the interior seed of the penetration
// refinement, so it has to land inside both shapes.
#[test]
fn overlap_position_lies_inside_both_boxes() {
    let settings = QuerySettings::default();
    let cuboid1 = Cuboid::new(Vector::repeat(1.0));
    let cuboid2 = Cuboid::new(Vector::new(0.8, 0.6, 0.9));
    let pos12 = Isometry::translation(0.5, 0.2, -0.3);

    let position = mpr::local_overlap_position(
        &pos12,
        &cuboid1,
        &cuboid2,
        &pos12.translation.vector,
        &settings,
    )
    .unwrap();

    let tolerance = 5.0e-2;
    for i in 0..3 {
        assert!(position[i].abs() <= cuboid1.half_extents[i] + tolerance);
    }
    let in_second = pos12.inverse_transform_point(&position);
    for i in 0..3 {
        assert!(in_second[i].abs() <= cuboid2.half_extents[i] + tolerance);
    }
}

#[test]
fn separated_boxes_have_no_overlap_position() {
    let settings = QuerySettings::default();
    let cuboid = Cuboid::new(Vector::repeat(1.0));
    let pos12 = Isometry::translation(3.0, 0.0, 0.0);

    assert!(mpr::local_overlap_position(
        &pos12,
        &cuboid,
        &cuboid,
        &pos12.translation.vector,
        &settings,
    )
    .is_none());
}

#[test]
fn coincident_centers_overlap_at_the_origin() {
    let settings = QuerySettings::default();
    let cuboid = Cuboid::new(Vector::repeat(1.0));
    let pos12 = Isometry::identity();

    let position = mpr::local_overlap_position(
        &pos12,
        &cuboid,
        &cuboid,
        &pos12.translation.vector,
        &settings,
    )
    .unwrap();
    assert_relative_eq!(position, riposte3d::math::Point::origin());
}
