use crate::math::{Isometry, Matrix, Real, Vector, EPSILON};
use crate::shape::Cuboid;

/// Bias subtracted from the second box's face axes so that, all else being
/// close to equal, the first box's face wins the minimum-translation contest
/// and the manifold stays stable across frames.
const ANTI_B_FACE_BIAS: Real = 0.01;
/// Same idea, biasing faces over edge-edge features.
const ANTI_EDGE_BIAS: Real = 0.01;

/// The kind of feature pair realizing the minimum translation distance.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(super) enum MinimumFeature {
    /// A face of the first box against a vertex, edge, or face of the second.
    FaceA,
    /// A face of the second box against a vertex, edge, or face of the first.
    FaceB,
    /// An edge of each box crossing each other.
    Edge,
}

/// Precomputed terms shared by all fifteen axis tests.
///
/// The rotation matrix maps the second box's local axes into the first box's
/// frame; its absolute value is padded with an epsilon per entry so that
/// near-parallel edge cross products never produce a false separation.
struct AxisTests {
    a: Vector,
    b: Vector,
    t: Vector,
    r: Matrix,
    abs_r: Matrix,
}

impl AxisTests {
    fn new(cuboid1: &Cuboid, cuboid2: &Cuboid, pos12: &Isometry) -> Self {
        let r = pos12.rotation.to_rotation_matrix().into_inner();
        AxisTests {
            a: cuboid1.half_extents,
            b: cuboid2.half_extents,
            t: pos12.translation.vector,
            abs_r: r.map(|e| e.abs() + EPSILON),
            r,
        }
    }

    /// Projection and radius sum along the `i`-th axis of the first box.
    fn face_a(&self, i: usize) -> (Real, Real) {
        let rarb = self.a[i]
            + self.b.x * self.abs_r[(i, 0)]
            + self.b.y * self.abs_r[(i, 1)]
            + self.b.z * self.abs_r[(i, 2)];
        (self.t[i], rarb)
    }

    /// Projection and radius sum along the `j`-th axis of the second box.
    fn face_b(&self, j: usize) -> (Real, Real) {
        let rarb = self.b[j]
            + self.a.x * self.abs_r[(0, j)]
            + self.a.y * self.abs_r[(1, j)]
            + self.a.z * self.abs_r[(2, j)];
        let tl = self.t.x * self.r[(0, j)] + self.t.y * self.r[(1, j)] + self.t.z * self.r[(2, j)];
        (tl, rarb)
    }

    /// Projection and radius sum along the cross product of the `i`-th axis of
    /// the first box with the `j`-th axis of the second. The projection is
    /// taken on the unnormalized cross product.
    fn edge(&self, i: usize, j: usize) -> (Real, Real) {
        let (i1, i2) = ((i + 1) % 3, (i + 2) % 3);
        let (j1, j2) = ((j + 1) % 3, (j + 2) % 3);
        let rarb = self.a[i1] * self.abs_r[(i2, j)]
            + self.a[i2] * self.abs_r[(i1, j)]
            + self.b[j1] * self.abs_r[(i, j2)]
            + self.b[j2] * self.abs_r[(i, j1)];
        let tl = self.t[i2] * self.r[(i1, j)] - self.t[i1] * self.r[(i2, j)];
        (tl, rarb)
    }

    fn a_axis(&self, i: usize) -> Vector {
        let mut axis = Vector::zeros();
        axis[i] = 1.0;
        axis
    }

    fn b_axis(&self, j: usize) -> Vector {
        Vector::new(self.r[(0, j)], self.r[(1, j)], self.r[(2, j)])
    }

    /// The unnormalized cross product of the `i`-th axis of the first box with
    /// the `j`-th axis of the second, in the first box's frame.
    fn edge_axis(&self, i: usize, j: usize) -> Vector {
        let (i1, i2) = ((i + 1) % 3, (i + 2) % 3);
        let mut axis = Vector::zeros();
        axis[i1] = -self.r[(i2, j)];
        axis[i2] = self.r[(i1, j)];
        axis
    }
}

/// Tests whether two cuboids intersect, `pos12` being the pose of the second
/// cuboid relative to the first.
pub fn cuboid_cuboid_intersects(cuboid1: &Cuboid, cuboid2: &Cuboid, pos12: &Isometry) -> bool {
    let tests = AxisTests::new(cuboid1, cuboid2, pos12);

    for i in 0..3 {
        let (tl, rarb) = tests.face_a(i);
        if tl > rarb || tl < -rarb {
            return false;
        }
    }
    for j in 0..3 {
        let (tl, rarb) = tests.face_b(j);
        if tl > rarb || tl < -rarb {
            return false;
        }
    }
    for i in 0..3 {
        for j in 0..3 {
            let (tl, rarb) = tests.edge(i, j);
            if tl > rarb || tl < -rarb {
                return false;
            }
        }
    }
    true
}

/// Tests whether two cuboids intersect and, when they do not, also computes
/// their separation along the witness axis.
///
/// Returns `(intersecting, separation, axis)`. The axis is a unit vector
/// pointing from the first cuboid towards the second; it is zero when the
/// cuboids intersect, in which case the separation is zero as well.
pub fn cuboid_cuboid_distance(
    cuboid1: &Cuboid,
    cuboid2: &Cuboid,
    pos12: &Isometry,
) -> (bool, Real, Vector) {
    let tests = AxisTests::new(cuboid1, cuboid2, pos12);

    for i in 0..3 {
        let (tl, rarb) = tests.face_a(i);
        if tl > rarb {
            return (false, tl - rarb, tests.a_axis(i));
        }
        if tl < -rarb {
            return (false, -tl - rarb, -tests.a_axis(i));
        }
    }
    for j in 0..3 {
        let (tl, rarb) = tests.face_b(j);
        if tl > rarb {
            return (false, tl - rarb, tests.b_axis(j));
        }
        if tl < -rarb {
            return (false, -tl - rarb, -tests.b_axis(j));
        }
    }
    for i in 0..3 {
        for j in 0..3 {
            let (tl, rarb) = tests.edge(i, j);
            if tl > rarb || tl < -rarb {
                let axis = tests.edge_axis(i, j);
                let inverse_length = 1.0 / axis.norm();
                let separation = (tl.abs() - rarb) * inverse_length;
                let axis = if tl > 0.0 {
                    axis * inverse_length
                } else {
                    axis * -inverse_length
                };
                return (false, separation, axis);
            }
        }
    }
    (true, 0.0, Vector::zeros())
}

/// Tests whether two cuboids intersect and computes either their separation or
/// their minimum translation distance.
///
/// Returns `(intersecting, distance, axis)`. The axis is a unit vector
/// pointing from the first cuboid towards the second. On intersection the
/// distance is the positive penetration depth along the axis.
pub fn cuboid_cuboid_penetration(
    cuboid1: &Cuboid,
    cuboid2: &Cuboid,
    pos12: &Isometry,
) -> (bool, Real, Vector) {
    let tests = AxisTests::new(cuboid1, cuboid2, pos12);
    let mut minimum_distance = -Real::MAX;
    let mut minimum_axis = Vector::zeros();

    for i in 0..3 {
        let (tl, rarb) = tests.face_a(i);
        if tl > rarb {
            return (false, tl - rarb, tests.a_axis(i));
        }
        if tl < -rarb {
            return (false, -tl - rarb, -tests.a_axis(i));
        }
        let (distance, axis) = if tl > 0.0 {
            (tl - rarb, tests.a_axis(i))
        } else {
            (-tl - rarb, -tests.a_axis(i))
        };
        if distance > minimum_distance {
            minimum_distance = distance;
            minimum_axis = axis;
        }
    }
    for j in 0..3 {
        let (tl, rarb) = tests.face_b(j);
        if tl > rarb {
            return (false, tl - rarb, tests.b_axis(j));
        }
        if tl < -rarb {
            return (false, -tl - rarb, -tests.b_axis(j));
        }
        let (distance, axis) = if tl > 0.0 {
            (tl - rarb, tests.b_axis(j))
        } else {
            (-tl - rarb, -tests.b_axis(j))
        };
        if distance > minimum_distance {
            minimum_distance = distance;
            minimum_axis = axis;
        }
    }
    for i in 0..3 {
        for j in 0..3 {
            let (tl, rarb) = tests.edge(i, j);
            let axis = tests.edge_axis(i, j);
            let inverse_length = 1.0 / axis.norm();
            if tl > rarb {
                return (false, (tl - rarb) * inverse_length, axis * inverse_length);
            }
            if tl < -rarb {
                return (false, (-tl - rarb) * inverse_length, axis * -inverse_length);
            }
            // A nearly-parallel edge pair has a tiny cross product, which the
            // division blows up into a huge negative distance, keeping such
            // unreliable axes from ever being selected.
            let (distance, axis) = if tl > 0.0 {
                ((tl - rarb) * inverse_length, axis * inverse_length)
            } else {
                ((-tl - rarb) * inverse_length, axis * -inverse_length)
            };
            if distance > minimum_distance {
                minimum_distance = distance;
                minimum_axis = axis;
            }
        }
    }
    (true, -minimum_distance, minimum_axis)
}

/// Runs the fifteen axis tests with the face-favoring biases and classifies
/// the winning feature for contact generation.
///
/// Returns `None` when the cuboids do not intersect. On intersection, the
/// returned distance is negative and the unit axis points from the first
/// cuboid towards the second.
pub(super) fn minimum_separating_feature(
    cuboid1: &Cuboid,
    cuboid2: &Cuboid,
    pos12: &Isometry,
) -> Option<(MinimumFeature, Real, Vector)> {
    let tests = AxisTests::new(cuboid1, cuboid2, pos12);
    let mut minimum_distance = -Real::MAX;
    let mut minimum_axis = Vector::zeros();
    let mut minimum_feature = MinimumFeature::Edge;

    for i in 0..3 {
        let (tl, rarb) = tests.face_a(i);
        if tl > rarb || tl < -rarb {
            return None;
        }
        let (distance, axis) = if tl > 0.0 {
            (tl - rarb, tests.a_axis(i))
        } else {
            (-tl - rarb, -tests.a_axis(i))
        };
        if distance > minimum_distance {
            minimum_distance = distance;
            minimum_axis = axis;
            minimum_feature = MinimumFeature::FaceA;
        }
    }

    minimum_distance += ANTI_B_FACE_BIAS;
    for j in 0..3 {
        let (tl, rarb) = tests.face_b(j);
        if tl > rarb || tl < -rarb {
            return None;
        }
        let (distance, axis) = if tl > 0.0 {
            (tl - rarb, tests.b_axis(j))
        } else {
            (-tl - rarb, -tests.b_axis(j))
        };
        if distance > minimum_distance {
            minimum_distance = distance;
            minimum_axis = axis;
            minimum_feature = MinimumFeature::FaceB;
        }
    }
    if minimum_feature != MinimumFeature::FaceB {
        minimum_distance -= ANTI_B_FACE_BIAS;
    }

    minimum_distance += ANTI_EDGE_BIAS;
    for i in 0..3 {
        for j in 0..3 {
            let (tl, rarb) = tests.edge(i, j);
            if tl > rarb || tl < -rarb {
                return None;
            }
            let axis = tests.edge_axis(i, j);
            let inverse_length = 1.0 / axis.norm();
            let (distance, axis) = if tl > 0.0 {
                ((tl - rarb) * inverse_length, axis * inverse_length)
            } else {
                ((-tl - rarb) * inverse_length, axis * -inverse_length)
            };
            if distance > minimum_distance {
                minimum_distance = distance;
                minimum_axis = axis;
                minimum_feature = MinimumFeature::Edge;
            }
        }
    }
    if minimum_feature != MinimumFeature::Edge {
        minimum_distance -= ANTI_EDGE_BIAS;
    }

    Some((minimum_feature, minimum_distance, minimum_axis))
}
