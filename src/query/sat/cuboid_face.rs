use crate::math::{Matrix, Point, Real, Vector};

/// Combines two vertex identifiers into an edge identifier.
pub(super) fn edge_id(id1: u32, id2: u32) -> u32 {
    (id1 + 1) * 571 + (id2 + 1) * 577
}

/// Combines two edge identifiers into a contact identifier.
pub(super) fn contact_id(edge1: u32, edge2: u32) -> u32 {
    edge1 * 2549 + edge2 * 2857
}

/// A face of an oriented box, expressed in the clipping frame.
///
/// Vertices wind consistently around the outward normal and each carries the
/// box-local identifier of its corner, so contact identifiers derived from
/// them persist across frames.
#[derive(Clone, Debug)]
pub(super) struct CuboidFace {
    pub v: [Point; 4],
    pub ids: [u32; 4],
    pub normal: Vector,
    pub width: Real,
    pub height: Real,
}

/// One edge of a box face together with its inward-rejecting perpendicular,
/// used to clip the opposing face.
#[derive(Clone, Debug)]
pub(super) struct FaceEdge {
    pub a: Point,
    pub b: Point,
    pub perpendicular: Vector,
    pub id: u32,
}

impl CuboidFace {
    /// The `i`-th boundary edge of this face, `i` in `0..4`.
    ///
    /// The perpendicular points away from the face interior.
    pub fn edge(&self, i: usize) -> FaceEdge {
        let (a, b, inside, id) = match i {
            0 => (self.v[0], self.v[1], self.v[2], edge_id(self.ids[0], self.ids[1])),
            1 => (self.v[1], self.v[2], self.v[3], edge_id(self.ids[1], self.ids[2])),
            2 => (self.v[2], self.v[3], self.v[0], edge_id(self.ids[2], self.ids[3])),
            _ => (self.v[3], self.v[0], self.v[1], edge_id(self.ids[3], self.ids[0])),
        };

        let direction = (b - a).normalize();
        let mut perpendicular = direction.cross(&self.normal);
        if perpendicular.dot(&(inside - a)) > 0.0 {
            perpendicular = -perpendicular;
        }
        FaceEdge {
            a,
            b,
            perpendicular,
            id,
        }
    }
}

/// Extracts the face of a box most opposed to `mtd`.
///
/// `orientation` holds the box's local axes as columns and `position` its
/// center, both expressed in the clipping frame. When no axis strictly
/// dominates the others, the Z face is used.
pub(super) fn nearest_face(
    position: &Vector,
    orientation: &Matrix,
    mtd: &Vector,
    half_extents: &Vector,
) -> CuboidFace {
    let x_dot = orientation.column(0).dot(mtd);
    let y_dot = orientation.column(1).dot(mtd);
    let z_dot = orientation.column(2).dot(mtd);

    let abs_x = x_dot.abs();
    let abs_y = y_dot.abs();
    let abs_z = z_dot.abs();

    let transform = |x: Real, y: Real, z: Real| -> Point {
        Point::from(position + orientation * Vector::new(x, y, z))
    };

    let (hw, hh, hl) = (half_extents.x, half_extents.y, half_extents.z);

    if abs_x > abs_y && abs_x > abs_z {
        let (h, bit, normal) = if x_dot < 0.0 {
            (-hw, 0, -Vector::from(orientation.column(0)))
        } else {
            (hw, 1, Vector::from(orientation.column(0)))
        };
        CuboidFace {
            v: [
                transform(h, hh, hl),
                transform(h, -hh, hl),
                transform(h, -hh, -hl),
                transform(h, hh, -hl),
            ],
            ids: [bit + 2 + 4, bit + 4, bit + 2, bit],
            normal,
            width: hh * 2.0,
            height: hl * 2.0,
        }
    } else if abs_y > abs_x && abs_y > abs_z {
        let (h, bit, normal) = if y_dot < 0.0 {
            (-hh, 0, -Vector::from(orientation.column(1)))
        } else {
            (hh, 2, Vector::from(orientation.column(1)))
        };
        CuboidFace {
            v: [
                transform(hw, h, hl),
                transform(-hw, h, hl),
                transform(-hw, h, -hl),
                transform(hw, h, -hl),
            ],
            ids: [1 + bit + 4, bit + 4, 1 + bit, bit],
            normal,
            width: hw * 2.0,
            height: hl * 2.0,
        }
    } else {
        let (h, bit, normal) = if z_dot < 0.0 {
            (-hl, 0, -Vector::from(orientation.column(2)))
        } else {
            (hl, 4, Vector::from(orientation.column(2)))
        };
        CuboidFace {
            v: [
                transform(hw, hh, h),
                transform(-hw, hh, h),
                transform(-hw, -hh, h),
                transform(hw, -hh, h),
            ],
            ids: [1 + 2 + bit, 2 + bit, 1 + bit, bit],
            normal,
            width: hw * 2.0,
            height: hh * 2.0,
        }
    }
}
