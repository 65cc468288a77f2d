use crate::math::{Isometry, Matrix, Point, Real, UnitVector, Vector, EPSILON};
use crate::query::contact::{CuboidContact, CuboidContactSet};
use crate::query::sat::cuboid_face::{contact_id, edge_id, nearest_face, CuboidFace, FaceEdge};
use crate::query::sat::sat_cuboid_cuboid::{minimum_separating_feature, MinimumFeature};
use crate::shape::Cuboid;
use crate::utils;

/// A full contact manifold between two boxes, in the local frame of the first.
#[derive(Clone, Debug)]
pub struct CuboidManifold {
    /// The manifold normal, pointing from the first box towards the second.
    pub normal: UnitVector,
    /// The penetration depth along the normal. Always positive.
    pub depth: Real,
    /// Up to four contact points lying on the reference feature.
    pub contacts: CuboidContactSet,
}

/// Computes the contact manifold between two boxes, `pos12` being the pose of
/// the second box relative to the first.
///
/// Face features are clipped against each other and reduced to at most four
/// points; edge features contribute the closest points between the two extreme
/// edge pairs of each box. Every point carries a feature identifier that stays
/// stable while the same feature pair remains in contact.
pub fn cuboid_cuboid_manifold(
    cuboid1: &Cuboid,
    cuboid2: &Cuboid,
    pos12: &Isometry,
) -> Option<CuboidManifold> {
    let (feature, distance, axis) = minimum_separating_feature(cuboid1, cuboid2, pos12)?;
    // The clipping routines all expect the translation direction that pushes
    // the first box out of the second.
    let mtd = -axis;
    let contacts = match feature {
        MinimumFeature::FaceA => face_contacts(cuboid1, cuboid2, pos12, &mtd, true),
        MinimumFeature::FaceB => face_contacts(cuboid1, cuboid2, pos12, &mtd, false),
        MinimumFeature::Edge => edge_edge_contacts(cuboid1, cuboid2, pos12, &mtd),
    };

    Some(CuboidManifold {
        normal: UnitVector::new_unchecked(axis),
        depth: -distance,
        contacts,
    })
}

fn face_contacts(
    cuboid1: &Cuboid,
    cuboid2: &Cuboid,
    pos12: &Isometry,
    mtd: &Vector,
    first_owns_face: bool,
) -> CuboidContactSet {
    let rotation = pos12.rotation.to_rotation_matrix().into_inner();
    let negated_mtd = -*mtd;

    let face1 = nearest_face(
        &Vector::zeros(),
        &Matrix::identity(),
        &negated_mtd,
        &cuboid1.half_extents,
    );
    let face2 = nearest_face(
        &pos12.translation.vector,
        &rotation,
        mtd,
        &cuboid2.half_extents,
    );

    let mut contacts = if first_owns_face {
        clip_faces(&face1, &face2, &negated_mtd)
    } else {
        clip_faces(&face2, &face1, mtd)
    };

    if contacts.len() > 4 {
        contacts = prune_to_deepest_quad(&contacts, mtd);
    }
    contacts
}

/// The in-plane axes and biased bounds of a box face, used for the point
/// containment tests of the clipping routine.
///
/// The axes are the face edge directions divided by the squared edge lengths,
/// so dotting a point against them yields its normalized face coordinate.
struct ClipBounds {
    x: Vector,
    y: Vector,
    min_x: Real,
    max_x: Real,
    min_y: Real,
    max_y: Real,
}

impl ClipBounds {
    fn new(face: &CuboidFace) -> Self {
        let inverse_width = 1.0 / face.width;
        let inverse_height = 1.0 / face.height;
        let x = (face.v[3] - face.v[2]) * (inverse_width * inverse_width);
        let y = (face.v[1] - face.v[2]) * (inverse_height * inverse_height);

        let center = face.v[0].coords + face.v[2].coords;
        let center_x = center.dot(&x) * 0.5;
        let center_y = center.dot(&y) * 0.5;

        // A small bias past the exact face bounds keeps grazing vertices from
        // flickering in and out of the manifold.
        let extent_x = 0.5 + 0.01 * inverse_width;
        let extent_y = 0.5 + 0.01 * inverse_height;

        ClipBounds {
            x,
            y,
            min_x: center_x - extent_x,
            max_x: center_x + extent_x,
            min_y: center_y - extent_y,
            max_y: center_y + extent_y,
        }
    }

    fn flags(&self, point: &Point) -> InsideFlags {
        let dot_x = point.coords.dot(&self.x);
        let dot_y = point.coords.dot(&self.y);
        InsideFlags {
            max_x: dot_x < self.max_x,
            min_x: dot_x > self.min_x,
            max_y: dot_y < self.max_y,
            min_y: dot_y > self.min_y,
        }
    }
}

/// Sidedness of a point with respect to the four boundary edges of a face.
#[derive(Copy, Clone)]
struct InsideFlags {
    max_x: bool,
    min_x: bool,
    max_y: bool,
    min_y: bool,
}

impl InsideFlags {
    fn all(self) -> bool {
        self.max_x && self.min_x && self.max_y && self.min_y
    }

    /// The flag crossed by the `i`-th boundary edge of the clip face.
    fn edge_flag(self, edge_index: usize) -> bool {
        match edge_index {
            0 => self.max_y,
            1 => self.min_x,
            2 => self.min_y,
            _ => self.max_x,
        }
    }
}

/// The vertex index pairs forming the boundary segments of a face.
const SEGMENTS: [(usize, usize); 4] = [(0, 1), (1, 2), (2, 3), (3, 0)];

/// For an incident vertex found outside a clip edge, the neighbor vertices
/// whose sidedness decides whether the segment towards them crosses the edge,
/// paired with the index of that segment.
const EDGE_CHECKS: [[(usize, usize); 2]; 4] = [
    [(1, 0), (3, 3)],
    [(0, 0), (2, 1)],
    [(1, 1), (3, 2)],
    [(0, 3), (2, 2)],
];

/// Clips the incident face against the reference face.
///
/// Contacts come from three sources, in order: incident vertices inside the
/// clip region, clip vertices projected onto the incident plane, and boundary
/// edge crossings. Depths are measured along `mtd` from the clip face plane
/// and only non-negative ones are kept.
fn clip_faces(clip_face: &CuboidFace, face: &CuboidFace, mtd: &Vector) -> CuboidContactSet {
    let mut contacts = CuboidContactSet::new();

    let clip_bounds = ClipBounds::new(clip_face);
    let face_bounds = ClipBounds::new(face);

    let face_flags = [
        clip_bounds.flags(&face.v[0]),
        clip_bounds.flags(&face.v[1]),
        clip_bounds.flags(&face.v[2]),
        clip_bounds.flags(&face.v[3]),
    ];
    let clip_flags = [
        face_bounds.flags(&clip_face.v[0]),
        face_bounds.flags(&clip_face.v[1]),
        face_bounds.flags(&clip_face.v[2]),
        face_bounds.flags(&clip_face.v[3]),
    ];

    let clip_face_dot = clip_face.v[0].coords.dot(mtd);

    // Incident face vertices inside the clip region.
    for k in 0..4 {
        if face_flags[k].all() {
            let depth = clip_face_dot - face.v[k].coords.dot(mtd);
            if depth >= 0.0 {
                contacts.push(CuboidContact {
                    position: face.v[k],
                    depth,
                    id: face.ids[k],
                });
            }
        }
    }

    if contacts.len() >= 4 {
        return contacts;
    }

    // Clip face vertices, projected along the incident normal onto the
    // incident face plane.
    let face_plane_dot = face.v[0].coords.dot(&face.normal);
    for k in 0..4 {
        if clip_flags[k].all() {
            let along = clip_face.v[k].coords.dot(&face.normal) - face_plane_dot;
            let position = clip_face.v[k] - face.normal * along;
            let depth = clip_face_dot - position.coords.dot(mtd);
            if depth >= 0.0 {
                contacts.push(CuboidContact {
                    position,
                    depth,
                    // Offsetting keeps projected clip vertices from colliding
                    // with incident vertex identifiers.
                    id: clip_face.ids[k] + 8,
                });
            }
        }
    }

    if contacts.len() >= 4 {
        return contacts;
    }

    // Boundary crossings: for each clip edge, intersect it with the incident
    // segments that straddle it.
    let previous_count = contacts.len();
    for edge_index in 0..4 {
        let clip_edge = clip_face.edge(edge_index);
        for k in 0..4 {
            if face_flags[k].edge_flag(edge_index) {
                continue;
            }
            // The traversal order of this one case differs to preserve the
            // historical, identifier-relevant contact ordering.
            let checks = if edge_index == 2 && k == 3 {
                [(2, 2), (0, 3)]
            } else {
                EDGE_CHECKS[k]
            };
            for (neighbor, segment) in checks {
                if face_flags[neighbor].edge_flag(edge_index) && contacts.len() < 8 {
                    let (sa, sb) = SEGMENTS[segment];
                    if let Some(position) =
                        compute_intersection(&face.v[sa], &face.v[sb], &clip_edge)
                    {
                        contacts.push(CuboidContact {
                            position,
                            depth: 0.0,
                            id: contact_id(edge_id(face.ids[sa], face.ids[sb]), clip_edge.id),
                        });
                    }
                }
            }
        }
    }

    // Depth-filter the edge crossings all at once.
    let mut kept = previous_count;
    for i in previous_count..contacts.len() {
        let mut item = contacts[i];
        item.depth = clip_face_dot - item.position.coords.dot(mtd);
        if item.depth >= 0.0 {
            contacts[kept] = item;
            kept += 1;
        }
    }
    contacts.truncate(kept);
    contacts
}

/// Intersects the segment `[edge_a, edge_b]` with the plane of a clip edge,
/// rejecting hits outside either segment.
fn compute_intersection(edge_a: &Point, edge_b: &Point, clip_edge: &FaceEdge) -> Option<Point> {
    let offset = clip_edge.a - edge_a;
    let direction = edge_b - edge_a;
    let t = offset.dot(&clip_edge.perpendicular) / direction.dot(&clip_edge.perpendicular);
    if t < 0.0 || t > 1.0 {
        return None;
    }
    let intersection = edge_a + direction * t;

    let clip_direction = clip_edge.b - clip_edge.a;
    let s = clip_direction.dot(&(intersection - clip_edge.a));
    if s < 0.0 || s > clip_direction.norm_squared() {
        return None;
    }
    Some(intersection)
}

/// Reduces a manifold of more than four points down to four: the deepest
/// point, the one furthest from it, and the two extremes along the direction
/// perpendicular to that spread within the contact plane.
fn prune_to_deepest_quad(contacts: &CuboidContactSet, mtd: &Vector) -> CuboidContactSet {
    let mut deepest = contacts[0];
    for contact in &contacts[1..] {
        if contact.depth > deepest.depth {
            deepest = *contact;
        }
    }

    let mut furthest = contacts[0];
    let mut furthest_distance = (furthest.position - deepest.position).norm_squared();
    for contact in &contacts[1..] {
        let distance = (contact.position - deepest.position).norm_squared();
        if distance > furthest_distance {
            furthest_distance = distance;
            furthest = *contact;
        }
    }

    let x_axis = furthest.position - deepest.position;
    let y_axis = mtd.cross(&x_axis);

    let mut min_contact = contacts[0];
    let mut max_contact = min_contact;
    let mut min_dot = min_contact.position.coords.dot(&y_axis);
    let mut max_dot = min_dot;
    for contact in &contacts[1..] {
        let dot = contact.position.coords.dot(&y_axis);
        if dot < min_dot {
            min_dot = dot;
            min_contact = *contact;
        } else if dot > max_dot {
            max_dot = dot;
            max_contact = *contact;
        }
    }

    let mut output = CuboidContactSet::new();
    output.push(deepest);
    output.push(furthest);
    output.push(min_contact);
    output.push(max_contact);
    output
}

/// An edge of a box running along one of its local axes, tagged with the
/// identifier derived from its endpoint vertices.
struct BoxEdge {
    start: Point,
    end: Point,
    id: u32,
}

/// Generates contacts between the extreme edges of both boxes.
///
/// A single edge-edge point is enough for perfectly rigid contact, but under
/// penetration it makes stacked boxes oscillate. Taking the two extreme edges
/// of each box and testing all four pairings yields up to four points.
fn edge_edge_contacts(
    cuboid1: &Cuboid,
    cuboid2: &Cuboid,
    pos12: &Isometry,
    mtd: &Vector,
) -> CuboidContactSet {
    let rotation = pos12.rotation.to_rotation_matrix().into_inner();
    let translation = pos12.translation.vector;

    let mtd1 = -*mtd;
    let mtd2 = rotation.transpose() * mtd;

    let edges1 = extreme_edges(&cuboid1.half_extents, &mtd1);
    let edges2 = extreme_edges(&cuboid2.half_extents, &mtd2).map(|edge| BoxEdge {
        start: Point::from(rotation * edge.start.coords + translation),
        end: Point::from(rotation * edge.end.coords + translation),
        id: edge.id,
    });

    let mut contacts = CuboidContactSet::new();
    for edge1 in &edges1 {
        for edge2 in &edges2 {
            let (s, t, on1, on2) = utils::closest_points_between_segments(
                &edge1.start,
                &edge1.end,
                &edge2.start,
                &edge2.end,
            );
            // A pair whose closest approach was clamped to an endpoint is not
            // a real edge-edge contact; the clamp leaves its parameter on the
            // boundary.
            if s <= 0.0 || s >= 1.0 || t <= 0.0 || t >= 1.0 {
                continue;
            }
            let depth = -(on1 - on2).dot(mtd);
            if depth > 0.0 {
                contacts.push(CuboidContact {
                    position: on1,
                    depth,
                    id: contact_id(edge1.id, edge2.id),
                });
            }
        }
    }
    contacts
}

/// Finds the two edges of a box furthest along `mtd`, both running along the
/// axis `mtd` is the most orthogonal to.
fn extreme_edges(half_extents: &Vector, mtd: &Vector) -> [BoxEdge; 2] {
    // An edge-edge translation direction is orthogonal to the witness edges of
    // both boxes, so one of its local components is always almost zero.
    let axis = if mtd.x.abs() < EPSILON {
        0
    } else if mtd.y.abs() < EPSILON {
        1
    } else {
        2
    };
    let (u, v) = match axis {
        0 => (1, 2),
        1 => (0, 2),
        _ => (0, 1),
    };

    let hu = half_extents[u];
    let hv = half_extents[v];
    let du = mtd[u];
    let dv = mtd[v];
    let dots = [
        -hu * du - hv * dv,
        -hu * du + hv * dv,
        hu * du - hv * dv,
        hu * du + hv * dv,
    ];
    let (highest, second) = highest_two(&dots);
    [
        box_edge(highest, axis, u, v, half_extents),
        box_edge(second, axis, u, v, half_extents),
    ]
}

fn highest_two(dots: &[Real; 4]) -> (usize, usize) {
    let mut highest = 0;
    for i in 1..4 {
        if dots[i] > dots[highest] {
            highest = i;
        }
    }
    let mut second = 0;
    let mut second_value = -Real::MAX;
    for (i, dot) in dots.iter().enumerate() {
        if i != highest && *dot > second_value {
            second = i;
            second_value = *dot;
        }
    }
    (highest, second)
}

/// Builds the box edge running along `axis` whose in-plane corner is selected
/// by `index`: bit 1 of the index picks the sign along `u`, bit 0 along `v`.
fn box_edge(index: usize, axis: usize, u: usize, v: usize, half_extents: &Vector) -> BoxEdge {
    // Vertex identifiers encode the corner signs, one bit per axis.
    const AXIS_BITS: [u32; 3] = [4, 2, 1];

    let mut corner = Vector::zeros();
    let mut start_id = 0;
    if index & 2 != 0 {
        corner[u] = half_extents[u];
        start_id += AXIS_BITS[u];
    } else {
        corner[u] = -half_extents[u];
    }
    if index & 1 != 0 {
        corner[v] = half_extents[v];
        start_id += AXIS_BITS[v];
    } else {
        corner[v] = -half_extents[v];
    }

    let mut start = corner;
    let mut end = corner;
    start[axis] = -half_extents[axis];
    end[axis] = half_extents[axis];

    BoxEdge {
        start: Point::from(start),
        end: Point::from(end),
        id: edge_id(start_id, start_id + AXIS_BITS[axis]),
    }
}

#[cfg(test)]
mod test {
    use super::cuboid_cuboid_manifold;
    use crate::math::{Isometry, Vector};
    use crate::shape::Cuboid;

    #[test]
    fn aligned_boxes_make_a_four_point_face_manifold() {
        let cuboid = Cuboid::new(Vector::new(1.0, 1.0, 1.0));
        let manifold =
            cuboid_cuboid_manifold(&cuboid, &cuboid, &Isometry::translation(1.8, 0.0, 0.0))
                .unwrap();

        assert_relative_eq!(*manifold.normal, Vector::x(), epsilon = 1.0e-6);
        assert_relative_eq!(manifold.depth, 0.2, epsilon = 1.0e-5);
        assert_eq!(manifold.contacts.len(), 4);
        for contact in &manifold.contacts {
            assert_relative_eq!(contact.position.x, 0.8, epsilon = 1.0e-5);
            assert_relative_eq!(contact.depth, 0.2, epsilon = 1.0e-5);
        }

        // The four face corners of the second box, in a stable order.
        let ids: Vec<_> = manifold.contacts.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![6, 4, 2, 0]);
    }

    #[test]
    fn manifold_identifiers_are_deterministic() {
        let cuboid = Cuboid::new(Vector::new(1.0, 1.0, 1.0));
        let pos12 = Isometry::new(
            Vector::new(2.3, 0.0, 0.0),
            Vector::z() * 0.7,
        );
        let first = cuboid_cuboid_manifold(&cuboid, &cuboid, &pos12).unwrap();
        let second = cuboid_cuboid_manifold(&cuboid, &cuboid, &pos12).unwrap();
        assert_eq!(first.contacts.len(), second.contacts.len());
        for (a, b) in first.contacts.iter().zip(second.contacts.iter()) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.position, b.position);
        }
    }

    #[test]
    fn rotated_incident_face_lands_on_the_reference_face() {
        let cuboid = Cuboid::new(Vector::new(1.0, 1.0, 1.0));
        // The second box is rotated around z, so its x-min face meets the
        // first box's x-max face along an edge line.
        let pos12 = Isometry::new(
            Vector::new(2.3, 0.0, 0.0),
            Vector::z() * 0.7,
        );
        let manifold = cuboid_cuboid_manifold(&cuboid, &cuboid, &pos12).unwrap();

        assert_relative_eq!(*manifold.normal, Vector::x(), epsilon = 1.0e-6);
        assert_relative_eq!(manifold.depth, 0.10906, epsilon = 1.0e-4);
        assert!(manifold.contacts.len() >= 2 && manifold.contacts.len() <= 4);
        for contact in &manifold.contacts {
            assert!(contact.depth >= 0.0);
            assert!(contact.depth <= manifold.depth + 1.0e-4);
        }
    }

    #[test]
    fn crossing_edges_make_an_edge_contact() {
        let cuboid = Cuboid::new(Vector::new(1.0, 1.0, 1.0));
        let axisangle = Vector::new(1.0, 1.0, 0.0).normalize() * 0.5;
        let pos12 = Isometry::new(Vector::new(0.0, 1.8, 1.8), axisangle);
        let manifold = cuboid_cuboid_manifold(&cuboid, &cuboid, &pos12).unwrap();

        assert_relative_eq!(
            *manifold.normal,
            Vector::new(0.0, 0.93282, 0.360343),
            epsilon = 1.0e-4
        );
        assert_relative_eq!(manifold.depth, 0.028413, epsilon = 1.0e-4);
        assert_eq!(manifold.contacts.len(), 1);
        let contact = &manifold.contacts[0];
        assert_relative_eq!(
            contact.position,
            crate::math::Point::new(0.8265, 1.0, 1.0),
            epsilon = 1.0e-3
        );
        assert_relative_eq!(contact.depth, manifold.depth, epsilon = 1.0e-5);
        assert_eq!(contact.id, 35635769);
    }

    #[test]
    fn clamped_edge_pairings_contribute_no_contact() {
        let cuboid = Cuboid::new(Vector::new(1.0, 1.0, 1.0));
        // A skewed deep edge overlap. Of the four extreme edge pairings, one
        // has its closest approach clamped to an endpoint while still
        // measuring a positive depth along the normal; it must not land in
        // the manifold.
        let pos12 = Isometry::new(
            Vector::new(0.370708, 1.778488, 0.800721),
            Vector::new(0.857891, 0.712801, 0.981979),
        );
        let manifold = cuboid_cuboid_manifold(&cuboid, &cuboid, &pos12).unwrap();

        assert_relative_eq!(
            *manifold.normal,
            Vector::new(0.325866, 0.945416, 0.0),
            epsilon = 1.0e-4
        );
        assert_relative_eq!(manifold.depth, 0.605349, epsilon = 1.0e-4);
        assert_eq!(manifold.contacts.len(), 1);
        assert_relative_eq!(
            manifold.contacts[0].position,
            crate::math::Point::new(1.0, 1.0, 0.308171),
            epsilon = 1.0e-3
        );
    }

    #[test]
    fn separated_boxes_have_no_manifold() {
        let cuboid = Cuboid::new(Vector::new(1.0, 1.0, 1.0));
        assert!(
            cuboid_cuboid_manifold(&cuboid, &cuboid, &Isometry::translation(2.1, 0.0, 0.0))
                .is_none()
        );
    }
}
