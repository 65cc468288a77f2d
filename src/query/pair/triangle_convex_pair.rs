use crate::math::{Isometry, Point, Real, UnitVector, Vector, EPSILON};
use crate::query::contact::ContactData;
use crate::query::gjk::{self, CachedSimplex, GJKResult};
use crate::query::{mpr, QuerySettings};
use crate::shape::{SupportMap, Triangle, TriangleSidedness};
use crate::utils::{self, VoronoiRegion};
use arrayvec::ArrayVec;

/// Number of misses after which a tester stuck in an external state tries to
/// return to the cheap plane test.
const ESCAPE_ATTEMPT_PERIOD: u32 = 10;

/// State of a [`TriangleConvexPairTester`], exposed for inspection.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TrianglePairState {
    /// The convex hovers over the triangle face; a plane test suffices.
    Plane,
    /// The convex is beyond the face region and not touching.
    ExternalSeparated,
    /// The convex is beyond the face region with overlapping margins.
    ExternalNear,
    /// The shape cores interpenetrate.
    Deep,
}

/// The contacts a triangle tester can produce in a single frame: the main
/// contact, plus at most one independent inner sphere contact.
pub type TriangleContactSet = ArrayVec<ContactData, 2>;

/// Persistent tester producing contacts between a triangle and a convex
/// shape.
///
/// The triangle is given in the convex shape's local frame and all produced
/// contacts stay in that frame; mesh colliders transform each triangle in
/// once and the contacts back out, which is cheaper than transforming the
/// convex for every triangle.
///
/// Most triangles a convex touches are face contacts, so the tester starts
/// with a cheap closest-point-to-plane test and only falls back to the
/// GJK and MPR based external states when the convex leaves the face region
/// or sinks through the surface. External states periodically try to escape
/// back to the plane test.
pub struct TriangleConvexPairTester {
    state: TrianglePairState,
    escape_attempts: u32,
    /// Latest known separating axis, in the convex shape's local frame.
    local_separating_axis: Vector,
}

impl TriangleConvexPairTester {
    /// Creates a tester for a new pair, assuming a face approach.
    pub fn new() -> Self {
        TriangleConvexPairTester {
            state: TrianglePairState::Plane,
            escape_attempts: 0,
            local_separating_axis: Vector::zeros(),
        }
    }

    /// The current state of the tester.
    pub fn state(&self) -> TrianglePairState {
        self.state
    }

    /// Whether the latest contacts came from the deep solver, whose normals
    /// may point along a triangle boundary and deserve correction against
    /// the neighboring faces of a mesh.
    pub fn should_correct_contact_normal(&self) -> bool {
        self.state == TrianglePairState::Deep
    }

    /// Forgets all warm-starting data, as if the tester were new.
    pub fn reset(&mut self) {
        self.state = TrianglePairState::Plane;
        self.escape_attempts = 0;
        self.local_separating_axis = Vector::zeros();
    }

    /// Generates the contacts between the triangle and the convex shape. An
    /// empty set means the shapes are not colliding.
    pub fn generate_contacts<G>(
        &mut self,
        convex: &G,
        triangle: &Triangle,
        settings: &QuerySettings,
    ) -> TriangleContactSet
    where
        G: SupportMap + ?Sized,
    {
        match self.state {
            TrianglePairState::Plane => self.plane_test(convex, triangle, settings),
            TrianglePairState::ExternalSeparated => {
                self.external_separated(convex, triangle, settings)
            }
            TrianglePairState::ExternalNear => self.external_near(convex, triangle, settings),
            TrianglePairState::Deep => self.deep_contact(convex, triangle, settings),
        }
    }

    fn plane_test<G>(
        &mut self,
        convex: &G,
        triangle: &Triangle,
        settings: &QuerySettings,
    ) -> TriangleContactSet
    where
        G: SupportMap + ?Sized,
    {
        // The normal is reversed so it points from the triangle towards the
        // convex center, which sits at the local origin.
        let ab = triangle.b - triangle.a;
        let ac = triangle.c - triangle.a;
        let mut reverse_normal = ac.cross(&ab);
        let mut dot_a = triangle.a.coords.dot(&reverse_normal);
        match triangle.sidedness {
            TriangleSidedness::DoubleSided => {
                if dot_a < 0.0 {
                    // Pointing towards the convex; the extreme point search
                    // needs it pointing away.
                    reverse_normal = -reverse_normal;
                    dot_a = -dot_a;
                }
            }
            TriangleSidedness::Clockwise => {}
            TriangleSidedness::Counterclockwise => {
                reverse_normal = -reverse_normal;
                dot_a = -dot_a;
            }
        }

        let extreme_point = convex.local_support_point(&reverse_normal);

        // The plane test only stands while the convex is over the face.
        let (_, region) = utils::closest_point_on_triangle(
            &triangle.a,
            &triangle.b,
            &triangle.c,
            &extreme_point,
        );
        if region != VoronoiRegion::ABC {
            self.state = TrianglePairState::ExternalSeparated;
            return self.external_separated(convex, triangle, settings);
        }

        let dot_extreme = extreme_point.coords.dot(&reverse_normal);
        let t = (dot_a - dot_extreme) / reverse_normal.norm_squared();
        let offset = reverse_normal * t;
        let distance_squared = offset.norm_squared();
        let margin_sum = triangle.margin() + convex.margin();

        // A nonpositive t means the extreme point went through the plane.
        if !(t <= 0.0 || distance_squared < margin_sum * margin_sum) {
            return TriangleContactSet::new();
        }

        let position_offset = if margin_sum > EPSILON {
            offset * (convex.margin() / margin_sum)
        } else {
            Vector::zeros()
        };
        let normal_length = reverse_normal.norm();
        let normal = reverse_normal / normal_length;
        let distance = normal_length * t;
        let contact = ContactData::new(
            extreme_point + position_offset,
            UnitVector::new_unchecked(normal),
            margin_sum - distance,
        );

        let mut contacts = TriangleContactSet::new();
        if contact.depth > margin_sum {
            // The convex is stuck deep through the plane. Typical when it
            // rests on the lip of a cliff: the vertical triangle below sees
            // an enormous plane depth that has nothing to do with the actual
            // overlap. Cross-check with the external solvers.
            if let Some(inner) = self.inner_sphere_contact(convex, triangle, settings) {
                contacts.push(inner);
            }

            let previous_state = self.state;
            self.state = TrianglePairState::ExternalNear;
            let alternates = self.external_near(convex, triangle, settings);
            match alternates.first() {
                // Bias towards the plane result; its position is usually
                // the better one.
                Some(alternate) if alternate.depth + 0.01 < contact.depth => {
                    contacts.push(*alternate);
                }
                Some(_) => {
                    // It really is that deep.
                    contacts.push(contact);
                    self.state = previous_state;
                }
                None => {
                    // No collision at all per the external test. Go back to
                    // plane testing; if the extreme point leaves the face
                    // region the state will adapt.
                    self.state = previous_state;
                    return TriangleContactSet::new();
                }
            }
        } else {
            contacts.push(contact);
        }
        contacts
    }

    fn external_separated<G>(
        &mut self,
        convex: &G,
        triangle: &Triangle,
        settings: &QuerySettings,
    ) -> TriangleContactSet
    where
        G: SupportMap + ?Sized,
    {
        if gjk::intersection_test(
            &Isometry::identity(),
            convex,
            triangle,
            &mut self.local_separating_axis,
        ) {
            self.state = TrianglePairState::ExternalNear;
            return self.external_near(convex, triangle, settings);
        }
        self.try_to_escape();
        TriangleContactSet::new()
    }

    fn external_near<G>(
        &mut self,
        convex: &G,
        triangle: &Triangle,
        settings: &QuerySettings,
    ) -> TriangleContactSet
    where
        G: SupportMap + ?Sized,
    {
        // Caching is useless here since the triangle changes every frame for
        // mesh colliders. A fresh simplex seeded at the triangle centroid
        // gives a much better first guess than the origin, which would sit
        // right on the convex and terminate instantly.
        let centroid =
            (triangle.a.coords + triangle.b.coords + triangle.c.coords) * 0.33333333;
        let mut simplex = CachedSimplex::with_local_point2(Point::from(centroid));

        let (closest1, closest2) = match gjk::closest_points(
            &Isometry::identity(),
            convex,
            triangle,
            &mut simplex,
        ) {
            GJKResult::Intersection => {
                self.state = TrianglePairState::Deep;
                return self.deep_contact(convex, triangle, settings);
            }
            GJKResult::ClosestPoints(closest1, closest2) => (closest1, closest2),
        };

        let displacement = closest2 - closest1;
        let distance_squared = displacement.norm_squared();
        let margin_sum = convex.margin() + triangle.margin();

        if distance_squared < margin_sum * margin_sum {
            // A one-sided triangle only accepts contacts from its front.
            if triangle.sidedness != TriangleSidedness::DoubleSided {
                let dot = triangle.scaled_normal().dot(&displacement);
                if triangle.sidedness == TriangleSidedness::Clockwise && dot > 0.0 {
                    return TriangleContactSet::new();
                }
                if triangle.sidedness == TriangleSidedness::Counterclockwise && dot < 0.0 {
                    return TriangleContactSet::new();
                }
            }

            let offset = if margin_sum > EPSILON {
                displacement * (convex.margin() / margin_sum)
            } else {
                Vector::zeros()
            };
            let position = closest1 + offset;

            let distance = distance_squared.sqrt();
            let normal = displacement / distance;
            let mut contacts = TriangleContactSet::new();
            contacts.push(ContactData::new(
                position,
                UnitVector::new_unchecked(normal),
                margin_sum - distance,
            ));
            self.try_to_escape_at(triangle, &position);
            return contacts;
        }

        // Too far to make a contact.
        self.state = TrianglePairState::ExternalSeparated;
        TriangleContactSet::new()
    }

    fn deep_contact<G>(
        &mut self,
        convex: &G,
        triangle: &Triangle,
        settings: &QuerySettings,
    ) -> TriangleContactSet
    where
        G: SupportMap + ?Sized,
    {
        let identity = Isometry::identity();
        // Ray from the convex center, the local origin, towards the triangle
        // center: the usual center offset would be useless since the
        // triangle is not centered on its own origin.
        let center = (triangle.a.coords + triangle.b.coords + triangle.c.coords) / 3.0;

        let mut contacts = TriangleContactSet::new();

        if mpr::local_shapes_overlap(&identity, convex, triangle, &center, settings) {
            let scaled_normal = triangle.scaled_normal();
            let length_squared = scaled_normal.norm_squared();

            let mut depth;
            let mut normal;
            if length_squared < EPSILON * 0.01 {
                // Degenerate triangle. The center offset is the only usable
                // direction left.
                let (cast_depth, cast_normal) =
                    mpr::local_surface_cast(&identity, convex, triangle, &center, settings);
                depth = cast_depth;
                normal = cast_normal;
            } else {
                let triangle_normal = scaled_normal / length_squared.sqrt();

                // A cast along the face normal alone badly misjudges shapes
                // hanging over a triangle boundary, so the directions from
                // the center out through each edge are cast too and the
                // shallowest result wins.
                let ao = center - triangle.a.coords;
                let bo = center - triangle.b.coords;
                let co = center - triangle.c.coords;
                let ab = triangle.b - triangle.a;
                let bc = triangle.c - triangle.b;
                let ca = triangle.a - triangle.c;
                let ab_normal = (ao - ab * (ao.dot(&ab) / ab.norm_squared())).normalize();
                let bc_normal = (bo - bc * (bo.dot(&bc) / bc.norm_squared())).normalize();
                let ca_normal = (co - ca * (co.dot(&ca) / ca.norm_squared())).normalize();

                let (cast_depth, cast_normal) =
                    mpr::local_surface_cast(&identity, convex, triangle, &ab_normal, settings);
                let (cast_depth, cast_normal) = sidedness_corrected(
                    cast_depth,
                    cast_normal,
                    &triangle_normal,
                    triangle.sidedness,
                );
                depth = cast_depth;
                normal = cast_normal;

                let (cast_depth, cast_normal) =
                    mpr::local_surface_cast(&identity, convex, triangle, &bc_normal, settings);
                let (cast_depth, cast_normal) = sidedness_corrected(
                    cast_depth,
                    cast_normal,
                    &triangle_normal,
                    triangle.sidedness,
                );
                if cast_depth < depth {
                    depth = cast_depth;
                    normal = cast_normal;
                }

                let (cast_depth, cast_normal) =
                    mpr::local_surface_cast(&identity, convex, triangle, &ca_normal, settings);
                let (cast_depth, cast_normal) = sidedness_corrected(
                    cast_depth,
                    cast_normal,
                    &triangle_normal,
                    triangle.sidedness,
                );
                if cast_depth < depth {
                    depth = cast_depth;
                    normal = cast_normal;
                }

                // The face normal itself, on whichever sides the winding
                // allows; a forbidden side could only produce a normal the
                // sidedness filter rejects anyway.
                if triangle.sidedness != TriangleSidedness::Clockwise {
                    let (cast_depth, cast_normal) = mpr::local_surface_cast(
                        &identity,
                        convex,
                        triangle,
                        &triangle_normal,
                        settings,
                    );
                    if cast_depth < depth {
                        depth = cast_depth;
                        normal = cast_normal;
                    }
                }
                if triangle.sidedness != TriangleSidedness::Counterclockwise {
                    let reversed = -triangle_normal;
                    let (cast_depth, cast_normal) =
                        mpr::local_surface_cast(&identity, convex, triangle, &reversed, settings);
                    if cast_depth < depth {
                        depth = cast_depth;
                        normal = cast_normal;
                    }
                }
            }

            let (depth, normal, position) =
                mpr::refine_penetration(&identity, convex, triangle, depth, &normal, settings);

            // The refined normal can still face the wrong way for a
            // one-sided triangle.
            let keep = match triangle.sidedness {
                TriangleSidedness::DoubleSided => true,
                TriangleSidedness::Clockwise => scaled_normal.dot(&normal) <= 0.0,
                TriangleSidedness::Counterclockwise => scaled_normal.dot(&normal) >= 0.0,
            };

            if keep {
                if depth < convex.margin() + triangle.margin() {
                    // Emerged far enough for the preferred GJK method.
                    self.state = TrianglePairState::ExternalNear;
                }
                contacts.push(ContactData::new(
                    position,
                    UnitVector::new_unchecked(normal),
                    depth,
                ));
            }
        }

        if let Some(inner) = self.inner_sphere_contact(convex, triangle, settings) {
            contacts.push(inner);
        }
        if contacts.is_empty() {
            self.state = TrianglePairState::ExternalSeparated;
        }
        contacts
    }

    /// Emits a contact whenever the triangle cuts into the sphere inscribed
    /// in the convex shape's core.
    ///
    /// This contact exists independently of the main one: a thin triangle
    /// poking through the middle of a shape is exactly the case where the
    /// surface-based solvers produce their least trustworthy answers.
    fn inner_sphere_contact<G>(
        &self,
        convex: &G,
        triangle: &Triangle,
        settings: &QuerySettings,
    ) -> Option<ContactData>
    where
        G: SupportMap + ?Sized,
    {
        let (closest, _) = utils::closest_point_on_triangle(
            &triangle.a,
            &triangle.b,
            &triangle.c,
            &Point::origin(),
        );
        let length_squared = closest.coords.norm_squared();
        let minimum_radius = convex.minimum_radius() * (settings.core_shape_scaling() + 0.01);
        if length_squared >= minimum_radius * minimum_radius {
            return None;
        }

        let scaled_normal = triangle.scaled_normal();
        let dot = closest.coords.dot(&scaled_normal);
        if (triangle.sidedness == TriangleSidedness::Clockwise && dot > 0.0)
            || (triangle.sidedness == TriangleSidedness::Counterclockwise && dot < 0.0)
        {
            return None;
        }

        let length = length_squared.sqrt();
        let normal = if length > EPSILON {
            closest.coords / length
        } else {
            // The triangle passes through the convex center, leaving the
            // direction undefined. A one-sided triangle can only face the
            // appropriate way.
            let normal_length_squared = scaled_normal.norm_squared();
            if normal_length_squared > EPSILON {
                let triangle_normal = scaled_normal / normal_length_squared.sqrt();
                if triangle.sidedness == TriangleSidedness::Clockwise {
                    triangle_normal
                } else {
                    -triangle_normal
                }
            } else {
                // Degenerate triangle through the center.
                return None;
            }
        };

        // Measure the depth along the spherical normal; the cast's own
        // normal is discarded on purpose.
        let (depth, _) =
            mpr::local_surface_cast(&Isometry::identity(), convex, triangle, &normal, settings);
        Some(ContactData::new(
            closest,
            UnitVector::new_unchecked(normal),
            depth,
        ))
    }

    fn try_to_escape(&mut self) {
        self.escape_attempts += 1;
        if self.escape_attempts == ESCAPE_ATTEMPT_PERIOD {
            self.escape_attempts = 0;
            self.state = TrianglePairState::Plane;
        }
    }

    /// Escape attempt gated on the contact standing over the face region,
    /// the only situation the plane test handles.
    fn try_to_escape_at(&mut self, triangle: &Triangle, position: &Point) {
        self.escape_attempts += 1;
        if self.escape_attempts == ESCAPE_ATTEMPT_PERIOD {
            self.escape_attempts = 0;
            let (_, region) =
                utils::closest_point_on_triangle(&triangle.a, &triangle.b, &triangle.c, position);
            if region == VoronoiRegion::ABC {
                self.state = TrianglePairState::Plane;
            }
        }
    }

    /// Classifies which feature of the triangle a contact belongs to, from
    /// its normal.
    ///
    /// Deep contacts can carry non-triangle normals while still standing
    /// within the triangle, so the classification goes through the most
    /// opposed vertices rather than the position. Mesh colliders use this to
    /// decide which neighboring faces may correct a boundary normal.
    pub fn voronoi_region(&self, triangle: &Triangle, contact: &ContactData) -> VoronoiRegion {
        // The normal points from the convex towards the triangle, so the
        // extreme vertex is the most opposed one.
        let normal = *contact.normal;
        let dot_a = -triangle.a.coords.dot(&normal);
        let dot_b = -triangle.b.coords.dot(&normal);
        let dot_c = -triangle.c.coords.dot(&normal);

        // MPR normals are approximate; be forgiving.
        const FACE_EPSILON: Real = 0.01;
        const EDGE_EPSILON: Real = 0.01;

        // An extreme edge almost perpendicular to the normal owns the
        // contact; otherwise the extreme vertex does.
        let edge_or_vertex = |edge_direction: Vector, edge: VoronoiRegion, vertex: VoronoiRegion| {
            let edge_dot = edge_direction.dot(&normal);
            if edge_dot * edge_dot < edge_direction.norm_squared() * EDGE_EPSILON {
                edge
            } else {
                vertex
            }
        };

        if dot_a > dot_b && dot_a > dot_c {
            if dot_b > dot_c {
                if (dot_a - dot_c).abs() < FACE_EPSILON {
                    // Basically a face normal; happens near the edges.
                    VoronoiRegion::ABC
                } else {
                    edge_or_vertex(triangle.b - triangle.a, VoronoiRegion::AB, VoronoiRegion::A)
                }
            } else if (dot_a - dot_b).abs() < FACE_EPSILON {
                VoronoiRegion::ABC
            } else {
                edge_or_vertex(triangle.c - triangle.a, VoronoiRegion::AC, VoronoiRegion::A)
            }
        } else if dot_b > dot_c {
            if dot_c > dot_a {
                if (dot_b - dot_a).abs() < FACE_EPSILON {
                    VoronoiRegion::ABC
                } else {
                    edge_or_vertex(triangle.c - triangle.b, VoronoiRegion::BC, VoronoiRegion::B)
                }
            } else if (dot_b - dot_c).abs() < FACE_EPSILON {
                VoronoiRegion::ABC
            } else {
                edge_or_vertex(triangle.a - triangle.b, VoronoiRegion::AB, VoronoiRegion::B)
            }
        } else if dot_a > dot_b {
            if (dot_c - dot_b).abs() < FACE_EPSILON {
                VoronoiRegion::ABC
            } else {
                edge_or_vertex(triangle.a - triangle.c, VoronoiRegion::AC, VoronoiRegion::C)
            }
        } else if (dot_c - dot_a).abs() < FACE_EPSILON {
            VoronoiRegion::ABC
        } else {
            edge_or_vertex(triangle.b - triangle.c, VoronoiRegion::BC, VoronoiRegion::C)
        }
    }
}

impl Default for TriangleConvexPairTester {
    fn default() -> Self {
        Self::new()
    }
}

/// Projects a cast normal facing the forbidden side of a one-sided triangle
/// onto the triangle plane, scaling the depth by the cosine of the
/// correction. A normal with nothing left in the plane is disqualified with
/// an infinite depth.
fn sidedness_corrected(
    depth: Real,
    normal: Vector,
    triangle_normal: &Vector,
    sidedness: TriangleSidedness,
) -> (Real, Vector) {
    let dot = triangle_normal.dot(&normal);
    let wrong_side = match sidedness {
        TriangleSidedness::DoubleSided => false,
        TriangleSidedness::Clockwise => dot > 0.0,
        TriangleSidedness::Counterclockwise => dot < 0.0,
    };
    if !wrong_side {
        return (depth, normal);
    }

    let corrected = normal - triangle_normal * dot;
    let corrected_length_squared = corrected.norm_squared();
    if corrected_length_squared > EPSILON {
        let corrected = corrected / corrected_length_squared.sqrt();
        (depth * corrected.dot(&normal), corrected)
    } else {
        (Real::MAX, Vector::zeros())
    }
}
