use crate::math::{Isometry, Point, Real, Vector, EPSILON};
use crate::query::gjk::gjk::HIGH_GJK_ITERATIONS;
use crate::query::minkowski::CSOPoint;
use crate::shape::SupportMap;

/// The baseline amount a GJK iteration must progress by to avoid exiting.
const PROGRESSION_EPSILON: Real = EPSILON * 0.1;
/// The baseline amount an iteration must converge by to avoid exiting.
const DISTANCE_CONVERGENCE_EPSILON: Real = EPSILON;

/// The state of a simplex.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SimplexState {
    /// The simplex holds no vertex.
    Empty,
    /// The simplex is a single point.
    Point,
    /// The simplex is a segment.
    Segment,
    /// The simplex is a triangle.
    Triangle,
    /// The simplex is a tetrahedron.
    Tetrahedron,
}

impl SimplexState {
    fn vertex_count(self) -> usize {
        match self {
            SimplexState::Empty => 0,
            SimplexState::Point => 1,
            SimplexState::Segment => 2,
            SimplexState::Triangle => 3,
            SimplexState::Tetrahedron => 4,
        }
    }
}

/// Simplex stored between two runs of the closest points query to warm-start
/// the next one.
///
/// The witness points are kept in the local frame of each shape, which keeps
/// them meaningful while the shapes move relative to each other.
#[derive(Copy, Clone, Debug)]
pub struct CachedSimplex {
    simplex1: [Point; 4],
    simplex2: [Point; 4],
    state: SimplexState,
}

impl CachedSimplex {
    /// A fresh single-point simplex with both witness points at their shape's
    /// local origin.
    pub fn new() -> Self {
        CachedSimplex {
            simplex1: [Point::origin(); 4],
            simplex2: [Point::origin(); 4],
            state: SimplexState::Point,
        }
    }

    /// A single-point simplex whose witness on the second shape starts at
    /// `point2`, given in that shape's local frame.
    pub fn with_local_point2(point2: Point) -> Self {
        let mut cache = Self::new();
        cache.simplex2[0] = point2;
        cache
    }
}

impl Default for CachedSimplex {
    fn default() -> Self {
        Self::new()
    }
}

/// Simplex used by the closest points query.
///
/// Every vertex tracks the pair of witness points it came from, so terminating
/// the query yields closest points on the original shapes and not just a
/// distance. Warm-starting from a cached simplex invalidates the reachability
/// assumptions a cold-started GJK could rely on, so every Voronoi region is
/// checked when projecting the origin.
#[derive(Copy, Clone, Debug)]
pub struct PairSimplex {
    a: CSOPoint,
    b: CSOPoint,
    c: CSOPoint,
    d: CSOPoint,
    state: SimplexState,
    u: Real,
    v: Real,
    w: Real,
    pos12: Isometry,
    error_tolerance: Real,
    previous_distance: Real,
}

impl PairSimplex {
    /// Reconstructs a working simplex from a cached one.
    ///
    /// Witness points of the second shape move into the first shape's local
    /// frame, where the whole query runs.
    pub fn from_cache(cache: &CachedSimplex, pos12: &Isometry) -> Self {
        let mut vertices = [CSOPoint::origin(); 4];
        for i in 0..cache.state.vertex_count() {
            vertices[i] = CSOPoint::new(cache.simplex1[i], pos12 * cache.simplex2[i]);
        }

        PairSimplex {
            a: vertices[0],
            b: vertices[1],
            c: vertices[2],
            d: vertices[3],
            state: cache.state,
            u: 0.0,
            v: 0.0,
            w: 0.0,
            pos12: *pos12,
            error_tolerance: 0.0,
            previous_distance: Real::MAX,
        }
    }

    /// Stores this simplex back into `cache`, with the second shape's witness
    /// points moved back to that shape's local frame.
    pub fn update_cache(&self, cache: &mut CachedSimplex) {
        let vertices = [self.a, self.b, self.c, self.d];
        for i in 0..self.state.vertex_count() {
            cache.simplex1[i] = vertices[i].orig1;
            cache.simplex2[i] = self.pos12.inverse_transform_point(&vertices[i].orig2);
        }
        cache.state = self.state;
    }

    /// The scale of the simplex, used to make termination thresholds relative.
    #[inline]
    pub fn error_tolerance(&self) -> Real {
        self.error_tolerance
    }

    /// Projects the origin onto the simplex, discarding the vertices that do
    /// not support the projection.
    ///
    /// Returns `None` if the simplex is a tetrahedron enclosing the origin.
    pub fn project_origin_and_reduce(&mut self) -> Option<Vector> {
        match self.state {
            SimplexState::Point => {
                self.u = 1.0;
                Some(self.a.point.coords)
            }
            SimplexState::Segment => Some(self.project_on_segment()),
            SimplexState::Triangle => Some(self.project_on_triangle()),
            SimplexState::Tetrahedron => self.project_on_tetrahedron(),
            SimplexState::Empty => Some(Vector::zeros()),
        }
    }

    fn project_on_segment(&mut self) -> Vector {
        let displacement = self.b.point - self.a.point;

        let dot_a = displacement.dot(&self.a.point.coords);
        if dot_a > 0.0 {
            // Behind A. Unreachable in a cold-started run, routine with a
            // warm-started one.
            self.state = SimplexState::Point;
            self.u = 1.0;
            return self.a.point.coords;
        }

        let dot_b = displacement.dot(&self.b.point.coords);
        if dot_b > 0.0 {
            // Inside the segment.
            self.u = dot_b / displacement.norm_squared();
            self.v = 1.0 - self.u;
            return self.a.point.coords + displacement * self.v;
        }

        // Outside B. The segment collapses onto its newest vertex.
        self.a = self.b;
        self.state = SimplexState::Point;
        self.u = 1.0;
        self.a.point.coords
    }

    fn project_on_triangle(&mut self) -> Vector {
        let ab = self.b.point - self.a.point;
        let ac = self.c.point - self.a.point;

        // The compared point is the origin, so the point-to-vertex vectors are
        // the negated vertices.

        // Vertex region A.
        let a_dot_ab = -ab.dot(&self.a.point.coords);
        let a_dot_ac = -ac.dot(&self.a.point.coords);
        if a_dot_ac <= 0.0 && a_dot_ab <= 0.0 {
            self.state = SimplexState::Point;
            self.u = 1.0;
            return self.a.point.coords;
        }

        // Vertex region B.
        let b_dot_ab = -ab.dot(&self.b.point.coords);
        let b_dot_ac = -ac.dot(&self.b.point.coords);
        if b_dot_ab >= 0.0 && b_dot_ac <= b_dot_ab {
            self.state = SimplexState::Point;
            self.a = self.b;
            self.u = 1.0;
            return self.a.point.coords;
        }

        // Edge region AB. Strict comparisons keep the denominator valid.
        let vc = a_dot_ab * b_dot_ac - b_dot_ab * a_dot_ac;
        if vc <= 0.0 && a_dot_ab > 0.0 && b_dot_ab < 0.0 {
            self.state = SimplexState::Segment;
            self.v = a_dot_ab / (a_dot_ab - b_dot_ab);
            self.u = 1.0 - self.v;
            return self.a.point.coords + ab * self.v;
        }

        // Vertex region C.
        let c_dot_ab = -ab.dot(&self.c.point.coords);
        let c_dot_ac = -ac.dot(&self.c.point.coords);
        if c_dot_ac >= 0.0 && c_dot_ab <= c_dot_ac {
            self.state = SimplexState::Point;
            self.a = self.c;
            self.u = 1.0;
            return self.a.point.coords;
        }

        // Edge region AC.
        let vb = c_dot_ab * a_dot_ac - a_dot_ab * c_dot_ac;
        if vb <= 0.0 && a_dot_ac > 0.0 && c_dot_ac < 0.0 {
            // Get rid of B by compressing C into it.
            self.state = SimplexState::Segment;
            self.b = self.c;
            self.v = a_dot_ac / (a_dot_ac - c_dot_ac);
            self.u = 1.0 - self.v;
            return self.a.point.coords + ac * self.v;
        }

        // Edge region BC.
        let va = b_dot_ab * c_dot_ac - c_dot_ab * b_dot_ac;
        let d3d4 = b_dot_ac - b_dot_ab;
        let d6d5 = c_dot_ab - c_dot_ac;
        if va <= 0.0 && d3d4 > 0.0 && d6d5 > 0.0 {
            let bc = self.c.point - self.b.point;
            self.u = d3d4 / (d3d4 + d6d5);
            self.v = 1.0 - self.u;
            let point = self.b.point.coords + bc * self.u;
            self.state = SimplexState::Segment;
            self.a = self.c;
            return point;
        }

        // On the face of the triangle.
        let denom = 1.0 / (va + vb + vc);
        self.v = vb * denom;
        self.w = vc * denom;
        self.u = 1.0 - self.v - self.w;
        self.a.point.coords + ab * self.v + ac * self.w
    }

    fn project_on_tetrahedron(&mut self) -> Option<Vector> {
        // D is the newest vertex, so a cold-started run only has to check the
        // regions adjacent to it. A warm-started simplex does not give that
        // guarantee, so the base face is checked as well.
        let mut best: Option<(PairSimplex, Vector, Real)> = None;

        let faces = [
            (self.a, self.c, self.d, self.b),
            (self.b, self.d, self.c, self.a),
            (self.a, self.d, self.b, self.c),
            (self.a, self.b, self.c, self.d),
        ];
        for (a, b, c, other) in &faces {
            if let Some((candidate, point)) = self.try_tetrahedron_triangle(a, b, c, &other.point)
            {
                let distance = point.norm_squared();
                if best.as_ref().map_or(true, |(_, _, d)| distance < *d) {
                    best = Some((candidate, point, distance));
                }
            }
        }

        if let Some((simplex, point, _)) = best {
            *self = simplex;
            Some(point)
        } else {
            None
        }
    }

    fn try_tetrahedron_triangle(
        &self,
        a: &CSOPoint,
        b: &CSOPoint,
        c: &CSOPoint,
        other: &Point,
    ) -> Option<(PairSimplex, Vector)> {
        let ab = b.point - a.point;
        let ac = c.point - a.point;
        let normal = ab.cross(&ac);
        let a_dot_n = a.point.coords.dot(&normal);
        let ad_dot_n = (other - a.point).dot(&normal);

        // The origin must lie on the side of this face opposite to the fourth
        // vertex. The tolerance leaves room for degenerate tetrahedra produced
        // by warm-starting.
        if a_dot_n * ad_dot_n >= -EPSILON * self.error_tolerance {
            let mut simplex = *self;

            // Vertex region A.
            let a_dot_ab = -ab.dot(&a.point.coords);
            let a_dot_ac = -ac.dot(&a.point.coords);
            if a_dot_ac <= 0.0 && a_dot_ab <= 0.0 {
                simplex.state = SimplexState::Point;
                simplex.a = *a;
                simplex.u = 1.0;
                return Some((simplex, a.point.coords));
            }

            // Vertex region B.
            let b_dot_ab = -ab.dot(&b.point.coords);
            let b_dot_ac = -ac.dot(&b.point.coords);
            if b_dot_ab >= 0.0 && b_dot_ac <= b_dot_ab {
                simplex.state = SimplexState::Point;
                simplex.a = *b;
                simplex.u = 1.0;
                return Some((simplex, b.point.coords));
            }

            // Edge region AB.
            let vc = a_dot_ab * b_dot_ac - b_dot_ab * a_dot_ac;
            if vc <= 0.0 && a_dot_ab > 0.0 && b_dot_ab < 0.0 {
                simplex.state = SimplexState::Segment;
                simplex.a = *a;
                simplex.b = *b;
                simplex.v = a_dot_ab / (a_dot_ab - b_dot_ab);
                simplex.u = 1.0 - simplex.v;
                return Some((simplex, a.point.coords + ab * simplex.v));
            }

            // Vertex region C.
            let c_dot_ab = -ab.dot(&c.point.coords);
            let c_dot_ac = -ac.dot(&c.point.coords);
            if c_dot_ac >= 0.0 && c_dot_ab <= c_dot_ac {
                simplex.state = SimplexState::Point;
                simplex.a = *c;
                simplex.u = 1.0;
                return Some((simplex, c.point.coords));
            }

            // Edge region AC.
            let vb = c_dot_ab * a_dot_ac - a_dot_ab * c_dot_ac;
            if vb <= 0.0 && a_dot_ac > 0.0 && c_dot_ac < 0.0 {
                simplex.state = SimplexState::Segment;
                simplex.a = *a;
                simplex.b = *c;
                simplex.v = a_dot_ac / (a_dot_ac - c_dot_ac);
                simplex.u = 1.0 - simplex.v;
                return Some((simplex, a.point.coords + ac * simplex.v));
            }

            // Edge region BC.
            let va = b_dot_ab * c_dot_ac - c_dot_ab * b_dot_ac;
            let d3d4 = b_dot_ac - b_dot_ab;
            let d6d5 = c_dot_ab - c_dot_ac;
            if va <= 0.0 && d3d4 > 0.0 && d6d5 > 0.0 {
                simplex.state = SimplexState::Segment;
                simplex.a = *b;
                simplex.b = *c;
                simplex.v = d3d4 / (d3d4 + d6d5);
                simplex.u = 1.0 - simplex.v;
                let bc = c.point - b.point;
                return Some((simplex, b.point.coords + bc * simplex.v));
            }

            // On the face of the triangle.
            simplex.state = SimplexState::Triangle;
            simplex.a = *a;
            simplex.b = *b;
            simplex.c = *c;
            let denom = 1.0 / (va + vb + vc);
            simplex.w = vc * denom;
            simplex.v = vb * denom;
            simplex.u = 1.0 - simplex.v - simplex.w;
            let point = a.point.coords + ab * simplex.v + ac * simplex.w;
            return Some((simplex, point));
        }

        None
    }

    /// Expands the simplex with a new support point of the marginless CSO along
    /// the direction opposite to `closest`.
    ///
    /// Returns `true` when the query should stop because the new point no
    /// longer makes enough progress towards the origin.
    pub fn add_new_point<G1, G2>(
        &mut self,
        g1: &G1,
        g2: &G2,
        iteration: usize,
        closest: &Vector,
    ) -> bool
    where
        G1: SupportMap + ?Sized,
        G2: SupportMap + ?Sized,
    {
        let negative_direction = -*closest;
        let new_point =
            CSOPoint::from_shapes_without_margin(&self.pos12, g1, g2, &negative_direction);
        let dot_s = new_point.point.coords.dot(&negative_direction);
        let distance_to_closest = closest.norm_squared();
        let progression = dot_s + distance_to_closest;

        // An oscillating simplex, usually a degenerate one, can hover just
        // outside the progression tolerance forever. Let it run for a while,
        // then keep whichever state it settles near.
        if iteration > HIGH_GJK_ITERATIONS
            && distance_to_closest - self.previous_distance
                < DISTANCE_CONVERGENCE_EPSILON * self.error_tolerance
        {
            return true;
        }
        if distance_to_closest < self.previous_distance {
            self.previous_distance = distance_to_closest;
        }

        let new_sq_length = new_point.point.coords.norm_squared();
        match self.state {
            SimplexState::Point => {
                self.error_tolerance = self.a.point.coords.norm_squared().max(new_sq_length);
                if progression <= self.error_tolerance * PROGRESSION_EPSILON {
                    return true;
                }
                self.state = SimplexState::Segment;
                self.b = new_point;
                false
            }
            SimplexState::Segment => {
                self.error_tolerance = self
                    .a
                    .point
                    .coords
                    .norm_squared()
                    .max(self.b.point.coords.norm_squared())
                    .max(new_sq_length);
                if progression <= self.error_tolerance * PROGRESSION_EPSILON {
                    return true;
                }
                self.state = SimplexState::Triangle;
                self.c = new_point;
                false
            }
            SimplexState::Triangle => {
                self.error_tolerance = self
                    .a
                    .point
                    .coords
                    .norm_squared()
                    .max(self.b.point.coords.norm_squared())
                    .max(self.c.point.coords.norm_squared())
                    .max(new_sq_length);
                if progression <= self.error_tolerance * PROGRESSION_EPSILON {
                    return true;
                }
                self.state = SimplexState::Tetrahedron;
                self.d = new_point;
                false
            }
            _ => false,
        }
    }

    /// The closest points on each shape, blended from the witness points with
    /// the barycentric coordinates of the last origin projection.
    pub fn closest_points(&self) -> (Point, Point) {
        match self.state {
            SimplexState::Point => (self.a.orig1, self.a.orig2),
            SimplexState::Segment => {
                let on1 = self.a.orig1.coords * self.u + self.b.orig1.coords * self.v;
                let on2 = self.a.orig2.coords * self.u + self.b.orig2.coords * self.v;
                (Point::from(on1), Point::from(on2))
            }
            SimplexState::Triangle => {
                let on1 = self.a.orig1.coords * self.u
                    + self.b.orig1.coords * self.v
                    + self.c.orig1.coords * self.w;
                let on2 = self.a.orig2.coords * self.u
                    + self.b.orig2.coords * self.v
                    + self.c.orig2.coords * self.w;
                (Point::from(on1), Point::from(on2))
            }
            _ => (Point::origin(), Point::origin()),
        }
    }
}
