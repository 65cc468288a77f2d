use crate::math::{Real, Vector};
use crate::query::gjk::SimplexState;

/// Simplex used by the boolean intersection test.
///
/// Its vertices live in the configuration space obstacle of the tested pair.
/// No witness points are tracked, which keeps the projection routines cheaper
/// than the ones of the distance-computing simplex.
#[derive(Copy, Clone, Debug)]
pub struct SimpleSimplex {
    a: Vector,
    b: Vector,
    c: Vector,
    d: Vector,
    state: SimplexState,
}

impl SimpleSimplex {
    /// Creates an empty simplex.
    pub fn new() -> Self {
        SimpleSimplex {
            a: Vector::zeros(),
            b: Vector::zeros(),
            c: Vector::zeros(),
            d: Vector::zeros(),
            state: SimplexState::Empty,
        }
    }

    /// Projects the origin onto the simplex, discarding the vertices that do
    /// not support the projection.
    ///
    /// Returns `None` if the simplex is a tetrahedron enclosing the origin.
    pub fn project_origin_and_reduce(&mut self) -> Option<Vector> {
        match self.state {
            SimplexState::Point => Some(self.a),
            SimplexState::Segment => Some(self.project_on_segment()),
            SimplexState::Triangle => Some(self.project_on_triangle()),
            SimplexState::Tetrahedron => self.project_on_tetrahedron(),
            SimplexState::Empty => Some(Vector::zeros()),
        }
    }

    fn project_on_segment(&self) -> Vector {
        let displacement = self.b - self.a;
        let dot_a = displacement.dot(&self.a);

        // The origin cannot project outside of the segment: the search
        // direction that produced the newest vertex would not have picked it
        // otherwise.
        let v = -dot_a / displacement.norm_squared();
        self.a + displacement * v
    }

    fn project_on_triangle(&mut self) -> Vector {
        let ab = self.b - self.a;
        let ac = self.c - self.a;

        // The compared point is the origin, so the point-to-vertex vectors are
        // the negated vertices. The A, B and AB regions are unreachable here.

        // Vertex region C.
        let d5 = -ab.dot(&self.c);
        let d6 = -ac.dot(&self.c);
        if d6 >= 0.0 && d5 <= d6 {
            self.state = SimplexState::Point;
            self.a = self.c;
            return self.a;
        }

        // Edge region AC. Strict comparisons keep the denominator valid.
        let d1 = -ab.dot(&self.a);
        let d2 = -ac.dot(&self.a);
        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 > 0.0 && d6 < 0.0 {
            self.state = SimplexState::Segment;
            self.b = self.c;
            let v = d2 / (d2 - d6);
            return self.a + ac * v;
        }

        // Edge region BC.
        let d3 = -ab.dot(&self.b);
        let d4 = -ac.dot(&self.b);
        let va = d3 * d6 - d5 * d4;
        let d3d4 = d4 - d3;
        let d6d5 = d5 - d6;
        if va <= 0.0 && d3d4 > 0.0 && d6d5 > 0.0 {
            let u = d3d4 / (d3d4 + d6d5);
            let point = self.b + (self.c - self.b) * u;
            self.state = SimplexState::Segment;
            self.a = self.c;
            return point;
        }

        // On the face of the triangle.
        let vc = d1 * d4 - d3 * d2;
        let denom = 1.0 / (va + vb + vc);
        let v = vb * denom;
        let w = vc * denom;
        self.a + ab * v + ac * w
    }

    fn project_on_tetrahedron(&mut self) -> Option<Vector> {
        // D is the newest vertex, so the origin is known to lie on its side of
        // the ABC plane. Only the faces adjacent to D need testing.
        let mut best: Option<(SimpleSimplex, Vector, Real)> = None;

        for (a, b, c, other) in [
            (self.a, self.c, self.d, self.b),
            (self.c, self.b, self.d, self.a),
            (self.b, self.a, self.d, self.c),
        ] {
            if let Some((candidate, point)) = Self::try_tetrahedron_triangle(&a, &b, &c, &other) {
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
        a: &Vector,
        b: &Vector,
        c: &Vector,
        other: &Vector,
    ) -> Option<(SimpleSimplex, Vector)> {
        let ab = b - a;
        let ac = c - a;
        let normal = ab.cross(&ac);
        let a_dot_n = a.dot(&normal);
        let ad_dot_n = (other - a).dot(&normal);

        // The origin must lie on the side of this face opposite to the fourth
        // vertex.
        if a_dot_n * ad_dot_n > 0.0 {
            let mut simplex = SimpleSimplex::new();

            // Vertex region C.
            let c_dot_ab = -ab.dot(c);
            let c_dot_ac = -ac.dot(c);
            if c_dot_ac >= 0.0 && c_dot_ab <= c_dot_ac {
                simplex.state = SimplexState::Point;
                simplex.a = *c;
                return Some((simplex, *c));
            }

            // Edge region AC.
            let a_dot_ab = -ab.dot(a);
            let a_dot_ac = -ac.dot(a);
            let vb = c_dot_ab * a_dot_ac - a_dot_ab * c_dot_ac;
            if vb <= 0.0 && a_dot_ac > 0.0 && c_dot_ac < 0.0 {
                simplex.state = SimplexState::Segment;
                simplex.a = *a;
                simplex.b = *c;
                let v = a_dot_ac / (a_dot_ac - c_dot_ac);
                return Some((simplex, a + ac * v));
            }

            // Edge region BC.
            let b_dot_ab = -ab.dot(b);
            let b_dot_ac = -ac.dot(b);
            let va = b_dot_ab * c_dot_ac - c_dot_ab * b_dot_ac;
            let d3d4 = b_dot_ac - b_dot_ab;
            let d6d5 = c_dot_ab - c_dot_ac;
            if va <= 0.0 && d3d4 > 0.0 && d6d5 > 0.0 {
                simplex.state = SimplexState::Segment;
                simplex.a = *b;
                simplex.b = *c;
                let v = d3d4 / (d3d4 + d6d5);
                return Some((simplex, b + (c - b) * v));
            }

            // On the face of the triangle.
            let vc = a_dot_ab * b_dot_ac - b_dot_ab * a_dot_ac;
            simplex.state = SimplexState::Triangle;
            simplex.a = *a;
            simplex.b = *b;
            simplex.c = *c;
            let denom = 1.0 / (va + vb + vc);
            let w = vc * denom;
            let v = vb * denom;
            return Some((simplex, a + ab * v + ac * w));
        }

        None
    }

    /// Adds a new vertex to the simplex, promoting its state.
    pub fn add_point(&mut self, point: Vector) {
        match self.state {
            SimplexState::Empty => {
                self.state = SimplexState::Point;
                self.a = point;
            }
            SimplexState::Point => {
                self.state = SimplexState::Segment;
                self.b = point;
            }
            SimplexState::Segment => {
                self.state = SimplexState::Triangle;
                self.c = point;
            }
            SimplexState::Triangle => {
                self.state = SimplexState::Tetrahedron;
                self.d = point;
            }
            SimplexState::Tetrahedron => {}
        }
    }

    /// The scale of the simplex, used to make termination thresholds relative.
    pub fn error_tolerance(&self) -> Real {
        match self.state {
            SimplexState::Point => self.a.norm_squared(),
            SimplexState::Segment => self.a.norm_squared().max(self.b.norm_squared()),
            SimplexState::Triangle => self
                .a
                .norm_squared()
                .max(self.b.norm_squared())
                .max(self.c.norm_squared()),
            SimplexState::Tetrahedron => self
                .a
                .norm_squared()
                .max(self.b.norm_squared())
                .max(self.c.norm_squared())
                .max(self.d.norm_squared()),
            SimplexState::Empty => 1.0,
        }
    }
}

impl Default for SimpleSimplex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::SimpleSimplex;
    use crate::math::Vector;
    use crate::query::gjk::SimplexState;

    #[test]
    fn segment_projection() {
        let mut simplex = SimpleSimplex::new();
        simplex.add_point(Vector::new(1.0, 1.0, 0.0));
        simplex.add_point(Vector::new(1.0, -1.0, 0.0));
        let closest = simplex.project_origin_and_reduce().unwrap();
        assert_relative_eq!(closest, Vector::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn triangle_face_projection_keeps_the_triangle() {
        let mut simplex = SimpleSimplex::new();
        simplex.add_point(Vector::new(-2.0, -1.0, 0.5));
        simplex.add_point(Vector::new(2.0, -1.0, 0.5));
        simplex.add_point(Vector::new(0.0, 2.0, 0.5));
        let closest = simplex.project_origin_and_reduce().unwrap();
        assert_relative_eq!(closest, Vector::new(0.0, 0.0, 0.5));
        assert_eq!(simplex.state, SimplexState::Triangle);
    }

    #[test]
    fn enclosing_tetrahedron_is_detected() {
        let mut simplex = SimpleSimplex::new();
        simplex.add_point(Vector::new(1.0, 1.0, 1.0));
        simplex.add_point(Vector::new(1.0, -1.0, -1.0));
        simplex.add_point(Vector::new(-1.0, 1.0, -1.0));
        simplex.add_point(Vector::new(-1.0, -1.0, 1.0));
        assert!(simplex.project_origin_and_reduce().is_none());
    }
}
