use crate::math::{Isometry, UnitVector, Vector, EPSILON};
use crate::query::contact::ContactData;
use crate::query::gjk::{self, CachedSimplex, GJKResult};
use crate::query::{minkowski, mpr, QuerySettings};
use crate::shape::SupportMap;

/// State of a [`ConvexPairTester`], exposed for inspection.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CollisionState {
    /// The margin-expanded shapes do not touch.
    Separated,
    /// The margins overlap but the cores are still apart.
    ShallowContact,
    /// The cores themselves interpenetrate.
    DeepContact,
}

/// Persistent tester producing one contact per frame between two convex
/// shapes.
///
/// The tester moves through a state machine so that each frame only pays for
/// the query its situation requires:
///
/// * `Separated` runs the warm-started boolean GJK test. A hit moves to
///   shallow contact and immediately attempts it.
/// * `ShallowContact` runs the closest points GJK between the shape cores.
///   While the cores stay apart, the closest points synthesize a contact in
///   the space between them whenever the margins overlap. Core intersection
///   moves to deep contact and immediately attempts it.
/// * `DeepContact` runs MPR, seeded by whatever direction information the
///   previous frames left behind. Once the surfaced depth drops below the
///   margin sum the tester goes back to the shallow method.
///
/// The warm-started data assumes the shapes themselves do not change between
/// frames. Call [`ConvexPairTester::reset`] if one does.
pub struct ConvexPairTester {
    state: CollisionState,
    previous_state: CollisionState,
    /// Latest known separating axis, in A's local frame.
    local_separating_axis: Vector,
    /// Seed direction for the deep contact cast, in A's local frame.
    local_direction: Vector,
    cached_simplex: CachedSimplex,
}

impl ConvexPairTester {
    /// Creates a tester for a new, presumably separated, pair.
    pub fn new() -> Self {
        ConvexPairTester {
            state: CollisionState::Separated,
            previous_state: CollisionState::Separated,
            local_separating_axis: Vector::zeros(),
            local_direction: Vector::zeros(),
            cached_simplex: CachedSimplex::new(),
        }
    }

    /// The current state of the tester.
    pub fn state(&self) -> CollisionState {
        self.state
    }

    /// Forgets all warm-starting data, as if the tester were new.
    pub fn reset(&mut self) {
        self.state = CollisionState::Separated;
        self.previous_state = CollisionState::Separated;
        self.local_separating_axis = Vector::zeros();
        self.local_direction = Vector::zeros();
        self.cached_simplex = CachedSimplex::new();
    }

    /// Generates a contact between the shapes, if they are colliding.
    ///
    /// `relative_velocity` is the world-space velocity of A relative to B.
    /// When available it seeds the first deep contact cast of an overlap,
    /// which tends to point backwards along the motion that caused it.
    pub fn generate_contact<G1, G2>(
        &mut self,
        pos1: &Isometry,
        g1: &G1,
        pos2: &Isometry,
        g2: &G2,
        relative_velocity: Option<&Vector>,
        settings: &QuerySettings,
    ) -> Option<ContactData>
    where
        G1: SupportMap + ?Sized,
        G2: SupportMap + ?Sized,
    {
        self.previous_state = self.state;
        match self.state {
            CollisionState::Separated => {
                let pos12 = minkowski::local_transform(pos1, pos2);
                if gjk::intersection_test(&pos12, g1, g2, &mut self.local_separating_axis) {
                    self.state = CollisionState::ShallowContact;
                    return self.shallow_contact(pos1, g1, pos2, g2, relative_velocity, settings);
                }
                None
            }
            CollisionState::ShallowContact => {
                self.shallow_contact(pos1, g1, pos2, g2, relative_velocity, settings)
            }
            CollisionState::DeepContact => {
                self.deep_contact(pos1, g1, pos2, g2, relative_velocity, settings)
            }
        }
    }

    fn shallow_contact<G1, G2>(
        &mut self,
        pos1: &Isometry,
        g1: &G1,
        pos2: &Isometry,
        g2: &G2,
        relative_velocity: Option<&Vector>,
        settings: &QuerySettings,
    ) -> Option<ContactData>
    where
        G1: SupportMap + ?Sized,
        G2: SupportMap + ?Sized,
    {
        let pos12 = minkowski::local_transform(pos1, pos2);

        let result = if settings.use_simplex_caching {
            gjk::closest_points(&pos12, g1, g2, &mut self.cached_simplex)
        } else {
            // The simplex built at initialization is a decent start; just
            // don't let the continually transforming runs degrade it.
            let mut throwaway = self.cached_simplex;
            gjk::closest_points(&pos12, g1, g2, &mut throwaway)
        };

        let (closest1, closest2) = match result {
            GJKResult::Intersection => {
                self.state = CollisionState::DeepContact;
                return self.deep_contact(pos1, g1, pos2, g2, relative_velocity, settings);
            }
            GJKResult::ClosestPoints(closest1, closest2) => (closest1, closest2),
        };

        let displacement = closest2 - closest1;
        // Keep this as the direction seed for future deep contacts.
        self.local_direction = displacement;

        let distance_squared = displacement.norm_squared();
        let margin_sum = g1.margin() + g2.margin();
        if distance_squared < margin_sum * margin_sum {
            // The contact sits between the core surfaces, at the fraction of
            // the gap matching A's share of the margin sum.
            let offset = if margin_sum > EPSILON {
                displacement * (g1.margin() / margin_sum)
            } else {
                Vector::zeros()
            };
            let position = closest1 + offset;

            let distance = distance_squared.sqrt();
            let normal = displacement / distance;
            return Some(ContactData::new(
                pos1 * position,
                // `closest_points` reported distinct core points, so the
                // division above yields a unit vector.
                UnitVector::new_unchecked(pos1 * normal),
                margin_sum - distance,
            ));
        }

        // Too far apart to make a contact.
        self.state = CollisionState::Separated;
        None
    }

    fn deep_contact<G1, G2>(
        &mut self,
        pos1: &Isometry,
        g1: &G1,
        pos2: &Isometry,
        g2: &G2,
        relative_velocity: Option<&Vector>,
        settings: &QuerySettings,
    ) -> Option<ContactData>
    where
        G1: SupportMap + ?Sized,
        G2: SupportMap + ?Sized,
    {
        if self.previous_state == CollisionState::Separated {
            // No shallow closest points exist to seed the cast. Pointing
            // backwards along the relative motion works well; without a
            // velocity, the last known separating axis is the next best hint.
            self.local_direction = match relative_velocity {
                Some(velocity) => pos1.inverse_transform_vector(velocity),
                None => self.local_separating_axis,
            };
            if self.local_direction.norm_squared() < EPSILON {
                self.local_direction = Vector::y();
            }
        }

        if let Some(contact) =
            mpr::contact(pos1, g1, pos2, g2, &mut self.local_direction, settings)
        {
            if contact.depth < g1.margin() + g2.margin() {
                self.state = CollisionState::ShallowContact;
            }
            return Some(contact);
        }

        // Rare, but the seed point heuristics can fail on a grazing overlap.
        self.state = CollisionState::Separated;
        None
    }
}

impl Default for ConvexPairTester {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::{CollisionState, ConvexPairTester};
    use crate::math::{Isometry, Real, Vector};
    use crate::query::QuerySettings;
    use crate::shape::{Ball, Cuboid, SupportMap};

    // Unit boxes with the default 0.04 margin: cores are 0.96 half-extent,
    // so the margins overlap below a 2.0 center distance and the cores below
    // 1.92.
    fn step(
        tester: &mut ConvexPairTester,
        distance: Real,
        settings: &QuerySettings,
    ) -> Option<Real> {
        let b1 = Cuboid::new(Vector::repeat(1.0));
        let b2 = Cuboid::new(Vector::repeat(1.0));
        let pos1 = Isometry::identity();
        let pos2 = Isometry::translation(distance, 0.0, 0.0);
        tester
            .generate_contact(&pos1, &b1, &pos2, &b2, None, settings)
            .map(|contact| contact.depth)
    }

    #[test]
    fn walks_through_every_state_and_back() {
        let settings = QuerySettings::default();
        let mut tester = ConvexPairTester::new();

        // Far apart: the boolean test rejects without leaving Separated.
        assert!(step(&mut tester, 5.0, &settings).is_none());
        assert_eq!(tester.state(), CollisionState::Separated);

        // Margins overlapping, cores apart.
        let depth = step(&mut tester, 1.96, &settings).unwrap();
        assert_eq!(tester.state(), CollisionState::ShallowContact);
        assert_relative_eq!(depth, 0.04, epsilon = 1.0e-5);

        // Cores interpenetrating.
        let deep_depth = step(&mut tester, 1.5, &settings).unwrap();
        assert_eq!(tester.state(), CollisionState::DeepContact);
        assert!(deep_depth > depth);
        assert_relative_eq!(deep_depth, 0.5, epsilon = 1.0e-2);

        // Emerging drops the depth below the margin sum and returns to the
        // shallow method.
        let shallow_again = step(&mut tester, 1.96, &settings).unwrap();
        assert_eq!(tester.state(), CollisionState::ShallowContact);
        assert!(shallow_again < deep_depth);

        // And separating ends the contact.
        assert!(step(&mut tester, 5.0, &settings).is_none());
        assert_eq!(tester.state(), CollisionState::Separated);
    }

    #[test]
    fn shallow_contact_sits_between_the_cores() {
        let settings = QuerySettings::default();
        let mut tester = ConvexPairTester::new();

        let b1 = Ball::new(1.0);
        let b2 = Ball::new(1.0);
        let pos1 = Isometry::identity();
        let pos2 = Isometry::translation(1.98, 0.0, 0.0);

        let contact = tester
            .generate_contact(&pos1, &b1, &pos2, &b2, None, &settings)
            .unwrap();
        assert_relative_eq!(*contact.normal, Vector::x(), epsilon = 1.0e-5);
        // Equal margins split the gap evenly.
        assert_relative_eq!(contact.position.x, 0.99, epsilon = 1.0e-4);
        let margin_sum = b1.margin() + b2.margin();
        assert_relative_eq!(contact.depth, margin_sum - 1.98, epsilon = 1.0e-5);
    }

    #[test]
    fn reset_forgets_the_state() {
        let settings = QuerySettings::default();
        let mut tester = ConvexPairTester::new();
        let _ = step(&mut tester, 1.0, &settings);
        assert_ne!(tester.state(), CollisionState::Separated);
        tester.reset();
        assert_eq!(tester.state(), CollisionState::Separated);
    }
}
