use crate::math::{Point, Real, UnitVector};
use arrayvec::ArrayVec;

/// Identifier tying a contact to the shape features that produced it.
///
/// Ids are stable as long as the same feature pair keeps producing the contact,
/// which lets manifolds match their points across frames. Contacts produced
/// without feature tracking use [`ContactId::MAX`].
pub type ContactId = u32;

/// Geometric description of a single contact between two shapes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ContactData {
    /// The position of the contact, in between both surfaces.
    pub position: Point,
    /// The contact normal, pointing from the first shape towards the second.
    pub normal: UnitVector,
    /// How deep the shapes overlap along the normal. A contact created within
    /// the maximum contact distance of a surface carries a negative depth.
    pub depth: Real,
    /// The identifier of the feature pair that produced this contact.
    pub id: ContactId,
}

impl ContactData {
    /// Creates a contact without feature tracking.
    pub fn new(position: Point, normal: UnitVector, depth: Real) -> Self {
        ContactData {
            position,
            normal,
            depth,
            id: ContactId::MAX,
        }
    }
}

/// One contact point of a box-box manifold.
///
/// The normal is shared by the whole manifold, so each point only carries its
/// position, depth along that normal, and feature identifier.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CuboidContact {
    /// The position of the contact, on the surface of the first box.
    pub position: Point,
    /// How deep this point sits along the manifold normal. Always positive.
    pub depth: Real,
    /// The identifier of the feature pair that produced this contact.
    pub id: ContactId,
}

/// The contacts of a box-box manifold before reduction. Clipping two
/// quadrilateral faces never produces more than eight points.
pub type CuboidContactSet = ArrayVec<CuboidContact, 8>;
