//! Non-persistent geometric queries between pairs of convex shapes.
//!
//! The functions of this module are organized by algorithm family:
//!
//! * [`query::contact`](crate::query::contact) holds the closed-form contact
//!   generators for the simple shape pairs.
//! * [`query::gjk`](crate::query::gjk) computes boolean intersection tests and
//!   closest points between shapes that are separated or barely touching.
//! * [`query::mpr`](crate::query::mpr) handles deep penetrations and swept
//!   impacts through portal refinement.
//! * [`query::sat`](crate::query::sat) builds full contact manifolds between
//!   box pairs with a separating-axis test.
//!
//! The persistent, warm-started state machines of
//! [`query::pair`](crate::query::pair) tie those families together and pick
//! the right one for each pair of shapes every frame.

pub use self::contact::{ContactData, ContactId};
pub use self::mpr::SweepHit;
pub use self::settings::{InvalidSettingError, QuerySettings};

pub mod contact;
pub mod gjk;
pub mod minkowski;
pub mod mpr;
pub mod pair;
pub mod sat;
mod settings;
