//! Persistent, warm-started pair testers driving the one-shot queries.
//!
//! A tester is kept alive as long as its pair of shapes may collide. Each
//! frame it picks the cheapest algorithm its current state allows, keeps the
//! warm-starting data the next frame will want, and moves through its state
//! machine as the shapes approach, touch and separate.

pub use self::convex_pair::{CollisionState, ConvexPairTester};
pub use self::triangle_convex_pair::{
    TriangleContactSet, TriangleConvexPairTester, TrianglePairState,
};

mod convex_pair;
mod triangle_convex_pair;
