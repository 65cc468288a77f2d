//! Analytic contact generation for the simple shape pairs.

pub use self::contact::{ContactData, ContactId, CuboidContact, CuboidContactSet};
pub use self::contact_ball_ball::contact_ball_ball;
pub use self::contact_cuboid_ball::contact_cuboid_ball;
pub use self::contact_triangle_ball::contact_triangle_ball;

mod contact;
mod contact_ball_ball;
mod contact_cuboid_ball;
mod contact_triangle_ball;
