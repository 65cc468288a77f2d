//! Separating-axis queries and contact manifolds between boxes.

pub use self::cuboid_cuboid_manifold::{cuboid_cuboid_manifold, CuboidManifold};
pub use self::sat_cuboid_cuboid::{
    cuboid_cuboid_distance, cuboid_cuboid_intersects, cuboid_cuboid_penetration,
};

mod cuboid_cuboid_manifold;
mod cuboid_face;
mod sat_cuboid_cuboid;
