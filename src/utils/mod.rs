//! Various unsorted geometrical and logical operators.

pub use self::barycentric_coordinates::barycentric_coordinates;
pub use self::closest_point_on_triangle::{closest_point_on_triangle, VoronoiRegion};
pub use self::closest_points_between_segments::closest_points_between_segments;
pub use self::sign::sign;

mod barycentric_coordinates;
mod closest_point_on_triangle;
mod closest_points_between_segments;
mod sign;
