use crate::math::Real;
use thiserror::Error;

/// Error returned when a query tuning value is set outside of its valid range.
#[derive(Error, Debug, Copy, Clone, PartialEq)]
pub enum InvalidSettingError {
    /// The setting only accepts strictly positive values.
    #[error("`{name}` must be strictly positive, got {value}")]
    NotPositive {
        /// The name of the rejected setting.
        name: &'static str,
        /// The rejected value.
        value: Real,
    },
    /// The setting only accepts non-negative values.
    #[error("`{name}` cannot be negative, got {value}")]
    Negative {
        /// The name of the rejected setting.
        name: &'static str,
        /// The rejected value.
        value: Real,
    },
    /// The setting only accepts a non-zero iteration count.
    #[error("`{name}` must allow at least one iteration")]
    ZeroIterations {
        /// The name of the rejected setting.
        name: &'static str,
    },
}

/// Tuning values shared by the iterative contact queries.
///
/// The defaults suit worlds whose dynamic objects measure on the order of one
/// unit across. Simulations at very different scales should scale the distance
/// based settings accordingly.
#[derive(Clone, Debug, PartialEq)]
pub struct QuerySettings {
    /// Whether the convex pair tester warm-starts its distance queries from the
    /// simplex of the previous frame. Defaults to `true`.
    pub use_simplex_caching: bool,
    outer_iteration_limit: usize,
    inner_iteration_limit: usize,
    max_depth_refinement_iterations: usize,
    surface_epsilon: Real,
    depth_refinement_epsilon: Real,
    ray_cast_surface_epsilon: Real,
    maximum_contact_distance: Real,
    core_shape_scaling: Real,
}

impl Default for QuerySettings {
    fn default() -> Self {
        QuerySettings {
            use_simplex_caching: true,
            outer_iteration_limit: 15,
            inner_iteration_limit: 15,
            max_depth_refinement_iterations: 3,
            surface_epsilon: 1.0e-7,
            depth_refinement_epsilon: 1.0e-4,
            ray_cast_surface_epsilon: 1.0e-9,
            maximum_contact_distance: 0.1,
            core_shape_scaling: 0.8,
        }
    }
}

impl QuerySettings {
    /// The maximum number of portal refinement iterations the surface casts are
    /// allowed to run. Defaults to 15.
    #[inline]
    pub fn outer_iteration_limit(&self) -> usize {
        self.outer_iteration_limit
    }

    /// Sets the outer iteration limit. Fails if `value` is zero.
    pub fn set_outer_iteration_limit(&mut self, value: usize) -> Result<(), InvalidSettingError> {
        if value == 0 {
            return Err(InvalidSettingError::ZeroIterations {
                name: "outer_iteration_limit",
            });
        }
        self.outer_iteration_limit = value;
        Ok(())
    }

    /// The maximum number of iterations spent locating the surface point once a
    /// portal contains the ray. Defaults to 15.
    #[inline]
    pub fn inner_iteration_limit(&self) -> usize {
        self.inner_iteration_limit
    }

    /// Sets the inner iteration limit. Fails if `value` is zero.
    pub fn set_inner_iteration_limit(&mut self, value: usize) -> Result<(), InvalidSettingError> {
        if value == 0 {
            return Err(InvalidSettingError::ZeroIterations {
                name: "inner_iteration_limit",
            });
        }
        self.inner_iteration_limit = value;
        Ok(())
    }

    /// The maximum number of extra local casts used to refine a penetration
    /// depth obtained from a heuristic direction. Defaults to 3.
    #[inline]
    pub fn max_depth_refinement_iterations(&self) -> usize {
        self.max_depth_refinement_iterations
    }

    /// Sets the depth refinement iteration limit. Fails if `value` is zero.
    pub fn set_max_depth_refinement_iterations(
        &mut self,
        value: usize,
    ) -> Result<(), InvalidSettingError> {
        if value == 0 {
            return Err(InvalidSettingError::ZeroIterations {
                name: "max_depth_refinement_iterations",
            });
        }
        self.max_depth_refinement_iterations = value;
        Ok(())
    }

    /// The distance at which a refined portal is considered to have reached the
    /// surface of a shape. Defaults to 1e-7.
    #[inline]
    pub fn surface_epsilon(&self) -> Real {
        self.surface_epsilon
    }

    /// Sets the surface epsilon. Fails if `value` is not strictly positive.
    pub fn set_surface_epsilon(&mut self, value: Real) -> Result<(), InvalidSettingError> {
        if value <= 0.0 {
            return Err(InvalidSettingError::NotPositive {
                name: "surface_epsilon",
                value,
            });
        }
        self.surface_epsilon = value;
        Ok(())
    }

    /// The improvement threshold below which extra penetration depth refinement
    /// casts are abandoned. Defaults to 1e-4.
    #[inline]
    pub fn depth_refinement_epsilon(&self) -> Real {
        self.depth_refinement_epsilon
    }

    /// Sets the depth refinement epsilon. Fails if `value` is not strictly
    /// positive.
    pub fn set_depth_refinement_epsilon(&mut self, value: Real) -> Result<(), InvalidSettingError> {
        if value <= 0.0 {
            return Err(InvalidSettingError::NotPositive {
                name: "depth_refinement_epsilon",
                value,
            });
        }
        self.depth_refinement_epsilon = value;
        Ok(())
    }

    /// The distance at which a sweep cast is considered to have reached the
    /// surface of a shape. Defaults to 1e-9.
    #[inline]
    pub fn ray_cast_surface_epsilon(&self) -> Real {
        self.ray_cast_surface_epsilon
    }

    /// Sets the sweep cast surface epsilon. Fails if `value` is not strictly
    /// positive.
    pub fn set_ray_cast_surface_epsilon(&mut self, value: Real) -> Result<(), InvalidSettingError> {
        if value <= 0.0 {
            return Err(InvalidSettingError::NotPositive {
                name: "ray_cast_surface_epsilon",
                value,
            });
        }
        self.ray_cast_surface_epsilon = value;
        Ok(())
    }

    /// The distance beyond the surface of a shape at which nearby contacts are
    /// still created, so that manifolds fill in before shapes actually touch.
    /// Defaults to 0.1.
    #[inline]
    pub fn maximum_contact_distance(&self) -> Real {
        self.maximum_contact_distance
    }

    /// Sets the maximum contact distance. Fails if `value` is negative.
    pub fn set_maximum_contact_distance(&mut self, value: Real) -> Result<(), InvalidSettingError> {
        if value < 0.0 {
            return Err(InvalidSettingError::Negative {
                name: "maximum_contact_distance",
                value,
            });
        }
        self.maximum_contact_distance = value;
        Ok(())
    }

    /// The fraction of a convex shape's minimum radius used as its inner sphere
    /// by the triangle pair tester. Defaults to 0.8.
    #[inline]
    pub fn core_shape_scaling(&self) -> Real {
        self.core_shape_scaling
    }

    /// Sets the core shape scaling, clamped to `[0, 0.99]`.
    pub fn set_core_shape_scaling(&mut self, value: Real) {
        self.core_shape_scaling = value.clamp(0.0, 0.99);
    }
}
