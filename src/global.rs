//! Shared numeric constants of the equation checks. Collected here so the
//! parser, the differentiator and the checkers agree on one set of values.

/// step of the centered-difference derivative probes
pub const DERIVATIVE_STEP: f64 = 1e-5;
/// tolerance for |dM/dy - dN/dx| at a grid point
pub const EXACTNESS_TOL: f64 = 1e-6;
/// tolerance for |f(2,2) - 2^k * f(1,1)| in the degree search
pub const HOMOGENEITY_TOL: f64 = 1e-6;
/// candidate degrees are searched in MIN_DEGREE..=MAX_DEGREE, ascending
pub const MIN_DEGREE: u32 = 1;
pub const MAX_DEGREE: u32 = 10;
/// integer sampling grid for exactness: both coordinates in GRID_MIN..=GRID_MAX
pub const GRID_MIN: i64 = 1;
pub const GRID_MAX: i64 = 5;
