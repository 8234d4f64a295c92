//! fields and operators living on a structured Cartesian grid
/// seven-point stencil operator ("matrix") with per-cell coefficients
pub mod matrix;
/// grid field ("unknown") with per-face boundary data
pub mod unknown;
