// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
#![allow(non_snake_case)]
//! Iterative solvers for linear systems arising from finite-volume
//! discretizations on three-dimensional structured grids.
//!
//! - [`discretization::unknown::GridField`]: a scalar field at one of the
//!   canonical grid positions, with boundary data on its six faces;
//! - [`discretization::matrix::StencilOperator`]: 7-point stencil
//!   coefficients stored as arrays shaped like the field;
//! - [`solvers`]: boundary-aware operator application, reductions and the
//!   CG, CGS and weighted Jacobi drivers.
pub mod Utils;
pub mod constants;
pub mod discretization;
pub mod error;
pub mod solvers;

pub use constants::{Axis, BcKind, Face, Position};
pub use discretization::matrix::StencilOperator;
pub use discretization::unknown::GridField;
pub use error::SolverError;
pub use solvers::solve_report::SolveReport;
pub use solvers::solver_settings::SolverSettings;
pub use solvers::{SolverKind, solve};
