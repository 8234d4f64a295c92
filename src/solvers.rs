//! Iterative solvers for 7-point stencil systems `A phi = b`.
//!
//! All solvers share one contract: the operator, the unknown and the right
//! hand side must agree in shape, the unknown's content is the first guess
//! and is overwritten with the solution, and the outcome is described by a
//! [`SolveReport`]. Running out of iterations is not an error unless
//! `SolverSettings::strict` is set.
//!
//! # Example
//! ```rust, ignore
//! let mut phi = GridField::new("t", Position::Cell, (16, 16, 16), BcKind::Dirichlet, [false; 3]);
//! let a = StencilOperator::diffusion(&phi, 1.0, (0.1, 0.1, 0.1));
//! let b = Array3::from_elem(phi.shape(), 1.0);
//! let report = solve(&a, &mut phi, &b, &SolverSettings::new(1e-8))?;
//! assert!(report.converged);
//! ```
/// Preconditioned Conjugate Gradient for symmetric positive definite operators
pub mod cg;
/// Conjugate Gradient Squared for non-symmetric operators
pub mod cgs;
/// weighted Jacobi sweeps
pub mod jacobi;
/// operator action with boundary contributions folded in
pub mod mat_vec_bnd;
pub mod solve_report;
pub mod solver_settings;
/// inner products, norms and vector updates
pub mod vec_vec;


use crate::discretization::matrix::StencilOperator;
use crate::discretization::unknown::GridField;
use crate::error::SolverError;
use log::{debug, info};
use ndarray::Array3;
use rayon::prelude::*;
use solve_report::SolveReport;
use solver_settings::SolverSettings;
use strum_macros::{Display, EnumIter, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum SolverKind {
    Cg,
    Cgs,
    Jacobi,
}

pub(crate) fn log_iteration(verbose: bool, iteration: usize, residual: f64) {
    if verbose {
        info!("  iteration: {:3}: {:12.5e}", iteration, residual);
    } else {
        debug!("  iteration: {:3}: {:12.5e}", iteration, residual);
    }
}

/// Solves `a * phi = b` with the method named in `settings`.
pub fn solve(
    a: &StencilOperator,
    phi: &mut GridField,
    b: &Array3<f64>,
    settings: &SolverSettings,
) -> Result<SolveReport, SolverError> {
    match settings.method {
        SolverKind::Cg => cg::cg(a, phi, b, settings),
        SolverKind::Cgs => cgs::cgs(a, phi, b, settings),
        SolverKind::Jacobi => jacobi::jacobi(a, phi, b, settings),
    }
}

/// One independent system of a batch
pub struct LinearSystem<'a> {
    pub a: &'a StencilOperator,
    pub phi: &'a mut GridField,
    pub b: &'a Array3<f64>,
}

/// Solves independent systems (e.g. the three velocity components) in
/// parallel; results come back in input order.
pub fn solve_batch(
    systems: &mut [LinearSystem<'_>],
    settings: &SolverSettings,
) -> Vec<Result<SolveReport, SolverError>> {
    systems
        .par_iter_mut()
        .map(|system| solve(system.a, system.phi, system.b, settings))
        .collect()
}
