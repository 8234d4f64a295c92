//! Preconditioned Conjugate Gradient (CG) solver.
//!
//! Source: Barrett et al., "Templates for the Solution of Linear Systems",
//! http://www.netlib.org/templates/templates.pdf
//!
//! Solves `A x = b` for a symmetric positive definite stencil operator `A`
//! with Jacobi (diagonal) preconditioning:
//! ```text
//!   r = b - A x
//!   for i = 1 .. max_iter
//!     z = r / diag(A)
//!     rho = r . z
//!     p = z                       (i == 1)
//!     p = z + (rho / rho_old) p   (i > 1)
//!     q = A p
//!     alpha = rho / (p . q)
//!     x += alpha p
//!     r -= alpha q
//!     stop if |r| < tol
//!     rho_old = rho
//! ```
//! The search direction lives in a field with the boundary kinds of `x` but
//! homogeneous boundary values, so that `A p` is the linear part of the
//! operator. The boundary values of `x` enter through the initial residual
//! only.
use crate::constants::TINY;
use crate::discretization::matrix::StencilOperator;
use crate::discretization::unknown::GridField;
use crate::error::{SolverError, check_shape};
use crate::solvers::mat_vec_bnd::mat_vec_bnd;
use crate::solvers::solve_report::{Breakdown, SolveReport};
use crate::solvers::solver_settings::SolverSettings;
use crate::solvers::vec_vec::{axpy, norm, precondition, vec_vec, xpby};
use crate::solvers::{SolverKind, log_iteration};
use log::{debug, info};
use ndarray::{Array3, ArrayView3};
use std::time::Instant;

/// Solves `a * phi = b`, overwriting `phi.value` with the solution.
///
/// The initial content of `phi.value` is the first guess. If the iteration
/// limit is reached first, `phi.value` holds the last iterate and the report
/// says `converged == false`; with `settings.strict` an error is returned
/// instead.
pub fn cg(
    a: &StencilOperator,
    phi: &mut GridField,
    b: &Array3<f64>,
    settings: &SolverSettings,
) -> Result<SolveReport, SolverError> {
    let start = Instant::now();
    settings.validate()?;
    let shape = phi.shape();
    a.check_shape(shape)?;
    check_shape("right-hand side", shape, b.dim())?;
    if settings.check_diagonal {
        a.check_diagonal()?;
    }
    if settings.verbose {
        info!("{}: solving for {}, {} unknowns", SolverKind::Cg, phi.name, phi.interior_cells());
    }

    // r = b - A * x
    let mut r = b - &mat_vec_bnd(a, phi)?;
    let mut z = Array3::<f64>::zeros(shape);
    let mut p = phi.homogeneous_like("vec_p");

    let mut report = SolveReport::start(SolverKind::Cg, settings.tolerance, norm(&r));
    let max_iter = settings.iteration_limit(phi.interior_cells());
    let mut rho_old = 0.0;

    // also covers empty systems and exact first guesses
    if !report.converged {
        for i in 1..=max_iter {
            // solve M z = r
            precondition(&mut z, &r, &a.center)?;

            let rho = vec_vec(&r, &z)?;
            if i == 1 {
                p.value.assign(&z);
            } else {
                xpby(&mut p.value, &z, rho / rho_old)?;
            }

            let q = mat_vec_bnd(a, &p)?;
            let pq = vec_vec(&p.value, &q)?;
            if !(pq.abs() >= TINY * TINY) {
                debug!("cg: p.q = {:e} at iteration {}", pq, i);
                report.breakdown = Some(Breakdown {
                    iteration: i,
                    quantity: "p.q",
                    value: pq,
                });
                break;
            }
            let alpha = rho / pq;

            axpy(&mut phi.value, alpha, &p.value)?;
            axpy(&mut r, -alpha, &q)?;

            let res = norm(&r);
            report.record(i, res, settings.record_history);
            log_iteration(settings.verbose, i, res);

            if report.converged {
                break;
            }
            rho_old = rho;
        }
    }

    report.elapsed = start.elapsed();
    report.into_result(settings.strict)
}

/// Classic entry point: tolerance, verbosity and optional iteration cap
/// instead of a settings struct. Returns a view of the solution (which is
/// `phi.value`) together with the report.
pub fn solve_cg<'a>(
    a: &StencilOperator,
    phi: &'a mut GridField,
    b: &Array3<f64>,
    tolerance: f64,
    verbose: bool,
    max_iterations: Option<usize>,
) -> Result<(ArrayView3<'a, f64>, SolveReport), SolverError> {
    let mut settings = SolverSettings::new(tolerance).with_verbose(verbose);
    settings.max_iterations = max_iterations;
    let report = cg(a, phi, b, &settings)?;
    Ok((phi.value.view(), report))
}
