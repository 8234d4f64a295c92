//! Weighted (under-relaxed) Jacobi iteration.
//!
//! One sweep:
//! ```text
//!   x_new = (1 - w) x + w (b - (A x - C x)) / C
//! ```
//! where `C` is the central coefficient and `A x - C x` the neighbour part of
//! the operator, boundary contributions included. Slow, but robust on
//! diagonally dominant operators and a handy smoother.
use crate::discretization::matrix::StencilOperator;
use crate::discretization::unknown::GridField;
use crate::error::{SolverError, check_shape};
use crate::solvers::mat_vec_bnd::mat_vec_bnd;
use crate::solvers::solve_report::SolveReport;
use crate::solvers::solver_settings::SolverSettings;
use crate::solvers::vec_vec::{PAR_THRESHOLD, norm};
use crate::solvers::{SolverKind, log_iteration};
use log::info;
use ndarray::{Array3, Zip};
use std::time::Instant;

pub fn jacobi(
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
        info!(
            "{}: solving for {}, {} unknowns, relaxation {}",
            SolverKind::Jacobi,
            phi.name,
            phi.interior_cells(),
            settings.relaxation
        );
    }

    let w = settings.relaxation;
    let ax = mat_vec_bnd(a, phi)?;
    let mut report = SolveReport::start(SolverKind::Jacobi, settings.tolerance, norm(&(b - &ax)));
    let max_iter = settings.iteration_limit(phi.interior_cells());

    if !report.converged {
        let mut ax = ax;
        for i in 1..=max_iter {
            let zip = Zip::from(&mut phi.value).and(&ax).and(&a.center).and(b);
            let sweep = |x: &mut f64, &ax: &f64, &c: &f64, &b: &f64| {
                let neighbours = ax - c * *x;
                *x = (1.0 - w) * *x + w * (b - neighbours) / c;
            };
            if zip.size() >= PAR_THRESHOLD {
                zip.par_for_each(sweep);
            } else {
                zip.for_each(sweep);
            }
            phi.exchange();

            ax = mat_vec_bnd(a, phi)?;
            let res = norm(&(b - &ax));
            report.record(i, res, settings.record_history);
            log_iteration(settings.verbose, i, res);

            if report.converged {
                break;
            }
        }
    }

    report.elapsed = start.elapsed();
    report.into_result(settings.strict)
}
