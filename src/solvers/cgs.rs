//! Preconditioned Conjugate Gradient Squared (CGS) solver.
//!
//! Source: http://www.netlib.org/templates/templates.pdf
//!
//! Works for non-symmetric operators. Uses the same Jacobi preconditioner as
//! `cg`; the method fails when `rho = r~ . r` vanishes.
use crate::constants::TINY;
use crate::discretization::matrix::StencilOperator;
use crate::discretization::unknown::GridField;
use crate::error::{SolverError, check_shape};
use crate::solvers::mat_vec_bnd::mat_vec_bnd;
use crate::solvers::solve_report::{Breakdown, SolveReport};
use crate::solvers::solver_settings::SolverSettings;
use crate::solvers::vec_vec::{axpy, norm, precondition, vec_vec};
use crate::solvers::{SolverKind, log_iteration};
use log::{debug, info};
use ndarray::{Array3, Zip};
use std::time::Instant;

/// Solves `a * phi = b` with CGS, overwriting `phi.value`.
pub fn cgs(
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
        info!("{}: solving for {}, {} unknowns", SolverKind::Cgs, phi.name, phi.interior_cells());
    }

    let mut p = Array3::<f64>::zeros(shape);
    let mut q = Array3::<f64>::zeros(shape);
    let mut u = Array3::<f64>::zeros(shape);
    let mut p_hat = phi.homogeneous_like("vec_p_hat");
    let mut u_hat = phi.homogeneous_like("vec_u_hat");

    // r = b - A * x, r~ = r
    let mut r = b - &mat_vec_bnd(a, phi)?;
    let r_tilda = r.clone();

    let mut report = SolveReport::start(SolverKind::Cgs, settings.tolerance, norm(&r));
    let max_iter = settings.iteration_limit(phi.interior_cells());
    let mut rho_old = 0.0;

    if !report.converged {
        for i in 1..=max_iter {
            let rho = vec_vec(&r_tilda, &r)?;
            if rho.abs() < TINY * TINY {
                debug!("cgs: rho = {:e} at iteration {}", rho, i);
                report.breakdown = Some(Breakdown {
                    iteration: i,
                    quantity: "rho",
                    value: rho,
                });
                break;
            }

            if i == 1 {
                u.assign(&r);
                p.assign(&u);
            } else {
                let beta = rho / rho_old;
                // u = r + beta q
                Zip::from(&mut u)
                    .and(&r)
                    .and(&q)
                    .for_each(|u, &r, &q| *u = r + beta * q);
                // p = u + beta (q + beta p)
                Zip::from(&mut p)
                    .and(&u)
                    .and(&q)
                    .for_each(|p, &u, &q| *p = u + beta * (q + beta * *p));
            }

            // solve M p^ = p
            precondition(&mut p_hat.value, &p, &a.center)?;
            let v_hat = mat_vec_bnd(a, &p_hat)?;

            let rv = vec_vec(&r_tilda, &v_hat)?;
            if !(rv.abs() >= TINY * TINY) {
                report.breakdown = Some(Breakdown {
                    iteration: i,
                    quantity: "r~.v^",
                    value: rv,
                });
                break;
            }
            let alpha = rho / rv;

            // q = u - alpha v^
            Zip::from(&mut q)
                .and(&u)
                .and(&v_hat)
                .for_each(|q, &u, &v| *q = u - alpha * v);

            // solve M u^ = u + q
            let uq = &u + &q;
            precondition(&mut u_hat.value, &uq, &a.center)?;

            axpy(&mut phi.value, alpha, &u_hat.value)?;
            let q_hat = mat_vec_bnd(a, &u_hat)?;
            axpy(&mut r, -alpha, &q_hat)?;

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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{BcKind, Position};
    use approx::assert_relative_eq;

    /// diffusion plus first-order upwind convection along x: non-symmetric
    fn convection_diffusion(n: usize, velocity: f64) -> (StencilOperator, GridField) {
        let phi = GridField::new("c", Position::Cell, (n, n, 2), BcKind::Dirichlet, [false; 3]);
        let mut a = StencilOperator::diffusion(&phi, 1.0, (1.0, 1.0, 1.0));
        a.west -= velocity;
        a.center += velocity;
        (a, phi)
    }

    #[test]
    fn solves_non_symmetric_system() {
        let (a, mut phi) = convection_diffusion(6, 2.0);
        assert!(!a.is_symmetric(1e-12));
        let b = Array3::from_elem(phi.shape(), 1.0);
        let report = cgs(&a, &mut phi, &b, &SolverSettings::new(1e-8)).unwrap();
        assert!(report.converged, "residual {}", report.final_residual);
        let r = &b - &mat_vec_bnd(&a, &phi).unwrap();
        assert!(norm(&r) < 1e-6);
    }

    #[test]
    fn agrees_with_cg_on_symmetric_system() {
        let (a, phi) = convection_diffusion(5, 0.0);
        let b = Array3::from_shape_fn(phi.shape(), |(i, j, k)| 1.0 + (i * j + k) as f64);
        let mut x_cg = phi.clone();
        let mut x_cgs = phi.clone();
        let settings = SolverSettings::new(1e-9);
        crate::solvers::cg::cg(&a, &mut x_cg, &b, &settings).unwrap();
        cgs(&a, &mut x_cgs, &b, &settings).unwrap();
        for (u, v) in x_cg.value.iter().zip(x_cgs.value.iter()) {
            assert_relative_eq!(*u, *v, epsilon = 1e-6);
        }
    }

    #[test]
    fn identity_converges_in_one_iteration() {
        let mut phi = GridField::new("c", Position::Cell, (2, 3, 4), BcKind::Neumann, [false; 3]);
        let a = StencilOperator::identity(phi.shape());
        let b = Array3::from_elem(phi.shape(), 3.0);
        let report = cgs(&a, &mut phi, &b, &SolverSettings::new(1e-12)).unwrap();
        assert!(report.converged);
        assert_eq!(report.iterations, 1);
        assert_relative_eq!(phi.value[(1, 2, 3)], 3.0);
    }

    #[test]
    fn iteration_cap_is_reported() {
        let (a, mut phi) = convection_diffusion(6, 1.0);
        let b = Array3::from_elem(phi.shape(), 1.0);
        let settings = SolverSettings::new(1e-14).with_max_iterations(1);
        let report = cgs(&a, &mut phi, &b, &settings).unwrap();
        assert!(!report.converged);
        assert_eq!(report.iterations, 1);
    }
}
