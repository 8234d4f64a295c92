#![allow(non_snake_case)]
use RustedStencil::Utils::logger::init_logger;
use RustedStencil::constants::{BcKind, Face, Position};
use RustedStencil::discretization::matrix::StencilOperator;
use RustedStencil::discretization::unknown::GridField;
use RustedStencil::error::SolverError;
use RustedStencil::solvers::cg::solve_cg;
use RustedStencil::solvers::solver_settings::SolverSettings;
use RustedStencil::solvers::{LinearSystem, SolverKind, solve, solve_batch};
use ndarray::Array3;
use strum::IntoEnumIterator;

fn main() -> Result<(), SolverError> {
    init_logger(Some("info"), false)?;
    let example = 0;
    match example {
        0 => {
            // steady heat conduction in a unit cube with a uniform source,
            // walls kept at zero temperature
            let n = 16;
            let h = 1.0 / n as f64;
            let mut t = GridField::new("t", Position::Cell, (n, n, n), BcKind::Dirichlet, [false; 3]);
            let a = StencilOperator::diffusion(&t, 1.0, (h, h, h));
            t.describe();
            let b = Array3::from_elem(t.shape(), h * h * h);
            let (solution, report) = solve_cg(&a, &mut t, &b, 1e-10, true, None)?;
            println!("temperature in the centre: {:.6}", solution[(n / 2, n / 2, n / 2)]);
            report.print_summary();
        }
        1 => {
            // channel periodic along x between a hot south wall and a cold
            // north wall, insulated in z; every method on the same system
            let (nx, ny, nz) = (24, 12, 8);
            let h = 1.0 / ny as f64;
            let mut t = GridField::new("t", Position::Cell, (nx, ny, nz), BcKind::Neumann, [true, false, false]);
            t.set_boundary(Face::South, BcKind::Dirichlet, 1.0);
            t.set_boundary(Face::North, BcKind::Dirichlet, 0.0);
            let a = StencilOperator::diffusion(&t, 1.0, (h, h, h));
            let b = Array3::zeros(t.shape());
            for kind in SolverKind::iter() {
                let settings = SolverSettings::new(1e-8)
                    .with_method(kind)
                    .with_max_iterations(20_000);
                let mut x = t.clone();
                let report = solve(&a, &mut x, &b, &settings)?;
                report.print_summary();
            }
        }
        2 => {
            // three velocity components on a staggered grid solved at once
            let resolution = (12, 10, 8);
            let h = 0.1;
            let mut fields: Vec<GridField> = [Position::FaceX, Position::FaceY, Position::FaceZ]
                .iter()
                .zip(["u", "v", "w"])
                .map(|(&pos, name)| GridField::new(name, pos, resolution, BcKind::Dirichlet, [false; 3]))
                .collect();
            fields[0].set_boundary(Face::Top, BcKind::Dirichlet, 1.0);
            let operators: Vec<StencilOperator> = fields
                .iter()
                .map(|f| {
                    let mut a = StencilOperator::diffusion(f, 1e-2, (h, h, h));
                    // implicit time step: V / dt on the diagonal
                    a.center += h * h * h / 0.05;
                    a
                })
                .collect();
            let rhs: Vec<Array3<f64>> = fields.iter().map(|f| Array3::zeros(f.shape())).collect();
            let mut systems: Vec<LinearSystem> = fields
                .iter_mut()
                .zip(&operators)
                .zip(&rhs)
                .map(|((phi, a), b)| LinearSystem { a, phi, b })
                .collect();
            let settings = SolverSettings::new(1e-10);
            for result in solve_batch(&mut systems, &settings) {
                result?.print_summary();
            }
        }
        3 => {
            // settings from a file, residual history saved for plotting
            let settings = SolverSettings::from_toml_file("solver.toml")?;
            init_logger(settings.loglevel.as_deref(), true)?;
            let n = 10;
            let mut p = GridField::new("p", Position::Cell, (n, n, n), BcKind::Dirichlet, [false; 3]);
            p.set_boundary(Face::West, BcKind::Dirichlet, 1.0);
            let a = StencilOperator::diffusion(&p, 1.0, (1.0, 1.0, 1.0));
            let b = Array3::zeros(p.shape());
            let report = solve(&a, &mut p, &b, &settings)?;
            report.print_summary();
            report.save_history_csv("residuals.csv")?;
        }
        _ => {
            println!("no such example");
        }
    }
    Ok(())
}
