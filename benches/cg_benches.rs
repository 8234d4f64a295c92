use RustedStencil::constants::{BcKind, Position};
use RustedStencil::discretization::matrix::StencilOperator;
use RustedStencil::discretization::unknown::GridField;
use RustedStencil::solvers::mat_vec_bnd::mat_vec_bnd;
use RustedStencil::solvers::solver_settings::SolverSettings;
use RustedStencil::solvers::{SolverKind, solve};
use criterion::{Criterion, criterion_group, criterion_main};
use ndarray::Array3;
use std::hint::black_box;

fn laplacian(n: usize) -> (StencilOperator, GridField, Array3<f64>) {
    let h = 1.0 / n as f64;
    let phi = GridField::new("t", Position::Cell, (n, n, n), BcKind::Dirichlet, [false; 3]);
    let a = StencilOperator::diffusion(&phi, 1.0, (h, h, h));
    let b = Array3::from_elem(phi.shape(), h * h * h);
    (a, phi, b)
}

fn bench_mat_vec_bnd(c: &mut Criterion) {
    let (a, phi, _) = laplacian(32);
    c.bench_function("mat_vec_bnd 32^3", |bench| {
        bench.iter(|| mat_vec_bnd(black_box(&a), black_box(&phi)))
    });
}

fn bench_solvers(c: &mut Criterion) {
    let mut group = c.benchmark_group("laplacian 16^3");
    let (a, phi, b) = laplacian(16);
    for kind in [SolverKind::Cg, SolverKind::Cgs] {
        let settings = SolverSettings::new(1e-8).with_method(kind).with_record_history(false);
        group.bench_function(kind.to_string(), |bench| {
            bench.iter(|| {
                let mut x = phi.clone();
                solve(&a, &mut x, &b, &settings)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_mat_vec_bnd, bench_solvers);
criterion_main!(benches);
