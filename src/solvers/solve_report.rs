//! outcome of one linear solve: convergence status, residuals and timing
use crate::error::SolverError;
use crate::solvers::SolverKind;
use log::{info, warn};
use std::path::Path;
use std::time::Duration;
use tabled::{builder::Builder, settings::Style};

/// Reason a Krylov recurrence stopped early
#[derive(Debug, Clone, PartialEq)]
pub struct Breakdown {
    pub iteration: usize,
    pub quantity: &'static str,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolveReport {
    pub method: SolverKind,
    pub converged: bool,
    /// iterations actually performed
    pub iterations: usize,
    pub initial_residual: f64,
    pub final_residual: f64,
    pub tolerance: f64,
    /// residual norm after each iteration, if recorded
    pub history: Vec<f64>,
    pub breakdown: Option<Breakdown>,
    pub elapsed: Duration,
}

impl SolveReport {
    pub(crate) fn start(method: SolverKind, tolerance: f64, initial_residual: f64) -> Self {
        Self {
            method,
            converged: initial_residual < tolerance,
            iterations: 0,
            initial_residual,
            final_residual: initial_residual,
            tolerance,
            history: Vec::new(),
            breakdown: None,
            elapsed: Duration::ZERO,
        }
    }

    /// records the residual after iteration `iteration`
    pub(crate) fn record(&mut self, iteration: usize, residual: f64, keep_history: bool) {
        self.iterations = iteration;
        self.final_residual = residual;
        self.converged = residual < self.tolerance;
        if keep_history {
            self.history.push(residual);
        }
    }

    /// In strict mode a breakdown or non-convergence becomes an error,
    /// otherwise the best-effort report is returned as is.
    pub fn into_result(self, strict: bool) -> Result<Self, SolverError> {
        if self.converged {
            return Ok(self);
        }
        if let Some(b) = &self.breakdown {
            warn!(
                "{}: breakdown at iteration {} ({} = {:e})",
                self.method, b.iteration, b.quantity, b.value
            );
            if strict {
                return Err(SolverError::Breakdown {
                    iteration: b.iteration,
                    quantity: b.quantity,
                    value: b.value,
                });
            }
        } else {
            warn!(
                "{}: no convergence after {} iterations, residual {:12.5e} > {:12.5e}",
                self.method, self.iterations, self.final_residual, self.tolerance
            );
        }
        if strict {
            return Err(SolverError::NonConvergence {
                iterations: self.iterations,
                residual: self.final_residual,
            });
        }
        Ok(self)
    }

    /// ratio of the final to the initial residual
    pub fn reduction(&self) -> f64 {
        if self.initial_residual > 0.0 {
            self.final_residual / self.initial_residual
        } else {
            0.0
        }
    }

    pub fn summary_rows(&self) -> Vec<Vec<String>> {
        vec![
            vec!["method".to_string(), self.method.to_string()],
            vec!["converged".to_string(), self.converged.to_string()],
            vec!["iterations".to_string(), self.iterations.to_string()],
            vec!["initial residual".to_string(), format!("{:12.5e}", self.initial_residual)],
            vec!["final residual".to_string(), format!("{:12.5e}", self.final_residual)],
            vec!["tolerance".to_string(), format!("{:12.5e}", self.tolerance)],
            vec!["elapsed, ms".to_string(), self.elapsed.as_millis().to_string()],
        ]
    }

    /// pretty-prints the report into the log
    pub fn print_summary(&self) -> String {
        let mut table = Builder::from(self.summary_rows()).build();
        table.with(Style::modern_rounded());
        let rendered = table.to_string();
        info!("\n \n SOLVER REPORT \n \n {}", rendered);
        rendered
    }

    /// writes the residual history as `iteration,residual` rows
    pub fn save_history_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), SolverError> {
        crate::Utils::logger::save_residuals_to_csv(&self.history, path)
    }
}
