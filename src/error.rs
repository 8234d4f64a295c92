use std::fmt;

/// Error types of the grid operators and linear solvers
#[derive(Debug)]
pub enum SolverError {
    /// the diagonal of the operator has an entry that is zero or near zero
    ZeroDiagonal {
        index: (usize, usize, usize),
        value: f64,
    },
    /// iteration limit exhausted before reaching the tolerance (strict mode only)
    NonConvergence { iterations: usize, residual: f64 },
    /// operator, field and right-hand side disagree in shape
    ShapeMismatch {
        what: &'static str,
        expected: Vec<usize>,
        found: Vec<usize>,
    },
    /// a denominator of the Krylov recurrence vanished
    Breakdown {
        iteration: usize,
        quantity: &'static str,
        value: f64,
    },
    /// invalid solver settings
    Config(String),
    Io(std::io::Error),
    Csv(csv::Error),
    Toml(toml::de::Error),
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SolverError::ZeroDiagonal { index, value } => write!(
                f,
                "operator diagonal is (near) zero at {:?}: {:e}",
                index, value
            ),
            SolverError::NonConvergence {
                iterations,
                residual,
            } => write!(
                f,
                "solver did not converge in {} iterations, residual {:12.5e}",
                iterations, residual
            ),
            SolverError::ShapeMismatch {
                what,
                expected,
                found,
            } => write!(
                f,
                "shape mismatch for {}: expected {:?}, found {:?}",
                what, expected, found
            ),
            SolverError::Breakdown {
                iteration,
                quantity,
                value,
            } => write!(
                f,
                "breakdown at iteration {}: {} ({:e}) is near zero",
                iteration, quantity, value
            ),
            SolverError::Config(msg) => write!(f, "invalid solver settings: {}", msg),
            SolverError::Io(e) => write!(f, "IO error: {}", e),
            SolverError::Csv(e) => write!(f, "CSV error: {}", e),
            SolverError::Toml(e) => write!(f, "TOML error: {}", e),
        }
    }
}

impl std::error::Error for SolverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SolverError::Io(e) => Some(e),
            SolverError::Csv(e) => Some(e),
            SolverError::Toml(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SolverError {
    fn from(e: std::io::Error) -> Self {
        SolverError::Io(e)
    }
}

impl From<csv::Error> for SolverError {
    fn from(e: csv::Error) -> Self {
        SolverError::Csv(e)
    }
}

impl From<toml::de::Error> for SolverError {
    fn from(e: toml::de::Error) -> Self {
        SolverError::Toml(e)
    }
}

/// helper for shape checks of three-dimensional arrays
pub(crate) fn check_shape(
    what: &'static str,
    expected: (usize, usize, usize),
    found: (usize, usize, usize),
) -> Result<(), SolverError> {
    if expected == found {
        Ok(())
    } else {
        Err(SolverError::ShapeMismatch {
            what,
            expected: vec![expected.0, expected.1, expected.2],
            found: vec![found.0, found.1, found.2],
        })
    }
}
