//! Solver settings: defaults, builder methods and a TOML reader.
//!
//! A settings file holds a `[solver]` table:
//! ```toml
//! [solver]
//! method = "cg"
//! tolerance = 1e-8
//! max_iterations = -1      # -1: number of interior cells
//! verbose = false
//! check_diagonal = true
//! strict = false
//! record_history = true
//! relaxation = 0.9         # weighted Jacobi only
//! loglevel = "info"
//! ```
use crate::Utils::logger::level_filter;
use crate::error::SolverError;
use crate::solvers::SolverKind;
use std::path::Path;
use std::str::FromStr;
use toml::{Table, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct SolverSettings {
    pub method: SolverKind,
    /// absolute tolerance on the residual norm; zero runs to the iteration limit
    pub tolerance: f64,
    /// `None` means one iteration per interior cell
    pub max_iterations: Option<usize>,
    /// log every iteration's residual at info level
    pub verbose: bool,
    /// refuse operators with a (near) zero diagonal before iterating
    pub check_diagonal: bool,
    /// turn non-convergence and breakdown into errors
    pub strict: bool,
    pub record_history: bool,
    /// under-relaxation of the weighted Jacobi sweep
    pub relaxation: f64,
    pub loglevel: Option<String>,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            method: SolverKind::Cg,
            tolerance: 1e-8,
            max_iterations: None,
            verbose: false,
            check_diagonal: true,
            strict: false,
            record_history: true,
            relaxation: 0.9,
            loglevel: None,
        }
    }
}

impl SolverSettings {
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            ..Self::default()
        }
    }

    pub fn with_method(mut self, method: SolverKind) -> Self {
        self.method = method;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_check_diagonal(mut self, check: bool) -> Self {
        self.check_diagonal = check;
        self
    }

    pub fn with_record_history(mut self, record: bool) -> Self {
        self.record_history = record;
        self
    }

    pub fn with_relaxation(mut self, relaxation: f64) -> Self {
        self.relaxation = relaxation;
        self
    }

    pub fn with_loglevel(mut self, loglevel: &str) -> Self {
        self.loglevel = Some(loglevel.to_string());
        self
    }

    /// iteration cap for a system of `cells` unknowns
    pub fn iteration_limit(&self, cells: usize) -> usize {
        self.max_iterations.unwrap_or(cells)
    }

    pub fn validate(&self) -> Result<(), SolverError> {
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(SolverError::Config(format!(
                "tolerance must be non-negative and finite, got {}",
                self.tolerance
            )));
        }
        if !(self.relaxation > 0.0 && self.relaxation <= 1.0) {
            return Err(SolverError::Config(format!(
                "relaxation must lie in (0, 1], got {}",
                self.relaxation
            )));
        }
        level_filter(self.loglevel.as_deref())?;
        Ok(())
    }

    /// Reads the `[solver]` table of a TOML document; keys missing from the
    /// table keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, SolverError> {
        let doc: Table = text.parse::<Table>()?;
        let table = match doc.get("solver") {
            Some(Value::Table(t)) => t.clone(),
            Some(_) => return Err(SolverError::Config("[solver] must be a table".to_string())),
            None => doc,
        };
        let mut settings = Self::default();
        for (key, value) in table.iter() {
            match key.as_str() {
                "method" => {
                    let name = as_str(key, value)?;
                    settings.method = SolverKind::from_str(name).map_err(|_| {
                        SolverError::Config(format!("unknown solver method {}", name))
                    })?;
                }
                "tolerance" => settings.tolerance = as_float(key, value)?,
                "max_iterations" => {
                    let n = as_int(key, value)?;
                    settings.max_iterations = if n < 0 { None } else { Some(n as usize) };
                }
                "verbose" => settings.verbose = as_bool(key, value)?,
                "check_diagonal" => settings.check_diagonal = as_bool(key, value)?,
                "strict" => settings.strict = as_bool(key, value)?,
                "record_history" => settings.record_history = as_bool(key, value)?,
                "relaxation" => settings.relaxation = as_float(key, value)?,
                "loglevel" => settings.loglevel = Some(as_str(key, value)?.to_string()),
                other => {
                    return Err(SolverError::Config(format!("unknown key {}", other)));
                }
            }
        }
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, SolverError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

fn as_float(key: &str, value: &Value) -> Result<f64, SolverError> {
    match value {
        Value::Float(f) => Ok(*f),
        Value::Integer(i) => Ok(*i as f64),
        _ => Err(type_error(key, "a number")),
    }
}

fn as_int(key: &str, value: &Value) -> Result<i64, SolverError> {
    value.as_integer().ok_or_else(|| type_error(key, "an integer"))
}

fn as_bool(key: &str, value: &Value) -> Result<bool, SolverError> {
    value.as_bool().ok_or_else(|| type_error(key, "a boolean"))
}

fn as_str<'a>(key: &str, value: &'a Value) -> Result<&'a str, SolverError> {
    value.as_str().ok_or_else(|| type_error(key, "a string"))
}

fn type_error(key: &str, expected: &str) -> SolverError {
    SolverError::Config(format!("{} must be {}", key, expected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_are_valid() {
        let s = SolverSettings::default();
        assert!(s.validate().is_ok());
        assert_eq!(s.iteration_limit(64), 64);
        assert_eq!(s.clone().with_max_iterations(5).iteration_limit(64), 5);
    }

    #[test]
    fn parses_solver_table() {
        let text = r#"
            [solver]
            method = "cgs"
            tolerance = 1e-6
            max_iterations = 200
            verbose = true
            strict = true
            loglevel = "warn"
        "#;
        let s = SolverSettings::from_toml_str(text).unwrap();
        assert_eq!(s.method, SolverKind::Cgs);
        assert_eq!(s.tolerance, 1e-6);
        assert_eq!(s.max_iterations, Some(200));
        assert!(s.verbose);
        assert!(s.strict);
        assert!(s.check_diagonal);
        assert_eq!(s.loglevel.as_deref(), Some("warn"));
    }

    #[test]
    fn zero_tolerance_is_accepted() {
        let s = SolverSettings::from_toml_str("tolerance = 0.0").unwrap();
        assert_eq!(s.tolerance, 0.0);
        assert!(SolverSettings::new(0.0).validate().is_ok());
    }

    #[test]
    fn loglevels_follow_the_logger() {
        for level in ["off", "none", "debug", "info", "warn", "error"] {
            assert!(SolverSettings::default().with_loglevel(level).validate().is_ok());
        }
        assert!(matches!(
            SolverSettings::default().with_loglevel("trace!").validate(),
            Err(SolverError::Config(_))
        ));
    }

    #[test]
    fn negative_iteration_count_means_cell_count() {
        let s = SolverSettings::from_toml_str("max_iterations = -1\ntolerance = 1").unwrap();
        assert_eq!(s.max_iterations, None);
        assert_eq!(s.tolerance, 1.0);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            SolverSettings::from_toml_str("tolerance = -1e-8"),
            Err(SolverError::Config(_))
        ));
        assert!(SolverSettings::from_toml_str("tolerance = nan").is_err());
        assert!(SolverSettings::from_toml_str("tolerance = \"small\"").is_err());
        assert!(SolverSettings::from_toml_str("method = \"gmres\"").is_err());
        assert!(SolverSettings::from_toml_str("loglevel = \"chatty\"").is_err());
        assert!(SolverSettings::from_toml_str("relaxation = 1.5").is_err());
        assert!(SolverSettings::from_toml_str("colour = \"red\"").is_err());
        assert!(matches!(
            SolverSettings::from_toml_str("tolerance = "),
            Err(SolverError::Toml(_))
        ));
    }

    #[test]
    fn reads_settings_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[solver]\nmethod = \"jacobi\"\nrelaxation = 0.8").unwrap();
        let s = SolverSettings::from_toml_file(file.path()).unwrap();
        assert_eq!(s.method, SolverKind::Jacobi);
        assert_eq!(s.relaxation, 0.8);
        assert!(matches!(
            SolverSettings::from_toml_file("/nonexistent/solver.toml"),
            Err(SolverError::Io(_))
        ));
    }
}
