use crate::error::SolverError;
use chrono::Local;
use csv::Writer;
use log::{LevelFilter, info};
use simplelog::{
    ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger,
};
use std::fs::File;
use std::path::Path;

/// Maps a loglevel string to a filter; `None` for "off"/"none".
pub fn level_filter(loglevel: Option<&str>) -> Result<Option<LevelFilter>, SolverError> {
    let filter = match loglevel {
        None => LevelFilter::Info,
        Some("off") | Some("none") => return Ok(None),
        Some("debug") => LevelFilter::Debug,
        Some("info") => LevelFilter::Info,
        Some("warn") => LevelFilter::Warn,
        Some("error") => LevelFilter::Error,
        Some(other) => {
            return Err(SolverError::Config(format!(
                "loglevel must be off, none, debug, info, warn or error, got {}",
                other
            )));
        }
    };
    Ok(Some(filter))
}

/// Sets up terminal logging and, if `log_file` is set, a copy into
/// `log_<date>_<time>.txt` in the working directory. A logger installed
/// earlier stays in place.
pub fn init_logger(loglevel: Option<&str>, log_file: bool) -> Result<(), SolverError> {
    let Some(log_option) = level_filter(loglevel)? else {
        return Ok(());
    };
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        log_option,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if log_file {
        let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
        let name = format!("log_{}.txt", date_and_time);
        loggers.push(WriteLogger::new(log_option, Config::default(), File::create(name)?));
    }
    match CombinedLogger::init(loggers) {
        Ok(()) => info!(" \n \n Program started with loglevel: {}", log_option),
        Err(_) => log::debug!("logger already initialised"),
    }
    Ok(())
}

/// Writes residual history as `iteration,residual` rows, iterations from 1.
pub fn save_residuals_to_csv<P: AsRef<Path>>(history: &[f64], path: P) -> Result<(), SolverError> {
    let mut writer = Writer::from_path(path)?;
    writer.write_record(["iteration", "residual"])?;
    for (i, residual) in history.iter().enumerate() {
        writer.write_record([(i + 1).to_string(), format!("{:e}", residual)])?;
    }
    writer.flush()?;
    Ok(())
}
