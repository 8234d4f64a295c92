//! utility modules used throughout the project
/// logger setup and saving residual histories into files
pub mod logger;
