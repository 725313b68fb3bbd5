//! different utility modules used throughout the project
/// console and file logging (simplelog), log level names, time-stamped log file names
pub mod logger;
/// read kernel settings, constants and variables from a TOML document
pub mod kernel_config;
