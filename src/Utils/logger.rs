use chrono::Local;
use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger,
};
use std::fs::File;
use std::path::Path;

/// Level name as written in config files: `trace`, `debug`, `info`,
/// `warn` (or `warning`), `error`, `off` (or `none`). Case does not matter.
pub fn parse_level(level: &str) -> Option<LevelFilter> {
    match level.trim().to_lowercase().as_str() {
        "trace" => Some(LevelFilter::Trace),
        "debug" => Some(LevelFilter::Debug),
        "info" => Some(LevelFilter::Info),
        "warn" | "warning" => Some(LevelFilter::Warn),
        "error" => Some(LevelFilter::Error),
        "off" | "none" => Some(LevelFilter::Off),
        _ => None,
    }
}

/// log file name stamped with the local time
pub fn timestamped_log_name() -> String {
    Local::now().format("log_%Y-%m-%d_%H-%M-%S.txt").to_string()
}

/// Console logger plus an optional file logger. Returns false when a global
/// logger was already installed or `level` is `Off`.
pub fn init_logger(level: LevelFilter, log_file: Option<&Path>) -> bool {
    if level == LevelFilter::Off {
        return false;
    }
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(path) = log_file {
        match File::create(path) {
            Ok(file) => loggers.push(WriteLogger::new(level, Config::default(), file)),
            Err(err) => eprintln!("cannot create log file {}: {}", path.display(), err),
        }
    }
    CombinedLogger::init(loggers).is_ok()
}
