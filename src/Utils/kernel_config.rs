//! TOML configuration of a kernel [`Context`].
//!
//! ```toml
//! [kernel]
//! numeric = false
//! suppress_errors = true
//! max_depth = 256
//! log_level = "info"
//! log_file = "timestamped"   # or a path
//!
//! [constants]
//! g = "981/100"
//! c = 299792458
//!
//! [variables]
//! y = "x^2+1"
//! ```
//! Constants and variables are either numbers or expressions in kernel
//! syntax. Tables are read in key order, so a value may use names that sort
//! before it. Unknown keys are reported with `warn!` and skipped.
use crate::Utils::logger::{init_logger, timestamped_log_name};
use crate::symbolic::rational::Rational;
use crate::symbolic::symbolic_context::{Context, KernelSettings};
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_errors::{ConfigError, KernelResult};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use toml::{Table, Value};

const KERNEL_KEYS: [&str; 5] = ["numeric", "suppress_errors", "max_depth", "log_level", "log_file"];

fn invalid(key: &str, expected: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        expected: expected.to_string(),
    }
}

fn section<'a>(document: &'a Table, name: &str) -> Result<Option<&'a Table>, ConfigError> {
    match document.get(name) {
        None => Ok(None),
        Some(Value::Table(table)) => Ok(Some(table)),
        Some(_) => Err(invalid(name, "a table")),
    }
}

fn bool_key(table: &Table, key: &str) -> Result<Option<bool>, ConfigError> {
    match table.get(key) {
        None => Ok(None),
        Some(Value::Boolean(value)) => Ok(Some(*value)),
        Some(_) => Err(invalid(&format!("kernel.{}", key), "a boolean")),
    }
}

fn string_key<'a>(table: &'a Table, key: &str) -> Result<Option<&'a str>, ConfigError> {
    match table.get(key) {
        None => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.as_str())),
        Some(_) => Err(invalid(&format!("kernel.{}", key), "a string")),
    }
}

/// `[kernel]` section of a parsed document
pub fn settings_from_table(document: &Table) -> Result<KernelSettings, ConfigError> {
    let mut settings = KernelSettings::default();
    for name in document.keys() {
        if !["kernel", "constants", "variables"].contains(&name.as_str()) {
            warn!("unknown configuration section [{}] ignored", name);
        }
    }
    let Some(kernel) = section(document, "kernel")? else {
        return Ok(settings);
    };
    for key in kernel.keys() {
        if !KERNEL_KEYS.contains(&key.as_str()) {
            warn!("unknown key kernel.{} ignored", key);
        }
    }
    if let Some(numeric) = bool_key(kernel, "numeric")? {
        settings.set_numeric(numeric);
    }
    if let Some(suppress) = bool_key(kernel, "suppress_errors")? {
        settings.set_suppress_errors(suppress);
    }
    match kernel.get("max_depth") {
        None => {}
        Some(Value::Integer(depth)) if *depth > 0 => {
            settings.set_max_depth(*depth as usize);
        }
        Some(_) => return Err(invalid("kernel.max_depth", "a positive integer")),
    }
    if let Some(level) = string_key(kernel, "log_level")? {
        settings.set_log_level(level);
        if settings.level_filter().is_none() {
            return Err(invalid(
                "kernel.log_level",
                "one of trace, debug, info, warn, error, off",
            ));
        }
    }
    Ok(settings)
}

pub fn settings_from_toml(text: &str) -> Result<KernelSettings, ConfigError> {
    let document: Table = text.parse()?;
    settings_from_table(&document)
}

/// `kernel.log_file`: `"timestamped"` picks a name from the current time
fn log_file(document: &Table) -> Result<Option<PathBuf>, ConfigError> {
    let Some(kernel) = section(document, "kernel")? else {
        return Ok(None);
    };
    Ok(string_key(kernel, "log_file")?.map(|file| match file {
        "timestamped" => PathBuf::from(timestamped_log_name()),
        path => PathBuf::from(path),
    }))
}

fn value_to_expr(ctx: &Context, key: &str, value: &Value) -> KernelResult<Expr> {
    match value {
        Value::String(text) => ctx.parse(text),
        Value::Integer(value) => Ok(Expr::integer(*value)),
        Value::Float(value) => Ok(Expr::number(Rational::from_f64(*value)?)),
        _ => Err(invalid(key, "a number or an expression").into()),
    }
}

/// Builds a context: settings first, then constants, then variables.
pub fn context_from_toml(text: &str) -> KernelResult<Context> {
    let document: Table = text.parse().map_err(ConfigError::from)?;
    let settings = settings_from_table(&document)?;
    if let Some(level) = settings.level_filter() {
        let file = log_file(&document)?;
        if init_logger(level, file.as_deref()) {
            info!("logging at {} level", level);
        }
    }
    let mut ctx = Context::with_settings(settings);
    if let Some(constants) = section(&document, "constants")? {
        for (name, value) in constants {
            let value = value_to_expr(&ctx, &format!("constants.{}", name), value)?;
            ctx.register_constant(name, value)?;
        }
    }
    if let Some(variables) = section(&document, "variables")? {
        for (name, value) in variables {
            let value = value_to_expr(&ctx, &format!("variables.{}", name), value)?;
            ctx.set_variable(name, value)?;
        }
    }
    Ok(ctx)
}

pub fn context_from_file(path: &Path) -> KernelResult<Context> {
    let text = fs::read_to_string(path)
        .map_err(|err| ConfigError::Io(format!("{}: {}", path.display(), err)))?;
    context_from_toml(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::symbolic_errors::{KernelError, ValidationError};
    use std::io::Write;

    const CONFIG: &str = r#"
[kernel]
numeric = false
suppress_errors = true
max_depth = 64

[constants]
c = 3
g = "981/100"

[variables]
y = "x^2+1"
"#;

    #[test]
    fn test_settings() {
        let settings = settings_from_toml(CONFIG).unwrap();
        assert!(settings.suppress_errors);
        assert!(!settings.numeric);
        assert_eq!(settings.max_depth, 64);
        assert_eq!(settings.log_level, None);
        assert_eq!(settings_from_toml("").unwrap(), KernelSettings::default());
    }

    #[test]
    fn test_invalid_settings() {
        assert!(matches!(
            settings_from_toml("[kernel]\nmax_depth = -1"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            settings_from_toml("[kernel]\nnumeric = \"yes\""),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            settings_from_toml("[kernel]\nlog_level = \"loud\""),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            settings_from_toml("[kernel"),
            Err(ConfigError::Toml(_))
        ));
        assert!(settings_from_toml("[kernel]\ncolour = true").is_ok());
    }

    #[test]
    fn test_context_from_toml() {
        let ctx = context_from_toml(CONFIG).unwrap();
        assert!(ctx.suppresses_errors());
        assert_eq!(ctx.max_depth(), 64);
        assert_eq!(ctx.parse("g").unwrap().text(), "981/100");
        assert_eq!(ctx.parse("2c").unwrap(), Expr::integer(6));
        assert_eq!(ctx.parse("y-1").unwrap().text(), "x^2");
        assert_eq!(ctx.parse("1/0").unwrap(), Expr::infinity());
    }

    #[test]
    fn test_context_rejects_reserved_names() {
        let result = context_from_toml("[constants]\npi = 3");
        assert!(matches!(
            result,
            Err(KernelError::Validation(ValidationError::ReservedName(_)))
        ));
        let result = context_from_toml("[variables]\nx = true");
        assert!(matches!(
            result,
            Err(KernelError::Config(ConfigError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn test_context_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CONFIG.as_bytes()).unwrap();
        let ctx = context_from_file(file.path()).unwrap();
        assert_eq!(ctx.max_depth(), 64);
        let missing = file.path().with_extension("missing");
        assert!(matches!(
            context_from_file(&missing),
            Err(KernelError::Config(ConfigError::Io(_)))
        ));
    }
}
