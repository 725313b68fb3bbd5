//! # Kernel context
//!
//! The [`Context`] carries everything the kernel needs besides the two
//! operands of an operation:
//! - mode flags: numeric evaluation and error suppression. They are switched
//!   with RAII guards ([`Context::numeric_scope`], [`Context::suppress_scope`])
//!   that put the previous value back when dropped, also on early returns
//!   through `?`;
//! - the recursion depth counter guarding the arithmetic engine;
//! - symbol tables: registered functions (built-ins included), constants and
//!   variable bindings.
//!
//! # Example
//! ```
//! use RustedCAS::symbolic::symbolic_context::Context;
//! let ctx = Context::new();
//! let a = ctx.parse("2x+3x").unwrap();
//! assert_eq!(a.to_string(), "5*x");
//! {
//!     let _numeric = ctx.numeric_scope(true);
//!     assert!(ctx.is_numeric());
//! }
//! assert!(!ctx.is_numeric());
//! ```
use crate::Utils::logger::parse_level;
use crate::symbolic::parse_expr::parse_expression;
use crate::symbolic::symbolic_arithmetic as arithmetic;
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_errors::{DomainError, KernelError, KernelResult, ValidationError};
use crate::symbolic::symbolic_functions::builtin_functions;
use crate::symbolic::utils::validate_name;
use log::{LevelFilter, info, warn};
use rayon::prelude::*;
use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// names the kernel owns besides the built-in functions
pub const RESERVED_CONSTANTS: [&str; 4] = ["pi", "e", "i", "Infinity"];
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Native implementation of a function. `Ok(None)` means "no simplification":
/// the call stays symbolic.
pub type NativeFn = Arc<dyn Fn(&[Expr], &Context) -> KernelResult<Option<Expr>> + Send + Sync>;

#[derive(Clone)]
pub struct FunctionDef {
    pub name: String,
    pub min_args: usize,
    /// `None` for variadic functions
    pub max_args: Option<usize>,
    pub implementation: Option<NativeFn>,
    pub builtin: bool,
}

impl FunctionDef {
    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min_args && self.max_args.is_none_or(|max| count <= max)
    }

    pub fn arity_text(&self) -> String {
        match self.max_args {
            Some(max) if max == self.min_args => max.to_string(),
            Some(max) => format!("{}..={}", self.min_args, max),
            None => format!("at least {}", self.min_args),
        }
    }
}

impl fmt::Debug for FunctionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionDef")
            .field("name", &self.name)
            .field("min_args", &self.min_args)
            .field("max_args", &self.max_args)
            .field("native", &self.implementation.is_some())
            .field("builtin", &self.builtin)
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct KernelSettings {
    pub numeric: bool,
    pub suppress_errors: bool,
    pub max_depth: usize,
    /// "debug", "info", "warn", "error", "off"; `None` leaves logging alone
    pub log_level: Option<String>,
}

impl Default for KernelSettings {
    fn default() -> Self {
        KernelSettings {
            numeric: false,
            suppress_errors: false,
            max_depth: DEFAULT_MAX_DEPTH,
            log_level: None,
        }
    }
}

impl KernelSettings {
    pub fn set_numeric(&mut self, numeric: bool) -> &mut Self {
        self.numeric = numeric;
        self
    }

    pub fn set_suppress_errors(&mut self, suppress: bool) -> &mut Self {
        self.suppress_errors = suppress;
        self
    }

    pub fn set_max_depth(&mut self, max_depth: usize) -> &mut Self {
        self.max_depth = max_depth;
        self
    }

    pub fn set_log_level(&mut self, level: &str) -> &mut Self {
        self.log_level = Some(level.to_string());
        self
    }

    pub fn level_filter(&self) -> Option<LevelFilter> {
        self.log_level.as_deref().and_then(parse_level)
    }
}

/// Registered functions, constants and variable bindings.
#[derive(Clone, Debug, Default)]
pub struct SymbolTables {
    functions: HashMap<String, FunctionDef>,
    constants: HashMap<String, Expr>,
    variables: HashMap<String, Expr>,
}

/// Restores a mode flag when dropped.
pub struct FlagGuard<'a> {
    flag: &'a Cell<bool>,
    previous: bool,
}

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(self.previous);
    }
}

/// One level of arithmetic recursion.
pub struct DepthGuard<'a> {
    depth: &'a Cell<usize>,
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

#[derive(Clone, Debug)]
pub struct Context {
    numeric: Cell<bool>,
    suppress_errors: Cell<bool>,
    max_depth: usize,
    depth: Cell<usize>,
    tables: SymbolTables,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    pub fn new() -> Self {
        Self::with_settings(KernelSettings::default())
    }

    pub fn with_settings(settings: KernelSettings) -> Self {
        let mut tables = SymbolTables::default();
        for def in builtin_functions() {
            tables.functions.insert(def.name.clone(), def);
        }
        Self::from_parts(settings, tables)
    }

    fn from_parts(settings: KernelSettings, tables: SymbolTables) -> Self {
        Context {
            numeric: Cell::new(settings.numeric),
            suppress_errors: Cell::new(settings.suppress_errors),
            max_depth: settings.max_depth,
            depth: Cell::new(0),
            tables,
        }
    }

    /// current flags as plain settings
    pub fn settings(&self) -> KernelSettings {
        KernelSettings {
            numeric: self.numeric.get(),
            suppress_errors: self.suppress_errors.get(),
            max_depth: self.max_depth,
            log_level: None,
        }
    }

    ////////////////////////////////////////////////////////////////////////
    //                           MODE FLAGS
    ////////////////////////////////////////////////////////////////////////

    pub fn is_numeric(&self) -> bool {
        self.numeric.get()
    }

    pub fn set_numeric(&self, numeric: bool) {
        self.numeric.set(numeric);
    }

    pub fn suppresses_errors(&self) -> bool {
        self.suppress_errors.get()
    }

    pub fn set_suppress_errors(&self, suppress: bool) {
        self.suppress_errors.set(suppress);
    }

    /// numeric mode switched to `on` until the guard is dropped
    pub fn numeric_scope(&self, on: bool) -> FlagGuard<'_> {
        let previous = self.numeric.replace(on);
        FlagGuard {
            flag: &self.numeric,
            previous,
        }
    }

    /// error suppression switched to `on` until the guard is dropped
    pub fn suppress_scope(&self, on: bool) -> FlagGuard<'_> {
        let previous = self.suppress_errors.replace(on);
        FlagGuard {
            flag: &self.suppress_errors,
            previous,
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Enters one level of arithmetic recursion.
    pub fn enter(&self) -> KernelResult<DepthGuard<'_>> {
        let depth = self.depth.get() + 1;
        if depth > self.max_depth {
            return Err(KernelError::RecursionLimit(self.max_depth));
        }
        self.depth.set(depth);
        Ok(DepthGuard { depth: &self.depth })
    }

    /// Reports a domain error, or returns `fallback()` when errors are suppressed.
    pub fn domain_error(
        &self,
        error: DomainError,
        fallback: impl FnOnce() -> Expr,
    ) -> KernelResult<Expr> {
        if self.suppresses_errors() {
            let value = fallback();
            warn!("{} suppressed, continuing with {}", error, value);
            Ok(value)
        } else {
            Err(error.into())
        }
    }

    ////////////////////////////////////////////////////////////////////////
    //                       REGISTRATION & LOOKUP
    ////////////////////////////////////////////////////////////////////////

    /// built-in function names and the reserved constants
    pub fn is_reserved(&self, name: &str) -> bool {
        RESERVED_CONSTANTS.contains(&name)
            || self.tables.functions.get(name).is_some_and(|def| def.builtin)
    }

    fn check_free_name(&self, name: &str) -> Result<(), ValidationError> {
        validate_name(name)?;
        if self.is_reserved(name) {
            return Err(ValidationError::ReservedName(name.to_string()));
        }
        Ok(())
    }

    /// Registers (or replaces) a collaborator function. `max_args: None` makes it variadic.
    pub fn register_function(
        &mut self,
        name: &str,
        min_args: usize,
        max_args: Option<usize>,
        implementation: Option<NativeFn>,
    ) -> Result<(), ValidationError> {
        self.check_free_name(name)?;
        if self.tables.constants.contains_key(name) {
            return Err(ValidationError::ReservedName(name.to_string()));
        }
        info!("registering function {}", name);
        self.tables.functions.insert(
            name.to_string(),
            FunctionDef {
                name: name.to_string(),
                min_args,
                max_args,
                implementation,
                builtin: false,
            },
        );
        Ok(())
    }

    pub fn register_constant(&mut self, name: &str, value: Expr) -> Result<(), ValidationError> {
        self.check_free_name(name)?;
        if self.tables.functions.contains_key(name) {
            return Err(ValidationError::ReservedName(name.to_string()));
        }
        info!("registering constant {} = {}", name, value);
        self.tables.constants.insert(name.to_string(), value);
        Ok(())
    }

    /// Binds a variable name to an expression substituted at parse time.
    pub fn set_variable(&mut self, name: &str, value: Expr) -> Result<(), ValidationError> {
        self.check_free_name(name)?;
        self.tables.variables.insert(name.to_string(), value);
        Ok(())
    }

    pub fn clear_variable(&mut self, name: &str) -> Option<Expr> {
        self.tables.variables.remove(name)
    }

    pub fn variable(&self, name: &str) -> Option<&Expr> {
        self.tables.variables.get(name)
    }

    pub fn constant(&self, name: &str) -> Option<&Expr> {
        self.tables.constants.get(name)
    }

    pub fn function(&self, name: &str) -> Option<&FunctionDef> {
        self.tables.functions.get(name)
    }

    ////////////////////////////////////////////////////////////////////////
    //                             FACADE
    ////////////////////////////////////////////////////////////////////////

    pub fn parse(&self, text: &str) -> KernelResult<Expr> {
        parse_expression(text, &HashMap::new(), self)
    }

    /// Parses with call-local substitutions that shadow variables and constants.
    pub fn parse_with(&self, text: &str, substitutions: &HashMap<String, Expr>) -> KernelResult<Expr> {
        for name in substitutions.keys() {
            validate_name(name)?;
        }
        parse_expression(text, substitutions, self)
    }

    /// Parses independent inputs in parallel, one context copy per worker thread.
    /// Results keep the input order.
    pub fn parse_many(&self, inputs: &[&str]) -> Vec<KernelResult<Expr>> {
        let settings = self.settings();
        let tables = &self.tables;
        inputs
            .par_iter()
            .map_init(
                || Context::from_parts(settings.clone(), tables.clone()),
                |ctx, text| ctx.parse(text),
            )
            .collect()
    }

    pub fn add(&self, a: Expr, b: Expr) -> KernelResult<Expr> {
        arithmetic::add(a, b, self)
    }

    pub fn subtract(&self, a: Expr, b: Expr) -> KernelResult<Expr> {
        arithmetic::subtract(a, b, self)
    }

    pub fn multiply(&self, a: Expr, b: Expr) -> KernelResult<Expr> {
        arithmetic::multiply(a, b, self)
    }

    pub fn divide(&self, a: Expr, b: Expr) -> KernelResult<Expr> {
        arithmetic::divide(a, b, self)
    }

    pub fn pow(&self, a: Expr, b: Expr) -> KernelResult<Expr> {
        arithmetic::pow(a, b, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scopes_restore_flags() {
        let ctx = Context::new();
        {
            let _numeric = ctx.numeric_scope(true);
            let _suppress = ctx.suppress_scope(true);
            assert!(ctx.is_numeric());
            assert!(ctx.suppresses_errors());
            {
                let _inner = ctx.numeric_scope(false);
                assert!(!ctx.is_numeric());
            }
            assert!(ctx.is_numeric());
        }
        assert!(!ctx.is_numeric());
        assert!(!ctx.suppresses_errors());
    }

    #[test]
    fn test_scope_restored_on_error_path() {
        fn failing(ctx: &Context) -> KernelResult<Expr> {
            let _numeric = ctx.numeric_scope(true);
            ctx.parse("(x")
        }
        let ctx = Context::new();
        assert!(failing(&ctx).is_err());
        assert!(!ctx.is_numeric());
    }

    #[test]
    fn test_depth_guard() {
        let mut settings = KernelSettings::default();
        settings.set_max_depth(2);
        let ctx = Context::with_settings(settings);
        let first = ctx.enter().unwrap();
        let second = ctx.enter().unwrap();
        assert_eq!(ctx.enter().err(), Some(KernelError::RecursionLimit(2)));
        drop(second);
        assert!(ctx.enter().is_ok());
        drop(first);
    }

    #[test]
    fn test_reserved_names() {
        let mut ctx = Context::new();
        for name in ["pi", "e", "i", "Infinity", "sin", "sqrt", "log"] {
            assert_eq!(
                ctx.register_constant(name, Expr::integer(1)),
                Err(ValidationError::ReservedName(name.to_string()))
            );
            assert!(ctx.set_variable(name, Expr::integer(1)).is_err());
        }
        assert_eq!(
            ctx.register_function("2f", 1, Some(1), None),
            Err(ValidationError::InvalidName("2f".to_string()))
        );
    }

    #[test]
    fn test_registration() {
        let mut ctx = Context::new();
        ctx.register_constant("g", Expr::integer(10)).unwrap();
        ctx.register_function("f", 1, Some(2), None).unwrap();
        assert_eq!(ctx.constant("g"), Some(&Expr::integer(10)));
        assert!(ctx.function("f").unwrap().accepts(2));
        assert!(!ctx.function("f").unwrap().accepts(3));
        assert_eq!(ctx.function("f").unwrap().arity_text(), "1..=2");
        // a constant and a function cannot share a name
        assert!(ctx.register_function("g", 1, Some(1), None).is_err());
        assert!(ctx.register_constant("f", Expr::integer(1)).is_err());
        assert!(!ctx.is_reserved("f"));
    }

    #[test]
    fn test_domain_error_fallback() {
        let ctx = Context::new();
        let err = ctx.domain_error(DomainError::DivisionByZero, Expr::one);
        assert_eq!(err, Err(KernelError::Domain(DomainError::DivisionByZero)));
        let _suppress = ctx.suppress_scope(true);
        let value = ctx.domain_error(DomainError::DivisionByZero, Expr::one);
        assert_eq!(value, Ok(Expr::one()));
    }

    #[test]
    fn test_settings_round_trip() {
        let mut settings = KernelSettings::default();
        settings.set_numeric(true).set_suppress_errors(true).set_log_level("warn");
        assert_eq!(settings.level_filter(), Some(LevelFilter::Warn));
        let ctx = Context::with_settings(settings);
        let current = ctx.settings();
        assert!(current.numeric);
        assert!(current.suppress_errors);
        assert_eq!(current.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_parse_many_keeps_order() {
        let ctx = Context::new();
        let inputs = ["x+x", "1/3+1/6", "(x", "y*y"];
        let results = ctx.parse_many(&inputs);
        assert_eq!(results.len(), 4);
        assert_eq!(results[0].as_ref().unwrap().to_string(), "2*x");
        assert_eq!(results[1].as_ref().unwrap().to_string(), "1/2");
        assert!(results[2].is_err());
        assert_eq!(results[3].as_ref().unwrap().to_string(), "y^2");
    }
}
