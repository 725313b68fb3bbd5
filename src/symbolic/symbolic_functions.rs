//! # Built-in functions
//!
//! Every built-in is a [`FunctionDef`] with arity bounds and a native rule.
//! A rule returns
//! - `Ok(Some(expr))` when it knows an exact value (`sin(pi) = 0`,
//!   `log(1) = 0`, `3! = 6`), or an approximation in numeric mode when all
//!   arguments are constant;
//! - `Ok(None)` to keep the call symbolic, `sin(x)` stays `sin(x)`;
//! - a domain error at singular points, which the context may suppress.
//!   Fallbacks: `log(0) = -Infinity`, poles of `tan`, `sec`, `csc`, `cot` and
//!   negative integer factorials give `Infinity`, `mod(a, 0) = a`.
use crate::symbolic::rational::Rational;
use crate::symbolic::symbolic_arithmetic::{divide, pow};
use crate::symbolic::symbolic_context::{Context, FunctionDef, NativeFn};
use crate::symbolic::symbolic_engine::{Expr, Kind, SQRT};
use crate::symbolic::symbolic_errors::{DomainError, KernelResult};
use crate::symbolic::symbolic_numbers::{approximate, factorial, gamma};
use num::BigInt;
use num::Integer;
use num_traits::{FromPrimitive, One};
use std::sync::Arc;
use strum_macros::Display;

type Rule = fn(&[Expr], &Context) -> KernelResult<Option<Expr>>;

fn builtin(name: &str, min_args: usize, max_args: Option<usize>, rule: Rule) -> FunctionDef {
    let implementation: NativeFn = Arc::new(rule);
    FunctionDef {
        name: name.to_string(),
        min_args,
        max_args,
        implementation: Some(implementation),
        builtin: true,
    }
}

pub fn builtin_functions() -> Vec<FunctionDef> {
    vec![
        builtin(SQRT, 1, Some(1), sqrt_rule),
        builtin("abs", 1, Some(1), abs_rule),
        builtin("exp", 1, Some(1), exp_rule),
        builtin("log", 1, Some(2), log_rule),
        builtin("sin", 1, Some(1), |args, ctx| trig_rule(Trig::Sin, args, ctx)),
        builtin("cos", 1, Some(1), |args, ctx| trig_rule(Trig::Cos, args, ctx)),
        builtin("tan", 1, Some(1), |args, ctx| trig_rule(Trig::Tan, args, ctx)),
        builtin("sec", 1, Some(1), |args, ctx| trig_rule(Trig::Sec, args, ctx)),
        builtin("csc", 1, Some(1), |args, ctx| trig_rule(Trig::Csc, args, ctx)),
        builtin("cot", 1, Some(1), |args, ctx| trig_rule(Trig::Cot, args, ctx)),
        builtin("asin", 1, Some(1), |args, ctx| inverse_trig_rule("asin", args, ctx)),
        builtin("acos", 1, Some(1), |args, ctx| inverse_trig_rule("acos", args, ctx)),
        builtin("atan", 1, Some(1), |args, ctx| inverse_trig_rule("atan", args, ctx)),
        builtin("sinh", 1, Some(1), |args, ctx| hyperbolic_rule("sinh", args, ctx)),
        builtin("cosh", 1, Some(1), |args, ctx| hyperbolic_rule("cosh", args, ctx)),
        builtin("tanh", 1, Some(1), |args, ctx| hyperbolic_rule("tanh", args, ctx)),
        builtin("factorial", 1, Some(1), factorial_rule),
        builtin("floor", 1, Some(1), |args, ctx| rounding_rule("floor", args, ctx)),
        builtin("ceil", 1, Some(1), |args, ctx| rounding_rule("ceil", args, ctx)),
        builtin("round", 1, Some(1), |args, ctx| rounding_rule("round", args, ctx)),
        builtin("mod", 2, Some(2), mod_rule),
        builtin("min", 1, None, |args, ctx| extremum_rule(false, args, ctx)),
        builtin("max", 1, None, |args, ctx| extremum_rule(true, args, ctx)),
        builtin("sign", 1, Some(1), sign_rule),
    ]
}

/// `f64` value of a built-in, `None` for unknown names and non-finite results
pub fn evaluate_function(name: &str, args: &[f64]) -> Option<f64> {
    let value = match (name, args) {
        (SQRT, [x]) => x.sqrt(),
        ("abs", [x]) => x.abs(),
        ("exp", [x]) => x.exp(),
        ("log", [x]) => x.ln(),
        ("log", [x, base]) => x.ln() / base.ln(),
        ("sin", [x]) => x.sin(),
        ("cos", [x]) => x.cos(),
        ("tan", [x]) => x.tan(),
        ("sec", [x]) => 1.0 / x.cos(),
        ("csc", [x]) => 1.0 / x.sin(),
        ("cot", [x]) => 1.0 / x.tan(),
        ("asin", [x]) => x.asin(),
        ("acos", [x]) => x.acos(),
        ("atan", [x]) => x.atan(),
        ("sinh", [x]) => x.sinh(),
        ("cosh", [x]) => x.cosh(),
        ("tanh", [x]) => x.tanh(),
        ("factorial", [x]) => gamma(x + 1.0),
        ("floor", [x]) => x.floor(),
        ("ceil", [x]) => x.ceil(),
        ("round", [x]) => x.round(),
        ("mod", [a, b]) => a - b * (a / b).floor(),
        ("min", values) if !values.is_empty() => values.iter().copied().fold(f64::INFINITY, f64::min),
        ("max", values) if !values.is_empty() => {
            values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
        }
        ("sign", [x]) => {
            if *x == 0.0 {
                0.0
            } else {
                x.signum()
            }
        }
        _ => return None,
    };
    Some(value).filter(|value| value.is_finite())
}

/// approximation of `name(args)` when numeric mode is on and every argument is constant
fn numeric_value(name: &str, args: &[Expr], ctx: &Context) -> KernelResult<Option<Expr>> {
    if !ctx.is_numeric() {
        return Ok(None);
    }
    let Some(values) = args.iter().map(Expr::to_f64).collect::<Option<Vec<f64>>>() else {
        return Ok(None);
    };
    match evaluate_function(name, &values) {
        Some(value) => approximate(value, ctx).map(Some),
        None => Ok(None),
    }
}

fn singular(name: &str, argument: &Expr, ctx: &Context) -> KernelResult<Option<Expr>> {
    let error = DomainError::Singular {
        function: name.to_string(),
        argument: argument.to_string(),
    };
    ctx.domain_error(error, Expr::infinity).map(Some)
}

fn half() -> Rational {
    Rational::new(BigInt::one(), BigInt::from(2)).unwrap_or_else(|_| Rational::one())
}

fn sqrt_rule(args: &[Expr], ctx: &Context) -> KernelResult<Option<Expr>> {
    pow(args[0].clone(), Expr::number(half()), ctx).map(Some)
}

fn abs_rule(args: &[Expr], ctx: &Context) -> KernelResult<Option<Expr>> {
    let x = &args[0];
    if let Some(value) = x.as_number() {
        return Ok(Some(Expr::number(value.abs())));
    }
    if let Some(value) = numeric_value("abs", args, ctx)? {
        return Ok(Some(value));
    }
    if x.is_constant() {
        if let Some(value) = x.to_f64() {
            let exact = if value < 0.0 { x.clone().negated() } else { x.clone() };
            return Ok(Some(exact));
        }
    }
    if matches!(x.kind(), Kind::Function { name, power, .. } if name == "abs" && power.is_one()) {
        return Ok(Some(Expr::from_parts(x.multiplier().abs(), x.kind().clone())));
    }
    let (coefficient, unit) = x.clone().split_multiplier();
    if coefficient.is_one() {
        return Ok(None);
    }
    Ok(Some(Expr::function("abs", vec![unit]).scaled(&coefficient.abs())))
}

fn exp_rule(args: &[Expr], ctx: &Context) -> KernelResult<Option<Expr>> {
    if let Some(value) = numeric_value("exp", args, ctx)? {
        return Ok(Some(value));
    }
    pow(Expr::variable("e"), args[0].clone(), ctx).map(Some)
}

/// natural logarithm of one argument
fn natural_log(x: &Expr, ctx: &Context) -> KernelResult<Expr> {
    if x.is_zero() {
        return ctx.domain_error(DomainError::LogOfZero, || Expr::infinity().negated());
    }
    if x.is_one() {
        return Ok(Expr::zero());
    }
    if let Some(value) = numeric_value("log", std::slice::from_ref(x), ctx)? {
        return Ok(value);
    }
    if x.multiplier().is_one() {
        match x.kind() {
            Kind::Variable { name, power } if name == "e" => return Ok(Expr::number(power.clone())),
            Kind::Exponential { base, exponent } if **base == Expr::variable("e") => {
                return Ok((**exponent).clone());
            }
            _ => {}
        }
    }
    Ok(Expr::function("log", vec![x.clone()]))
}

fn log_rule(args: &[Expr], ctx: &Context) -> KernelResult<Option<Expr>> {
    let value = natural_log(&args[0], ctx)?;
    match args.get(1) {
        None => Ok(Some(value)),
        Some(base) => {
            let base = natural_log(base, ctx)?;
            divide(value, base, ctx).map(Some)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
enum Trig {
    Sin,
    Cos,
    Tan,
    Sec,
    Csc,
    Cot,
}

/// `k` when `x = k*pi`, zero included
fn pi_multiple(x: &Expr) -> Option<Rational> {
    if x.is_zero() {
        return Some(Rational::zero());
    }
    match x.kind() {
        Kind::Variable { name, power } if name == "pi" && power.is_one() => {
            Some(x.multiplier().clone())
        }
        _ => None,
    }
}

fn trig_rule(function: Trig, args: &[Expr], ctx: &Context) -> KernelResult<Option<Expr>> {
    let name = function.to_string();
    if let Some(value) = numeric_value(&name, args, ctx)? {
        return Ok(Some(value));
    }
    let Some(multiple) = pi_multiple(&args[0]) else {
        return Ok(None);
    };
    let twice = &multiple * &Rational::from_integer(2);
    if !twice.is_integer() {
        return Ok(None);
    }
    // (-1)^floor(k) is the sign of cos at integer k and of sin at half-odd k
    let sign = Expr::integer(if multiple.floor().is_even() { 1 } else { -1 });
    let value = if multiple.is_integer() {
        match function {
            Trig::Sin | Trig::Tan => Expr::zero(),
            Trig::Cos | Trig::Sec => sign,
            Trig::Csc | Trig::Cot => return singular(&name, &args[0], ctx),
        }
    } else {
        match function {
            Trig::Sin | Trig::Csc => sign,
            Trig::Cos | Trig::Cot => Expr::zero(),
            Trig::Tan | Trig::Sec => return singular(&name, &args[0], ctx),
        }
    };
    Ok(Some(value))
}

fn pi_times(numer: i64, denom: i64) -> Expr {
    let factor = Rational::from_ratio(numer, denom).unwrap_or_else(|_| Rational::one());
    Expr::variable("pi").scaled(&factor)
}

fn inverse_trig_rule(name: &str, args: &[Expr], ctx: &Context) -> KernelResult<Option<Expr>> {
    if let Some(value) = numeric_value(name, args, ctx)? {
        return Ok(Some(value));
    }
    let x = &args[0];
    let value = match (name, x.is_zero(), x.is_one()) {
        ("asin" | "atan", true, _) => Expr::zero(),
        ("acos", _, true) => Expr::zero(),
        ("acos", true, _) => pi_times(1, 2),
        ("asin", _, true) => pi_times(1, 2),
        ("atan", _, true) => pi_times(1, 4),
        _ => return Ok(None),
    };
    Ok(Some(value))
}

fn hyperbolic_rule(name: &str, args: &[Expr], ctx: &Context) -> KernelResult<Option<Expr>> {
    if let Some(value) = numeric_value(name, args, ctx)? {
        return Ok(Some(value));
    }
    if !args[0].is_zero() {
        return Ok(None);
    }
    let value = if name == "cosh" { Expr::one() } else { Expr::zero() };
    Ok(Some(value))
}

fn factorial_rule(args: &[Expr], ctx: &Context) -> KernelResult<Option<Expr>> {
    let x = &args[0];
    if let Some(value) = x.as_number() {
        if value.is_integer() {
            if value.is_negative() {
                return singular("factorial", x, ctx);
            }
            if let Some(exact) = factorial(value.numer()) {
                return Ok(Some(Expr::number(Rational::from_integer(exact))));
            }
        }
    }
    numeric_value("factorial", args, ctx)
}

fn rounding_rule(name: &str, args: &[Expr], ctx: &Context) -> KernelResult<Option<Expr>> {
    let x = &args[0];
    if let Some(value) = x.as_number() {
        let rounded = match name {
            "floor" => value.floor(),
            "ceil" => value.ceil(),
            _ => value.round(),
        };
        return Ok(Some(Expr::number(Rational::from_integer(rounded))));
    }
    if let Some(value) = numeric_value(name, args, ctx)? {
        return Ok(Some(value));
    }
    if x.is_constant() {
        if let Some(value) = x.to_f64().and_then(|v| evaluate_function(name, &[v])) {
            let exact = BigInt::from_f64(value).map(Rational::from_integer);
            return Ok(exact.map(Expr::number));
        }
    }
    Ok(None)
}

fn mod_rule(args: &[Expr], ctx: &Context) -> KernelResult<Option<Expr>> {
    if let (Some(a), Some(b)) = (args[0].as_number(), args[1].as_number()) {
        return match a.modulo(b) {
            Ok(value) => Ok(Some(Expr::number(value))),
            Err(err) => ctx.domain_error(err, || args[0].clone()).map(Some),
        };
    }
    numeric_value("mod", args, ctx)
}

/// the extreme argument itself, when every argument has a real value
fn extremum_rule(largest: bool, args: &[Expr], _ctx: &Context) -> KernelResult<Option<Expr>> {
    let mut best: Option<(f64, &Expr)> = None;
    for arg in args {
        if !arg.is_constant() {
            return Ok(None);
        }
        let Some(value) = arg.to_f64() else {
            return Ok(None);
        };
        let better = match best {
            None => true,
            Some((current, _)) => (largest && value > current) || (!largest && value < current),
        };
        if better {
            best = Some((value, arg));
        }
    }
    Ok(best.map(|(_, arg)| arg.clone()))
}

fn sign_rule(args: &[Expr], _ctx: &Context) -> KernelResult<Option<Expr>> {
    let x = &args[0];
    if let Some(value) = x.as_number() {
        return Ok(Some(Expr::integer(i64::from(value.signum()))));
    }
    if x.is_constant() {
        if let Some(value) = x.to_f64() {
            return Ok(Some(Expr::integer(value.signum() as i64)));
        }
    }
    Ok(None)
}
