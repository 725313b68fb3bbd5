//! # Arithmetic engine
//!
//! `add`, `subtract`, `multiply`, `divide` and `pow` over canonical
//! expressions. Operands are taken by value and the result is canonical again.
//!
//! ## Addition
//! Sums absorb the other operand through their keyed slots
//! ([`attach_term`]). Two terms that differ only by their multiplier combine
//! into one, powers of the same symbol form a `PL`, anything else opens a new
//! `CP`.
//!
//! ## Multiplication
//! Multipliers are pulled out first and re-applied at the end. Products absorb
//! the other operand through [`combine_factor`]; two factors with the same
//! base add their exponents (`x*x^2 = x^3`, `x^y*x = x^(y+1)`,
//! `sqrt(2)*2^(1/3) = 2^(5/6)`).
//!
//! ## Powers
//! Rational exponents multiply into the power of the base. Products are
//! distributed for integer exponents, sums keep the power (`(x+1)^2` is not
//! expanded). Symbolic exponents produce `EX`.
//!
//! # Example
//! ```
//! use RustedCAS::symbolic::symbolic_arithmetic::{add, multiply};
//! use RustedCAS::symbolic::symbolic_context::Context;
//! use RustedCAS::symbolic::symbolic_engine::Expr;
//! let ctx = Context::new();
//! let x = Expr::variable("x");
//! let sum = add(x.clone(), x.clone(), &ctx).unwrap();
//! assert_eq!(sum.to_string(), "2*x");
//! let product = multiply(sum, x, &ctx).unwrap();
//! assert_eq!(product.to_string(), "2*x^2");
//! ```
use crate::symbolic::rational::Rational;
use crate::symbolic::symbolic_context::Context;
use crate::symbolic::symbolic_engine::{
    Expr, Group, IMAGINARY, Kind, attach_term, combine_factor, finish_product, finish_sum,
};
use crate::symbolic::symbolic_errors::{DomainError, KernelResult};
use crate::symbolic::symbolic_numbers::{approximate, imaginary_power, pow_number};
use log::trace;
use num::Integer;
use std::collections::BTreeMap;

pub fn add(a: Expr, b: Expr, ctx: &Context) -> KernelResult<Expr> {
    let _depth = ctx.enter()?;
    if a.is_zero() {
        return Ok(b);
    }
    if b.is_zero() {
        return Ok(a);
    }
    if a.is_infinite() || b.is_infinite() {
        return add_infinite(a, b, ctx);
    }
    if let (Some(x), Some(y)) = (a.as_number(), b.as_number()) {
        return Ok(Expr::number(x + y));
    }
    let (a, b) = if addition_rank(&b) > addition_rank(&a) {
        (b, a)
    } else {
        (a, b)
    };
    trace!("add {} + {}", a, b);
    if a.is_sum_container() {
        return add_to_sum(a, b, ctx);
    }
    add_terms(a, b, ctx)
}

/// sums with power 1 go first, `CP` before `PL`
fn addition_rank(e: &Expr) -> (u8, Group) {
    let rank = match (e.is_sum_container(), e.group()) {
        (true, Group::CP) => 2,
        (true, _) => 1,
        _ => 0,
    };
    (rank, e.group())
}

fn add_to_sum(sum: Expr, other: Expr, ctx: &Context) -> KernelResult<Expr> {
    match sum.kind {
        Kind::Sum { mut terms, power } => {
            attach_term(&mut terms, Group::CP, other, ctx)?;
            Ok(finish_sum(Kind::Sum { terms, power }))
        }
        Kind::Polynomial {
            variable,
            mut terms,
            power,
        } => {
            let same_variable = match &other.kind {
                Kind::Variable { name, .. } => *name == variable,
                Kind::Polynomial { variable: own, .. } => other.is_sum_container() && *own == variable,
                _ => false,
            };
            if same_variable {
                attach_term(&mut terms, Group::PL, other, ctx)?;
                Ok(finish_sum(Kind::Polynomial {
                    variable,
                    terms,
                    power,
                }))
            } else {
                let polynomial = Expr::from_kind(Kind::Polynomial {
                    variable,
                    terms,
                    power,
                });
                new_sum(polynomial, other, ctx)
            }
        }
        kind => add_terms(Expr::from_parts(sum.multiplier, kind), other, ctx),
    }
}

fn new_sum(a: Expr, b: Expr, ctx: &Context) -> KernelResult<Expr> {
    let mut terms = BTreeMap::new();
    attach_term(&mut terms, Group::CP, a, ctx)?;
    attach_term(&mut terms, Group::CP, b, ctx)?;
    Ok(finish_sum(Kind::Sum {
        terms,
        power: Rational::one(),
    }))
}

/// neither operand is a sum with power 1
fn add_terms(a: Expr, b: Expr, ctx: &Context) -> KernelResult<Expr> {
    if a.kind == b.kind {
        let multiplier = &a.multiplier + &b.multiplier;
        return Ok(Expr::from_parts(multiplier, a.kind));
    }
    if let (Kind::Variable { name: x, .. }, Kind::Variable { name: y, .. }) = (&a.kind, &b.kind) {
        if x == y {
            let variable = x.clone();
            let mut terms = BTreeMap::new();
            attach_term(&mut terms, Group::PL, a, ctx)?;
            attach_term(&mut terms, Group::PL, b, ctx)?;
            return Ok(finish_sum(Kind::Polynomial {
                variable,
                terms,
                power: Rational::one(),
            }));
        }
    }
    new_sum(a, b, ctx)
}

fn signed_infinity(sign: i32) -> Expr {
    Expr::infinity().scaled(&Rational::from_integer(sign))
}

fn sign_of(x: &Rational) -> i32 {
    if x.is_negative() { -1 } else { 1 }
}

/// `±Infinity` absorbs anything finite, opposite infinities are undefined
fn add_infinite(a: Expr, b: Expr, ctx: &Context) -> KernelResult<Expr> {
    match (a.is_infinite(), b.is_infinite()) {
        (true, true) if sign_of(&a.multiplier) != sign_of(&b.multiplier) => ctx.domain_error(
            DomainError::Undefined("Infinity-Infinity".to_string()),
            Expr::infinity,
        ),
        (true, _) => Ok(signed_infinity(sign_of(&a.multiplier))),
        _ => Ok(signed_infinity(sign_of(&b.multiplier))),
    }
}

/// sign of a non-zero real constant or of an infinity
fn real_sign(e: &Expr) -> Option<i32> {
    if e.is_infinite() {
        return Some(sign_of(&e.multiplier));
    }
    let value = e.to_f64()?;
    Some(if value < 0.0 { -1 } else { 1 })
}

/// `None` when the other operand has no known sign and the product stays symbolic
fn multiply_infinite(a: &Expr, b: &Expr, ctx: &Context) -> KernelResult<Option<Expr>> {
    if a.is_zero() || b.is_zero() {
        return ctx
            .domain_error(DomainError::Undefined("0*Infinity".to_string()), Expr::infinity)
            .map(Some);
    }
    Ok(match (real_sign(a), real_sign(b)) {
        (Some(x), Some(y)) => Some(signed_infinity(x * y)),
        _ => None,
    })
}

/// `(±Infinity)^p` for a number `p`
fn pow_infinite(a: &Expr, exponent: &Rational, ctx: &Context) -> KernelResult<Expr> {
    if exponent.is_zero() {
        return ctx.domain_error(DomainError::Undefined("Infinity^0".to_string()), Expr::one);
    }
    if exponent.is_negative() {
        return Ok(Expr::zero());
    }
    let odd = exponent.is_integer() && exponent.numer().is_odd();
    let sign = if odd { sign_of(&a.multiplier) } else { 1 };
    Ok(signed_infinity(sign))
}

pub fn negate(a: Expr) -> Expr {
    a.negated()
}

pub fn subtract(a: Expr, b: Expr, ctx: &Context) -> KernelResult<Expr> {
    add(a, b.negated(), ctx)
}

pub fn multiply(a: Expr, b: Expr, ctx: &Context) -> KernelResult<Expr> {
    let _depth = ctx.enter()?;
    if a.is_infinite() || b.is_infinite() {
        if let Some(product) = multiply_infinite(&a, &b, ctx)? {
            return Ok(product);
        }
    }
    if a.is_zero() || b.is_zero() {
        return Ok(Expr::zero());
    }
    if let (Some(x), Some(y)) = (a.as_number(), b.as_number()) {
        return Ok(Expr::number(x * y));
    }
    if let Some(x) = a.as_number() {
        let x = x.clone();
        return Ok(b.scaled(&x));
    }
    if let Some(y) = b.as_number() {
        let y = y.clone();
        return Ok(a.scaled(&y));
    }
    let (a_coefficient, a) = a.split_multiplier();
    let (b_coefficient, b) = b.split_multiplier();
    let coefficient = &a_coefficient * &b_coefficient;
    let (a, b) = if b.is_product_container() && !a.is_product_container() {
        (b, a)
    } else {
        (a, b)
    };
    trace!("multiply {} * {}", a, b);
    let product = match a.kind {
        Kind::Product { factors, power } if power.is_one() => {
            let mut factors = factors;
            let mut multiplier = a.multiplier;
            combine_factor(&mut factors, &mut multiplier, b, ctx)?;
            finish_product(multiplier, factors)
        }
        kind => {
            let a = Expr::from_parts(a.multiplier, kind);
            if a.key_for(Group::CB) == b.key_for(Group::CB) {
                same_base_product(a, b, ctx)?
            } else {
                let mut factors = BTreeMap::new();
                let mut multiplier = Rational::one();
                combine_factor(&mut factors, &mut multiplier, a, ctx)?;
                combine_factor(&mut factors, &mut multiplier, b, ctx)?;
                finish_product(multiplier, factors)
            }
        }
    };
    Ok(product.scaled(&coefficient))
}

/// `a*b` for unit factors sharing a base: exponents add
fn same_base_product(a: Expr, b: Expr, ctx: &Context) -> KernelResult<Expr> {
    if let (Some((base, p)), Some((_, q))) = (a.as_radical(), b.as_radical()) {
        return pow_number(&Rational::from_integer(base), &(&p + &q), ctx);
    }
    let base = a.base_part();
    let exponent = add(a.exponent_part(), b.exponent_part(), ctx)?;
    pow(base, exponent, ctx)
}

pub fn divide(a: Expr, b: Expr, ctx: &Context) -> KernelResult<Expr> {
    let _depth = ctx.enter()?;
    if b.is_zero() {
        let sign = if a.as_number().is_some_and(Rational::is_negative) { -1 } else { 1 };
        return ctx.domain_error(DomainError::DivisionByZero, || {
            Expr::infinity().scaled(&Rational::from_integer(sign))
        });
    }
    let inverse = pow(b, Expr::integer(-1), ctx)?;
    multiply(a, inverse, ctx)
}

pub fn pow(a: Expr, b: Expr, ctx: &Context) -> KernelResult<Expr> {
    let _depth = ctx.enter()?;
    if let (true, Some(exponent)) = (a.is_infinite(), b.as_number()) {
        return pow_infinite(&a, exponent, ctx);
    }
    if b.is_zero() {
        if a.is_zero() {
            return ctx.domain_error(DomainError::ZeroToZero, Expr::one);
        }
        return Ok(Expr::one());
    }
    if b.is_one() || a.is_one() {
        return Ok(a);
    }
    trace!("pow {} ^ {}", a, b);
    let Some(exponent) = b.as_number().cloned() else {
        return pow_symbolic(a, b, ctx);
    };
    if let Some(base) = a.as_number() {
        return pow_number(base, &exponent, ctx);
    }
    pow_rational(a, &exponent, ctx)
}

/// base raised to a symbolic exponent that may have become a number
fn raise(base: Expr, exponent: Expr, ctx: &Context) -> KernelResult<Expr> {
    if exponent.is_number() {
        pow(base, exponent, ctx)
    } else {
        Ok(Expr::exponential(base, exponent))
    }
}

fn with_power(kind: Kind) -> Expr {
    match kind.rational_power() {
        Some(power) if power.is_zero() => Expr::one(),
        _ => Expr::from_kind(kind),
    }
}

/// non-number base, rational non-zero exponent
fn pow_rational(a: Expr, exponent: &Rational, ctx: &Context) -> KernelResult<Expr> {
    let (coefficient, unit) = a.split_multiplier();
    let raised = if let Some((base, power)) = unit.as_radical() {
        pow_number(&Rational::from_integer(base), &(&power * exponent), ctx)?
    } else {
        match unit.kind {
            Kind::Variable { name, power } => {
                let power = &power * exponent;
                if name == IMAGINARY && power.is_integer() {
                    imaginary_power(&power)
                } else {
                    with_power(Kind::Variable { name, power })
                }
            }
            Kind::Function { name, args, power } => with_power(Kind::Function {
                name,
                args,
                power: &power * exponent,
            }),
            Kind::Exponential {
                base,
                exponent: own,
            } => {
                let exponent = multiply(*own, Expr::number(exponent.clone()), ctx)?;
                raise(*base, exponent, ctx)?
            }
            Kind::Polynomial {
                variable,
                terms,
                power,
            } => with_power(Kind::Polynomial {
                variable,
                terms,
                power: &power * exponent,
            }),
            Kind::Sum { terms, power } => with_power(Kind::Sum {
                terms,
                power: &power * exponent,
            }),
            Kind::Product { factors, power } => {
                let power = &power * exponent;
                if power.is_integer() {
                    let mut result = Expr::one();
                    for factor in factors.into_values() {
                        let factor = pow_rational(factor, &power, ctx)?;
                        result = multiply(result, factor, ctx)?;
                    }
                    result
                } else {
                    with_power(Kind::Product { factors, power })
                }
            }
            Kind::Radical { base, power } => {
                pow_number(&Rational::from_integer(base), &(&power * exponent), ctx)?
            }
            Kind::Number => Expr::one(),
        }
    };
    if coefficient.is_one() {
        return Ok(raised);
    }
    let scale = pow_number(&coefficient, exponent, ctx)?;
    multiply(scale, raised, ctx)
}

/// exponent that is not a number
fn pow_symbolic(a: Expr, b: Expr, ctx: &Context) -> KernelResult<Expr> {
    if a.is_zero() {
        return Ok(Expr::zero());
    }
    if ctx.is_numeric() {
        if let (Some(x), Some(y)) = (a.to_f64(), b.to_f64()) {
            return approximate(x.powf(y), ctx);
        }
    }
    if a.is_number() {
        return Ok(Expr::exponential(a, b));
    }
    let (coefficient, unit) = a.split_multiplier();
    let exponent = multiply(unit.exponent_part(), b.clone(), ctx)?;
    let raised = raise(unit.base_part(), exponent, ctx)?;
    if coefficient.is_one() {
        return Ok(raised);
    }
    multiply(Expr::exponential(Expr::number(coefficient), b), raised, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::symbolic_engine::Power;
    use crate::symbolic::symbolic_errors::KernelError;

    fn x() -> Expr {
        Expr::variable("x")
    }

    fn y() -> Expr {
        Expr::variable("y")
    }

    fn n(value: i64) -> Expr {
        Expr::integer(value)
    }

    fn q(num: i64, den: i64) -> Expr {
        Expr::number(Rational::from_ratio(num, den).unwrap())
    }

    #[test]
    fn test_add_like_terms() {
        let ctx = Context::new();
        let two_x = multiply(n(2), x(), &ctx).unwrap();
        let three_x = multiply(n(3), x(), &ctx).unwrap();
        let sum = add(two_x, three_x, &ctx).unwrap();
        assert_eq!(sum.group(), Group::S);
        assert_eq!(sum.multiplier(), &Rational::from_integer(5));
        assert_eq!(add(x(), x().negated(), &ctx).unwrap(), Expr::zero());
    }

    #[test]
    fn test_add_builds_polynomial_and_sum() {
        let ctx = Context::new();
        let x2 = pow(x(), n(2), &ctx).unwrap();
        let poly = add(x2.clone(), x(), &ctx).unwrap();
        assert_eq!(poly.group(), Group::PL);
        assert_eq!(poly.to_string(), "x^2+x");
        let sum = add(poly.clone(), n(1), &ctx).unwrap();
        assert_eq!(sum.group(), Group::CP);
        assert_eq!(sum.to_string(), "x^2+x+1");
        let back = subtract(sum, x2, &ctx).unwrap();
        assert_eq!(back.to_string(), "x+1");
        let mixed = add(poly, y(), &ctx).unwrap();
        assert_eq!(mixed.to_string(), "x^2+x+y");
    }

    #[test]
    fn test_sum_collapses_to_single_term() {
        let ctx = Context::new();
        let sum = add(x(), n(1), &ctx).unwrap();
        let back = subtract(sum, x(), &ctx).unwrap();
        assert_eq!(back, n(1));
    }

    #[test]
    fn test_multiply_collects_powers() {
        let ctx = Context::new();
        let x2 = multiply(x(), x(), &ctx).unwrap();
        assert_eq!(x2, pow(x(), n(2), &ctx).unwrap());
        let x3 = multiply(x2, x(), &ctx).unwrap();
        assert_eq!(x3.power(), Power::Rational(Rational::from_integer(3)));
        let xy = multiply(x(), y(), &ctx).unwrap();
        assert_eq!(xy.group(), Group::CB);
        let back = divide(xy, x(), &ctx).unwrap();
        assert_eq!(back, y());
    }

    #[test]
    fn test_multiply_distributes_numbers() {
        let ctx = Context::new();
        let sum = add(x(), y(), &ctx).unwrap();
        let doubled = multiply(n(2), sum, &ctx).unwrap();
        assert_eq!(doubled.to_string(), "2*x+2*y");
        let product = multiply(doubled, x(), &ctx).unwrap();
        assert_eq!(product.to_string(), "2*x*(x+y)");
    }

    #[test]
    fn test_sum_content_is_canonical() {
        let ctx = Context::new();
        let sum = add(x(), n(1), &ctx).unwrap();
        let doubled = multiply(n(2), sum.clone(), &ctx).unwrap();
        let left = multiply(doubled, y(), &ctx).unwrap();
        let right = multiply(multiply(sum, y(), &ctx).unwrap(), n(2), &ctx).unwrap();
        assert_eq!(left, right);
    }

    #[test]
    fn test_pow_of_sum_is_not_expanded() {
        let ctx = Context::new();
        let sum = add(x(), n(1), &ctx).unwrap();
        let square = pow(sum.clone(), n(2), &ctx).unwrap();
        assert_eq!(square.group(), Group::CP);
        assert_eq!(square.to_string(), "(x+1)^2");
        let product = multiply(sum.clone(), sum, &ctx).unwrap();
        assert_eq!(product, square);
    }

    #[test]
    fn test_pow_of_product() {
        let ctx = Context::new();
        let xy = multiply(x(), y(), &ctx).unwrap();
        let square = pow(xy.clone(), n(2), &ctx).unwrap();
        assert_eq!(square.to_string(), "x^2*y^2");
        let root = pow(xy, q(1, 2), &ctx).unwrap();
        assert_eq!(root.group(), Group::CB);
        assert_eq!(root.to_string(), "(x*y)^(1/2)");
        let back = pow(root, n(2), &ctx).unwrap();
        assert_eq!(back.to_string(), "x*y");
    }

    #[test]
    fn test_pow_symbolic_exponent() {
        let ctx = Context::new();
        let ex = pow(x(), y(), &ctx).unwrap();
        assert_eq!(ex.group(), Group::EX);
        assert_eq!(ex.to_string(), "x^y");
        let times_x = multiply(ex.clone(), x(), &ctx).unwrap();
        assert_eq!(times_x.to_string(), "x^(y+1)");
        let inverse = pow(x(), y().negated(), &ctx).unwrap();
        assert_eq!(multiply(ex, inverse, &ctx).unwrap(), n(1));
        let scaled = pow(multiply(n(3), x(), &ctx).unwrap(), y(), &ctx).unwrap();
        assert_eq!(scaled.to_string(), "x^y*3^y");
    }

    #[test]
    fn test_radicals_merge() {
        let ctx = Context::new();
        let root = pow(n(2), q(1, 2), &ctx).unwrap();
        let cube = pow(n(2), q(1, 3), &ctx).unwrap();
        assert_eq!(multiply(root.clone(), root.clone(), &ctx).unwrap(), n(2));
        assert_eq!(multiply(root, cube, &ctx).unwrap().to_string(), "2^(5/6)");
        let twelve = pow(n(12), q(1, 2), &ctx).unwrap();
        assert_eq!(twelve.to_string(), "2*sqrt(3)");
    }

    #[test]
    fn test_square_roots_of_different_integers_merge() {
        let ctx = Context::new();
        let root = |k: i64| pow(n(k), q(1, 2), &ctx).unwrap();
        assert_eq!(multiply(root(2), root(3), &ctx).unwrap(), root(6));
        assert_eq!(multiply(root(2), root(6), &ctx).unwrap().to_string(), "2*sqrt(3)");
        assert_eq!(multiply(root(3), root(12), &ctx).unwrap(), n(6));
        let with_x = multiply(root(2), x(), &ctx).unwrap();
        let merged = multiply(with_x, root(5), &ctx).unwrap();
        assert_eq!(merged.to_string(), "sqrt(10)*x");
        assert_eq!(divide(root(6), root(2), &ctx).unwrap(), root(3));
    }

    #[test]
    fn test_infinity_absorbs_finite_values() {
        let ctx = Context::new();
        let infinity = Expr::infinity();
        assert_eq!(add(infinity.clone(), n(1), &ctx).unwrap(), infinity);
        assert_eq!(add(x(), infinity.clone().negated(), &ctx).unwrap().to_string(), "-Infinity");
        assert_eq!(add(infinity.clone(), infinity.clone(), &ctx).unwrap(), infinity);
        assert_eq!(multiply(n(-2), infinity.clone(), &ctx).unwrap().to_string(), "-Infinity");
        let pi = Expr::variable("pi");
        assert_eq!(multiply(infinity.clone().negated(), pi.negated(), &ctx).unwrap(), infinity);
        assert_eq!(divide(n(5), infinity.clone(), &ctx).unwrap(), n(0));
        assert_eq!(pow(infinity.clone().negated(), n(3), &ctx).unwrap().to_string(), "-Infinity");
        assert_eq!(pow(infinity.clone().negated(), n(2), &ctx).unwrap(), infinity);
        let symbolic = multiply(infinity, x(), &ctx).unwrap();
        assert_eq!(symbolic.group(), Group::CB);
    }

    #[test]
    fn test_infinity_undefined_forms() {
        let ctx = Context::new();
        let infinity = Expr::infinity();
        let undefined = |result: KernelResult<Expr>| {
            matches!(result, Err(KernelError::Domain(DomainError::Undefined(_))))
        };
        assert!(undefined(add(infinity.clone(), infinity.clone().negated(), &ctx)));
        assert!(undefined(multiply(n(0), infinity.clone(), &ctx)));
        assert!(undefined(pow(infinity.clone(), n(0), &ctx)));
        assert!(undefined(divide(infinity.clone(), infinity.clone(), &ctx)));
        let _suppress = ctx.suppress_scope(true);
        assert_eq!(subtract(infinity.clone(), infinity.clone(), &ctx).unwrap(), infinity);
        assert_eq!(multiply(infinity.clone(), n(0), &ctx).unwrap(), infinity);
        assert_eq!(pow(infinity, n(0), &ctx).unwrap(), n(1));
    }

    #[test]
    fn test_imaginary_unit() {
        let ctx = Context::new();
        let i = Expr::imaginary();
        assert_eq!(multiply(i.clone(), i.clone(), &ctx).unwrap(), n(-1));
        assert_eq!(pow(i, n(3), &ctx).unwrap().to_string(), "-i");
        assert_eq!(pow(n(-9), q(1, 2), &ctx).unwrap().to_string(), "3*i");
    }

    #[test]
    fn test_division_by_zero() {
        let ctx = Context::new();
        assert_eq!(
            divide(n(1), n(0), &ctx),
            Err(KernelError::Domain(DomainError::DivisionByZero))
        );
        assert_eq!(
            pow(n(0), n(0), &ctx),
            Err(KernelError::Domain(DomainError::ZeroToZero))
        );
        let _suppress = ctx.suppress_scope(true);
        assert_eq!(divide(n(-1), n(0), &ctx).unwrap().to_string(), "-Infinity");
        assert_eq!(pow(n(0), n(0), &ctx).unwrap(), n(1));
        assert_eq!(pow(n(0), n(-1), &ctx).unwrap(), Expr::infinity());
    }

    #[test]
    fn test_identities() {
        let ctx = Context::new();
        let sum = add(x(), y(), &ctx).unwrap();
        assert_eq!(add(sum.clone(), n(0), &ctx).unwrap(), sum);
        assert_eq!(multiply(sum.clone(), n(1), &ctx).unwrap(), sum);
        assert_eq!(multiply(sum.clone(), n(0), &ctx).unwrap(), n(0));
        assert_eq!(pow(sum.clone(), n(1), &ctx).unwrap(), sum);
        assert_eq!(pow(sum, n(0), &ctx).unwrap(), n(1));
    }

    #[test]
    fn test_recursion_limit() {
        let mut settings = crate::symbolic::symbolic_context::KernelSettings::default();
        settings.set_max_depth(1);
        let ctx = Context::with_settings(settings);
        // x*x adds the exponents one level down
        assert_eq!(
            multiply(x(), x(), &ctx),
            Err(KernelError::RecursionLimit(1))
        );
    }
}
