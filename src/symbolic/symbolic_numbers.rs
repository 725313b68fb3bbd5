//! Powers of rational numbers and the integer helpers behind them.
//!
//! `pow_number` is the single place where a number is raised to a rational
//! exponent. Integer exponents are exact. Fractional exponents produce radicals
//! in the canonical shape: perfect powers are taken on the smallest base,
//! q-th powers are pulled out of the radicand, and what is left is either the
//! `sqrt(n)` leaf or a `P` leaf `n^(p/q)`. Negative bases contribute a power of
//! -1, which is `i` for one half. In numeric mode everything collapses to an
//! `f64` approximation turned back into a rational.
use crate::symbolic::rational::Rational;
use crate::symbolic::symbolic_arithmetic::{add, multiply};
use crate::symbolic::symbolic_context::Context;
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_errors::{DomainError, KernelResult};
use num::BigInt;
use num::Integer;
use num::traits::Pow;
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::f64::consts::PI;

/// primes up to this bound are tried when pulling powers out of a radicand
const TRIAL_DIVISION_LIMIT: u32 = 1000;
/// largest argument of the exact factorial
pub const MAX_EXACT_FACTORIAL: u32 = 5000;
/// parts of a complex approximation smaller than this (relative) are dropped
const CHOP_EPSILON: f64 = 1e-12;

const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEFFICIENTS: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_039_169_991_85,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

/// N approximation of a float, non-finite values are domain errors
pub(crate) fn approximate(value: f64, ctx: &Context) -> KernelResult<Expr> {
    match Rational::from_f64(value) {
        Ok(rational) => Ok(Expr::number(rational)),
        Err(err) => {
            let sign = if value.is_sign_negative() { -1 } else { 1 };
            ctx.domain_error(err, || Expr::infinity().scaled(&Rational::from_integer(sign)))
        }
    }
}

/// `base^exponent` for a rational base.
pub(crate) fn pow_number(base: &Rational, exponent: &Rational, ctx: &Context) -> KernelResult<Expr> {
    if base.is_zero() {
        if exponent.is_zero() {
            return ctx.domain_error(DomainError::ZeroToZero, Expr::one);
        }
        if exponent.is_negative() {
            return ctx.domain_error(DomainError::DivisionByZero, Expr::infinity);
        }
        return Ok(Expr::zero());
    }
    if exponent.is_integer() {
        return match base.pow_integer(exponent.numer()) {
            Ok(value) => Ok(Expr::number(value)),
            Err(err) => ctx.domain_error(err, Expr::infinity),
        };
    }
    if base.is_one() {
        return Ok(Expr::one());
    }
    if ctx.is_numeric() {
        return approximate_power(base, exponent, ctx);
    }
    let numerator = root_of_integer(&base.numer().abs(), exponent)?;
    let denominator = root_of_integer(base.denom(), &-exponent)?;
    let magnitude = multiply(numerator, denominator, ctx)?;
    if base.is_negative() {
        multiply(negative_unit_power(exponent), magnitude, ctx)
    } else {
        Ok(magnitude)
    }
}

/// principal value, negative bases give `r*(cos(pi*p) + i*sin(pi*p))`
fn approximate_power(base: &Rational, exponent: &Rational, ctx: &Context) -> KernelResult<Expr> {
    let magnitude = base.abs().to_f64().powf(exponent.to_f64());
    if !base.is_negative() {
        return approximate(magnitude, ctx);
    }
    let angle = PI * exponent.to_f64();
    let chop = |value: f64| if value.abs() < CHOP_EPSILON * magnitude { 0.0 } else { value };
    let real = approximate(chop(magnitude * angle.cos()), ctx)?;
    let imaginary = approximate(chop(magnitude * angle.sin()), ctx)?;
    add(real, multiply(imaginary, Expr::imaginary(), ctx)?, ctx)
}

/// `(-1)^exponent` for a non-integer exponent
fn negative_unit_power(exponent: &Rational) -> Expr {
    let whole = exponent.floor();
    let fraction = exponent.fract();
    let sign = if whole.is_even() { 1 } else { -1 };
    let unit = if fraction.numer().is_one() && fraction.denom() == &BigInt::from(2) {
        Expr::imaginary()
    } else {
        Expr::radical(BigInt::from(-1), fraction)
    };
    unit.scaled(&Rational::from_integer(sign))
}

/// `i^k` for an integer `k`
pub(crate) fn imaginary_power(exponent: &Rational) -> Expr {
    let residue = exponent.numer().mod_floor(&BigInt::from(4));
    match residue.to_u32() {
        Some(0) => Expr::one(),
        Some(1) => Expr::imaginary(),
        Some(2) => Expr::integer(-1),
        _ => Expr::imaginary().negated(),
    }
}

/// `n^exponent` for an integer `n >= 1` and any rational exponent.
pub(crate) fn root_of_integer(n: &BigInt, exponent: &Rational) -> Result<Expr, DomainError> {
    let mut coefficient = Rational::one();
    let mut base = n.clone();
    let mut power = exponent.clone();
    loop {
        let whole = power.floor();
        if !whole.is_zero() {
            let factor = Rational::from_integer(base.clone()).pow_integer(&whole)?;
            coefficient = &coefficient * &factor;
            power = &power - &Rational::from_integer(whole);
        }
        if power.is_zero() || base.is_one() {
            return Ok(Expr::number(coefficient));
        }
        if let Some((root, degree)) = perfect_power(&base) {
            base = root;
            power = &power * &Rational::from_integer(degree);
            continue;
        }
        let Some(q) = power.denom().to_u32() else {
            break;
        };
        let (outside, inside) = extract_powers(&base, q);
        if outside.is_one() {
            break;
        }
        let factor = Rational::from_integer(outside).pow_integer(power.numer())?;
        coefficient = &coefficient * &factor;
        base = inside;
    }
    let half = power.numer().is_one() && power.denom() == &BigInt::from(2);
    let leaf = if half {
        Expr::sqrt_of(base)
    } else {
        Expr::radical(base, power)
    };
    Ok(leaf.scaled(&coefficient))
}

/// Largest `degree` with `n == root^degree`, `root > 1`.
pub(crate) fn perfect_power(n: &BigInt) -> Option<(BigInt, u32)> {
    if n < &BigInt::from(4) {
        return None;
    }
    let bits = u32::try_from(n.bits()).ok()?;
    (2..=bits).rev().find_map(|degree| {
        let root = n.nth_root(degree);
        (root > BigInt::one() && Pow::pow(&root, degree) == *n).then_some((root, degree))
    })
}

/// Splits `n = outside^q * inside` pulling out the q-th powers of small primes
/// and of a perfect q-th power cofactor.
pub(crate) fn extract_powers(n: &BigInt, q: u32) -> (BigInt, BigInt) {
    if q < 2 || u64::from(q) > n.bits() {
        return (BigInt::one(), n.clone());
    }
    let mut outside = BigInt::one();
    let mut inside = BigInt::one();
    let mut rest = n.clone();
    for p in 2..=TRIAL_DIVISION_LIMIT {
        let prime = BigInt::from(p);
        if Pow::pow(&prime, q) > rest {
            break;
        }
        let mut count = 0u32;
        while (&rest % &prime).is_zero() {
            rest /= &prime;
            count += 1;
        }
        if count > 0 {
            outside *= Pow::pow(&prime, count / q);
            inside *= Pow::pow(&prime, count % q);
        }
    }
    let root = rest.nth_root(q);
    if root > BigInt::one() && Pow::pow(&root, q) == rest {
        outside *= root;
    } else {
        inside *= rest;
    }
    (outside, inside)
}

/// exact `n!`, `None` above [`MAX_EXACT_FACTORIAL`]
pub(crate) fn factorial(n: &BigInt) -> Option<BigInt> {
    let n = n.to_u32().filter(|n| *n <= MAX_EXACT_FACTORIAL)?;
    Some((2..=n).fold(BigInt::one(), |acc, k| acc * BigInt::from(k)))
}

/// Lanczos approximation of the gamma function
pub(crate) fn gamma(x: f64) -> f64 {
    if x < 0.5 {
        return PI / ((PI * x).sin() * gamma(1.0 - x));
    }
    let x = x - 1.0;
    let t = x + LANCZOS_G + 0.5;
    let series = LANCZOS_COEFFICIENTS
        .iter()
        .enumerate()
        .skip(1)
        .fold(LANCZOS_COEFFICIENTS[0], |acc, (k, c)| acc + c / (x + k as f64));
    (2.0 * PI).sqrt() * t.powf(x + 0.5) * (-t).exp() * series
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::symbolic_engine::Group;
    use approx::assert_relative_eq;

    fn r(n: i64, d: i64) -> Rational {
        Rational::from_ratio(n, d).unwrap()
    }

    fn big(n: i64) -> BigInt {
        BigInt::from(n)
    }

    #[test]
    fn test_perfect_power() {
        assert_eq!(perfect_power(&big(64)), Some((big(2), 6)));
        assert_eq!(perfect_power(&big(27)), Some((big(3), 3)));
        assert_eq!(perfect_power(&big(12)), None);
        assert_eq!(perfect_power(&big(1)), None);
    }

    #[test]
    fn test_extract_powers() {
        assert_eq!(extract_powers(&big(12), 2), (big(2), big(3)));
        assert_eq!(extract_powers(&big(72), 2), (big(6), big(2)));
        assert_eq!(extract_powers(&big(54), 3), (big(3), big(2)));
        assert_eq!(extract_powers(&big(7), 2), (big(1), big(7)));
        // cofactor above the trial division bound
        let p = big(1_000_003);
        assert_eq!(extract_powers(&(&p * &p * big(5)), 2), (p, big(5)));
    }

    #[test]
    fn test_root_of_integer() {
        assert_eq!(root_of_integer(&big(4), &r(1, 2)).unwrap(), Expr::integer(2));
        let root8 = root_of_integer(&big(8), &r(1, 2)).unwrap();
        assert_eq!(root8.to_string(), "2*sqrt(2)");
        let cube = root_of_integer(&big(4), &r(1, 3)).unwrap();
        assert_eq!(cube.to_string(), "2^(2/3)");
        let inverse = root_of_integer(&big(2), &r(-1, 2)).unwrap();
        assert_eq!(inverse.to_string(), "1/2*sqrt(2)");
        let five_halves = root_of_integer(&big(3), &r(5, 2)).unwrap();
        assert_eq!(five_halves.to_string(), "9*sqrt(3)");
    }

    #[test]
    fn test_pow_number_symbolic() {
        let ctx = Context::new();
        let half = r(1, 2);
        let root = pow_number(&r(2, 1), &half, &ctx).unwrap();
        assert_eq!(root.group(), Group::FN);
        assert_eq!(root.value(), "sqrt");
        assert_eq!(pow_number(&r(-4, 1), &half, &ctx).unwrap().to_string(), "2*i");
        assert_eq!(pow_number(&r(-1, 1), &r(3, 2), &ctx).unwrap().to_string(), "-i");
        assert_eq!(pow_number(&r(2, 3), &r(2, 1), &ctx).unwrap(), Expr::number(r(4, 9)));
        let fraction = pow_number(&r(1, 4), &half, &ctx).unwrap();
        assert_eq!(fraction, Expr::number(half.clone()));
        let two_thirds = pow_number(&r(2, 3), &half, &ctx).unwrap();
        assert_eq!(two_thirds.to_string(), "1/3*sqrt(6)");
        assert_eq!(two_thirds, ctx.parse("sqrt(6)/3").unwrap());
    }

    #[test]
    fn test_pow_number_zero_base() {
        let ctx = Context::new();
        assert!(pow_number(&Rational::zero(), &Rational::zero(), &ctx).is_err());
        assert!(pow_number(&Rational::zero(), &r(-1, 1), &ctx).is_err());
        assert_eq!(pow_number(&Rational::zero(), &r(1, 2), &ctx).unwrap(), Expr::zero());
        let _suppress = ctx.suppress_scope(true);
        assert_eq!(
            pow_number(&Rational::zero(), &Rational::zero(), &ctx).unwrap(),
            Expr::one()
        );
        assert_eq!(
            pow_number(&Rational::zero(), &r(-2, 1), &ctx).unwrap(),
            Expr::infinity()
        );
    }

    #[test]
    fn test_pow_number_numeric() {
        let ctx = Context::new();
        let _numeric = ctx.numeric_scope(true);
        let root = pow_number(&r(2, 1), &r(1, 2), &ctx).unwrap();
        assert_eq!(root.group(), Group::N);
        assert_relative_eq!(root.to_f64().unwrap(), 2f64.sqrt(), epsilon = 1e-14);
        let imaginary = pow_number(&r(-4, 1), &r(1, 2), &ctx).unwrap();
        assert_eq!(imaginary.to_string(), "2*i");
    }

    #[test]
    fn test_imaginary_power() {
        assert_eq!(imaginary_power(&r(4, 1)), Expr::one());
        assert_eq!(imaginary_power(&r(5, 1)), Expr::imaginary());
        assert_eq!(imaginary_power(&r(2, 1)), Expr::integer(-1));
        assert_eq!(imaginary_power(&r(-1, 1)), Expr::imaginary().negated());
    }

    #[test]
    fn test_factorial_and_gamma() {
        assert_eq!(factorial(&big(0)), Some(big(1)));
        assert_eq!(factorial(&big(10)), Some(big(3_628_800)));
        assert_eq!(factorial(&big(6000)), None);
        assert_relative_eq!(gamma(5.0), 24.0, max_relative = 1e-12);
        assert_relative_eq!(gamma(0.5), PI.sqrt(), max_relative = 1e-12);
    }
}
