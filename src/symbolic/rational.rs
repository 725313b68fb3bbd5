//! # Rational numbers
//!
//! Arbitrary precision fractions used as the numeric field of every
//! expression. A [`Rational`] is always kept reduced: numerator and
//! denominator are coprime, the denominator is positive and the sign lives on
//! the numerator. Big integer arithmetic comes from the `num` crate.
//!
//! ## Main constructors
//! - [`Rational::new`] / [`Rational::from_ratio`]: from numerator and denominator
//! - [`Rational::from_integer`]: from any integer type
//! - [`Rational::from_f64`]: best rational approximation of a float (continued fractions)
//! - `str::parse`: exact decimal and scientific literals, `"0.1"` is exactly 1/10
//!
//! # Example
//! ```
//! use RustedCAS::symbolic::rational::Rational;
//! let a: Rational = "0.25".parse().unwrap();
//! let b = Rational::from_ratio(1, 12).unwrap();
//! assert_eq!((a + b).to_string(), "1/3");
//! ```
use crate::symbolic::symbolic_errors::{DomainError, ParseError};
use num::bigint::BigInt;
use num::rational::Ratio;
use num::traits::{Float, Pow};
use num::Integer;
use num_traits::{FromPrimitive, One, Signed, ToPrimitive, Zero};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

/// relative accuracy of the continued fraction approximation
const CF_EPSILON: f64 = 1e-14;
const CF_MAX_ITERATIONS: usize = 30;
/// outside [CF_MIN_MAGNITUDE, CF_MAX_MAGNITUDE] floats are decomposed exactly
const CF_MIN_MAGNITUDE: f64 = 1e-10;
const CF_MAX_MAGNITUDE: f64 = 1e15;
/// largest exponent accepted by exact integer powers and scientific literals
pub const MAX_EXACT_EXPONENT: u32 = 100_000;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Rational {
    num: BigInt,
    den: BigInt,
}

impl Rational {
    pub fn new(num: BigInt, den: BigInt) -> Result<Self, DomainError> {
        if den.is_zero() {
            return Err(DomainError::DivisionByZero);
        }
        Ok(Self::reduced(num, den))
    }

    pub fn from_ratio(num: i64, den: i64) -> Result<Self, DomainError> {
        Self::new(BigInt::from(num), BigInt::from(den))
    }

    pub fn from_integer<T: Into<BigInt>>(value: T) -> Self {
        Rational {
            num: value.into(),
            den: BigInt::one(),
        }
    }

    // den must be non-zero
    fn reduced(num: BigInt, den: BigInt) -> Self {
        let divisor = num.gcd(&den);
        let (mut num, mut den) = if divisor.is_one() || divisor.is_zero() {
            (num, den)
        } else {
            (num / &divisor, den / &divisor)
        };
        if den.is_negative() {
            num = -num;
            den = -den;
        }
        Rational { num, den }
    }

    pub fn zero() -> Self {
        Self::from_integer(0)
    }

    pub fn one() -> Self {
        Self::from_integer(1)
    }

    pub fn minus_one() -> Self {
        Self::from_integer(-1)
    }

    pub fn numer(&self) -> &BigInt {
        &self.num
    }

    pub fn denom(&self) -> &BigInt {
        &self.den
    }

    pub fn is_zero(&self) -> bool {
        self.num.is_zero()
    }

    pub fn is_one(&self) -> bool {
        self.num.is_one() && self.den.is_one()
    }

    pub fn is_minus_one(&self) -> bool {
        self.den.is_one() && self.num == BigInt::from(-1)
    }

    pub fn is_negative(&self) -> bool {
        self.num.is_negative()
    }

    pub fn is_positive(&self) -> bool {
        self.num.is_positive()
    }

    pub fn is_integer(&self) -> bool {
        self.den.is_one()
    }

    /// -1, 0 or 1
    pub fn signum(&self) -> i32 {
        if self.num.is_negative() {
            -1
        } else if self.num.is_zero() {
            0
        } else {
            1
        }
    }

    pub fn abs(&self) -> Self {
        Rational {
            num: self.num.abs(),
            den: self.den.clone(),
        }
    }

    pub fn invert(&self) -> Result<Self, DomainError> {
        Self::new(self.den.clone(), self.num.clone())
    }

    pub fn checked_div(&self, other: &Rational) -> Result<Self, DomainError> {
        if other.is_zero() {
            return Err(DomainError::DivisionByZero);
        }
        Ok(Self::reduced(
            &self.num * &other.den,
            &self.den * &other.num,
        ))
    }

    /// floored modulo: the result has the sign of the divisor
    pub fn modulo(&self, other: &Rational) -> Result<Self, DomainError> {
        let quotient = self.checked_div(other)?.floor();
        Ok(self - &(other * &Rational::from_integer(quotient)))
    }

    pub fn floor(&self) -> BigInt {
        self.num.div_floor(&self.den)
    }

    pub fn ceil(&self) -> BigInt {
        -((-&self.num).div_floor(&self.den))
    }

    /// nearest integer, halves away from zero
    pub fn round(&self) -> BigInt {
        let half = Rational {
            num: BigInt::one(),
            den: BigInt::from(2),
        };
        if self.is_negative() {
            -(&self.abs() + &half).floor()
        } else {
            (self + &half).floor()
        }
    }

    /// `self - floor(self)`, always in [0, 1)
    pub fn fract(&self) -> Self {
        self - &Rational::from_integer(self.floor())
    }

    /// exact integer power, numerator and denominator are raised separately
    pub fn pow_integer(&self, exponent: &BigInt) -> Result<Self, DomainError> {
        let magnitude = exponent
            .abs()
            .to_u32()
            .filter(|e| *e <= MAX_EXACT_EXPONENT)
            .ok_or_else(|| DomainError::Overflow(exponent.to_string()))?;
        let raised = Rational {
            num: Pow::pow(&self.num, magnitude),
            den: Pow::pow(&self.den, magnitude),
        };
        if exponent.is_negative() {
            raised.invert()
        } else {
            Ok(raised)
        }
    }

    /// lossy conversion
    pub fn to_f64(&self) -> f64 {
        Ratio::new_raw(self.num.clone(), self.den.clone())
            .to_f64()
            .unwrap_or(f64::NAN)
    }

    /// Best rational approximation of a finite float.
    pub fn from_f64(value: f64) -> Result<Self, DomainError> {
        if !value.is_finite() {
            return Err(DomainError::NonFinite(value));
        }
        if value == 0.0 {
            return Ok(Rational::zero());
        }
        let magnitude = value.abs();
        if value.fract() == 0.0 && magnitude < CF_MAX_MAGNITUDE {
            return Ok(Rational::from_integer(
                BigInt::from_f64(value).unwrap_or_default(),
            ));
        }
        if !(CF_MIN_MAGNITUDE..=CF_MAX_MAGNITUDE).contains(&magnitude) {
            return Ok(Self::from_f64_exact(value));
        }
        // convergents h/k of the continued fraction of |value|
        let (mut h_prev, mut h) = (BigInt::zero(), BigInt::one());
        let (mut k_prev, mut k) = (BigInt::one(), BigInt::zero());
        let mut rest = magnitude;
        for _ in 0..CF_MAX_ITERATIONS {
            let whole = rest.floor();
            let a = BigInt::from_f64(whole).unwrap_or_default();
            let h_next = &a * &h + &h_prev;
            let k_next = &a * &k + &k_prev;
            h_prev = std::mem::replace(&mut h, h_next);
            k_prev = std::mem::replace(&mut k, k_next);
            let approx = Ratio::new_raw(h.clone(), k.clone())
                .to_f64()
                .unwrap_or(f64::NAN);
            if (approx - magnitude).abs() <= CF_EPSILON * magnitude {
                break;
            }
            let fraction = rest - whole;
            if fraction <= f64::EPSILON {
                break;
            }
            rest = 1.0 / fraction;
        }
        if value.is_sign_negative() {
            h = -h;
        }
        Self::new(h, k)
    }

    fn from_f64_exact(value: f64) -> Self {
        let (mantissa, exponent, sign) = Float::integer_decode(value);
        let mantissa = BigInt::from(mantissa) * BigInt::from(sign);
        let scale: BigInt = Pow::pow(BigInt::from(2), exponent.unsigned_abs() as u32);
        if exponent >= 0 {
            Rational::from_integer(mantissa * scale)
        } else {
            Self::reduced(mantissa, scale)
        }
    }
}

impl FromStr for Rational {
    type Err = ParseError;

    /// Exact parse of `123`, `-4.5`, `.5`, `2.`, `1e-3`, `2.5E+4`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::InvalidNumber(s.to_string());
        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };
        let (mantissa, exponent) = match body.find(['e', 'E']) {
            Some(pos) => {
                let exponent: i64 = body[pos + 1..].parse().map_err(|_| invalid())?;
                (&body[..pos], exponent)
            }
            None => (body, 0),
        };
        let (int_part, frac_part) = match mantissa.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (mantissa, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part
            .chars()
            .chain(frac_part.chars())
            .all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }
        let digits = format!("{}{}", int_part, frac_part);
        let mut num = BigInt::from_str(&digits).map_err(|_| invalid())?;
        if negative {
            num = -num;
        }
        let scale = exponent - frac_part.len() as i64;
        let power = u32::try_from(scale.unsigned_abs())
            .ok()
            .filter(|p| *p <= MAX_EXACT_EXPONENT)
            .ok_or_else(invalid)?;
        let factor: BigInt = Pow::pow(BigInt::from(10), power);
        if scale >= 0 {
            Ok(Rational::from_integer(num * factor))
        } else {
            Ok(Rational::reduced(num, factor))
        }
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den.is_one() {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.num * &other.den).cmp(&(&other.num * &self.den))
    }
}

impl From<i64> for Rational {
    fn from(value: i64) -> Self {
        Rational::from_integer(value)
    }
}

impl From<BigInt> for Rational {
    fn from(value: BigInt) -> Self {
        Rational::from_integer(value)
    }
}

impl<'a> Add<&'a Rational> for &'a Rational {
    type Output = Rational;
    fn add(self, other: &Rational) -> Rational {
        Rational::reduced(
            &self.num * &other.den + &other.num * &self.den,
            &self.den * &other.den,
        )
    }
}

impl<'a> Sub<&'a Rational> for &'a Rational {
    type Output = Rational;
    fn sub(self, other: &Rational) -> Rational {
        Rational::reduced(
            &self.num * &other.den - &other.num * &self.den,
            &self.den * &other.den,
        )
    }
}

impl<'a> Mul<&'a Rational> for &'a Rational {
    type Output = Rational;
    fn mul(self, other: &Rational) -> Rational {
        Rational::reduced(&self.num * &other.num, &self.den * &other.den)
    }
}

impl Neg for &Rational {
    type Output = Rational;
    fn neg(self) -> Rational {
        Rational {
            num: -&self.num,
            den: self.den.clone(),
        }
    }
}

impl Neg for Rational {
    type Output = Rational;
    fn neg(self) -> Rational {
        Rational {
            num: -self.num,
            den: self.den,
        }
    }
}

macro_rules! forward_owned_binop {
    ($($trait:ident :: $method:ident),*) => {
        $(
            impl $trait<Rational> for Rational {
                type Output = Rational;
                fn $method(self, other: Rational) -> Rational {
                    (&self).$method(&other)
                }
            }
        )*
    };
}

forward_owned_binop!(Add::add, Sub::sub, Mul::mul);
