//! # Canonical symbolic expressions
//!
//! ## Purpose
//! An [`Expr`] is the canonical in-memory form of a mathematical expression.
//! Two expressions that are structurally equal always have identical
//! representations, so equality is plain `==` on the tree.
//!
//! ## Main structures
//! - [`Expr`]: a rational `multiplier` times a [`Kind`]
//! - [`Kind`]: one variant per [`Group`]:
//!   - `N`  numbers (the value is the multiplier)
//!   - `P`  rational powers of integers that do not reduce, `2^(1/3)`
//!   - `S`  symbols with a rational power, `x^2`
//!   - `EX` anything raised to a symbolic exponent, `2^x`, `(x+1)^y`
//!   - `FN` function calls with a rational power, `sin(x)^2`, `sqrt(2)`
//!   - `PL` sums of powers of one symbol, `x^2+x`
//!   - `CB` products, `2*x*y`
//!   - `CP` all other sums, `x+y+1`
//! - [`Key`]: typed structural key of a child inside a container. Like
//!   terms collide on equal keys, which is how addition and multiplication
//!   merge without walking the tree.
//!
//! ## Invariants
//! - a sum (`PL`/`CP`) with power 1 has multiplier 1 and at least two terms;
//!   numeric factors are distributed over it;
//! - a product (`CB`) holds at least two factors, all with multiplier 1;
//! - an `EX` exponent is never a number, its base has power 1;
//! - a `P` power lies in (0,1). The square root of a non-square integer is
//!   the `FN` leaf `sqrt(n)`.
//!
//! The text form ([`fmt::Display`]) parses back to the same expression.
use crate::symbolic::rational::Rational;
use crate::symbolic::symbolic_arithmetic as arithmetic;
use crate::symbolic::symbolic_context::{Context, RESERVED_CONSTANTS};
use crate::symbolic::symbolic_errors::KernelResult;
use crate::symbolic::symbolic_functions::evaluate_function;
use crate::symbolic::symbolic_numbers::root_of_integer;
use itertools::Itertools;
use num::BigInt;
use num::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::collections::BTreeMap;
use std::fmt;
use strum_macros::{Display, EnumIter};

pub const IMAGINARY: &str = "i";
pub const INFINITY: &str = "Infinity";
pub const SQRT: &str = "sqrt";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
pub enum Group {
    N,
    P,
    S,
    EX,
    FN,
    PL,
    CB,
    CP,
}

/// Slot of a child inside a container.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    Number,
    /// power of the shared symbol of a `PL`
    Degree(Rational),
    /// integer under a radical, `2^(1/3)` and `sqrt(2)` share `Radical(2)`
    Radical(BigInt),
    /// a symbol or a `PL` in that symbol, inside a `CP`
    Variable(String),
    /// factor base inside a `CB`, multiplier and power stripped
    Base(Box<Expr>),
    /// term inside a `CP`, multiplier stripped
    Term(Box<Expr>),
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kind {
    Number,
    Radical {
        base: BigInt,
        power: Rational,
    },
    Variable {
        name: String,
        power: Rational,
    },
    Exponential {
        base: Box<Expr>,
        exponent: Box<Expr>,
    },
    Function {
        name: String,
        args: Vec<Expr>,
        power: Rational,
    },
    Polynomial {
        variable: String,
        terms: BTreeMap<Key, Expr>,
        power: Rational,
    },
    Product {
        factors: BTreeMap<Key, Expr>,
        power: Rational,
    },
    Sum {
        terms: BTreeMap<Key, Expr>,
        power: Rational,
    },
}

impl Kind {
    pub fn group(&self) -> Group {
        match self {
            Kind::Number => Group::N,
            Kind::Radical { .. } => Group::P,
            Kind::Variable { .. } => Group::S,
            Kind::Exponential { .. } => Group::EX,
            Kind::Function { .. } => Group::FN,
            Kind::Polynomial { .. } => Group::PL,
            Kind::Product { .. } => Group::CB,
            Kind::Sum { .. } => Group::CP,
        }
    }

    /// `None` for numbers and for `EX`
    pub(crate) fn rational_power(&self) -> Option<&Rational> {
        match self {
            Kind::Number | Kind::Exponential { .. } => None,
            Kind::Radical { power, .. }
            | Kind::Variable { power, .. }
            | Kind::Function { power, .. }
            | Kind::Polynomial { power, .. }
            | Kind::Product { power, .. }
            | Kind::Sum { power, .. } => Some(power),
        }
    }

    fn set_power(&mut self, value: Rational) {
        match self {
            Kind::Number | Kind::Exponential { .. } => {}
            Kind::Radical { power, .. }
            | Kind::Variable { power, .. }
            | Kind::Function { power, .. }
            | Kind::Polynomial { power, .. }
            | Kind::Product { power, .. }
            | Kind::Sum { power, .. } => *power = value,
        }
    }
}

/// Power of an expression as seen by collaborators.
#[derive(Clone, Debug, PartialEq)]
pub enum Power {
    Rational(Rational),
    Symbolic(Expr),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Children<'a> {
    None,
    Arguments(&'a [Expr]),
    Terms(&'a BTreeMap<Key, Expr>),
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Expr {
    pub(crate) multiplier: Rational,
    pub(crate) kind: Kind,
}

////////////////////////////////////////////////////////////////////////////////
//                               CONSTRUCTORS
////////////////////////////////////////////////////////////////////////////////

impl Expr {
    pub fn number(value: Rational) -> Self {
        Expr {
            multiplier: value,
            kind: Kind::Number,
        }
    }

    pub fn integer(value: i64) -> Self {
        Expr::number(Rational::from_integer(value))
    }

    pub fn zero() -> Self {
        Expr::number(Rational::zero())
    }

    pub fn one() -> Self {
        Expr::number(Rational::one())
    }

    pub fn variable(name: &str) -> Self {
        Expr::from_kind(Kind::Variable {
            name: name.to_string(),
            power: Rational::one(),
        })
    }

    pub fn imaginary() -> Self {
        Expr::variable(IMAGINARY)
    }

    pub fn infinity() -> Self {
        Expr::variable(INFINITY)
    }

    /// symbolic call, no simplification
    pub fn function(name: &str, args: Vec<Expr>) -> Self {
        Expr::from_kind(Kind::Function {
            name: name.to_string(),
            args,
            power: Rational::one(),
        })
    }

    pub(crate) fn from_kind(kind: Kind) -> Self {
        Expr {
            multiplier: Rational::one(),
            kind,
        }
    }

    pub(crate) fn from_parts(multiplier: Rational, kind: Kind) -> Self {
        if multiplier.is_zero() {
            return Expr::zero();
        }
        Expr { multiplier, kind }
    }

    pub(crate) fn radical(base: BigInt, power: Rational) -> Self {
        Expr::from_kind(Kind::Radical { base, power })
    }

    pub(crate) fn sqrt_of(radicand: BigInt) -> Self {
        Expr::function(SQRT, vec![Expr::number(Rational::from_integer(radicand))])
    }

    pub(crate) fn exponential(base: Expr, exponent: Expr) -> Self {
        Expr::from_kind(Kind::Exponential {
            base: Box::new(base),
            exponent: Box::new(exponent),
        })
    }
}

////////////////////////////////////////////////////////////////////////////////
//                               INSPECTION
////////////////////////////////////////////////////////////////////////////////

impl Expr {
    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    pub fn group(&self) -> Group {
        self.kind.group()
    }

    pub fn multiplier(&self) -> &Rational {
        &self.multiplier
    }

    /// Group dependent value: the number for `N`, the integer base for `P`,
    /// the name for `S` and `FN`, the base text for `EX`, the symbol for `PL`
    /// and the text without multiplier and power for `CB`/`CP`.
    pub fn value(&self) -> String {
        match &self.kind {
            Kind::Number => self.multiplier.to_string(),
            Kind::Radical { base, .. } => base.to_string(),
            Kind::Variable { name, .. } | Kind::Function { name, .. } => name.clone(),
            Kind::Exponential { base, .. } => base.to_string(),
            Kind::Polynomial { variable, .. } => variable.clone(),
            Kind::Product { .. } | Kind::Sum { .. } => self.base_part().to_string(),
        }
    }

    pub fn power(&self) -> Power {
        match &self.kind {
            Kind::Exponential { exponent, .. } => Power::Symbolic((**exponent).clone()),
            kind => Power::Rational(kind.rational_power().cloned().unwrap_or_else(Rational::one)),
        }
    }

    pub fn children(&self) -> Children<'_> {
        match &self.kind {
            Kind::Function { args, .. } => Children::Arguments(args),
            Kind::Polynomial { terms, .. } | Kind::Sum { terms, .. } => Children::Terms(terms),
            Kind::Product { factors, .. } => Children::Terms(factors),
            _ => Children::None,
        }
    }

    /// base of an `EX`
    pub fn base(&self) -> Option<&Expr> {
        match &self.kind {
            Kind::Exponential { base, .. } => Some(base),
            _ => None,
        }
    }

    /// canonical text, same as `to_string()`
    pub fn text(&self) -> String {
        self.to_string()
    }

    pub fn is_number(&self) -> bool {
        matches!(self.kind, Kind::Number)
    }

    pub fn as_number(&self) -> Option<&Rational> {
        match self.kind {
            Kind::Number => Some(&self.multiplier),
            _ => None,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.is_number() && self.multiplier.is_zero()
    }

    pub fn is_one(&self) -> bool {
        self.is_number() && self.multiplier.is_one()
    }

    /// true when no free symbol occurs; `pi`, `e`, `i` and `Infinity` count as constants
    pub fn is_constant(&self) -> bool {
        match &self.kind {
            Kind::Number | Kind::Radical { .. } => true,
            Kind::Variable { name, .. } | Kind::Polynomial { variable: name, .. } => {
                RESERVED_CONSTANTS.contains(&name.as_str())
            }
            Kind::Exponential { base, exponent } => base.is_constant() && exponent.is_constant(),
            Kind::Function { args, .. } => args.iter().all(Expr::is_constant),
            Kind::Product { factors: terms, .. } | Kind::Sum { terms, .. } => {
                terms.values().all(Expr::is_constant)
            }
        }
    }

    /// Does the symbol `name` occur? Function names are not symbols.
    pub fn contains(&self, name: &str) -> bool {
        match &self.kind {
            Kind::Number | Kind::Radical { .. } => false,
            Kind::Variable { name: own, .. } | Kind::Polynomial { variable: own, .. } => own == name,
            Kind::Exponential { base, exponent } => base.contains(name) || exponent.contains(name),
            Kind::Function { args, .. } => args.iter().any(|arg| arg.contains(name)),
            Kind::Product { factors: terms, .. } | Kind::Sum { terms, .. } => {
                terms.values().any(|term| term.contains(name))
            }
        }
    }

    /// Real value of a constant expression, `None` when a free symbol,
    /// `i` or a non-real intermediate result shows up.
    pub fn to_f64(&self) -> Option<f64> {
        let unit = match &self.kind {
            Kind::Number => 1.0,
            Kind::Radical { base, power } => base.to_f64()?.powf(power.to_f64()),
            Kind::Variable { name, power } => {
                let value = match name.as_str() {
                    "pi" => std::f64::consts::PI,
                    "e" => std::f64::consts::E,
                    _ => return None,
                };
                value.powf(power.to_f64())
            }
            Kind::Exponential { base, exponent } => base.to_f64()?.powf(exponent.to_f64()?),
            Kind::Function { name, args, power } => {
                let values = args.iter().map(Expr::to_f64).collect::<Option<Vec<f64>>>()?;
                evaluate_function(name, &values)?.powf(power.to_f64())
            }
            Kind::Polynomial { terms, power, .. } | Kind::Sum { terms, power } => {
                let total = terms
                    .values()
                    .map(Expr::to_f64)
                    .sum::<Option<f64>>()?;
                total.powf(power.to_f64())
            }
            Kind::Product { factors, power } => {
                let total = factors
                    .values()
                    .map(Expr::to_f64)
                    .product::<Option<f64>>()?;
                total.powf(power.to_f64())
            }
        };
        Some(unit * self.multiplier.to_f64()).filter(|value| value.is_finite())
    }
}

////////////////////////////////////////////////////////////////////////////////
//                         CANONICAL BUILDING BLOCKS
////////////////////////////////////////////////////////////////////////////////

impl Expr {
    /// sum with power 1
    pub(crate) fn is_sum_container(&self) -> bool {
        match &self.kind {
            Kind::Polynomial { power, .. } | Kind::Sum { power, .. } => power.is_one(),
            _ => false,
        }
    }

    /// product with power 1
    pub(crate) fn is_product_container(&self) -> bool {
        matches!(&self.kind, Kind::Product { power, .. } if power.is_one())
    }

    /// `n` of a `sqrt(n)` leaf
    pub(crate) fn sqrt_radicand(&self) -> Option<&BigInt> {
        match &self.kind {
            Kind::Function { name, args, .. } if name == SQRT && args.len() == 1 => {
                let radicand = args[0].as_number()?;
                (radicand.is_integer() && radicand.is_positive()).then(|| radicand.numer())
            }
            _ => None,
        }
    }

    /// `n` of a `sqrt(n)` leaf with power 1
    pub(crate) fn square_root_leaf(&self) -> Option<&BigInt> {
        match &self.kind {
            Kind::Function { power, .. } if power.is_one() => self.sqrt_radicand(),
            _ => None,
        }
    }

    /// `Infinity` with power 1, any sign
    pub fn is_infinite(&self) -> bool {
        matches!(&self.kind, Kind::Variable { name, power } if name == INFINITY && power.is_one())
    }

    /// `(n, p)` for `n^p` held as a `P` or as a `sqrt(n)` leaf
    pub(crate) fn as_radical(&self) -> Option<(BigInt, Rational)> {
        match &self.kind {
            Kind::Radical { base, power } => Some((base.clone(), power.clone())),
            Kind::Function { power, .. } => {
                let radicand = self.sqrt_radicand()?;
                let half = Rational::new(BigInt::one(), BigInt::from(2)).ok()?;
                Some((radicand.clone(), power * &half))
            }
            _ => None,
        }
    }

    /// the expression without multiplier and power: `x` for `3*x^2`, `y` for `y^x`
    pub(crate) fn base_part(&self) -> Expr {
        if let Some((base, _)) = self.as_radical() {
            return Expr::number(Rational::from_integer(base));
        }
        match &self.kind {
            Kind::Number => Expr::one(),
            Kind::Exponential { base, .. } => (**base).clone(),
            kind => {
                let mut kind = kind.clone();
                kind.set_power(Rational::one());
                Expr::from_kind(kind)
            }
        }
    }

    /// exponent matching [`Expr::base_part`]
    pub(crate) fn exponent_part(&self) -> Expr {
        if let Some((_, power)) = self.as_radical() {
            return Expr::number(power);
        }
        match &self.kind {
            Kind::Exponential { exponent, .. } => (**exponent).clone(),
            kind => Expr::number(kind.rational_power().cloned().unwrap_or_else(Rational::one)),
        }
    }

    fn unit(&self) -> Expr {
        Expr::from_kind(self.kind.clone())
    }

    /// Slot of `self` inside a container of group `parent`.
    pub(crate) fn key_for(&self, parent: Group) -> Key {
        match parent {
            Group::CB => match (&self.kind, self.as_radical()) {
                (_, Some((base, _))) => Key::Radical(base),
                (Kind::Number, None) => Key::Number,
                _ => Key::Base(Box::new(self.base_part())),
            },
            Group::PL => match &self.kind {
                Kind::Variable { power, .. } => Key::Degree(power.clone()),
                _ => Key::Term(Box::new(self.unit())),
            },
            _ => match &self.kind {
                Kind::Number => Key::Number,
                Kind::Variable { name, .. } => Key::Variable(name.clone()),
                Kind::Polynomial { variable, power, .. } if power.is_one() => {
                    Key::Variable(variable.clone())
                }
                _ => Key::Term(Box::new(self.unit())),
            },
        }
    }

    /// Multiplies by a rational, distributing over sums with power 1.
    pub(crate) fn scaled(self, factor: &Rational) -> Expr {
        if factor.is_zero() {
            return Expr::zero();
        }
        if factor.is_one() {
            return self;
        }
        if self.is_sum_container() {
            let scale = |terms: BTreeMap<Key, Expr>| -> BTreeMap<Key, Expr> {
                terms
                    .into_iter()
                    .map(|(key, term)| (key, term.scaled(factor)))
                    .collect()
            };
            let kind = match self.kind {
                Kind::Sum { terms, power } => Kind::Sum {
                    terms: scale(terms),
                    power,
                },
                Kind::Polynomial {
                    variable,
                    terms,
                    power,
                } => Kind::Polynomial {
                    variable,
                    terms: scale(terms),
                    power,
                },
                kind => kind,
            };
            return Expr::from_kind(kind);
        }
        let multiplier = &self.multiplier * factor;
        Expr {
            multiplier,
            kind: self.kind,
        }
    }

    pub(crate) fn negated(self) -> Expr {
        self.scaled(&Rational::minus_one())
    }

    /// Splits into `(coefficient, unit)` with `coefficient * unit == self`.
    /// Sums give up their content (see [`Expr::content`]).
    pub(crate) fn split_multiplier(self) -> (Rational, Expr) {
        if self.is_sum_container() {
            return match self.content() {
                Some((content, inverse)) => (content, self.scaled(&inverse)),
                None => (Rational::one(), self),
            };
        }
        let Expr { multiplier, kind } = self;
        (multiplier, Expr::from_kind(kind))
    }

    /// Content of a sum: gcd of the numerators over lcm of the denominators of
    /// all term coefficients, signed so that the leading printed term becomes
    /// positive. Returns the content and its inverse.
    fn content(&self) -> Option<(Rational, Rational)> {
        let mut coefficients = Vec::new();
        self.collect_coefficients(&mut coefficients);
        let first_negative = coefficients.first()?.is_negative();
        let (numer_gcd, denom_lcm) = coefficients.iter().fold(
            (BigInt::zero(), BigInt::one()),
            |(gcd, lcm), coefficient| (gcd.gcd(coefficient.numer()), lcm.lcm(coefficient.denom())),
        );
        let sign = BigInt::from(if first_negative { -1 } else { 1 });
        let content = Rational::new(&numer_gcd * &sign, denom_lcm.clone()).ok()?;
        let inverse = Rational::new(denom_lcm * sign, numer_gcd).ok()?;
        Some((content, inverse))
    }

    /// coefficients in printing order: highest degree first, constant term last
    fn collect_coefficients<'a>(&'a self, out: &mut Vec<&'a Rational>) {
        match &self.kind {
            Kind::Polynomial { terms, power, .. } if power.is_one() => {
                for term in terms.values().rev() {
                    term.collect_coefficients(out);
                }
            }
            Kind::Sum { terms, power } if power.is_one() => {
                let symbolic = terms
                    .iter()
                    .filter(|(key, _)| **key != Key::Number)
                    .map(|(_, term)| term);
                for term in symbolic.chain(terms.get(&Key::Number)) {
                    term.collect_coefficients(out);
                }
            }
            _ => out.push(&self.multiplier),
        }
    }
}

/// Demotes a sum with power 1: no terms → 0, one term → the term.
pub(crate) fn finish_sum(kind: Kind) -> Expr {
    match kind {
        Kind::Sum { terms, .. } | Kind::Polynomial { terms, .. } if terms.len() <= 1 => {
            terms.into_values().next().unwrap_or_else(Expr::zero)
        }
        kind => Expr::from_kind(kind),
    }
}

/// Demotes a product with power 1: no factors → the multiplier, one factor → scaled factor.
pub(crate) fn finish_product(multiplier: Rational, mut factors: BTreeMap<Key, Expr>) -> Expr {
    if multiplier.is_zero() {
        return Expr::zero();
    }
    match factors.len() {
        0 => Expr::number(multiplier),
        1 => match factors.pop_first() {
            Some((_, factor)) => factor.scaled(&multiplier),
            None => Expr::number(multiplier),
        },
        _ => Expr {
            multiplier,
            kind: Kind::Product {
                factors,
                power: Rational::one(),
            },
        },
    }
}

/// Inserts a term into the slots of a sum of group `parent` (`CP` or `PL`).
/// An occupied slot is merged through [`arithmetic::add`]; a merged zero
/// frees the slot.
pub(crate) fn attach_term(
    slots: &mut BTreeMap<Key, Expr>,
    parent: Group,
    term: Expr,
    ctx: &Context,
) -> KernelResult<()> {
    if term.is_zero() {
        return Ok(());
    }
    if term.is_sum_container() && term.group() == parent {
        if let Kind::Sum { terms, .. } | Kind::Polynomial { terms, .. } = term.kind {
            for child in terms.into_values() {
                attach_term(slots, parent, child, ctx)?;
            }
        }
        return Ok(());
    }
    let key = term.key_for(parent);
    match slots.remove(&key) {
        None => {
            slots.insert(key, term);
        }
        Some(existing) => {
            let merged = arithmetic::add(existing, term, ctx)?;
            attach_term(slots, parent, merged, ctx)?;
        }
    }
    Ok(())
}

/// Inserts a factor into the slots of a product. Numbers and multipliers go
/// to `multiplier`, equal bases are merged through [`arithmetic::multiply`].
pub(crate) fn combine_factor(
    factors: &mut BTreeMap<Key, Expr>,
    multiplier: &mut Rational,
    factor: Expr,
    ctx: &Context,
) -> KernelResult<()> {
    if let Some(value) = factor.as_number() {
        *multiplier = &*multiplier * value;
        return Ok(());
    }
    if factor.is_product_container() {
        *multiplier = &*multiplier * &factor.multiplier;
        if let Kind::Product { factors: inner, .. } = factor.kind {
            for child in inner.into_values() {
                combine_factor(factors, multiplier, child, ctx)?;
            }
        }
        return Ok(());
    }
    let (coefficient, unit) = factor.split_multiplier();
    *multiplier = &*multiplier * &coefficient;
    if let Some(merged) = merge_square_roots(factors, &unit)? {
        return combine_factor(factors, multiplier, merged, ctx);
    }
    let key = unit.key_for(Group::CB);
    match factors.remove(&key) {
        None => {
            factors.insert(key, unit);
        }
        Some(existing) => {
            let merged = arithmetic::multiply(existing, unit, ctx)?;
            combine_factor(factors, multiplier, merged, ctx)?;
        }
    }
    Ok(())
}

/// `sqrt(a)*sqrt(b) = sqrt(a*b)` with square factors pulled out again. Takes
/// the other square root out of `factors` when one is there.
fn merge_square_roots(factors: &mut BTreeMap<Key, Expr>, unit: &Expr) -> KernelResult<Option<Expr>> {
    let Some(radicand) = unit.square_root_leaf() else {
        return Ok(None);
    };
    let partner = factors.iter().find_map(|(key, factor)| {
        factor
            .square_root_leaf()
            .filter(|other| *other != radicand)
            .map(|other| (key.clone(), other * radicand))
    });
    let Some((key, product)) = partner else {
        return Ok(None);
    };
    factors.remove(&key);
    let half = Rational::new(BigInt::one(), BigInt::from(2))?;
    Ok(Some(root_of_integer(&product, &half)?))
}

////////////////////////////////////////////////////////////////////////////////
//                                  TEXT
////////////////////////////////////////////////////////////////////////////////

fn power_suffix(power: &Rational) -> String {
    if power.is_one() {
        String::new()
    } else if power.is_integer() && power.is_positive() {
        format!("^{}", power)
    } else {
        format!("^({})", power)
    }
}

fn grouped(inner: String, power: &Rational) -> String {
    if power.is_one() {
        inner
    } else {
        format!("({}){}", inner, power_suffix(power))
    }
}

fn join_terms<'a>(terms: impl Iterator<Item = &'a Expr>) -> String {
    let mut text = String::new();
    for (index, term) in terms.enumerate() {
        let term = term.to_string();
        if index > 0 && !term.starts_with('-') {
            text.push('+');
        }
        text.push_str(&term);
    }
    text
}

impl Expr {
    /// text usable as a base or an exponent of `^` without brackets
    fn atom_text(&self) -> String {
        match &self.kind {
            Kind::Number if self.multiplier.is_integer() && !self.multiplier.is_negative() => {
                self.multiplier.to_string()
            }
            Kind::Variable { power, .. } | Kind::Function { power, .. }
                if power.is_one() && self.multiplier.is_one() =>
            {
                self.to_string()
            }
            _ => format!("({})", self),
        }
    }

    fn factor_text(&self) -> String {
        if self.is_sum_container() {
            format!("({})", self)
        } else {
            self.to_string()
        }
    }

    fn body_text(&self) -> String {
        match &self.kind {
            Kind::Number => self.multiplier.to_string(),
            Kind::Radical { base, power } => {
                if base.is_negative() {
                    format!("({})^({})", base, power)
                } else {
                    format!("{}^({})", base, power)
                }
            }
            Kind::Variable { name, power } => format!("{}{}", name, power_suffix(power)),
            Kind::Exponential { base, exponent } => {
                format!("{}^{}", base.atom_text(), exponent.atom_text())
            }
            Kind::Function { name, args, power } => {
                format!("{}({}){}", name, args.iter().join(","), power_suffix(power))
            }
            Kind::Polynomial { terms, power, .. } => grouped(join_terms(terms.values().rev()), power),
            Kind::Sum { terms, power } => {
                let symbolic = terms
                    .iter()
                    .filter(|(key, _)| **key != Key::Number)
                    .map(|(_, term)| term);
                grouped(join_terms(symbolic.chain(terms.get(&Key::Number))), power)
            }
            Kind::Product { factors, power } => {
                grouped(factors.values().map(Expr::factor_text).join("*"), power)
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_number() {
            return write!(f, "{}", self.multiplier);
        }
        let body = self.body_text();
        if self.multiplier.is_one() {
            write!(f, "{}", body)
        } else if self.multiplier.is_minus_one() {
            write!(f, "-{}", body)
        } else {
            write!(f, "{}*{}", self.multiplier, body)
        }
    }
}
