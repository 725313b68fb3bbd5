#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// exact rational numbers over big integers
pub mod rational;
/// error kinds: parse, domain, validation, config
pub mod symbolic_errors;
/// bracket checking and name validation
pub mod utils;
///____________________________________________________________________________________________________________________________
/// # Context
/// registered functions and constants, variable bindings, numeric mode and error suppression
///# Example
/// ```
/// use RustedCAS::symbolic::symbolic_context::Context;
/// use RustedCAS::symbolic::symbolic_engine::{Expr, Group};
/// let mut ctx = Context::new();
/// ctx.register_constant("g", Expr::integer(10)).unwrap();
/// let e = ctx.parse("2*g*x + 3x").unwrap();
/// assert_eq!(e.to_string(), "23*x");
/// assert_eq!(e.group(), Group::S);
/// {
///     let _numeric = ctx.numeric_scope(true);
///     assert!(ctx.parse("2^(1/2)").unwrap().is_number());
/// }
/// assert_eq!(ctx.parse("2^(1/2)").unwrap().to_string(), "sqrt(2)");
/// ```
pub mod symbolic_context;
///____________________________________________________________________________________________________________________________
/// # Symbolic engine
/// canonical expressions: eight groups (N, P, S, EX, FN, PL, CB, CP), structural
/// keys, inspection and the text form
///# Example
/// ```
/// use RustedCAS::symbolic::symbolic_context::Context;
/// use RustedCAS::symbolic::symbolic_engine::Group;
/// let ctx = Context::new();
/// let e = ctx.parse("(x+1)^2").unwrap();
/// assert_eq!(e.group(), Group::CP);
/// assert_eq!(ctx.parse(&e.text()).unwrap(), e);
/// ```
pub mod symbolic_engine;
/// add, subtract, multiply, divide and pow over canonical expressions
pub mod symbolic_arithmetic;
/// powers of rationals, radical reduction, factorial and gamma
pub mod symbolic_numbers;
/// built-in functions with their exact values
pub mod symbolic_functions;
/// shunting-yard parser from text to canonical expressions
pub mod parse_expr;
#[cfg(test)]
mod symbolic_engine_tests;
