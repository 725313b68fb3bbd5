//! # Expression parser
//!
//! ## Purpose
//! Turns text like `2x^2 + sin(pi/2)*(x+1)` into a canonical [`Expr`].
//!
//! ## Algorithm
//! A shunting-yard evaluator. There is no syntax tree: every reduction calls
//! the arithmetic engine right away, so the value on the output stack is
//! always canonical.
//! 1. whitespace is stripped and the brackets are validated;
//! 2. the text is split into tokens with anchored regexes, a scientific
//!    literal such as `1e-3` is a single number token;
//! 3. tokens are fed to the evaluator, which inserts the implicit `*` between
//!    adjacent operands (`2x`, `)(`, `2(`, `)x`, `3!x`).
//!
//! ## Operators
//! | symbol | precedence | associativity | notes |
//! |---|---|---|---|
//! | `!` | 5 | - | postfix factorial |
//! | `^` `**` | 4 | right | |
//! | `*` `/` | 3 | left | |
//! | `+` `-` | 2 | left | also prefix, `-x^2` is `-(x^2)` |
//! | `,` | 1 | left | argument separator |
//!
//! An identifier immediately followed by `(` is always a function call.
use crate::symbolic::rational::Rational;
use crate::symbolic::symbolic_arithmetic::{add, divide, multiply, negate, pow, subtract};
use crate::symbolic::symbolic_context::Context;
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_errors::{KernelError, KernelResult, ParseError};
use crate::symbolic::symbolic_numbers::approximate;
use crate::symbolic::utils::{check_brackets, strip_whitespace};
use log::{debug, trace};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use strum_macros::Display;

static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?").expect("valid number pattern")
});
static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*").expect("valid identifier pattern"));

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum Operator {
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Subtract,
    #[strum(serialize = "*")]
    Multiply,
    #[strum(serialize = "/")]
    Divide,
    #[strum(serialize = "^")]
    Power,
    #[strum(serialize = "!")]
    Factorial,
    #[strum(serialize = ",")]
    Comma,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
}

#[derive(Debug)]
pub struct OperatorDescriptor {
    pub operator: Operator,
    pub symbol: char,
    pub precedence: u8,
    pub associativity: Associativity,
    /// (min, max) operand count
    pub operands: (usize, usize),
    pub prefix: bool,
    pub postfix: bool,
}

/// indexed by the `Operator` discriminant
pub const OPERATORS: [OperatorDescriptor; 7] = [
    OperatorDescriptor {
        operator: Operator::Add,
        symbol: '+',
        precedence: 2,
        associativity: Associativity::Left,
        operands: (1, 2),
        prefix: true,
        postfix: false,
    },
    OperatorDescriptor {
        operator: Operator::Subtract,
        symbol: '-',
        precedence: 2,
        associativity: Associativity::Left,
        operands: (1, 2),
        prefix: true,
        postfix: false,
    },
    OperatorDescriptor {
        operator: Operator::Multiply,
        symbol: '*',
        precedence: 3,
        associativity: Associativity::Left,
        operands: (2, 2),
        prefix: false,
        postfix: false,
    },
    OperatorDescriptor {
        operator: Operator::Divide,
        symbol: '/',
        precedence: 3,
        associativity: Associativity::Left,
        operands: (2, 2),
        prefix: false,
        postfix: false,
    },
    OperatorDescriptor {
        operator: Operator::Power,
        symbol: '^',
        precedence: 4,
        associativity: Associativity::Right,
        operands: (2, 2),
        prefix: false,
        postfix: false,
    },
    OperatorDescriptor {
        operator: Operator::Factorial,
        symbol: '!',
        precedence: 5,
        associativity: Associativity::Left,
        operands: (1, 1),
        prefix: false,
        postfix: true,
    },
    OperatorDescriptor {
        operator: Operator::Comma,
        symbol: ',',
        precedence: 1,
        associativity: Associativity::Left,
        operands: (2, 2),
        prefix: false,
        postfix: false,
    },
];

/// binding strength of a prefix sign: above `+`, below `^`
const PREFIX_PRECEDENCE: u8 = 3;

impl Operator {
    pub fn descriptor(self) -> &'static OperatorDescriptor {
        &OPERATORS[self as usize]
    }

    fn from_symbol(symbol: char) -> Option<Operator> {
        OPERATORS
            .iter()
            .find(|descriptor| descriptor.symbol == symbol)
            .map(|descriptor| descriptor.operator)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Number(String),
    Identifier(String),
    /// identifier directly followed by `(`, the bracket is part of the token
    Call(String),
    Operator(Operator),
    Open,
    Close,
}

/// Splits whitespace-free text into tokens.
pub fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut offset = 0;
    while offset < input.len() {
        let rest = &input[offset..];
        if let Some(found) = NUMBER.find(rest) {
            tokens.push(Token::Number(found.as_str().to_string()));
            offset += found.end();
            continue;
        }
        if let Some(found) = IDENTIFIER.find(rest) {
            let name = found.as_str().to_string();
            offset += found.end();
            if input[offset..].starts_with('(') {
                offset += 1;
                tokens.push(Token::Call(name));
            } else {
                tokens.push(Token::Identifier(name));
            }
            continue;
        }
        let Some(c) = rest.chars().next() else {
            break;
        };
        let token = match c {
            '*' if rest.starts_with("**") => {
                offset += 1;
                Token::Operator(Operator::Power)
            }
            '(' => Token::Open,
            ')' => Token::Close,
            '[' | ']' => return Err(ParseError::VectorLiteral),
            _ => match Operator::from_symbol(c) {
                Some(operator) => Token::Operator(operator),
                None => {
                    return Err(ParseError::UnexpectedCharacter {
                        character: c,
                        position: input[..offset].chars().count(),
                    });
                }
            },
        };
        offset += c.len_utf8();
        tokens.push(token);
    }
    Ok(tokens)
}

enum Pending {
    Binary(Operator),
    Prefix(Operator),
    Group,
    Call {
        name: String,
        mark: usize,
        commas: usize,
    },
}

impl Pending {
    /// `None` for brackets, which stop every reduction
    fn precedence(&self) -> Option<u8> {
        match self {
            Pending::Binary(operator) => Some(operator.descriptor().precedence),
            Pending::Prefix(_) => Some(PREFIX_PRECEDENCE),
            Pending::Group | Pending::Call { .. } => None,
        }
    }
}

struct Evaluator<'a> {
    ctx: &'a Context,
    substitutions: &'a HashMap<String, Expr>,
    output: Vec<Expr>,
    pending: Vec<Pending>,
    expect_operand: bool,
    after_number: bool,
}

impl<'a> Evaluator<'a> {
    fn new(ctx: &'a Context, substitutions: &'a HashMap<String, Expr>) -> Self {
        Evaluator {
            ctx,
            substitutions,
            output: Vec::new(),
            pending: Vec::new(),
            expect_operand: true,
            after_number: false,
        }
    }

    fn feed(&mut self, token: Token) -> KernelResult<()> {
        trace!("token {:?}", token);
        let after_number = std::mem::replace(&mut self.after_number, false);
        match token {
            Token::Number(text) => {
                if after_number {
                    return Err(ParseError::InvalidNumber(text).into());
                }
                self.operand_position()?;
                let value: Rational = text.parse()?;
                self.push_operand(Expr::number(value));
                self.after_number = true;
            }
            Token::Identifier(name) => {
                self.operand_position()?;
                let value = self.resolve(&name)?;
                self.push_operand(value);
            }
            Token::Call(name) => {
                if self.ctx.function(&name).is_none() {
                    return Err(ParseError::UnknownFunction(name).into());
                }
                self.operand_position()?;
                let mark = self.output.len();
                self.push_pending(Pending::Call {
                    name,
                    mark,
                    commas: 0,
                })?;
                self.expect_operand = true;
            }
            Token::Open => {
                self.operand_position()?;
                self.push_pending(Pending::Group)?;
                self.expect_operand = true;
            }
            Token::Close => self.close()?,
            Token::Operator(Operator::Factorial) => {
                let operand = self.pop_operand(Operator::Factorial)?;
                let value = self.call_function("factorial", vec![operand])?;
                self.push_operand(value);
            }
            Token::Operator(Operator::Comma) => self.comma()?,
            Token::Operator(operator) => self.operator(operator)?,
        }
        Ok(())
    }

    /// implicit multiplication when an operand follows an operand
    fn operand_position(&mut self) -> KernelResult<()> {
        if !self.expect_operand {
            self.operator(Operator::Multiply)?;
        }
        Ok(())
    }

    /// Unreduced operators and open brackets nest the tree that is being
    /// built, so their number is bounded by the context recursion limit.
    fn push_pending(&mut self, pending: Pending) -> KernelResult<()> {
        let limit = self.ctx.max_depth();
        if self.pending.len() >= limit {
            return Err(KernelError::RecursionLimit(limit));
        }
        self.pending.push(pending);
        Ok(())
    }

    fn push_operand(&mut self, value: Expr) {
        self.output.push(value);
        self.expect_operand = false;
    }

    fn pop_operand(&mut self, operator: Operator) -> KernelResult<Expr> {
        if self.expect_operand {
            return Err(ParseError::MissingOperand(operator.to_string()).into());
        }
        self.output
            .pop()
            .ok_or_else(|| ParseError::MissingOperand(operator.to_string()).into())
    }

    fn operator(&mut self, operator: Operator) -> KernelResult<()> {
        let descriptor = operator.descriptor();
        if self.expect_operand {
            if descriptor.prefix {
                self.push_pending(Pending::Prefix(operator))?;
                return Ok(());
            }
            return Err(ParseError::MissingOperand(operator.to_string()).into());
        }
        while let Some(top) = self.pending.last().and_then(Pending::precedence) {
            let reduce = top > descriptor.precedence
                || (top == descriptor.precedence
                    && descriptor.associativity == Associativity::Left);
            if !reduce {
                break;
            }
            self.reduce_top()?;
        }
        self.push_pending(Pending::Binary(operator))?;
        self.expect_operand = true;
        Ok(())
    }

    /// applies the operator on top of the pending stack
    fn reduce_top(&mut self) -> KernelResult<()> {
        match self.pending.pop() {
            Some(Pending::Binary(operator)) => {
                let missing = || ParseError::MissingOperand(operator.to_string());
                let rhs = self.output.pop().ok_or_else(missing)?;
                let lhs = self.output.pop().ok_or_else(missing)?;
                let value = self.apply(operator, lhs, rhs)?;
                self.output.push(value);
            }
            Some(Pending::Prefix(operator)) => {
                let operand = self
                    .output
                    .pop()
                    .ok_or_else(|| ParseError::MissingOperand(operator.to_string()))?;
                let value = match operator {
                    Operator::Subtract => negate(operand),
                    _ => operand,
                };
                self.output.push(value);
            }
            Some(other) => self.pending.push(other),
            None => {}
        }
        Ok(())
    }

    fn reduce_to_bracket(&mut self) -> KernelResult<()> {
        while self.pending.last().and_then(Pending::precedence).is_some() {
            self.reduce_top()?;
        }
        Ok(())
    }

    fn apply(&self, operator: Operator, lhs: Expr, rhs: Expr) -> KernelResult<Expr> {
        let ctx = self.ctx;
        match operator {
            Operator::Add => add(lhs, rhs, ctx),
            Operator::Subtract => subtract(lhs, rhs, ctx),
            Operator::Multiply => multiply(lhs, rhs, ctx),
            Operator::Divide => divide(lhs, rhs, ctx),
            Operator::Power => pow(lhs, rhs, ctx),
            Operator::Factorial | Operator::Comma => {
                Err(ParseError::UnexpectedToken(operator.to_string()).into())
            }
        }
    }

    fn comma(&mut self) -> KernelResult<()> {
        if self.expect_operand {
            return Err(ParseError::MissingOperand(Operator::Comma.to_string()).into());
        }
        self.reduce_to_bracket()?;
        match self.pending.last_mut() {
            Some(Pending::Call { commas, .. }) => {
                *commas += 1;
                self.expect_operand = true;
                Ok(())
            }
            _ => Err(ParseError::UnexpectedToken(Operator::Comma.to_string()).into()),
        }
    }

    fn close(&mut self) -> KernelResult<()> {
        if self.expect_operand {
            let zero_argument_call = matches!(
                self.pending.last(),
                Some(Pending::Call { mark, commas: 0, .. }) if *mark == self.output.len()
            );
            if !zero_argument_call {
                return Err(ParseError::MissingOperand(")".to_string()).into());
            }
        }
        self.reduce_to_bracket()?;
        match self.pending.pop() {
            Some(Pending::Group) => {}
            Some(Pending::Call { name, mark, .. }) => {
                let args = self.output.split_off(mark);
                let value = self.call_function(&name, args)?;
                self.output.push(value);
            }
            _ => return Err(ParseError::UnexpectedToken(")".to_string()).into()),
        }
        self.expect_operand = false;
        Ok(())
    }

    /// Validates the arity and runs the native rule. A rule that declines
    /// (or a function without one) leaves the symbolic call.
    fn call_function(&self, name: &str, args: Vec<Expr>) -> KernelResult<Expr> {
        let def = self
            .ctx
            .function(name)
            .ok_or_else(|| ParseError::UnknownFunction(name.to_string()))?;
        if !def.accepts(args.len()) {
            return Err(ParseError::WrongArity {
                name: name.to_string(),
                expected: def.arity_text(),
                found: args.len(),
            }
            .into());
        }
        if let Some(native) = &def.implementation {
            if let Some(value) = native(&args, self.ctx)? {
                return Ok(value);
            }
        }
        Ok(Expr::function(name, args))
    }

    /// substitutions, then variables, then constants
    fn resolve(&self, name: &str) -> KernelResult<Expr> {
        if let Some(value) = self.substitutions.get(name) {
            return Ok(value.clone());
        }
        if let Some(value) = self.ctx.variable(name) {
            return Ok(value.clone());
        }
        if let Some(value) = self.ctx.constant(name) {
            return Ok(value.clone());
        }
        if self.ctx.is_numeric() {
            match name {
                "pi" => return approximate(std::f64::consts::PI, self.ctx),
                "e" => return approximate(std::f64::consts::E, self.ctx),
                _ => {}
            }
        }
        Ok(Expr::variable(name))
    }

    fn finish(mut self) -> KernelResult<Expr> {
        if self.expect_operand {
            let error = match self.pending.last() {
                None if self.output.is_empty() => ParseError::Empty,
                Some(Pending::Binary(operator)) | Some(Pending::Prefix(operator)) => {
                    ParseError::MissingOperand(operator.to_string())
                }
                _ => ParseError::MissingOperand(String::new()),
            };
            return Err(error.into());
        }
        self.reduce_to_bracket()?;
        if !self.pending.is_empty() {
            return Err(ParseError::UnexpectedToken("(".to_string()).into());
        }
        match (self.output.pop(), self.output.is_empty()) {
            (Some(value), true) => Ok(value),
            (Some(value), false) => Err(ParseError::UnexpectedToken(value.to_string()).into()),
            (None, _) => Err(ParseError::Empty.into()),
        }
    }
}

/// Parses `input` into a canonical expression. `substitutions` shadow the
/// context variables and constants for this call only.
pub fn parse_expression(
    input: &str,
    substitutions: &HashMap<String, Expr>,
    ctx: &Context,
) -> KernelResult<Expr> {
    let text = strip_whitespace(input);
    if text.is_empty() {
        return Err(ParseError::Empty.into());
    }
    check_brackets(&text)?;
    let tokens = tokenize(&text)?;
    let mut evaluator = Evaluator::new(ctx, substitutions);
    for token in tokens {
        evaluator.feed(token)?;
    }
    let expr = evaluator.finish()?;
    debug!("parsed '{}' into {} ({})", input, expr, expr.group());
    Ok(expr)
}
