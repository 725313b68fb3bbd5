//! Error kinds of the kernel.
//!
//! Parse and validation errors are always reported. Domain errors (division by
//! zero, `0^0`, singular function values) can be downgraded to documented
//! fallback values when the context runs with error suppression on, see
//! [`crate::symbolic::symbolic_context::Context::domain_error`].
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("empty expression")]
    Empty,
    #[error("unmatched bracket '{bracket}' at position {position}")]
    UnmatchedBracket { bracket: char, position: usize },
    #[error("unexpected character '{character}' at position {position}")]
    UnexpectedCharacter { character: char, position: usize },
    #[error("unexpected token '{0}'")]
    UnexpectedToken(String),
    #[error("operator '{0}' is missing an operand")]
    MissingOperand(String),
    #[error("invalid number literal '{0}'")]
    InvalidNumber(String),
    #[error("unknown function '{0}'")]
    UnknownFunction(String),
    #[error("function '{name}' expects {expected} argument(s), got {found}")]
    WrongArity {
        name: String,
        expected: String,
        found: usize,
    },
    #[error("vector literals are not supported")]
    VectorLiteral,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("0^0 is undefined")]
    ZeroToZero,
    #[error("logarithm of zero")]
    LogOfZero,
    #[error("{function} is singular at {argument}")]
    Singular { function: String, argument: String },
    #[error("{0} is not a finite number")]
    NonFinite(f64),
    #[error("exponent {0} is too large for exact arithmetic")]
    Overflow(String),
    #[error("{0} is undefined")]
    Undefined(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error(
        "'{0}' is not a valid name: use a letter or '_' followed by letters, digits or '_'"
    )]
    InvalidName(String),
    #[error("'{0}' is reserved by the kernel")]
    ReservedName(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("malformed configuration: {0}")]
    Toml(String),
    #[error("key '{key}' must be {expected}")]
    InvalidValue { key: String, expected: String },
    #[error("cannot read configuration: {0}")]
    Io(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Toml(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum KernelError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("recursion depth limit of {0} exceeded")]
    RecursionLimit(usize),
}

pub type KernelResult<T> = Result<T, KernelError>;
