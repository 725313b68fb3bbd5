// the collection of utility functions for bracket checking and name validation
use crate::symbolic::symbolic_errors::{ParseError, ValidationError};
use regex::Regex;
use std::sync::LazyLock;

static NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier pattern")
});

/// drop every whitespace character
pub fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Checks that `(`/`)` and `[`/`]` pairs nest properly. Returns the first
/// offending bracket and its char position.
pub fn check_brackets(s: &str) -> Result<(), ParseError> {
    let mut stack: Vec<(char, usize)> = Vec::new();
    for (position, c) in s.chars().enumerate() {
        match c {
            '(' | '[' => stack.push((c, position)),
            ')' | ']' => {
                let opening = if c == ')' { '(' } else { '[' };
                match stack.pop() {
                    Some((open, _)) if open == opening => {}
                    _ => {
                        return Err(ParseError::UnmatchedBracket {
                            bracket: c,
                            position,
                        });
                    }
                }
            }
            _ => {}
        }
    }
    match stack.pop() {
        Some((bracket, position)) => Err(ParseError::UnmatchedBracket { bracket, position }),
        None => Ok(()),
    }
}

pub fn is_valid_name(name: &str) -> bool {
    NAME.is_match(name)
}

pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(ValidationError::InvalidName(name.to_string()))
    }
}
