//! Error types for registration and evaluation
//!
//! Every failure is terminal: expressions and registrations are deterministic,
//! so retrying the same input never changes the outcome.

use thiserror::Error;

/// Result alias used throughout the evaluation pipeline
pub type CalcResult<T> = Result<T, CalcError>;

/// Errors raised while registering operators, brackets or loading configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Symbol is empty or made only of whitespace
    #[error("Symbol must not be empty")]
    EmptySymbol,

    /// Symbol contains a whitespace character
    #[error("Symbol '{symbol}' must not contain whitespace")]
    ContainsWhitespace { symbol: String },

    /// Symbol could be read as (part of) a number literal
    #[error("Symbol '{symbol}' overlaps the number grammar")]
    NumberLike { symbol: String },

    /// Operator symbol is already used by a bracket
    #[error("Symbol '{symbol}' is already registered as a bracket")]
    CollidesWithBracket { symbol: String },

    /// Bracket symbol is already used by an operator
    #[error("Symbol '{symbol}' is already registered as an operator")]
    CollidesWithOperator { symbol: String },

    /// Open and close symbols of a bracket pair are identical
    #[error("Open and close brackets can't be the same: '{symbol}'")]
    IdenticalBracketPair { symbol: String },

    /// Bracket symbol overlaps an existing bracket pair
    #[error("Bracket '{symbol}' overlaps an existing bracket pair")]
    OverlappingBracket { symbol: String },

    /// Decimal separator is not one of the supported characters
    #[error("Unsupported decimal separator '{separator}', expected '.' or ','")]
    InvalidSeparator { separator: char },

    /// Configuration names a function the builtin library does not provide
    #[error("Unknown {arity} function '{name}'")]
    UnknownFunction { name: String, arity: &'static str },

    /// Lexeme matcher could not be built from the registered symbols
    #[error("Failed to build symbol matcher: {message}")]
    Matcher { message: String },

    /// Configuration source could not be read or parsed
    #[error("Invalid configuration: {message}")]
    InvalidFile { message: String },
}

/// Broad classification of a [`CalcError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Config,
    Lex,
    Syntax,
    Eval,
    Numeric,
}

/// Error returned by [`crate::Calculator::evaluate`] and friends
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    /// Invalid registration or configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Input could not be split into known lexemes
    #[error("Lexical error at offset {offset}: {message}")]
    Lex { message: String, offset: usize },

    /// Brackets do not balance, or there is nothing to evaluate
    #[error("Syntax error: {message}")]
    Syntax { message: String, offset: Option<usize> },

    /// Postfix sequence does not reduce to a single value
    #[error("Evaluation error: {message}")]
    Eval { message: String },

    /// Number literal is too large for an `f64`
    #[error("Numeric error at offset {offset}: literal '{literal}' is out of range")]
    Numeric { literal: String, offset: usize },
}

impl CalcError {
    pub(crate) fn lex(message: impl Into<String>, offset: usize) -> Self {
        CalcError::Lex { message: message.into(), offset }
    }

    pub(crate) fn syntax(message: impl Into<String>, offset: Option<usize>) -> Self {
        CalcError::Syntax { message: message.into(), offset }
    }

    pub(crate) fn eval(message: impl Into<String>) -> Self {
        CalcError::Eval { message: message.into() }
    }

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            CalcError::Config(_) => ErrorKind::Config,
            CalcError::Lex { .. } => ErrorKind::Lex,
            CalcError::Syntax { .. } => ErrorKind::Syntax,
            CalcError::Eval { .. } => ErrorKind::Eval,
            CalcError::Numeric { .. } => ErrorKind::Numeric,
        }
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Config => "config",
            ErrorKind::Lex => "lex",
            ErrorKind::Syntax => "syntax",
            ErrorKind::Eval => "eval",
            ErrorKind::Numeric => "numeric",
        }
    }

    /// Byte offset into the expression, when the failure has one
    pub fn offset(&self) -> Option<usize> {
        match self {
            CalcError::Lex { offset, .. } | CalcError::Numeric { offset, .. } => Some(*offset),
            CalcError::Syntax { offset, .. } => *offset,
            CalcError::Config(_) | CalcError::Eval { .. } => None,
        }
    }

    /// Human readable message without the category prefix
    pub fn message(&self) -> String {
        match self {
            CalcError::Config(err) => err.to_string(),
            CalcError::Lex { message, .. }
            | CalcError::Syntax { message, .. }
            | CalcError::Eval { message } => message.clone(),
            CalcError::Numeric { literal, .. } => format!("number too big: {literal}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categorization() {
        let err = CalcError::lex("illegal expression", 3);
        assert_eq!(err.kind(), ErrorKind::Lex);
        assert_eq!(err.category(), "lex");
        assert_eq!(err.offset(), Some(3));

        let err = CalcError::eval("insufficient operands");
        assert_eq!(err.category(), "eval");
        assert_eq!(err.offset(), None);

        let err: CalcError = ConfigError::EmptySymbol.into();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_error_display() {
        let err = CalcError::syntax("unmatched bracket", Some(4));
        assert_eq!(err.to_string(), "Syntax error: unmatched bracket");
        assert_eq!(err.message(), "unmatched bracket");

        let err = CalcError::Numeric { literal: "9".repeat(400), offset: 0 };
        assert!(err.to_string().contains("out of range"));

        let err = ConfigError::ContainsWhitespace { symbol: "a b".to_string() };
        assert_eq!(err.to_string(), "Symbol 'a b' must not contain whitespace");
    }
}
