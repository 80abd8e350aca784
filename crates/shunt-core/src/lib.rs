#![deny(warnings)]
//! Extensible infix arithmetic evaluator.
//!
//! A [`Calculator`] evaluates infix expressions over `f64` using a set of
//! operators and bracket pairs that callers can extend at runtime. Evaluation
//! runs in three stages: the [`tokenizer`] scans lexemes with greedy
//! longest-match, the [`converter`] reorders them into postfix with the
//! shunting-yard algorithm, and the [`evaluator`] reduces the postfix program
//! on a value stack.
//!
//! ```
//! use shunt_core::Calculator;
//!
//! let mut calculator = Calculator::new();
//! calculator.register_binary_operator("**", f64::powf, 30).unwrap();
//! calculator.register_bracket("[", "]").unwrap();
//!
//! assert_eq!(calculator.evaluate("[2 + 3] * 4").unwrap(), 20.0);
//! assert_eq!(calculator.evaluate("-2**3").unwrap(), -8.0);
//! ```

/// Calculator engine and evaluation pipeline
pub mod calculator;
/// TOML configuration for extra operators and brackets
pub mod config;
/// Infix to postfix conversion
pub mod converter;
/// Error types for registration and evaluation
pub mod error;
/// Postfix evaluation
pub mod evaluator;
/// Builtin numeric functions
pub mod functions;
/// Thread-safe calculator handle
pub mod shared;
/// Operator and bracket registry
pub mod symbols;
/// Lexeme scanner
pub mod tokenizer;

pub use calculator::{Calculator, PipelineStage};
pub use config::CalculatorConfig;
pub use error::{CalcError, CalcResult, ConfigError, ErrorKind};
pub use shared::SharedCalculator;
pub use symbols::SymbolTable;
pub use tokenizer::{Lexeme, LexemeKind};
