//! Calculator engine
//!
//! Owns a [`SymbolTable`] seeded with the default arithmetic operators and runs
//! expressions through the tokenizer, the shunting-yard converter and the
//! postfix evaluator. Registration needs `&mut self`; evaluation only `&self`,
//! so a configured calculator can be shared between threads.

use crate::config::{CalculatorConfig, OperatorConfig};
use crate::converter::{self, PostfixItem, ShuntingYard};
use crate::error::{CalcError, CalcResult, ConfigError};
use crate::evaluator::evaluate_postfix;
use crate::functions;
use crate::symbols::{
    ADDITIVE_PRIORITY, DEFAULT_DECIMAL_SEPARATOR, MULTIPLICATIVE_PRIORITY, SymbolTable,
    UNARY_PRIORITY,
};
use crate::tokenizer::{Lexeme, Tokenizer};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Stage of the evaluation pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Tokenizing,
    Converting,
    Evaluating,
}

impl PipelineStage {
    /// Stage at which an error of this kind is raised
    pub fn of(err: &CalcError) -> Self {
        match err {
            CalcError::Lex { .. } | CalcError::Numeric { .. } | CalcError::Config(_) => {
                PipelineStage::Tokenizing
            }
            CalcError::Syntax { .. } => PipelineStage::Converting,
            CalcError::Eval { .. } => PipelineStage::Evaluating,
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStage::Tokenizing => write!(f, "tokenizing"),
            PipelineStage::Converting => write!(f, "converting"),
            PipelineStage::Evaluating => write!(f, "evaluating"),
        }
    }
}

/// Main calculator engine for evaluating infix expressions
#[derive(Debug, Clone)]
pub struct Calculator {
    symbols: SymbolTable,
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new()
    }
}

impl Calculator {
    /// Create a calculator with the default operators and `.` as decimal separator
    pub fn new() -> Self {
        match Self::with_decimal_separator(DEFAULT_DECIMAL_SEPARATOR) {
            Ok(calculator) => calculator,
            Err(err) => unreachable!("default symbols are valid: {err}"),
        }
    }

    /// Create a calculator with the default operators and a custom decimal separator
    pub fn with_decimal_separator(separator: char) -> Result<Self, ConfigError> {
        let mut calculator = Self { symbols: SymbolTable::new(separator)? };

        calculator.register_binary_operator("+", |a, b| a + b, ADDITIVE_PRIORITY)?;
        calculator.register_binary_operator("-", |a, b| a - b, ADDITIVE_PRIORITY)?;
        calculator.register_binary_operator("*", |a, b| a * b, MULTIPLICATIVE_PRIORITY)?;
        calculator.register_binary_operator("/", |a, b| a / b, MULTIPLICATIVE_PRIORITY)?;
        calculator.register_unary_operator("-", |a| -a, UNARY_PRIORITY)?;
        calculator.register_bracket("(", ")")?;

        Ok(calculator)
    }

    /// Create a calculator with the defaults plus everything declared in `config`
    #[instrument(skip(config))]
    pub fn from_config(config: &CalculatorConfig) -> Result<Self, ConfigError> {
        let mut calculator = Self::with_decimal_separator(config.decimal_separator)?;

        for OperatorConfig { symbol, function, priority } in &config.binary {
            let func = functions::binary_function(function).ok_or_else(|| {
                ConfigError::UnknownFunction { name: function.clone(), arity: "binary" }
            })?;
            calculator.symbols.register_binary(symbol, func, *priority)?;
        }

        for OperatorConfig { symbol, function, priority } in &config.unary {
            let func = functions::unary_function(function).ok_or_else(|| {
                ConfigError::UnknownFunction { name: function.clone(), arity: "unary" }
            })?;
            calculator.symbols.register_unary(symbol, func, *priority)?;
        }

        for bracket in &config.brackets {
            calculator.register_bracket(&bracket.open, &bracket.close)?;
        }

        debug!(
            binary = calculator.symbols.binary_count(),
            unary = calculator.symbols.unary_count(),
            brackets = calculator.symbols.bracket_count(),
            "Built calculator from configuration"
        );
        Ok(calculator)
    }

    /// Register a binary operator
    pub fn register_binary_operator<F>(
        &mut self,
        symbol: &str,
        func: F,
        priority: u32,
    ) -> Result<(), ConfigError>
    where
        F: Fn(f64, f64) -> f64 + Send + Sync + 'static,
    {
        self.symbols.register_binary(symbol, Arc::new(func), priority)
    }

    /// Register a unary (prefix) operator
    pub fn register_unary_operator<F>(
        &mut self,
        symbol: &str,
        func: F,
        priority: u32,
    ) -> Result<(), ConfigError>
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        self.symbols.register_unary(symbol, Arc::new(func), priority)
    }

    /// Register a bracket pair
    pub fn register_bracket(&mut self, open: &str, close: &str) -> Result<(), ConfigError> {
        self.symbols.register_bracket(open, close)
    }

    /// Registered operators and brackets
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Evaluate an infix expression
    #[instrument(skip(self), level = "debug")]
    pub fn evaluate(&self, expression: &str) -> CalcResult<f64> {
        let result = self.postfix(expression).and_then(|items| evaluate_postfix(&items));

        match &result {
            Ok(value) => debug!(value, "Evaluated expression"),
            Err(err) => debug!(
                stage = %PipelineStage::of(err),
                category = err.category(),
                error = %err,
                "Expression evaluation failed"
            ),
        }
        result
    }

    /// Split an expression into classified lexemes
    pub fn tokenize<'a>(&'a self, expression: &'a str) -> CalcResult<Vec<Lexeme<'a>>> {
        Tokenizer::new(&self.symbols, expression).collect()
    }

    /// Postfix form of an expression, items separated by single spaces
    pub fn to_postfix(&self, expression: &str) -> CalcResult<String> {
        self.postfix(expression).map(|items| converter::render(&items))
    }

    fn postfix(&self, expression: &str) -> CalcResult<Vec<PostfixItem<'_>>> {
        if expression.trim().is_empty() {
            return Err(CalcError::syntax("empty expression", None));
        }

        ShuntingYard::new(&self.symbols).convert(Tokenizer::new(&self.symbols, expression))
    }
}
