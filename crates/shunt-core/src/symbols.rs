//! Operator and bracket registry
//!
//! The symbol table owns every registered binary operator, unary operator and
//! bracket pair. Validation happens at registration time so that the set of
//! literal symbols stays pairwise distinct, which keeps greedy longest-match
//! scanning unambiguous. Binary and unary operators live in separate tables;
//! the tokenizer decides which one a symbol refers to from its lexical context.

use crate::error::ConfigError;
use crate::functions::{BinaryFn, UnaryFn};
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, trace};

/// Decimal separator used when none is configured
pub const DEFAULT_DECIMAL_SEPARATOR: char = '.';

/// Priority of the default additive operators
pub const ADDITIVE_PRIORITY: u32 = 10;
/// Priority of the default multiplicative operators
pub const MULTIPLICATIVE_PRIORITY: u32 = 20;
/// Priority of the default unary minus
pub const UNARY_PRIORITY: u32 = 30;

/// A registered binary operator
#[derive(Clone)]
pub struct BinaryOperator {
    symbol: String,
    priority: u32,
    func: BinaryFn,
}

impl BinaryOperator {
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn priority(&self) -> u32 {
        self.priority
    }

    /// Apply the operator to `a` (left) and `b` (right)
    pub fn apply(&self, a: f64, b: f64) -> f64 {
        (self.func)(a, b)
    }
}

impl fmt::Debug for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinaryOperator")
            .field("symbol", &self.symbol)
            .field("priority", &self.priority)
            .finish()
    }
}

/// A registered unary (prefix) operator
#[derive(Clone)]
pub struct UnaryOperator {
    symbol: String,
    priority: u32,
    func: UnaryFn,
}

impl UnaryOperator {
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn priority(&self) -> u32 {
        self.priority
    }

    pub fn apply(&self, a: f64) -> f64 {
        (self.func)(a)
    }
}

impl fmt::Debug for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnaryOperator")
            .field("symbol", &self.symbol)
            .field("priority", &self.priority)
            .finish()
    }
}

/// An open/close bracket pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bracket {
    open: String,
    close: String,
}

impl Bracket {
    pub fn open(&self) -> &str {
        &self.open
    }

    pub fn close(&self) -> &str {
        &self.close
    }
}

/// Registry of operators and brackets, plus the matcher derived from them
#[derive(Clone)]
pub struct SymbolTable {
    binary: HashMap<String, BinaryOperator>,
    unary: HashMap<String, UnaryOperator>,
    brackets: Vec<Bracket>,
    decimal_separator: char,
    matcher: Regex,
}

impl fmt::Debug for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymbolTable")
            .field("binary", &self.binary.values().collect::<Vec<_>>())
            .field("unary", &self.unary.values().collect::<Vec<_>>())
            .field("brackets", &self.brackets)
            .field("decimal_separator", &self.decimal_separator)
            .finish()
    }
}

impl SymbolTable {
    /// Create an empty table using `decimal_separator` for number literals
    pub fn new(decimal_separator: char) -> Result<Self, ConfigError> {
        if !matches!(decimal_separator, '.' | ',') {
            return Err(ConfigError::InvalidSeparator { separator: decimal_separator });
        }

        let matcher = build_matcher(decimal_separator, &[])?;
        Ok(Self {
            binary: HashMap::new(),
            unary: HashMap::new(),
            brackets: Vec::new(),
            decimal_separator,
            matcher,
        })
    }

    /// Register a binary operator. Re-registering an existing binary symbol is
    /// a no-op and the first registration wins.
    pub fn register_binary(
        &mut self,
        symbol: &str,
        func: BinaryFn,
        priority: u32,
    ) -> Result<(), ConfigError> {
        self.validate_operator(symbol)?;

        if self.binary.contains_key(symbol) {
            trace!(symbol, "Binary operator already registered");
            return Ok(());
        }

        self.binary.insert(
            symbol.to_string(),
            BinaryOperator { symbol: symbol.to_string(), priority, func },
        );
        if let Err(err) = self.rebuild_matcher() {
            self.binary.remove(symbol);
            return Err(err);
        }

        debug!(symbol, priority, "Registered binary operator");
        Ok(())
    }

    /// Register a unary operator. The symbol may also name a binary operator;
    /// the two are kept in separate tables.
    pub fn register_unary(
        &mut self,
        symbol: &str,
        func: UnaryFn,
        priority: u32,
    ) -> Result<(), ConfigError> {
        self.validate_operator(symbol)?;

        if self.unary.contains_key(symbol) {
            trace!(symbol, "Unary operator already registered");
            return Ok(());
        }

        self.unary.insert(
            symbol.to_string(),
            UnaryOperator { symbol: symbol.to_string(), priority, func },
        );
        if let Err(err) = self.rebuild_matcher() {
            self.unary.remove(symbol);
            return Err(err);
        }

        debug!(symbol, priority, "Registered unary operator");
        Ok(())
    }

    /// Register a bracket pair. Registering an identical pair twice is a no-op.
    pub fn register_bracket(&mut self, open: &str, close: &str) -> Result<(), ConfigError> {
        self.validate_format(open)?;
        self.validate_format(close)?;

        if self.brackets.iter().any(|b| b.open == open && b.close == close) {
            trace!(open, close, "Bracket pair already registered");
            return Ok(());
        }

        if open == close {
            return Err(ConfigError::IdenticalBracketPair { symbol: open.to_string() });
        }

        for symbol in [open, close] {
            if self.brackets.iter().any(|b| b.open == symbol || b.close == symbol) {
                return Err(ConfigError::OverlappingBracket { symbol: symbol.to_string() });
            }
            if self.is_operator(symbol) {
                return Err(ConfigError::CollidesWithOperator { symbol: symbol.to_string() });
            }
        }

        self.brackets.push(Bracket { open: open.to_string(), close: close.to_string() });
        if let Err(err) = self.rebuild_matcher() {
            self.brackets.pop();
            return Err(err);
        }

        debug!(open, close, "Registered bracket pair");
        Ok(())
    }

    pub fn binary(&self, symbol: &str) -> Option<&BinaryOperator> {
        self.binary.get(symbol)
    }

    pub fn unary(&self, symbol: &str) -> Option<&UnaryOperator> {
        self.unary.get(symbol)
    }

    pub fn bracket_by_open(&self, open: &str) -> Option<&Bracket> {
        self.brackets.iter().find(|b| b.open == open)
    }

    pub fn bracket_by_close(&self, close: &str) -> Option<&Bracket> {
        self.brackets.iter().find(|b| b.close == close)
    }

    pub fn binary_count(&self) -> usize {
        self.binary.len()
    }

    pub fn unary_count(&self) -> usize {
        self.unary.len()
    }

    pub fn bracket_count(&self) -> usize {
        self.brackets.len()
    }

    pub fn decimal_separator(&self) -> char {
        self.decimal_separator
    }

    /// Every distinct literal symbol, longest first
    pub fn symbols(&self) -> Vec<&str> {
        let mut symbols: Vec<&str> = self
            .binary
            .keys()
            .chain(self.unary.keys())
            .map(String::as_str)
            .chain(self.brackets.iter().flat_map(|b| [b.open.as_str(), b.close.as_str()]))
            .collect();

        symbols.sort_unstable_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        symbols.dedup();
        symbols
    }

    /// Matcher for a single lexeme anchored at the start of the haystack.
    /// Group `number` captures literals, group `symbol` registered symbols.
    pub(crate) fn matcher(&self) -> &Regex {
        &self.matcher
    }

    fn rebuild_matcher(&mut self) -> Result<(), ConfigError> {
        let matcher = build_matcher(self.decimal_separator, &self.symbols())?;
        self.matcher = matcher;
        Ok(())
    }

    fn is_operator(&self, symbol: &str) -> bool {
        self.binary.contains_key(symbol) || self.unary.contains_key(symbol)
    }

    fn is_bracket(&self, symbol: &str) -> bool {
        self.brackets.iter().any(|b| b.open == symbol || b.close == symbol)
    }

    fn validate_operator(&self, symbol: &str) -> Result<(), ConfigError> {
        self.validate_format(symbol)?;

        if self.is_bracket(symbol) {
            return Err(ConfigError::CollidesWithBracket { symbol: symbol.to_string() });
        }

        Ok(())
    }

    fn validate_format(&self, symbol: &str) -> Result<(), ConfigError> {
        if symbol.trim().is_empty() {
            return Err(ConfigError::EmptySymbol);
        }

        if symbol.chars().any(char::is_whitespace) {
            return Err(ConfigError::ContainsWhitespace { symbol: symbol.to_string() });
        }

        if symbol.chars().any(|c| c.is_ascii_digit() || c == self.decimal_separator) {
            return Err(ConfigError::NumberLike { symbol: symbol.to_string() });
        }

        Ok(())
    }
}

fn build_matcher(decimal_separator: char, symbols: &[&str]) -> Result<Regex, ConfigError> {
    let separator = regex::escape(&decimal_separator.to_string());
    let mut pattern = format!(r"\A(?:(?P<number>[0-9]+(?:{separator}[0-9]+)?)");

    if !symbols.is_empty() {
        let alternatives: Vec<String> = symbols.iter().map(|s| regex::escape(s)).collect();
        pattern.push_str("|(?P<symbol>");
        pattern.push_str(&alternatives.join("|"));
        pattern.push(')');
    }
    pattern.push(')');

    Regex::new(&pattern).map_err(|e| ConfigError::Matcher { message: e.to_string() })
}
