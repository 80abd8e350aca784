//! Lexeme scanner
//!
//! Splits an expression into numbers, operators and brackets using the matcher
//! derived from the current [`SymbolTable`]. Scanning is greedy: at each
//! position the number grammar is tried first, then the longest registered
//! symbol. Operators are classified as unary or binary from the previous
//! lexeme, so the same visible symbol can play both roles.

use crate::error::{CalcError, CalcResult};
use crate::symbols::SymbolTable;
use std::fmt;

/// Classification of a lexeme
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LexemeKind {
    Number(f64),
    OpenBracket,
    CloseBracket,
    BinaryOp,
    UnaryOp,
}

impl LexemeKind {
    /// Whether an operator following this lexeme takes it as a left operand
    fn ends_operand(self) -> bool {
        matches!(self, LexemeKind::Number(_) | LexemeKind::CloseBracket)
    }
}

/// A classified slice of the input
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lexeme<'a> {
    pub kind: LexemeKind,
    pub text: &'a str,
    /// Byte offset of `text` in the expression
    pub offset: usize,
}

impl fmt::Display for Lexeme<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text)
    }
}

/// Lazy lexeme iterator over one expression.
///
/// Yields `Err` at most once; iteration stops after the first failure.
/// Cloning the iterator or calling [`Tokenizer::restart`] replays the scan.
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    table: &'a SymbolTable,
    input: &'a str,
    position: usize,
    previous: Option<LexemeKind>,
    failed: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(table: &'a SymbolTable, input: &'a str) -> Self {
        Self { table, input, position: 0, previous: None, failed: false }
    }

    /// Rewind to the start of the expression
    pub fn restart(&mut self) {
        self.position = 0;
        self.previous = None;
        self.failed = false;
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.input[self.position..];
        let trimmed = rest.trim_start();
        self.position += rest.len() - trimmed.len();
    }

    fn scan(&mut self) -> CalcResult<Lexeme<'a>> {
        let start = self.position;
        let rest = &self.input[start..];
        let separator = self.table.decimal_separator();

        let Some(captures) = self.table.matcher().captures(rest) else {
            let mut chars = rest.chars();
            let malformed = chars.next() == Some(separator)
                && (chars.next().is_some_and(|c| c.is_ascii_digit())
                    || self.previous.is_some_and(|kind| matches!(kind, LexemeKind::Number(_))));
            return Err(if malformed {
                CalcError::lex("malformed number literal", start)
            } else {
                CalcError::lex("illegal expression", start)
            });
        };

        if let Some(number) = captures.name("number") {
            let text = number.as_str();
            self.position = start + text.len();

            if self.input[self.position..].starts_with(separator) {
                return Err(CalcError::lex("malformed number literal", start));
            }

            let value = parse_number(text, separator, start)?;
            return Ok(Lexeme { kind: LexemeKind::Number(value), text, offset: start });
        }

        let text = captures.name("symbol").map(|m| m.as_str()).unwrap_or_default();
        if text.is_empty() {
            return Err(CalcError::lex("illegal expression", start));
        }
        self.position = start + text.len();

        let kind = self.classify(text, start)?;
        Ok(Lexeme { kind, text, offset: start })
    }

    fn classify(&self, text: &str, offset: usize) -> CalcResult<LexemeKind> {
        if self.table.bracket_by_open(text).is_some() {
            return Ok(LexemeKind::OpenBracket);
        }
        if self.table.bracket_by_close(text).is_some() {
            return Ok(LexemeKind::CloseBracket);
        }

        let infix = self.previous.is_some_and(LexemeKind::ends_operand);
        let is_binary = self.table.binary(text).is_some();
        let is_unary = self.table.unary(text).is_some();

        match (is_binary, is_unary) {
            (true, _) if infix => Ok(LexemeKind::BinaryOp),
            (_, true) => Ok(LexemeKind::UnaryOp),
            _ => Err(CalcError::lex("illegal expression", offset)),
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = CalcResult<Lexeme<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        self.skip_whitespace();
        if self.position >= self.input.len() {
            return None;
        }

        match self.scan() {
            Ok(lexeme) => {
                self.previous = Some(lexeme.kind);
                Some(Ok(lexeme))
            }
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

fn parse_number(text: &str, separator: char, offset: usize) -> CalcResult<f64> {
    let normalized = if separator == '.' { text.to_string() } else { text.replace(separator, ".") };

    let value: f64 = normalized
        .parse()
        .map_err(|_| CalcError::lex("malformed number literal", offset))?;

    if !value.is_finite() {
        return Err(CalcError::Numeric { literal: text.to_string(), offset });
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::Calculator;
    use crate::error::ErrorKind;

    fn lex(calculator: &Calculator, input: &str) -> CalcResult<Vec<(LexemeKind, String)>> {
        Tokenizer::new(calculator.symbols(), input)
            .map(|r| r.map(|l| (l.kind, l.text.to_string())))
            .collect()
    }

    #[test]
    fn test_basic_tokenization() {
        let calculator = Calculator::new();
        let lexemes = lex(&calculator, " ( 2.7 + 4)*3 \n\t").unwrap();

        assert_eq!(
            lexemes,
            vec![
                (LexemeKind::OpenBracket, "(".to_string()),
                (LexemeKind::Number(2.7), "2.7".to_string()),
                (LexemeKind::BinaryOp, "+".to_string()),
                (LexemeKind::Number(4.0), "4".to_string()),
                (LexemeKind::CloseBracket, ")".to_string()),
                (LexemeKind::BinaryOp, "*".to_string()),
                (LexemeKind::Number(3.0), "3".to_string()),
            ]
        );
    }

    #[test]
    fn test_unary_disambiguation() {
        let calculator = Calculator::new();
        let kinds: Vec<LexemeKind> =
            lex(&calculator, "-3-(-2)").unwrap().into_iter().map(|(k, _)| k).collect();

        assert_eq!(
            kinds,
            vec![
                LexemeKind::UnaryOp,
                LexemeKind::Number(3.0),
                LexemeKind::BinaryOp,
                LexemeKind::OpenBracket,
                LexemeKind::UnaryOp,
                LexemeKind::Number(2.0),
                LexemeKind::CloseBracket,
            ]
        );
    }

    #[test]
    fn test_binary_without_unary_form_is_rejected() {
        let calculator = Calculator::new();

        let err = lex(&calculator, "(2 + +4)").unwrap_err();
        assert_eq!(err, CalcError::lex("illegal expression", 5));

        let err = lex(&calculator, "*3").unwrap_err();
        assert_eq!(err.offset(), Some(0));
    }

    #[test]
    fn test_longest_match_wins() {
        let mut calculator = Calculator::new();
        calculator.register_binary_operator("**", f64::powf, 30).unwrap();

        let lexemes = lex(&calculator, "2**3*4").unwrap();
        let texts: Vec<&str> = lexemes.iter().map(|(_, t)| t.as_str()).collect();
        assert_eq!(texts, vec!["2", "**", "3", "*", "4"]);
    }

    #[test]
    fn test_multi_character_brackets() {
        let mut calculator = Calculator::new();
        calculator.register_bracket("@--", "--@").unwrap();

        let kinds: Vec<LexemeKind> =
            lex(&calculator, "@--1--@").unwrap().into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            kinds,
            vec![LexemeKind::OpenBracket, LexemeKind::Number(1.0), LexemeKind::CloseBracket]
        );
    }

    #[test]
    fn test_illegal_characters() {
        let calculator = Calculator::new();

        let err = lex(&calculator, "2&3").unwrap_err();
        assert_eq!(err, CalcError::lex("illegal expression", 1));

        let err = lex(&calculator, "(2.4 + 4) - [5 - 4]").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Lex);
        assert_eq!(err.offset(), Some(12));
    }

    #[test]
    fn test_malformed_number_literals() {
        let calculator = Calculator::new();

        for input in ["(2.4.7 + 4)", "(2. + 4)", ".5 + 1", "3 + .5"] {
            let err = lex(&calculator, input).unwrap_err();
            assert_eq!(err.message(), "malformed number literal", "input: {input}");
        }
    }

    #[test]
    fn test_number_overflow() {
        let calculator = Calculator::new();
        let literal = "9".repeat(400);

        let err = lex(&calculator, &format!("1 + {literal}")).unwrap_err();
        assert_eq!(err, CalcError::Numeric { literal, offset: 4 });
        assert_eq!(err.kind(), ErrorKind::Numeric);
    }

    #[test]
    fn test_comma_separator() {
        let calculator = Calculator::with_decimal_separator(',').unwrap();
        let lexemes = lex(&calculator, "2,7 * 2").unwrap();
        assert_eq!(lexemes[0].0, LexemeKind::Number(2.7));

        let err = lex(&calculator, "2.7").unwrap_err();
        assert_eq!(err.message(), "illegal expression");
    }

    #[test]
    fn test_restart_replays_scan() {
        let calculator = Calculator::new();
        let mut tokenizer = Tokenizer::new(calculator.symbols(), "1 + 2");

        let first: Vec<_> = tokenizer.by_ref().collect();
        assert!(tokenizer.next().is_none());

        tokenizer.restart();
        let second: Vec<_> = tokenizer.collect();
        assert_eq!(first, second);
        assert_eq!(second.len(), 3);
    }

    #[test]
    fn test_stops_after_first_error() {
        let calculator = Calculator::new();
        let results: Vec<_> = Tokenizer::new(calculator.symbols(), "1 & 2 & 3").collect();

        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }
}
