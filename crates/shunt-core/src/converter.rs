//! Infix to postfix conversion
//!
//! Shunting-yard over the lexeme stream. Operators of equal priority are
//! emitted left to right; prefix operators never pop the stack because they
//! have no left operand yet. Brackets are matched by their registered pairing.

use crate::error::{CalcError, CalcResult};
use crate::symbols::{BinaryOperator, Bracket, SymbolTable, UnaryOperator};
use crate::tokenizer::{Lexeme, LexemeKind};
use std::fmt;

/// One element of a postfix program, borrowing operators from the symbol table
#[derive(Debug, Clone, Copy)]
pub enum PostfixItem<'t> {
    Number(f64),
    Binary(&'t BinaryOperator),
    Unary(&'t UnaryOperator),
}

impl fmt::Display for PostfixItem<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostfixItem::Number(value) => write!(f, "{value}"),
            PostfixItem::Binary(op) => f.write_str(op.symbol()),
            PostfixItem::Unary(op) => f.write_str(op.symbol()),
        }
    }
}

#[derive(Debug)]
enum StackEntry<'t> {
    Bracket { bracket: &'t Bracket, offset: usize },
    Binary(&'t BinaryOperator),
    Unary(&'t UnaryOperator),
}

impl<'t> StackEntry<'t> {
    /// Postfix item for an operator entry, `None` for brackets
    fn into_item(self) -> Option<PostfixItem<'t>> {
        match self {
            StackEntry::Binary(op) => Some(PostfixItem::Binary(op)),
            StackEntry::Unary(op) => Some(PostfixItem::Unary(op)),
            StackEntry::Bracket { .. } => None,
        }
    }

    fn priority(&self) -> Option<u32> {
        match self {
            StackEntry::Binary(op) => Some(op.priority()),
            StackEntry::Unary(op) => Some(op.priority()),
            StackEntry::Bracket { .. } => None,
        }
    }
}

/// Shunting-yard converter bound to one symbol table
#[derive(Debug)]
pub struct ShuntingYard<'t> {
    table: &'t SymbolTable,
    output: Vec<PostfixItem<'t>>,
    stack: Vec<StackEntry<'t>>,
}

impl<'t> ShuntingYard<'t> {
    pub fn new(table: &'t SymbolTable) -> Self {
        Self { table, output: Vec::new(), stack: Vec::new() }
    }

    /// Convert a lexeme stream, stopping at the first lexical or syntax error
    pub fn convert<'a, I>(mut self, lexemes: I) -> CalcResult<Vec<PostfixItem<'t>>>
    where
        I: IntoIterator<Item = CalcResult<Lexeme<'a>>>,
    {
        for lexeme in lexemes {
            self.push(lexeme?)?;
        }
        self.finish()
    }

    fn push(&mut self, lexeme: Lexeme<'_>) -> CalcResult<()> {
        match lexeme.kind {
            LexemeKind::Number(value) => self.output.push(PostfixItem::Number(value)),

            LexemeKind::OpenBracket => {
                let bracket = self
                    .table
                    .bracket_by_open(lexeme.text)
                    .ok_or_else(|| unknown_symbol(&lexeme))?;
                self.stack.push(StackEntry::Bracket { bracket, offset: lexeme.offset });
            }

            LexemeKind::UnaryOp => {
                let op = self.table.unary(lexeme.text).ok_or_else(|| unknown_symbol(&lexeme))?;
                self.stack.push(StackEntry::Unary(op));
            }

            LexemeKind::BinaryOp => {
                let op = self.table.binary(lexeme.text).ok_or_else(|| unknown_symbol(&lexeme))?;
                self.pop_while_at_least(op.priority());
                self.stack.push(StackEntry::Binary(op));
            }

            LexemeKind::CloseBracket => self.close_bracket(&lexeme)?,
        }

        Ok(())
    }

    /// Move operators with priority >= `priority` to the output, up to the
    /// nearest open bracket
    fn pop_while_at_least(&mut self, priority: u32) {
        while let Some(top) = self.stack.last() {
            match top.priority() {
                Some(top_priority) if top_priority >= priority => {
                    if let Some(item) = self.stack.pop().and_then(StackEntry::into_item) {
                        self.output.push(item);
                    }
                }
                _ => break,
            }
        }
    }

    fn close_bracket(&mut self, lexeme: &Lexeme<'_>) -> CalcResult<()> {
        let closing = self
            .table
            .bracket_by_close(lexeme.text)
            .ok_or_else(|| unknown_symbol(lexeme))?;

        loop {
            match self.stack.pop() {
                None => {
                    return Err(CalcError::syntax("unmatched bracket", Some(lexeme.offset)));
                }
                Some(StackEntry::Bracket { bracket, .. }) if bracket == closing => return Ok(()),
                Some(StackEntry::Bracket { .. }) => {
                    return Err(CalcError::syntax("mismatched bracket", Some(lexeme.offset)));
                }
                Some(entry) => {
                    if let Some(item) = entry.into_item() {
                        self.output.push(item);
                    }
                }
            }
        }
    }

    fn finish(mut self) -> CalcResult<Vec<PostfixItem<'t>>> {
        while let Some(entry) = self.stack.pop() {
            if let StackEntry::Bracket { offset, .. } = entry {
                return Err(CalcError::syntax("unmatched open bracket", Some(offset)));
            }
            if let Some(item) = entry.into_item() {
                self.output.push(item);
            }
        }

        Ok(self.output)
    }
}

fn unknown_symbol(lexeme: &Lexeme<'_>) -> CalcError {
    CalcError::lex("illegal expression", lexeme.offset)
}

/// Render a postfix program with single spaces between items
pub fn render(items: &[PostfixItem<'_>]) -> String {
    items.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::Calculator;
    use crate::tokenizer::Tokenizer;

    fn postfix(calculator: &Calculator, input: &str) -> CalcResult<String> {
        let table = calculator.symbols();
        let items = ShuntingYard::new(table).convert(Tokenizer::new(table, input))?;
        Ok(render(&items))
    }

    #[test]
    fn test_priority_ordering() {
        let calculator = Calculator::new();
        assert_eq!(postfix(&calculator, "2+2*2").unwrap(), "2 2 2 * +");
        assert_eq!(postfix(&calculator, "(2+2)*2").unwrap(), "2 2 + 2 *");
    }

    #[test]
    fn test_equal_priority_is_left_associative() {
        let calculator = Calculator::new();
        assert_eq!(postfix(&calculator, "8-3-2").unwrap(), "8 3 - 2 -");
        assert_eq!(postfix(&calculator, "8/4*2").unwrap(), "8 4 / 2 *");
    }

    #[test]
    fn test_prefix_operators() {
        let calculator = Calculator::new();
        assert_eq!(postfix(&calculator, "-3+2").unwrap(), "3 - 2 +");
        assert_eq!(postfix(&calculator, "--8").unwrap(), "8 - -");
        assert_eq!(postfix(&calculator, "2*-3").unwrap(), "2 3 - *");
    }

    #[test]
    fn test_bracket_errors() {
        let mut calculator = Calculator::new();
        calculator.register_bracket("[", "]").unwrap();

        let err = postfix(&calculator, "(2+3").unwrap_err();
        assert_eq!(err, CalcError::syntax("unmatched open bracket", Some(0)));

        let err = postfix(&calculator, "2+3)").unwrap_err();
        assert_eq!(err, CalcError::syntax("unmatched bracket", Some(3)));

        let err = postfix(&calculator, "(2.4 + 4 - [5 - 4)]").unwrap_err();
        assert_eq!(err.message(), "mismatched bracket");

        let err = postfix(&calculator, "(2.4 + [4 - 5]] - 4)").unwrap_err();
        assert_eq!(err.message(), "mismatched bracket");
    }

    #[test]
    fn test_nested_brackets_of_different_kinds() {
        let mut calculator = Calculator::new();
        calculator.register_bracket("[", "]").unwrap();
        assert_eq!(postfix(&calculator, "[1+(2-3)]*4").unwrap(), "1 2 3 - + 4 *");
    }

    #[test]
    fn test_lexical_errors_propagate() {
        let calculator = Calculator::new();
        let err = postfix(&calculator, "(1 + 2) $").unwrap_err();
        assert_eq!(err, CalcError::lex("illegal expression", 8));
    }
}
