//! Postfix evaluation
//!
//! Reduces a postfix program on a value stack. For a binary operator the value
//! pushed last is the right-hand operand.

use crate::converter::PostfixItem;
use crate::error::{CalcError, CalcResult};

/// Evaluate a postfix program to a single value
pub fn evaluate_postfix(items: &[PostfixItem<'_>]) -> CalcResult<f64> {
    let mut values: Vec<f64> = Vec::with_capacity(items.len());

    for item in items {
        match item {
            PostfixItem::Number(value) => values.push(*value),

            PostfixItem::Binary(op) => {
                let (Some(b), Some(a)) = (values.pop(), values.pop()) else {
                    return Err(CalcError::eval("insufficient operands"));
                };
                values.push(op.apply(a, b));
            }

            PostfixItem::Unary(op) => {
                let a = values.pop().ok_or_else(|| CalcError::eval("insufficient operands"))?;
                values.push(op.apply(a));
            }
        }
    }

    match values.as_slice() {
        [result] => Ok(*result),
        _ => Err(CalcError::eval("malformed expression")),
    }
}
