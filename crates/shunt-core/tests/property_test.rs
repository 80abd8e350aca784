use proptest::prelude::*;
use shunt_core::{Calculator, Lexeme, LexemeKind};

#[derive(Debug, Clone)]
enum Expr {
    Literal(u32),
    Negate(Box<Expr>),
    Binary(Box<Expr>, char, Box<Expr>),
}

impl Expr {
    fn render(&self) -> String {
        match self {
            Expr::Literal(value) => value.to_string(),
            Expr::Negate(inner) => format!("-{}", inner.render()),
            Expr::Binary(left, op, right) => {
                format!("({} {op} {})", left.render(), right.render())
            }
        }
    }

    fn value(&self) -> f64 {
        match self {
            Expr::Literal(value) => f64::from(*value),
            Expr::Negate(inner) => -inner.value(),
            Expr::Binary(left, op, right) => {
                let (a, b) = (left.value(), right.value());
                match op {
                    '+' => a + b,
                    '-' => a - b,
                    '*' => a * b,
                    _ => a / b,
                }
            }
        }
    }
}

fn expr_strategy() -> impl Strategy<Value = Expr> {
    let leaf = (0u32..1000).prop_map(Expr::Literal);
    leaf.prop_recursive(6, 64, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(|e| Expr::Negate(Box::new(e))),
            (inner.clone(), prop::sample::select(vec!['+', '-', '*', '/']), inner)
                .prop_map(|(l, op, r)| Expr::Binary(Box::new(l), op, Box::new(r))),
        ]
    })
}

/// Sum of products evaluated left to right with `*` binding tighter
fn flat_value(first: u32, rest: &[(char, u32)]) -> f64 {
    let mut total = 0.0;
    let mut pending_op = '+';
    let mut term = f64::from(first);

    for &(op, value) in rest {
        if op == '*' {
            term *= f64::from(value);
            continue;
        }
        total = if pending_op == '+' { total + term } else { total - term };
        pending_op = op;
        term = f64::from(value);
    }

    if pending_op == '+' { total + term } else { total - term }
}

fn kinds(lexemes: &[Lexeme<'_>]) -> Vec<LexemeKind> {
    lexemes.iter().map(|l| l.kind).collect()
}

fn same_value(actual: f64, expected: f64) -> bool {
    (actual.is_nan() && expected.is_nan()) || actual == expected
}

proptest! {
    #[test]
    fn bracketed_expressions_match_direct_evaluation(expr in expr_strategy()) {
        let calculator = Calculator::new();
        let rendered = expr.render();

        let actual = calculator.evaluate(&rendered).unwrap();
        let expected = expr.value();
        prop_assert!(same_value(actual, expected), "{rendered}: {actual} != {expected}");
    }

    #[test]
    fn precedence_and_left_associativity(
        first in 0u32..50,
        rest in prop::collection::vec((prop::sample::select(vec!['+', '-', '*']), 0u32..50), 0..10),
    ) {
        let calculator = Calculator::new();
        let mut expression = first.to_string();
        for (op, value) in &rest {
            expression.push_str(&format!("{op}{value}"));
        }

        let actual = calculator.evaluate(&expression).unwrap();
        prop_assert_eq!(actual, flat_value(first, &rest));
    }

    #[test]
    fn whitespace_between_lexemes_is_insignificant(expr in expr_strategy(), pad in 0usize..4) {
        let calculator = Calculator::new();
        let compact = expr.render().replace(' ', "");

        let lexemes = calculator.tokenize(&compact).unwrap();
        let separator = " ".repeat(pad);
        let spaced = lexemes.iter().map(ToString::to_string).collect::<Vec<_>>().join(&separator);

        let respaced = calculator.tokenize(&spaced).unwrap();
        prop_assert_eq!(kinds(&lexemes), kinds(&respaced));
    }

    #[test]
    fn arbitrary_input_never_panics(input in "[0-9+*/() .,&-]{0,40}") {
        let calculator = Calculator::new();
        let _ = calculator.evaluate(&input);
        let _ = calculator.to_postfix(&input);
    }
}
