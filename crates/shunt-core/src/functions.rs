//! Builtin numeric functions
//!
//! This module provides a library of named `f64` functions that hosts and
//! configuration files can bind to operator symbols without writing closures.

use std::ops::{Add, Div, Mul, Neg, Rem, Sub};
use std::sync::Arc;

/// Evaluation function of a binary operator: `(a, b) -> c`
pub type BinaryFn = Arc<dyn Fn(f64, f64) -> f64 + Send + Sync>;

/// Evaluation function of a unary operator: `(a) -> c`
pub type UnaryFn = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

const BINARY_FUNCTIONS: &[(&str, fn(f64, f64) -> f64)] = &[
    ("add", <f64 as Add>::add),
    ("sub", <f64 as Sub>::sub),
    ("mul", <f64 as Mul>::mul),
    ("div", <f64 as Div>::div),
    ("pow", f64::powf),
    ("rem", <f64 as Rem>::rem),
    ("min", f64::min),
    ("max", f64::max),
    ("hypot", f64::hypot),
    ("atan2", f64::atan2),
    // log(a, b) is the logarithm of a in base b
    ("log", f64::log),
];

const UNARY_FUNCTIONS: &[(&str, fn(f64) -> f64)] = &[
    ("neg", <f64 as Neg>::neg),
    ("abs", f64::abs),
    ("sqrt", f64::sqrt),
    ("cbrt", f64::cbrt),
    ("exp", f64::exp),
    ("ln", f64::ln),
    ("log10", f64::log10),
    ("sin", f64::sin),
    ("cos", f64::cos),
    ("tan", f64::tan),
    ("floor", f64::floor),
    ("ceil", f64::ceil),
    ("round", f64::round),
];

/// Look up a builtin binary function by name
pub fn binary_function(name: &str) -> Option<BinaryFn> {
    BINARY_FUNCTIONS
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, func)| {
            let func = *func;
            Arc::new(func) as BinaryFn
        })
}

/// Look up a builtin unary function by name
pub fn unary_function(name: &str) -> Option<UnaryFn> {
    UNARY_FUNCTIONS
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, func)| {
            let func = *func;
            Arc::new(func) as UnaryFn
        })
}

/// Names of all builtin functions, binary first
pub fn builtin_names() -> Vec<&'static str> {
    BINARY_FUNCTIONS
        .iter()
        .map(|(name, _)| *name)
        .chain(UNARY_FUNCTIONS.iter().map(|(name, _)| *name))
        .collect()
}
