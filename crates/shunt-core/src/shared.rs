//! Thread-safe calculator handle for hosts that register operators after
//! evaluation has started. Registration takes the write lock, evaluation the
//! read lock.

use crate::calculator::Calculator;
use crate::error::{CalcResult, ConfigError};
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Debug, Clone, Default)]
pub struct SharedCalculator {
    inner: Arc<RwLock<Calculator>>,
}

impl From<Calculator> for SharedCalculator {
    fn from(calculator: Calculator) -> Self {
        Self { inner: Arc::new(RwLock::new(calculator)) }
    }
}

impl SharedCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    // Registration validates before mutating, so a poisoned lock still guards
    // a consistent table.
    pub fn evaluate(&self, expression: &str) -> CalcResult<f64> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).evaluate(expression)
    }

    pub fn register_binary_operator<F>(
        &self,
        symbol: &str,
        func: F,
        priority: u32,
    ) -> Result<(), ConfigError>
    where
        F: Fn(f64, f64) -> f64 + Send + Sync + 'static,
    {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .register_binary_operator(symbol, func, priority)
    }

    pub fn register_unary_operator<F>(
        &self,
        symbol: &str,
        func: F,
        priority: u32,
    ) -> Result<(), ConfigError>
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .register_unary_operator(symbol, func, priority)
    }

    pub fn register_bracket(&self, open: &str, close: &str) -> Result<(), ConfigError> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner).register_bracket(open, close)
    }

    /// Copy of the current calculator state
    pub fn snapshot(&self) -> Calculator {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}
