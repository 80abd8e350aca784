//! Calculator configuration
//!
//! Declares extra operators and brackets in TOML, binding operator symbols to
//! functions from the builtin library:
//!
//! ```toml
//! decimal_separator = ","
//!
//! [[binary]]
//! symbol = "**"
//! function = "pow"
//! priority = 30
//!
//! [[brackets]]
//! open = "["
//! close = "]"
//! ```

use crate::error::ConfigError;
use crate::symbols::DEFAULT_DECIMAL_SEPARATOR;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Environment variable holding the path of a configuration file
pub const CONFIG_ENV_VAR: &str = "SHUNT_CONFIG";

/// Operator bound to a builtin function
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OperatorConfig {
    pub symbol: String,
    pub function: String,
    pub priority: u32,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BracketConfig {
    pub open: String,
    pub close: String,
}

/// Operators and brackets registered on top of the defaults
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct CalculatorConfig {
    pub decimal_separator: char,
    pub binary: Vec<OperatorConfig>,
    pub unary: Vec<OperatorConfig>,
    pub brackets: Vec<BracketConfig>,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            decimal_separator: DEFAULT_DECIMAL_SEPARATOR,
            binary: Vec::new(),
            unary: Vec::new(),
            brackets: Vec::new(),
        }
    }
}

impl CalculatorConfig {
    /// Parse configuration from a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|e| ConfigError::InvalidFile { message: e.to_string() })
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|e| ConfigError::InvalidFile {
            message: format!("failed to read {}: {e}", path.display()),
        })?;

        let config = Self::from_toml_str(&source)?;
        info!(
            path = %path.display(),
            binary = config.binary.len(),
            unary = config.unary.len(),
            brackets = config.brackets.len(),
            "Loaded calculator configuration"
        );
        Ok(config)
    }

    /// Load the file named by `SHUNT_CONFIG`, or the defaults when it is unset
    pub fn from_environment() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path),
            _ => {
                debug!("No configuration file set, using defaults");
                Ok(Self::default())
            }
        }
    }
}
