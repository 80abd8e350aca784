use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use shunt_core::{CalcError, Calculator, CalculatorConfig};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directives
const LOG_ENV_VAR: &str = "SHUNT_LOG";

/// shunt evaluates infix arithmetic expressions, reading them from the command
/// line or, when none are given, from standard input one per line.
#[derive(Parser, Debug)]
#[command(name = "shunt", version, about, long_about = None)]
struct Args {
    /// TOML file declaring extra operators and brackets. Falls back to the
    /// file named by SHUNT_CONFIG.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Decimal separator for number literals, '.' or ','
    #[arg(short, long, value_name = "C")]
    separator: Option<char>,

    /// Print the postfix form instead of the value
    #[arg(short, long)]
    postfix: bool,

    /// Print one JSON object per expression
    #[arg(short, long)]
    json: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    expressions: Vec<String>,
}

/// Result of running one expression, as printed in JSON mode
#[derive(Serialize, Debug, PartialEq)]
struct Outcome<'a> {
    expression: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    postfix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<usize>,
}

impl<'a> Outcome<'a> {
    fn success(expression: &'a str) -> Self {
        Self { expression, result: None, postfix: None, error: None, category: None, offset: None }
    }

    fn failure(expression: &'a str, err: &CalcError) -> Self {
        Self {
            error: Some(err.message()),
            category: Some(err.category()),
            offset: err.offset(),
            ..Self::success(expression)
        }
    }

    fn is_failure(&self) -> bool {
        self.error.is_some()
    }

    fn to_text(&self) -> String {
        match (&self.error, &self.postfix, self.result) {
            (Some(message), _, _) => match self.offset {
                Some(offset) => format!(
                    "{} error at offset {offset}: {message}",
                    self.category.unwrap_or("unknown")
                ),
                None => format!("{} error: {message}", self.category.unwrap_or("unknown")),
            },
            (None, Some(postfix), _) => postfix.clone(),
            (None, None, Some(value)) => value.to_string(),
            (None, None, None) => String::new(),
        }
    }
}

fn run<'a>(calculator: &Calculator, expression: &'a str, postfix: bool) -> Outcome<'a> {
    let outcome = if postfix {
        calculator.to_postfix(expression).map(|rendered| Outcome {
            postfix: Some(rendered),
            ..Outcome::success(expression)
        })
    } else {
        calculator
            .evaluate(expression)
            .map(|value| Outcome { result: Some(value), ..Outcome::success(expression) })
    };

    outcome.unwrap_or_else(|err| {
        debug!(expression, error = %err, "Expression failed");
        Outcome::failure(expression, &err)
    })
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn build_calculator(args: &Args) -> Result<Calculator> {
    let mut config = match &args.config {
        Some(path) => CalculatorConfig::from_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => CalculatorConfig::from_environment()
            .context("failed to load configuration from SHUNT_CONFIG")?,
    };

    if let Some(separator) = args.separator {
        config.decimal_separator = separator;
    }

    Calculator::from_config(&config).context("invalid calculator configuration")
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_tracing(args.log_json);

    let calculator = build_calculator(&args)?;
    info!(
        binary = calculator.symbols().binary_count(),
        unary = calculator.symbols().unary_count(),
        brackets = calculator.symbols().bracket_count(),
        "Calculator ready"
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut failures = 0usize;

    let mut emit = |outcome: Outcome<'_>| -> Result<()> {
        if outcome.is_failure() {
            failures += 1;
        }
        if args.json {
            serde_json::to_writer(&mut out, &outcome)?;
            writeln!(out)?;
        } else {
            writeln!(out, "{}", outcome.to_text())?;
        }
        Ok(())
    };

    if args.expressions.is_empty() {
        for line in io::stdin().lock().lines() {
            let line = line.context("failed to read standard input")?;
            if line.trim().is_empty() {
                continue;
            }
            emit(run(&calculator, &line, args.postfix))?;
        }
    } else {
        for expression in &args.expressions {
            emit(run(&calculator, expression, args.postfix))?;
        }
    }

    if failures > 0 {
        warn!(failures, "Some expressions failed");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
