//! script
//!
//! Pluggable evaluators for `buildNumberFormat` expressions.
//!
//! # Architecture
//!
//! Expressions are evaluated through the [`ExpressionEvaluator`] trait,
//! which has several interchangeable implementations:
//!
//! - [`RhaiEvaluator`]: Embedded Rhai engine (default, feature `rhai`)
//! - [`CommandEvaluator`]: Runs an external program, `sh -c` by default
//! - [`DisabledEvaluator`]: Rejects every expression
//!
//! # Engine Selection
//!
//! Use [`create_evaluator`] to build an evaluator from configuration, or
//! [`EvaluatorWarmup`] to build it on a background thread:
//!
//! ```ignore
//! use git_buildnumber::script::{create_evaluator, EngineKind};
//!
//! let eval = create_evaluator(&EngineKind::Rhai)?;
//! let value = eval.evaluate(r#""build-" + commitsCount"#, &bindings)?;
//! ```

mod disabled;
mod process;
#[cfg(feature = "rhai")]
mod rhai_engine;
mod traits;
mod warmup;

use std::fmt;

pub use disabled::DisabledEvaluator;
pub use process::{CommandEvaluator, DEFAULT_COMMAND};
#[cfg(feature = "rhai")]
pub use rhai_engine::RhaiEvaluator;
pub use traits::{Bindings, EvaluatorError, ExpressionEvaluator};
pub use warmup::EvaluatorWarmup;

/// The default engine name.
pub const DEFAULT_ENGINE: &str = "rhai";

/// Which evaluator to build.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EngineKind {
    #[default]
    Rhai,
    /// External program; empty means `sh -c`
    Command(Vec<String>),
    Disabled,
}

impl EngineKind {
    /// Parse an engine name. `command` is only used by the command engine.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` for unknown names.
    pub fn parse(name: Option<&str>, command: Vec<String>) -> Result<Self, EvaluatorError> {
        match name.unwrap_or(DEFAULT_ENGINE) {
            "rhai" => Ok(EngineKind::Rhai),
            "command" => Ok(EngineKind::Command(command)),
            "disabled" => Ok(EngineKind::Disabled),
            other => Err(EvaluatorError::Unavailable(format!(
                "unknown format engine: '{}' (valid: rhai, command, disabled)",
                other
            ))),
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineKind::Rhai => f.write_str("rhai"),
            EngineKind::Command(cmd) if cmd.is_empty() => f.write_str("command"),
            EngineKind::Command(cmd) => write!(f, "command({})", cmd.join(" ")),
            EngineKind::Disabled => f.write_str("disabled"),
        }
    }
}

/// Build an evaluator for `kind`.
///
/// # Errors
///
/// - `Unavailable` for the Rhai engine when built without the `rhai` feature
pub fn create_evaluator(kind: &EngineKind) -> Result<Box<dyn ExpressionEvaluator>, EvaluatorError> {
    match kind {
        #[cfg(feature = "rhai")]
        EngineKind::Rhai => Ok(Box::new(RhaiEvaluator::new())),
        #[cfg(not(feature = "rhai"))]
        EngineKind::Rhai => Err(EvaluatorError::Unavailable(
            "rhai support not enabled (compile with --features rhai)".into(),
        )),
        EngineKind::Command(cmd) => Ok(Box::new(CommandEvaluator::new(cmd.clone()))),
        EngineKind::Disabled => Ok(Box::new(DisabledEvaluator)),
    }
}
