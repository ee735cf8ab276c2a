//! script::traits
//!
//! Expression evaluator trait definition.
//!
//! # Design
//!
//! An evaluator takes an expression and a set of named string bindings and
//! returns one string. Every binding is a plain string; evaluators never see
//! repository handles or typed values.
//!
//! Implementations must be thread-safe (Send + Sync) so that an evaluator
//! can be built on a background thread and handed to the caller.
//!
//! # Example
//!
//! ```ignore
//! use git_buildnumber::script::{Bindings, EvaluatorError, ExpressionEvaluator};
//!
//! fn label(eval: &dyn ExpressionEvaluator) -> Result<String, EvaluatorError> {
//!     let mut bindings = Bindings::new();
//!     bindings.insert("branch".into(), "main".into());
//!     eval.evaluate(r#"branch + "-snapshot""#, &bindings)
//! }
//! ```

use std::collections::BTreeMap;

use thiserror::Error;

/// Named string values visible to an expression.
pub type Bindings = BTreeMap<String, String>;

/// Errors from expression evaluation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvaluatorError {
    /// No evaluator can run in this environment.
    #[error("expression evaluator not available: {0}")]
    Unavailable(String),

    /// The expression ran but produced nothing usable.
    #[error("expression produced no value")]
    NoValue,

    /// The expression failed to parse or run.
    #[error("expression failed: {0}")]
    Failed(String),
}

/// Capability to evaluate a format expression against string bindings.
pub trait ExpressionEvaluator: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Evaluate `expression` with `bindings` in scope.
    ///
    /// # Errors
    ///
    /// - `NoValue` if the expression yields nothing
    /// - `Failed` if the expression is invalid or raises
    /// - `Unavailable` if the backend cannot run at all
    fn evaluate(&self, expression: &str, bindings: &Bindings) -> Result<String, EvaluatorError>;
}
