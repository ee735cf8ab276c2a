//! script::disabled
//!
//! Evaluator used when expressions are turned off.

use super::traits::{Bindings, EvaluatorError, ExpressionEvaluator};

/// Rejects every expression with `Unavailable`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledEvaluator;

impl ExpressionEvaluator for DisabledEvaluator {
    fn name(&self) -> &'static str {
        "disabled"
    }

    fn evaluate(&self, _expression: &str, _bindings: &Bindings) -> Result<String, EvaluatorError> {
        Err(EvaluatorError::Unavailable(
            "format expressions are disabled (formatEngine = \"disabled\")".to_string(),
        ))
    }
}
