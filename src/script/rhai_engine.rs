//! script::rhai_engine
//!
//! Embedded evaluator backed by the Rhai scripting engine.
//!
//! Every binding is pushed as a string constant, so an expression such as
//! `tag + "." + commitsCount` concatenates and a statement block such as
//! `if dirty == "" { revision } else { "snapshot" }` is allowed. A unit
//! result means the expression produced no value. Other non-string results
//! are rendered with their display form.

use rhai::{Dynamic, Engine, Scope};

use super::traits::{Bindings, EvaluatorError, ExpressionEvaluator};

/// Upper bound on operations per evaluation.
const MAX_OPERATIONS: u64 = 1_000_000;

/// Evaluator holding one prepared Rhai engine.
pub struct RhaiEvaluator {
    engine: Engine,
}

impl RhaiEvaluator {
    /// Build and configure the engine. This is the slow part that is
    /// worth starting early.
    pub fn new() -> Self {
        let mut engine = Engine::new();
        engine.set_max_operations(MAX_OPERATIONS);
        // Scripts cannot reach the filesystem or print to our stdout.
        engine.on_print(|text| tracing::debug!(target: "script", "{}", text));
        engine.on_debug(|text, _, _| tracing::debug!(target: "script", "{}", text));
        Self { engine }
    }
}

impl Default for RhaiEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RhaiEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RhaiEvaluator").finish_non_exhaustive()
    }
}

impl ExpressionEvaluator for RhaiEvaluator {
    fn name(&self) -> &'static str {
        "rhai"
    }

    fn evaluate(&self, expression: &str, bindings: &Bindings) -> Result<String, EvaluatorError> {
        let mut scope = Scope::new();
        for (name, value) in bindings {
            scope.push_constant(name.as_str(), value.clone());
        }

        let result: Dynamic = self
            .engine
            .eval_with_scope(&mut scope, expression)
            .map_err(|e| EvaluatorError::Failed(e.to_string()))?;

        if result.is_unit() {
            return Err(EvaluatorError::NoValue);
        }
        if result.is_string() {
            return result
                .into_string()
                .map_err(|type_name| EvaluatorError::Failed(format!("unexpected {}", type_name)));
        }
        Ok(result.to_string())
    }
}
