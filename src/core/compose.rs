//! core::compose
//!
//! Build number composition.
//!
//! The default build number is `name.count.shortRevision`, where `name` is
//! the tag, else the branch, else `UNNAMED`, followed by `-dirtyValue` when
//! the tree is dirty. A configured format expression replaces the default
//! entirely; if it cannot be evaluated the caller gets an error, never the
//! default.

use crate::script::{Bindings, EvaluatorError, ExpressionEvaluator};

/// Name used when HEAD has neither a tag nor a branch.
pub const UNNAMED: &str = "UNNAMED";

/// Compose the default build number.
///
/// `dirty` is the already-rendered dirty field: the configured dirty value
/// when dirty, empty otherwise.
pub fn default_build_number(
    tag: &str,
    branch: &str,
    commits_count: &str,
    short_revision: &str,
    dirty: &str,
) -> String {
    let name = if !tag.is_empty() {
        tag
    } else if !branch.is_empty() {
        branch
    } else {
        UNNAMED
    };
    let suffix = if dirty.is_empty() {
        String::new()
    } else {
        format!("-{}", dirty)
    };
    format!("{}.{}.{}{}", name, commits_count, short_revision, suffix)
}

/// Evaluate a format expression against the extracted fields.
///
/// # Errors
///
/// Propagates the evaluator's error unchanged.
pub fn evaluate_format(
    evaluator: &dyn ExpressionEvaluator,
    expression: &str,
    fields: &Bindings,
) -> Result<String, EvaluatorError> {
    evaluator.evaluate(expression, fields)
}
