//! script::process
//!
//! Evaluator that hands the expression to an external program.
//!
//! The configured command line (default `sh -c`) gets the expression as its
//! last argument. Each binding is exported as an environment variable of
//! the same name, so `sh -c 'echo "$branch.$commitsCount"'` works. The
//! trimmed standard output is the result.

use std::process::{Command, Stdio};

use super::traits::{Bindings, EvaluatorError, ExpressionEvaluator};

/// Command line used when none is configured.
pub const DEFAULT_COMMAND: [&str; 2] = ["sh", "-c"];

/// Evaluator that runs one process per evaluation.
#[derive(Debug, Clone)]
pub struct CommandEvaluator {
    program: String,
    args: Vec<String>,
}

impl CommandEvaluator {
    /// Create from a command line. An empty command line uses `sh -c`.
    pub fn new(command: Vec<String>) -> Self {
        let mut parts = if command.is_empty() {
            DEFAULT_COMMAND.iter().map(|s| s.to_string()).collect()
        } else {
            command
        };
        let program = parts.remove(0);
        Self {
            program,
            args: parts,
        }
    }

    /// The full command line, without the expression.
    pub fn command_line(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }
}

impl Default for CommandEvaluator {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl ExpressionEvaluator for CommandEvaluator {
    fn name(&self) -> &'static str {
        "command"
    }

    fn evaluate(&self, expression: &str, bindings: &Bindings) -> Result<String, EvaluatorError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(expression)
            .envs(bindings)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                EvaluatorError::Unavailable(format!("cannot run '{}': {}", self.program, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EvaluatorError::Failed(format!(
                "'{}' exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|_| EvaluatorError::Failed("output is not valid UTF-8".to_string()))?;
        let value = stdout.trim();
        if value.is_empty() {
            return Err(EvaluatorError::NoValue);
        }
        Ok(value.to_string())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn bindings(pairs: &[(&str, &str)]) -> Bindings {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn default_command_is_shell() {
        assert_eq!(CommandEvaluator::default().command_line(), vec!["sh", "-c"]);
    }

    #[test]
    fn bindings_are_environment() {
        let eval = CommandEvaluator::default();
        let b = bindings(&[("branch", "main"), ("commitsCount", "5")]);
        assert_eq!(
            eval.evaluate(r#"echo "$branch.$commitsCount""#, &b).unwrap(),
            "main.5"
        );
    }

    #[test]
    fn output_is_trimmed() {
        let eval = CommandEvaluator::default();
        assert_eq!(
            eval.evaluate("printf '  v1  \\n\\n'", &Bindings::new()).unwrap(),
            "v1"
        );
    }

    #[test]
    fn empty_output_is_no_value() {
        let eval = CommandEvaluator::default();
        assert_eq!(
            eval.evaluate("true", &Bindings::new()),
            Err(EvaluatorError::NoValue)
        );
    }

    #[test]
    fn failing_command_reports_stderr() {
        let eval = CommandEvaluator::default();
        let err = eval
            .evaluate("echo boom >&2; exit 3", &Bindings::new())
            .unwrap_err();
        match err {
            EvaluatorError::Failed(msg) => assert!(msg.contains("boom")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn missing_program_is_unavailable() {
        let eval = CommandEvaluator::new(vec!["definitely-not-a-real-program-xyz".into()]);
        let err = eval.evaluate("x", &Bindings::new()).unwrap_err();
        assert!(matches!(err, EvaluatorError::Unavailable(_)));
    }
}
