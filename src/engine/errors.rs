//! engine::errors
//!
//! Error taxonomy for one extraction run.
//!
//! Errors from the git layer are lifted into the variants callers act on
//! (no repository, no commits, unreadable HEAD); anything else keeps its
//! `GitError` so the message is not lost.

use std::path::PathBuf;

use thiserror::Error;

use super::result::Field;
use crate::core::ancestry::AncestryError;
use crate::core::config::ConfigError;
use crate::git::GitError;
use crate::script::EvaluatorError;

/// Errors from build number extraction.
#[derive(Debug, Error)]
pub enum BuildNumberError {
    /// No repository at or above the configured directory.
    #[error("no git repository found at {path}")]
    RepositoryNotFound { path: PathBuf },

    /// HEAD has no commits.
    #[error("repository has no commits")]
    EmptyRepository,

    /// HEAD cannot be resolved.
    #[error("cannot read HEAD: {message}")]
    UnreadableHead { message: String },

    /// The configured ancestor bound does not resolve or is never reached.
    #[error("ancestor '{reference}' not found in the history of HEAD")]
    AncestorBoundNotFound { reference: String },

    /// `buildNumberFormat` could not be evaluated.
    #[error("failed to evaluate buildNumberFormat: {0}")]
    FormatEvaluation(#[from] EvaluatorError),

    /// A required field is missing from the result.
    #[error("internal error: result is missing field '{field}'")]
    IncompleteResult { field: Field },

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Any other git failure.
    #[error("git error: {0}")]
    Git(GitError),
}

impl From<GitError> for BuildNumberError {
    fn from(err: GitError) -> Self {
        match err {
            GitError::NotARepo { path } => BuildNumberError::RepositoryNotFound { path },
            GitError::EmptyRepository => BuildNumberError::EmptyRepository,
            GitError::UnreadableHead { message } => BuildNumberError::UnreadableHead { message },
            other => BuildNumberError::Git(other),
        }
    }
}

impl BuildNumberError {
    /// Lift a counting failure; `reference` is the bound as configured.
    pub(crate) fn from_ancestry(err: AncestryError, reference: Option<&str>) -> Self {
        match err {
            AncestryError::BoundNotReached { commit } => BuildNumberError::AncestorBoundNotFound {
                reference: reference
                    .map(str::to_string)
                    .unwrap_or_else(|| commit.to_string()),
            },
            AncestryError::HeadMissing { commit } => BuildNumberError::UnreadableHead {
                message: format!("commit {} not found", commit),
            },
            AncestryError::Git(e) => e.into(),
        }
    }
}
