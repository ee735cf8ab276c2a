//! engine::extract
//!
//! One extraction run, from parameters to a validated result.
//!
//! # Sequence
//!
//! 1. Start the evaluator warm-up if `buildNumberFormat` is set
//! 2. Open the repository; read HEAD, branch and dirty flag
//! 3. Index tags; `tag` is the set on HEAD
//! 4. Parents of HEAD
//! 5. Resolve the ancestor bound, inclusive first
//! 6. Count ancestry and find the nearest tag
//! 7. Format author, commit and build dates
//! 8. Describe
//! 9. Compose `buildNumber`, joining the warm-up only now
//! 10. Validate that every field is present
//!
//! The repository session is dropped as soon as the repository reads are
//! done, on success and on every error path.
//!
//! # Invariants
//!
//! - The repository is never written to
//! - A failed format expression is an error, never the default build number
//! - The result contains every [`Field`]

use std::time::Instant;

use chrono::{DateTime, Utc};

use super::errors::BuildNumberError;
use super::result::{ExtractionResult, Field, ResultBuilder};
use crate::core::ancestry::{self, Bound};
use crate::core::compose::{default_build_number, evaluate_format};
use crate::core::config::{AncestorBound, Parameters};
use crate::core::tags::{render_set, TagIndex};
use crate::core::types::join_oids;
use crate::git::Git;
use crate::script::EvaluatorWarmup;

/// Extract all fields using the current time as the build date.
///
/// # Errors
///
/// See [`BuildNumberError`]; nothing is retried and nothing is defaulted.
pub fn extract(params: &Parameters) -> Result<ExtractionResult, BuildNumberError> {
    extract_at(params, Utc::now())
}

/// Extract all fields with an explicit build time.
pub fn extract_at(
    params: &Parameters,
    build_time: DateTime<Utc>,
) -> Result<ExtractionResult, BuildNumberError> {
    let started = Instant::now();
    tracing::debug!(parameters = %params, "extracting build number");

    let warmup = params
        .build_number_format
        .as_ref()
        .map(|_| EvaluatorWarmup::spawn(params.format_engine.clone()));

    let mut builder = ResultBuilder::new();
    {
        let git = timed("open", || Git::open(&params.repository_directory))?;
        read_repository(&git, params, build_time, &mut builder)?;
    }
    tracing::debug!("repository closed");

    let default = default_build_number(
        builder.get(Field::Tag).unwrap_or_default(),
        builder.get(Field::Branch).unwrap_or_default(),
        builder.get(Field::CommitsCount).unwrap_or_default(),
        builder.get(Field::ShortRevision).unwrap_or_default(),
        builder.get(Field::Dirty).unwrap_or_default(),
    );
    builder.set(Field::BuildNumber, default);

    if let (Some(expression), Some(warmup)) = (&params.build_number_format, warmup) {
        let evaluator = timed("evaluator join", || warmup.join())?;
        let value = timed("format", || {
            evaluate_format(evaluator.as_ref(), expression, &builder.bindings())
        })?;
        builder.set(Field::BuildNumber, value);
    }

    let result = builder.finish()?;
    for (field, value) in result.iter() {
        tracing::debug!(field = %field, value = %value, "extracted");
    }
    tracing::debug!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        "extraction complete"
    );
    Ok(result)
}

fn read_repository(
    git: &Git,
    params: &Parameters,
    build_time: DateTime<Utc>,
    builder: &mut ResultBuilder,
) -> Result<(), BuildNumberError> {
    let short_len = params.short_revision_length;
    let head = git.head_oid().clone();
    let head_info = git.commit_info(&head)?;

    let dirty = if git.is_dirty() {
        params.dirty_value.as_str()
    } else {
        ""
    };
    builder
        .set(Field::Revision, head.as_str())
        .set(Field::ShortRevision, head.short(short_len))
        .set(Field::Dirty, dirty)
        .set(Field::Branch, git.current_branch_name()?);

    let index = TagIndex::build(timed("tags", || git.tags())?);
    builder
        .set(Field::Tag, index.render(&head))
        .set(Field::Parent, join_oids(&head_info.parents, None))
        .set(Field::ShortParent, join_oids(&head_info.parents, Some(short_len)));

    let requested = params.ancestor_bound();
    let bound = resolve_bound(git, requested.as_ref())?;
    let counted = timed("ancestry", || {
        ancestry::count(git, &head, bound.as_ref(), &index)
    })
    .map_err(|e| BuildNumberError::from_ancestry(e, requested.as_ref().map(|b| b.reference.as_str())))?;

    builder
        .set(Field::CommitsCount, counted.commits.to_string())
        .set(Field::NearestTag, render_set(&counted.nearest_tag))
        .set(
            Field::AuthorDate,
            params.git_date_format.format(head_info.author_time, &params.zone),
        )
        .set(
            Field::CommitDate,
            params.git_date_format.format(head_info.commit_time, &params.zone),
        )
        .set(
            Field::BuildDate,
            params.build_date_format.format(build_time, &params.zone),
        )
        .set(Field::Describe, timed("describe", || git.describe())?);

    Ok(())
}

fn resolve_bound(
    git: &Git,
    requested: Option<&AncestorBound>,
) -> Result<Option<Bound>, BuildNumberError> {
    let Some(requested) = requested else {
        return Ok(None);
    };
    match git.resolve_commitish(&requested.reference)? {
        Some(commit) => {
            tracing::debug!(reference = %requested.reference, commit = %commit, kind = ?requested.kind, "ancestor bound");
            Ok(Some(Bound {
                commit,
                kind: requested.kind,
            }))
        }
        None => Err(BuildNumberError::AncestorBoundNotFound {
            reference: requested.reference.clone(),
        }),
    }
}

fn timed<T>(phase: &str, f: impl FnOnce() -> T) -> T {
    let started = Instant::now();
    let out = f();
    tracing::debug!(
        phase,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "phase done"
    );
    out
}
