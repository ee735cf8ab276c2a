//! git::interface
//!
//! Git interface implementation using git2.
//!
//! This module provides the **single doorway** to all Git reads performed
//! during an extraction run. It normalizes libgit2 errors into typed failure
//! categories and hands out strong types ([`Oid`]) at the boundary.
//!
//! # Error Handling
//!
//! Git errors are categorized into typed variants:
//! - [`GitError::NotARepo`]: Not inside a Git repository
//! - [`GitError::EmptyRepository`]: HEAD points at an unborn branch
//! - [`GitError::UnreadableHead`]: HEAD exists but cannot be resolved
//! - [`GitError::ObjectNotFound`]: A commit the walk needs is missing
//!
//! # Example
//!
//! ```ignore
//! use git_buildnumber::git::Git;
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! println!("HEAD is at {}", git.head_oid().short(7));
//! println!("dirty: {}", git.is_dirty());
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::core::ancestry::{CommitGraph, CommitNode};
use crate::core::types::{Oid, TypeError};

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not inside a Git repository, or the start path is not a directory.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// HEAD points at a branch without commits.
    #[error("repository has no commits yet")]
    EmptyRepository,

    /// The HEAD reference itself could not be read.
    #[error("cannot read current revision: {message}")]
    UnreadableHead {
        /// Description of the problem
        message: String,
    },

    /// Object not found in repository.
    #[error("object not found: {oid}")]
    ObjectNotFound {
        /// The OID that was not found
        oid: String,
    },

    /// Invalid object id format.
    #[error("invalid object id: {oid}")]
    InvalidOid {
        /// The invalid OID string
        oid: String,
    },

    /// Permission or filesystem error.
    #[error("repository access error: {message}")]
    AccessError {
        /// Description of the error
        message: String,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    /// Create a GitError from a git2::Error; `context` names the object.
    fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound => GitError::ObjectNotFound {
                oid: context.to_string(),
            },
            git2::ErrorCode::InvalidSpec => GitError::InvalidOid {
                oid: context.to_string(),
            },
            git2::ErrorCode::Locked => GitError::AccessError {
                message: format!("repository is locked: {}", err.message()),
            },
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }

    /// Only "no repository here" means `NotARepo`; anything else is a real failure.
    fn from_discover(err: git2::Error, path: &Path) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound => GitError::NotARepo {
                path: path.to_path_buf(),
            },
            _ => GitError::from_git2(err, &path.display().to_string()),
        }
    }
}

impl From<TypeError> for GitError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidOid(msg) => GitError::InvalidOid { oid: msg },
        }
    }
}

/// Information about a Git repository.
#[derive(Debug, Clone)]
pub struct RepoInfo {
    /// Path to .git directory
    pub git_dir: PathBuf,
    /// Path to working directory (`None` for bare repositories)
    pub work_dir: Option<PathBuf>,
    /// Whether the repository is a shallow clone
    pub shallow: bool,
}

/// Itemized working tree status.
///
/// Every entry reported by libgit2 is sorted into one or more categories.
/// Empty untracked directories are never reported by the backend, and ignored
/// files are excluded from the query, so neither can make the tree dirty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorktreeStatus {
    /// New files staged in the index
    pub added: usize,
    /// Staged modifications, renames and type changes
    pub changed: usize,
    /// Files staged for deletion
    pub removed: usize,
    /// Tracked files deleted from the working tree but not from the index
    pub missing: usize,
    /// Unstaged modifications, renames and type changes
    pub modified: usize,
    /// Untracked files, including files inside untracked directories
    pub untracked: usize,
    /// Paths with unresolved conflicts
    pub conflicting: usize,
}

impl WorktreeStatus {
    /// Check if the worktree is completely clean.
    pub fn is_clean(&self) -> bool {
        self.added == 0
            && self.changed == 0
            && self.removed == 0
            && self.missing == 0
            && self.modified == 0
            && self.untracked == 0
            && self.conflicting == 0
    }

    /// Inverse of [`is_clean`](Self::is_clean).
    pub fn is_dirty(&self) -> bool {
        !self.is_clean()
    }

    fn record(&mut self, status: git2::Status) {
        if status.is_conflicted() {
            self.conflicting += 1;
            // Conflict entries also carry stage flags; count them once.
            return;
        }

        if status.is_index_new() {
            self.added += 1;
        }
        if status.is_index_modified() || status.is_index_renamed() || status.is_index_typechange()
        {
            self.changed += 1;
        }
        if status.is_index_deleted() {
            self.removed += 1;
        }

        if status.is_wt_deleted() {
            self.missing += 1;
        }
        if status.is_wt_modified() || status.is_wt_renamed() || status.is_wt_typechange() {
            self.modified += 1;
        }
        if status.is_wt_new() {
            self.untracked += 1;
        }
    }
}

/// A tag with its peeled commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEntry {
    /// Short tag name (without `refs/tags/`)
    pub name: String,
    /// The commit the tag ultimately points at
    pub target: Oid,
}

/// Information about a commit.
#[derive(Debug, Clone)]
pub struct CommitInfo {
    /// The commit OID
    pub oid: Oid,
    /// Parent OIDs in commit order (empty for root commits)
    pub parents: Vec<Oid>,
    /// Author timestamp
    pub author_time: DateTime<Utc>,
    /// Committer timestamp
    pub commit_time: DateTime<Utc>,
}

/// The Git interface.
///
/// This is the **single point of interaction** with Git. Opening resolves HEAD
/// and the dirty flag once; every later query is a read against the same
/// repository. The handle is released when it is dropped.
pub struct Git {
    /// The underlying git2 repository
    repo: git2::Repository,
    /// HEAD commit, resolved at open
    head: Oid,
    /// Working tree status, read at open
    status: WorktreeStatus,
    /// Commits whose parents were cut off by a shallow clone
    shallow: HashSet<Oid>,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("path", &self.repo.path())
            .field("head", &self.head)
            .finish()
    }
}

impl Git {
    // =========================================================================
    // Repository Opening and Info
    // =========================================================================

    /// Open a repository at the given path.
    ///
    /// Uses `git2::Repository::discover` to find the repository root,
    /// so `path` can be any directory within the repository.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if `path` is not a directory or no repository is found
    /// - [`GitError::AccessError`] or [`GitError::Internal`] if discovery fails for another reason
    /// - [`GitError::EmptyRepository`] if HEAD has no commits
    /// - [`GitError::UnreadableHead`] if HEAD cannot be resolved to a commit
    pub fn open(path: &Path) -> Result<Self, GitError> {
        if !path.is_dir() {
            return Err(GitError::NotARepo {
                path: path.to_path_buf(),
            });
        }
        let canonical = path.canonicalize().map_err(|e| GitError::AccessError {
            message: format!("{}: {}", path.display(), e),
        })?;
        let repo = git2::Repository::discover(&canonical)
            .map_err(|e| GitError::from_discover(e, path))?;

        let head = Self::read_head(&repo)?;
        let status = Self::read_status(&repo)?;
        let shallow = Self::read_shallow(&repo);

        Ok(Self {
            repo,
            head,
            status,
            shallow,
        })
    }

    fn read_head(repo: &git2::Repository) -> Result<Oid, GitError> {
        let head = match repo.head() {
            Ok(h) => h,
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => {
                return Err(GitError::EmptyRepository)
            }
            Err(e) => {
                return Err(GitError::UnreadableHead {
                    message: e.message().to_string(),
                })
            }
        };

        let commit = head.peel_to_commit().map_err(|e| GitError::UnreadableHead {
            message: e.message().to_string(),
        })?;

        Ok(Oid::new(commit.id().to_string())?)
    }

    fn read_status(repo: &git2::Repository) -> Result<WorktreeStatus, GitError> {
        let mut result = WorktreeStatus::default();
        if repo.is_bare() {
            return Ok(result);
        }

        let mut opts = git2::StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false)
            .exclude_submodules(false);

        let statuses = repo
            .statuses(Some(&mut opts))
            .map_err(|e| GitError::Internal {
                message: e.message().to_string(),
            })?;

        for entry in statuses.iter() {
            result.record(entry.status());
        }

        Ok(result)
    }

    /// Read `.git/shallow`, which lists the commits whose parents were not fetched.
    fn read_shallow(repo: &git2::Repository) -> HashSet<Oid> {
        if !repo.is_shallow() {
            return HashSet::new();
        }

        let path = repo.commondir().join("shallow");
        std::fs::read_to_string(path)
            .map(|contents| {
                contents
                    .lines()
                    .filter_map(|line| Oid::new(line.trim()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Get repository information.
    pub fn info(&self) -> RepoInfo {
        RepoInfo {
            git_dir: self.repo.path().to_path_buf(),
            work_dir: self.repo.workdir().map(Path::to_path_buf),
            shallow: self.is_shallow(),
        }
    }

    // =========================================================================
    // HEAD and Working Tree
    // =========================================================================

    /// Get HEAD commit OID.
    pub fn head_oid(&self) -> &Oid {
        &self.head
    }

    /// Get the name of the checked-out branch.
    ///
    /// Returns an empty string when HEAD is detached, or when the branch
    /// name is identical to the HEAD commit id.
    pub fn current_branch_name(&self) -> Result<String, GitError> {
        let head = self
            .repo
            .head()
            .map_err(|e| GitError::UnreadableHead {
                message: e.message().to_string(),
            })?;

        if !head.is_branch() {
            return Ok(String::new());
        }

        match head.shorthand() {
            Some(name) if name != self.head.as_str() => Ok(name.to_string()),
            _ => Ok(String::new()),
        }
    }

    /// Whether the working tree or index differs from HEAD.
    pub fn is_dirty(&self) -> bool {
        self.status.is_dirty()
    }

    /// Itemized working tree status captured at open.
    pub fn worktree_status(&self) -> &WorktreeStatus {
        &self.status
    }

    // =========================================================================
    // Tags and Revisions
    // =========================================================================

    /// List all tags with their peeled commit.
    ///
    /// Annotated tags are peeled through the tag object. Tags that do not
    /// lead to a commit are skipped.
    pub fn tags(&self) -> Result<Vec<TagEntry>, GitError> {
        let names = self.repo.tag_names(None).map_err(|e| GitError::Internal {
            message: e.message().to_string(),
        })?;

        let mut entries = Vec::new();
        for name in names.iter().flatten() {
            let refname = format!("refs/tags/{}", name);
            let reference = match self.repo.find_reference(&refname) {
                Ok(r) => r,
                Err(_) => continue,
            };

            let commit = match reference.peel_to_commit() {
                Ok(c) => c,
                Err(_) => continue,
            };

            entries.push(TagEntry {
                name: name.to_string(),
                target: Oid::new(commit.id().to_string())?,
            });
        }

        Ok(entries)
    }

    /// Resolve a tag name or (abbreviated) commit id to a commit.
    ///
    /// Tags take precedence; anything else is handed to git's revision
    /// parser. Returns `Ok(None)` if nothing matches.
    pub fn resolve_commitish(&self, reference: &str) -> Result<Option<Oid>, GitError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Ok(None);
        }

        let tag_ref = format!("refs/tags/{}", reference);
        if let Ok(tag) = self.repo.find_reference(&tag_ref) {
            if let Ok(commit) = tag.peel_to_commit() {
                return Ok(Some(Oid::new(commit.id().to_string())?));
            }
        }

        match self.repo.revparse_single(reference) {
            Ok(object) => match object.peel_to_commit() {
                Ok(commit) => Ok(Some(Oid::new(commit.id().to_string())?)),
                Err(_) => Ok(None),
            },
            Err(e)
                if matches!(
                    e.code(),
                    git2::ErrorCode::NotFound
                        | git2::ErrorCode::Ambiguous
                        | git2::ErrorCode::InvalidSpec
                ) =>
            {
                Ok(None)
            }
            Err(e) => Err(GitError::from_git2(e, reference)),
        }
    }

    /// Describe HEAD: nearest annotated tag, distance and abbreviated id.
    ///
    /// Always uses the long format (`v1.0-0-gabc1234`) and falls back to the
    /// abbreviated commit id when no tag is reachable.
    pub fn describe(&self) -> Result<String, GitError> {
        let commit = self.find_commit(&self.head)?;

        let mut opts = git2::DescribeOptions::new();
        opts.show_commit_oid_as_fallback(true);

        let mut format = git2::DescribeFormatOptions::new();
        format.always_use_long_format(true).abbreviated_size(7);

        let described = commit
            .as_object()
            .describe(&opts)
            .and_then(|d| d.format(Some(&format)));

        match described {
            Ok(s) => Ok(s),
            // Truncated history can break the tag search; the id alone is still valid.
            Err(_) if self.is_shallow() => Ok(self.head.short(7).to_string()),
            Err(e) => Err(GitError::from_git2(e, self.head.as_str())),
        }
    }

    // =========================================================================
    // Commit Information
    // =========================================================================

    /// Get information about a commit.
    ///
    /// # Errors
    ///
    /// - [`GitError::ObjectNotFound`] if the commit doesn't exist
    pub fn commit_info(&self, oid: &Oid) -> Result<CommitInfo, GitError> {
        let commit = self.find_commit(oid)?;

        let mut parents = Vec::new();
        for parent in commit.parent_ids() {
            parents.push(Oid::new(parent.to_string())?);
        }

        let info = CommitInfo {
            oid: oid.clone(),
            parents,
            author_time: to_utc(commit.author().when()),
            commit_time: to_utc(commit.committer().when()),
        };
        Ok(info)
    }

    /// Whether the repository is a shallow clone.
    pub fn is_shallow(&self) -> bool {
        self.repo.is_shallow()
    }

    /// Commits whose parents were not fetched, sorted.
    pub fn shallow_boundaries(&self) -> Vec<Oid> {
        let mut boundaries: Vec<Oid> = self.shallow.iter().cloned().collect();
        boundaries.sort();
        boundaries
    }

    /// Whether `oid` is a shallow-clone boundary commit.
    pub fn is_shallow_boundary(&self, oid: &Oid) -> bool {
        self.shallow.contains(oid)
    }

    fn find_commit(&self, oid: &Oid) -> Result<git2::Commit<'_>, GitError> {
        let git_oid =
            git2::Oid::from_str(oid.as_str()).map_err(|e| GitError::from_git2(e, oid.as_str()))?;

        self.repo
            .find_commit(git_oid)
            .map_err(|e| GitError::from_git2(e, oid.as_str()))
    }
}

impl CommitGraph for Git {
    fn commit_node(&self, oid: &Oid) -> Result<Option<CommitNode>, GitError> {
        match self.find_commit(oid) {
            Ok(commit) => {
                let mut parents = Vec::new();
                for parent in commit.parent_ids() {
                    parents.push(Oid::new(parent.to_string())?);
                }
                Ok(Some(CommitNode {
                    id: oid.clone(),
                    parents,
                    commit_time: commit.time().seconds(),
                }))
            }
            Err(GitError::ObjectNotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn is_shallow(&self) -> bool {
        Git::is_shallow(self)
    }

    fn is_shallow_boundary(&self, oid: &Oid) -> bool {
        Git::is_shallow_boundary(self, oid)
    }
}

fn to_utc(time: git2::Time) -> DateTime<Utc> {
    DateTime::from_timestamp(time.seconds(), 0).unwrap_or(DateTime::UNIX_EPOCH)
}
