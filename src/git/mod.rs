//! git
//!
//! Single interface for all Git operations.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to Git. All repository reads flow
//! through this interface. No other module should import `git2`.
//!
//! # Responsibilities
//!
//! - Repository discovery and opening
//! - HEAD resolution and current branch
//! - Working tree status (the dirty flag)
//! - Tag enumeration with peeled targets
//! - Commit reads for the ancestry walk
//! - Describe and shallow-clone detection
//!
//! # Invariants
//!
//! - The repository is never written to
//! - All operations return strong types (Oid)
//!
//! # Example
//!
//! ```ignore
//! use git_buildnumber::git::Git;
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! let tags = git.tags()?;
//! let describe = git.describe()?;
//! ```

mod interface;

pub use interface::{CommitInfo, Git, GitError, RepoInfo, TagEntry, WorktreeStatus};
