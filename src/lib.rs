//! git-buildnumber - Deterministic build numbers from git metadata
//!
//! Reads the current revision, branch, tags, ancestry and working-tree state
//! of a git repository and composes them into a build number such as
//! `v1.2.37.1a2b3c4-dirty`, plus the individual fields build tools publish
//! as properties.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Orchestrates one extraction and validates the result
//! - [`core`] - Domain types, tag index, ancestry walk, dates, config
//! - [`script`] - Pluggable evaluators for custom build number formats
//! - [`git`] - Single interface for all Git operations
//! - [`ui`] - Result rendering
//!
//! # Correctness Invariants
//!
//! 1. The repository is never written to
//! 2. Output is deterministic for an unchanged repository and build time
//! 3. Every result carries every field, or extraction fails
//! 4. Errors are never replaced with defaults inside the library

pub mod cli;
pub mod core;
pub mod engine;
pub mod git;
pub mod script;
pub mod ui;
