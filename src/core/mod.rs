//! core
//!
//! Core domain types and algorithms for build number extraction.
//!
//! # Modules
//!
//! - [`types`] - Strong types: Oid
//! - [`tags`] - Commit-to-tags index
//! - [`ancestry`] - Commit counting and nearest-tag walk
//! - [`dates`] - Date pattern translation and time zones
//! - [`compose`] - Default build number and format expressions
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Algorithms take their inputs explicitly and return their results
//! - All output is deterministic for an unchanged repository

pub mod ancestry;
pub mod compose;
pub mod config;
pub mod dates;
pub mod tags;
pub mod types;
