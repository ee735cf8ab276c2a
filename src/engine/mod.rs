//! engine
//!
//! Orchestrates one extraction: Open -> Read -> Count -> Compose -> Validate.
//!
//! # Architecture
//!
//! The engine is the only place that sequences the other modules. It owns
//! the repository session for the length of the repository reads, starts
//! the evaluator warm-up in parallel with them, and returns a result that
//! is guaranteed to contain every field.
//!
//! ```text
//! Parameters -> [warm-up] -> Git::open -> tags -> ancestry -> dates
//!            -> describe -> compose (join warm-up) -> ExtractionResult
//! ```
//!
//! # Invariants
//!
//! - Errors propagate to the caller unchanged; no retries, no placeholders
//! - Placeholder values are a caller policy (see [`ExtractionResult::placeholders`])
//!
//! # Example
//!
//! ```ignore
//! use git_buildnumber::core::config::{ConfigFile, Parameters};
//! use git_buildnumber::engine::{extract, Field};
//!
//! let (params, _) = Parameters::resolve(ConfigFile::default())?;
//! let result = extract(&params)?;
//! println!("{}", result.get(Field::BuildNumber));
//! ```

mod errors;
mod extract;
mod result;

pub use errors::BuildNumberError;
pub use extract::{extract, extract_at};
pub use result::{ExtractionResult, Field, ResultBuilder};
