//! ui
//!
//! User-facing output.
//!
//! # Modules
//!
//! - [`output`] - Result rendering and display
//!
//! # Design
//!
//! All stdout output goes through this module so the result stays
//! machine-readable. Logging is separate and always writes to stderr.

pub mod output;
