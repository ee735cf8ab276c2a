//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Results go to stdout in one of three shapes so a build tool can read
//! them directly:
//!
//! - `properties`: `git.revision=...`, one per line
//! - `gradle`: `gitRevision=...`, the camel-cased names Gradle plugins use
//! - `json`: one object keyed by field name (the namespace is not applied)
//!
//! Diagnostics go to stderr and never mix with the result.

use std::fmt::Display;

use crate::engine::{ExtractionResult, Field};

/// Shape of the published result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Properties,
    Gradle,
    Json,
}

/// Property name for `field` under `namespace`.
pub fn property_name(namespace: &str, field: Field, format: OutputFormat) -> String {
    match format {
        OutputFormat::Gradle => {
            let name = field.as_str();
            let mut chars = name.chars();
            match chars.next() {
                Some(first) => format!("{}{}{}", namespace, first.to_ascii_uppercase(), chars.as_str()),
                None => namespace.to_string(),
            }
        }
        OutputFormat::Properties | OutputFormat::Json => format!("{}.{}", namespace, field),
    }
}

/// Render the whole result.
///
/// # Errors
///
/// Only JSON serialization can fail.
pub fn render(
    result: &ExtractionResult,
    namespace: &str,
    format: OutputFormat,
) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(result),
        OutputFormat::Properties | OutputFormat::Gradle => Ok(result
            .iter()
            .map(|(field, value)| {
                format!(
                    "{}={}",
                    property_name(namespace, field, format),
                    escape_value(value)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

/// Escape a value for a properties file line.
pub fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

/// Print a result line to stdout.
pub fn print(message: impl Display) {
    println!("{}", message);
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}
