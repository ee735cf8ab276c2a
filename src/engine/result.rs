//! engine::result
//!
//! The fixed field set and the validated result mapping.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::errors::BuildNumberError;
use crate::script::Bindings;

/// Every field an extraction produces, in publishing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Revision,
    ShortRevision,
    Dirty,
    Branch,
    Tag,
    NearestTag,
    Parent,
    ShortParent,
    CommitsCount,
    AuthorDate,
    CommitDate,
    Describe,
    BuildDate,
    BuildNumber,
}

impl Field {
    pub const ALL: [Field; 14] = [
        Field::Revision,
        Field::ShortRevision,
        Field::Dirty,
        Field::Branch,
        Field::Tag,
        Field::NearestTag,
        Field::Parent,
        Field::ShortParent,
        Field::CommitsCount,
        Field::AuthorDate,
        Field::CommitDate,
        Field::Describe,
        Field::BuildDate,
        Field::BuildNumber,
    ];

    /// The published name, e.g. `shortRevision`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Revision => "revision",
            Field::ShortRevision => "shortRevision",
            Field::Dirty => "dirty",
            Field::Branch => "branch",
            Field::Tag => "tag",
            Field::NearestTag => "nearestTag",
            Field::Parent => "parent",
            Field::ShortParent => "shortParent",
            Field::CommitsCount => "commitsCount",
            Field::AuthorDate => "authorDate",
            Field::CommitDate => "commitDate",
            Field::Describe => "describe",
            Field::BuildDate => "buildDate",
            Field::BuildNumber => "buildNumber",
        }
    }

    /// Value published in place of a real one when extraction failed.
    pub fn placeholder(&self) -> &'static str {
        match self {
            Field::Revision => "UNKNOWN_REVISION",
            Field::ShortRevision => "UNKNOWN_SHORT_REVISION",
            Field::Dirty => "UNKNOWN_DIRTY",
            Field::Branch => "UNKNOWN_BRANCH",
            Field::Tag => "UNKNOWN_TAG",
            Field::NearestTag => "UNKNOWN_NEAREST_TAG",
            Field::Parent => "UNKNOWN_PARENT",
            Field::ShortParent => "UNKNOWN_SHORT_PARENT",
            Field::CommitsCount => "UNKNOWN_COMMITS_COUNT",
            Field::AuthorDate => "UNKNOWN_AUTHOR_DATE",
            Field::CommitDate => "UNKNOWN_COMMIT_DATE",
            Field::Describe => "UNKNOWN_DESCRIBE",
            Field::BuildDate => "UNKNOWN_BUILD_DATE",
            Field::BuildNumber => "UNKNOWN_BUILDNUMBER",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .iter()
            .copied()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| {
                let names: Vec<_> = Field::ALL.iter().map(Field::as_str).collect();
                format!("unknown field '{}' (valid: {})", s, names.join(", "))
            })
    }
}

/// Collects field values while an extraction runs.
#[derive(Debug, Default)]
pub struct ResultBuilder {
    values: BTreeMap<Field, String>,
}

impl ResultBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) -> &mut Self {
        self.values.insert(field, value.into());
        self
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    /// Current values keyed by published name.
    pub fn bindings(&self) -> Bindings {
        self.values
            .iter()
            .map(|(field, value)| (field.as_str().to_string(), value.clone()))
            .collect()
    }

    /// Check that every field is present.
    ///
    /// # Errors
    ///
    /// `IncompleteResult` naming the first missing field.
    pub fn finish(self) -> Result<ExtractionResult, BuildNumberError> {
        if let Some(field) = Field::ALL
            .iter()
            .find(|field| !self.values.contains_key(*field))
        {
            return Err(BuildNumberError::IncompleteResult { field: *field });
        }
        Ok(ExtractionResult {
            values: self.values,
        })
    }
}

/// Complete field-to-value mapping from one extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    values: BTreeMap<Field, String>,
}

impl ExtractionResult {
    /// A result holding the `UNKNOWN_*` placeholder for every field.
    pub fn placeholders() -> Self {
        Self {
            values: Field::ALL
                .iter()
                .map(|field| (*field, field.placeholder().to_string()))
                .collect(),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or_default()
    }

    /// Fields in publishing order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.values.iter().map(|(field, value)| (*field, value.as_str()))
    }
}

impl Serialize for ExtractionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (field, value) in self.iter() {
            map.serialize_entry(field.as_str(), value)?;
        }
        map.end()
    }
}
