//! core::tags
//!
//! Commit-to-tags index.
//!
//! Every tag is keyed by the commit it peels to, so an annotated tag and a
//! lightweight tag on the same commit land in the same set. Sets are ordered
//! lexicographically so the rendered value does not depend on the order the
//! backend enumerated refs in.

use std::collections::{BTreeSet, HashMap};

use super::types::Oid;
use crate::git::TagEntry;

/// Separator used when a commit carries several tags.
pub const TAG_SEPARATOR: &str = ";";

/// Immutable mapping from commit id to the names of the tags pointing at it.
#[derive(Debug, Clone, Default)]
pub struct TagIndex {
    by_commit: HashMap<Oid, BTreeSet<String>>,
}

impl TagIndex {
    /// Build the index from peeled tag entries.
    pub fn build(tags: impl IntoIterator<Item = TagEntry>) -> Self {
        let mut by_commit: HashMap<Oid, BTreeSet<String>> = HashMap::new();
        for tag in tags {
            by_commit.entry(tag.target).or_default().insert(tag.name);
        }
        Self { by_commit }
    }

    /// Tags pointing at `commit`, if any.
    pub fn tags_for(&self, commit: &Oid) -> Option<&BTreeSet<String>> {
        self.by_commit.get(commit)
    }

    /// Tags pointing at `commit` joined with `;`, or an empty string.
    pub fn render(&self, commit: &Oid) -> String {
        self.tags_for(commit).map(render_set).unwrap_or_default()
    }

    /// Number of tagged commits.
    pub fn len(&self) -> usize {
        self.by_commit.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_commit.is_empty()
    }
}

/// Join an ordered tag set with `;`.
pub fn render_set(tags: &BTreeSet<String>) -> String {
    tags.iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(TAG_SEPARATOR)
}
