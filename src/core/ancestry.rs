//! core::ancestry
//!
//! Commit counting from HEAD back through history.
//!
//! # Traversal
//!
//! The walk is reverse-chronological: a max-heap keyed on committer time
//! (newest first, ties broken by ascending commit id) holds the frontier, and
//! every parent edge is followed, merges included. This is the order a history
//! view of "all branches merged into HEAD" shows. Each commit enters the heap
//! at most once.
//!
//! # Results
//!
//! The walk yields the number of commits counted and the tag set of the first
//! visited commit that carries tags (the nearest tag). An optional bound stops
//! the walk at a given ancestor, counting it (inclusive) or not (exclusive).
//!
//! # Invariants
//!
//! - A bound that is never reached is an error, never a silent full count
//! - Truncated history (shallow clone) yields [`CommitsCount::Truncated`],
//!   never a partial number
//! - A missing parent outside a shallow clone is an error

use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeSet, BinaryHeap, HashSet};
use std::fmt;

use thiserror::Error;

use super::tags::TagIndex;
use super::types::Oid;
use crate::git::GitError;

/// A commit as seen by the ancestry walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitNode {
    pub id: Oid,
    pub parents: Vec<Oid>,
    /// Committer time, seconds since the epoch
    pub commit_time: i64,
}

/// Read access to the commit graph.
///
/// Implemented by [`crate::git::Git`]; tests use in-memory graphs.
pub trait CommitGraph {
    /// Load a commit. `Ok(None)` means the object is absent from the
    /// database.
    fn commit_node(&self, id: &Oid) -> Result<Option<CommitNode>, GitError>;

    /// Whether history may legitimately be missing (shallow clone).
    fn is_shallow(&self) -> bool;

    /// Whether the parents of `id` were cut off by a shallow clone.
    fn is_shallow_boundary(&self, id: &Oid) -> bool;
}

/// Where counting stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundKind {
    /// Count the ancestor itself, then stop.
    Inclusive,
    /// Stop at the ancestor without counting it.
    Exclusive,
}

/// A resolved ancestor bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bound {
    pub commit: Oid,
    pub kind: BoundKind,
}

/// Outcome of counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitsCount {
    Exact(u64),
    /// History is truncated (shallow clone); the count is unknown.
    Truncated,
}

impl CommitsCount {
    /// The count as a signed number, `-1` for truncated history.
    pub fn as_i64(&self) -> i64 {
        match self {
            CommitsCount::Exact(n) => i64::try_from(*n).unwrap_or(i64::MAX),
            CommitsCount::Truncated => -1,
        }
    }
}

impl fmt::Display for CommitsCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i64())
    }
}

/// Count plus the nearest tag found along the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AncestryCount {
    pub commits: CommitsCount,
    /// Tags on the closest tagged ancestor-or-self; empty if none was visited.
    pub nearest_tag: BTreeSet<String>,
}

/// Errors from counting.
#[derive(Debug, Error)]
pub enum AncestryError {
    #[error("ancestor {commit} is not reachable from HEAD")]
    BoundNotReached { commit: Oid },

    #[error("HEAD commit {commit} not found")]
    HeadMissing { commit: Oid },

    #[error(transparent)]
    Git(#[from] GitError),
}

/// Frontier entry: newest commit first, then smallest id.
#[derive(Debug, PartialEq, Eq)]
struct Pending {
    time: i64,
    id: Reverse<Oid>,
    node: CommitNode,
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .cmp(&other.time)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Pending {
    fn new(node: CommitNode) -> Self {
        Self {
            time: node.commit_time,
            id: Reverse(node.id.clone()),
            node,
        }
    }
}

/// Walk history from `head` and count commits.
///
/// # Errors
///
/// - [`AncestryError::BoundNotReached`] if a bound is set and the walk ends
///   without visiting it
/// - [`AncestryError::HeadMissing`] if `head` itself cannot be loaded
/// - [`AncestryError::Git`] if a parent is missing from a repository that
///   is not shallow
pub fn count<G: CommitGraph + ?Sized>(
    graph: &G,
    head: &Oid,
    bound: Option<&Bound>,
    tags: &TagIndex,
) -> Result<AncestryCount, AncestryError> {
    let head_node = graph
        .commit_node(head)?
        .ok_or_else(|| AncestryError::HeadMissing {
            commit: head.clone(),
        })?;

    let mut seen: HashSet<Oid> = HashSet::new();
    let mut frontier = BinaryHeap::new();
    seen.insert(head.clone());
    frontier.push(Pending::new(head_node));

    let mut counted: u64 = 0;
    let mut nearest: Option<&BTreeSet<String>> = None;

    while let Some(Pending { node, .. }) = frontier.pop() {
        if nearest.is_none() {
            nearest = tags.tags_for(&node.id);
        }

        if let Some(bound) = bound {
            if node.id == bound.commit {
                if bound.kind == BoundKind::Inclusive {
                    counted += 1;
                }
                return Ok(finish(CommitsCount::Exact(counted), nearest));
            }
        }

        counted += 1;

        if graph.is_shallow_boundary(&node.id) {
            return Ok(finish(CommitsCount::Truncated, nearest));
        }

        for parent in &node.parents {
            if !seen.insert(parent.clone()) {
                continue;
            }
            match graph.commit_node(parent)? {
                Some(parent_node) => frontier.push(Pending::new(parent_node)),
                None if graph.is_shallow() => {
                    return Ok(finish(CommitsCount::Truncated, nearest))
                }
                None => {
                    return Err(AncestryError::Git(GitError::ObjectNotFound {
                        oid: parent.to_string(),
                    }))
                }
            }
        }
    }

    match bound {
        Some(bound) => Err(AncestryError::BoundNotReached {
            commit: bound.commit.clone(),
        }),
        None => Ok(finish(CommitsCount::Exact(counted), nearest)),
    }
}

fn finish(commits: CommitsCount, nearest: Option<&BTreeSet<String>>) -> AncestryCount {
    AncestryCount {
        commits,
        nearest_tag: nearest.cloned().unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::TagEntry;
    use std::collections::HashMap;

    /// In-memory commit graph.
    #[derive(Default)]
    struct MemGraph {
        commits: HashMap<Oid, CommitNode>,
        shallow: HashSet<Oid>,
        /// Shallow without a recorded boundary
        truncated: bool,
    }

    impl MemGraph {
        fn add(&mut self, id: &str, time: i64, parents: &[&str]) -> &mut Self {
            let node = CommitNode {
                id: oid(id),
                parents: parents.iter().map(|p| oid(p)).collect(),
                commit_time: time,
            };
            self.commits.insert(node.id.clone(), node);
            self
        }

        fn remove(&mut self, id: &str) {
            self.commits.remove(&oid(id));
        }
    }

    impl CommitGraph for MemGraph {
        fn commit_node(&self, id: &Oid) -> Result<Option<CommitNode>, GitError> {
            Ok(self.commits.get(id).cloned())
        }

        fn is_shallow(&self) -> bool {
            self.truncated || !self.shallow.is_empty()
        }

        fn is_shallow_boundary(&self, id: &Oid) -> bool {
            self.shallow.contains(id)
        }
    }

    /// Expand a short label like "a1" into a 40-char hex id.
    fn oid(label: &str) -> Oid {
        let hex: String = label
            .bytes()
            .map(|b| format!("{:02x}", b))
            .collect::<String>();
        Oid::new(format!("{:0<40}", hex)).unwrap()
    }

    fn tagged(entries: &[(&str, &str)]) -> TagIndex {
        TagIndex::build(entries.iter().map(|(name, target)| TagEntry {
            name: name.to_string(),
            target: oid(target),
        }))
    }

    /// c1 <- c2 <- c3 <- c4 (HEAD)
    fn linear() -> MemGraph {
        let mut g = MemGraph::default();
        g.add("c1", 100, &[])
            .add("c2", 200, &["c1"])
            .add("c3", 300, &["c2"])
            .add("c4", 400, &["c3"]);
        g
    }

    ///        b1(250) <- b2(350)
    ///       /                  \
    /// r(100) <- m1(200) <- m2(300) <- merge(400)
    fn diamond() -> MemGraph {
        let mut g = MemGraph::default();
        g.add("r", 100, &[])
            .add("m1", 200, &["r"])
            .add("b1", 250, &["r"])
            .add("m2", 300, &["m1"])
            .add("b2", 350, &["b1"])
            .add("merge", 400, &["m2", "b2"]);
        g
    }

    fn exact(result: &AncestryCount) -> u64 {
        match result.commits {
            CommitsCount::Exact(n) => n,
            CommitsCount::Truncated => panic!("expected exact count"),
        }
    }

    mod unbounded {
        use super::*;

        #[test]
        fn counts_linear_history() {
            let g = linear();
            let result = count(&g, &oid("c4"), None, &TagIndex::default()).unwrap();
            assert_eq!(exact(&result), 4);
            assert!(result.nearest_tag.is_empty());
        }

        #[test]
        fn counts_each_merge_ancestor_once() {
            let g = diamond();
            let result = count(&g, &oid("merge"), None, &TagIndex::default()).unwrap();
            assert_eq!(exact(&result), 6);
        }

        #[test]
        fn single_root_commit() {
            let mut g = MemGraph::default();
            g.add("root", 1, &[]);
            let result = count(&g, &oid("root"), None, &TagIndex::default()).unwrap();
            assert_eq!(exact(&result), 1);
        }

        #[test]
        fn repeated_counts_are_identical() {
            let g = diamond();
            let tags = tagged(&[("v1", "b1")]);
            let first = count(&g, &oid("merge"), None, &tags).unwrap();
            let second = count(&g, &oid("merge"), None, &tags).unwrap();
            assert_eq!(first, second);
        }

        #[test]
        fn missing_head_is_an_error() {
            let g = MemGraph::default();
            let err = count(&g, &oid("nope"), None, &TagIndex::default()).unwrap_err();
            assert!(matches!(err, AncestryError::HeadMissing { .. }));
        }
    }

    mod bounded {
        use super::*;

        fn bound(id: &str, kind: BoundKind) -> Bound {
            Bound {
                commit: oid(id),
                kind,
            }
        }

        #[test]
        fn inclusive_counts_the_ancestor() {
            let g = linear();
            let b = bound("c2", BoundKind::Inclusive);
            let result = count(&g, &oid("c4"), Some(&b), &TagIndex::default()).unwrap();
            assert_eq!(exact(&result), 3);
        }

        #[test]
        fn exclusive_skips_the_ancestor() {
            let g = linear();
            let b = bound("c2", BoundKind::Exclusive);
            let result = count(&g, &oid("c4"), Some(&b), &TagIndex::default()).unwrap();
            assert_eq!(exact(&result), 2);
        }

        #[test]
        fn inclusive_and_exclusive_differ_by_one() {
            let g = diamond();
            for ancestor in ["m1", "b1", "m2", "r"] {
                let inc = bound(ancestor, BoundKind::Inclusive);
                let exc = bound(ancestor, BoundKind::Exclusive);
                let inc = exact(&count(&g, &oid("merge"), Some(&inc), &TagIndex::default()).unwrap());
                let exc = exact(&count(&g, &oid("merge"), Some(&exc), &TagIndex::default()).unwrap());
                assert_eq!(inc, exc + 1, "ancestor {}", ancestor);
            }
        }

        #[test]
        fn bound_at_head() {
            let g = linear();
            let inc = bound("c4", BoundKind::Inclusive);
            let exc = bound("c4", BoundKind::Exclusive);
            assert_eq!(
                exact(&count(&g, &oid("c4"), Some(&inc), &TagIndex::default()).unwrap()),
                1
            );
            assert_eq!(
                exact(&count(&g, &oid("c4"), Some(&exc), &TagIndex::default()).unwrap()),
                0
            );
        }

        #[test]
        fn stops_in_time_order_across_branches() {
            // Visit order from merge: merge, b2, m2, b1, m1, r
            let g = diamond();
            let b = bound("b1", BoundKind::Exclusive);
            let result = count(&g, &oid("merge"), Some(&b), &TagIndex::default()).unwrap();
            assert_eq!(exact(&result), 3);
        }

        #[test]
        fn unreachable_bound_is_an_error() {
            let mut g = linear();
            g.add("other", 500, &[]);
            let b = bound("other", BoundKind::Inclusive);
            let err = count(&g, &oid("c4"), Some(&b), &TagIndex::default()).unwrap_err();
            assert!(matches!(err, AncestryError::BoundNotReached { .. }));
        }

        #[test]
        fn descendant_bound_is_unreachable() {
            let g = linear();
            let b = bound("c4", BoundKind::Exclusive);
            let err = count(&g, &oid("c2"), Some(&b), &TagIndex::default()).unwrap_err();
            assert!(matches!(err, AncestryError::BoundNotReached { .. }));
        }
    }

    mod nearest_tag {
        use super::*;

        #[test]
        fn tag_on_head_is_nearest() {
            let g = linear();
            let tags = tagged(&[("v2", "c4"), ("v1", "c2")]);
            let result = count(&g, &oid("c4"), None, &tags).unwrap();
            assert_eq!(
                result.nearest_tag.into_iter().collect::<Vec<_>>(),
                vec!["v2".to_string()]
            );
        }

        #[test]
        fn closest_ancestor_wins() {
            let g = linear();
            let tags = tagged(&[("v1", "c1"), ("v2", "c2")]);
            let result = count(&g, &oid("c4"), None, &tags).unwrap();
            assert_eq!(
                result.nearest_tag.into_iter().collect::<Vec<_>>(),
                vec!["v2".to_string()]
            );
        }

        #[test]
        fn newer_branch_side_is_visited_first() {
            let g = diamond();
            let tags = tagged(&[("side", "b1"), ("main", "m2")]);
            let result = count(&g, &oid("merge"), None, &tags).unwrap();
            // m2 (300) is popped before b1 (250)
            assert_eq!(
                result.nearest_tag.into_iter().collect::<Vec<_>>(),
                vec!["main".to_string()]
            );
        }

        #[test]
        fn keeps_every_tag_of_the_commit() {
            let g = linear();
            let tags = tagged(&[("b", "c3"), ("a", "c3")]);
            let result = count(&g, &oid("c4"), None, &tags).unwrap();
            assert_eq!(
                result.nearest_tag.into_iter().collect::<Vec<_>>(),
                vec!["a".to_string(), "b".to_string()]
            );
        }

        #[test]
        fn tags_beyond_the_bound_are_not_seen() {
            let g = linear();
            let tags = tagged(&[("v1", "c1")]);
            let b = Bound {
                commit: oid("c3"),
                kind: BoundKind::Inclusive,
            };
            let result = count(&g, &oid("c4"), Some(&b), &tags).unwrap();
            assert!(result.nearest_tag.is_empty());
        }

        #[test]
        fn tag_on_exclusive_bound_is_seen() {
            let g = linear();
            let tags = tagged(&[("v1", "c3")]);
            let b = Bound {
                commit: oid("c3"),
                kind: BoundKind::Exclusive,
            };
            let result = count(&g, &oid("c4"), Some(&b), &tags).unwrap();
            assert_eq!(exact(&result), 1);
            assert!(result.nearest_tag.contains("v1"));
        }
    }

    mod shallow {
        use super::*;

        #[test]
        fn boundary_commit_yields_truncated() {
            let mut g = linear();
            g.remove("c1");
            g.remove("c2");
            g.shallow.insert(oid("c3"));
            let result = count(&g, &oid("c4"), None, &TagIndex::default()).unwrap();
            assert_eq!(result.commits, CommitsCount::Truncated);
            assert_eq!(result.commits.to_string(), "-1");
        }

        #[test]
        fn missing_parent_in_shallow_repo_yields_truncated() {
            let mut g = linear();
            g.remove("c2");
            g.truncated = true;
            let result = count(&g, &oid("c4"), None, &TagIndex::default()).unwrap();
            assert_eq!(result.commits, CommitsCount::Truncated);
        }

        #[test]
        fn missing_parent_in_full_repo_is_an_error() {
            let mut g = linear();
            g.remove("c2");
            let err = count(&g, &oid("c4"), None, &TagIndex::default()).unwrap_err();
            match err {
                AncestryError::Git(GitError::ObjectNotFound { oid: missing }) => {
                    assert_eq!(missing, oid("c2").to_string())
                }
                other => panic!("unexpected: {:?}", other),
            }
        }

        #[test]
        fn bound_before_boundary_is_exact() {
            let mut g = linear();
            g.remove("c1");
            g.shallow.insert(oid("c2"));
            let b = Bound {
                commit: oid("c3"),
                kind: BoundKind::Inclusive,
            };
            let result = count(&g, &oid("c4"), Some(&b), &TagIndex::default()).unwrap();
            assert_eq!(result.commits, CommitsCount::Exact(2));
        }

        #[test]
        fn nearest_tag_found_before_truncation_is_kept() {
            let mut g = linear();
            g.remove("c2");
            g.shallow.insert(oid("c3"));
            let tags = tagged(&[("v3", "c3")]);
            let result = count(&g, &oid("c4"), None, &tags).unwrap();
            assert_eq!(result.commits, CommitsCount::Truncated);
            assert!(result.nearest_tag.contains("v3"));
        }
    }

    mod commits_count {
        use super::*;

        #[test]
        fn display() {
            assert_eq!(CommitsCount::Exact(37).to_string(), "37");
            assert_eq!(CommitsCount::Exact(0).to_string(), "0");
            assert_eq!(CommitsCount::Truncated.to_string(), "-1");
        }
    }
}
