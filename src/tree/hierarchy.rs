//! Snapshot hierarchy: one immutable generation of filesystem state
//!
//! The hierarchy owns the ordered top-level nodes of the snapshot tree and
//! the case-sensitivity policy they were built under. Every mutation is
//! pure: it returns a new generation and never touches nodes reachable
//! from previously published ones, so readers traverse a fully formed
//! snapshot concurrently with any number of in-flight writers.

use crate::case::CaseSensitivity;
use crate::metadata::{DirectoryEntry, FileMetadata};
use crate::path::VfsRelativePath;
use crate::tree::children::{self, ChildLookup, InvalidateOutcome, StorePayload};
use crate::tree::node::FileSystemNode;
use std::sync::Arc;
use tracing::trace;

/// One generation of the snapshot tree.
///
/// All paths passed in are normalized absolute paths without trailing
/// separators. Cloning is cheap: generations share their nodes by
/// reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotHierarchy {
    case_sensitivity: CaseSensitivity,
    roots: Vec<Arc<FileSystemNode>>,
}

impl SnapshotHierarchy {
    /// An empty hierarchy under the given comparison policy.
    pub fn empty(case_sensitivity: CaseSensitivity) -> Self {
        SnapshotHierarchy {
            case_sensitivity,
            roots: Vec::new(),
        }
    }

    pub fn case_sensitivity(&self) -> CaseSensitivity {
        self.case_sensitivity
    }

    /// The ordered top-level nodes of this generation.
    pub fn roots(&self) -> &[Arc<FileSystemNode>] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Resolved metadata snapshotted for `absolute_path`, if any.
    ///
    /// All-or-nothing: a path that diverges inside a compressed chain, or
    /// ends in an unresolved region, yields `None` rather than partial
    /// information.
    pub fn find(&self, absolute_path: &str) -> Option<FileMetadata> {
        let target = VfsRelativePath::from_absolute(absolute_path);
        if target.length() == 0 {
            return None;
        }
        match children::find(&self.roots, target, self.case_sensitivity) {
            ChildLookup::Found(metadata) => Some(metadata),
            _ => None,
        }
    }

    /// A new generation with `metadata` snapshotted at `absolute_path`.
    pub fn snapshot(&self, absolute_path: &str, metadata: FileMetadata) -> Self {
        self.store(absolute_path, &StorePayload::Metadata(&metadata))
    }

    /// A new generation with a complete directory enumeration installed at
    /// `absolute_path`, replacing whatever was known beneath it.
    pub fn snapshot_directory(
        &self,
        absolute_path: &str,
        entries: &[DirectoryEntry],
    ) -> Self {
        self.store(absolute_path, &StorePayload::Listing(entries))
    }

    fn store(&self, absolute_path: &str, payload: &StorePayload<'_>) -> Self {
        let target = VfsRelativePath::from_absolute(absolute_path);
        if target.length() == 0 {
            // the filesystem root itself has no label to store under
            return self.clone();
        }
        trace!(path = absolute_path, "storing snapshot");
        SnapshotHierarchy {
            case_sensitivity: self.case_sensitivity,
            roots: children::store(&self.roots, target, payload, self.case_sensitivity),
        }
    }

    /// A new generation with everything at and below `absolute_path`
    /// unknown. Invalidating an unknown path returns an identical
    /// generation sharing all nodes with this one.
    pub fn invalidate(&self, absolute_path: &str) -> Self {
        let target = VfsRelativePath::from_absolute(absolute_path);
        if target.length() == 0 {
            return SnapshotHierarchy::empty(self.case_sensitivity);
        }
        trace!(path = absolute_path, "invalidating");
        match children::invalidate(&self.roots, target, self.case_sensitivity) {
            InvalidateOutcome::NoSuchSegment | InvalidateOutcome::Untouched => self.clone(),
            InvalidateOutcome::Changed(roots) | InvalidateOutcome::RemovedChild(roots) => {
                SnapshotHierarchy {
                    case_sensitivity: self.case_sensitivity,
                    roots,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::CaseSensitivity::{CaseInsensitive, CaseSensitive};
    use crate::metadata::FileKind;

    fn file(content: &str) -> FileMetadata {
        FileMetadata::file_from_bytes(content.as_bytes())
    }

    #[test]
    fn test_store_then_find_round_trip() {
        let tree = SnapshotHierarchy::empty(CaseSensitive);
        let metadata = file("hello");
        let tree = tree.snapshot("/a/b/c", metadata.clone());
        assert_eq!(tree.find("/a/b/c"), Some(metadata));
    }

    #[test]
    fn test_find_on_empty_hierarchy() {
        let tree = SnapshotHierarchy::empty(CaseSensitive);
        assert_eq!(tree.find("/a/b"), None);
    }

    #[test]
    fn test_find_prefix_of_compressed_chain_is_unknown() {
        let tree = SnapshotHierarchy::empty(CaseSensitive).snapshot("/a/b/c", file("x"));
        // the chain passes through a/b but no snapshot was taken there
        assert_eq!(tree.find("/a/b"), None);
        assert_eq!(tree.find("/a"), None);
    }

    #[test]
    fn test_divergence_inside_compressed_chain_is_unknown() {
        let tree = SnapshotHierarchy::empty(CaseSensitive).snapshot("/a/b/c", file("x"));
        assert_eq!(tree.find("/a/x"), None);
        assert_eq!(tree.find("/a/b/other"), None);
    }

    #[test]
    fn test_split_compressed_chain_on_sibling_store() {
        let tree = SnapshotHierarchy::empty(CaseSensitive)
            .snapshot("/a/b/c", file("one"))
            .snapshot("/a/b/d", file("two"));
        assert_eq!(tree.find("/a/b/c"), Some(file("one")));
        assert_eq!(tree.find("/a/b/d"), Some(file("two")));
        // the split point itself stays unresolved
        assert_eq!(tree.find("/a/b"), None);
    }

    #[test]
    fn test_store_replaces_existing_snapshot() {
        let tree = SnapshotHierarchy::empty(CaseSensitive)
            .snapshot("/a/b", file("old"))
            .snapshot("/a/b", file("new"));
        assert_eq!(tree.find("/a/b"), Some(file("new")));
    }

    #[test]
    fn test_store_missing_marker() {
        let tree =
            SnapshotHierarchy::empty(CaseSensitive).snapshot("/a/gone", FileMetadata::Missing);
        assert_eq!(tree.find("/a/gone"), Some(FileMetadata::Missing));
    }

    #[test]
    fn test_snapshot_directory_round_trip() {
        let entries = vec![
            DirectoryEntry::File {
                name: "beta.txt".to_string(),
                fingerprint: [1; 32],
                length: 4,
            },
            DirectoryEntry::Directory {
                name: "alpha".to_string(),
                entries: vec![DirectoryEntry::File {
                    name: "inner.rs".to_string(),
                    fingerprint: [2; 32],
                    length: 9,
                }],
            },
        ];
        let tree =
            SnapshotHierarchy::empty(CaseSensitive).snapshot_directory("/root/dir", &entries);
        assert_eq!(tree.find("/root/dir").map(|m| m.kind()), Some(FileKind::Directory));
        assert_eq!(
            tree.find("/root/dir/beta.txt"),
            Some(FileMetadata::RegularFile {
                fingerprint: [1; 32],
                length: 4
            })
        );
        assert_eq!(
            tree.find("/root/dir/alpha").map(|m| m.kind()),
            Some(FileKind::Directory)
        );
        assert_eq!(
            tree.find("/root/dir/alpha/inner.rs"),
            Some(FileMetadata::RegularFile {
                fingerprint: [2; 32],
                length: 9
            })
        );
    }

    #[test]
    fn test_complete_directory_knows_absent_children() {
        let entries = vec![DirectoryEntry::File {
            name: "present.txt".to_string(),
            fingerprint: [3; 32],
            length: 1,
        }];
        let tree = SnapshotHierarchy::empty(CaseSensitive).snapshot_directory("/d", &entries);
        assert_eq!(tree.find("/d/absent.txt"), Some(FileMetadata::Missing));
    }

    #[test]
    fn test_below_regular_file_is_known_absent() {
        let tree = SnapshotHierarchy::empty(CaseSensitive).snapshot("/a/file", file("x"));
        assert_eq!(tree.find("/a/file/child"), Some(FileMetadata::Missing));
    }

    #[test]
    fn test_below_directory_marker_is_unknown() {
        let tree =
            SnapshotHierarchy::empty(CaseSensitive).snapshot("/a/dir", FileMetadata::Directory);
        assert_eq!(tree.find("/a/dir/child"), None);
    }

    #[test]
    fn test_invalidate_removes_subtree() {
        let tree = SnapshotHierarchy::empty(CaseSensitive)
            .snapshot("/a/b/c", file("x"))
            .invalidate("/a/b/c");
        assert_eq!(tree.find("/a/b/c"), None);
    }

    #[test]
    fn test_invalidate_ancestor_of_compressed_chain() {
        let tree = SnapshotHierarchy::empty(CaseSensitive)
            .snapshot("/a/b/c", file("x"))
            .invalidate("/a/b");
        assert_eq!(tree.find("/a/b/c"), None);
    }

    #[test]
    fn test_invalidate_is_idempotent() {
        let tree = SnapshotHierarchy::empty(CaseSensitive)
            .snapshot("/a/b", file("x"))
            .snapshot("/a/c", file("y"));
        let once = tree.invalidate("/a/b");
        let twice = once.invalidate("/a/b");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_invalidate_unknown_path_is_a_no_op() {
        let tree = SnapshotHierarchy::empty(CaseSensitive).snapshot("/a/b", file("x"));
        let after = tree.invalidate("/somewhere/else");
        assert_eq!(tree, after);
    }

    #[test]
    fn test_invalidate_keeps_siblings() {
        let tree = SnapshotHierarchy::empty(CaseSensitive)
            .snapshot("/a/b", file("one"))
            .snapshot("/a/c", file("two"))
            .invalidate("/a/b");
        assert_eq!(tree.find("/a/b"), None);
        assert_eq!(tree.find("/a/c"), Some(file("two")));
    }

    #[test]
    fn test_invalidate_inside_complete_directory_degrades_it() {
        let entries = vec![
            DirectoryEntry::File {
                name: "one.txt".to_string(),
                fingerprint: [1; 32],
                length: 1,
            },
            DirectoryEntry::File {
                name: "two.txt".to_string(),
                fingerprint: [2; 32],
                length: 1,
            },
        ];
        let tree = SnapshotHierarchy::empty(CaseSensitive)
            .snapshot_directory("/d", &entries)
            .invalidate("/d/one.txt");
        // the invalidated entry is unknown, its sibling survives
        assert_eq!(tree.find("/d/one.txt"), None);
        assert!(tree.find("/d/two.txt").is_some());
        // the directory itself is still known, but it can no longer claim
        // absent entries
        assert_eq!(tree.find("/d"), Some(FileMetadata::Directory));
        assert_eq!(tree.find("/d/absent.txt"), None);
    }

    #[test]
    fn test_invalidate_absent_segment_of_complete_directory() {
        let entries = vec![
            DirectoryEntry::File {
                name: "one.txt".to_string(),
                fingerprint: [1; 32],
                length: 1,
            },
            DirectoryEntry::File {
                name: "two.txt".to_string(),
                fingerprint: [2; 32],
                length: 1,
            },
        ];
        let tree = SnapshotHierarchy::empty(CaseSensitive)
            .snapshot_directory("/d", &entries)
            .invalidate("/d/was-absent.txt");
        // completeness is lost even though the segment was never listed
        assert_eq!(tree.find("/d/was-absent.txt"), None);
        assert!(tree.find("/d/one.txt").is_some());
    }

    #[test]
    fn test_invalidate_root_clears_everything() {
        let tree = SnapshotHierarchy::empty(CaseSensitive)
            .snapshot("/a/b", file("x"))
            .invalidate("/");
        assert!(tree.is_empty());
    }

    #[test]
    fn test_structural_sharing_on_unrelated_store() {
        let tree = SnapshotHierarchy::empty(CaseSensitive)
            .snapshot("/a/b", file("one"))
            .snapshot("/z/q", file("two"));
        let before = Arc::clone(&tree.roots()[0]);
        let after = tree.snapshot("/z/other", file("three"));
        // the untouched subtree is the same allocation in both generations
        assert!(Arc::ptr_eq(&before, &after.roots()[0]));
        assert_eq!(after.find("/a/b"), Some(file("one")));
    }

    #[test]
    fn test_old_generation_unaffected_by_store() {
        let old = SnapshotHierarchy::empty(CaseSensitive).snapshot("/a/b", file("old"));
        let new = old.snapshot("/a/b", file("new"));
        assert_eq!(old.find("/a/b"), Some(file("old")));
        assert_eq!(new.find("/a/b"), Some(file("new")));
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let tree = SnapshotHierarchy::empty(CaseInsensitive).snapshot("/Src/Main.rs", file("x"));
        assert_eq!(tree.find("/src/main.rs"), Some(file("x")));
        assert_eq!(tree.find("/SRC/MAIN.RS"), Some(file("x")));
    }

    #[test]
    fn test_case_sensitive_lookup_distinguishes_spelling() {
        let tree = SnapshotHierarchy::empty(CaseSensitive)
            .snapshot("/src/Main.rs", file("upper"))
            .snapshot("/src/main.rs", file("lower"));
        assert_eq!(tree.find("/src/Main.rs"), Some(file("upper")));
        assert_eq!(tree.find("/src/main.rs"), Some(file("lower")));
    }

    #[test]
    fn test_storing_below_file_drops_stale_leaf() {
        let tree = SnapshotHierarchy::empty(CaseSensitive)
            .snapshot("/a/f", file("was-a-file"))
            .snapshot("/a/f/child", file("now-below-it"));
        assert_eq!(tree.find("/a/f/child"), Some(file("now-below-it")));
        // the old file snapshot can no longer be trusted
        assert_eq!(tree.find("/a/f"), None);
    }

    #[test]
    fn test_sibling_order_with_digit_suffixes() {
        let tree = SnapshotHierarchy::empty(CaseSensitive)
            .snapshot("/p/some1/path", file("one"))
            .snapshot("/p/some2/other", file("two"))
            .snapshot("/p/some/path", file("three"));
        assert_eq!(tree.find("/p/some1/path"), Some(file("one")));
        assert_eq!(tree.find("/p/some2/other"), Some(file("two")));
        assert_eq!(tree.find("/p/some/path"), Some(file("three")));
    }

    #[test]
    fn test_directory_marker_over_known_children_round_trips() {
        let tree = SnapshotHierarchy::empty(CaseSensitive)
            .snapshot("/a/b", file("one"))
            .snapshot("/a/c", file("two"))
            .snapshot("/a", FileMetadata::Directory);
        assert_eq!(tree.find("/a"), Some(FileMetadata::Directory));
        assert_eq!(tree.find("/a/b"), Some(file("one")));
        assert_eq!(tree.find("/a/c"), Some(file("two")));
    }

    #[test]
    fn test_directory_marker_over_compressed_chain_round_trips() {
        let tree = SnapshotHierarchy::empty(CaseSensitive)
            .snapshot("/a/b/c", file("deep"))
            .snapshot("/a/b", FileMetadata::Directory);
        assert_eq!(tree.find("/a/b"), Some(FileMetadata::Directory));
        assert_eq!(tree.find("/a/b/c"), Some(file("deep")));
    }

    #[test]
    fn test_file_store_at_ancestor_replaces_subtree() {
        let tree = SnapshotHierarchy::empty(CaseSensitive)
            .snapshot("/a/b/c", file("deep"))
            .snapshot("/a/b", file("now-a-file"));
        assert_eq!(tree.find("/a/b"), Some(file("now-a-file")));
        // a file cannot have children; the old chain is gone
        assert_eq!(tree.find("/a/b/c"), Some(FileMetadata::Missing));
    }

    #[test]
    fn test_root_path_store_is_not_representable() {
        let tree = SnapshotHierarchy::empty(CaseSensitive).snapshot("/a", file("x"));
        let same = tree.snapshot("/", FileMetadata::Directory);
        assert_eq!(tree, same);
    }
}
