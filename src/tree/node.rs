//! Snapshot tree node variants and the node algebra
//!
//! A closed set of node kinds; every consumer matches exhaustively, so a
//! new kind is caught at compile time everywhere it matters. Nodes are
//! immutable: the store/invalidate operations build replacement nodes and
//! share untouched subtrees by reference.

use crate::case::CaseSensitivity;
use crate::metadata::{FileKind, FileMetadata};
use crate::path::VfsRelativePath;
use crate::tree::children::{self, ChildLookup, InvalidateOutcome, Invalidated, StorePayload};
use std::sync::Arc;

/// One node of the snapshot tree.
///
/// `path` is the node's label: the segment(s) from its parent's boundary
/// to itself. Labels of resolved nodes ([`FileSystemNode::Leaf`],
/// [`FileSystemNode::CompleteDirectory`]) are single segments; a
/// [`FileSystemNode::PathCompressed`] wrapper carries the multi-segment
/// label of a branchless chain and wraps the resolved node at its end.
/// [`FileSystemNode::PartialWithChildren`] labels may span any number of
/// segments.
#[derive(Debug, PartialEq, Eq)]
pub enum FileSystemNode {
    /// Directory whose full, ordered child set is known.
    CompleteDirectory {
        path: String,
        children: Vec<Arc<FileSystemNode>>,
    },
    /// Resolved snapshot: regular file, directory marker, or known-absent
    /// entry.
    Leaf { path: String, metadata: FileMetadata },
    /// Some children are known (queries or updates visited them) but the
    /// node's own metadata and/or its full enumeration is not: `metadata`
    /// may carry a resolved directory marker while the child set stays
    /// open-ended.
    PartialWithChildren {
        path: String,
        metadata: Option<FileMetadata>,
        children: Vec<Arc<FileSystemNode>>,
    },
    /// Path-compressed branchless chain: `path` spans several segments and
    /// the wrapped node carries the resolved state of the chain's end. The
    /// wrapped node's own label is the final segment of `path`.
    PathCompressed {
        path: String,
        node: Arc<FileSystemNode>,
    },
}

impl FileSystemNode {
    /// The node's label: its path segment(s) from the parent boundary.
    pub fn path(&self) -> &str {
        match self {
            FileSystemNode::CompleteDirectory { path, .. }
            | FileSystemNode::Leaf { path, .. }
            | FileSystemNode::PartialWithChildren { path, .. }
            | FileSystemNode::PathCompressed { path, .. } => path,
        }
    }

    /// Known children, in sibling order. Empty for leaves; a compressed
    /// wrapper exposes the children of its wrapped node.
    pub fn children(&self) -> &[Arc<FileSystemNode>] {
        match self {
            FileSystemNode::CompleteDirectory { children, .. }
            | FileSystemNode::PartialWithChildren { children, .. } => children,
            FileSystemNode::Leaf { .. } => &[],
            FileSystemNode::PathCompressed { node, .. } => node.children(),
        }
    }

    /// The resolved kind of this node, if its own state is known.
    pub fn metadata_kind(&self) -> Option<FileKind> {
        match self {
            FileSystemNode::CompleteDirectory { .. } => Some(FileKind::Directory),
            FileSystemNode::Leaf { metadata, .. } => Some(metadata.kind()),
            FileSystemNode::PartialWithChildren { metadata, .. } => {
                metadata.as_ref().map(FileMetadata::kind)
            }
            FileSystemNode::PathCompressed { node, .. } => node.metadata_kind(),
        }
    }

    /// The node's own resolved metadata, if known.
    pub(crate) fn own_metadata(&self) -> Option<FileMetadata> {
        match self {
            FileSystemNode::CompleteDirectory { .. } => Some(FileMetadata::Directory),
            FileSystemNode::Leaf { metadata, .. } => Some(metadata.clone()),
            FileSystemNode::PartialWithChildren { metadata, .. } => metadata.clone(),
            FileSystemNode::PathCompressed { node, .. } => node.own_metadata(),
        }
    }

    /// Look up a path strictly below this node.
    ///
    /// A complete directory knows the fate of every direct segment, so a
    /// segment absent from its enumeration is a known-absent entry; below
    /// a resolved file or missing entry everything is likewise known
    /// absent. A directory marker says nothing about children.
    pub(crate) fn find_below(
        &self,
        target: VfsRelativePath<'_>,
        case_sensitivity: CaseSensitivity,
    ) -> Option<FileMetadata> {
        match self {
            FileSystemNode::CompleteDirectory { children, .. } => {
                match children::find(children, target, case_sensitivity) {
                    ChildLookup::Found(metadata) => Some(metadata),
                    ChildLookup::NoSuchSegment => Some(FileMetadata::Missing),
                    ChildLookup::Unknown => None,
                }
            }
            FileSystemNode::PartialWithChildren { children, .. } => {
                match children::find(children, target, case_sensitivity) {
                    ChildLookup::Found(metadata) => Some(metadata),
                    _ => None,
                }
            }
            FileSystemNode::Leaf { metadata, .. } => match metadata {
                FileMetadata::RegularFile { .. } | FileMetadata::Missing => {
                    Some(FileMetadata::Missing)
                }
                FileMetadata::Directory => None,
            },
            FileSystemNode::PathCompressed { node, .. } => {
                node.find_below(target, case_sensitivity)
            }
        }
    }

    /// Store a snapshot at a path strictly below this node, returning the
    /// replacement node.
    pub(crate) fn store_below(
        &self,
        target: VfsRelativePath<'_>,
        payload: &StorePayload<'_>,
        case_sensitivity: CaseSensitivity,
    ) -> Arc<FileSystemNode> {
        match self {
            FileSystemNode::CompleteDirectory { path, children } => {
                Arc::new(FileSystemNode::CompleteDirectory {
                    path: path.clone(),
                    children: children::store(children, target, payload, case_sensitivity),
                })
            }
            FileSystemNode::PartialWithChildren {
                path,
                metadata,
                children,
            } => Arc::new(FileSystemNode::PartialWithChildren {
                path: path.clone(),
                metadata: metadata.clone(),
                children: children::store(children, target, payload, case_sensitivity),
            }),
            FileSystemNode::Leaf { path, metadata } => {
                let child = payload.node_for(target.as_str(), case_sensitivity);
                let kept = match metadata {
                    // a directory marker is not contradicted by children
                    FileMetadata::Directory => Some(FileMetadata::Directory),
                    // a file or missing entry is; the stale state is dropped
                    FileMetadata::RegularFile { .. } | FileMetadata::Missing => None,
                };
                partial_or_merge(path.clone(), kept, vec![child])
                    .expect("a node with a child never vanishes")
            }
            FileSystemNode::PathCompressed { path, node } => {
                let new_inner = node.store_below(target, payload, case_sensitivity);
                rewrap(path, node.path().len(), new_inner)
            }
        }
    }

    /// Invalidate a path strictly below this node.
    ///
    /// Only the invalidated region becomes unknown: the node's own resolved
    /// state survives, except that a complete directory which loses a
    /// direct child — or loses certainty about a segment its enumeration
    /// claimed absent — degrades to a partially known directory.
    pub(crate) fn invalidate_below(
        &self,
        target: VfsRelativePath<'_>,
        case_sensitivity: CaseSensitivity,
    ) -> Invalidated {
        match self {
            FileSystemNode::CompleteDirectory { path, children } => {
                match children::invalidate(children, target, case_sensitivity) {
                    InvalidateOutcome::NoSuchSegment => {
                        // the enumeration claimed this segment absent;
                        // that claim no longer holds
                        match partial_or_merge(
                            path.clone(),
                            Some(FileMetadata::Directory),
                            children.clone(),
                        ) {
                            Some(node) => Invalidated::Node(node),
                            None => Invalidated::Removed,
                        }
                    }
                    InvalidateOutcome::Untouched => Invalidated::Unchanged,
                    InvalidateOutcome::Changed(updated) => {
                        Invalidated::Node(Arc::new(FileSystemNode::CompleteDirectory {
                            path: path.clone(),
                            children: updated,
                        }))
                    }
                    InvalidateOutcome::RemovedChild(updated) => {
                        match partial_or_merge(
                            path.clone(),
                            Some(FileMetadata::Directory),
                            updated,
                        ) {
                            Some(node) => Invalidated::Node(node),
                            None => Invalidated::Removed,
                        }
                    }
                }
            }
            FileSystemNode::PartialWithChildren {
                path,
                metadata,
                children,
            } => match children::invalidate(children, target, case_sensitivity) {
                InvalidateOutcome::NoSuchSegment | InvalidateOutcome::Untouched => {
                    Invalidated::Unchanged
                }
                InvalidateOutcome::Changed(updated) => {
                    Invalidated::Node(Arc::new(FileSystemNode::PartialWithChildren {
                        path: path.clone(),
                        metadata: metadata.clone(),
                        children: updated,
                    }))
                }
                InvalidateOutcome::RemovedChild(updated) => {
                    match partial_or_merge(path.clone(), metadata.clone(), updated) {
                        Some(node) => Invalidated::Node(node),
                        None => Invalidated::Removed,
                    }
                }
            },
            FileSystemNode::Leaf { metadata, .. } => match metadata {
                // the resolved state implied "nothing below"; that
                // implication is now void, and so is the node
                FileMetadata::RegularFile { .. } | FileMetadata::Missing => Invalidated::Removed,
                // a bare marker never claimed anything below
                FileMetadata::Directory => Invalidated::Unchanged,
            },
            FileSystemNode::PathCompressed { path, node } => {
                match node.invalidate_below(target, case_sensitivity) {
                    Invalidated::Unchanged => Invalidated::Unchanged,
                    Invalidated::Removed => Invalidated::Removed,
                    Invalidated::Node(new_inner) => {
                        Invalidated::Node(rewrap(path, node.path().len(), new_inner))
                    }
                }
            }
        }
    }

    /// The same node relabeled with the suffix of its label starting at
    /// byte `from` (a segment start). Only multi-segment nodes can be
    /// split this way.
    pub(crate) fn with_path_suffix(&self, from: usize) -> Arc<FileSystemNode> {
        match self {
            FileSystemNode::PathCompressed { path, node } => {
                let suffix = &path[from..];
                if suffix.len() == node.path().len() {
                    Arc::clone(node)
                } else {
                    Arc::new(FileSystemNode::PathCompressed {
                        path: suffix.to_string(),
                        node: Arc::clone(node),
                    })
                }
            }
            FileSystemNode::PartialWithChildren {
                path,
                metadata,
                children,
            } => Arc::new(FileSystemNode::PartialWithChildren {
                path: path[from..].to_string(),
                metadata: metadata.clone(),
                children: children.clone(),
            }),
            FileSystemNode::Leaf { .. } | FileSystemNode::CompleteDirectory { .. } => {
                unreachable!("single-segment nodes are never split")
            }
        }
    }
}

/// Build the node for `path` over the given children and optional resolved
/// metadata, collapsing chains so that every node keeps either terminal
/// state or at least two children.
pub(crate) fn partial_or_merge(
    path: String,
    metadata: Option<FileMetadata>,
    children: Vec<Arc<FileSystemNode>>,
) -> Option<Arc<FileSystemNode>> {
    match (children.len(), metadata) {
        (0, None) => None,
        (0, Some(metadata)) => Some(leaf_for(path, metadata)),
        (1, None) => {
            let child = &children[0];
            Some(match child.as_ref() {
                FileSystemNode::Leaf { .. } | FileSystemNode::CompleteDirectory { .. } => {
                    Arc::new(FileSystemNode::PathCompressed {
                        path: join_labels(&path, child.path()),
                        node: Arc::clone(child),
                    })
                }
                FileSystemNode::PathCompressed {
                    path: child_path,
                    node,
                } => Arc::new(FileSystemNode::PathCompressed {
                    path: join_labels(&path, child_path),
                    node: Arc::clone(node),
                }),
                FileSystemNode::PartialWithChildren {
                    path: child_path,
                    metadata: child_metadata,
                    children: grandchildren,
                } => Arc::new(FileSystemNode::PartialWithChildren {
                    path: join_labels(&path, child_path),
                    metadata: child_metadata.clone(),
                    children: grandchildren.clone(),
                }),
            })
        }
        (_, metadata) => Some(Arc::new(FileSystemNode::PartialWithChildren {
            path,
            metadata,
            children,
        })),
    }
}

/// A resolved leaf for a (possibly multi-segment) label.
pub(crate) fn leaf_for(path: String, metadata: FileMetadata) -> Arc<FileSystemNode> {
    let segment = children::last_segment(&path);
    if segment.len() == path.len() {
        Arc::new(FileSystemNode::Leaf { path, metadata })
    } else {
        let node = Arc::new(FileSystemNode::Leaf {
            path: segment.to_string(),
            metadata,
        });
        Arc::new(FileSystemNode::PathCompressed { path, node })
    }
}

/// Re-attach a compressed wrapper's label after an operation on its
/// wrapped node. `old_label_len` is the length of the wrapped node's
/// label before the operation; any label growth (from merging below) is
/// carried over onto the wrapper.
fn rewrap(
    wrapper_path: &str,
    old_label_len: usize,
    new_inner: Arc<FileSystemNode>,
) -> Arc<FileSystemNode> {
    debug_assert!(
        new_inner.path().len() >= old_label_len,
        "a wrapped node never shrinks its label"
    );
    let grown = &new_inner.path()[old_label_len..];
    let combined = format!("{}{}", wrapper_path, grown);
    match new_inner.as_ref() {
        FileSystemNode::Leaf { .. } | FileSystemNode::CompleteDirectory { .. } => {
            Arc::new(FileSystemNode::PathCompressed {
                path: combined,
                node: new_inner,
            })
        }
        FileSystemNode::PathCompressed { node, .. } => Arc::new(FileSystemNode::PathCompressed {
            path: combined,
            node: Arc::clone(node),
        }),
        FileSystemNode::PartialWithChildren {
            metadata, children, ..
        } => Arc::new(FileSystemNode::PartialWithChildren {
            path: combined,
            metadata: metadata.clone(),
            children: children.clone(),
        }),
    }
}

fn join_labels(parent: &str, child: &str) -> String {
    format!("{}/{}", parent, child)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::FileMetadata;

    fn leaf(path: &str) -> Arc<FileSystemNode> {
        Arc::new(FileSystemNode::Leaf {
            path: path.to_string(),
            metadata: FileMetadata::file_from_bytes(path.as_bytes()),
        })
    }

    #[test]
    fn test_partial_or_merge_empty_is_none() {
        assert!(partial_or_merge("a".to_string(), None, vec![]).is_none());
    }

    #[test]
    fn test_partial_or_merge_metadata_without_children_is_a_leaf() {
        let node = partial_or_merge("a/b".to_string(), Some(FileMetadata::Directory), vec![])
            .unwrap();
        match node.as_ref() {
            FileSystemNode::PathCompressed { path, node } => {
                assert_eq!(path, "a/b");
                assert!(matches!(
                    node.as_ref(),
                    FileSystemNode::Leaf {
                        metadata: FileMetadata::Directory,
                        ..
                    }
                ));
            }
            other => panic!("expected compressed leaf, got {:?}", other),
        }
    }

    #[test]
    fn test_partial_or_merge_single_leaf_compresses() {
        let merged = partial_or_merge("a/b".to_string(), None, vec![leaf("c")]).unwrap();
        match merged.as_ref() {
            FileSystemNode::PathCompressed { path, node } => {
                assert_eq!(path, "a/b/c");
                assert_eq!(node.path(), "c");
            }
            other => panic!("expected compressed chain, got {:?}", other),
        }
    }

    #[test]
    fn test_partial_or_merge_keeps_marker_over_single_child() {
        let node = partial_or_merge(
            "a".to_string(),
            Some(FileMetadata::Directory),
            vec![leaf("b")],
        )
        .unwrap();
        match node.as_ref() {
            FileSystemNode::PartialWithChildren {
                metadata, children, ..
            } => {
                assert_eq!(metadata, &Some(FileMetadata::Directory));
                assert_eq!(children.len(), 1);
            }
            other => panic!("expected partial node, got {:?}", other),
        }
    }

    #[test]
    fn test_partial_or_merge_single_compressed_child_joins_labels() {
        let chain = Arc::new(FileSystemNode::PathCompressed {
            path: "b/c".to_string(),
            node: leaf("c"),
        });
        let merged = partial_or_merge("a".to_string(), None, vec![chain]).unwrap();
        match merged.as_ref() {
            FileSystemNode::PathCompressed { path, node } => {
                assert_eq!(path, "a/b/c");
                assert_eq!(node.path(), "c");
            }
            other => panic!("expected compressed chain, got {:?}", other),
        }
    }

    #[test]
    fn test_partial_or_merge_two_children_stay_partial() {
        let merged = partial_or_merge("a".to_string(), None, vec![leaf("b"), leaf("c")]).unwrap();
        match merged.as_ref() {
            FileSystemNode::PartialWithChildren { path, children, .. } => {
                assert_eq!(path, "a");
                assert_eq!(children.len(), 2);
            }
            other => panic!("expected partial node, got {:?}", other),
        }
    }

    #[test]
    fn test_with_path_suffix_on_compressed_chain() {
        let chain = FileSystemNode::PathCompressed {
            path: "a/b/c".to_string(),
            node: leaf("c"),
        };
        // splitting after "a" leaves the chain "b/c"
        let suffix = chain.with_path_suffix(2);
        match suffix.as_ref() {
            FileSystemNode::PathCompressed { path, .. } => assert_eq!(path, "b/c"),
            other => panic!("expected compressed chain, got {:?}", other),
        }
        // splitting after "a/b" unwraps the resolved node
        let unwrapped = chain.with_path_suffix(4);
        assert_eq!(unwrapped.path(), "c");
        assert!(matches!(unwrapped.as_ref(), FileSystemNode::Leaf { .. }));
    }

    #[test]
    fn test_metadata_kind_through_compression() {
        let chain = FileSystemNode::PathCompressed {
            path: "a/b".to_string(),
            node: leaf("b"),
        };
        assert_eq!(
            chain.metadata_kind(),
            Some(crate::metadata::FileKind::RegularFile)
        );
        let partial = FileSystemNode::PartialWithChildren {
            path: "a".to_string(),
            metadata: None,
            children: vec![],
        };
        assert_eq!(partial.metadata_kind(), None);
    }
}
