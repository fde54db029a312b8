//! Ordered child-list operations shared by interior nodes and the root
//!
//! Children are kept in strict first-segment order under the tree's
//! case-sensitivity policy, so lookup, store and invalidate all position a
//! candidate path among siblings with a single binary search.

use crate::case::CaseSensitivity;
use crate::metadata::{DirectoryEntry, FileMetadata};
use crate::path::VfsRelativePath;
use crate::tree::node::FileSystemNode;
use std::cmp::Ordering;
use std::sync::Arc;

/// Result of looking up a path in a child list.
pub(crate) enum ChildLookup {
    /// The path is snapshotted with this metadata.
    Found(FileMetadata),
    /// A child owns the path's first segment but the state at the path is
    /// unresolved (divergence inside a compressed label, or unknown below).
    Unknown,
    /// No child owns the path's first segment.
    NoSuchSegment,
}

/// Result of invalidating a path within a child list.
///
/// The distinction between the variants matters to complete directories:
/// losing a direct child, or losing certainty about a segment the
/// enumeration claims absent, costs the parent its completeness, while a
/// deeper change (or a no-op on an already-unknown region) does not.
pub(crate) enum InvalidateOutcome {
    /// No child owns the path's first segment.
    NoSuchSegment,
    /// The path is covered but already unknown; the list is unaffected.
    Untouched,
    /// A child was replaced in place.
    Changed(Vec<Arc<FileSystemNode>>),
    /// A direct child was dropped from the list.
    RemovedChild(Vec<Arc<FileSystemNode>>),
}

/// What a store operation writes at the target path.
pub(crate) enum StorePayload<'a> {
    /// Leaf metadata from the metadata producer.
    Metadata(&'a FileMetadata),
    /// A complete directory enumeration from a disk walker.
    Listing(&'a [DirectoryEntry]),
}

impl StorePayload<'_> {
    /// Build the node for `label` (one or more segments) carrying this
    /// payload at the label's final segment.
    pub(crate) fn node_for(&self, label: &str, case_sensitivity: CaseSensitivity) -> Arc<FileSystemNode> {
        let resolved = match self {
            StorePayload::Metadata(metadata) => Arc::new(FileSystemNode::Leaf {
                path: last_segment(label).to_string(),
                metadata: (*metadata).clone(),
            }),
            StorePayload::Listing(entries) => Arc::new(FileSystemNode::CompleteDirectory {
                path: last_segment(label).to_string(),
                children: nodes_from_listing(entries, case_sensitivity),
            }),
        };
        if label.len() == resolved.path().len() {
            resolved
        } else {
            Arc::new(FileSystemNode::PathCompressed {
                path: label.to_string(),
                node: resolved,
            })
        }
    }
}

/// Position `target` among `children` by first-segment order.
fn search(
    children: &[Arc<FileSystemNode>],
    target: VfsRelativePath<'_>,
    case_sensitivity: CaseSensitivity,
) -> Result<usize, usize> {
    children.binary_search_by(|child| {
        target
            .compare_with_common_prefix(child.path(), case_sensitivity)
            .reverse()
    })
}

/// Look up `target` in an ordered child list.
pub(crate) fn find(
    children: &[Arc<FileSystemNode>],
    target: VfsRelativePath<'_>,
    case_sensitivity: CaseSensitivity,
) -> ChildLookup {
    let index = match search(children, target, case_sensitivity) {
        Ok(index) => index,
        Err(_) => return ChildLookup::NoSuchSegment,
    };
    let child = &children[index];
    let prefix_len = target.size_of_common_prefix(child.path(), case_sensitivity);
    if prefix_len < child.path().len() {
        // divergence inside a compressed label: all-or-nothing, no entry
        return ChildLookup::Unknown;
    }
    if target.length() == prefix_len {
        match child.own_metadata() {
            Some(metadata) => ChildLookup::Found(metadata),
            None => ChildLookup::Unknown,
        }
    } else {
        match child.find_below(target.with_new_offset(prefix_len + 1), case_sensitivity) {
            Some(metadata) => ChildLookup::Found(metadata),
            None => ChildLookup::Unknown,
        }
    }
}

/// Store `payload` at `target`, returning the new child list.
///
/// Splits a compressed label when the target diverges partway through it;
/// untouched siblings are shared by reference with the previous list.
pub(crate) fn store(
    children: &[Arc<FileSystemNode>],
    target: VfsRelativePath<'_>,
    payload: &StorePayload<'_>,
    case_sensitivity: CaseSensitivity,
) -> Vec<Arc<FileSystemNode>> {
    match search(children, target, case_sensitivity) {
        Err(insert_at) => {
            let mut updated = children.to_vec();
            updated.insert(insert_at, payload.node_for(target.as_str(), case_sensitivity));
            updated
        }
        Ok(index) => {
            let child = &children[index];
            let prefix_len = target.size_of_common_prefix(child.path(), case_sensitivity);
            let new_child = if prefix_len == child.path().len() {
                if target.length() == prefix_len {
                    store_at_child(child, payload, case_sensitivity)
                } else {
                    child.store_below(
                        target.with_new_offset(prefix_len + 1),
                        payload,
                        case_sensitivity,
                    )
                }
            } else {
                split_and_store(child, target, prefix_len, payload, case_sensitivity)
            };
            let mut updated = children.to_vec();
            updated[index] = new_child;
            updated
        }
    }
}

/// Store a snapshot exactly at `child`'s own path.
///
/// Anything but a bare directory marker replaces the subtree wholesale; a
/// marker merges into what is already known, since known children do not
/// contradict it.
fn store_at_child(
    child: &Arc<FileSystemNode>,
    payload: &StorePayload<'_>,
    case_sensitivity: CaseSensitivity,
) -> Arc<FileSystemNode> {
    if !matches!(payload, StorePayload::Metadata(FileMetadata::Directory)) {
        return payload.node_for(child.path(), case_sensitivity);
    }
    match child.as_ref() {
        // already known to be a directory, or better
        FileSystemNode::CompleteDirectory { .. } => Arc::clone(child),
        FileSystemNode::Leaf { path, .. } => Arc::new(FileSystemNode::Leaf {
            path: path.clone(),
            metadata: FileMetadata::Directory,
        }),
        FileSystemNode::PartialWithChildren { path, children, .. } => {
            Arc::new(FileSystemNode::PartialWithChildren {
                path: path.clone(),
                metadata: Some(FileMetadata::Directory),
                children: children.clone(),
            })
        }
        FileSystemNode::PathCompressed { path, node } => match node.as_ref() {
            FileSystemNode::CompleteDirectory { .. } => Arc::clone(child),
            _ => Arc::new(FileSystemNode::PathCompressed {
                path: path.clone(),
                node: Arc::new(FileSystemNode::Leaf {
                    path: node.path().to_string(),
                    metadata: FileMetadata::Directory,
                }),
            }),
        },
    }
}

/// Store at a target that diverges inside `child`'s compressed label after
/// `prefix_len` shared bytes (a segment boundary).
fn split_and_store(
    child: &Arc<FileSystemNode>,
    target: VfsRelativePath<'_>,
    prefix_len: usize,
    payload: &StorePayload<'_>,
    case_sensitivity: CaseSensitivity,
) -> Arc<FileSystemNode> {
    let shared = &child.path()[..prefix_len];
    if target.length() == prefix_len {
        // the target is an ancestor of the compressed chain; only a
        // directory marker coexists with the knowledge below it
        return match payload {
            StorePayload::Metadata(FileMetadata::Directory) => {
                Arc::new(FileSystemNode::PartialWithChildren {
                    path: shared.to_string(),
                    metadata: Some(FileMetadata::Directory),
                    children: vec![child.with_path_suffix(prefix_len + 1)],
                })
            }
            _ => payload.node_for(shared, case_sensitivity),
        };
    }
    let relocated = child.with_path_suffix(prefix_len + 1);
    let inserted = payload.node_for(
        target.with_new_offset(prefix_len + 1).as_str(),
        case_sensitivity,
    );
    let pair = sorted_pair(relocated, inserted, case_sensitivity);
    Arc::new(FileSystemNode::PartialWithChildren {
        path: shared.to_string(),
        metadata: None,
        children: pair,
    })
}

/// Invalidate `target` within an ordered child list.
pub(crate) fn invalidate(
    children: &[Arc<FileSystemNode>],
    target: VfsRelativePath<'_>,
    case_sensitivity: CaseSensitivity,
) -> InvalidateOutcome {
    let index = match search(children, target, case_sensitivity) {
        Ok(index) => index,
        Err(_) => return InvalidateOutcome::NoSuchSegment,
    };
    let child = &children[index];
    let prefix_len = target.size_of_common_prefix(child.path(), case_sensitivity);
    if prefix_len == child.path().len() && target.length() > prefix_len {
        // strictly below the child
        return match child.invalidate_below(
            target.with_new_offset(prefix_len + 1),
            case_sensitivity,
        ) {
            Invalidated::Unchanged => InvalidateOutcome::Untouched,
            Invalidated::Node(new_child) => {
                let mut updated = children.to_vec();
                updated[index] = new_child;
                InvalidateOutcome::Changed(updated)
            }
            Invalidated::Removed => InvalidateOutcome::RemovedChild(remove_at(children, index)),
        };
    }
    if target.length() == prefix_len {
        // exact match, or an ancestor of a compressed chain: the whole
        // subtree becomes unknown
        return InvalidateOutcome::RemovedChild(remove_at(children, index));
    }
    // divergence inside the label: nothing stored under the target
    InvalidateOutcome::Untouched
}

/// Result of invalidating a path strictly below a node.
pub(crate) enum Invalidated {
    Unchanged,
    Node(Arc<FileSystemNode>),
    Removed,
}

/// Order two sibling labels (used when splitting and when sorting walker
/// listings).
pub(crate) fn compare_labels(a: &str, b: &str, case_sensitivity: CaseSensitivity) -> Ordering {
    VfsRelativePath::of(a, 0).compare_with_common_prefix(b, case_sensitivity)
}

fn sorted_pair(
    a: Arc<FileSystemNode>,
    b: Arc<FileSystemNode>,
    case_sensitivity: CaseSensitivity,
) -> Vec<Arc<FileSystemNode>> {
    match compare_labels(a.path(), b.path(), case_sensitivity) {
        Ordering::Greater => vec![b, a],
        _ => vec![a, b],
    }
}

fn remove_at(children: &[Arc<FileSystemNode>], index: usize) -> Vec<Arc<FileSystemNode>> {
    let mut updated = children.to_vec();
    updated.remove(index);
    updated
}

/// Build ordered child nodes from a walker's directory listing.
pub(crate) fn nodes_from_listing(
    entries: &[DirectoryEntry],
    case_sensitivity: CaseSensitivity,
) -> Vec<Arc<FileSystemNode>> {
    let mut nodes: Vec<Arc<FileSystemNode>> = entries
        .iter()
        .map(|entry| node_from_entry(entry, case_sensitivity))
        .collect();
    nodes.sort_by(|a, b| compare_labels(a.path(), b.path(), case_sensitivity));
    nodes
}

fn node_from_entry(entry: &DirectoryEntry, case_sensitivity: CaseSensitivity) -> Arc<FileSystemNode> {
    match entry {
        DirectoryEntry::File {
            name,
            fingerprint,
            length,
        } => Arc::new(FileSystemNode::Leaf {
            path: name.clone(),
            metadata: FileMetadata::RegularFile {
                fingerprint: *fingerprint,
                length: *length,
            },
        }),
        DirectoryEntry::Directory { name, entries } => Arc::new(FileSystemNode::CompleteDirectory {
            path: name.clone(),
            children: nodes_from_listing(entries, case_sensitivity),
        }),
    }
}

/// The final segment of a (possibly multi-segment) label.
pub(crate) fn last_segment(label: &str) -> &str {
    match label.rfind(['/', '\\']) {
        Some(pos) => &label[pos + 1..],
        None => label,
    }
}
