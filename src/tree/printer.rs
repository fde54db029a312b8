//! Diagnostic pretty-printer for the snapshot tree
//!
//! Walks the public node surface (label, kind, ordered children) and emits
//! one line per node through `tracing` at info level. Purely a debugging
//! aid; it imposes nothing on the tree beyond the public accessors.

use crate::metadata::FileMetadata;
use crate::tree::hierarchy::SnapshotHierarchy;
use crate::tree::node::FileSystemNode;
use tracing::{enabled, info, Level};

/// Log the tree, one line per node, if info logging is enabled.
pub fn pretty_print(hierarchy: &SnapshotHierarchy) {
    if !enabled!(Level::INFO) {
        return;
    }
    for line in render(hierarchy).lines() {
        info!("{}", line);
    }
}

/// Render the tree into a human-readable string.
pub fn render(hierarchy: &SnapshotHierarchy) -> String {
    let mut out = String::new();
    for root in hierarchy.roots() {
        render_node(root, 0, &mut out);
    }
    out
}

fn render_node(node: &FileSystemNode, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    let label = node.path().replace('\\', "/");
    out.push_str(&indent);
    out.push_str(&label);
    out.push_str(&describe(node));
    out.push('\n');
    for child in node.children() {
        render_node(child, depth + 1, out);
    }
}

fn describe(node: &FileSystemNode) -> String {
    match node {
        FileSystemNode::CompleteDirectory { .. } => " | directory".to_string(),
        FileSystemNode::Leaf { metadata, .. } => describe_metadata(metadata),
        FileSystemNode::PartialWithChildren { metadata, .. } => match metadata {
            Some(metadata) => describe_metadata(metadata),
            None => String::new(),
        },
        FileSystemNode::PathCompressed { node, .. } => describe(node),
    }
}

fn describe_metadata(metadata: &FileMetadata) -> String {
    match metadata {
        FileMetadata::RegularFile {
            fingerprint,
            length,
        } => format!(
            " | file {} ({} bytes)",
            &hex::encode(fingerprint)[..8],
            length
        ),
        FileMetadata::Directory => " | directory".to_string(),
        FileMetadata::Missing => " | missing".to_string(),
    }
}
