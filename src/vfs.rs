//! Shared handle over the current snapshot generation
//!
//! The hierarchy itself is immutable; what the build engine needs on top
//! is one point of coordination for replacing the current generation.
//! Reads clone the current generation out of the lock and traverse it
//! entirely outside; writers serialize against each other on the write
//! lock while never touching nodes already published to readers.

use crate::case::CaseSensitivity;
use crate::metadata::{DirectoryEntry, FileMetadata};
use crate::tree::hierarchy::SnapshotHierarchy;
use parking_lot::RwLock;

/// Thread-safe owner of the current [`SnapshotHierarchy`] generation.
pub struct VirtualFileSystem {
    current: RwLock<SnapshotHierarchy>,
}

impl VirtualFileSystem {
    /// An empty virtual filesystem under the given comparison policy.
    pub fn new(case_sensitivity: CaseSensitivity) -> Self {
        VirtualFileSystem {
            current: RwLock::new(SnapshotHierarchy::empty(case_sensitivity)),
        }
    }

    /// Take over an existing generation.
    pub fn with_hierarchy(hierarchy: SnapshotHierarchy) -> Self {
        VirtualFileSystem {
            current: RwLock::new(hierarchy),
        }
    }

    /// The current generation; cheap, node storage is shared.
    pub fn current(&self) -> SnapshotHierarchy {
        self.current.read().clone()
    }

    /// Resolved metadata for `absolute_path` in the current generation.
    pub fn find(&self, absolute_path: &str) -> Option<FileMetadata> {
        self.current().find(absolute_path)
    }

    /// Record `metadata` at `absolute_path`.
    pub fn snapshot(&self, absolute_path: &str, metadata: FileMetadata) {
        let mut current = self.current.write();
        *current = current.snapshot(absolute_path, metadata);
    }

    /// Install a complete directory enumeration at `absolute_path`.
    pub fn snapshot_directory(&self, absolute_path: &str, entries: &[DirectoryEntry]) {
        let mut current = self.current.write();
        *current = current.snapshot_directory(absolute_path, entries);
    }

    /// Mark everything at and below `absolute_path` unknown.
    pub fn invalidate(&self, absolute_path: &str) {
        let mut current = self.current.write();
        *current = current.invalidate(absolute_path);
    }
}
