//! Snapshot metadata for filesystem entries
//!
//! The payload attached to resolved tree nodes. Metadata is produced by an
//! external collaborator (the disk-walking layer) and treated as opaque by
//! the tree: fingerprints are never interpreted, only stored and compared.

use crate::types::Fingerprint;
use serde::{Deserialize, Serialize};

/// Resolved snapshot state of a single filesystem entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileMetadata {
    /// Regular file with a content fingerprint and byte length.
    RegularFile {
        fingerprint: Fingerprint,
        length: u64,
    },
    /// Directory marker; says nothing about the child set.
    Directory,
    /// The entry is known not to exist.
    Missing,
}

impl FileMetadata {
    /// Metadata for a regular file, fingerprinting the given content.
    ///
    /// Convenience for metadata producers; the tree itself never hashes.
    pub fn file_from_bytes(content: &[u8]) -> Self {
        FileMetadata::RegularFile {
            fingerprint: fingerprint_bytes(content),
            length: content.len() as u64,
        }
    }

    /// The kind classification of this metadata.
    pub fn kind(&self) -> FileKind {
        match self {
            FileMetadata::RegularFile { .. } => FileKind::RegularFile,
            FileMetadata::Directory => FileKind::Directory,
            FileMetadata::Missing => FileKind::Missing,
        }
    }
}

/// Kind of a filesystem entry as recorded in a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileKind {
    RegularFile,
    Directory,
    Missing,
}

impl FileKind {
    pub fn name(&self) -> &'static str {
        match self {
            FileKind::RegularFile => "file",
            FileKind::Directory => "directory",
            FileKind::Missing => "missing",
        }
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Compute a content fingerprint.
pub fn fingerprint_bytes(content: &[u8]) -> Fingerprint {
    *blake3::hash(content).as_bytes()
}

/// One entry of a fully enumerated directory, as handed over by a disk
/// walker. Consumed by complete-directory snapshot construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryEntry {
    File {
        name: String,
        fingerprint: Fingerprint,
        length: u64,
    },
    Directory {
        name: String,
        entries: Vec<DirectoryEntry>,
    },
}

impl DirectoryEntry {
    pub fn name(&self) -> &str {
        match self {
            DirectoryEntry::File { name, .. } => name,
            DirectoryEntry::Directory { name, .. } => name,
        }
    }
}

/// Interface of the external metadata producer.
///
/// Implementations stat/hash the real file system (or fake one in tests);
/// the tree only ever receives resolved metadata through this boundary.
pub trait MetadataSource {
    /// Resolved metadata for `absolute_path`, including an explicit
    /// [`FileMetadata::Missing`] for entries that do not exist.
    fn metadata(&self, absolute_path: &str) -> FileMetadata;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_from_bytes_is_deterministic() {
        let a = FileMetadata::file_from_bytes(b"content");
        let b = FileMetadata::file_from_bytes(b"content");
        assert_eq!(a, b);
        assert_ne!(a, FileMetadata::file_from_bytes(b"other"));
    }

    #[test]
    fn test_file_from_bytes_records_length() {
        match FileMetadata::file_from_bytes(b"12345") {
            FileMetadata::RegularFile { length, .. } => assert_eq!(length, 5),
            other => panic!("expected regular file, got {:?}", other),
        }
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(FileMetadata::file_from_bytes(b"x").kind(), FileKind::RegularFile);
        assert_eq!(FileMetadata::Directory.kind(), FileKind::Directory);
        assert_eq!(FileMetadata::Missing.kind(), FileKind::Missing);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(FileKind::RegularFile.name(), "file");
        assert_eq!(FileKind::Directory.to_string(), "directory");
    }
}
