//! Snapfs: In-Memory Virtual Filesystem Snapshots
//!
//! A persistent, path-compressed tree of filesystem state that lets an
//! incremental build tool determine cheaply and correctly what changed on
//! disk between two invocations. Comparisons are case-sensitive or
//! case-insensitive to match the host file system; mutations return new
//! tree generations sharing untouched subtrees with previous ones.

pub mod case;
pub mod error;
pub mod logging;
pub mod metadata;
pub mod path;
pub mod tree;
pub mod types;
pub mod vfs;
