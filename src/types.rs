//! Core types for the virtual filesystem snapshot engine.

/// Fingerprint: deterministic 256-bit content hash of a regular file
pub type Fingerprint = [u8; 32];
