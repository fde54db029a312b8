//! Case-sensitivity policy and character comparison primitives
//!
//! Every path comparison in the snapshot tree is parameterized by a
//! [`CaseSensitivity`] chosen once per tree to match the host file system.
//! Comparisons operate on UTF-8 bytes: byte-wise comparison of UTF-8 is
//! code-point order, and case folding is ASCII-only, which matches the
//! case-insensitivity behavior of the common file systems.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Whether path comparisons distinguish character case.
///
/// Derived from host OS/file-system detection by the embedding build
/// engine; the tree never infers it. Threaded explicitly through every
/// comparison so trees with different policies can coexist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaseSensitivity {
    CaseSensitive,
    CaseInsensitive,
}

/// True iff `c` is a path separator character.
///
/// Both `/` and `\` are accepted so that snapshots built from
/// Windows-style absolute paths compare the same way as POSIX ones.
#[inline]
pub fn is_file_separator(c: u8) -> bool {
    c == b'/' || c == b'\\'
}

/// Character equality under the given sensitivity policy.
#[inline]
pub fn equal_chars(a: u8, b: u8, case_sensitivity: CaseSensitivity) -> bool {
    match case_sensitivity {
        CaseSensitivity::CaseSensitive => a == b,
        CaseSensitivity::CaseInsensitive => a.eq_ignore_ascii_case(&b),
    }
}

/// Total order by code point, used as the case-sensitive tie-breaker.
#[inline]
pub fn compare_chars(a: u8, b: u8) -> Ordering {
    a.cmp(&b)
}

/// Total order after case folding.
///
/// This is the primary ordering key for all path comparisons regardless of
/// the tree's sensitivity mode; case-sensitive mode only adds a secondary
/// tie-break, so sibling order is stable across both modes.
#[inline]
pub fn compare_chars_ignoring_case(a: u8, b: u8) -> Ordering {
    a.to_ascii_lowercase().cmp(&b.to_ascii_lowercase())
}

/// Accumulate the case-sensitive tie-break over a run of fold-equal
/// characters: the first exact-case difference wins, and only when the
/// tree is case-sensitive.
#[inline]
pub(crate) fn combined_compare(
    previous: Ordering,
    a: u8,
    b: u8,
    case_sensitive: bool,
) -> Ordering {
    if !case_sensitive {
        return Ordering::Equal;
    }
    previous.then(compare_chars(a, b))
}
