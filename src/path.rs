//! Relative paths viewed through an offset into an absolute path
//!
//! A [`VfsRelativePath`] is a cheap view over an absolute path string plus
//! a byte offset: "the path from this node downward". Tree operations pass
//! one view down the hierarchy, advancing the offset instead of slicing new
//! strings. All comparison operations run in a single linear scan over the
//! overlapping prefix, bounded by `min(candidate.len, view.len)`.

use crate::case::{
    combined_compare, compare_chars_ignoring_case, equal_chars, is_file_separator, CaseSensitivity,
};
use std::cmp::Ordering;

/// View over the suffix of an absolute path starting at a byte offset.
///
/// The offset may be at most `absolute_path.len() + 1`; the one-past-the-end
/// value is a sentinel meaning "this view denotes the node itself" (zero
/// remaining path). Views are value types: shifting the offset produces a
/// new view, never mutates one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VfsRelativePath<'a> {
    absolute_path: &'a str,
    offset: usize,
}

impl<'a> VfsRelativePath<'a> {
    /// View of `absolute_path` starting at `offset`.
    ///
    /// Offsets beyond the sentinel bound or inside a multi-byte character
    /// indicate a node-algebra bug, not user input, and are rejected by a
    /// debug assertion.
    pub fn of(absolute_path: &'a str, offset: usize) -> Self {
        debug_assert!(
            offset <= absolute_path.len() + 1,
            "offset {} out of bounds for path of length {}",
            offset,
            absolute_path.len()
        );
        debug_assert!(
            offset > absolute_path.len() || absolute_path.is_char_boundary(offset),
            "offset {} is not a character boundary",
            offset
        );
        VfsRelativePath {
            absolute_path,
            offset,
        }
    }

    /// View of an absolute path with any leading separators skipped, so the
    /// remaining path starts at its first segment.
    pub fn from_absolute(absolute_path: &'a str) -> Self {
        let offset = absolute_path
            .bytes()
            .take_while(|c| is_file_separator(*c))
            .count();
        VfsRelativePath::of(absolute_path, offset)
    }

    /// A view shifted `add_to` bytes further into the path.
    pub fn with_new_offset(self, add_to: usize) -> Self {
        VfsRelativePath::of(self.absolute_path, self.offset + add_to)
    }

    /// The sentinel view denoting the owning node itself.
    pub fn as_this(self) -> Self {
        VfsRelativePath {
            absolute_path: self.absolute_path,
            offset: self.absolute_path.len() + 1,
        }
    }

    /// True iff this view denotes the owning node itself.
    pub fn is_this(&self) -> bool {
        self.offset == self.absolute_path.len() + 1
    }

    /// Remaining length in bytes; zero for the sentinel view.
    pub fn length(&self) -> usize {
        self.absolute_path.len().saturating_sub(self.offset)
    }

    /// The remaining path as a string slice; empty for the sentinel view.
    pub fn as_str(&self) -> &'a str {
        if self.offset > self.absolute_path.len() {
            ""
        } else {
            &self.absolute_path[self.offset..]
        }
    }

    /// The full absolute path this view was created from.
    pub fn absolute_path(&self) -> &'a str {
        self.absolute_path
    }

    fn remaining(&self) -> &'a [u8] {
        self.as_str().as_bytes()
    }

    /// Size of the common prefix of `relative_path` and the remaining path,
    /// truncated down to the last complete segment boundary.
    ///
    /// A partial match inside a segment does not count: the result is the
    /// offset of the last separator seen, unless the scan ran to the end of
    /// the shorter string and the divergence point sits exactly at a
    /// separator in the longer one (or the strings are wholly equal), in
    /// which case the full scanned length is returned. The result never
    /// includes a trailing separator.
    pub fn size_of_common_prefix(
        &self,
        relative_path: &str,
        case_sensitivity: CaseSensitivity,
    ) -> usize {
        let this = self.remaining();
        let other = relative_path.as_bytes();
        let max_pos = other.len().min(this.len());
        let mut last_separator = 0;
        let mut pos = 0;
        while pos < max_pos {
            if !equal_chars(other[pos], this[pos], case_sensitivity) {
                break;
            }
            if is_file_separator(other[pos]) {
                last_separator = pos;
            }
            pos += 1;
        }
        if pos == max_pos {
            if other.len() == this.len() {
                return pos;
            }
            if pos < other.len() && is_file_separator(other[pos]) {
                return pos;
            }
            if pos < this.len() && is_file_separator(this[pos]) {
                return pos;
            }
        }
        last_separator
    }

    /// Order the remaining path against `relative_path` by first segment.
    ///
    /// Returns `Equal` as soon as the two paths share a complete first
    /// segment — a path counts as a continuation of its own prefix, so
    /// `some/same` and `some/same/more` compare equal here. Otherwise the
    /// result is the folded ordering of the first segments (view relative
    /// to candidate), with the exact-case tie-break applied only under
    /// [`CaseSensitivity::CaseSensitive`].
    ///
    /// Neither path may start with a separator. Children of a node are kept
    /// sorted by this comparison, so binary search can position a candidate
    /// among siblings without resolving beyond its first segment:
    ///
    /// ```text
    /// view some/path   == candidate some/other
    /// view some1/path  <  candidate some2/other
    /// view some/same   == candidate some/same/more
    /// ```
    pub fn compare_with_common_prefix(
        &self,
        relative_path: &str,
        case_sensitivity: CaseSensitivity,
    ) -> Ordering {
        let this = self.remaining();
        let other = relative_path.as_bytes();
        let max_pos = other.len().min(this.len());
        let case_sensitive = case_sensitivity == CaseSensitivity::CaseSensitive;
        let mut accumulated = Ordering::Equal;
        for pos in 0..max_pos {
            let compared = compare_chars_ignoring_case(this[pos], other[pos]);
            if compared != Ordering::Equal {
                return compared;
            }
            accumulated = combined_compare(accumulated, this[pos], other[pos], case_sensitive);
            if is_file_separator(this[pos]) && pos > 0 {
                return accumulated;
            }
        }
        match this.len().cmp(&other.len()) {
            Ordering::Equal => accumulated,
            Ordering::Greater => {
                if is_file_separator(this[max_pos]) {
                    accumulated
                } else {
                    Ordering::Greater
                }
            }
            Ordering::Less => {
                if is_file_separator(other[max_pos]) {
                    accumulated
                } else {
                    Ordering::Less
                }
            }
        }
    }

    /// True iff the remaining path starts with `prefix`, ending exactly at a
    /// segment boundary (end of path or a separator). The empty prefix
    /// always matches.
    pub fn is_prefix(&self, prefix: &str, case_sensitivity: CaseSensitivity) -> bool {
        if prefix.is_empty() {
            return true;
        }
        let this = self.remaining();
        let prefix = prefix.as_bytes();
        if this.len() < prefix.len() {
            return false;
        }
        let matches = match case_sensitivity {
            CaseSensitivity::CaseSensitive => this[..prefix.len()] == *prefix,
            CaseSensitivity::CaseInsensitive => {
                this[..prefix.len()].eq_ignore_ascii_case(prefix)
            }
        };
        matches && (this.len() == prefix.len() || is_file_separator(this[prefix.len()]))
    }

    /// Three-way [`VfsRelativePath::is_prefix`]: `Equal` iff `prefix` is a
    /// boundary-respecting prefix of the remaining path (the path is the
    /// prefix or a descendant of it), otherwise the ordering of `prefix`
    /// against the path.
    ///
    /// When the remaining path is shorter than the prefix the comparison
    /// falls through to whole-path ordering: first divergence in the
    /// overlap, then length, then the exact-case tie-break:
    ///
    /// ```text
    /// some/start == some/start/subpath
    /// some/start == some/start
    /// some/a     <  some/start
    /// some/b     >  some/a
    /// ```
    pub fn compare_to_prefix(
        &self,
        prefix: &str,
        case_sensitivity: CaseSensitivity,
    ) -> Ordering {
        let this = self.remaining();
        let prefix_length = prefix.len();
        if this.len() < prefix_length {
            return self.compare_paths(prefix, case_sensitivity);
        }
        let case_sensitive = case_sensitivity == CaseSensitivity::CaseSensitive;
        self.compare_path_regions(prefix, prefix_length, case_sensitive, |accumulated| {
            if prefix_length == this.len() || is_file_separator(this[prefix_length]) {
                accumulated
            } else {
                Ordering::Less
            }
        })
    }

    /// Whole-path comparison: first divergence wins, then shorter-first,
    /// then the accumulated exact-case tie-break.
    fn compare_paths(&self, relative_path: &str, case_sensitivity: CaseSensitivity) -> Ordering {
        let this_len = self.length();
        let max_pos = relative_path.len().min(this_len);
        let case_sensitive = case_sensitivity == CaseSensitivity::CaseSensitive;
        self.compare_path_regions(relative_path, max_pos, case_sensitive, |accumulated| {
            relative_path.len().cmp(&this_len).then(accumulated)
        })
    }

    /// Scan `max_pos` bytes of both paths, returning the first fold-level
    /// difference; an exact-case difference is deferred until the end of
    /// the segment it occurred in. `and_then_compare` resolves the result
    /// when the scan completes.
    fn compare_path_regions(
        &self,
        relative_path: &str,
        max_pos: usize,
        case_sensitive: bool,
        and_then_compare: impl FnOnce(Ordering) -> Ordering,
    ) -> Ordering {
        let this = self.remaining();
        let other = relative_path.as_bytes();
        let mut accumulated = Ordering::Equal;
        for pos in 0..max_pos {
            let compared = compare_chars_ignoring_case(other[pos], this[pos]);
            if compared != Ordering::Equal {
                return compared;
            }
            accumulated = combined_compare(accumulated, other[pos], this[pos], case_sensitive);
            if accumulated != Ordering::Equal && is_file_separator(other[pos]) {
                return accumulated;
            }
        }
        and_then_compare(accumulated)
    }
}
