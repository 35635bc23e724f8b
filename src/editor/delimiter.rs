//! Line delimiter detection and small numeric helpers.

use std::fmt;

/// The byte sequence that separates lines in a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineDelimiter {
    /// `"\n"`
    #[default]
    Lf,
    /// `"\r\n"`
    Crlf,
}

impl LineDelimiter {
    /// The delimiter as a string slice.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::Crlf => "\r\n",
        }
    }

    /// Number of code points (and bytes) in the delimiter.
    pub const fn len(self) -> usize {
        match self {
            Self::Lf => 1,
            Self::Crlf => 2,
        }
    }

    /// Always false; a delimiter is never empty.
    pub const fn is_empty(self) -> bool {
        false
    }
}

impl fmt::Display for LineDelimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lf => f.write_str("LF"),
            Self::Crlf => f.write_str("CRLF"),
        }
    }
}

/// Detect the line delimiter used by `contents`.
///
/// Only the first `'\n'` is inspected: if the byte before it is `'\r'` the
/// delimiter is CRLF, otherwise LF. Content without any newline defaults to LF.
pub fn detect_line_delim(contents: &[u8]) -> LineDelimiter {
    match contents.iter().position(|&b| b == b'\n') {
        Some(lf) if lf > 0 && contents[lf - 1] == b'\r' => LineDelimiter::Crlf,
        _ => LineDelimiter::Lf,
    }
}

/// Keep `v` within `lo..=hi`. `lo` must not exceed `hi`.
pub fn clamp(v: usize, lo: usize, hi: usize) -> usize {
    debug_assert!(lo <= hi, "clamp bounds inverted: {lo} > {hi}");
    v.max(lo).min(hi)
}
