use std::borrow::Cow;
use std::io;

use ropey::Rope;

use super::buffer::{Buffer, BufferError, BufferId, Position, Result};
use super::cursor::{Anchor, Cursor};
use super::delimiter::{LineDelimiter, clamp, detect_line_delim};
use crate::config::{BufferConfig, DelimiterMode};
use crate::perf;

/// A [`Buffer`] backed by a rope data structure.
///
/// Insertion, deletion, and line lookup are logarithmic in the size of the
/// text. The rope only recognizes `'\n'` as a line break, so a CRLF line ends
/// with `'\r'` as far as the rope is concerned; the buffer strips it according
/// to the active [`LineDelimiter`].
pub struct RopeBuffer {
    id: BufferId,
    rope: Rope,
    anchors: Vec<Anchor>,
    line_delim: LineDelimiter,
}

/// Char-index layout of one line.
#[derive(Debug, Clone, Copy)]
struct LineSpan {
    start: usize,
    content: usize,
    delim: usize,
    /// Whether the line ends with `'\n'` (every line but the last).
    terminated: bool,
}

impl LineSpan {
    /// Furthest column a position walk can reach: the line's `'\n'`, or the end
    /// of the buffer on the last line.
    const fn max_walk(self) -> usize {
        if self.terminated {
            self.content + self.delim - 1
        } else {
            self.content
        }
    }
}

impl RopeBuffer {
    /// Create a buffer from text, detecting its line delimiter.
    pub fn new(text: &str) -> Self {
        Self {
            id: BufferId::next(),
            rope: Rope::from_str(text),
            anchors: Vec::new(),
            line_delim: detect_line_delim(text.as_bytes()),
        }
    }

    /// Create a buffer from raw bytes. Invalid UTF-8 is replaced.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::new(&String::from_utf8_lossy(bytes))
    }

    /// Read a buffer from `reader`, detecting its line delimiter.
    ///
    /// # Errors
    /// Returns an error if reading fails or the data is not valid UTF-8.
    pub fn from_reader(reader: impl io::Read) -> io::Result<Self> {
        let rope = Rope::from_reader(reader)?;
        let line_delim = detect_line_delim(first_line_bytes(&rope).as_bytes());
        Ok(Self {
            id: BufferId::next(),
            rope,
            anchors: Vec::new(),
            line_delim,
        })
    }

    /// Create a buffer with the per-buffer settings from `config` applied.
    ///
    /// The perf flag is process-wide and is left alone here; see
    /// [`crate::config::load_effective_config`].
    pub fn with_config(text: &str, config: &BufferConfig) -> Self {
        let mut buf = Self::new(text);
        match config.line_delimiter {
            Some(DelimiterMode::Lf) => buf.line_delim = LineDelimiter::Lf,
            Some(DelimiterMode::Crlf) => buf.line_delim = LineDelimiter::Crlf,
            Some(DelimiterMode::Auto) | None => {}
        }
        buf
    }

    /// The full text content of the buffer.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Number of registered cursors, including dropped ones not yet pruned.
    pub fn anchor_count(&self) -> usize {
        self.anchors.len()
    }

    fn check_line(&self, line: usize) -> Result<()> {
        let lines = self.rope.len_lines();
        if line < lines {
            Ok(())
        } else {
            Err(BufferError::LineOutOfRange { line, lines })
        }
    }

    fn span(&self, line: usize) -> Result<LineSpan> {
        self.check_line(line)?;
        let start = self.rope.line_to_char(line);
        let next = self.rope.line_to_char(line + 1);
        let total = next - start;
        let terminated = line + 1 < self.rope.len_lines();
        let delim = if !terminated {
            0
        } else if self.line_delim == LineDelimiter::Crlf
            && total >= 2
            && self.rope.char(next - 2) == '\r'
        {
            2
        } else {
            1
        };
        Ok(LineSpan {
            start,
            content: total - delim,
            delim,
            terminated,
        })
    }

    /// Char index of (line, col), walking no further than the line's `'\n'`.
    fn char_idx(&self, line: usize, col: usize) -> Result<usize> {
        let span = self.span(line)?;
        Ok(span.start + col.min(span.max_walk()))
    }

    fn char_to_line_col(&self, char_idx: usize) -> Position {
        let line = self.rope.char_to_line(char_idx);
        Position::new(line, char_idx - self.rope.line_to_char(line))
    }

    /// Char range covering the inclusive range between two positions, with the
    /// end clamped to the last code point. `None` if the range is empty.
    fn inclusive_range(
        &self,
        start_line: usize,
        start_col: usize,
        end_line: usize,
        end_col: usize,
    ) -> Result<Option<std::ops::Range<usize>>> {
        let start = self.char_idx(start_line, start_col)?;
        let end = self.char_idx(end_line, end_col)?;
        let len = self.rope.len_chars();
        if len == 0 {
            return Ok(None);
        }
        let end = end.min(len - 1) + 1;
        Ok((start < end).then_some(start..end))
    }

    /// Apply an edit to the rope and move every live cursor through `map`,
    /// which takes a char index before the edit to one after it.
    ///
    /// Dropped cursors are pruned on the way; the registry order is not kept.
    fn edit_with_anchors(
        &mut self,
        edit: impl FnOnce(&mut Rope),
        map: impl Fn(usize) -> usize,
    ) {
        let mut before = Vec::with_capacity(self.anchors.len());
        let mut pruned = 0usize;
        let mut i = 0;
        while i < self.anchors.len() {
            if let Some(pos) = self.anchors[i].position() {
                before.push(self.anchor_char_idx(pos));
                i += 1;
            } else {
                self.anchors.swap_remove(i);
                pruned += 1;
            }
        }
        if pruned > 0 {
            tracing::trace!(pruned, "pruned dropped cursors");
        }

        edit(&mut self.rope);

        for (anchor, idx) in self.anchors.iter().zip(before) {
            let moved = map(idx);
            if moved != idx {
                let pos = self.char_to_line_col(moved);
                tracing::trace!(
                    from = idx,
                    to = moved,
                    line = pos.line,
                    col = pos.col,
                    "shift anchor"
                );
                anchor.set_position(pos);
            }
        }
    }

    // Cursors are only ever placed by the buffer or by clamping, but an
    // unregistered-then-registered cursor may be stale; pin it into range.
    fn anchor_char_idx(&self, pos: Position) -> usize {
        let last = self.rope.len_lines() - 1;
        let line = pos.line.min(last);
        self.char_idx(line, pos.col)
            .unwrap_or_else(|_| self.rope.len_chars())
    }
}

impl Default for RopeBuffer {
    fn default() -> Self {
        Self::new("")
    }
}

impl Buffer for RopeBuffer {
    fn id(&self) -> BufferId {
        self.id
    }

    fn line(&self, line: usize, delim: bool) -> Result<(String, bool)> {
        let span = self.span(line)?;
        let mut end = span.start + span.content;
        if delim {
            end += span.delim;
        }
        Ok((self.rope.slice(span.start..end).to_string(), span.terminated))
    }

    fn slice(
        &self,
        start_line: usize,
        start_col: usize,
        end_line: usize,
        end_col: usize,
    ) -> Result<String> {
        Ok(self
            .inclusive_range(start_line, start_col, end_line, end_col)?
            .map(|range| self.rope.slice(range).to_string())
            .unwrap_or_default())
    }

    fn rune_at_pos(&self, pos: usize) -> Option<char> {
        if pos >= self.rope.len_bytes() {
            return None;
        }
        let idx = self.rope.byte_to_char(pos);
        (self.rope.char_to_byte(idx) == pos).then(|| self.rope.char(idx))
    }

    fn runes_from(&self, pos: usize) -> Box<dyn Iterator<Item = (usize, char)> + '_> {
        let idx = self.rope.byte_to_char(pos.min(self.rope.len_bytes()));
        let mut byte = self.rope.char_to_byte(idx);
        Box::new(self.rope.chars_at(idx).map(move |r| {
            let at = byte;
            byte += r.len_utf8();
            (at, r)
        }))
    }

    fn runes_before(&self, pos: usize) -> Box<dyn Iterator<Item = (usize, char)> + '_> {
        let idx = self.rope.byte_to_char(pos.min(self.rope.len_bytes()));
        let mut byte = self.rope.char_to_byte(idx);
        let mut chars = self.rope.chars_at(idx);
        Box::new(std::iter::from_fn(move || {
            let r = chars.prev()?;
            byte -= r.len_utf8();
            Some((byte, r))
        }))
    }

    fn bytes(&self) -> Vec<u8> {
        self.rope.bytes().collect()
    }

    fn insert(&mut self, line: usize, col: usize, text: &str) -> Result<()> {
        let _scope = perf::scope("rope.insert");
        let at = self.char_idx(line, col)?;
        let runes = text.chars().count();
        tracing::debug!(line, col, at, runes, "insert");
        self.edit_with_anchors(
            |rope| rope.insert(at, text),
            |idx| if idx >= at { idx + runes } else { idx },
        );
        Ok(())
    }

    fn remove(
        &mut self,
        start_line: usize,
        start_col: usize,
        end_line: usize,
        end_col: usize,
    ) -> Result<()> {
        let _scope = perf::scope("rope.remove");
        let start = self.char_idx(start_line, start_col)?;
        let end = self.char_idx(end_line, end_col)?.min(self.rope.len_chars());
        if start >= end {
            tracing::trace!(start, end, "empty remove");
            return Ok(());
        }
        tracing::debug!(
            start_line,
            start_col,
            end_line,
            end_col,
            runes = end - start,
            "remove"
        );
        self.edit_with_anchors(
            |rope| rope.remove(start..end),
            |idx| {
                if idx >= end {
                    idx - (end - start)
                } else if idx >= start {
                    start
                } else {
                    idx
                }
            },
        );
        Ok(())
    }

    fn count(
        &self,
        start_line: usize,
        start_col: usize,
        end_line: usize,
        end_col: usize,
        pattern: &str,
    ) -> Result<usize> {
        if pattern.is_empty() {
            return Ok(0);
        }
        let Some(range) = self.inclusive_range(start_line, start_col, end_line, end_col)? else {
            return Ok(0);
        };
        let text: Cow<'_, str> = self.rope.slice(range).into();
        Ok(text.matches(pattern).count())
    }

    fn len(&self) -> usize {
        self.rope.len_bytes()
    }

    fn lines(&self) -> usize {
        self.rope.len_lines()
    }

    fn line_delimiter(&self) -> LineDelimiter {
        self.line_delim
    }

    fn set_line_delimiter(&mut self, delim: LineDelimiter) {
        tracing::debug!(from = %self.line_delim, to = %delim, "set line delimiter");
        self.line_delim = delim;
    }

    fn line_has_delimiter(&self, line: usize) -> Result<bool> {
        Ok(self.span(line)?.terminated)
    }

    fn runes_in_line(&self, line: usize, delim: bool) -> Result<(usize, bool)> {
        let span = self.span(line)?;
        let runes = if delim {
            span.content + span.delim
        } else {
            span.content
        };
        Ok((runes, span.terminated))
    }

    fn clamp_line_col(&self, line: usize, col: usize) -> (usize, usize) {
        let line = clamp(line, 0, self.rope.len_lines() - 1);
        let content = self.span(line).map_or(0, |span| span.content);
        (line, clamp(col, 0, content))
    }

    fn line_col_to_pos(&self, line: usize, col: usize) -> Result<usize> {
        Ok(self.rope.char_to_byte(self.char_idx(line, col)?))
    }

    fn pos_to_line_col(&self, pos: usize) -> (usize, usize) {
        let idx = self.rope.byte_to_char(pos.min(self.rope.len_bytes()));
        let Position { line, col } = self.char_to_line_col(idx);
        (line, col)
    }

    fn write_to(&self, sink: &mut dyn io::Write) -> io::Result<u64> {
        let mut written = 0u64;
        for chunk in self.rope.chunks() {
            sink.write_all(chunk.as_bytes())?;
            written += chunk.len() as u64;
        }
        Ok(written)
    }

    fn register_cursor(&mut self, cursor: &Cursor) {
        if cursor.buffer_id() != self.id {
            tracing::warn!(
                cursor = ?cursor.buffer_id(),
                buffer = ?self.id,
                "ignoring cursor registered with a foreign buffer"
            );
            return;
        }
        if self.anchors.iter().any(|anchor| anchor.is(cursor)) {
            return;
        }
        self.anchors.push(cursor.anchor());
    }

    fn unregister_cursor(&mut self, cursor: &Cursor) {
        if let Some(i) = self.anchors.iter().position(|anchor| anchor.is(cursor)) {
            self.anchors.swap_remove(i);
        }
    }
}

impl std::fmt::Debug for RopeBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RopeBuffer")
            .field("id", &self.id)
            .field(
                "rope",
                &format_args!(
                    "Rope({} lines, {} bytes)",
                    self.rope.len_lines(),
                    self.rope.len_bytes()
                ),
            )
            .field("anchors", &self.anchors.len())
            .field("line_delim", &self.line_delim)
            .finish()
    }
}

/// Bytes up to and including the first `'\n'`, enough for delimiter detection.
fn first_line_bytes(rope: &Rope) -> Cow<'_, str> {
    let end = if rope.len_lines() > 1 {
        rope.line_to_char(1)
    } else {
        rope.len_chars()
    };
    rope.slice(..end).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_str(buf: &RopeBuffer, line: usize, delim: bool) -> (String, bool) {
        buf.line(line, delim).unwrap()
    }

    // --- Construction and basic queries ---

    #[test]
    fn test_empty_buffer_has_one_line() {
        let buf = RopeBuffer::default();
        assert_eq!(buf.lines(), 1);
        assert_eq!(buf.len(), 0);
        assert!(buf.is_empty());
        assert_eq!(line_str(&buf, 0, true), (String::new(), false));
    }

    #[test]
    fn test_trailing_newline_makes_empty_last_line() {
        let buf = RopeBuffer::new("ab\ncd\n");
        assert_eq!(buf.lines(), 3);
        assert_eq!(line_str(&buf, 1, true), ("cd\n".to_string(), true));
        assert_eq!(line_str(&buf, 1, false), ("cd".to_string(), true));
        assert_eq!(line_str(&buf, 2, true), (String::new(), false));
    }

    #[test]
    fn test_lines_ignore_lone_carriage_return() {
        let buf = RopeBuffer::new("a\rb\nc");
        assert_eq!(buf.lines(), 2);
    }

    #[test]
    fn test_line_out_of_range_is_an_error() {
        let mut buf = RopeBuffer::new("ab\ncd");
        assert_eq!(
            buf.line(2, false),
            Err(BufferError::LineOutOfRange { line: 2, lines: 2 })
        );
        assert!(buf.insert(5, 0, "x").is_err());
        assert!(buf.line_col_to_pos(2, 0).is_err());
    }

    #[test]
    fn test_from_bytes_and_reader_detect_delimiter() {
        let buf = RopeBuffer::from_bytes(b"a\r\nb");
        assert_eq!(buf.line_delimiter(), LineDelimiter::Crlf);
        let buf = RopeBuffer::from_reader(&b"x\r\ny\r\n"[..]).unwrap();
        assert_eq!(buf.line_delimiter(), LineDelimiter::Crlf);
        assert_eq!(buf.lines(), 3);
    }

    #[test]
    fn test_from_reader_rejects_invalid_utf8() {
        assert!(RopeBuffer::from_reader(&b"\xff\xfe"[..]).is_err());
    }

    // --- Delimiters ---

    #[test]
    fn test_crlf_lines_strip_both_bytes() {
        let buf = RopeBuffer::new("ab\r\ncd");
        assert_eq!(line_str(&buf, 0, false), ("ab".to_string(), true));
        assert_eq!(line_str(&buf, 0, true), ("ab\r\n".to_string(), true));
        assert_eq!(buf.runes_in_line(0, false).unwrap(), (2, true));
        assert_eq!(buf.runes_in_line(0, true).unwrap(), (4, true));
        assert_eq!(buf.runes_in_line(1, true).unwrap(), (2, false));
    }

    #[test]
    fn test_lf_mode_keeps_carriage_return_as_content() {
        let mut buf = RopeBuffer::new("ab\r\ncd");
        buf.set_line_delimiter(LineDelimiter::Lf);
        assert_eq!(line_str(&buf, 0, false), ("ab\r".to_string(), true));
        assert_eq!(buf.runes_in_line(0, false).unwrap(), (3, true));
    }

    #[test]
    fn test_line_has_delimiter() {
        let buf = RopeBuffer::new("a\nb");
        assert!(buf.line_has_delimiter(0).unwrap());
        assert!(!buf.line_has_delimiter(1).unwrap());
    }

    #[test]
    fn test_with_config_overrides_detection() {
        let config = BufferConfig {
            line_delimiter: Some(DelimiterMode::Crlf),
            ..BufferConfig::default()
        };
        let buf = RopeBuffer::with_config("a\nb", &config);
        assert_eq!(buf.line_delimiter(), LineDelimiter::Crlf);

        let config = BufferConfig {
            line_delimiter: Some(DelimiterMode::Auto),
            ..BufferConfig::default()
        };
        let buf = RopeBuffer::with_config("a\r\nb", &config);
        assert_eq!(buf.line_delimiter(), LineDelimiter::Crlf);
    }

    // --- Position conversion ---

    #[test]
    fn test_line_col_to_pos_counts_runes() {
        let buf = RopeBuffer::new("héllo\nwörld");
        assert_eq!(buf.line_col_to_pos(0, 2).unwrap(), 3);
        assert_eq!(buf.line_col_to_pos(1, 0).unwrap(), 7);
        assert_eq!(buf.line_col_to_pos(1, 2).unwrap(), 10);
    }

    #[test]
    fn test_line_col_to_pos_stops_at_delimiter() {
        let buf = RopeBuffer::new("ab\ncd");
        assert_eq!(buf.line_col_to_pos(0, 99).unwrap(), 2);
        assert_eq!(buf.line_col_to_pos(1, 99).unwrap(), 5);

        let buf = RopeBuffer::new("ab\r\ncd");
        assert_eq!(buf.line_col_to_pos(0, 2).unwrap(), 2);
        assert_eq!(buf.line_col_to_pos(0, 3).unwrap(), 3);
        assert_eq!(buf.line_col_to_pos(0, 99).unwrap(), 3);
    }

    #[test]
    fn test_pos_to_line_col() {
        let buf = RopeBuffer::new("héllo\nwörld");
        assert_eq!(buf.pos_to_line_col(0), (0, 0));
        assert_eq!(buf.pos_to_line_col(3), (0, 2));
        assert_eq!(buf.pos_to_line_col(6), (0, 5));
        assert_eq!(buf.pos_to_line_col(7), (1, 0));
        assert_eq!(buf.pos_to_line_col(1000), (1, 5));
    }

    #[test]
    fn test_clamp_line_col() {
        let buf = RopeBuffer::new("hello\nhi\r\n");
        assert_eq!(buf.clamp_line_col(0, 99), (0, 5));
        assert_eq!(buf.clamp_line_col(99, 99), (2, 0));
        assert_eq!(buf.clamp_line_col(1, 1), (1, 1));
    }

    // --- Runes ---

    #[test]
    fn test_rune_at_pos() {
        let buf = RopeBuffer::new("aé");
        assert_eq!(buf.rune_at_pos(0), Some('a'));
        assert_eq!(buf.rune_at_pos(1), Some('é'));
        assert_eq!(buf.rune_at_pos(2), None);
        assert_eq!(buf.rune_at_pos(3), None);
    }

    #[test]
    fn test_each_rune_from_pos_reports_byte_positions() {
        let buf = RopeBuffer::new("aéb");
        let mut seen = Vec::new();
        buf.each_rune_from_pos(0, &mut |pos, r| {
            seen.push((pos, r));
            false
        });
        assert_eq!(seen, vec![(0, 'a'), (1, 'é'), (3, 'b')]);
    }

    #[test]
    fn test_each_rune_from_pos_stops_when_asked() {
        let buf = RopeBuffer::new("abcdef");
        let mut seen = String::new();
        buf.each_rune_from_pos(2, &mut |_, r| {
            seen.push(r);
            r == 'd'
        });
        assert_eq!(seen, "cd");
    }

    #[test]
    fn test_runes_before_walks_backward() {
        let buf = RopeBuffer::new("aéb");
        let seen: Vec<_> = buf.runes_before(4).collect();
        assert_eq!(seen, vec![(3, 'b'), (1, 'é'), (0, 'a')]);
    }

    // --- Slice and count ---

    #[test]
    fn test_slice_is_inclusive() {
        let buf = RopeBuffer::new("hello\nworld");
        assert_eq!(buf.slice(0, 1, 0, 3).unwrap(), "ell");
        assert_eq!(buf.slice(0, 4, 1, 0).unwrap(), "o\nw");
    }

    #[test]
    fn test_slice_clamps_past_end() {
        let buf = RopeBuffer::new("hello");
        assert_eq!(buf.slice(0, 2, 0, 99).unwrap(), "llo");
        assert_eq!(RopeBuffer::default().slice(0, 0, 0, 0).unwrap(), "");
    }

    #[test]
    fn test_slice_takes_whole_multibyte_end() {
        let buf = RopeBuffer::new("aéb");
        assert_eq!(buf.slice(0, 0, 0, 1).unwrap(), "aé");
    }

    #[test]
    fn test_count_delimiters() {
        let buf = RopeBuffer::new("a\nb\nc\n");
        assert_eq!(buf.count(0, 0, 3, 0, "\n").unwrap(), 3);
        assert_eq!(buf.count(0, 0, 1, 0, "\n").unwrap(), 1);
        assert_eq!(buf.count(0, 0, 3, 0, "").unwrap(), 0);
    }

    // --- Editing ---

    #[test]
    fn test_insert_and_remove_text() {
        let mut buf = RopeBuffer::new("hello world");
        buf.insert(0, 5, ",").unwrap();
        assert_eq!(buf.text(), "hello, world");
        buf.remove(0, 5, 0, 7).unwrap();
        assert_eq!(buf.text(), "helloworld");
    }

    #[test]
    fn test_remove_scenario_keeps_end_rune() {
        let mut buf = RopeBuffer::new("ab\ncd");
        buf.remove(0, 0, 1, 1).unwrap();
        assert_eq!(buf.text(), "d");
    }

    #[test]
    fn test_remove_degenerate_range_is_noop() {
        let mut buf = RopeBuffer::new("abc");
        buf.remove(0, 2, 0, 1).unwrap();
        buf.remove(0, 3, 0, 99).unwrap();
        assert_eq!(buf.text(), "abc");
    }

    #[test]
    fn test_remove_joins_lines() {
        let mut buf = RopeBuffer::new("ab\ncd");
        buf.remove(0, 2, 1, 0).unwrap();
        assert_eq!(buf.text(), "abcd");
        assert_eq!(buf.lines(), 1);
    }

    #[test]
    fn test_write_to_reports_bytes() {
        let buf = RopeBuffer::new("héllo\n");
        let mut out = Vec::new();
        assert_eq!(buf.write_to(&mut out).unwrap(), 7);
        assert_eq!(out, "héllo\n".as_bytes());
        assert_eq!(buf.bytes(), out);
    }

    // --- Anchors ---

    #[test]
    fn test_insert_before_cursor_shifts_it() {
        let mut buf = RopeBuffer::new("ab\ncd");
        let cursor = Cursor::new(&buf);
        buf.register_cursor(&cursor);
        buf.insert(0, 0, "X").unwrap();
        assert_eq!(buf.text(), "Xab\ncd");
        assert_eq!(cursor.position(), Position::new(0, 1));
    }

    #[test]
    fn test_insert_after_cursor_leaves_it() {
        let mut buf = RopeBuffer::new("ab\ncd");
        let cursor = Cursor::at(&buf, 0, 1);
        buf.register_cursor(&cursor);
        buf.insert(0, 2, "XYZ").unwrap();
        assert_eq!(cursor.position(), Position::new(0, 1));
    }

    #[test]
    fn test_insert_newline_moves_cursor_down() {
        let mut buf = RopeBuffer::new("abcd");
        let cursor = Cursor::at(&buf, 0, 3);
        buf.register_cursor(&cursor);
        buf.insert(0, 1, "\n").unwrap();
        assert_eq!(cursor.position(), Position::new(1, 2));
    }

    #[test]
    fn test_remove_collapses_cursor_inside_range() {
        let mut buf = RopeBuffer::new("ab\ncd");
        let cursor = Cursor::at(&buf, 1, 1);
        buf.register_cursor(&cursor);
        buf.remove(0, 0, 1, 1).unwrap();
        assert_eq!(cursor.position(), Position::new(0, 0));
    }

    #[test]
    fn test_remove_shifts_cursor_after_range() {
        let mut buf = RopeBuffer::new("ab\ncd\nef");
        let inside = Cursor::at(&buf, 0, 2);
        let after = Cursor::at(&buf, 2, 1);
        let before = Cursor::at(&buf, 0, 0);
        buf.register_cursor(&inside);
        buf.register_cursor(&after);
        buf.register_cursor(&before);
        buf.remove(0, 1, 1, 1).unwrap();
        assert_eq!(buf.text(), "ad\nef");
        assert_eq!(inside.position(), Position::new(0, 1));
        assert_eq!(after.position(), Position::new(1, 1));
        assert_eq!(before.position(), Position::new(0, 0));
    }

    #[test]
    fn test_register_twice_shifts_once() {
        let mut buf = RopeBuffer::new("abc");
        let cursor = Cursor::at(&buf, 0, 1);
        buf.register_cursor(&cursor);
        buf.register_cursor(&cursor);
        assert_eq!(buf.anchor_count(), 1);
        buf.insert(0, 0, "X").unwrap();
        assert_eq!(cursor.col(), 2);
    }

    #[test]
    fn test_unregistered_cursor_does_not_move() {
        let mut buf = RopeBuffer::new("abc");
        let cursor = Cursor::at(&buf, 0, 1);
        buf.register_cursor(&cursor);
        buf.unregister_cursor(&cursor);
        buf.unregister_cursor(&cursor);
        buf.insert(0, 0, "X").unwrap();
        assert_eq!(cursor.col(), 1);
        assert_eq!(buf.anchor_count(), 0);
    }

    #[test]
    fn test_foreign_cursor_is_not_registered() {
        let mut buf = RopeBuffer::new("abc");
        let other = RopeBuffer::new("abc");
        let cursor = Cursor::new(&other);
        buf.register_cursor(&cursor);
        assert_eq!(buf.anchor_count(), 0);
    }

    #[test]
    fn test_dropped_cursors_are_pruned_on_edit() {
        let mut buf = RopeBuffer::new("abc");
        let kept = Cursor::at(&buf, 0, 2);
        for col in 0..3 {
            let gone = Cursor::at(&buf, 0, col);
            buf.register_cursor(&gone);
        }
        buf.register_cursor(&kept);
        assert_eq!(buf.anchor_count(), 4);
        buf.insert(0, 0, "X").unwrap();
        assert_eq!(buf.anchor_count(), 1);
        assert_eq!(kept.col(), 3);
    }

    #[test]
    fn test_debug_summarizes_rope() {
        let buf = RopeBuffer::new("a\nb");
        let debug = format!("{buf:?}");
        assert!(debug.contains("Rope(2 lines, 3 bytes)"));
    }
}
