//! Cursors and regions anchored to a [`Buffer`].
//!
//! A cursor needs to know where lines end to move, so motion lives here and is
//! expressed only through the [`Buffer`] trait. The cursor never holds the buffer
//! itself: it remembers the buffer's [`BufferId`] and is handed the buffer for
//! every operation.

use std::cell::Cell;
use std::rc::{Rc, Weak};

use super::buffer::{Buffer, BufferError, BufferId, Position, Result};

/// Where a cursor sits plus the column it returns to on vertical motion.
#[derive(Debug, Clone, Copy, Default)]
struct Caret {
    pos: Position,
    preferred_col: usize,
}

impl Caret {
    const fn at(pos: Position) -> Self {
        Self {
            pos,
            preferred_col: pos.col,
        }
    }
}

/// A non-owning handle to a cursor's position, held by a buffer's registry.
///
/// Once the cursor is dropped the handle goes dead and the buffer prunes it.
#[derive(Debug, Clone)]
pub struct Anchor(Weak<Cell<Caret>>);

impl Anchor {
    /// Current position, or `None` if the cursor was dropped.
    pub fn position(&self) -> Option<Position> {
        self.0.upgrade().map(|cell| cell.get().pos)
    }

    /// Relocate the cursor after an edit. The remembered column follows the
    /// new position. Returns false if the cursor was dropped.
    pub(crate) fn set_position(&self, pos: Position) -> bool {
        self.0.upgrade().is_some_and(|cell| {
            cell.set(Caret::at(pos));
            true
        })
    }

    pub(crate) fn is_live(&self) -> bool {
        self.0.strong_count() > 0
    }

    /// Whether this handle points at `cursor`.
    pub fn is(&self, cursor: &Cursor) -> bool {
        std::ptr::eq(self.0.as_ptr(), Rc::as_ptr(&cursor.caret))
    }
}

/// A position in a buffer that can be moved like an editor caret.
///
/// Register the cursor with its buffer ([`Buffer::register_cursor`]) to have
/// it follow edits made elsewhere in the text.
#[derive(Debug)]
pub struct Cursor {
    buffer: BufferId,
    /// Shared with the buffer's registry so edits can move it.
    caret: Rc<Cell<Caret>>,
}

impl Cursor {
    /// Create a cursor at line 0, column 0 of `buffer`.
    pub fn new<B: Buffer + ?Sized>(buffer: &B) -> Self {
        Self {
            buffer: buffer.id(),
            caret: Rc::new(Cell::new(Caret::default())),
        }
    }

    /// Create a cursor at (line, col), clamped into `buffer`.
    pub fn at<B: Buffer + ?Sized>(buffer: &B, line: usize, col: usize) -> Self {
        let (line, col) = buffer.clamp_line_col(line, col);
        Self {
            buffer: buffer.id(),
            caret: Rc::new(Cell::new(Caret::at(Position::new(line, col)))),
        }
    }

    pub fn line(&self) -> usize {
        self.position().line
    }

    pub fn col(&self) -> usize {
        self.position().col
    }

    pub fn position(&self) -> Position {
        self.caret.get().pos
    }

    pub const fn buffer_id(&self) -> BufferId {
        self.buffer
    }

    /// Remembered column for vertical movement. Horizontal motion, explicit
    /// placement, and being moved by an edit all reset it.
    pub fn preferred_col(&self) -> usize {
        self.caret.get().preferred_col
    }

    /// A registry handle for this cursor.
    pub(crate) fn anchor(&self) -> Anchor {
        Anchor(Rc::downgrade(&self.caret))
    }

    /// Move one code point left, wrapping to the end of the previous line.
    pub fn left<B: Buffer + ?Sized>(&mut self, buffer: &B) -> Result<()> {
        self.check(buffer)?;
        let Position { line, col } = self.clamped(buffer);
        if col == 0 && line != 0 {
            let (runes, _) = buffer.runes_in_line(line - 1, false)?;
            self.set(line - 1, runes);
        } else {
            self.set(line, col.saturating_sub(1));
        }
        Ok(())
    }

    /// Move one code point right, wrapping to the start of the next line.
    pub fn right<B: Buffer + ?Sized>(&mut self, buffer: &B) -> Result<()> {
        self.check(buffer)?;
        let Position { line, col } = self.clamped(buffer);
        let (runes, _) = buffer.runes_in_line(line, false)?;
        if col >= runes && line < buffer.lines() - 1 {
            self.set(line + 1, 0);
        } else {
            let (line, col) = buffer.clamp_line_col(line, col + 1);
            self.set(line, col);
        }
        Ok(())
    }

    /// Move to the previous line at the preferred column. On the first line this
    /// goes to the start of the buffer.
    pub fn up<B: Buffer + ?Sized>(&mut self, buffer: &B) -> Result<()> {
        self.check(buffer)?;
        let Position { line, .. } = self.clamped(buffer);
        if line == 0 {
            self.set(0, 0);
        } else {
            let (line, col) = buffer.clamp_line_col(line - 1, self.preferred_col());
            self.set_vertical(line, col);
        }
        Ok(())
    }

    /// Move to the next line at the preferred column. On the last line this goes
    /// to the end of that line.
    pub fn down<B: Buffer + ?Sized>(&mut self, buffer: &B) -> Result<()> {
        self.check(buffer)?;
        let Position { line, .. } = self.clamped(buffer);
        if line + 1 >= buffer.lines() {
            let (line, col) = buffer.clamp_line_col(line, usize::MAX);
            self.set(line, col);
        } else {
            let (line, col) = buffer.clamp_line_col(line + 1, self.preferred_col());
            self.set_vertical(line, col);
        }
        Ok(())
    }

    /// Skip to the end of the current or next token.
    ///
    /// The class of the code point under the cursor is the start class. After
    /// stepping over it, the scan continues while the class matches the start
    /// class or is whitespace, and stops on the first code point of any other
    /// class. Reaching the end of the buffer leaves the cursor there.
    pub fn next_word_boundary_end<B: Buffer + ?Sized>(&mut self, buffer: &B) -> Result<()> {
        self.check(buffer)?;
        let Position { line, col } = self.clamped(buffer);
        let pos = buffer.line_col_to_pos(line, col)?;
        let mut runes = buffer.runes_from(pos);
        let Some((_, first)) = runes.next() else {
            return Ok(());
        };
        let start = CharClass::of(first);
        let target = runes
            .find(|&(_, r)| {
                let class = CharClass::of(r);
                class != start && class != CharClass::Whitespace
            })
            .map_or_else(|| buffer.len(), |(p, _)| p);

        let (line, col) = buffer.pos_to_line_col(target);
        self.set(line, col);
        Ok(())
    }

    /// Skip back to the start of the current or previous token.
    ///
    /// Mirrors [`Cursor::next_word_boundary_end`]: the class of the code point
    /// before the cursor is the start class, the scan walks backward over that
    /// class and whitespace, and the cursor lands just after the first code point
    /// of any other class, or at the start of the buffer.
    pub fn prev_word_boundary_start<B: Buffer + ?Sized>(&mut self, buffer: &B) -> Result<()> {
        self.check(buffer)?;
        let Position { line, col } = self.clamped(buffer);
        let pos = buffer.line_col_to_pos(line, col)?;
        let mut runes = buffer.runes_before(pos);
        let Some((mut target, first)) = runes.next() else {
            return Ok(());
        };
        let start = CharClass::of(first);
        for (p, r) in runes {
            let class = CharClass::of(r);
            if class != start && class != CharClass::Whitespace {
                break;
            }
            target = p;
        }

        let (line, col) = buffer.pos_to_line_col(target);
        self.set(line, col);
        Ok(())
    }

    /// Set the position, clamped into the buffer.
    pub fn line_col<B: Buffer + ?Sized>(
        &mut self,
        buffer: &B,
        line: usize,
        col: usize,
    ) -> Result<()> {
        self.check(buffer)?;
        let (line, col) = buffer.clamp_line_col(line, col);
        self.set(line, col);
        Ok(())
    }

    fn set(&mut self, line: usize, col: usize) {
        self.caret.set(Caret::at(Position::new(line, col)));
    }

    fn set_vertical(&mut self, line: usize, col: usize) {
        let preferred_col = self.preferred_col();
        self.caret.set(Caret {
            pos: Position::new(line, col),
            preferred_col,
        });
    }

    // A stale position (unregistered cursor, buffer edited since) is pulled
    // back into range before moving from it.
    fn clamped<B: Buffer + ?Sized>(&self, buffer: &B) -> Position {
        let Position { line, col } = self.position();
        let (line, col) = buffer.clamp_line_col(line, col);
        Position::new(line, col)
    }

    fn check<B: Buffer + ?Sized>(&self, buffer: &B) -> Result<()> {
        if self.buffer == buffer.id() {
            Ok(())
        } else {
            Err(BufferError::ForeignCursor {
                cursor: self.buffer,
                buffer: buffer.id(),
            })
        }
    }
}

impl PartialEq for Cursor {
    /// Equal only when both cursors belong to the same buffer and sit at the
    /// same position.
    fn eq(&self, other: &Self) -> bool {
        self.buffer == other.buffer && self.position() == other.position()
    }
}

impl Eq for Cursor {}

/// A selection between two cursors, both ends inclusive.
///
/// `start` never comes after `end`. A region spanning several lines includes
/// the delimiters between them.
#[derive(Debug, PartialEq, Eq)]
pub struct Region {
    start: Cursor,
    end: Cursor,
}

impl Region {
    /// An empty-looking region with both ends at the start of `buffer`.
    pub fn new<B: Buffer + ?Sized>(buffer: &B) -> Self {
        Self {
            start: Cursor::new(buffer),
            end: Cursor::new(buffer),
        }
    }

    /// Select between `a` and `b`, in whichever order they were given.
    pub fn select<B: Buffer + ?Sized>(
        &mut self,
        buffer: &B,
        a: Position,
        b: Position,
    ) -> Result<()> {
        let (from, to) = if a <= b { (a, b) } else { (b, a) };
        self.start.line_col(buffer, from.line, from.col)?;
        self.end.line_col(buffer, to.line, to.col)
    }

    pub const fn start(&self) -> &Cursor {
        &self.start
    }

    pub const fn end(&self) -> &Cursor {
        &self.end
    }

    /// Whether `pos` lies between the two ends, inclusive.
    pub fn contains(&self, pos: Position) -> bool {
        self.start.position() <= pos && pos <= self.end.position()
    }

    /// The selected text.
    pub fn text<B: Buffer + ?Sized>(&self, buffer: &B) -> Result<String> {
        let (start, end) = (self.start.position(), self.end.position());
        buffer.slice(start.line, start.col, end.line, end.col)
    }

    /// Anchor both ends to `buffer`.
    pub fn register<B: Buffer + ?Sized>(&self, buffer: &mut B) {
        buffer.register_cursor(&self.start);
        buffer.register_cursor(&self.end);
    }

    pub fn unregister<B: Buffer + ?Sized>(&self, buffer: &mut B) {
        buffer.unregister_cursor(&self.start);
        buffer.unregister_cursor(&self.end);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Whitespace,
    Word,
    Symbol,
}

impl CharClass {
    fn of(r: char) -> Self {
        if r.is_whitespace() {
            Self::Whitespace
        } else if r == '_' || r.is_alphanumeric() {
            Self::Word
        } else {
            Self::Symbol
        }
    }
}
