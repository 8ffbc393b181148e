use editor_core::cursor::{Cursor, Shift};
use editor_core::enums::Mode;
use editor_core::errors::PieceTableResult;
use editor_core::piece_table::table::PieceTable;

/// Cursor, mode and viewport of a single observer of a document.
///
/// Every operation takes the piece table explicitly so several views can
/// share one document while a single owner serializes the edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub cursor: Cursor,
    pub mode: Mode,
    pub width: usize,
    pub height: usize,
}

impl View {
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            cursor: Cursor::default(),
            mode: Mode::Normal,
            width,
            height,
        }
    }

    /// Re-resolves the cursor after `shift`. Materializes the whole document.
    pub fn shift_cursor(&mut self, table: &PieceTable, shift: Shift) {
        self.cursor.shift(&table.materialize(), shift);
    }

    /// Inserts `c` at the cursor and steps past it.
    ///
    /// # Errors
    ///
    /// Fails only if the cursor offset is outside the document.
    pub fn insert_character(&mut self, table: &mut PieceTable, c: char) -> PieceTableResult<()> {
        table.replace(&[c], self.cursor.offset, self.cursor.offset)?;

        if c == '\n' {
            self.shift_cursor(table, Shift::by(1, 0).first_col());
        } else {
            self.shift_cursor(table, Shift::by(0, 1));
        }

        Ok(())
    }

    /// Deletes the character before the cursor. No-op at the document start.
    ///
    /// The cursor moves first: deleting a newline lands on the end of the
    /// line that the next one is about to join.
    ///
    /// # Errors
    ///
    /// Fails only if the cursor offset is outside the document.
    pub fn backspace(&mut self, table: &mut PieceTable) -> PieceTableResult<()> {
        let Some(target) = self.cursor.offset.checked_sub(1) else {
            return Ok(());
        };

        let content = table.materialize();

        match content.get(target).copied() {
            Some('\n') => self.cursor.shift(&content, Shift::by(-1, 0).last_col()),
            Some(_) => self.cursor.shift(&content, Shift::by(0, -1)),
            None => {
                return Err(editor_core::errors::PieceTableError::InvalidRange {
                    start: target,
                    end: target + 1,
                    len: content.len(),
                });
            }
        }

        table.replace(&[], target, target + 1)
    }

    /// Normal → Insert. `after` steps one column right first, so typing
    /// appends after the character under the cursor.
    pub fn to_insert(&mut self, table: &PieceTable, after: bool) {
        if after {
            self.shift_cursor(table, Shift::by(0, 1));
        }

        self.mode = Mode::Insert;
        tracing::debug!(offset = self.cursor.offset, after, "entered insert mode");
    }

    /// Insert → Normal, retreating onto the last inserted character.
    pub fn to_normal(&mut self, table: &PieceTable) {
        self.shift_cursor(table, Shift::by(0, -1));
        self.mode = Mode::Normal;
        tracing::debug!(offset = self.cursor.offset, "entered normal mode");
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
    }

    /// Re-derives row/column after someone else edited the document.
    pub fn resync(&mut self, table: &PieceTable) {
        self.cursor.resync(&table.materialize());
    }

    /// `" NORMAL | name"` on the left, `"row:col "` on the right, padded to
    /// the view width. Empty when the two halves do not fit with a gap.
    #[must_use]
    pub fn status_line(&self, file_name: &str) -> String {
        let left = format!(" {} | {file_name}", self.mode);
        let right = format!("{}:{} ", self.cursor.row, self.cursor.col);
        let used = left.chars().count() + right.chars().count();

        match self.width.checked_sub(used) {
            Some(gap) if gap >= 1 => format!("{left}{}{right}", " ".repeat(gap)),
            _ => String::new(),
        }
    }
}
