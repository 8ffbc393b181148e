/// Represents a specific location on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Position {
    pub row: usize,
    /// Character index within the line.
    pub column: usize,
}

impl Position {
    #[must_use]
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

/// A logical offset plus the row/column it was last resolved to.
///
/// `offset` is the source of truth. `row` and `col` are caches and must be
/// recomputed by scanning the content whenever an edit at or before the
/// cursor, or a navigation command, could have moved them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub offset: usize,
    pub row: usize,
    pub col: usize,
}

/// A relative cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Shift {
    pub rows: isize,
    pub cols: isize,
    /// Force the target column to 0.
    pub first_col: bool,
    /// Land on the last column of the target line.
    pub last_col: bool,
}

impl Shift {
    #[must_use]
    pub const fn by(rows: isize, cols: isize) -> Self {
        Self {
            rows,
            cols,
            first_col: false,
            last_col: false,
        }
    }

    #[must_use]
    pub const fn first_col(mut self) -> Self {
        self.first_col = true;
        self
    }

    #[must_use]
    pub const fn last_col(mut self) -> Self {
        self.last_col = true;
        self
    }
}

impl Cursor {
    #[must_use]
    pub fn new(offset: usize, row: usize, col: usize) -> Self {
        Self { offset, row, col }
    }

    #[inline]
    #[must_use]
    pub fn position(&self) -> Position {
        Position::new(self.row, self.col)
    }

    /// Moves by `shift` relative to the cached row/column and resolves the
    /// target against `content`.
    ///
    /// A target column past the end of its line snaps to the line's last
    /// column. A target past the end of the document snaps to the document
    /// end, leaving row/column wherever the scan stopped.
    pub fn shift(&mut self, content: &[char], shift: Shift) {
        let target_row = self.row.saturating_add_signed(shift.rows);
        let mut target_col = if shift.first_col {
            0
        } else {
            self.col.saturating_add_signed(shift.cols)
        };
        let mut last_col = shift.last_col;

        if target_row == 0 && target_col == 0 && !last_col {
            *self = Self::new(0, 0, 0);

            return;
        }

        let (mut row, mut col) = (0, 0);

        for (index, &c) in content.iter().enumerate() {
            if row == target_row && c == '\n' && (last_col || target_col > col) {
                target_col = col;
                last_col = false;
            }

            if row == target_row && col == target_col && !last_col {
                *self = Self::new(index, row, col);

                return;
            }

            if c == '\n' {
                row += 1;
                col = 0;
            } else {
                col += 1;
            }
        }

        *self = Self::new(content.len(), row, col);
    }

    /// Clamps `offset` into `content` and recomputes row/column from it.
    pub fn resync(&mut self, content: &[char]) {
        let offset = self.offset.min(content.len());
        let (mut row, mut col) = (0, 0);

        for &c in &content[..offset] {
            if c == '\n' {
                row += 1;
                col = 0;
            } else {
                col += 1;
            }
        }

        *self = Self::new(offset, row, col);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn at(content: &[char], offset: usize) -> Cursor {
        let mut cursor = Cursor::new(offset, 0, 0);
        cursor.resync(content);
        cursor
    }

    #[test]
    fn test_origin_fast_path() {
        let content = chars("abc\ndef");
        let mut cursor = at(&content, 5);

        cursor.shift(&content, Shift::by(-1, -1).first_col());
        assert_eq!(cursor, Cursor::new(0, 0, 0));
    }

    #[test]
    fn test_moves_right_and_down() {
        let content = chars("abc\ndef");
        let mut cursor = Cursor::default();

        cursor.shift(&content, Shift::by(0, 2));
        assert_eq!(cursor, Cursor::new(2, 0, 2));

        cursor.shift(&content, Shift::by(1, 0));
        assert_eq!(cursor, Cursor::new(6, 1, 2));
    }

    #[test]
    fn test_clamps_negative_targets() {
        let content = chars("abc\ndef");
        let mut cursor = at(&content, 5);

        cursor.shift(&content, Shift::by(-3, 0));
        assert_eq!(cursor, Cursor::new(1, 0, 1));

        cursor.shift(&content, Shift::by(0, -4));
        assert_eq!(cursor, Cursor::new(0, 0, 0));
    }

    #[test]
    fn test_sticky_end_of_shorter_line() {
        let content = chars("a\nlonger line");
        let mut cursor = at(&content, 8);

        assert_eq!(cursor.position(), Position::new(1, 6));
        cursor.shift(&content, Shift::by(-1, 0));
        assert_eq!(cursor, Cursor::new(1, 0, 1));
    }

    #[test]
    fn test_last_col_lands_on_line_end() {
        let content = chars("hello\nworld");
        let mut cursor = at(&content, 6);

        cursor.shift(&content, Shift::by(-1, 0).last_col());
        assert_eq!(cursor, Cursor::new(5, 0, 5));
    }

    #[test]
    fn test_past_end_snaps_to_document_end() {
        let content = chars("ab\ncd");
        let mut cursor = Cursor::default();

        cursor.shift(&content, Shift::by(5, 0));
        assert_eq!(cursor, Cursor::new(5, 1, 2));

        let mut cursor = at(&content, 4);
        cursor.shift(&content, Shift::by(0, 10));
        assert_eq!(cursor, Cursor::new(5, 1, 2));
    }

    #[test]
    fn test_empty_content_stays_at_origin() {
        let mut cursor = Cursor::default();

        cursor.shift(&[], Shift::by(0, 1));
        assert_eq!(cursor, Cursor::new(0, 0, 0));
    }

    #[test]
    fn test_every_offset_is_reachable() {
        let content = chars("one\n\ntwo lines\nx\n");

        for offset in 0..=content.len() {
            let target = at(&content, offset);
            let mut cursor = Cursor::default();

            cursor.shift(
                &content,
                Shift::by(
                    isize::try_from(target.row).unwrap(),
                    isize::try_from(target.col).unwrap(),
                ),
            );
            assert_eq!(cursor.offset, offset, "unreachable offset {offset}");
        }
    }

    #[test]
    fn test_resync_clamps_offset() {
        let content = chars("ab\nc");
        let mut cursor = Cursor::new(40, 9, 9);

        cursor.resync(&content);
        assert_eq!(cursor, Cursor::new(4, 1, 1));
    }
}
