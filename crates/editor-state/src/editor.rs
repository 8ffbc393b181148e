use editor_core::cursor::{Cursor, Shift};
use editor_core::enums::Mode;
use editor_core::errors::{PieceTableError, PieceTableResult};
use editor_core::piece_table::table::PieceTable;

use crate::view::View;

/// One document, one cursor, one mode.
///
/// Every edit goes through the piece table first and then re-derives the
/// cursor's row/column by rescanning the materialized content.
#[derive(Debug)]
pub struct Editor {
    table: PieceTable,
    view: View,

    /// The file path, if this editor is tied to a file on disk.
    filepath: Option<std::path::PathBuf>,

    /// Tracks if the document has unsaved changes.
    is_dirty: bool,
}

/*

==================================
===== CREATION, OPEN, & SAVE =====
==================================

*/

impl Editor {
    /// An empty, unnamed document.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_table(PieceTable::new(), width, height)
    }

    #[must_use]
    pub fn with_table(table: PieceTable, width: usize, height: usize) -> Self {
        Self {
            table,
            view: View::new(width, height),
            filepath: None,
            is_dirty: false,
        }
    }

    /// Loads the file at `path` with the cursor at the origin in Normal mode.
    ///
    /// # Errors
    ///
    /// Returns [`PieceTableError::IoError`] if the file cannot be read.
    pub fn open(
        path: impl AsRef<std::path::Path>,
        width: usize,
        height: usize,
    ) -> PieceTableResult<Self> {
        Self::open_with_config(path, editor_core::config::Config::default(), width, height)
    }

    /// # Errors
    ///
    /// Returns [`PieceTableError::IoError`] if the file cannot be read.
    pub fn open_with_config(
        path: impl AsRef<std::path::Path>,
        config: editor_core::config::Config,
        width: usize,
        height: usize,
    ) -> PieceTableResult<Self> {
        let path_buf = path.as_ref().to_path_buf();
        let table = PieceTable::open_with_config(&path_buf, config)?;

        Ok(Self {
            filepath: Some(path_buf),
            ..Self::with_table(table, width, height)
        })
    }

    /// Writes the whole document back to the path it was opened from.
    ///
    /// # Errors
    ///
    /// Returns [`PieceTableError::IoError`] if there is no associated path or
    /// the write fails.
    pub fn save(&mut self) -> PieceTableResult<()> {
        let filepath = self.filepath.as_ref().ok_or_else(|| {
            PieceTableError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "No file path associated with this editor. Use save_as().",
            ))
        })?;

        self.table.save(filepath)?;
        self.is_dirty = false;

        Ok(())
    }

    /// Saves to a new path, which becomes the editor's path.
    ///
    /// # Errors
    ///
    /// Returns [`PieceTableError::IoError`] if the write fails.
    pub fn save_as(&mut self, path: impl AsRef<std::path::Path>) -> PieceTableResult<()> {
        self.filepath = Some(path.as_ref().to_path_buf());
        self.save()
    }
}

/*

===================================
===== CURSOR, EDITS, & MODES ======
===================================

*/

impl Editor {
    pub fn shift_cursor(&mut self, rows: isize, cols: isize, first_col: bool, last_col: bool) {
        self.view.shift_cursor(
            &self.table,
            Shift {
                rows,
                cols,
                first_col,
                last_col,
            },
        );
    }

    /// # Errors
    ///
    /// Fails only if the cursor offset is outside the document.
    pub fn insert_character(&mut self, c: char) -> PieceTableResult<()> {
        self.view.insert_character(&mut self.table, c)?;
        self.is_dirty = true;

        Ok(())
    }

    /// # Errors
    ///
    /// Fails only if the cursor offset is outside the document.
    pub fn backspace(&mut self) -> PieceTableResult<()> {
        let before = self.table.len();

        self.view.backspace(&mut self.table)?;
        self.is_dirty |= self.table.len() != before;

        Ok(())
    }

    /// Raw range replacement. The cursor is re-derived afterwards, clamped to
    /// the new document length.
    ///
    /// # Errors
    ///
    /// Returns [`PieceTableError::InvalidRange`] for ranges outside the document.
    pub fn replace(&mut self, text: &[char], start: usize, end: usize) -> PieceTableResult<()> {
        self.table.replace(text, start, end)?;
        self.is_dirty = true;
        self.view.resync(&self.table);

        Ok(())
    }

    pub fn to_insert(&mut self, after: bool) {
        self.view.to_insert(&self.table, after);
    }

    pub fn to_normal(&mut self) {
        self.view.to_normal(&self.table);
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.view.resize(width, height);
    }
}

/*

====================================
========== MISCELLANEOUS ===========
====================================

*/

impl Editor {
    #[inline]
    #[must_use]
    pub fn table(&self) -> &PieceTable {
        &self.table
    }

    #[inline]
    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.view.cursor
    }

    #[inline]
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.view.mode
    }

    #[inline]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> Option<&std::path::Path> {
        self.filepath.as_deref()
    }

    /// Base name of the path, or an empty string for unnamed documents.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.filepath
            .as_deref()
            .and_then(std::path::Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// The full document. Linear in document length.
    #[must_use]
    pub fn content(&self) -> Vec<char> {
        self.table.materialize()
    }

    #[must_use]
    pub fn status_line(&self) -> String {
        self.view.status_line(&self.file_name())
    }
}

#[cfg(test)]
mod editor_tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    fn editor_from_str(s: &str) -> Editor {
        Editor::with_table(PieceTable::from_chars(s.chars().collect()), 80, 24)
    }

    fn text(editor: &Editor) -> String {
        editor.content().into_iter().collect()
    }

    #[test]
    fn open_and_materialize_round_trip() {
        let mut temp = tempfile::NamedTempFile::new().unwrap();
        write!(temp, "first\nsecond\n").unwrap();

        let editor = Editor::open(temp.path(), 80, 24).unwrap();

        assert_eq!(text(&editor), "first\nsecond\n");
        assert_eq!(editor.cursor(), Cursor::default());
        assert_eq!(editor.mode(), Mode::Normal);
        assert!(!editor.is_dirty());
    }

    #[test]
    fn open_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();

        assert!(matches!(
            Editor::open(dir.path().join("missing.txt"), 80, 24),
            Err(PieceTableError::IoError(_))
        ));
    }

    #[test]
    fn typing_a_session() {
        let mut editor = editor_from_str("");

        editor.to_insert(false);
        for c in "fn main\n{}".chars() {
            editor.insert_character(c).unwrap();
        }
        editor.backspace().unwrap();
        editor.insert_character(' ').unwrap();
        editor.insert_character('}').unwrap();
        editor.to_normal();

        assert_eq!(text(&editor), "fn main\n{ }");
        assert_eq!(editor.cursor(), Cursor::new(10, 1, 2));
        assert_eq!(editor.mode(), Mode::Normal);
        assert!(editor.is_dirty());
    }

    #[test]
    fn backspace_across_line_break_lands_on_line_end() {
        let mut editor = editor_from_str("ab\ncd");

        editor.shift_cursor(1, 0, false, false);
        editor.backspace().unwrap();

        assert_eq!(text(&editor), "abcd");
        assert_eq!(editor.cursor(), Cursor::new(2, 0, 2));
    }

    #[test]
    fn adjacent_typed_characters_share_one_piece() {
        let mut editor = editor_from_str("ac");

        editor.to_insert(true);
        editor.insert_character('x').unwrap();
        editor.insert_character('y').unwrap();

        assert_eq!(text(&editor), "axyc");
        assert_eq!(editor.table().piece_count(), 3);

        let lens: Vec<_> = editor.table().pieces().map(|piece| piece.len).collect();
        assert_eq!(lens, vec![1, 2, 1]);
    }

    #[test]
    fn moving_up_into_shorter_line() {
        let mut editor = editor_from_str("ab\nlonger");

        editor.shift_cursor(1, 5, false, false);
        assert_eq!(editor.cursor(), Cursor::new(8, 1, 5));

        editor.shift_cursor(-1, 0, false, false);
        assert_eq!(editor.cursor(), Cursor::new(2, 0, 2));
    }

    #[test]
    fn replace_resyncs_cursor() {
        let mut editor = editor_from_str("hello world");

        editor.shift_cursor(0, 11, false, false);
        editor.replace(&[], 0, 6).unwrap();

        assert_eq!(text(&editor), "world");
        assert_eq!(editor.cursor(), Cursor::new(5, 0, 5));

        assert!(matches!(
            editor.replace(&[], 3, 9),
            Err(PieceTableError::InvalidRange { .. })
        ));
    }

    #[test]
    fn save_without_path_is_an_error() {
        let mut editor = editor_from_str("x");

        assert!(matches!(editor.save(), Err(PieceTableError::IoError(_))));
    }

    #[test]
    fn save_writes_edits_and_clears_dirty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("draft.txt");
        std::fs::write(&path, "draft").unwrap();

        let mut editor = Editor::open(&path, 80, 24).unwrap();

        editor.to_insert(false);
        for c in "my ".chars() {
            editor.insert_character(c).unwrap();
        }
        assert!(editor.is_dirty());

        editor.save().unwrap();

        assert!(!editor.is_dirty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "my draft");
    }

    #[test]
    fn save_as_adopts_new_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.txt");
        let mut editor = Editor::new(40, 10);

        editor.insert_character('!').unwrap();
        editor.save_as(&path).unwrap();

        assert_eq!(editor.path(), Some(path.as_path()));
        assert_eq!(editor.file_name(), "fresh.txt");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "!");
    }

    #[test]
    fn status_line_reflects_mode_and_position() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "one\ntwo").unwrap();

        let mut editor = Editor::open(&path, 20, 5).unwrap();

        editor.shift_cursor(1, 2, false, false);
        editor.to_insert(false);

        assert_eq!(editor.status_line(), " INSERT | a.txt 1:2 ");

        editor.resize(10, 5);
        assert_eq!(editor.status_line(), "");
    }
}
