use std::ops::{AddAssign, SubAssign};

use crate::piece_table::piece::{Piece, PieceId};

#[derive(Debug)]
pub struct PieceTable {
    /// File content captured at load time. Never mutated.
    original: Vec<char>,
    /// Append-only buffer storing every character ever inserted.
    added: Vec<char>,
    /// Arena of piece records. Only ids reachable from `head` are live.
    slots: Vec<Piece>,
    /// Retired slots waiting to be reused.
    free: Vec<PieceId>,
    head: Option<PieceId>,
    /// Cached sum of live piece lengths.
    len: usize,
    last_edit: Option<std::time::Instant>,
    config: crate::config::Config,
}

/// Iterator over the live chain, in document order.
pub struct Pieces<'a> {
    table: &'a PieceTable,
    next: Option<PieceId>,
}

impl<'a> Iterator for Pieces<'a> {
    type Item = &'a Piece;

    fn next(&mut self) -> Option<Self::Item> {
        let piece = self.table.piece(self.next?);
        self.next = piece.next;
        Some(piece)
    }
}

/*

====================================
========= CREATION METHOD ==========
====================================

*/

impl Default for PieceTable {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceTable {
    /// An empty document with no pieces.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Vec::new(), crate::config::Config::default())
    }

    /// A document whose whole content is `original`, held in one Original piece.
    #[must_use]
    pub fn from_chars(original: Vec<char>) -> Self {
        Self::with_config(original, crate::config::Config::default())
    }

    #[must_use]
    pub fn with_config(original: Vec<char>, config: crate::config::Config) -> Self {
        let len = original.len();
        let mut slots = Vec::new();
        let mut head = None;

        if len > 0 {
            slots.push(Piece::new(crate::enums::BufferKind::Original, 0, len));
            head = Some(PieceId(0));
        }

        Self {
            original,
            added: Vec::with_capacity(config.added_capacity),
            slots,
            free: Vec::new(),
            head,
            len,
            last_edit: None,
            config,
        }
    }

    /// Reads the whole file at `path` into the Original buffer.
    ///
    /// # Errors
    ///
    /// Returns [`crate::errors::PieceTableError::IoError`] if the file cannot
    /// be opened or mapped.
    pub fn open(path: impl AsRef<std::path::Path>) -> crate::errors::PieceTableResult<Self> {
        Self::open_with_config(path, crate::config::Config::default())
    }

    /// # Errors
    ///
    /// Returns [`crate::errors::PieceTableError::IoError`] if the file cannot
    /// be opened or mapped.
    pub fn open_with_config(
        path: impl AsRef<std::path::Path>,
        config: crate::config::Config,
    ) -> crate::errors::PieceTableResult<Self> {
        let path = path.as_ref();
        let chars = io::mmap::read_chars(path)?;

        tracing::info!(path = %path.display(), chars = chars.len(), "loaded document");

        Ok(Self::with_config(chars, config))
    }
}

/*

====================================
========= INLINE METHODS  ==========
====================================

*/

impl PieceTable {
    /// Document length in characters.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &crate::config::Config {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn original(&self) -> &[char] {
        &self.original
    }

    #[inline]
    #[must_use]
    pub fn added(&self) -> &[char] {
        &self.added
    }

    #[inline]
    fn piece(&self, id: PieceId) -> &Piece {
        &self.slots[id.0]
    }

    #[inline]
    fn piece_mut(&mut self, id: PieceId) -> &mut Piece {
        &mut self.slots[id.0]
    }

    #[inline]
    #[must_use]
    pub fn pieces(&self) -> Pieces<'_> {
        Pieces {
            table: self,
            next: self.head,
        }
    }

    #[inline]
    #[must_use]
    pub fn piece_count(&self) -> usize {
        self.pieces().count()
    }

    /// Sum of piece lengths walked from the head, ignoring the cache.
    #[must_use]
    pub fn recomputed_len(&self) -> usize {
        self.pieces().map(|piece| piece.len).sum()
    }

    /// The characters a piece refers to.
    #[inline]
    #[must_use]
    pub fn slice_of(&self, piece: &Piece) -> &[char] {
        match piece.buf_kind {
            crate::enums::BufferKind::Original => &self.original[piece.range()],
            crate::enums::BufferKind::Add => &self.added[piece.range()],
        }
    }

    fn alloc(&mut self, piece: Piece) -> PieceId {
        if let Some(id) = self.free.pop() {
            self.slots[id.0] = piece;

            return id;
        }

        self.slots.push(piece);

        PieceId(self.slots.len() - 1)
    }

    /// Returns an unlinked slot to the free list.
    fn retire(&mut self, id: PieceId) {
        self.free.push(id);
    }

    fn last_id(&self) -> Option<PieceId> {
        let mut cursor = self.head?;

        while let Some(next) = self.piece(cursor).next {
            cursor = next;
        }

        Some(cursor)
    }
}

/*

=====================================
========= INSERT / DELETE  ==========
=====================================

*/

impl PieceTable {
    /// Deletes `[start, end)` and inserts `text` at `start`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::errors::PieceTableError::InvalidRange`] when
    /// `start > end` or `end > len`. Nothing is modified in that case.
    pub fn replace(
        &mut self,
        text: &[char],
        start: usize,
        end: usize,
    ) -> crate::errors::PieceTableResult<()> {
        self.replace_at(text, start, end, std::time::Instant::now())
    }

    /// [`PieceTable::replace`] with an explicit edit timestamp, which decides
    /// whether the insertion may coalesce with the previous one.
    ///
    /// # Errors
    ///
    /// Same as [`PieceTable::replace`].
    pub fn replace_at(
        &mut self,
        text: &[char],
        start: usize,
        end: usize,
        now: std::time::Instant,
    ) -> crate::errors::PieceTableResult<()> {
        if start > end || end > self.len {
            return Err(crate::errors::PieceTableError::InvalidRange {
                start,
                end,
                len: self.len,
            });
        }

        let coalesce = self
            .last_edit
            .is_some_and(|last| now.saturating_duration_since(last) < self.config.coalesce_window);

        self.last_edit = Some(now);

        // Deletion always completes before the insertion starts.
        if start < end {
            self.delete_range(start, end);
        }

        if !text.is_empty() {
            self.insert_run(text, start, coalesce);
        }

        debug_assert_eq!(self.len, self.recomputed_len());

        if tracing::enabled!(tracing::Level::TRACE) {
            self.trace_pieces();
        }

        Ok(())
    }

    /// Links `new_piece` right after `id`, or grows `id` in place when it is
    /// an Added piece ending exactly where the new data begins.
    fn link_after(&mut self, id: PieceId, new_piece: Piece, coalesce: bool) {
        let prev = *self.piece(id);

        if coalesce
            && prev.buf_kind == crate::enums::BufferKind::Add
            && prev.end() == new_piece.start
        {
            self.piece_mut(id).len.add_assign(new_piece.len);
            tracing::trace!(len = self.piece(id).len, "coalesced insertion");

            return;
        }

        let new_id = self.alloc(Piece {
            next: prev.next,
            ..new_piece
        });

        self.piece_mut(id).next = Some(new_id);
    }

    fn insert_run(&mut self, text: &[char], pos: usize, coalesce: bool) {
        let added_start = self.added.len();

        self.added.extend_from_slice(text);

        let new_piece = Piece::new(crate::enums::BufferKind::Add, added_start, text.len());
        let inserted = new_piece.len;

        // CASE 1: no content
        let Some(head) = self.head else {
            tracing::trace!(pos, inserted, "insert into empty document");
            self.head = Some(self.alloc(new_piece));
            self.len.add_assign(inserted);

            return;
        };

        // CASE 2: prepend
        if pos == 0 {
            tracing::trace!(inserted, "prepend");
            let id = self.alloc(Piece {
                next: Some(head),
                ..new_piece
            });

            self.head = Some(id);
            self.len.add_assign(inserted);

            return;
        }

        // CASE 3: append
        if pos == self.len {
            tracing::trace!(pos, inserted, "append");

            if let Some(last) = self.last_id() {
                self.link_after(last, new_piece, coalesce);
            }

            self.len.add_assign(inserted);

            return;
        }

        // CASE 4: inserting in the interior
        let mut piece_start = 0;
        let mut cursor = Some(head);

        while let Some(id) = cursor {
            let piece = *self.piece(id);
            let piece_end = piece_start + piece.len;

            if piece_end == pos {
                tracing::trace!(pos, inserted, "insert on piece boundary");
                self.link_after(id, new_piece, coalesce);
                self.len.add_assign(inserted);

                return;
            }

            if piece_start < pos && pos < piece_end {
                tracing::trace!(pos, inserted, "split piece for insertion");
                let left_len = pos - piece_start;
                let right_id = self.alloc(Piece {
                    buf_kind: piece.buf_kind,
                    start: piece.start + left_len,
                    len: piece.len - left_len,
                    next: piece.next,
                });
                let new_id = self.alloc(Piece {
                    next: Some(right_id),
                    ..new_piece
                });
                let left = self.piece_mut(id);

                left.len = left_len;
                left.next = Some(new_id);
                self.len.add_assign(inserted);

                return;
            }

            piece_start = piece_end;
            cursor = piece.next;
        }
    }

    /// Removes `[start, end)`. Callers have validated the range and
    /// guaranteed `start < end`.
    ///
    /// Positions are compared against the document as it was before the call,
    /// so `piece_start` keeps advancing over pieces that get unlinked.
    fn delete_range(&mut self, start: usize, end: usize) {
        let mut prev: Option<PieceId> = None;
        let mut cursor = self.head;
        let mut piece_start = 0;

        while let Some(id) = cursor {
            let piece = *self.piece(id);
            let piece_end = piece_start + piece.len;

            if piece_end <= start {
                prev = Some(id);
                piece_start = piece_end;
                cursor = piece.next;

                continue;
            }

            if piece_start < start && end < piece_end {
                // Range strictly inside this piece: keep both sides.
                let right_id = self.alloc(Piece {
                    buf_kind: piece.buf_kind,
                    start: piece.start + (end - piece_start),
                    len: piece_end - end,
                    next: piece.next,
                });
                let left = self.piece_mut(id);

                left.len = start - piece_start;
                left.next = Some(right_id);

                break;
            } else if start <= piece_start && piece_end <= end {
                // Piece fully covered: unlink it.
                match prev {
                    None => self.head = piece.next,
                    Some(prev_id) => self.piece_mut(prev_id).next = piece.next,
                }

                self.retire(id);
            } else if piece_start < start {
                // Deletion starts inside the piece and runs past its end.
                self.piece_mut(id).len = start - piece_start;
                prev = Some(id);
            } else {
                // Deletion ends inside the piece.
                let kept = self.piece_mut(id);

                kept.start.add_assign(end - piece_start);
                kept.len = piece_end - end;

                break;
            }

            if piece_end >= end {
                break;
            }

            piece_start = piece_end;
            cursor = piece.next;
        }

        tracing::trace!(start, end, "deleted range");
        self.len.sub_assign(end - start);
    }
}

/*

====================================
========== MISCELLANEOUS ===========
====================================

*/

impl PieceTable {
    /// The whole document as one sequence of characters.
    ///
    /// Walks every piece, so this is linear in the document length.
    #[must_use]
    pub fn materialize(&self) -> Vec<char> {
        let mut res = Vec::with_capacity(self.len);

        for piece in self.pieces() {
            res.extend_from_slice(self.slice_of(piece));
        }

        res
    }

    #[must_use]
    pub fn text(&self) -> String {
        self.pieces()
            .flat_map(|piece| self.slice_of(piece).iter())
            .collect()
    }

    /// Writes the materialized document over `path`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::errors::PieceTableError::IoError`] if the file cannot
    /// be written.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> crate::errors::PieceTableResult<()> {
        let path = path.as_ref();

        io::save::write_atomic(path, self.text().as_bytes())?;
        tracing::info!(path = %path.display(), chars = self.len, "saved document");

        Ok(())
    }

    /// Dumps the chain at trace level.
    pub fn trace_pieces(&self) {
        for (idx, piece) in self.pieces().enumerate() {
            tracing::trace!(
                idx,
                kind = ?piece.buf_kind,
                start = piece.start,
                len = piece.len,
                "piece"
            );
        }
    }
}
