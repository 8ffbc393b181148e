/// Stable index of a piece inside the table's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PieceId(pub(crate) usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Piece {
    pub buf_kind: crate::enums::BufferKind,
    /// Offset of the first character inside the backing buffer.
    pub start: usize,
    pub len: usize,
    pub next: Option<PieceId>,
}

impl Piece {
    #[inline]
    #[must_use]
    pub fn new(buf_kind: crate::enums::BufferKind, start: usize, len: usize) -> Self {
        Self {
            buf_kind,
            start,
            len,
            next: None,
        }
    }

    /// The referenced range inside the backing buffer.
    #[inline]
    #[must_use]
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.start + self.len
    }

    #[inline]
    #[must_use]
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
