/// Tunables for a [`crate::piece_table::table::PieceTable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Two insertions closer together than this may share one Added piece.
    pub coalesce_window: std::time::Duration,
    /// Characters reserved up front for the append-only buffer.
    pub added_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            coalesce_window: crate::piece_table::COALESCE_WINDOW,
            added_capacity: crate::piece_table::BASELINE_CAPACITY,
        }
    }
}

impl Config {
    #[must_use]
    pub fn with_coalesce_window(mut self, window: std::time::Duration) -> Self {
        self.coalesce_window = window;
        self
    }
}
