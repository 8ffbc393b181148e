/// # Piece Table Module.
///
/// A document is a chain of pieces, each pointing at a run of characters in
/// either the immutable original buffer or the append-only added buffer.
/// The chain lives in an arena and links by index.
pub mod piece;
pub mod table;

/// Characters reserved for the added buffer before the first edit.
pub const BASELINE_CAPACITY: usize = 4096;

/// Insertions closer together than this extend the previous Added piece.
pub const COALESCE_WINDOW: std::time::Duration = std::time::Duration::from_secs(1);
