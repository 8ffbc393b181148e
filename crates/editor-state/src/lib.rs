//! Editing state for one open document.
//!
//! - [`view::View`] is one observer's cursor, mode and viewport, and knows how
//!   to drive edits through a borrowed piece table.
//! - [`editor::Editor`] owns exactly one piece table and one view, plus the
//!   path the document was loaded from.
pub mod editor;
pub mod view;
