//! Core editing engine: the piece table that stores a document and the
//! cursor arithmetic that maps a linear offset to a row and column.
pub mod config;
pub mod cursor;
pub mod enums;
pub mod errors;
pub mod piece_table;
