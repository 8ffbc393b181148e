//! Whole-file I/O for the editing engine.
//!
//! Loading maps a file read-only and decodes it once; saving writes a fully
//! materialized document through a sibling temporary file and an atomic
//! rename. Neither side streams or retries.
pub mod mmap;
pub mod save;
