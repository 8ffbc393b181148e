//! The boundary where several clients share one document.
//!
//! A [`manager::SessionManager`] owns one actor per open path. The actor is
//! the only code that touches that document's piece table; clients reach it
//! through an ordered channel and receive a [`document::Snapshot`] after every
//! event has been fully applied.
pub mod document;
pub mod errors;
pub mod event;
pub mod manager;

/// Identifies one subscribed client. Issued sequentially by the manager.
pub type ClientId = u64;
