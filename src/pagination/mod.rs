//! Pagination module
//!
//! Offset/limit cursor and the three-way page classification used by the
//! sync engine.
//!
//! # Overview
//!
//! A SODA dataset is read by repeating the same query with `$offset`
//! advanced by `$limit` each time. The cursor advances after every attempt,
//! successful or not; only a successful empty page ends the stream.

mod types;

pub use types::{Cursor, PageOutcome};
