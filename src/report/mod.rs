//! Reporting utilities: fetch summaries, latest values and correlation tables.

pub mod format;

pub use format::*;
