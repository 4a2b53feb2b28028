//! Input/output helpers.
//!
//! - snapshot CSV read/write (`snapshot`)

pub mod snapshot;

pub use snapshot::*;
