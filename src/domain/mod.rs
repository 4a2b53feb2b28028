//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the canonical series catalog (`SeriesCatalog`)
//! - the date-indexed wide table shared by every stage (`TimeTable`)
//! - run configuration for the fetch and presentation stages

pub mod catalog;
pub mod types;

pub use catalog::*;
pub use types::*;
