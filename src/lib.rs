//! `cpi-dash` library crate.
//!
//! The binary (`cpi`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the fetch stage and the presentation front-ends share one pipeline
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod chart;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod report;
pub mod transform;
pub mod tui;
