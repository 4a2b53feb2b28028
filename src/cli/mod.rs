//! Command-line parsing for the CPI dashboard.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! fetch/transform code; `app` turns these structs into domain configs.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::domain::BLS_API_URL;

/// Default snapshot location, relative to the working directory.
pub const DEFAULT_SNAPSHOT: &str = "db.csv";

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "cpi", version, about = "CPI category inflation dashboard (BLS-based)")]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Download the CPI series from BLS and write the snapshot CSV.
    Fetch(FetchArgs),
    /// Print the latest year-over-year values, the correlation table and optional ASCII charts.
    Report(ReportArgs),
    /// Write every dashboard chart as an SVG file.
    Charts(ChartsArgs),
    /// Launch the interactive dashboard.
    Tui(SnapshotArgs),
}

#[derive(Debug, Args, Clone)]
pub struct FetchArgs {
    /// First year to request (defaults to 19 years before the end year).
    #[arg(long)]
    pub start_year: Option<i32>,

    /// Last year to request, inclusive (defaults to the current year).
    #[arg(long)]
    pub end_year: Option<i32>,

    /// Snapshot CSV to write.
    #[arg(long, default_value = DEFAULT_SNAPSHOT)]
    pub snapshot: PathBuf,

    /// Request timeout in seconds.
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Timeseries endpoint.
    #[arg(long, default_value = BLS_API_URL, hide = true)]
    pub api_url: String,
}

/// Options shared by every command that reads the snapshot.
#[derive(Debug, Args, Clone)]
pub struct SnapshotArgs {
    /// Snapshot CSV produced by `cpi fetch`.
    #[arg(long, default_value = DEFAULT_SNAPSHOT)]
    pub snapshot: PathBuf,

    /// Trailing years shown on the 3-month annualized charts.
    #[arg(long, default_value_t = 2)]
    pub window_years: u32,
}

#[derive(Debug, Args, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub snapshot: SnapshotArgs,

    /// Render ASCII charts for every panel.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

#[derive(Debug, Args, Clone)]
pub struct ChartsArgs {
    #[command(flatten)]
    pub snapshot: SnapshotArgs,

    /// Output directory for the SVG files.
    #[arg(long, default_value = "charts")]
    pub out: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_defaults() {
        let cli = Cli::parse_from(["cpi", "fetch"]);
        let Command::Fetch(args) = cli.command else {
            panic!("expected fetch");
        };
        assert_eq!(args.snapshot, PathBuf::from(DEFAULT_SNAPSHOT));
        assert_eq!(args.timeout_secs, 30);
        assert_eq!(args.api_url, BLS_API_URL);
        assert!(args.start_year.is_none());
    }

    #[test]
    fn report_flags_parse() {
        let cli = Cli::parse_from(["cpi", "-v", "report", "--plot", "--snapshot", "x.csv", "--window-years", "3"]);
        assert_eq!(cli.verbose, 1);
        let Command::Report(args) = cli.command else {
            panic!("expected report");
        };
        assert!(args.plot);
        assert_eq!(args.snapshot.snapshot, PathBuf::from("x.csv"));
        assert_eq!(args.snapshot.window_years, 3);
    }
}
