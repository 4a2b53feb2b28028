//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - fetches the BLS series and writes the snapshot
//! - prints reports/plots
//! - writes chart files or launches the dashboard

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Datelike;
use clap::Parser;
use tracing::{error, info};

use crate::cli::{ChartsArgs, Command, FetchArgs, ReportArgs, SnapshotArgs};
use crate::data::{BlsClient, api_key_from_env};
use crate::domain::{AcquireConfig, MAX_YEARS_PER_REQUEST, PresentConfig, SeriesCatalog};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `cpi` binary.
pub fn run() -> Result<(), AppError> {
    // `cpi` and `cpi --snapshot x.csv` behave like `cpi tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    crate::logging::init(cli.verbose, matches!(cli.command, Command::Tui(_)));

    let result = match cli.command {
        Command::Fetch(args) => handle_fetch(args),
        Command::Report(args) => handle_report(args),
        Command::Charts(args) => handle_charts(args),
        Command::Tui(args) => handle_tui(args),
    };
    result.inspect_err(|e| error!(kind = ?e.kind(), error = %e, "command failed"))
}

fn handle_fetch(args: FetchArgs) -> Result<(), AppError> {
    let config = acquire_config_from_args(&args, api_key_from_env()?, chrono::Local::now().year());
    let client = BlsClient::new(config.api_key.clone(), config.api_url.clone(), config.timeout)?;
    let summary = pipeline::run_fetch(&config, &SeriesCatalog::cpi(), &client)?;
    println!("{}", crate::report::format_fetch_summary(&summary, &config.snapshot_path));
    Ok(())
}

fn handle_report(args: ReportArgs) -> Result<(), AppError> {
    let dash = pipeline::load_dashboard(&present_config_from_args(&args.snapshot))?;

    println!("{}", crate::report::format_report_header(&dash));
    println!("{}", crate::report::format_correlation(&dash.correlation));

    if args.plot {
        for panel in &dash.panels {
            let (yoy, annualized) = dash.panel_charts(panel)?;
            println!("{}", crate::chart::ascii::render_ascii_chart(&yoy, args.width, args.height));
            println!(
                "{}",
                crate::chart::ascii::render_ascii_chart(&annualized, args.width, args.height)
            );
        }
    }
    Ok(())
}

fn handle_charts(args: ChartsArgs) -> Result<(), AppError> {
    let dash = pipeline::load_dashboard(&present_config_from_args(&args.snapshot))?;

    std::fs::create_dir_all(&args.out)
        .map_err(|e| AppError::io(format!("Failed to create {}: {e}", args.out.display())))?;

    let mut written = 0usize;
    for (idx, panel) in dash.panels.iter().enumerate() {
        let (yoy, annualized) = dash.panel_charts(panel)?;
        let stem = format!("{:02}-{}", idx + 1, slug(&panel.columns[1]));
        for (spec, suffix) in [(&yoy, "yoy"), (&annualized, "3m")] {
            let path = chart_path(&args.out, &stem, suffix);
            crate::chart::svg::write_svg(spec, &path)?;
            info!(path = %path.display(), "wrote chart");
            written += 1;
        }
    }

    println!("Wrote {written} charts to {}", args.out.display());
    Ok(())
}

fn handle_tui(args: SnapshotArgs) -> Result<(), AppError> {
    crate::tui::run(present_config_from_args(&args))
}

pub fn acquire_config_from_args(args: &FetchArgs, api_key: String, current_year: i32) -> AcquireConfig {
    let end_year = args.end_year.unwrap_or(current_year);
    let start_year = args.start_year.unwrap_or(end_year.saturating_sub(MAX_YEARS_PER_REQUEST - 1));
    AcquireConfig {
        api_key,
        api_url: args.api_url.clone(),
        start_year,
        end_year,
        snapshot_path: args.snapshot.clone(),
        timeout: Duration::from_secs(args.timeout_secs),
    }
}

pub fn present_config_from_args(args: &SnapshotArgs) -> PresentConfig {
    PresentConfig {
        snapshot_path: args.snapshot.clone(),
        window_years: args.window_years,
    }
}

fn chart_path(dir: &Path, stem: &str, suffix: &str) -> PathBuf {
    dir.join(format!("{stem}-{suffix}.svg"))
}

/// File-name friendly form of a category label.
fn slug(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for c in label.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    out.trim_end_matches('-').to_string()
}

/// Rewrite argv so `cpi` defaults to `cpi tui`.
///
/// Rules:
/// - `cpi`                      -> `cpi tui`
/// - `cpi --snapshot x.csv ...` -> `cpi tui --snapshot x.csv ...`
/// - `cpi --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "fetch" | "report" | "charts" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}
