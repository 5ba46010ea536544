//! Dataset profiling and API-usage trend analysis.
//!
//! The engine is two independent pure functions:
//!
//! - [`profile_dataset`] classifies the columns of a tabular dataset, counts
//!   missing and duplicate values, computes descriptive statistics, and derives
//!   heuristic [`Insight`]s.
//! - [`analyze_usage_trend`] turns a daily usage series into per-day rates, a
//!   trailing moving average, and a linear-regression forecast.
//!
//! Neither keeps state between calls. The [`run`] entry point wraps both in a
//! command-line front end that reads CSV or JSON input.

pub mod cli;
pub mod data;
pub mod error;
pub mod frequency;
pub mod insights;
pub mod io_utils;
pub mod numeric;
pub mod profile;
pub mod summary;
pub mod table;
pub mod trend;

use std::{env, fs::File, io::BufReader, path::Path, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info};

pub use crate::{
    data::{Row, Scalar},
    error::{InsightError, InsightResult},
    insights::{Insight, InsightKind},
    profile::{ColumnKind, ColumnProfile, DatasetProfile, NumericStats, profile_dataset},
    summary::{UsageSummary, summarize_usage},
    trend::{TrendOptions, TrendPoint, UsageRecord, analyze_usage_trend},
};

use crate::cli::{Cli, Commands, InputArgs, OutputFormat};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("sheet_insight", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Profile(args) => handle_profile(&args),
        Commands::Trend(args) => handle_trend(&args),
        Commands::Summary(args) => handle_summary(&args),
    }
}

fn handle_profile(args: &cli::ProfileArgs) -> Result<()> {
    let input = &args.input;
    let encoding = io_utils::resolve_encoding(input.input_encoding.as_deref())?;
    let rows = io_utils::load_rows(&input.input, input.delimiter, encoding)
        .with_context(|| format!("Loading rows from {:?}", input.input))?;
    let profile = profile_dataset(&rows);
    emit(input, &profile, table::render_profile)?;
    info!(
        "Profiled {} row(s) across {} column(s) with {} insight(s)",
        profile.rows,
        profile.columns,
        profile.insights.len()
    );
    Ok(())
}

fn handle_trend(args: &cli::TrendArgs) -> Result<()> {
    let input = &args.input;
    let options = resolve_trend_options(args)?;
    debug!("Trend options: {options:?}");
    let encoding = io_utils::resolve_encoding(input.input_encoding.as_deref())?;
    let records = io_utils::load_usage_records(&input.input, input.delimiter, encoding)
        .with_context(|| format!("Loading usage records from {:?}", input.input))?;
    let points = analyze_usage_trend(&records, &options)?;
    emit(input, &points, |points| table::render_trend(points))?;
    info!(
        "Analyzed {} day(s); {} forecast point(s)",
        records.len(),
        points.iter().filter(|p| p.is_forecast).count()
    );
    Ok(())
}

fn handle_summary(args: &cli::SummaryArgs) -> Result<()> {
    let input = &args.input;
    let encoding = io_utils::resolve_encoding(input.input_encoding.as_deref())?;
    let records = io_utils::load_usage_records(&input.input, input.delimiter, encoding)
        .with_context(|| format!("Loading usage records from {:?}", input.input))?;
    let summary = summarize_usage(&records);
    emit(input, &summary, table::render_summary)?;
    info!("Summarized {} day(s) of usage", summary.days);
    Ok(())
}

/// File options first, then command-line overrides, then validation.
fn resolve_trend_options(args: &cli::TrendArgs) -> Result<TrendOptions> {
    let mut options = match &args.options {
        Some(path) => load_trend_options(path)
            .with_context(|| format!("Loading trend options from {path:?}"))?,
        None => TrendOptions::default(),
    };
    if let Some(window) = args.window {
        options.moving_average_window = window;
    }
    if let Some(horizon) = args.horizon {
        options.forecast_horizon_days = horizon;
    }
    if args.no_forecast {
        options.include_forecast = false;
    }
    options.validate()?;
    Ok(options)
}

fn load_trend_options(path: &Path) -> Result<TrendOptions> {
    let file = File::open(path).with_context(|| format!("Opening options file {path:?}"))?;
    let options = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| InsightError::Parse(e.to_string()))?;
    Ok(options)
}

fn emit<T: serde::Serialize>(
    input: &InputArgs,
    value: &T,
    render: impl Fn(&T) -> String,
) -> Result<()> {
    match input.format {
        OutputFormat::Json => io_utils::print_json(value),
        OutputFormat::Table => {
            print!("{}", render(value));
            Ok(())
        }
    }
}
