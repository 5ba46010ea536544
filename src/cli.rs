use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about = "Profile datasets and analyze API usage trends", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Classify columns, count missing and duplicate values, and derive insights
    Profile(ProfileArgs),
    /// Compute daily rates, a moving average, and a call-volume forecast
    Trend(TrendArgs),
    /// Summarize a usage series into overall totals and rates
    Summary(SummaryArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// Input file (.json array or delimited text with headers); '-' reads stdin
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Delimiter for delimited input (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Output rendering
    #[arg(long, value_enum, default_value = "json")]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct ProfileArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Debug, Args)]
pub struct TrendArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// JSON file with movingAverageWindow / forecastHorizonDays / includeForecast
    #[arg(long = "options")]
    pub options: Option<PathBuf>,
    /// Trailing moving-average window in days
    #[arg(long = "window", allow_negative_numbers = true)]
    pub window: Option<i64>,
    /// Number of future days to forecast
    #[arg(long = "horizon", allow_negative_numbers = true)]
    pub horizon: Option<i64>,
    /// Disable the regression forecast
    #[arg(long = "no-forecast")]
    pub no_forecast: bool,
}

#[derive(Debug, Args)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
