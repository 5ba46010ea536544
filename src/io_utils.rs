//! Input loading and output helpers for the command-line front end.
//!
//! The engine itself never touches the filesystem. This module turns files
//! (or stdin, via the `-` path convention) into [`Row`]s and
//! [`UsageRecord`]s:
//!
//! - **Format**: `.json` inputs hold a JSON array; anything else is read as
//!   delimited text with a header row. Stdin is sniffed for a leading `[`.
//! - **Delimiter resolution**: extension-based (`.tsv` → tab, otherwise comma)
//!   with manual override support.
//! - **Encoding**: input decoding via `encoding_rs`, defaulting to UTF-8.

use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use encoding_rs::{Encoding, UTF_8};
use serde::Serialize;

use crate::{data::Row, error::InsightError, trend::UsageRecord};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Delimited,
}

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

pub fn detect_format(path: &Path, text: &str) -> InputFormat {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => InputFormat::Json,
        Some(_) => InputFormat::Delimited,
        None if text.trim_start().starts_with('[') => InputFormat::Json,
        None => InputFormat::Delimited,
    }
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        let message = format!("text is not valid {}", encoding.name());
        return Err(InsightError::Parse(message).into());
    }
    Ok(text.into_owned())
}

pub fn read_input(path: &Path, encoding: &'static Encoding) -> Result<String> {
    let mut reader: Box<dyn Read> = if is_dash(path) {
        Box::new(std::io::stdin().lock())
    } else {
        Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Opening input file {path:?}"))?,
        ))
    };
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .with_context(|| format!("Reading input {path:?}"))?;
    decode_bytes(&bytes, encoding)
}

fn open_csv_reader(text: &str, delimiter: u8) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true)
        .from_reader(text.as_bytes())
}

/// Loads dataset rows. Delimited cells are kept as text; a record shorter
/// than the header simply lacks the trailing keys.
pub fn load_rows(
    path: &Path,
    delimiter: Option<u8>,
    encoding: &'static Encoding,
) -> Result<Vec<Row>> {
    let text = read_input(path, encoding)?;
    match detect_format(path, &text) {
        InputFormat::Json => {
            parse_json(&text).with_context(|| format!("Parsing rows from {path:?}"))
        }
        InputFormat::Delimited => {
            if text.trim().is_empty() {
                return Ok(Vec::new());
            }
            let delimiter = resolve_input_delimiter(path, delimiter);
            let mut reader = open_csv_reader(&text, delimiter);
            let headers = reader
                .headers()
                .with_context(|| format!("Reading headers from {path:?}"))?
                .clone();
            reader
                .records()
                .enumerate()
                .map(|(idx, record)| -> Result<Row> {
                    let record = record.with_context(|| format!("Reading row {}", idx + 2))?;
                    Ok(headers.iter().zip(record.iter()).collect::<Row>())
                })
                .collect()
        }
    }
}

pub fn load_usage_records(
    path: &Path,
    delimiter: Option<u8>,
    encoding: &'static Encoding,
) -> Result<Vec<UsageRecord>> {
    let text = read_input(path, encoding)?;
    match detect_format(path, &text) {
        InputFormat::Json => {
            parse_json(&text).with_context(|| format!("Parsing usage records from {path:?}"))
        }
        InputFormat::Delimited => {
            if text.trim().is_empty() {
                return Ok(Vec::new());
            }
            let delimiter = resolve_input_delimiter(path, delimiter);
            open_csv_reader(&text, delimiter)
                .deserialize::<UsageRecord>()
                .enumerate()
                .map(|(idx, record)| record.with_context(|| format!("Reading row {}", idx + 2)))
                .collect()
        }
    }
}

fn parse_json<T: serde::de::DeserializeOwned>(text: &str) -> Result<Vec<T>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let parsed = serde_json::from_str(text).map_err(|e| InsightError::Parse(e.to_string()))?;
    Ok(parsed)
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Serializing output JSON")?;
    println!("{rendered}");
    Ok(())
}
