#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use sheet_insight::{Row, UsageRecord};
use tempfile::{TempDir, tempdir};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

/// Rows whose every cell is text, as delivered by a spreadsheet upload.
pub fn text_rows(data: &[&[(&str, &str)]]) -> Vec<Row> {
    data.iter()
        .map(|pairs| Row::from_pairs(pairs.iter().copied()))
        .collect()
}

/// Consecutive days starting 2024-01-01 with the given call totals.
pub fn usage_series(calls: &[u64]) -> Vec<UsageRecord> {
    calls
        .iter()
        .enumerate()
        .map(|(idx, &total)| UsageRecord::new(format!("2024-01-{:02}", idx + 1), total))
        .collect()
}
