//! Side logs written next to every run: the directory audit, the rows that
//! could not be identified, and a run summary.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::bridge::{DirectoryIndex, SkippedRow};
use crate::error::Result;

pub const DIRECTORY_INDEX_FILE: &str = "directory_index.json";
pub const SKIPPED_ROWS_FILE: &str = "skipped_rows.json";
pub const RUN_SUMMARY_FILE: &str = "run_summary.json";

/// Counts and provenance of one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub input: PathBuf,
    pub input_sha256: String,
    pub output: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub rows_read: usize,
    pub rows_identified: usize,
    pub rows_skipped: usize,
    pub distinct_instructors: usize,
    pub courses_minted: usize,
    pub rows_merged: usize,
    pub terms: usize,
    pub statements: usize,
}

fn write_json<T: Serialize + ?Sized>(dir: &Path, name: &str, value: &T) -> Result<PathBuf> {
    let path = dir.join(name);
    let json = serde_json::to_string_pretty(value)?;
    fs::write(&path, json)?;
    log::debug!("Wrote {}", path.display());
    Ok(path)
}

/// Write all three side logs into `log_dir`, creating it if needed.
pub fn write_side_logs(
    log_dir: &Path,
    directory_index: &DirectoryIndex,
    skipped: &[SkippedRow],
    summary: &RunSummary,
) -> Result<()> {
    fs::create_dir_all(log_dir)?;
    write_json(log_dir, DIRECTORY_INDEX_FILE, directory_index)?;
    write_json(log_dir, SKIPPED_ROWS_FILE, skipped)?;
    write_json(log_dir, RUN_SUMMARY_FILE, summary)?;
    if !skipped.is_empty() {
        log::info!(
            "{} rows skipped; details in {}",
            skipped.len(),
            log_dir.join(SKIPPED_ROWS_FILE).display()
        );
    }
    Ok(())
}
