//! Shared filesystem and progress utilities.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use arrow::record_batch::RecordBatch;
use indicatif::{ProgressBar, ProgressStyle};
use parquet::arrow::ArrowWriter;
use serde::Serialize;

use crate::error::{NoteScanError, Result};

/// Progress bar template for the partition loop
const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({per_sec}) {msg}";

/// Validates that a directory exists and is a directory
///
/// # Errors
/// Returns an error if the directory does not exist or is not a directory
pub fn validate_directory(dir: &Path) -> Result<()> {
    if !dir.exists() || !dir.is_dir() {
        return Err(NoteScanError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Directory does not exist: {}", dir.display()),
        )));
    }
    Ok(())
}

/// Create a progress bar with the standard pipeline style
#[must_use]
pub fn create_progress_bar(length: u64, description: &str) -> ProgressBar {
    let pb = ProgressBar::new(length);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(PROGRESS_TEMPLATE)
            .expect("progress template is valid")
            .progress_chars("#>-"),
    );
    pb.set_message(description.to_string());
    pb
}

/// Temporary sibling path used for atomic writes
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map_or_else(
        || std::ffi::OsString::from("artifact"),
        std::ffi::OsStr::to_os_string,
    );
    name.push(".tmp");
    path.with_file_name(name)
}

/// Atomically persist a record batch as a Parquet file
///
/// Writes to a temporary sibling path and renames it into place, so an
/// interrupted write never leaves a partial file at the canonical path.
///
/// # Errors
/// Returns an error if writing or renaming fails; the temporary file is
/// removed on failure
pub fn write_parquet_atomic(batch: &RecordBatch, path: &Path) -> Result<()> {
    let staging = staging_path(path);

    let write = |target: &Path| -> Result<()> {
        let file = File::create(target)?;
        let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
        writer.write(batch)?;
        writer.close()?;
        Ok(())
    };

    match write(&staging) {
        Ok(()) => {
            fs::rename(&staging, path)?;
            Ok(())
        }
        Err(e) => {
            let _ = fs::remove_file(&staging);
            Err(e)
        }
    }
}

/// Atomically persist a value as pretty-printed JSON
///
/// # Errors
/// Returns an error if serialization, writing, or renaming fails
pub fn write_json_atomic<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let staging = staging_path(path);
    let body = serde_json::to_vec_pretty(value)
        .map_err(|e| NoteScanError::Serialization(format!("Failed to serialize JSON: {e}")))?;

    match fs::write(&staging, body) {
        Ok(()) => {
            fs::rename(&staging, path)?;
            Ok(())
        }
        Err(e) => {
            let _ = fs::remove_file(&staging);
            Err(NoteScanError::Io(e))
        }
    }
}
