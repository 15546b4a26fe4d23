//! Merging of per-partition artifacts into the final result table.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use rustc_hash::FxHashSet;

use crate::error::{NoteScanError, Result};
use crate::models::NoteClassification;
use crate::reader::read_parquet_file;
use crate::utils::{validate_directory, write_parquet_atomic};

/// Suffix of partition result artifacts
const RESULT_SUFFIX: &str = "_results.parquet";

/// Maximum distribution buckets echoed in the logged summary
const MAX_LOGGED_BUCKETS: usize = 10;

/// Statistics over the merged final table
#[derive(Debug)]
pub struct MergeSummary {
    /// Partition artifacts merged
    pub merged_files: usize,
    /// Rows in the final table
    pub total_rows: usize,
    /// Distinct patients
    pub unique_patients: usize,
    /// Distinct notes
    pub unique_notes: usize,
    /// Row counts keyed by `aud_roots_count`
    pub roots_count_distribution: BTreeMap<u32, usize>,
}

impl MergeSummary {
    /// Mean number of distinct roots per matched note
    #[must_use]
    pub fn mean_roots_per_note(&self) -> f64 {
        if self.total_rows == 0 {
            return 0.0;
        }
        let total_roots: usize = self
            .roots_count_distribution
            .iter()
            .map(|(count, rows)| *count as usize * rows)
            .sum();
        total_roots as f64 / self.total_rows as f64
    }

    /// Log the final statistics block
    pub fn log_summary(&self) {
        log::info!("Merged {} partition result files", self.merged_files);
        log::info!("Total notes with AUD keywords: {}", self.total_rows);
        log::info!("Total unique patients: {}", self.unique_patients);
        log::info!("Total unique notes: {}", self.unique_notes);
        log::info!("Average aud_roots per note: {:.2}", self.mean_roots_per_note());
        for (count, rows) in self.roots_count_distribution.iter().take(MAX_LOGGED_BUCKETS) {
            log::info!("  {count} roots: {rows} notes");
        }
    }
}

/// Find every partition result artifact, lexicographically sorted
fn find_result_files(intermediate_dir: &Path) -> Result<Vec<PathBuf>> {
    validate_directory(intermediate_dir)?;

    let files = std::fs::read_dir(intermediate_dir)?
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            let name = path.file_name()?.to_str()?;
            (path.is_file() && name.ends_with(RESULT_SUFFIX)).then_some(path)
        })
        .sorted()
        .collect_vec();

    Ok(files)
}

/// Concatenate all partition artifacts into the final table
///
/// Rows are read from every `*_results.parquet` under the intermediate
/// directory and written as one Parquet table at `final_path` (atomically).
/// No deduplication is applied: `(person_id, note_id)` pairs are
/// partition-disjoint by construction.
///
/// # Errors
/// Returns a `Merge` error if no partition artifacts exist; partition
/// artifacts stay untouched either way, so a failed merge can be retried
pub fn merge(intermediate_dir: &Path, final_path: &Path) -> Result<MergeSummary> {
    let files = find_result_files(intermediate_dir)?;
    if files.is_empty() {
        return Err(NoteScanError::Merge(format!(
            "No partition results found under {}",
            intermediate_dir.display()
        )));
    }
    log::info!("Merging {} partition result files", files.len());

    let mut rows: Vec<NoteClassification> = Vec::new();
    for file in &files {
        for batch in read_parquet_file(file)? {
            rows.extend(NoteClassification::from_record_batch(&batch)?);
        }
    }

    let mut patients: FxHashSet<&str> = FxHashSet::default();
    let mut notes: FxHashSet<&str> = FxHashSet::default();
    let mut roots_count_distribution: BTreeMap<u32, usize> = BTreeMap::new();
    for row in &rows {
        patients.insert(row.person_id.as_str());
        notes.insert(row.note_id.as_str());
        *roots_count_distribution.entry(row.aud_roots_count).or_default() += 1;
    }

    let summary = MergeSummary {
        merged_files: files.len(),
        total_rows: rows.len(),
        unique_patients: patients.len(),
        unique_notes: notes.len(),
        roots_count_distribution,
    };

    let batch = NoteClassification::to_record_batch(&rows)?;
    write_parquet_atomic(&batch, final_path)?;
    log::info!("Final results saved to {}", final_path.display());

    Ok(summary)
}
