//! Corpus driver: sequential, resumable processing of all partitions.
//!
//! Partitions are processed strictly one at a time. The corpus is large and
//! scanning is CPU-bound, so cross-partition parallelism buys little while
//! sequential processing with atomic per-partition checkpointing keeps the
//! resume-after-interruption contract trivial: a re-run continues at the
//! first partition without a checkpoint. Within a partition, note
//! classification fans out over rayon.

use std::path::Path;
use std::time::{Duration, Instant};

use itertools::Itertools;

use crate::config::ScanConfig;
use crate::error::Result;
use crate::partition::{Partition, PartitionStatus, process_partition};
use crate::patterns::PatternRegistry;
use crate::reader::find_parquet_files;
use crate::utils::{create_progress_bar, validate_directory};

/// Maximum partition errors echoed in the logged summary
const MAX_LOGGED_ERRORS: usize = 5;

/// Aggregate outcome of one corpus run
#[derive(Debug, Default)]
pub struct RunReport {
    /// Partitions newly scanned in this run
    pub processed: usize,
    /// Partitions skipped because their artifacts already existed
    pub skipped: usize,
    /// Partitions that failed; see `errors`
    pub failed: usize,
    /// Matched notes across newly processed partitions
    pub matched_notes: usize,
    /// Total notes read across newly processed partitions
    pub total_notes: usize,
    /// Wall time of the run
    pub elapsed: Duration,
    /// Per-partition error messages, in processing order
    pub errors: Vec<(String, String)>,
}

impl RunReport {
    /// Whether any partition failed
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Throughput over newly processed notes
    #[must_use]
    pub fn notes_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.total_notes as f64 / secs
        } else {
            0.0
        }
    }

    /// Log the end-of-run summary
    pub fn log_summary(&self) {
        log::info!(
            "Processing summary: {} newly processed, {} skipped, {} failed",
            self.processed,
            self.skipped,
            self.failed
        );
        if self.processed > 0 {
            log::info!("Notes processed in this run: {}", self.total_notes);
            log::info!("Matches found in this run: {}", self.matched_notes);
            if self.total_notes > 0 {
                log::info!(
                    "Match rate: {:.2}%",
                    self.matched_notes as f64 / self.total_notes as f64 * 100.0
                );
            }
            log::info!("Processing speed: {:.1} notes/second", self.notes_per_second());
        }
        log::info!("Time elapsed: {:.1} minutes", self.elapsed.as_secs_f64() / 60.0);

        if !self.errors.is_empty() {
            log::warn!("Errors encountered in {} partitions", self.errors.len());
            for (partition_id, message) in self.errors.iter().take(MAX_LOGGED_ERRORS) {
                log::warn!("  {partition_id}: {message}");
            }
        }
    }
}

/// Enumerate the corpus partitions under a root directory
///
/// Each immediate subdirectory holding at least one Parquet file becomes a
/// partition; subdirectories without Parquet files are logged and ignored.
/// Partitions are returned in lexicographic order of their identifiers, so
/// enumeration is deterministic across runs.
///
/// # Errors
/// Returns an error if the corpus root cannot be read
pub fn discover_partitions(corpus_root: &Path) -> Result<Vec<Partition>> {
    validate_directory(corpus_root)?;

    let mut partitions = Vec::new();
    for entry in std::fs::read_dir(corpus_root)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        let Some(id) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        let files = find_parquet_files(&path)?;
        if files.is_empty() {
            log::warn!("No Parquet files found in partition directory {}", path.display());
            continue;
        }
        partitions.push(Partition {
            id: id.to_string(),
            files,
        });
    }

    let partitions = partitions
        .into_iter()
        .sorted_by(|a, b| a.id.cmp(&b.id))
        .collect_vec();

    Ok(partitions)
}

/// Run the full corpus scan
///
/// Processes every partition sequentially, skipping the ones whose artifacts
/// already exist, and accumulates the run report. Partition failures are
/// recorded, never propagated.
///
/// # Arguments
/// * `corpus_root` - Directory tree with one subdirectory per partition
/// * `registry` - Compiled keyword and suppression patterns
/// * `config` - Scan configuration
/// * `intermediate_dir` - Directory for per-partition artifacts; created if
///   absent
///
/// # Errors
/// Returns an error only if the corpus root cannot be enumerated or the
/// intermediate directory cannot be created
pub fn run(
    corpus_root: &Path,
    registry: &PatternRegistry,
    config: &ScanConfig,
    intermediate_dir: &Path,
) -> Result<RunReport> {
    std::fs::create_dir_all(intermediate_dir)?;

    let partitions = discover_partitions(corpus_root)?;
    log::info!(
        "Found {} partitions under {}",
        partitions.len(),
        corpus_root.display()
    );

    let progress = config
        .show_progress
        .then(|| create_progress_bar(partitions.len() as u64, "partitions"));

    let start = Instant::now();
    let mut report = RunReport::default();

    for partition in &partitions {
        let summary = process_partition(partition, registry, config, intermediate_dir);
        match summary.status {
            PartitionStatus::Processed => {
                report.processed += 1;
                report.matched_notes += summary.matched_notes;
                report.total_notes += summary.total_notes;
            }
            PartitionStatus::Skipped => report.skipped += 1,
            PartitionStatus::Failed => {
                report.failed += 1;
                report
                    .errors
                    .push((summary.partition_id, summary.error.unwrap_or_default()));
            }
        }
        if let Some(pb) = &progress {
            pb.set_message(partition.id.clone());
            pb.inc(1);
        }
    }

    if let Some(pb) = &progress {
        pb.finish_with_message("done");
    }
    report.elapsed = start.elapsed();

    Ok(report)
}
