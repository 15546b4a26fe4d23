//! Partition processing: the checkpointed unit of work.
//!
//! A partition is one subdirectory of the corpus holding one or more Parquet
//! batch files. Each partition persists at most two artifacts in the
//! intermediate directory: a Parquet result table (only when at least one
//! note matched) and a JSON checkpoint recording completion, so that
//! partitions with zero matches are not re-scanned on resume. Both artifacts
//! are written atomically; the presence of either marks the partition done.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::classify::classify_note;
use crate::config::ScanConfig;
use crate::error::Result;
use crate::models::NoteClassification;
use crate::patterns::PatternRegistry;
use crate::reader::{notes_from_batch, read_note_batches};
use crate::utils::{write_json_atomic, write_parquet_atomic};

/// One corpus partition: an identifier and its batch files
#[derive(Debug, Clone)]
pub struct Partition {
    /// Identifier derived from the containing directory name
    pub id: String,
    /// Batch files belonging to the partition, lexicographically sorted
    pub files: Vec<PathBuf>,
}

/// How a partition fared during one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionStatus {
    /// Newly scanned in this run
    Processed,
    /// Checkpoint or result artifact already present; input not read
    Skipped,
    /// Reading, classifying, or persisting failed; the run continues
    Failed,
}

/// Per-partition outcome returned to the corpus driver
#[derive(Debug, Clone)]
pub struct PartitionSummary {
    /// Partition identifier
    pub partition_id: String,
    /// Run status
    pub status: PartitionStatus,
    /// Notes with at least one valid keyword match (newly processed only)
    pub matched_notes: usize,
    /// Notes read in this run (newly processed only)
    pub total_notes: usize,
    /// Error message for failed partitions
    pub error: Option<String>,
}

/// Durable completion outcome recorded in the checkpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckpointOutcome {
    /// The partition produced a result artifact
    Completed,
    /// The partition was scanned and produced no matches; no artifact exists
    CompletedEmpty,
}

/// Checkpoint persisted after a partition is fully scanned
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionCheckpoint {
    /// Partition identifier
    pub partition_id: String,
    /// Completion outcome
    pub outcome: CheckpointOutcome,
    /// Notes with at least one valid keyword match
    pub matched_notes: usize,
    /// Notes scanned
    pub total_notes: usize,
    /// Local completion time
    pub finished_at: String,
}

/// Canonical result artifact path for a partition
#[must_use]
pub fn result_path(intermediate_dir: &Path, partition_id: &str) -> PathBuf {
    intermediate_dir.join(format!("{partition_id}_results.parquet"))
}

/// Canonical checkpoint path for a partition
#[must_use]
pub fn checkpoint_path(intermediate_dir: &Path, partition_id: &str) -> PathBuf {
    intermediate_dir.join(format!("{partition_id}.status.json"))
}

/// Process one partition, containing any failure within it
///
/// Completed partitions are detected from their persisted artifacts and
/// skipped without reading any input. Errors are captured in the summary so
/// one bad partition never aborts the corpus run.
pub fn process_partition(
    partition: &Partition,
    registry: &PatternRegistry,
    config: &ScanConfig,
    intermediate_dir: &Path,
) -> PartitionSummary {
    let result_file = result_path(intermediate_dir, &partition.id);
    let checkpoint_file = checkpoint_path(intermediate_dir, &partition.id);

    if checkpoint_file.exists() || result_file.exists() {
        log::debug!("Skipping partition {} (already processed)", partition.id);
        return PartitionSummary {
            partition_id: partition.id.clone(),
            status: PartitionStatus::Skipped,
            matched_notes: 0,
            total_notes: 0,
            error: None,
        };
    }

    match scan_partition(partition, registry, config, &result_file, &checkpoint_file) {
        Ok((matched_notes, total_notes)) => {
            log::info!(
                "Partition {}: {matched_notes} of {total_notes} notes matched",
                partition.id
            );
            PartitionSummary {
                partition_id: partition.id.clone(),
                status: PartitionStatus::Processed,
                matched_notes,
                total_notes,
                error: None,
            }
        }
        Err(e) => {
            log::error!("Partition {} failed: {e}", partition.id);
            PartitionSummary {
                partition_id: partition.id.clone(),
                status: PartitionStatus::Failed,
                matched_notes: 0,
                total_notes: 0,
                error: Some(e.to_string()),
            }
        }
    }
}

/// Scan every note of the partition and persist the artifacts
fn scan_partition(
    partition: &Partition,
    registry: &PatternRegistry,
    config: &ScanConfig,
    result_file: &Path,
    checkpoint_file: &Path,
) -> Result<(usize, usize)> {
    let mut notes = Vec::new();
    for file in &partition.files {
        for batch in read_note_batches(file, config)? {
            notes.extend(notes_from_batch(&batch, config)?);
        }
    }
    let total_notes = notes.len();
    log::debug!("Partition {}: loaded {total_notes} notes", partition.id);

    // Indexed parallel iteration keeps the output in input order.
    let results: Vec<NoteClassification> = notes
        .par_iter()
        .filter_map(|note| {
            let text = note.report_text.as_deref()?;
            classify_note(registry, text, config.min_sentence_len).map(|matches| {
                NoteClassification {
                    person_id: note.person_id.clone(),
                    note_id: note.note_id.clone(),
                    note_date: note.note_date.clone(),
                    aud_roots_count: matches.roots.len() as u32,
                    aud_roots: matches.roots,
                    matched_sentences: matches.sentences,
                }
            })
        })
        .collect();
    let matched_notes = results.len();

    let outcome = if matched_notes > 0 {
        let batch = NoteClassification::to_record_batch(&results)?;
        write_parquet_atomic(&batch, result_file)?;
        CheckpointOutcome::Completed
    } else {
        CheckpointOutcome::CompletedEmpty
    };

    let checkpoint = PartitionCheckpoint {
        partition_id: partition.id.clone(),
        outcome,
        matched_notes,
        total_notes,
        finished_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    };
    write_json_atomic(&checkpoint, checkpoint_file)?;

    Ok((matched_notes, total_notes))
}
