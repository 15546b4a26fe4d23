//! A Rust library for screening partitioned Parquet corpora of clinical
//! notes for probable alcohol use disorder (AUD) mentions.
//!
//! Notes are scanned sentence by sentence against a loadable set of keyword
//! patterns; sentences in negated, hypothetical/family-history, or
//! legal/administrative contexts are suppressed. Processing is checkpointed
//! per partition so an interrupted corpus run can resume without repeating
//! work, and per-partition artifacts are merged into one final table.

pub mod classify;
pub mod config;
pub mod corpus;
pub mod error;
pub mod merge;
pub mod models;
pub mod partition;
pub mod patterns;
pub mod reader;
pub mod utils;

// Re-export the most common types for easier use
// Core types
pub use classify::{NoteMatches, SentenceVerdict, classify_note, classify_sentence};
pub use config::{DEFAULT_BATCH_SIZE, DEFAULT_MIN_SENTENCE_LEN, ScanConfig};
pub use corpus::{RunReport, discover_partitions, run};
pub use error::{NoteScanError, Result};
pub use merge::{MergeSummary, merge};
pub use models::{NoteClassification, NoteRecord};
pub use partition::{
    CheckpointOutcome, Partition, PartitionCheckpoint, PartitionStatus, PartitionSummary,
    process_partition,
};
pub use patterns::{KeywordPattern, PatternRegistry};

// Arrow types
pub use arrow::record_batch::RecordBatch;
