//! Row models for note input and classification output.

use arrow::record_batch::RecordBatch;
use arrow_schema::FieldRef;
use serde::{Deserialize, Serialize};
use serde_arrow::schema::{SchemaLike, TracingOptions};

use crate::error::{NoteScanError, Result};

/// One clinical note as read from a partition batch file; never mutated
#[derive(Debug, Clone)]
pub struct NoteRecord {
    /// Patient identifier
    pub person_id: String,
    /// Note identifier
    pub note_id: String,
    /// Note timestamp, rendered as text
    pub note_date: Option<String>,
    /// Free-text report content
    pub report_text: Option<String>,
}

/// One matched note; the row schema of partition artifacts and the final table
///
/// Invariant: `aud_roots_count == aud_roots.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteClassification {
    /// Patient identifier
    pub person_id: String,
    /// Note identifier
    pub note_id: String,
    /// Note timestamp, rendered as text
    pub note_date: Option<String>,
    /// Distinct matched keyword roots, in order of first appearance
    pub aud_roots: Vec<String>,
    /// Number of distinct matched roots
    pub aud_roots_count: u32,
    /// Trimmed matched sentences, in note order
    pub matched_sentences: Vec<String>,
}

impl NoteClassification {
    /// Arrow fields for the classification row schema
    pub fn fields() -> Result<Vec<FieldRef>> {
        Vec::<FieldRef>::from_type::<Self>(TracingOptions::default())
            .map_err(|e| NoteScanError::Serialization(format!("Failed to trace result schema: {e}")))
    }

    /// Convert classification rows to a `RecordBatch` using `serde_arrow`
    pub fn to_record_batch(rows: &[Self]) -> Result<RecordBatch> {
        let fields = Self::fields()?;
        serde_arrow::to_record_batch(&fields, &rows)
            .map_err(|e| NoteScanError::Serialization(format!("Failed to serialize results: {e}")))
    }

    /// Convert a `RecordBatch` back into classification rows
    pub fn from_record_batch(batch: &RecordBatch) -> Result<Vec<Self>> {
        serde_arrow::from_record_batch(batch)
            .map_err(|e| NoteScanError::Serialization(format!("Failed to deserialize results: {e}")))
    }
}
