//! Configuration for the note screening pipeline.

/// Default batch size for Parquet reading
pub const DEFAULT_BATCH_SIZE: usize = 16384;

/// Default minimum sentence length; shorter fragments (section headers,
/// list bullets) are excluded to reduce false positives
pub const DEFAULT_MIN_SENTENCE_LEN: usize = 10;

/// Configuration for scanning a notes corpus
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Column holding the patient identifier
    pub person_id_column: String,
    /// Column holding the note identifier
    pub note_id_column: String,
    /// Column holding the note timestamp
    pub note_date_column: String,
    /// Column holding the free-text report content
    pub report_text_column: String,
    /// Minimum trimmed sentence length considered for classification
    pub min_sentence_len: usize,
    /// Batch size for reading Parquet files
    pub batch_size: usize,
    /// Whether to render a progress bar across partitions
    pub show_progress: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            person_id_column: "OMOP_PERSON_ID".to_string(),
            note_id_column: "ENCOUNTER_ID".to_string(),
            note_date_column: "PHYSIOLOGIC_TIME".to_string(),
            report_text_column: "REPORT_TEXT".to_string(),
            min_sentence_len: DEFAULT_MIN_SENTENCE_LEN,
            batch_size: DEFAULT_BATCH_SIZE,
            show_progress: true,
        }
    }
}
