//! Bulk Parquet reading for note batch files.
//!
//! Only the four configured note columns are projected out of each batch
//! file; per-record text processing is left to the classifier. Column
//! extraction is columnar: whole arrays are downcast once and converted,
//! never row-at-a-time field lookups.

use std::fs::File;
use std::path::{Path, PathBuf};

use arrow::array::{
    Array, Int64Array, LargeStringArray, StringArray, TimestampMicrosecondArray,
    TimestampMillisecondArray, TimestampNanosecondArray, TimestampSecondArray,
};
use arrow::datatypes::{DataType, TimeUnit};
use arrow::record_batch::RecordBatch;
use arrow::temporal_conversions::{
    timestamp_ms_to_datetime, timestamp_ns_to_datetime, timestamp_s_to_datetime,
    timestamp_us_to_datetime,
};
use chrono::NaiveDateTime;
use itertools::Itertools;
use parquet::arrow::ProjectionMask;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::config::ScanConfig;
use crate::error::{NoteScanError, Result};
use crate::models::NoteRecord;
use crate::utils::validate_directory;

/// Timestamp rendering used for the `note_date` passthrough column
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Find all Parquet files in a directory, lexicographically sorted
///
/// The stable ordering keeps corpus enumeration deterministic across runs.
///
/// # Errors
/// Returns an error if the directory cannot be read
pub fn find_parquet_files(dir: &Path) -> Result<Vec<PathBuf>> {
    validate_directory(dir)?;

    let files = std::fs::read_dir(dir)
        .map_err(|e| {
            NoteScanError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read directory {}: {e}", dir.display()),
            ))
        })?
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            (path.is_file() && path.extension().is_some_and(|ext| ext == "parquet"))
                .then_some(path)
        })
        .sorted()
        .collect_vec();

    Ok(files)
}

/// Read one note batch file, projecting only the configured note columns
///
/// # Arguments
/// * `path` - Path to the Parquet batch file
/// * `config` - Scan configuration naming the note columns
///
/// # Errors
/// Returns an error if the file cannot be opened, is not valid Parquet, or
/// is missing any configured column
pub fn read_note_batches(path: &Path, config: &ScanConfig) -> Result<Vec<RecordBatch>> {
    let file = File::open(path).map_err(|e| {
        NoteScanError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to open file {}: {e}", path.display()),
        ))
    })?;

    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    let file_schema = builder.schema().clone();
    let wanted = [
        config.person_id_column.as_str(),
        config.note_id_column.as_str(),
        config.note_date_column.as_str(),
        config.report_text_column.as_str(),
    ];
    let mut projection = Vec::with_capacity(wanted.len());
    for name in wanted {
        let idx = file_schema.index_of(name).map_err(|_| {
            NoteScanError::Schema(format!(
                "Column {name} not found in {}",
                path.display()
            ))
        })?;
        projection.push(idx);
    }

    let mask = ProjectionMask::roots(builder.parquet_schema(), projection);
    let reader = builder
        .with_batch_size(config.batch_size)
        .with_projection(mask)
        .build()?;

    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(batches)
}

/// Read every record batch of a Parquet file without projection
///
/// # Errors
/// Returns an error if the file cannot be opened or is not valid Parquet
pub fn read_parquet_file(path: &Path) -> Result<Vec<RecordBatch>> {
    let file = File::open(path).map_err(|e| {
        NoteScanError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to open file {}: {e}", path.display()),
        ))
    })?;

    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;
    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(batches)
}

/// Extract note records from a projected batch
///
/// Identifier columns accept text or 64-bit integers; the date column
/// additionally accepts any timestamp unit, rendered through chrono.
///
/// # Errors
/// Returns an error if a configured column is missing or has an unsupported
/// type
pub fn notes_from_batch(batch: &RecordBatch, config: &ScanConfig) -> Result<Vec<NoteRecord>> {
    let person_ids = column_as_strings(batch, &config.person_id_column)?;
    let note_ids = column_as_strings(batch, &config.note_id_column)?;
    let note_dates = column_as_strings(batch, &config.note_date_column)?;
    let texts = column_as_strings(batch, &config.report_text_column)?;

    let records = itertools::izip!(person_ids, note_ids, note_dates, texts)
        .map(|(person_id, note_id, note_date, report_text)| NoteRecord {
            person_id: person_id.unwrap_or_default(),
            note_id: note_id.unwrap_or_default(),
            note_date,
            report_text,
        })
        .collect_vec();

    Ok(records)
}

/// Render one column as owned optional strings, converting ids and
/// timestamps as needed
fn column_as_strings(batch: &RecordBatch, name: &str) -> Result<Vec<Option<String>>> {
    let idx = batch.schema().index_of(name).map_err(|_| {
        NoteScanError::Schema(format!("Column {name} not found in record batch"))
    })?;
    let array = batch.column(idx);

    match array.data_type() {
        DataType::Utf8 => {
            let values = downcast::<StringArray>(array, name)?;
            Ok((0..values.len())
                .map(|i| (!values.is_null(i)).then(|| values.value(i).to_string()))
                .collect_vec())
        }
        DataType::LargeUtf8 => {
            let values = downcast::<LargeStringArray>(array, name)?;
            Ok((0..values.len())
                .map(|i| (!values.is_null(i)).then(|| values.value(i).to_string()))
                .collect_vec())
        }
        DataType::Int64 => {
            let values = downcast::<Int64Array>(array, name)?;
            Ok((0..values.len())
                .map(|i| (!values.is_null(i)).then(|| values.value(i).to_string()))
                .collect_vec())
        }
        DataType::Timestamp(unit, _) => {
            let convert: Box<dyn Fn(usize) -> Option<NaiveDateTime> + '_> = match unit {
                TimeUnit::Second => {
                    let values = downcast::<TimestampSecondArray>(array, name)?;
                    Box::new(move |i| {
                        (!values.is_null(i)).then(|| timestamp_s_to_datetime(values.value(i))).flatten()
                    })
                }
                TimeUnit::Millisecond => {
                    let values = downcast::<TimestampMillisecondArray>(array, name)?;
                    Box::new(move |i| {
                        (!values.is_null(i)).then(|| timestamp_ms_to_datetime(values.value(i))).flatten()
                    })
                }
                TimeUnit::Microsecond => {
                    let values = downcast::<TimestampMicrosecondArray>(array, name)?;
                    Box::new(move |i| {
                        (!values.is_null(i)).then(|| timestamp_us_to_datetime(values.value(i))).flatten()
                    })
                }
                TimeUnit::Nanosecond => {
                    let values = downcast::<TimestampNanosecondArray>(array, name)?;
                    Box::new(move |i| {
                        (!values.is_null(i)).then(|| timestamp_ns_to_datetime(values.value(i))).flatten()
                    })
                }
            };

            Ok((0..array.len())
                .map(|i| convert(i).map(|dt| dt.format(DATE_FORMAT).to_string()))
                .collect_vec())
        }
        other => Err(NoteScanError::Schema(format!(
            "Unsupported type {other:?} for column {name}"
        ))),
    }
}

fn downcast<'a, T: 'static>(array: &'a arrow::array::ArrayRef, name: &str) -> Result<&'a T> {
    array.as_any().downcast_ref::<T>().ok_or_else(|| {
        NoteScanError::Schema(format!("Failed to downcast column {name}"))
    })
}
