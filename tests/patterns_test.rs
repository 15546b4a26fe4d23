use std::fs;
use std::path::PathBuf;

use notescan::{NoteScanError, PatternRegistry, classify_sentence};
use tempfile::TempDir;

fn write_keywords(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("keywords.csv");
    fs::write(&path, body).expect("keyword fixture should be writable");
    path
}

/// Keywords load from a Root/Regex CSV and compile case-insensitively
#[test]
fn loads_keyword_source() {
    let dir = TempDir::new().unwrap();
    let path = write_keywords(
        &dir,
        "Root,Regex\nheavy_drinking,\\bheavy drinking\\b\nalcoholism,\\balcoholism\\b\n",
    );

    let registry = PatternRegistry::from_csv(&path).expect("keyword source should load");
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.keywords()[0].root, "heavy_drinking");

    let verdict = classify_sentence(&registry, "Patient reports Heavy Drinking at home");
    assert!(verdict.is_valid);
}

/// A missing keyword source is a configuration error
#[test]
fn missing_source_is_configuration_error() {
    let dir = TempDir::new().unwrap();
    let err = PatternRegistry::from_csv(&dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, NoteScanError::Configuration(_)));
}

/// A keyword source without the Regex column is rejected
#[test]
fn missing_column_is_configuration_error() {
    let dir = TempDir::new().unwrap();
    let path = write_keywords(&dir, "Root,Pattern\nheavy_drinking,\\bheavy drinking\\b\n");

    let err = PatternRegistry::from_csv(&path).unwrap_err();
    assert!(matches!(err, NoteScanError::Configuration(_)));
}

/// An unparsable expression is rejected with the offending root named
#[test]
fn invalid_expression_is_configuration_error() {
    let dir = TempDir::new().unwrap();
    let path = write_keywords(&dir, "Root,Regex\nbad_root,([unclosed\n");

    let err = PatternRegistry::from_csv(&path).unwrap_err();
    match err {
        NoteScanError::Configuration(message) => assert!(message.contains("bad_root")),
        other => panic!("Expected a configuration error, got {other:?}"),
    }
}

/// A keyword source with no rows cannot start a run
#[test]
fn empty_source_is_configuration_error() {
    let dir = TempDir::new().unwrap();
    let path = write_keywords(&dir, "Root,Regex\n");

    let err = PatternRegistry::from_csv(&path).unwrap_err();
    assert!(matches!(err, NoteScanError::Configuration(_)));
}

/// In-memory construction rejects an empty pattern list as well
#[test]
fn empty_pairs_are_rejected() {
    let err = PatternRegistry::new(Vec::<(String, String)>::new()).unwrap_err();
    assert!(matches!(err, NoteScanError::Configuration(_)));
}
