use notescan::{PatternRegistry, classify_note, classify_sentence};

fn test_registry() -> PatternRegistry {
    PatternRegistry::new([
        ("heavy_drinking", r"\bheavy drinking\b"),
        ("alcoholism", r"\balcoholism\b"),
        ("etoh", r"\betoh\b"),
    ])
    .expect("test patterns should compile")
}

/// A sentence with a keyword and no suppression terms is a valid match
#[test]
fn positive_match_single_root() {
    let registry = test_registry();
    let verdict = classify_sentence(&registry, "Patient reports daily heavy drinking");

    assert!(verdict.is_valid);
    assert_eq!(verdict.matched_roots.as_slice(), ["heavy_drinking"]);
}

/// All matching keyword roots are collected, in registry order
#[test]
fn positive_match_multiple_roots() {
    let registry = test_registry();
    let verdict = classify_sentence(
        &registry,
        "Longstanding alcoholism with episodes of heavy drinking",
    );

    assert!(verdict.is_valid);
    assert_eq!(
        verdict.matched_roots.as_slice(),
        ["heavy_drinking", "alcoholism"]
    );
}

/// Negation suppresses the sentence even when a keyword is present
#[test]
fn negation_beats_keywords() {
    let registry = test_registry();
    let verdict = classify_sentence(&registry, "Patient denies heavy drinking");

    assert!(!verdict.is_valid);
    assert!(verdict.matched_roots.is_empty());
}

/// Family-history context suppresses the sentence
#[test]
fn family_context_beats_keywords() {
    let registry = test_registry();
    let verdict = classify_sentence(&registry, "Family history of alcoholism in the household");

    assert!(!verdict.is_valid);
    assert!(verdict.matched_roots.is_empty());
}

/// Legal/administrative vocabulary suppresses the sentence
#[test]
fn legal_admin_beats_keywords() {
    let registry = test_registry();
    let verdict = classify_sentence(
        &registry,
        "Patient signed a consent covering treatment for alcoholism",
    );

    assert!(!verdict.is_valid);
    assert!(verdict.matched_roots.is_empty());
}

/// Keyword matching is case-insensitive
#[test]
fn matching_is_case_insensitive() {
    let registry = test_registry();
    let verdict = classify_sentence(&registry, "HEAVY DRINKING observed at intake");

    assert!(verdict.is_valid);
    assert_eq!(verdict.matched_roots.as_slice(), ["heavy_drinking"]);
}

/// Repeated classification of the same sentence yields identical verdicts
#[test]
fn classification_is_deterministic() {
    let registry = test_registry();
    let sentence = "Longstanding alcoholism with episodes of heavy drinking";

    let first = classify_sentence(&registry, sentence);
    let second = classify_sentence(&registry, sentence);
    assert_eq!(first, second);
}

/// Trimmed fragments shorter than the threshold are never classified
#[test]
fn short_fragments_are_excluded() {
    let registry = test_registry();
    let matches = classify_note(
        &registry,
        "ETOH. Patient reports heavy drinking most evenings.",
        10,
    )
    .expect("the long sentence should match");

    assert_eq!(matches.roots, ["heavy_drinking"]);
    assert_eq!(
        matches.sentences,
        ["Patient reports heavy drinking most evenings"]
    );
}

/// Empty text produces no classification
#[test]
fn empty_text_yields_none() {
    let registry = test_registry();
    assert!(classify_note(&registry, "", 10).is_none());
}

/// Text without any keyword match produces no classification
#[test]
fn unmatched_text_yields_none() {
    let registry = test_registry();
    assert!(classify_note(&registry, "Knee pain after running yesterday evening", 10).is_none());
}

/// Roots are deduplicated across sentences; matched sentences are not
#[test]
fn roots_union_is_idempotent() {
    let registry = test_registry();
    let matches = classify_note(
        &registry,
        "Patient reports heavy drinking. Heavy drinking continues most weekends.",
        10,
    )
    .expect("both sentences should match");

    assert_eq!(matches.roots, ["heavy_drinking"]);
    assert_eq!(matches.sentences.len(), 2);
}

/// Distinct roots accumulate across sentences in order of first appearance
#[test]
fn roots_accumulate_across_sentences() {
    let registry = test_registry();
    let matches = classify_note(
        &registry,
        "Chronic alcoholism documented here. Ongoing heavy drinking episodes.",
        10,
    )
    .expect("both sentences should match");

    assert_eq!(matches.roots, ["alcoholism", "heavy_drinking"]);
    assert_eq!(matches.sentences.len(), 2);
}

/// A suppressed sentence contributes nothing even when a later sentence matches
#[test]
fn suppressed_sentences_are_dropped_from_aggregation() {
    let registry = test_registry();
    let matches = classify_note(
        &registry,
        "Patient denies etoh use currently. Chart documents heavy drinking episodes.",
        10,
    )
    .expect("the second sentence should match");

    assert_eq!(matches.roots, ["heavy_drinking"]);
    assert_eq!(matches.sentences, ["Chart documents heavy drinking episodes"]);
}

/// Newlines act as sentence boundaries like any other terminator
#[test]
fn newlines_split_sentences() {
    let registry = test_registry();
    let matches = classify_note(
        &registry,
        "heavy drinking reported today\nno acute distress observed",
        10,
    )
    .expect("the first line should match");

    assert_eq!(matches.roots, ["heavy_drinking"]);
    assert_eq!(matches.sentences, ["heavy drinking reported today"]);
}
