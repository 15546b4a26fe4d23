//! Sentence and note classification.
//!
//! A sentence is a valid positive mention only when no suppression pattern
//! matches and at least one keyword pattern does. Suppression short-circuits
//! before any keyword scan, trading false negatives for fewer false
//! positives. Note-level classification folds sentence verdicts into an
//! insertion-ordered root set plus the matched sentences in note order.

use std::sync::LazyLock;

use regex::Regex;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::patterns::PatternRegistry;

/// Sentence terminators; a run of one or more counts as a single boundary
static SENTENCE_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?;:\n]+").expect("sentence boundary pattern is valid"));

/// Outcome of classifying a single sentence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceVerdict<'r> {
    /// Roots of all keyword patterns that matched, in registry order
    pub matched_roots: SmallVec<[&'r str; 4]>,
    /// True only if no suppression pattern matched and at least one keyword did
    pub is_valid: bool,
}

impl SentenceVerdict<'_> {
    fn suppressed() -> Self {
        Self {
            matched_roots: SmallVec::new(),
            is_valid: false,
        }
    }
}

/// Keyword roots and matched sentences accumulated over one note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteMatches {
    /// Distinct matched roots, in order of first appearance
    pub roots: Vec<String>,
    /// Trimmed matched sentences, in note order; duplicates preserved
    pub sentences: Vec<String>,
}

/// Classify one sentence against the registry
///
/// Suppression patterns are tried in fixed order (negation, context,
/// legal/administrative); the first match wins and no keyword scan happens.
/// Otherwise every keyword pattern is scanned with union semantics.
#[must_use]
pub fn classify_sentence<'r>(registry: &'r PatternRegistry, sentence: &str) -> SentenceVerdict<'r> {
    if registry.negation().is_match(sentence) {
        return SentenceVerdict::suppressed();
    }
    if registry.context().is_match(sentence) {
        return SentenceVerdict::suppressed();
    }
    if registry.legal_admin().is_match(sentence) {
        return SentenceVerdict::suppressed();
    }

    let mut matched_roots = SmallVec::new();
    for keyword in registry.keywords() {
        if keyword.matcher.is_match(sentence) {
            matched_roots.push(keyword.root.as_str());
        }
    }

    let is_valid = !matched_roots.is_empty();
    SentenceVerdict {
        matched_roots,
        is_valid,
    }
}

/// Classify one note's free text
///
/// Splits the text into sentences, drops trimmed fragments shorter than
/// `min_sentence_len`, and folds the per-sentence verdicts. Returns `None`
/// for empty text or when no sentence produced a valid match. Pure function:
/// identical inputs always yield identical output.
#[must_use]
pub fn classify_note(
    registry: &PatternRegistry,
    text: &str,
    min_sentence_len: usize,
) -> Option<NoteMatches> {
    if text.is_empty() {
        return None;
    }

    let mut seen: FxHashSet<&str> = FxHashSet::default();
    let mut roots = Vec::new();
    let mut sentences = Vec::new();

    for raw in SENTENCE_BOUNDARY.split(text) {
        let sentence = raw.trim();
        if sentence.chars().count() < min_sentence_len {
            continue;
        }

        let verdict = classify_sentence(registry, sentence);
        if verdict.is_valid {
            for root in verdict.matched_roots {
                if seen.insert(root) {
                    roots.push(root.to_string());
                }
            }
            sentences.push(sentence.to_string());
        }
    }

    if roots.is_empty() {
        None
    } else {
        Some(NoteMatches { roots, sentences })
    }
}
