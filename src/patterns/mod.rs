//! Keyword and suppression pattern registry.
//!
//! The registry holds the compiled AUD keyword patterns loaded from the
//! keyword source, plus three fixed suppression patterns (negation,
//! hypothetical/family context, legal/administrative). A suppression match
//! disqualifies a sentence regardless of keyword hits.

use std::fs::File;
use std::io::Seek;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, StringArray};
use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use regex::{Regex, RegexBuilder};

use crate::error::{NoteScanError, Result};

/// Negation/absence vocabulary; a match suppresses the sentence
pub const NEGATION_EXPR: &str =
    r"\b(?:no|not|never|denies|without|negative|free of|absent|ruled out)\b";

/// Hypothetical, recommendation, and family-context vocabulary
pub const CONTEXT_EXPR: &str = r"\b(?:if|recommend|suggest|advise|should|limiting|avoid|consider|encourage|abstain|family member|family history|mother|father|parent|sibling|relative)\b";

/// Legal, administrative, and consent vocabulary, including the AUDIT
/// screening instrument
pub const LEGAL_ADMIN_EXPR: &str = r"\b(?:authorization|release|consent|information|disclosure|permission|record|agreement|form|policy|AUDIT)\b";

/// One keyword concept: a canonical root name and its compiled expression
#[derive(Debug, Clone)]
pub struct KeywordPattern {
    /// Canonical concept name, e.g. `binge_drinking`
    pub root: String,
    /// Compiled case-insensitive match expression
    pub matcher: Regex,
}

/// Compiled keyword and suppression patterns; immutable after load
#[derive(Debug, Clone)]
pub struct PatternRegistry {
    keywords: Vec<KeywordPattern>,
    negation: Regex,
    context: Regex,
    legal_admin: Regex,
}

impl PatternRegistry {
    /// Build a registry from in-memory `(root, expression)` pairs
    ///
    /// # Errors
    /// Returns a `Configuration` error if any expression fails to compile or
    /// if no pairs are provided
    pub fn new<I, R, E>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (R, E)>,
        R: Into<String>,
        E: AsRef<str>,
    {
        let mut keywords = Vec::new();
        for (root, expr) in pairs {
            let root = root.into();
            let matcher = compile_insensitive(expr.as_ref()).map_err(|e| {
                NoteScanError::Configuration(format!(
                    "Invalid expression for keyword root '{root}': {e}"
                ))
            })?;
            keywords.push(KeywordPattern { root, matcher });
        }

        if keywords.is_empty() {
            return Err(NoteScanError::Configuration(
                "Keyword source contains no patterns".to_string(),
            ));
        }

        Ok(Self {
            keywords,
            negation: compile_suppression(NEGATION_EXPR)?,
            context: compile_suppression(CONTEXT_EXPR)?,
            legal_admin: compile_suppression(LEGAL_ADMIN_EXPR)?,
        })
    }

    /// Load the registry from a CSV keyword source with `Root` and `Regex`
    /// columns
    ///
    /// # Arguments
    /// * `path` - Path to the keyword source CSV
    ///
    /// # Errors
    /// Returns a `Configuration` error if the file is missing, a required
    /// column is absent, or any expression fails to compile
    pub fn from_csv(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(NoteScanError::Configuration(format!(
                "Keyword source not found: {}",
                path.display()
            )));
        }

        let mut file = File::open(path).map_err(|e| {
            NoteScanError::Configuration(format!(
                "Failed to open keyword source {}: {e}",
                path.display()
            ))
        })?;

        let format = Format::default().with_header(true);
        let (schema, _) = format.infer_schema(&mut file, None).map_err(|e| {
            NoteScanError::Configuration(format!(
                "Failed to read keyword source {}: {e}",
                path.display()
            ))
        })?;

        let root_idx = schema.index_of("Root").map_err(|_| {
            NoteScanError::Configuration("Keyword source is missing the Root column".to_string())
        })?;
        let regex_idx = schema.index_of("Regex").map_err(|_| {
            NoteScanError::Configuration("Keyword source is missing the Regex column".to_string())
        })?;

        file.rewind()?;
        let reader = ReaderBuilder::new(Arc::new(schema))
            .with_format(format)
            .build(file)
            .map_err(|e| {
                NoteScanError::Configuration(format!(
                    "Failed to read keyword source {}: {e}",
                    path.display()
                ))
            })?;

        let mut pairs: Vec<(String, String)> = Vec::new();
        for batch in reader {
            let batch = batch.map_err(|e| {
                NoteScanError::Configuration(format!(
                    "Failed to parse keyword source {}: {e}",
                    path.display()
                ))
            })?;

            let roots = column_as_text(batch.column(root_idx), "Root")?;
            let exprs = column_as_text(batch.column(regex_idx), "Regex")?;

            for row in 0..batch.num_rows() {
                if roots.is_null(row) || exprs.is_null(row) {
                    return Err(NoteScanError::Configuration(format!(
                        "Keyword source row {row} has an empty Root or Regex value"
                    )));
                }
                pairs.push((roots.value(row).to_string(), exprs.value(row).to_string()));
            }
        }

        let registry = Self::new(pairs)?;
        log::info!("Loaded {} AUD keyword patterns", registry.len());
        Ok(registry)
    }

    /// All keyword patterns, in keyword-source order
    #[must_use]
    pub fn keywords(&self) -> &[KeywordPattern] {
        &self.keywords
    }

    /// The negation/absence suppression pattern
    #[must_use]
    pub fn negation(&self) -> &Regex {
        &self.negation
    }

    /// The hypothetical/recommendation/family-context suppression pattern
    #[must_use]
    pub fn context(&self) -> &Regex {
        &self.context
    }

    /// The legal/administrative suppression pattern
    #[must_use]
    pub fn legal_admin(&self) -> &Regex {
        &self.legal_admin
    }

    /// Number of loaded keyword patterns
    #[must_use]
    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    /// Whether the registry holds no keyword patterns
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

fn compile_insensitive(expr: &str) -> std::result::Result<Regex, regex::Error> {
    RegexBuilder::new(expr).case_insensitive(true).build()
}

fn compile_suppression(expr: &str) -> Result<Regex> {
    compile_insensitive(expr).map_err(|e| {
        NoteScanError::Configuration(format!("Invalid suppression expression: {e}"))
    })
}

fn column_as_text<'a>(
    array: &'a arrow::array::ArrayRef,
    name: &str,
) -> Result<&'a StringArray> {
    array.as_any().downcast_ref::<StringArray>().ok_or_else(|| {
        NoteScanError::Configuration(format!("Keyword source column {name} must be text"))
    })
}
