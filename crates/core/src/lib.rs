//! Core domain types and redaction logic for pdfanon.

mod anonymizer;
mod error;
mod heuristics;
mod metrics;
mod phrase;
mod placement;
mod render;
mod terms;

use serde::{Deserialize, Serialize};

pub use anonymizer::TextAnonymizer;
pub use error::{RedactError, Result};
pub use heuristics::{HeuristicClassifier, HeuristicRule, MIN_HEURISTIC_TOKEN_CHARS};
pub use metrics::{FontMetrics, Helvetica};
pub use phrase::PhraseMatcher;
pub use placement::{MIN_FONT_SIZE, WordPlacer};
pub use render::{DocumentSink, PageCanvas, PageContent, PdfBackend, SourceDocument};
pub use terms::TermMatcher;

pub const DEFAULT_REPLACEMENT: &str = "[REDACTED]";

/// What to redact and what to draw instead. Built once per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedactionConfig {
    pub terms: Vec<String>,
    pub replacement: String,
    pub anonymize_alphanumeric: bool,
    pub anonymize_letters_special: bool,
    pub anonymize_numeric_codes: bool,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            terms: Vec::new(),
            replacement: DEFAULT_REPLACEMENT.to_string(),
            anonymize_alphanumeric: false,
            anonymize_letters_special: false,
            anonymize_numeric_codes: false,
        }
    }
}

impl RedactionConfig {
    pub fn with_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            terms: terms.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Enables every heuristic rule.
    pub fn with_all_heuristics(mut self) -> Self {
        self.anonymize_alphanumeric = true;
        self.anonymize_letters_special = true;
        self.anonymize_numeric_codes = true;
        self
    }

    /// Trims terms and drops case-insensitive duplicates, keeping first-seen order.
    pub fn normalize(&mut self) {
        let mut seen: Vec<String> = Vec::with_capacity(self.terms.len());
        let mut terms = Vec::with_capacity(self.terms.len());
        for term in &self.terms {
            let trimmed = term.trim();
            let folded = trimmed.to_lowercase();
            if !trimmed.is_empty() && seen.contains(&folded) {
                continue;
            }
            seen.push(folded);
            terms.push(trimmed.to_string());
        }
        self.terms = terms;
    }

    pub fn validate(&self) -> Result<()> {
        if self.replacement.is_empty() {
            return Err(RedactError::Configuration(
                "replacement must not be empty".to_string(),
            ));
        }
        if let Some(idx) = self.terms.iter().position(|t| t.trim().is_empty()) {
            return Err(RedactError::Configuration(format!(
                "term #{} is blank",
                idx + 1
            )));
        }
        Ok(())
    }

    pub fn enabled_rules(&self) -> Vec<HeuristicRule> {
        HeuristicRule::ALL
            .into_iter()
            .filter(|rule| match rule {
                HeuristicRule::AlphanumericMix => self.anonymize_alphanumeric,
                HeuristicRule::InteriorSpecial => self.anonymize_letters_special,
                HeuristicRule::NumericCode => self.anonymize_numeric_codes,
            })
            .collect()
    }
}

/// One word as reported by text extraction.
///
/// `bottom` is measured from the top edge of the page, so the word occupies
/// `bottom - height ..= bottom` in top-down coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedWord {
    pub text: String,
    pub x0: f32,
    pub bottom: f32,
    pub width: f32,
    pub height: f32,
}

impl ExtractedWord {
    pub fn new(text: impl Into<String>, x0: f32, bottom: f32, width: f32, height: f32) -> Self {
        Self {
            text: text.into(),
            x0,
            bottom,
            width,
            height,
        }
    }

    pub fn top(&self) -> f32 {
        self.bottom - self.height
    }

    pub fn x1(&self) -> f32 {
        self.x0 + self.width
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
}

impl PageGeometry {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// A word ready to be drawn: replacement text plus the fitted font size and
/// a bottom-up draw origin.
#[derive(Debug, Clone, PartialEq)]
pub struct AnonymizedWord {
    pub source: ExtractedWord,
    pub text: String,
    pub font_size: f32,
    pub x: f32,
    pub y: f32,
}

impl AnonymizedWord {
    pub fn is_redacted(&self) -> bool {
        self.text != self.source.text
    }
}
