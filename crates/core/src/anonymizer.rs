//! Term pass followed by a single heuristic token pass.

use regex::Regex;

use crate::heuristics::HeuristicClassifier;
use crate::terms::{Segment, TermMatcher};
use crate::{RedactError, RedactionConfig, Result};

/// Letters, digits and the symbols allowed inside a word.
const TOKEN_PATTERN: &str = r"[\p{L}\p{N}@#.!]+";

#[derive(Debug, Clone)]
pub struct TextAnonymizer {
    terms: TermMatcher,
    classifier: HeuristicClassifier,
    token: Regex,
    replacement: String,
}

impl TextAnonymizer {
    pub fn new(config: &RedactionConfig) -> Result<Self> {
        config.validate()?;
        let token = Regex::new(TOKEN_PATTERN)
            .map_err(|err| RedactError::Configuration(format!("token pattern: {err}")))?;
        Ok(Self {
            terms: TermMatcher::new(&config.terms)?,
            classifier: HeuristicClassifier::from_config(config),
            token,
            replacement: config.replacement.clone(),
        })
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Whitespace and punctuation outside matched spans come through
    /// byte-for-byte.
    pub fn anonymize(&self, text: &str) -> String {
        let segments = self
            .terms
            .apply(vec![Segment::Plain(text.to_string())], &self.replacement);

        let mut out = String::with_capacity(text.len());
        for segment in &segments {
            match segment {
                Segment::Redacted => out.push_str(&self.replacement),
                Segment::Plain(plain) => self.redact_tokens(plain, &mut out),
            }
        }
        out
    }

    fn redact_tokens(&self, text: &str, out: &mut String) {
        if !self.classifier.is_enabled() {
            out.push_str(text);
            return;
        }

        let mut cursor = 0;
        for token in self.token.find_iter(text) {
            out.push_str(&text[cursor..token.start()]);
            if self.classifier.should_redact(token.as_str()) {
                out.push_str(&self.replacement);
            } else {
                out.push_str(token.as_str());
            }
            cursor = token.end();
        }
        out.push_str(&text[cursor..]);
    }
}
