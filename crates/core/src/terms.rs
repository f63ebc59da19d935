//! Whole-word, case-insensitive term replacement.

use std::ops::Range;

use regex::{Regex, RegexBuilder};

use crate::{RedactError, Result};

/// A run of text that is either still original or already replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment {
    Plain(String),
    Redacted,
}

#[derive(Debug, Clone)]
pub struct TermMatcher {
    patterns: Vec<Regex>,
}

impl TermMatcher {
    pub fn new<S: AsRef<str>>(terms: &[S]) -> Result<Self> {
        let patterns = terms
            .iter()
            .map(|term| compile_term(term.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Replaces every whole-word occurrence of every term, in list order.
    pub fn replace_all(&self, text: &str, replacement: &str) -> String {
        let segments = self.apply(vec![Segment::Plain(text.to_string())], replacement);
        render(&segments, replacement)
    }

    /// Runs each term over the plain segments left by the previous terms.
    /// Redacted segments are opaque, so a later term can never match inside
    /// the replacement string.
    pub(crate) fn apply(&self, mut segments: Vec<Segment>, replacement: &str) -> Vec<Segment> {
        for pattern in &self.patterns {
            segments = apply_pattern(pattern, segments, replacement);
        }
        segments
    }
}

pub(crate) fn render(segments: &[Segment], replacement: &str) -> String {
    let mut out = String::new();
    for segment in segments {
        match segment {
            Segment::Plain(text) => out.push_str(text),
            Segment::Redacted => out.push_str(replacement),
        }
    }
    out
}

fn compile_term(term: &str) -> Result<Regex> {
    if term.trim().is_empty() {
        return Err(RedactError::Configuration("term must not be blank".to_string()));
    }
    RegexBuilder::new(&regex::escape(term))
        .case_insensitive(true)
        .build()
        .map_err(|err| RedactError::Configuration(format!("term {term:?}: {err}")))
}

fn apply_pattern(pattern: &Regex, segments: Vec<Segment>, replacement: &str) -> Vec<Segment> {
    let mut out = Vec::with_capacity(segments.len());
    let mut before: Option<char> = None;
    let mut iter = segments.into_iter().peekable();

    while let Some(segment) = iter.next() {
        let text = match segment {
            Segment::Redacted => {
                out.push(Segment::Redacted);
                before = replacement.chars().next_back().or(before);
                continue;
            }
            Segment::Plain(text) => text,
        };

        let after = match iter.peek() {
            Some(Segment::Plain(next)) => next.chars().next(),
            Some(Segment::Redacted) => replacement.chars().next(),
            None => None,
        };

        let matches = boundary_matches(pattern, &text, before, after);
        before = text.chars().next_back().or(before);

        if matches.is_empty() {
            out.push(Segment::Plain(text));
            continue;
        }

        let mut cursor = 0;
        for range in matches {
            if range.start > cursor {
                out.push(Segment::Plain(text[cursor..range.start].to_string()));
            }
            out.push(Segment::Redacted);
            cursor = range.end;
        }
        if cursor < text.len() {
            out.push(Segment::Plain(text[cursor..].to_string()));
        }
    }

    out
}

/// Matches not touching another alphanumeric character on either side.
/// `before`/`after` are the characters just outside `text`.
fn boundary_matches(
    pattern: &Regex,
    text: &str,
    before: Option<char>,
    after: Option<char>,
) -> Vec<Range<usize>> {
    let mut found = Vec::new();
    let mut pos = 0;

    while pos < text.len() {
        let Some(m) = pattern.find_at(text, pos) else {
            break;
        };
        if m.is_empty() {
            break;
        }

        let prev = text[..m.start()].chars().next_back().or(before);
        let next = text[m.end()..].chars().next().or(after);
        if is_word_char(prev) || is_word_char(next) {
            // retry one character later so overlapping candidates are not lost
            pos = m.start() + text[m.start()..].chars().next().map_or(1, char::len_utf8);
            continue;
        }

        found.push(m.range());
        pos = m.end();
    }

    found
}

fn is_word_char(ch: Option<char>) -> bool {
    ch.is_some_and(char::is_alphanumeric)
}
