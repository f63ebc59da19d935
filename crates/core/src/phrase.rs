//! Multi-word terms matched across consecutive extracted words.
//!
//! Extraction splits on whitespace, so a term such as `"John Doe"` never fits
//! inside a single word. Runs of words on the same line are compared against
//! the term's parts instead.

use crate::ExtractedWord;

#[derive(Debug, Clone, Default)]
pub struct PhraseMatcher {
    phrases: Vec<Vec<Part>>,
}

/// One whitespace-separated piece of a term, lowercased, with its own edge
/// punctuation kept apart from the alphanumeric core.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Part {
    lead: String,
    core: String,
    trail: String,
}

impl Part {
    fn parse(text: &str) -> Self {
        let lower = text.to_lowercase();
        let (lead, core, trail) = split_edges(&lower);
        Self {
            lead: lead.to_string(),
            core: core.to_string(),
            trail: trail.to_string(),
        }
    }

    /// Punctuation `word` carries beyond this part, as `(before, after)`.
    fn extra_edges<'w>(&self, word: &'w str) -> Option<(&'w str, &'w str)> {
        let (lead, core, trail) = split_edges(word);
        if core.to_lowercase() != self.core
            || !lead.ends_with(self.lead.as_str())
            || !trail.starts_with(self.trail.as_str())
        {
            return None;
        }
        Some((
            &lead[..lead.len() - self.lead.len()],
            &trail[self.trail.len()..],
        ))
    }
}

impl PhraseMatcher {
    /// Keeps only the terms with more than one whitespace-separated part.
    pub fn new<S: AsRef<str>>(terms: &[S]) -> Self {
        let phrases = terms
            .iter()
            .map(|term| term.as_ref().split_whitespace().map(Part::parse).collect::<Vec<_>>())
            .filter(|parts| parts.len() > 1)
            .collect();
        Self { phrases }
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    /// Returns one entry per word: the redacted text for words that belong
    /// to a phrase, `None` for the rest.
    pub fn redact_runs(&self, words: &[ExtractedWord], replacement: &str) -> Vec<Option<String>> {
        let mut out = vec![None; words.len()];
        if self.phrases.is_empty() {
            return out;
        }

        let mut idx = 0;
        while idx < words.len() {
            let Some(edges) = self
                .phrases
                .iter()
                .find_map(|parts| match_run(&words[idx..], parts))
            else {
                idx += 1;
                continue;
            };

            let len = edges.len();
            for (offset, (lead, trail)) in edges.into_iter().enumerate() {
                out[idx + offset] = Some(format!("{lead}{replacement}{trail}"));
            }
            idx += len;
        }

        out
    }
}

/// Extra edge punctuation of each matched word. Only the first word may
/// carry more leading punctuation than its part, only the last more
/// trailing punctuation.
fn match_run<'w>(words: &'w [ExtractedWord], parts: &[Part]) -> Option<Vec<(&'w str, &'w str)>> {
    if words.len() < parts.len() {
        return None;
    }
    let first = &words[0];
    let last_idx = parts.len() - 1;

    words
        .iter()
        .zip(parts)
        .enumerate()
        .map(|(idx, (word, part))| {
            if (word.bottom - first.bottom).abs() > first.height / 2.0 {
                return None;
            }
            let (lead, trail) = part.extra_edges(&word.text)?;
            let lead_ok = idx == 0 || lead.is_empty();
            let trail_ok = idx == last_idx || trail.is_empty();
            (lead_ok && trail_ok).then_some((lead, trail))
        })
        .collect()
}

/// Splits leading and trailing non-alphanumeric characters off a word.
fn split_edges(text: &str) -> (&str, &str, &str) {
    let start = text
        .char_indices()
        .find(|(_, ch)| ch.is_alphanumeric())
        .map_or(text.len(), |(idx, _)| idx);
    let end = text
        .char_indices()
        .rev()
        .find(|(_, ch)| ch.is_alphanumeric())
        .map_or(start, |(idx, ch)| idx + ch.len_utf8());
    let end = end.max(start);
    (&text[..start], &text[start..end], &text[end..])
}
