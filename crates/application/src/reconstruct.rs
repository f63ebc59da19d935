use pdfanon_core::{
    AnonymizedWord, DocumentSink, FontMetrics, PageCanvas, PageContent, PhraseMatcher,
    RedactionConfig, Result, TextAnonymizer, WordPlacer,
};
use serde::Serialize;
use tracing::{debug, trace, warn};

/// Per-page counts reported after a page has been drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageReport {
    /// 1-based page number.
    pub page: usize,
    pub words: usize,
    pub redacted: usize,
    pub skipped: usize,
}

/// Turns one source page into one freshly drawn output page.
#[derive(Debug, Clone)]
pub struct PageReconstructor<M> {
    anonymizer: TextAnonymizer,
    phrases: PhraseMatcher,
    placer: WordPlacer<M>,
}

impl<M: FontMetrics> PageReconstructor<M> {
    pub fn new(config: &RedactionConfig, metrics: M) -> Result<Self> {
        Ok(Self {
            anonymizer: TextAnonymizer::new(config)?,
            phrases: PhraseMatcher::new(&config.terms),
            placer: WordPlacer::new(metrics),
        })
    }

    pub fn with_min_font_size(mut self, min_font_size: f32) -> Self {
        self.placer = self.placer.with_min_font_size(min_font_size);
        self
    }

    /// Anonymized words with their draw geometry, in extraction order.
    /// Words whose text is blank are dropped.
    pub fn plan(&self, content: &PageContent) -> Vec<AnonymizedWord> {
        let replacement = self.anonymizer.replacement();
        let phrase_hits = self.phrases.redact_runs(&content.words, replacement);

        content
            .words
            .iter()
            .zip(phrase_hits)
            .filter_map(|(word, phrase_text)| {
                if word.text.trim().is_empty() {
                    warn!(x0 = word.x0, bottom = word.bottom, "skipping blank word");
                    return None;
                }
                let text = phrase_text.unwrap_or_else(|| self.anonymizer.anonymize(&word.text));
                Some(self.placer.place(word, text, content.geometry.height))
            })
            .collect()
    }

    /// Appends one page to `sink`. A page without words becomes a blank page
    /// of the same size.
    pub fn reconstruct<S: DocumentSink>(
        &self,
        sink: &mut S,
        index: usize,
        content: &PageContent,
    ) -> Result<PageReport> {
        let planned = self.plan(content);
        let font = self.placer.metrics().font_name();

        let mut canvas = sink.begin_page(content.geometry)?;
        let mut redacted = 0;
        for word in &planned {
            trace!(
                page = index + 1,
                text = %word.text,
                x = word.x,
                y = word.y,
                size = word.font_size,
                "place word"
            );
            canvas.set_font(font, word.font_size)?;
            canvas.draw_string(word.x, word.y, &word.text)?;
            if word.is_redacted() {
                redacted += 1;
            }
        }
        canvas.finalize()?;

        let report = PageReport {
            page: index + 1,
            words: planned.len(),
            redacted,
            skipped: content.words.len() - planned.len(),
        };
        debug!(
            page = report.page,
            words = report.words,
            redacted = report.redacted,
            "page reconstructed"
        );
        Ok(report)
    }
}
