//! Font-size fitting and centering of replacement text inside a word box.

use crate::{AnonymizedWord, ExtractedWord, FontMetrics};

/// Floor for fitted font sizes; long replacements in narrow boxes stay drawable.
pub const MIN_FONT_SIZE: f32 = 2.0;

#[derive(Debug, Clone)]
pub struct WordPlacer<M> {
    metrics: M,
    min_font_size: f32,
}

impl<M: FontMetrics> WordPlacer<M> {
    pub fn new(metrics: M) -> Self {
        Self {
            metrics,
            min_font_size: MIN_FONT_SIZE,
        }
    }

    pub fn with_min_font_size(mut self, min_font_size: f32) -> Self {
        self.min_font_size = min_font_size;
        self
    }

    pub fn metrics(&self) -> &M {
        &self.metrics
    }

    /// Starts from the word height, shrinks until the text fits the box
    /// width, then centers the result on the box in bottom-up coordinates.
    pub fn place(&self, word: &ExtractedWord, text: String, page_height: f32) -> AnonymizedWord {
        let mut font_size = word.height;
        let measured = self.metrics.measure_width(&text, font_size);
        if measured > 0.0 {
            font_size *= (word.width / measured).min(1.0);
        }
        // NaN from degenerate boxes falls back to the floor as well
        font_size = font_size.max(self.min_font_size);

        let text_width = self.metrics.measure_width(&text, font_size);
        let x = word.x0 + (word.width - text_width) / 2.0;
        let box_bottom = page_height - word.bottom;
        let y = box_bottom + (word.height - font_size) / 2.0;

        AnonymizedWord {
            source: word.clone(),
            text,
            font_size,
            x,
            y,
        }
    }
}
