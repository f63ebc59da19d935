//! Groups positioned characters into words.

use pdfanon_core::ExtractedWord;

/// A gap between advance cells wider than this fraction of the cell height
/// starts a new word.
const WORD_GAP_RATIO: f32 = 0.2;

/// Character box in bottom-up page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharBox {
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
    pub top: f32,
}

impl CharBox {
    fn height(&self) -> f32 {
        (self.top - self.bottom).max(0.0)
    }

    fn center_y(&self) -> f32 {
        (self.top + self.bottom) / 2.0
    }

    fn union(&self, other: &CharBox) -> CharBox {
        CharBox {
            left: self.left.min(other.left),
            bottom: self.bottom.min(other.bottom),
            right: self.right.max(other.right),
            top: self.top.max(other.top),
        }
    }
}

/// One positioned character. `ink` is the tight outline; `cell` spans the
/// advance width and the font's ascent and descent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    pub ink: CharBox,
    pub cell: CharBox,
}

impl Glyph {
    pub fn uniform(bounds: CharBox) -> Self {
        Self {
            ink: bounds,
            cell: bounds,
        }
    }
}

#[derive(Debug)]
pub struct WordBuilder {
    page_height: f32,
    words: Vec<ExtractedWord>,
    current: Option<PendingWord>,
}

#[derive(Debug)]
struct PendingWord {
    text: String,
    ink: CharBox,
    cell: CharBox,
}

impl PendingWord {
    /// Side bearings differ per glyph, so spacing is judged on advance cells.
    fn starts_new_word(&self, next: &Glyph) -> bool {
        let height = self.cell.height().max(next.cell.height()).max(1.0);
        let gap = next.cell.left - self.cell.right;
        let line_shift = (next.cell.center_y() - self.cell.center_y()).abs();
        line_shift > height / 2.0 || gap > height * WORD_GAP_RATIO || gap < -height
    }

    fn extend(&mut self, ch: char, next: Glyph) {
        self.text.push(ch);
        self.ink = self.ink.union(&next.ink);
        self.cell = self.cell.union(&next.cell);
    }

    fn into_word(self, page_height: f32) -> ExtractedWord {
        let b = self.ink;
        ExtractedWord::new(
            self.text,
            b.left,
            page_height - b.bottom,
            b.right - b.left,
            b.top - b.bottom,
        )
    }
}

impl WordBuilder {
    pub fn new(page_height: f32) -> Self {
        Self {
            page_height,
            words: Vec::new(),
            current: None,
        }
    }

    pub fn push(&mut self, ch: char, glyph: Glyph) {
        if ch.is_whitespace() || ch.is_control() {
            self.break_word();
            return;
        }

        if self
            .current
            .as_ref()
            .is_some_and(|pending| pending.starts_new_word(&glyph))
        {
            self.break_word();
        }

        match &mut self.current {
            Some(pending) => pending.extend(ch, glyph),
            None => {
                self.current = Some(PendingWord {
                    text: ch.to_string(),
                    ink: glyph.ink,
                    cell: glyph.cell,
                })
            }
        }
    }

    pub fn break_word(&mut self) {
        if let Some(pending) = self.current.take() {
            self.words.push(pending.into_word(self.page_height));
        }
    }

    pub fn finish(mut self) -> Vec<ExtractedWord> {
        self.break_word();
        self.words
    }
}
