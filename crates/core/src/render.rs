//! Seams to the PDF collaborators: word extraction, page drawing and
//! document assembly.

use serde::{Deserialize, Serialize};

use crate::{ExtractedWord, PageGeometry, Result};

/// Everything the reconstruction needs from one source page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageContent {
    pub geometry: PageGeometry,
    pub words: Vec<ExtractedWord>,
}

pub trait SourceDocument {
    fn page_count(&self) -> usize;

    /// Page geometry plus the page's words in extraction order.
    fn read_page(&self, index: usize) -> Result<PageContent>;
}

/// Drawing context for one output page. Dropping it without `finalize`
/// discards the drawing.
pub trait PageCanvas {
    fn set_font(&mut self, name: &str, size: f32) -> Result<()>;

    /// `(x, y)` is the text origin in bottom-up page coordinates.
    fn draw_string(&mut self, x: f32, y: f32, text: &str) -> Result<()>;

    fn finalize(self) -> Result<()>;
}

/// Output document under construction; pages are appended in call order.
pub trait DocumentSink {
    type Canvas<'s>: PageCanvas
    where
        Self: 's;

    fn begin_page(&mut self, geometry: PageGeometry) -> Result<Self::Canvas<'_>>;

    fn page_count(&self) -> usize;

    fn into_bytes(self) -> Result<Vec<u8>>;
}

pub trait PdfBackend {
    type Source<'b>: SourceDocument
    where
        Self: 'b;
    type Sink<'b>: DocumentSink
    where
        Self: 'b;

    fn open(&self, bytes: Vec<u8>) -> Result<Self::Source<'_>>;

    fn create(&self) -> Result<Self::Sink<'_>>;

    /// Page count from serialized document bytes.
    fn count_pages(&self, bytes: &[u8]) -> Result<usize>;
}
