//! PDF engine wrapper: Pdfium-backed extraction, drawing and assembly.

mod words;

use std::cell::OnceCell;
use std::path::{Path, PathBuf};

use pdf::file::FileOptions;
use pdfanon_core::{
    DocumentSink, ExtractedWord, Helvetica, PageCanvas, PageContent, PageGeometry, PdfBackend,
    RedactError, Result, SourceDocument,
};
use pdfium_render::prelude::{
    PdfDocument, PdfFontToken, PdfPage, PdfPageObjectsCommon, PdfPagePaperSize, PdfPoints,
    PdfRect, Pdfium, PdfiumError,
};
use tracing::{debug, trace};

pub use words::{CharBox, Glyph, WordBuilder};

#[derive(Debug, Default)]
pub struct Engine {
    pdfium: OnceCell<std::result::Result<Pdfium, String>>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check_pdfium(&self) -> Result<()> {
        let _ = self.pdfium()?;
        Ok(())
    }

    fn pdfium(&self) -> Result<&Pdfium> {
        self.pdfium
            .get_or_init(bind_pdfium)
            .as_ref()
            .map_err(|err| RedactError::render("bind pdfium", err))
    }
}

impl PdfBackend for Engine {
    type Source<'b>
        = PdfiumSource<'b>
    where
        Self: 'b;
    type Sink<'b>
        = PdfiumSink<'b>
    where
        Self: 'b;

    fn open(&self, bytes: Vec<u8>) -> Result<PdfiumSource<'_>> {
        let pdfium = self.pdfium()?;
        let document = pdfium
            .load_pdf_from_byte_vec(bytes, None)
            .map_err(|err| RedactError::extraction("open document", err))?;
        debug!(pages = document.pages().len(), "opened source document");
        Ok(PdfiumSource { document })
    }

    fn create(&self) -> Result<PdfiumSink<'_>> {
        let pdfium = self.pdfium()?;
        let mut document = pdfium
            .create_new_pdf()
            .map_err(|err| RedactError::render("create output document", err))?;
        let font = document.fonts_mut().helvetica();
        Ok(PdfiumSink {
            document,
            font,
            pages: 0,
        })
    }

    fn count_pages(&self, bytes: &[u8]) -> Result<usize> {
        count_pages(bytes)
    }
}

/// Page count read with the pure-Rust parser, independent of Pdfium.
pub fn count_pages(bytes: &[u8]) -> Result<usize> {
    let file = FileOptions::cached()
        .load(bytes.to_vec())
        .map_err(|err| RedactError::extraction("parse document", err))?;
    Ok(file.num_pages() as usize)
}

pub struct PdfiumSource<'a> {
    document: PdfDocument<'a>,
}

impl SourceDocument for PdfiumSource<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn read_page(&self, index: usize) -> Result<PageContent> {
        let context = || format!("page {}", index + 1);
        let page_index =
            u16::try_from(index).map_err(|_| RedactError::extraction(context(), "page index out of range"))?;
        let page = self
            .document
            .pages()
            .get(page_index)
            .map_err(|err| RedactError::extraction(context(), err))?;

        let geometry = PageGeometry::new(page.width().value, page.height().value);
        let words = extract_words(&page, geometry.height)
            .map_err(|err| RedactError::extraction(context(), err))?;
        Ok(PageContent { geometry, words })
    }
}

fn extract_words(
    page: &PdfPage<'_>,
    page_height: f32,
) -> std::result::Result<Vec<ExtractedWord>, PdfiumError> {
    let text = page.text()?;
    let mut builder = WordBuilder::new(page_height);
    for ch in text.chars().iter() {
        let Some(glyph) = ch.unicode_char() else {
            builder.break_word();
            continue;
        };
        if glyph.is_whitespace() || glyph.is_control() {
            builder.break_word();
            continue;
        }
        let ink = char_box(&ch.tight_bounds()?);
        let cell = ch.loose_bounds().map(|b| char_box(&b)).unwrap_or(ink);
        builder.push(glyph, Glyph { ink, cell });
    }
    Ok(builder.finish())
}

fn char_box(rect: &PdfRect) -> CharBox {
    CharBox {
        left: rect.left().value,
        bottom: rect.bottom().value,
        right: rect.right().value,
        top: rect.top().value,
    }
}

pub struct PdfiumSink<'a> {
    document: PdfDocument<'a>,
    font: PdfFontToken,
    pages: usize,
}

impl<'a> DocumentSink for PdfiumSink<'a> {
    type Canvas<'s>
        = PdfiumCanvas<'a>
    where
        Self: 's;

    fn begin_page(&mut self, geometry: PageGeometry) -> Result<PdfiumCanvas<'a>> {
        let index = self.pages;
        let size = PdfPagePaperSize::Custom(
            PdfPoints::new(geometry.width),
            PdfPoints::new(geometry.height),
        );
        let page = self
            .document
            .pages_mut()
            .create_page_at_end(size)
            .map_err(|err| RedactError::render(format!("output page {}", index + 1), err))?;
        self.pages += 1;
        Ok(PdfiumCanvas {
            page,
            font: self.font,
            font_size: None,
            index,
        })
    }

    fn page_count(&self) -> usize {
        self.pages
    }

    fn into_bytes(self) -> Result<Vec<u8>> {
        self.document
            .save_to_bytes()
            .map_err(|err| RedactError::render("serialize output document", err))
    }
}

pub struct PdfiumCanvas<'a> {
    page: PdfPage<'a>,
    font: PdfFontToken,
    font_size: Option<f32>,
    index: usize,
}

impl PdfiumCanvas<'_> {
    fn context(&self) -> String {
        format!("output page {}", self.index + 1)
    }
}

impl PageCanvas for PdfiumCanvas<'_> {
    fn set_font(&mut self, name: &str, size: f32) -> Result<()> {
        if name != Helvetica::NAME {
            return Err(RedactError::render(
                self.context(),
                format!("unsupported font {name:?}"),
            ));
        }
        self.font_size = Some(size);
        Ok(())
    }

    fn draw_string(&mut self, x: f32, y: f32, text: &str) -> Result<()> {
        let size = self
            .font_size
            .ok_or_else(|| RedactError::render(self.context(), "no font selected"))?;
        trace!(x, y, size, text, "draw string");
        let context = format!("{}, word {text:?}", self.context());
        let font = self.font;
        self.page
            .objects_mut()
            .create_text_object(
                PdfPoints::new(x),
                PdfPoints::new(y),
                text,
                font,
                PdfPoints::new(size),
            )
            .map_err(|err| RedactError::render(context, err))?;
        Ok(())
    }

    fn finalize(mut self) -> Result<()> {
        let context = self.context();
        self.page
            .regenerate_content()
            .map_err(|err| RedactError::render(context, err))
    }
}

const LIB_PATH_ENV: &str = "PDFANON_PDFIUM_LIB_PATH";
const LIB_DIR_ENV: &str = "PDFANON_PDFIUM_DIR";

/// Library files tried before the system library, most specific first.
fn library_candidates() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();
    if let Some(dir) = std::env::var_os(LIB_DIR_ENV) {
        dirs.push(PathBuf::from(dir));
    }
    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        dirs.push(dir);
    }
    dirs.push(PathBuf::from(".pdfium"));
    dirs.push(PathBuf::from("."));

    dirs.iter()
        .map(|dir| Pdfium::pdfium_platform_library_name_at_path(dir.as_path()))
        .collect()
}

fn bind_at(path: &Path) -> std::result::Result<Pdfium, String> {
    Pdfium::bind_to_library(path)
        .map(Pdfium::new)
        .map_err(|err| format!("{err} (loading {})", path.display()))
}

/// An explicit library path must load; otherwise the first candidate that
/// loads wins, then the system library.
fn bind_pdfium() -> std::result::Result<Pdfium, String> {
    if let Some(path) = std::env::var_os(LIB_PATH_ENV) {
        return bind_at(Path::new(&path)).map_err(|err| format!("{err}, set by {LIB_PATH_ENV}"));
    }

    let candidates = library_candidates();
    if let Some(pdfium) = candidates.iter().find_map(|path| bind_at(path).ok()) {
        return Ok(pdfium);
    }

    Pdfium::bind_to_system_library()
        .map(Pdfium::new)
        .map_err(|err| {
            format!(
                "{err}; install Pdfium system-wide, place {} next to the executable, or set {LIB_PATH_ENV}",
                Pdfium::pdfium_platform_library_name().to_string_lossy()
            )
        })
}
