use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use pdfanon_core::{
    DocumentSink, FontMetrics, Helvetica, PdfBackend, RedactError, RedactionConfig, Result,
    SourceDocument,
};
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::{PageReconstructor, PageReport};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub pages: usize,
    pub words: usize,
    pub redacted: usize,
    pub per_page: Vec<PageReport>,
}

impl RunSummary {
    fn push(&mut self, report: PageReport) {
        self.pages += 1;
        self.words += report.words;
        self.redacted += report.redacted;
        self.per_page.push(report);
    }
}

/// Whole-document reconstruction held in memory until every page succeeded.
pub struct Pipeline<'a, B, M = Helvetica> {
    backend: &'a B,
    reconstructor: PageReconstructor<M>,
}

impl<'a, B: PdfBackend> Pipeline<'a, B> {
    pub fn new(backend: &'a B, config: &RedactionConfig) -> Result<Self> {
        Self::with_metrics(backend, config, Helvetica)
    }
}

impl<'a, B: PdfBackend, M: FontMetrics> Pipeline<'a, B, M> {
    pub fn with_metrics(backend: &'a B, config: &RedactionConfig, metrics: M) -> Result<Self> {
        Ok(Self {
            backend,
            reconstructor: PageReconstructor::new(config, metrics)?,
        })
    }

    pub fn reconstructor(&self) -> &PageReconstructor<M> {
        &self.reconstructor
    }

    /// Pages are read, redrawn and appended strictly in source order. The
    /// first failing page aborts the run and nothing is returned.
    pub fn run(&self, input: Vec<u8>) -> Result<(Vec<u8>, RunSummary)> {
        let preflight = self.backend.count_pages(&input);
        let source = self.backend.open(input)?;
        let pages = source.page_count();
        match preflight {
            Ok(expected) if expected != pages => {
                return Err(RedactError::extraction(
                    "open document",
                    format!("parser reports {expected} pages, extractor reports {pages}"),
                ));
            }
            Ok(_) => {}
            Err(err) => warn!(%err, pages, "page count preflight failed, using extractor count"),
        }

        let mut sink = self.backend.create()?;
        let mut summary = RunSummary::default();
        for index in 0..pages {
            let content = source.read_page(index)?;
            let report = self.reconstructor.reconstruct(&mut sink, index, &content)?;
            summary.push(report);
        }
        if sink.page_count() != pages {
            return Err(RedactError::render(
                "assemble document",
                format!("assembled {} of {pages} pages", sink.page_count()),
            ));
        }

        let bytes = sink.into_bytes()?;
        let written = self.written_pages(&bytes)?;
        if written != pages {
            return Err(RedactError::render(
                "verify output",
                format!("output has {written} pages, input has {pages}"),
            ));
        }
        debug!(
            pages,
            bytes = bytes.len(),
            redacted = summary.redacted,
            "document assembled"
        );
        Ok((bytes, summary))
    }

    /// Page count of a finished document; reopened through the extractor
    /// when the parser cannot read it.
    fn written_pages(&self, bytes: &[u8]) -> Result<usize> {
        match self.backend.count_pages(bytes) {
            Ok(pages) => Ok(pages),
            Err(err) => {
                warn!(%err, "output page count fallback to extractor");
                Ok(self.backend.open(bytes.to_vec())?.page_count())
            }
        }
    }

    /// Reads `input` to the end and writes the finished document to `output`
    /// only after the whole run succeeded.
    pub fn run_stream<R: Read, W: Write>(&self, mut input: R, mut output: W) -> Result<RunSummary> {
        let mut bytes = Vec::new();
        input
            .read_to_end(&mut bytes)
            .map_err(|err| RedactError::io("read input stream", err))?;
        let (rendered, summary) = self.run(bytes)?;
        output
            .write_all(&rendered)
            .and_then(|()| output.flush())
            .map_err(|err| RedactError::io("write output stream", err))?;
        Ok(summary)
    }
}

/// Redacts `input` into `output`. The output file appears only once the
/// complete document has been rendered and verified.
pub fn anonymize<B: PdfBackend>(
    backend: &B,
    config: &RedactionConfig,
    input: &Path,
    output: &Path,
) -> Result<RunSummary> {
    let pipeline = Pipeline::new(backend, config)?;

    if !input.is_file() {
        return Err(RedactError::InputNotFound(input.to_path_buf()));
    }
    let bytes = fs::read(input)
        .map_err(|err| RedactError::io(format!("read {}", input.display()), err))?;
    info!(input = %input.display(), bytes = bytes.len(), "anonymizing");

    let (rendered, summary) = pipeline.run(bytes)?;
    write_atomically(output, &rendered)?;

    info!(
        output = %output.display(),
        pages = summary.pages,
        redacted = summary.redacted,
        "wrote anonymized document"
    );
    Ok(summary)
}

/// `<dir>/<stem>_anonymized.pdf` next to the input.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    input.with_file_name(format!("{stem}_anonymized.pdf"))
}

fn write_atomically(output: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match output.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)
        .map_err(|err| RedactError::io(format!("create {}", parent.display()), err))?;

    let mut tmp = NamedTempFile::new_in(parent)
        .map_err(|err| RedactError::io(format!("create temp file in {}", parent.display()), err))?;
    tmp.write_all(bytes)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|err| RedactError::io(format!("write {}", tmp.path().display()), err))?;
    tmp.persist(output)
        .map_err(|err| RedactError::io(format!("persist {}", output.display()), err.error))?;
    Ok(())
}
