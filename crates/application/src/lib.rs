//! Application orchestration layer for pdfanon: page reconstruction, the
//! document pipeline and the file-level entry point.

mod pipeline;
mod reconstruct;

pub use pipeline::{Pipeline, RunSummary, anonymize, default_output_path};
pub use reconstruct::{PageReconstructor, PageReport};
