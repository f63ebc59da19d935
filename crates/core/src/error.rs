use std::fmt::Display;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = RedactError> = std::result::Result<T, E>;

/// Every failure aborts the whole document run.
#[derive(Debug, Error)]
pub enum RedactError {
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("input not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("extraction failed ({context}): {message}")]
    Extraction { context: String, message: String },

    #[error("render failed ({context}): {message}")]
    Render { context: String, message: String },

    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl RedactError {
    pub fn extraction(context: impl Into<String>, err: impl Display) -> Self {
        Self::Extraction {
            context: context.into(),
            message: err.to_string(),
        }
    }

    pub fn render(context: impl Into<String>, err: impl Display) -> Self {
        Self::Render {
            context: context.into(),
            message: err.to_string(),
        }
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}
