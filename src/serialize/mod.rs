//! Document serializers.
//!
//! A serializer walks an already-built [`Document`] and produces the bytes of
//! one artifact. All format and styling concerns live behind this seam.
use crate::render::Document;
use thiserror::Error;

mod docx;
mod text;

pub use docx::DocxRenderer;
pub use text::TextRenderer;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("package document: {0}")]
    Package(#[from] zip::result::ZipError),
    #[error("write document: {0}")]
    Io(#[from] std::io::Error),
}

/// Turns a document into a binary artifact.
pub trait DocumentRenderer: Send + Sync {
    /// File extension for produced artifacts, without the dot.
    fn extension(&self) -> &'static str;

    fn render(&self, document: &Document) -> Result<Vec<u8>, RenderError>;
}

/// Output formats selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderFormat {
    Docx,
    Text,
}

impl RenderFormat {
    pub fn renderer(self) -> Box<dyn DocumentRenderer> {
        match self {
            RenderFormat::Docx => Box::new(DocxRenderer),
            RenderFormat::Text => Box::new(TextRenderer),
        }
    }
}
