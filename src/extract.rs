//! Text extraction from uploaded files.

use std::panic::{self, UnwindSafe};

use crate::error::{AssistantError, Result};

/// The kinds of upload the assistant understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Text,
    Pdf,
}

impl FileKind {
    /// Determine the kind from a filename's extension (case-insensitive).
    ///
    /// Only the suffix matters, so a bare `.txt` counts as text.
    pub fn from_filename(filename: &str) -> Result<Self> {
        let lower = filename.to_ascii_lowercase();
        if lower.ends_with(".txt") {
            Ok(Self::Text)
        } else if lower.ends_with(".pdf") {
            Ok(Self::Pdf)
        } else {
            Err(AssistantError::UnsupportedFileType(filename.to_string()))
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Pdf => "pdf",
        }
    }
}

/// Decode an upload into a single text string.
///
/// PDF pages are concatenated in page order. Pages without extractable text
/// (scanned images, for instance) simply contribute nothing.
pub fn extract_text(bytes: &[u8], kind: FileKind) -> Result<String> {
    match kind {
        FileKind::Text => {
            String::from_utf8(bytes.to_vec()).map_err(|_| AssistantError::InvalidEncoding)
        }
        FileKind::Pdf => contain_panics(|| {
            pdf_extract::extract_text_from_mem(bytes)
                .map_err(|e| AssistantError::PdfExtraction(e.to_string()))
        }),
    }
}

/// The PDF parser panics on some malformed input; treat that as a bad file.
fn contain_panics(extract: impl FnOnce() -> Result<String> + UnwindSafe) -> Result<String> {
    panic::catch_unwind(extract).unwrap_or_else(|_| {
        tracing::warn!("PDF parser panicked");
        Err(AssistantError::PdfExtraction(
            "the file could not be parsed".to_string(),
        ))
    })
}
