use thiserror::Error;
use uuid::Uuid;

pub type Result<T, E = AssistantError> = std::result::Result<T, E>;

/// Errors that reach the caller of a session operation.
///
/// Generation failures are deliberately absent: every assistant component
/// turns them into a degraded result before they get this far.
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("Unsupported file type: {0}. Only PDF and TXT files are supported")]
    UnsupportedFileType(String),

    #[error("Text upload is not valid UTF-8")]
    InvalidEncoding,

    #[error("Could not read PDF: {0}")]
    PdfExtraction(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
