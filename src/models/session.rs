use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::challenge::{AnswerSet, FeedbackMap, QuestionSet};

/// Server-side record tying one uploaded document to its derived artifacts.
///
/// `text` is fixed at creation. Everything after `summary` starts empty and is
/// filled in by later calls through [`SessionPatch`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    /// Original name of the uploaded file.
    pub filename: String,
    /// Where the uploaded bytes were written.
    pub file_path: PathBuf,
    pub text: String,
    pub summary: String,
    #[serde(rename = "challenges_dict", default)]
    pub challenges: QuestionSet,
    #[serde(rename = "challenge_answers", default)]
    pub answers: AnswerSet,
    #[serde(default)]
    pub feedback: FeedbackMap,
    pub created_at: DateTime<Utc>,
}

/// Fields of a new session, before the store assigns its identifier.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub filename: String,
    pub file_path: PathBuf,
    pub text: String,
    pub summary: String,
}

/// A shallow update merged into an existing session.
///
/// `None` leaves the field untouched; `Some` replaces it wholesale. The
/// document text has no slot here because it never changes.
#[derive(Debug, Clone, Default)]
pub struct SessionPatch {
    pub summary: Option<String>,
    pub challenges: Option<QuestionSet>,
    pub answers: Option<AnswerSet>,
    pub feedback: Option<FeedbackMap>,
}

impl SessionPatch {
    pub fn challenges(questions: QuestionSet) -> Self {
        Self {
            challenges: Some(questions),
            ..Default::default()
        }
    }

    pub fn answers(answers: AnswerSet) -> Self {
        Self {
            answers: Some(answers),
            ..Default::default()
        }
    }

    pub fn feedback(feedback: FeedbackMap) -> Self {
        Self {
            feedback: Some(feedback),
            ..Default::default()
        }
    }
}

/// Response after a successful upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub session_id: Uuid,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub session_id: Uuid,
    pub summary: String,
}

/// The extracted text of a session's document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentResponse {
    pub session_id: Uuid,
    pub filename: String,
    pub text: String,
}
