use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A free-form question about a session's document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    pub session_id: Uuid,
    pub question: String,
}

/// An answer plus the document text it is grounded on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
    /// The excerpt presented as evidence for `answer`.
    pub reference_snippet: String,
}

/// Grade a single answer to an arbitrary question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeRequest {
    pub session_id: Uuid,
    pub question: String,
    pub user_answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerGrade {
    /// In `[0.0, 1.0]`.
    pub score: f64,
    pub justification: String,
    pub reference_snippet: String,
}
