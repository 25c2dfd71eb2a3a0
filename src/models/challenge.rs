use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reserved key holding the aggregate entry of a [`FeedbackMap`].
pub const OVERALL_KEY: &str = "overall";

/// Challenge prompts keyed `q1`, `q2`, ...
pub type QuestionSet = BTreeMap<String, String>;

/// Submitted answers keyed like the questions they answer.
pub type AnswerSet = BTreeMap<String, String>;

/// Feedback for every question key plus [`OVERALL_KEY`].
pub type FeedbackMap = BTreeMap<String, Feedback>;

/// Key of the `index`-th question (zero based).
pub fn question_key(index: usize) -> String {
    format!("q{}", index + 1)
}

/// Score and explanation for one answer, or for the whole challenge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    /// In `[0.0, 1.0]`.
    pub score: f64,
    pub feedback: String,
}

impl Feedback {
    pub fn new(score: f64, feedback: impl Into<String>) -> Self {
        Self {
            score: score.clamp(0.0, 1.0),
            feedback: feedback.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeResponse {
    pub session_id: Uuid,
    pub questions: QuestionSet,
}

/// Answers for a session's challenge.
///
/// Used both to submit answers and to request evaluation. On evaluation an
/// empty `answers` means "use the answers already submitted".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeAnswersRequest {
    pub session_id: Uuid,
    #[serde(default)]
    pub answers: AnswerSet,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeFeedbackResponse {
    pub session_id: Uuid,
    pub feedback: FeedbackMap,
}
