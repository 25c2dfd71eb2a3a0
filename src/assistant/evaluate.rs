//! Challenge evaluation and single-answer grading.
//!
//! Every function producing a [`FeedbackMap`] returns an entry for each
//! question key it was given plus [`OVERALL_KEY`], whichever path produced it.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use super::truncate_chars;
use crate::llm::GenerationError;
use crate::models::{AnswerGrade, AnswerSet, Feedback, FeedbackMap, QuestionSet, OVERALL_KEY};
use crate::ranker;

/// Score given when the evaluator replied but not in a usable shape.
pub const UNPARSABLE_SCORE: f64 = 0.5;

/// Score given when the evaluator could not be reached.
pub const FAILED_SCORE: f64 = 0.0;

/// How much of an unusable reply is echoed back in feedback.
const RAW_EXCERPT_CHARS: usize = 300;

// ============================================================
// Challenge evaluation
// ============================================================

/// Feedback without a model: echoes each answer back, no real scoring.
pub fn local_feedback(questions: &QuestionSet, answers: &AnswerSet) -> FeedbackMap {
    let mut feedback: FeedbackMap = questions
        .keys()
        .map(|key| {
            let answer = answer_for(answers, key);
            let entry = if answer.trim().is_empty() {
                Feedback::new(0.0, "No answer submitted. Answer this question to get feedback.")
            } else {
                Feedback::new(
                    0.0,
                    format!("Your answer: '{answer}'. No model feedback available (API key missing)."),
                )
            };
            (key.clone(), entry)
        })
        .collect();
    feedback.insert(
        OVERALL_KEY.to_string(),
        Feedback::new(0.0, "Model feedback not available."),
    );
    feedback
}

pub fn evaluation_prompt(text: &str, questions: &QuestionSet, answers: &AnswerSet) -> String {
    let pairs = questions
        .iter()
        .map(|(key, question)| {
            format!(
                "{key} question: {question}\n{key} answer: {}",
                answer_for(answers, key)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    let schema = questions
        .keys()
        .map(String::as_str)
        .chain([OVERALL_KEY])
        .map(|key| format!("\"{key}\": {{\"score\": <0..1>, \"feedback\": \"...\"}}"))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "You are an expert evaluator. Evaluate the following question-answer pairs based \
         strictly on the provided document. For each pair give a score between 0 and 1 \
         (1 is a fully correct, well-justified answer) and specific feedback. Then give an \
         overall score and overall feedback.\n\
         Respond with a single JSON object and nothing else, exactly of the form:\n\
         {{{schema}}}\n\nDocument:\n{text}\n\n{pairs}\n\nEvaluation:"
    )
}

/// One entry of the evaluator's JSON reply.
///
/// Bare strings are accepted too; they carry no score of their own.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ReplyEntry {
    Scored {
        score: f64,
        #[serde(default, alias = "justification", alias = "comment")]
        feedback: String,
    },
    Text(String),
}

impl ReplyEntry {
    fn into_feedback(self) -> Feedback {
        match self {
            Self::Scored { score, feedback } => Feedback::new(score, feedback),
            Self::Text(feedback) => Feedback::new(UNPARSABLE_SCORE, feedback),
        }
    }
}

/// Complete a decoded reply against the questions that were asked.
///
/// Keys are matched case-insensitively and keys nobody asked about are
/// ignored. A question the model skipped, or answered in a shape that is not
/// an entry, scores zero; a missing aggregate becomes the mean of the
/// question scores.
pub fn feedback_from_reply(questions: &QuestionSet, reply: Map<String, Value>) -> FeedbackMap {
    let mut reply: HashMap<String, ReplyEntry> = reply
        .into_iter()
        .filter_map(|(key, value)| {
            let key = key.to_lowercase();
            if key != OVERALL_KEY && !questions.contains_key(&key) {
                return None;
            }
            match serde_json::from_value(value) {
                Ok(entry) => Some((key, entry)),
                Err(e) => {
                    tracing::debug!("Ignoring malformed evaluator entry {}: {}", key, e);
                    None
                }
            }
        })
        .collect();

    let mut feedback: FeedbackMap = questions
        .keys()
        .map(|key| {
            let entry = reply.remove(key).map(ReplyEntry::into_feedback).unwrap_or_else(|| {
                Feedback::new(0.0, "The evaluator returned no feedback for this question.")
            });
            (key.clone(), entry)
        })
        .collect();

    let overall = reply
        .remove(OVERALL_KEY)
        .map(ReplyEntry::into_feedback)
        .unwrap_or_else(|| {
            let mean = if feedback.is_empty() {
                0.0
            } else {
                feedback.values().map(|f| f.score).sum::<f64>() / feedback.len() as f64
            };
            Feedback::new(mean, "The evaluator returned no overall feedback.")
        });
    feedback.insert(OVERALL_KEY.to_string(), overall);
    feedback
}

/// Feedback when the evaluator's reply could not be decoded.
pub fn unparsable_feedback(questions: &QuestionSet, raw: &str) -> FeedbackMap {
    let message = format!(
        "Could not read the evaluator's reply. Reply as received: {}",
        truncate_chars(raw.trim(), RAW_EXCERPT_CHARS)
    );
    questions
        .keys()
        .map(String::as_str)
        .chain([OVERALL_KEY])
        .map(|key| (key.to_string(), Feedback::new(UNPARSABLE_SCORE, message.clone())))
        .collect()
}

/// Feedback when the evaluator call itself failed.
pub fn failed_feedback(
    questions: &QuestionSet,
    answers: &AnswerSet,
    error: &GenerationError,
) -> FeedbackMap {
    let mut feedback: FeedbackMap = questions
        .keys()
        .map(|key| {
            let entry = Feedback::new(
                FAILED_SCORE,
                format!(
                    "Evaluation failed. Your answer: '{}'",
                    truncate_chars(answer_for(answers, key), RAW_EXCERPT_CHARS)
                ),
            );
            (key.clone(), entry)
        })
        .collect();
    feedback.insert(
        OVERALL_KEY.to_string(),
        Feedback::new(FAILED_SCORE, format!("Evaluation failed: {error}")),
    );
    feedback
}

fn answer_for<'a>(answers: &'a AnswerSet, key: &str) -> &'a str {
    answers.get(key).map(String::as_str).unwrap_or("")
}

// ============================================================
// Single-answer grading
// ============================================================

/// Grade by how much of the answer's vocabulary one document sentence covers.
pub fn local_grade(user_answer: &str, text: &str) -> AnswerGrade {
    let answer_words = ranker::word_set(user_answer).len().max(1);
    match ranker::best_match(user_answer, text) {
        Some((sentence, overlap)) => AnswerGrade {
            score: (overlap as f64 / answer_words as f64).min(1.0),
            justification: format!("Your answer overlaps with: '{sentence}'"),
            reference_snippet: sentence.to_string(),
        },
        None => AnswerGrade {
            score: 0.0,
            justification: "No clear match found in document.".to_string(),
            reference_snippet: String::new(),
        },
    }
}

pub fn grade_prompt(question: &str, user_answer: &str, text: &str) -> String {
    format!(
        "Evaluate the following user's answer to the given question, strictly using the \
         provided document.\n\nDocument:\n{text}\n\nQuestion: {question}\n\
         User Answer: {user_answer}\n\nGive a score between 0 and 1 (where 1 is perfect), a \
         short justification, and a reference snippet from the document.\n\
         Respond in JSON with keys: score, justification, reference_snippet."
    )
}

#[derive(Debug, Deserialize)]
pub struct GradeReply {
    #[serde(default)]
    score: f64,
    #[serde(default)]
    justification: String,
    #[serde(default)]
    reference_snippet: String,
}

impl From<GradeReply> for AnswerGrade {
    fn from(reply: GradeReply) -> Self {
        Self {
            score: reply.score.clamp(0.0, 1.0),
            justification: reply.justification,
            reference_snippet: reply.reference_snippet,
        }
    }
}

/// Grade when the model's reply could not be decoded: the reply itself is
/// the only justification there is.
pub fn unparsable_grade(raw: &str) -> AnswerGrade {
    AnswerGrade {
        score: 0.0,
        justification: raw.trim().to_string(),
        reference_snippet: String::new(),
    }
}
