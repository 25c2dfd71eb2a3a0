//! Document interaction strategies.
//!
//! [`Assistant`] is the one interface the rest of the crate uses to summarize,
//! answer, and run challenges. There are two implementations:
//!
//! - [`ModelAssistant`] sends prompts to a [`TextGenerator`] and falls back to
//!   local results when a call fails.
//! - [`HeuristicAssistant`] never leaves the process: truncation, lexical
//!   ranking and echo-back feedback.
//!
//! [`from_config`] picks one at startup. Every operation is infallible from
//! the caller's point of view.

mod answer;
mod challenge;
mod evaluate;
mod summarize;

use std::sync::Arc;

use async_trait::async_trait;

pub use answer::{CONTEXT_SENTENCES, NOT_FOUND};
pub use challenge::GENERIC_QUESTION;
pub use evaluate::{FAILED_SCORE, UNPARSABLE_SCORE};
pub use summarize::local_summary;

use crate::config::AppConfig;
use crate::llm::{parse_json_reply, GeminiClient, ParsedReply, TextGenerator};
use crate::models::{Answer, AnswerGrade, AnswerSet, FeedbackMap, QuestionSet};
use crate::ranker;

#[async_trait]
pub trait Assistant: Send + Sync {
    /// Short label for logs.
    fn name(&self) -> &'static str;

    /// A synopsis of `text` of at most roughly `max_words` words.
    async fn summarize(&self, text: &str, max_words: usize) -> String;

    /// Answer a free-form question from the document.
    async fn answer(&self, question: &str, text: &str) -> Answer;

    /// Exactly `count` reasoning questions keyed `q1..`.
    async fn challenge(&self, text: &str, count: usize) -> QuestionSet;

    /// Feedback for every key of `questions`, plus the overall entry.
    async fn evaluate(&self, text: &str, questions: &QuestionSet, answers: &AnswerSet)
        -> FeedbackMap;

    /// Score one answer to one question.
    async fn grade(&self, question: &str, user_answer: &str, text: &str) -> AnswerGrade;
}

/// Select the strategy for this process.
pub fn from_config(config: &AppConfig) -> Arc<dyn Assistant> {
    match &config.generation {
        Some(generation) => {
            let client = GeminiClient::new(generation);
            tracing::info!("Using model-backed assistant ({})", client.model());
            Arc::new(ModelAssistant::new(Arc::new(client)))
        }
        None => {
            tracing::info!("GEMINI_API_KEY not set, using heuristic assistant");
            Arc::new(HeuristicAssistant)
        }
    }
}

/// Cut `text` to `max` characters, marking the cut with `...`.
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

// ============================================================
// Heuristic
// ============================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicAssistant;

#[async_trait]
impl Assistant for HeuristicAssistant {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    async fn summarize(&self, text: &str, max_words: usize) -> String {
        summarize::local_summary(text, max_words)
    }

    async fn answer(&self, question: &str, text: &str) -> Answer {
        answer::local_answer(question, text)
    }

    async fn challenge(&self, text: &str, count: usize) -> QuestionSet {
        challenge::local_questions(text, count, &mut rand::thread_rng())
    }

    async fn evaluate(
        &self,
        _text: &str,
        questions: &QuestionSet,
        answers: &AnswerSet,
    ) -> FeedbackMap {
        evaluate::local_feedback(questions, answers)
    }

    async fn grade(&self, _question: &str, user_answer: &str, text: &str) -> AnswerGrade {
        evaluate::local_grade(user_answer, text)
    }
}

// ============================================================
// Model-backed
// ============================================================

pub struct ModelAssistant {
    generator: Arc<dyn TextGenerator>,
}

impl ModelAssistant {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl Assistant for ModelAssistant {
    fn name(&self) -> &'static str {
        "model"
    }

    async fn summarize(&self, text: &str, max_words: usize) -> String {
        let prompt = summarize::summary_prompt(text, max_words);
        match self.generator.generate(&prompt).await {
            Ok(summary) => summary.trim().to_string(),
            Err(e) => {
                tracing::warn!("Summary generation failed, truncating instead: {}", e);
                summarize::local_summary(text, max_words)
            }
        }
    }

    async fn answer(&self, question: &str, text: &str) -> Answer {
        let context = ranker::top_k(question, text, CONTEXT_SENTENCES);
        let prompt = answer::answer_prompt(&context, question);
        match self.generator.generate(&prompt).await {
            Ok(reply) => Answer {
                answer: reply.trim().to_string(),
                reference_snippet: context,
            },
            Err(e) => {
                tracing::warn!("Answer generation failed, using best sentence: {}", e);
                answer::local_answer(question, text)
            }
        }
    }

    async fn challenge(&self, text: &str, count: usize) -> QuestionSet {
        let prompt = challenge::questions_prompt(text, count);
        match self.generator.generate(&prompt).await {
            Ok(reply) => challenge::parse_questions(&reply, count),
            Err(e) => {
                tracing::warn!("Question generation failed, sampling sentences: {}", e);
                challenge::local_questions(text, count, &mut rand::thread_rng())
            }
        }
    }

    async fn evaluate(
        &self,
        text: &str,
        questions: &QuestionSet,
        answers: &AnswerSet,
    ) -> FeedbackMap {
        let prompt = evaluate::evaluation_prompt(text, questions, answers);
        let reply = match self.generator.generate(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!("Evaluation call failed: {}", e);
                return evaluate::failed_feedback(questions, answers, &e);
            }
        };

        match parse_json_reply::<serde_json::Map<String, serde_json::Value>>(&reply) {
            ParsedReply::Parsed(entries) => evaluate::feedback_from_reply(questions, entries),
            ParsedReply::Unparsable(raw) => {
                tracing::warn!("Evaluator reply was not valid JSON ({} chars)", raw.len());
                evaluate::unparsable_feedback(questions, &raw)
            }
        }
    }

    async fn grade(&self, question: &str, user_answer: &str, text: &str) -> AnswerGrade {
        let prompt = evaluate::grade_prompt(question, user_answer, text);
        match self.generator.generate(&prompt).await {
            Ok(reply) => match parse_json_reply::<evaluate::GradeReply>(&reply) {
                ParsedReply::Parsed(grade) => grade.into(),
                ParsedReply::Unparsable(raw) => evaluate::unparsable_grade(&raw),
            },
            Err(e) => {
                tracing::warn!("Grading call failed, using overlap score: {}", e);
                evaluate::local_grade(user_answer, text)
            }
        }
    }
}
