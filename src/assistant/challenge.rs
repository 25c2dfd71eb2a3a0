use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::{question_key, QuestionSet};
use crate::ranker;

/// Filler used whenever fewer than the requested number of questions exist.
pub const GENERIC_QUESTION: &str =
    "Explain a key point from the document and justify your reasoning.";

/// Parsed model lines shorter than this are not questions.
const MIN_QUESTION_CHARS: usize = 15;

/// Sentences need more words than this to anchor a local question.
const MIN_SENTENCE_WORDS: usize = 6;

const EXCERPT_CHARS: usize = 60;

/// Build `count` questions from randomly chosen, distinct document sentences.
pub fn local_questions<R: Rng + ?Sized>(text: &str, count: usize, rng: &mut R) -> QuestionSet {
    let mut candidates: Vec<&str> = Vec::new();
    for sentence in ranker::split_sentences(text) {
        let sentence = sentence.trim();
        if sentence.split_whitespace().count() > MIN_SENTENCE_WORDS
            && !candidates.contains(&sentence)
        {
            candidates.push(sentence);
        }
    }

    let questions = candidates.choose_multiple(rng, count).map(|sentence| {
        let excerpt: String = sentence.chars().take(EXCERPT_CHARS).collect();
        format!("Based on the document, what is the implication of: '{excerpt}...'? Justify.")
    });
    numbered(questions, count)
}

pub fn questions_prompt(text: &str, count: usize) -> String {
    format!(
        "Generate exactly {count} logic-based reasoning questions that test a reader's \
         understanding of the following document. Ask for inference, not recall, and make \
         each question require the reader to justify their answer. Write one question per \
         line with no other text.\n\nDocument:\n{text}\n\nQuestions:"
    )
}

/// Turn a model reply into exactly `count` questions.
pub fn parse_questions(reply: &str, count: usize) -> QuestionSet {
    let questions = reply
        .lines()
        .map(strip_list_marker)
        .filter(|line| line.chars().count() >= MIN_QUESTION_CHARS)
        .map(str::to_string);
    numbered(questions, count)
}

/// Key the first `count` questions `q1..`, padding with [`GENERIC_QUESTION`].
fn numbered(questions: impl Iterator<Item = String>, count: usize) -> QuestionSet {
    questions
        .chain(std::iter::repeat_with(|| GENERIC_QUESTION.to_string()))
        .take(count)
        .enumerate()
        .map(|(i, q)| (question_key(i), q))
        .collect()
}

/// Remove bullets and numbering such as `-`, `*`, `1.`, `2)` or `Q3:`.
fn strip_list_marker(line: &str) -> &str {
    let line = line
        .trim()
        .trim_start_matches(|c: char| matches!(c, '-' | '*' | '•' | '#'))
        .trim_end_matches('*')
        .trim();

    let numbered = line
        .strip_prefix(|c: char| c == 'Q' || c == 'q')
        .filter(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
        .unwrap_or(line);
    let digits = numbered
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(numbered.len());
    if digits == 0 {
        return line;
    }

    match numbered[digits..].strip_prefix(|c: char| matches!(c, '.' | ')' | ':')) {
        Some(rest) => rest.trim_start_matches('*').trim(),
        None => line,
    }
}
