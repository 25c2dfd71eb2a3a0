use crate::models::Answer;
use crate::ranker;

/// Reply when no sentence of the document shares a word with the question.
pub const NOT_FOUND: &str = "Sorry, I couldn't find an answer in the document.";

/// Number of sentences handed to the model as context.
pub const CONTEXT_SENTENCES: usize = 3;

/// Answer with the single best-matching sentence of the whole document.
pub fn local_answer(question: &str, text: &str) -> Answer {
    let answer = ranker::best_match(question, text)
        .map(|(sentence, _)| sentence)
        .unwrap_or(NOT_FOUND);
    Answer {
        answer: answer.to_string(),
        reference_snippet: answer.to_string(),
    }
}

pub fn answer_prompt(context: &str, question: &str) -> String {
    format!(
        "You are a research document assistant. Answer the question strictly using \
         the provided context. If the answer is not present in the context, say so.\n\n\
         Context:\n{context}\n\nQuestion: {question}\nAnswer:"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "Bees live in hives. Honey is made from nectar. Winter is quiet.";

    #[test]
    fn answers_with_best_sentence() {
        let answer = local_answer("What is honey made from?", DOC);
        assert_eq!(answer.answer, "Honey is made from nectar.");
        assert_eq!(answer.reference_snippet, answer.answer);
    }

    #[test]
    fn unrelated_question_is_not_found() {
        let answer = local_answer("Quantum chromodynamics?", DOC);
        assert_eq!(answer.answer, NOT_FOUND);
    }
}
