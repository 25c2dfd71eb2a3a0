use std::sync::OnceLock;

use regex::Regex;

/// Tokens for the local summary: words, and common punctuation on its own.
fn token_pattern() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| Regex::new(r"\w+|[.,!?;]").expect("valid token pattern"))
}

/// Local stand-in for a summary: the first `max_words` tokens of `text`,
/// joined by single spaces.
///
/// This is a crude truncation, not a semantic summary. It is deterministic,
/// and never exceeds `max_words` words because punctuation tokens count
/// towards the cap.
pub fn local_summary(text: &str, max_words: usize) -> String {
    token_pattern()
        .find_iter(text)
        .take(max_words)
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn summary_prompt(text: &str, max_words: usize) -> String {
    format!(
        "Summarize the following document in no more than {max_words} words.\n\n\
         Document:\n{text}\n\nSummary:"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_punctuation_into_separate_tokens() {
        assert_eq!(
            local_summary("Hello, world! This is a test.", 150),
            "Hello , world ! This is a test ."
        );
    }

    #[test]
    fn caps_token_count() {
        let text = "one two three four five six";
        assert_eq!(local_summary(text, 4), "one two three four");
        assert_eq!(local_summary(text, 0), "");
    }

    #[test]
    fn is_deterministic() {
        let text = "The same input. Always the same output!";
        assert_eq!(local_summary(text, 5), local_summary(text, 5));
    }

    #[test]
    fn prompt_carries_word_cap() {
        assert!(summary_prompt("body", 42).contains("no more than 42 words"));
    }
}
