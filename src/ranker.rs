//! Lexical relevance ranking of document sentences.
//!
//! A sentence ends at `.`, `!` or `?` followed by whitespace. A word is a
//! maximal run of alphanumeric characters, compared case-insensitively. The
//! score of a sentence for a query is the number of distinct words they share.

use std::collections::HashSet;

/// Split `text` into sentences, without trimming them.
///
/// The whitespace separating two sentences belongs to neither. Segments that
/// are blank are dropped.
pub fn split_sentences<'a>(text: &'a str) -> Vec<&'a str> {
    let mut sentences = Vec::new();
    let mut push = |s: &'a str| {
        if !s.trim().is_empty() {
            sentences.push(s);
        }
    };

    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let Some(&(_, next)) = chars.peek() else {
            break;
        };
        if !next.is_whitespace() {
            continue;
        }

        push(&text[start..i + c.len_utf8()]);
        start = text.len();
        while let Some(&(j, w)) = chars.peek() {
            if !w.is_whitespace() {
                start = j;
                break;
            }
            chars.next();
        }
    }
    push(&text[start..]);

    sentences
}

/// Distinct lowercase words of `text`.
pub fn word_set(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn overlap(query: &HashSet<String>, sentence: &str) -> usize {
    word_set(sentence).intersection(query).count()
}

/// Sentences of `document` by descending overlap with `query`.
///
/// Ties keep document order, so a query sharing no words with the document
/// returns the sentences unchanged.
pub fn rank_sentences<'a>(query: &str, document: &'a str) -> Vec<&'a str> {
    let query = word_set(query);
    let mut scored: Vec<(usize, &str)> = split_sentences(document)
        .into_iter()
        .map(|s| (overlap(&query, s), s))
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, s)| s).collect()
}

/// The `k` most relevant sentences joined by single spaces.
pub fn top_k(query: &str, document: &str, k: usize) -> String {
    rank_sentences(query, document)
        .into_iter()
        .take(k)
        .collect::<Vec<_>>()
        .join(" ")
}

/// The earliest sentence with the highest positive overlap, and its score.
pub fn best_match<'a>(query: &str, document: &'a str) -> Option<(&'a str, usize)> {
    let query = word_set(query);
    let mut best: Option<(&str, usize)> = None;
    for sentence in split_sentences(document) {
        let score = overlap(&query, sentence);
        if score > best.map_or(0, |(_, s)| s) {
            best = Some((sentence, score));
        }
    }
    best
}
