//! Relevance scoring over the procedure store.
//!
//! Queries are normalized first (punctuation stripped, short words and
//! stop words dropped), then every procedure is scored against the
//! normalized words. Titles weigh far more than descriptions; whole-query
//! bonuses reward titles that contain or start with the query.

use std::sync::LazyLock;

use regex::Regex;

use super::store::{Procedure, ProcedureStore};

/// Below this top score a query is treated as off-topic.
pub const NO_MATCH_THRESHOLD: i32 = 3;
/// At or above this top score the best match is answered directly.
pub const STRONG_MATCH_THRESHOLD: i32 = 50;
/// Minimum score for a procedure to appear as a suggestion.
pub const MIN_SUGGESTION_SCORE: i32 = 5;
/// Suggestion lists are capped at this many titles.
pub const MAX_SUGGESTIONS: usize = 5;

/// Filler words that carry no search signal.
const STOP_WORDS: &[&str] = &[
    "quiero", "saber", "como", "mi", "un", "una", "el", "la", "los", "las", "y", "o", "de",
    "del", "para", "con", "en", "por", "que", "es", "este", "esta", "estos", "estas", "a",
    "al", "lo", "me", "sobre", "mas", "más", "hay", "informacion", "información", "respecto",
];

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").unwrap());

/// Lowercases, strips punctuation, and drops stop words and words of at
/// most two characters.
pub fn clean_query(query: &str) -> String {
    let cleaned = NON_WORD.replace_all(query, "").to_lowercase();
    cleaned
        .split_whitespace()
        .filter(|word| word.chars().count() > 2 && !STOP_WORDS.contains(word))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Scores one procedure against a cleaned query.
pub fn score(proc: &Procedure, cleaned_query: &str) -> i32 {
    let title = proc.title.to_lowercase();
    let title = title.trim();
    let description = proc.description.to_lowercase();
    let description = description.trim();
    let words: Vec<&str> = cleaned_query.split_whitespace().collect();

    let mut score = 0;
    for word in &words {
        if title.contains(word) {
            score += 10;
        }
        if description.contains(word) {
            score += 4;
        }
    }

    if cleaned_query.chars().count() > 5 && title.contains(cleaned_query) {
        score += 20;
    }
    if cleaned_query.chars().count() >= 3 && title.starts_with(cleaned_query) {
        score += 15;
    }
    if words.len() > 1 {
        if words.iter().all(|w| title.contains(w)) {
            score += 25;
        } else if words.iter().all(|w| description.contains(w)) {
            score += 8;
        }
    }

    score
}

/// All procedures with a positive score, best first.
pub fn find_matches<'a>(
    store: &'a ProcedureStore,
    cleaned_query: &str,
) -> Vec<(i32, &'a Procedure)> {
    if cleaned_query.is_empty() {
        return Vec::new();
    }
    let mut matches: Vec<(i32, &Procedure)> = store
        .iter()
        .map(|proc| (score(proc, cleaned_query), proc))
        .filter(|&(s, _)| s > 0)
        .collect();
    matches.sort_by(|a, b| b.0.cmp(&a.0));
    matches
}
