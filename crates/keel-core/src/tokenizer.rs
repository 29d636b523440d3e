//! Sentence tokenizer
//!
//! Folds a raw sentence into the word sequence the parser works on.

/// Words that carry no meaning in a sentence. `if` is implied by `then`.
const FILLER_WORDS: &[&str] = &["if"];

/// Split a sentence into lowercase words
///
/// Punctuation is dropped, runs of whitespace collapse, and filler words are
/// removed.
pub fn tokenize(sentence: &str) -> Vec<String> {
    words(sentence)
        .filter(|word| !FILLER_WORDS.contains(&word.as_str()))
        .collect()
}

/// Fold a field or expression name the same way sentence words are folded
///
/// Filler words are kept, so a name like `if_ready` or `what if` stays
/// addressable.
pub fn normalize_name(name: &str) -> String {
    words(name).collect::<Vec<_>>().join(" ")
}

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace()
        .map(|chunk| {
            chunk
                .chars()
                .filter(|c| c.is_alphanumeric() || *c == '_')
                .flat_map(char::to_lowercase)
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
}
