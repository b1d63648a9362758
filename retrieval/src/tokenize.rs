use log::warn;
use std::collections::HashSet;
use std::path::Path;
use unicode_segmentation::UnicodeSegmentation;

/// Bundled English stopword list, used whenever no external list is
/// configured or the configured one fails to load.
const BUNDLED_STOPWORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "if", "because", "as", "what", "which", "this", "that",
    "these", "those", "then", "just", "so", "than", "such", "when", "who", "whom", "how", "where",
    "why", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had", "having", "do",
    "does", "did", "doing", "can", "could", "should", "would", "shall", "will", "may", "might",
    "must", "to", "in", "on", "at", "by", "for", "with", "about", "against", "between", "into",
    "through", "during", "before", "after", "above", "below", "from", "up", "down", "of", "i",
    "me", "my", "we", "our", "you", "your", "he", "him", "his", "she", "her", "it", "its", "they",
    "them", "their", "not", "no", "nor", "own", "same", "too", "very", "here", "there", "all",
    "any", "both", "each", "few", "more", "most", "other", "some",
];

/// Split text into lowercase word tokens.
///
/// Words are Unicode word-segmented, then reduced to contiguous alphanumeric
/// runs; punctuation and whitespace never survive.
pub fn tokenize(text: &str) -> Vec<String> {
    text.unicode_words()
        .flat_map(|word| word.split(|c: char| !c.is_alphanumeric()))
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// English stopword set with fail-open loading.
///
/// Resource tiers: the bundled list always works; an external word-per-line
/// file replaces it when configured and readable; any load problem logs a
/// warning and keeps the bundled list. Stopword trouble never fails
/// retrieval.
pub struct StopwordFilter {
    words: HashSet<String>,
}

impl StopwordFilter {
    /// The compiled-in list
    pub fn bundled() -> Self {
        Self {
            words: BUNDLED_STOPWORDS.iter().map(|w| (*w).to_string()).collect(),
        }
    }

    /// Load from an optional external list, falling back to the bundled one
    pub fn load(path: Option<&Path>) -> Self {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::bundled(),
        }
    }

    /// Load a word-per-line file; fail open to the bundled list
    pub fn from_file(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                let words: HashSet<String> = contents
                    .lines()
                    .map(|line| line.trim().to_lowercase())
                    .filter(|line| !line.is_empty())
                    .collect();
                if words.is_empty() {
                    warn!(
                        "Stopword file {} is empty, using bundled list",
                        path.display()
                    );
                    Self::bundled()
                } else {
                    Self { words }
                }
            }
            Err(error) => {
                warn!(
                    "Failed to read stopword file {}: {error}, using bundled list",
                    path.display()
                );
                Self::bundled()
            }
        }
    }

    /// Check membership
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    /// Remove stopwords from a token list
    pub fn filter(&self, tokens: &[String]) -> Vec<String> {
        tokens
            .iter()
            .filter(|token| !self.contains(token))
            .cloned()
            .collect()
    }

    /// Remove stopwords from query tokens, falling back to the unfiltered
    /// tokens when nothing survives. An all-stopword query must still match.
    pub fn filter_query(&self, tokens: Vec<String>) -> Vec<String> {
        let filtered = self.filter(&tokens);
        if filtered.is_empty() {
            warn!("No terms left after stopword removal, using original query");
            tokens
        } else {
            filtered
        }
    }
}
