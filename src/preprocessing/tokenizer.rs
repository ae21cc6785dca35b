//! Tweet tokenization and normalization
//!
//! This module provides tools for:
//! - Text cleaning (URLs, mentions, HTML, punctuation, numbers)
//! - Tokenization (splitting text into words)
//! - Stop word removal
//! - Stemming (Snowball English)

use crate::config::PreprocessingConfig;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;
use unicode_segmentation::UnicodeSegmentation;

static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://\S+|www\.\S+").unwrap());
static MENTION_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@\w+").unwrap());
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").unwrap());
static HTML_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>|&\w+;").unwrap());
static SPECIAL_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]|_").unwrap());
static NUMBER_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());
static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Tokenizer configuration and functionality
#[derive(Debug, Clone)]
pub struct Tokenizer {
    /// Stop words to filter out
    stop_words: HashSet<String>,
    /// Minimum token length (in characters)
    min_length: usize,
    /// Maximum token length (in characters)
    max_length: usize,
    /// Convert to lowercase
    lowercase: bool,
    /// Remove numbers
    remove_numbers: bool,
    /// Remove stop words
    remove_stop_words: bool,
    /// Reduce words to their Snowball stem
    stem: bool,
    /// Remove @user mentions
    strip_mentions: bool,
}

impl Tokenizer {
    /// Create a new tokenizer with default English stop words
    pub fn new() -> Self {
        Self {
            stop_words: default_stop_words(),
            min_length: 2,
            max_length: 50,
            lowercase: true,
            remove_numbers: true,
            remove_stop_words: true,
            stem: false,
            strip_mentions: true,
        }
    }

    /// Create a tokenizer from pipeline preprocessing options
    pub fn from_config(config: &PreprocessingConfig) -> Self {
        let mut tokenizer = Self::new()
            .min_length(config.min_length)
            .max_length(config.max_length)
            .lowercase(config.lowercase)
            .remove_numbers(config.remove_numbers)
            .remove_stop_words(config.remove_stop_words)
            .stem(config.stem_words)
            .strip_mentions(config.strip_mentions);

        let extra: Vec<&str> = config.extra_stop_words.iter().map(String::as_str).collect();
        tokenizer.add_stop_words(&extra);
        tokenizer
    }

    /// Add custom stop words
    pub fn add_stop_words(&mut self, words: &[&str]) {
        for word in words {
            self.stop_words.insert(word.to_lowercase());
        }
    }

    /// Set minimum token length
    pub fn min_length(mut self, len: usize) -> Self {
        self.min_length = len;
        self
    }

    /// Set maximum token length
    pub fn max_length(mut self, len: usize) -> Self {
        self.max_length = len;
        self
    }

    /// Enable/disable lowercase conversion
    pub fn lowercase(mut self, enable: bool) -> Self {
        self.lowercase = enable;
        self
    }

    /// Enable/disable number removal
    pub fn remove_numbers(mut self, enable: bool) -> Self {
        self.remove_numbers = enable;
        self
    }

    /// Enable/disable stop word removal
    pub fn remove_stop_words(mut self, enable: bool) -> Self {
        self.remove_stop_words = enable;
        self
    }

    /// Enable/disable stemming
    pub fn stem(mut self, enable: bool) -> Self {
        self.stem = enable;
        self
    }

    /// Enable/disable removal of @mentions
    pub fn strip_mentions(mut self, enable: bool) -> Self {
        self.strip_mentions = enable;
        self
    }

    /// Clean and normalize text
    pub fn clean(&self, text: &str) -> String {
        let mut cleaned = URL_REGEX.replace_all(text, " ").into_owned();
        cleaned = EMAIL_REGEX.replace_all(&cleaned, " ").into_owned();

        if self.strip_mentions {
            cleaned = MENTION_REGEX.replace_all(&cleaned, " ").into_owned();
        }

        cleaned = HTML_REGEX.replace_all(&cleaned, " ").into_owned();

        // Keep letters and digits only; hashtags survive as plain words
        cleaned = SPECIAL_REGEX.replace_all(&cleaned, " ").into_owned();

        if self.remove_numbers {
            cleaned = NUMBER_REGEX.replace_all(&cleaned, " ").into_owned();
        }

        if self.lowercase {
            cleaned = cleaned.to_lowercase();
        }

        WHITESPACE_REGEX.replace_all(&cleaned, " ").trim().to_string()
    }

    /// Tokenize text into words
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let stemmer = self.stem.then(|| Stemmer::create(Algorithm::English));
        self.tokenize_with(text, stemmer.as_ref())
    }

    fn tokenize_with(&self, text: &str, stemmer: Option<&Stemmer>) -> Vec<String> {
        let cleaned = self.clean(text);

        cleaned
            .unicode_words()
            .filter(|word| {
                let len = word.chars().count();
                len >= self.min_length && len <= self.max_length
            })
            .filter(|word| !self.remove_stop_words || !self.stop_words.contains(&word.to_lowercase()))
            .map(|word| match stemmer {
                Some(stemmer) => stemmer.stem(word).into_owned(),
                None => word.to_string(),
            })
            .filter(|token| !token.is_empty())
            .collect()
    }

    /// Tokenize multiple documents
    pub fn tokenize_documents(&self, documents: &[String]) -> Vec<Vec<String>> {
        let stemmer = self.stem.then(|| Stemmer::create(Algorithm::English));
        documents
            .iter()
            .map(|doc| self.tokenize_with(doc, stemmer.as_ref()))
            .collect()
    }

    /// Get unique vocabulary from tokenized documents
    pub fn build_vocabulary(&self, tokenized_docs: &[Vec<String>]) -> Vec<String> {
        let vocab_set: HashSet<&String> = tokenized_docs.iter().flatten().collect();

        let mut vocab: Vec<String> = vocab_set.into_iter().cloned().collect();
        vocab.sort();
        vocab
    }

    /// Get vocabulary with document frequencies, most frequent first
    pub fn vocabulary_with_frequencies(&self, tokenized_docs: &[Vec<String>]) -> Vec<(String, usize)> {
        let mut doc_freq: HashMap<&str, usize> = HashMap::new();

        for doc in tokenized_docs {
            let unique_tokens: HashSet<&String> = doc.iter().collect();
            for token in unique_tokens {
                *doc_freq.entry(token.as_str()).or_insert(0) += 1;
            }
        }

        let mut vocab: Vec<(String, usize)> = doc_freq
            .into_iter()
            .map(|(token, freq)| (token.to_string(), freq))
            .collect();
        vocab.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        vocab
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Default English stop words
fn default_stop_words() -> HashSet<String> {
    let words = [
        // Articles
        "a", "an", "the",
        // Pronouns
        "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
        "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
        "it", "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
        "who", "whom", "this", "that", "these", "those",
        // Verbs
        "am", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had", "having",
        "do", "does", "did", "doing", "would", "should", "could", "ought", "might", "must",
        "shall", "will", "can", "may",
        // Contractions with punctuation stripped
        "im", "ive", "youre", "dont", "doesnt", "didnt", "isnt", "arent", "wasnt", "cant",
        "wont", "thats", "lets",
        // Prepositions
        "at", "by", "for", "from", "in", "into", "of", "on", "to", "with", "about", "against",
        "between", "during", "before", "after", "above", "below", "up", "down", "out", "off",
        "over", "under", "again", "further", "then", "once",
        // Conjunctions
        "and", "but", "or", "nor", "so", "yet", "both", "either", "neither", "not", "only",
        "than", "when", "where", "while", "if", "because", "as", "until", "although",
        // Other common words
        "here", "there", "all", "each", "few", "more", "most", "other", "some", "such", "no",
        "any", "own", "same", "too", "very", "just", "also", "now", "how", "why", "well",
    ];

    words.iter().map(|s| s.to_string()).collect()
}
