//! Annotated tweet records and CSV loading

use crate::config::DataConfig;
use csv::{Reader, StringRecord};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised while loading or encoding the dataset
#[derive(Error, Debug)]
pub enum DataError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Column '{0}' not found in CSV header")]
    MissingColumn(String),

    #[error("Row {row}: unrecognized label '{value}' (expected y/n or 0/1)")]
    InvalidLabel { row: usize, value: String },
}

/// A single annotated tweet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tweet {
    /// Identifier from the id column, or the 1-based row number
    pub id: String,
    /// Raw tweet text
    pub text: String,
    /// Raw label value as it appears in the file
    pub label: String,
    /// Language code (e.g. "en")
    pub lang: String,
}

impl Tweet {
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        label: impl Into<String>,
        lang: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            label: label.into(),
            lang: lang.into(),
        }
    }
}

/// Ordered collection of tweets
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TweetDataset {
    pub tweets: Vec<Tweet>,
}

impl TweetDataset {
    pub fn new(tweets: Vec<Tweet>) -> Self {
        Self { tweets }
    }

    /// Load tweets from a CSV file with a header row
    pub fn from_csv<P: AsRef<Path>>(path: P, config: &DataConfig) -> Result<Self, DataError> {
        let path = path.as_ref();
        info!("Loading tweets from {}", path.display());
        let reader = Reader::from_path(path)?;
        Self::from_reader(reader, config)
    }

    /// Load tweets from any CSV reader with a header row
    pub fn from_reader<R: Read>(mut reader: Reader<R>, config: &DataConfig) -> Result<Self, DataError> {
        let headers = reader.headers()?.clone();

        let text_idx = column_index(&headers, &config.text_column)?;
        let label_idx = column_index(&headers, &config.label_column)?;
        let lang_idx = column_index(&headers, &config.lang_column)?;
        // The id column is optional; row numbers stand in when it is absent
        let id_idx = config
            .id_column
            .as_deref()
            .and_then(|name| column_index(&headers, name).ok());

        let mut tweets = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            let field = |idx: usize| record.get(idx).unwrap_or("").trim().to_string();

            let id = match id_idx {
                Some(idx) => field(idx),
                None => (row + 1).to_string(),
            };

            tweets.push(Tweet {
                id,
                text: field(text_idx),
                label: field(label_idx),
                lang: field(lang_idx),
            });
        }

        info!("Loaded {} tweets", tweets.len());
        Ok(Self { tweets })
    }

    /// Keep only tweets whose language code matches (case-insensitive)
    pub fn filter_language(&self, code: &str) -> Self {
        let tweets: Vec<Tweet> = self
            .tweets
            .iter()
            .filter(|t| t.lang.eq_ignore_ascii_case(code))
            .cloned()
            .collect();

        debug!(
            "Language filter '{}': kept {} of {} tweets",
            code,
            tweets.len(),
            self.tweets.len()
        );
        Self { tweets }
    }

    /// Tweet texts in dataset order
    pub fn texts(&self) -> Vec<String> {
        self.tweets.iter().map(|t| t.text.clone()).collect()
    }

    /// Tweet identifiers in dataset order
    pub fn ids(&self) -> Vec<String> {
        self.tweets.iter().map(|t| t.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.tweets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tweets.is_empty()
    }

    /// Count tweets per language code, most frequent first
    pub fn language_counts(&self) -> Vec<(String, usize)> {
        let mut counts: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();
        for tweet in &self.tweets {
            *counts.entry(tweet.lang.as_str()).or_insert(0) += 1;
        }

        let mut counts: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(lang, n)| (lang.to_string(), n))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        counts
    }
}

fn column_index(headers: &StringRecord, name: &str) -> Result<usize, DataError> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| DataError::MissingColumn(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "id,text,bullying_traces,lang\n\
        1,\"You are such a loser, nobody likes you\",y,en\n\
        2,Great game last night!,n,en\n\
        3,Ce n'est pas grave,n,fr\n";

    fn load(csv: &str) -> Result<TweetDataset, DataError> {
        let reader = Reader::from_reader(csv.as_bytes());
        TweetDataset::from_reader(reader, &DataConfig::default())
    }

    #[test]
    fn test_load_from_reader() {
        let dataset = load(CSV).unwrap();

        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.tweets[0].id, "1");
        assert_eq!(dataset.tweets[0].label, "y");
        assert!(dataset.tweets[0].text.contains("loser"));
        assert_eq!(dataset.tweets[2].lang, "fr");
    }

    #[test]
    fn test_missing_column() {
        let result = load("text,label\nhello,y\n");
        assert!(matches!(result, Err(DataError::MissingColumn(ref c)) if c == "bullying_traces"));
    }

    #[test]
    fn test_row_numbers_without_id_column() {
        let dataset = load("text,bullying_traces,lang\nhello,y,en\nworld,n,en\n").unwrap();
        assert_eq!(dataset.ids(), vec!["1".to_string(), "2".to_string()]);
    }

    #[test]
    fn test_filter_language() {
        let dataset = load(CSV).unwrap();

        let english = dataset.filter_language("EN");
        assert_eq!(english.len(), 2);
        assert!(english.tweets.iter().all(|t| t.lang == "en"));

        assert!(dataset.filter_language("de").is_empty());
    }

    #[test]
    fn test_language_counts() {
        let dataset = load(CSV).unwrap();
        let counts = dataset.language_counts();

        assert_eq!(counts[0], ("en".to_string(), 2));
        assert_eq!(counts[1], ("fr".to_string(), 1));
    }
}
