//! Pipeline configuration
//!
//! Every parameter of the two workflows lives here. The defaults reproduce the
//! walkthrough: a 90/10 train/test split, 3-fold cross-validation, tf-idf weighting
//! with stemming and sparse-term removal, and a 20-topic LDA model on English tweets.
//!
//! A JSON file may override any subset of fields:
//!
//! ```json
//! { "classification": { "n_folds": 5 }, "topics": { "n_topics": 10 } }
//! ```

use crate::preprocessing::{IdfMethod, TfMethod};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Column layout of the input CSV
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Column holding the tweet text
    pub text_column: String,
    /// Column holding the binary label
    pub label_column: String,
    /// Column holding the language code
    pub lang_column: String,
    /// Optional column holding a tweet identifier
    pub id_column: Option<String>,
    /// Language kept for topic modeling
    pub topic_language: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            text_column: "text".to_string(),
            label_column: "bullying_traces".to_string(),
            lang_column: "lang".to_string(),
            id_column: Some("id".to_string()),
            topic_language: "en".to_string(),
        }
    }
}

/// Text cleaning and matrix construction options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessingConfig {
    pub lowercase: bool,
    pub remove_numbers: bool,
    pub remove_stop_words: bool,
    pub stem_words: bool,
    /// Drop `@user` mentions before tokenizing
    pub strip_mentions: bool,
    pub min_length: usize,
    pub max_length: usize,
    /// Terms absent from a larger share of documents than this are removed
    pub max_sparsity: f64,
    pub max_features: Option<usize>,
    /// Term frequency weighting of the tf-idf matrix
    pub tf_method: TfMethod,
    /// Inverse document frequency weighting of the tf-idf matrix
    pub idf_method: IdfMethod,
    /// Extra stop words appended to the built-in English list
    pub extra_stop_words: Vec<String>,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            lowercase: true,
            remove_numbers: true,
            remove_stop_words: true,
            stem_words: true,
            strip_mentions: true,
            min_length: 2,
            max_length: 50,
            max_sparsity: 0.998,
            max_features: None,
            tf_method: TfMethod::Normalized,
            idf_method: IdfMethod::Log2,
            extra_stop_words: vec!["rt".to_string(), "amp".to_string()],
        }
    }
}

/// Supported classification algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Linear support vector machine
    Svm,
    /// Multinomial naive Bayes
    NaiveBayes,
}

/// Supervised classification parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    pub algorithm: Algorithm,
    /// Share of documents used for training
    pub train_ratio: f64,
    /// Number of cross-validation folds
    pub n_folds: usize,
    /// SVM regularization parameter (C)
    pub cost: f64,
    /// SVM optimizer passes
    pub epochs: usize,
    /// SVM stopping tolerance
    pub tolerance: f64,
    /// Laplace smoothing for naive Bayes
    pub smoothing: f64,
    /// Shuffle documents before the train/test split
    pub shuffle: bool,
    pub seed: u64,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Svm,
            train_ratio: 0.9,
            n_folds: 3,
            cost: 1.0,
            epochs: 2,
            tolerance: 1e-3,
            smoothing: 1.0,
            shuffle: false,
            seed: 42,
        }
    }
}

/// Topic model parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicConfig {
    pub n_topics: usize,
    /// Terms printed per topic
    pub n_top_terms: usize,
    /// Document-topic prior; `None` means `50 / n_topics`
    pub alpha: Option<f64>,
    /// Topic-word prior
    pub beta: f64,
    pub n_iterations: usize,
    pub burn_in: usize,
    pub seed: u64,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            n_topics: 20,
            n_top_terms: 10,
            alpha: None,
            beta: 0.1,
            n_iterations: 1000,
            burn_in: 100,
            seed: 42,
        }
    }
}

impl TopicConfig {
    /// Document-topic prior actually used for fitting
    pub fn effective_alpha(&self) -> f64 {
        self.alpha
            .unwrap_or_else(|| 50.0 / self.n_topics.max(1) as f64)
    }
}

/// Full pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub data: DataConfig,
    pub preprocessing: PreprocessingConfig,
    pub classification: ClassificationConfig,
    pub topics: TopicConfig,
}

impl PipelineConfig {
    /// Load a (possibly partial) configuration from a JSON file and validate it
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Parse a (possibly partial) JSON configuration and validate it
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check parameter ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.preprocessing;
        if !(p.max_sparsity > 0.0 && p.max_sparsity <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "max_sparsity must be in (0, 1], got {}",
                p.max_sparsity
            )));
        }
        if p.min_length > p.max_length {
            return Err(ConfigError::Invalid(
                "min_length must not exceed max_length".into(),
            ));
        }

        let c = &self.classification;
        if !(c.train_ratio > 0.0 && c.train_ratio < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "train_ratio must be in (0, 1), got {}",
                c.train_ratio
            )));
        }
        if c.n_folds < 2 {
            return Err(ConfigError::Invalid("n_folds must be at least 2".into()));
        }
        if !(c.cost > 0.0 && c.tolerance > 0.0 && c.smoothing > 0.0) {
            return Err(ConfigError::Invalid(
                "cost, tolerance and smoothing must be positive".into(),
            ));
        }
        if c.epochs == 0 {
            return Err(ConfigError::Invalid("epochs must be positive".into()));
        }

        let t = &self.topics;
        if t.n_topics == 0 {
            return Err(ConfigError::Invalid("n_topics must be positive".into()));
        }
        if !(t.effective_alpha() > 0.0 && t.beta > 0.0) {
            return Err(ConfigError::Invalid(
                "alpha and beta must be positive".into(),
            ));
        }
        if t.burn_in >= t.n_iterations {
            return Err(ConfigError::Invalid(
                "burn_in must be smaller than n_iterations".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_walkthrough() {
        let config = PipelineConfig::default();
        assert_eq!(config.classification.train_ratio, 0.9);
        assert_eq!(config.classification.n_folds, 3);
        assert_eq!(config.topics.n_topics, 20);
        assert_eq!(config.data.topic_language, "en");
        assert!((config.topics.effective_alpha() - 2.5).abs() < 1e-12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = PipelineConfig::from_json_str(
            r#"{ "topics": { "n_topics": 5 }, "classification": { "algorithm": "naive_bayes" } }"#,
        )
        .unwrap();

        assert_eq!(config.topics.n_topics, 5);
        assert_eq!(config.topics.n_top_terms, 10);
        assert_eq!(config.classification.algorithm, Algorithm::NaiveBayes);
        assert_eq!(config.data.label_column, "bullying_traces");
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = PipelineConfig::default();
        config.classification.n_folds = 1;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.classification.train_ratio = 1.0;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.topics.burn_in = config.topics.n_iterations;
        assert!(config.validate().is_err());

        assert!(PipelineConfig::from_json_str(r#"{ "topics": { "n_topics": 0 } }"#).is_err());
    }

    #[test]
    fn test_validation_rejects_nan() {
        let mut config = PipelineConfig::default();
        config.classification.cost = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.classification.smoothing = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.topics.alpha = Some(f64::NAN);
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.topics.beta = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_weighting_methods_from_json() {
        let config = PipelineConfig::default();
        assert_eq!(config.preprocessing.tf_method, TfMethod::Normalized);
        assert_eq!(config.preprocessing.idf_method, IdfMethod::Log2);

        let config = PipelineConfig::from_json_str(
            r#"{ "preprocessing": { "tf_method": "log_norm", "idf_method": "smooth" } }"#,
        )
        .unwrap();
        assert_eq!(config.preprocessing.tf_method, TfMethod::LogNorm);
        assert_eq!(config.preprocessing.idf_method, IdfMethod::Smooth);
        assert!(config.preprocessing.stem_words);

        assert!(PipelineConfig::from_json_str(r#"{ "preprocessing": { "tf_method": "cubic" } }"#).is_err());
    }
}
