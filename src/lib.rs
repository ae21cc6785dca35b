//! # Tweet Mining
//!
//! Text mining for a corpus of tweets annotated for bullying traces.
//!
//! ## Modules
//!
//! - `config` - Pipeline parameters (split ratio, folds, topics, preprocessing)
//! - `data` - CSV loading, language filtering and label encoding
//! - `preprocessing` - Tokenization, stemming and document-term matrices
//! - `classification` - SVM / naive Bayes training, cross-validation and metrics
//! - `topics` - Latent Dirichlet Allocation and topic evaluation
//! - `pipeline` - The two end-to-end workflows
//! - `report` - Printable and serializable results

pub mod classification;
pub mod config;
pub mod data;
pub mod pipeline;
pub mod preprocessing;
pub mod report;
pub mod topics;

pub use config::PipelineConfig;
pub use data::{LabelEncoder, TweetDataset};
pub use pipeline::{run_classification, run_topic_model, PipelineError};
pub use report::{ClassificationReport, Report, ReportError, TopicReport};
