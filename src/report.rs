//! Printable and serializable results

use crate::classification::{ClassificationMetrics, CrossValidationResult};
use crate::data::LabelEncoder;
use crate::topics::{LdaTopic, ModelSummary};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Outcome of the classification workflow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub algorithm: String,
    pub n_documents: usize,
    pub n_terms: usize,
    /// Share of zero cells in the tf-idf matrix
    pub sparsity: f64,
    pub train_size: usize,
    pub test_size: usize,
    /// Scores on the held-out test partition
    pub test_metrics: ClassificationMetrics,
    pub cross_validation: CrossValidationResult,
}

impl ClassificationReport {
    pub fn print(&self) {
        println!("=== Bullying Trace Classification ({}) ===", self.algorithm);
        println!(
            "Document-term matrix: {} documents x {} terms (sparsity {:.1}%)",
            self.n_documents,
            self.n_terms,
            self.sparsity * 100.0
        );
        println!("Train/test split: {} / {}", self.train_size, self.test_size);

        let cv = &self.cross_validation;
        println!("\n--- {}-fold cross-validation ---", cv.n_folds);
        for (i, acc) in cv.fold_accuracies.iter().enumerate() {
            println!("  Fold {}: {:.4}", i + 1, acc);
        }
        println!(
            "Mean accuracy: {:.4} (+/- {:.4})",
            cv.mean_accuracy, cv.std_accuracy
        );

        println!("\n--- Test set ---");
        println!("{}", self.test_metrics);

        let positive = self.test_metrics.positive();
        println!(
            "\n{}: precision {:.4}, recall {:.4}, F1 {:.4}",
            LabelEncoder::class_name(positive.label),
            positive.precision,
            positive.recall,
            positive.f1
        );
    }
}

/// Outcome of the topic-modeling workflow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicReport {
    /// Language the corpus was restricted to
    pub language: String,
    pub n_documents: usize,
    /// Documents removed because no terms survived preprocessing
    pub n_dropped: usize,
    pub n_terms: usize,
    pub alpha: f64,
    pub beta: f64,
    pub topics: Vec<LdaTopic>,
    /// Documents whose dominant topic is each topic
    pub document_counts: Vec<usize>,
    pub final_log_likelihood: Option<f64>,
    pub summary: ModelSummary,
}

impl TopicReport {
    /// Top terms of every topic as a table
    pub fn topic_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("Topic").fg(Color::Red),
                Cell::new("Prevalence").fg(Color::Red),
                Cell::new("Docs").fg(Color::Red),
                Cell::new("Coherence").fg(Color::Red),
                Cell::new("Top terms").fg(Color::White),
            ]);

        for topic in &self.topics {
            let docs = self.document_counts.get(topic.index).copied().unwrap_or(0);
            let coherence = match self.summary.topic_coherences.get(topic.index) {
                Some(Some(c)) => format!("{:.3}", c),
                _ => "n/a".to_string(),
            };

            table.add_row(vec![
                Cell::new(topic.index + 1).set_alignment(CellAlignment::Right),
                Cell::new(format!("{:.1}%", topic.prevalence * 100.0)).set_alignment(CellAlignment::Right),
                Cell::new(docs).set_alignment(CellAlignment::Right),
                Cell::new(coherence).set_alignment(CellAlignment::Right),
                Cell::new(topic.words().join(" ")),
            ]);
        }

        table
    }

    pub fn print(&self) {
        println!("=== Topic Model (LDA, lang = {}) ===", self.language);
        println!(
            "{} documents x {} terms ({} empty documents dropped)",
            self.n_documents, self.n_terms, self.n_dropped
        );
        println!(
            "{} topics, alpha = {:.3}, beta = {:.3}",
            self.topics.len(),
            self.alpha,
            self.beta
        );
        if let Some(ll) = self.final_log_likelihood {
            println!("Final log-likelihood: {:.2}", ll);
        }
        println!();
        println!("{}", self.topic_table());
        println!();
        self.summary.print();
    }
}

/// Combined output of one run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Report {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<ClassificationReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topics: Option<TopicReport>,
}

impl Report {
    pub fn print(&self) {
        if let Some(classification) = &self.classification {
            classification.print();
        }
        if let Some(topics) = &self.topics {
            if self.classification.is_some() {
                println!();
            }
            topics.print();
        }
    }

    /// Write the report as pretty-printed JSON
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<(), ReportError> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        info!("Report written to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic_report() -> TopicReport {
        TopicReport {
            language: "en".to_string(),
            n_documents: 4,
            n_dropped: 1,
            n_terms: 3,
            alpha: 25.0,
            beta: 0.1,
            topics: vec![
                LdaTopic {
                    index: 0,
                    top_words: vec![("loser".to_string(), 0.4), ("ugli".to_string(), 0.3)],
                    prevalence: 0.6,
                },
                LdaTopic {
                    index: 1,
                    top_words: vec![("game".to_string(), 0.5)],
                    prevalence: 0.4,
                },
            ],
            document_counts: vec![3, 1],
            final_log_likelihood: Some(-42.0),
            summary: ModelSummary {
                n_topics: 2,
                avg_coherence: Some(-0.5),
                diversity: 1.0,
                mean_overlap: 0.0,
                topic_coherences: vec![Some(-0.5), None],
                perplexity: Some(2.5),
            },
        }
    }

    #[test]
    fn test_topic_table_rows() {
        let rendered = topic_report().topic_table().to_string();
        assert!(rendered.contains("loser ugli"));
        assert!(rendered.contains("game"));
        assert!(rendered.contains("n/a"));
    }

    #[test]
    fn test_write_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");

        let report = Report {
            classification: None,
            topics: Some(topic_report()),
        };
        report.write_json(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(value.get("classification").is_none());
        assert_eq!(value["topics"]["document_counts"][0], 3);
        assert_eq!(value["topics"]["topics"][0]["top_words"][0][0], "loser");
    }

    #[cfg(unix)]
    #[test]
    fn test_write_json_reports_failed_flush() {
        // Opening succeeds but every write fails with ENOSPC
        let report = Report {
            classification: None,
            topics: Some(topic_report()),
        };
        let result = report.write_json("/dev/full");
        assert!(matches!(result, Err(ReportError::Io(_)) | Err(ReportError::Json(_))));
    }
}
