//! Classification analytics
//!
//! Confusion matrix, accuracy and per-class precision / recall / F1 for
//! the binary bullying-trace labels.

use super::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Confusion matrix for binary classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    /// True positives
    pub tp: usize,
    /// True negatives
    pub tn: usize,
    /// False positives
    pub fp: usize,
    /// False negatives
    pub fn_: usize,
}

impl ConfusionMatrix {
    /// Count outcomes; labels are compared as 0 / non-zero
    pub fn from_predictions(y_true: &[u8], y_pred: &[u8]) -> Self {
        let mut cm = Self {
            tp: 0,
            tn: 0,
            fp: 0,
            fn_: 0,
        };

        for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
            match (t != 0, p != 0) {
                (true, true) => cm.tp += 1,
                (false, false) => cm.tn += 1,
                (false, true) => cm.fp += 1,
                (true, false) => cm.fn_ += 1,
            }
        }

        cm
    }

    pub fn total(&self) -> usize {
        self.tp + self.tn + self.fp + self.fn_
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Predicted:    0       1")?;
        writeln!(f, "Actual 0:   {:>5}   {:>5}  (TN/FP)", self.tn, self.fp)?;
        write!(f, "Actual 1:   {:>5}   {:>5}  (FN/TP)", self.fn_, self.tp)
    }
}

/// Precision, recall and F1 for one class
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: u8,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Number of true instances of the class
    pub support: usize,
}

impl ClassMetrics {
    fn from_counts(label: u8, tp: usize, fp: usize, fn_: usize) -> Self {
        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        let f1 = if precision + recall < 1e-10 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };

        Self {
            label,
            precision,
            recall,
            f1,
            support: tp + fn_,
        }
    }
}

/// Collection of classification metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub confusion_matrix: ConfusionMatrix,
    pub accuracy: f64,
    /// Metrics for class 0 and class 1
    pub per_class: Vec<ClassMetrics>,
    pub macro_precision: f64,
    pub macro_recall: f64,
    pub macro_f1: f64,
}

impl ClassificationMetrics {
    /// Calculate all metrics from binary predictions
    pub fn from_predictions(y_true: &[u8], y_pred: &[u8]) -> Result<Self, ModelError> {
        if y_true.len() != y_pred.len() {
            return Err(ModelError::InvalidData(format!(
                "{} true labels but {} predictions",
                y_true.len(),
                y_pred.len()
            )));
        }

        let cm = ConfusionMatrix::from_predictions(y_true, y_pred);
        let accuracy = ratio(cm.tp + cm.tn, cm.total());

        // Class 0 swaps the roles of the positive and negative cells
        let per_class = vec![
            ClassMetrics::from_counts(0, cm.tn, cm.fn_, cm.fp),
            ClassMetrics::from_counts(1, cm.tp, cm.fp, cm.fn_),
        ];

        let n = per_class.len() as f64;
        let macro_precision = per_class.iter().map(|m| m.precision).sum::<f64>() / n;
        let macro_recall = per_class.iter().map(|m| m.recall).sum::<f64>() / n;
        let macro_f1 = per_class.iter().map(|m| m.f1).sum::<f64>() / n;

        Ok(Self {
            confusion_matrix: cm,
            accuracy,
            per_class,
            macro_precision,
            macro_recall,
            macro_f1,
        })
    }

    /// Metrics of the positive (bullying) class
    pub fn positive(&self) -> &ClassMetrics {
        &self.per_class[1]
    }
}

impl fmt::Display for ClassificationMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Accuracy: {:.4}", self.accuracy)?;
        writeln!(f)?;
        writeln!(f, "{:>8} {:>10} {:>10} {:>10} {:>8}", "class", "precision", "recall", "f1", "support")?;
        for m in &self.per_class {
            writeln!(
                f,
                "{:>8} {:>10.4} {:>10.4} {:>10.4} {:>8}",
                m.label, m.precision, m.recall, m.f1, m.support
            )?;
        }
        writeln!(
            f,
            "{:>8} {:>10.4} {:>10.4} {:>10.4}",
            "macro", self.macro_precision, self.macro_recall, self.macro_f1
        )?;
        writeln!(f)?;
        write!(f, "{}", self.confusion_matrix)
    }
}

fn ratio(num: usize, denom: usize) -> f64 {
    if denom == 0 {
        0.0
    } else {
        num as f64 / denom as f64
    }
}
