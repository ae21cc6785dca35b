//! Supervised document classification
//!
//! This module provides:
//! - A train/test container around the document-term matrix
//! - A linear SVM (smartcore) and a multinomial naive Bayes classifier
//! - K-fold cross-validation
//! - Precision / recall / F1 analytics

pub mod container;
pub mod cross_validation;
pub mod metrics;
pub mod naive_bayes;
pub mod svm;

pub use container::Container;
pub use cross_validation::{cross_validate, CrossValidationResult};
pub use metrics::{ClassMetrics, ClassificationMetrics};
pub use naive_bayes::NaiveBayesClassifier;
pub use svm::{SvmClassifier, SvmParams};

use crate::config::{Algorithm, ClassificationConfig};
use ndarray::ArrayView2;
use thiserror::Error;

/// Errors that can occur while training or evaluating a classifier
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Training failed: {0}")]
    TrainingFailed(String),

    #[error("Prediction failed: {0}")]
    PredictionFailed(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Model not trained")]
    NotTrained,
}

/// A binary document classifier over weighted document-term rows
///
/// Labels are 0 or 1. Training and prediction happen in one call because
/// the smartcore SVM borrows its training matrix for its whole lifetime.
pub trait Classifier {
    /// Short algorithm name used in reports
    fn name(&self) -> &'static str;

    /// Train on `train_x` / `train_y` and label the rows of `test_x`
    fn fit_predict(
        &self,
        train_x: ArrayView2<f64>,
        train_y: &[u8],
        test_x: ArrayView2<f64>,
    ) -> Result<Vec<u8>, ModelError>;
}

/// Build the classifier selected in the configuration
pub fn build_classifier(config: &ClassificationConfig) -> Box<dyn Classifier> {
    match config.algorithm {
        Algorithm::Svm => Box::new(SvmClassifier::with_params(SvmParams {
            cost: config.cost,
            epochs: config.epochs,
            tolerance: config.tolerance,
        })),
        Algorithm::NaiveBayes => Box::new(NaiveBayesClassifier::new().with_alpha(config.smoothing)),
    }
}

/// Check the shapes shared by every classifier
pub(crate) fn check_training_data(
    train_x: &ArrayView2<f64>,
    train_y: &[u8],
    test_x: &ArrayView2<f64>,
) -> Result<(), ModelError> {
    if train_x.nrows() == 0 {
        return Err(ModelError::InvalidData("Empty training set".to_string()));
    }
    if train_x.nrows() != train_y.len() {
        return Err(ModelError::InvalidData(format!(
            "{} training rows but {} labels",
            train_x.nrows(),
            train_y.len()
        )));
    }
    if train_x.ncols() != test_x.ncols() {
        return Err(ModelError::InvalidData(format!(
            "Training matrix has {} features, test matrix has {}",
            train_x.ncols(),
            test_x.ncols()
        )));
    }
    if let Some(bad) = train_y.iter().find(|&&y| y > 1) {
        return Err(ModelError::InvalidData(format!("Label {} is not binary", bad)));
    }
    Ok(())
}
