//! Multinomial naive Bayes classifier
//!
//! Works directly on document-term rows (counts or tf-idf weights),
//! treating each cell as a fractional term count.

use super::{check_training_data, Classifier, ModelError};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

/// Multinomial naive Bayes over binary labels
#[derive(Debug, Clone)]
pub struct NaiveBayesClassifier {
    /// log P(class) for classes 0 and 1
    class_log_priors: Option<[f64; 2]>,
    /// log P(term | class): 2 x n_terms
    feature_log_probs: Option<Array2<f64>>,
    /// Laplace smoothing
    alpha: f64,
}

impl NaiveBayesClassifier {
    /// Create a new classifier
    pub fn new() -> Self {
        Self {
            class_log_priors: None,
            feature_log_probs: None,
            alpha: 1.0, // Laplace smoothing
        }
    }

    /// Set the smoothing parameter
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Train the classifier
    pub fn fit(&mut self, x: ArrayView2<f64>, y: &[u8]) -> Result<(), ModelError> {
        check_training_data(&x, y, &x)?;

        let n_terms = x.ncols();
        let n_docs = y.len() as f64;

        let mut class_counts = [0.0_f64; 2];
        let mut term_weights = Array2::<f64>::zeros((2, n_terms));

        for (row, &label) in x.axis_iter(Axis(0)).zip(y.iter()) {
            let class = label as usize;
            class_counts[class] += 1.0;
            let mut weights = term_weights.row_mut(class);
            weights += &row;
        }

        // A class absent from training keeps a vanishing prior instead of -inf
        let priors = class_counts.map(|count| ((count + 1e-9) / (n_docs + 2e-9)).ln());

        let mut feature_log_probs = Array2::<f64>::zeros((2, n_terms));
        for class in 0..2 {
            let total: f64 = term_weights.row(class).sum();
            let denom = total + self.alpha * n_terms as f64;
            for term in 0..n_terms {
                // P(term|class) = (weight + alpha) / (total + alpha * vocab_size)
                feature_log_probs[[class, term]] = ((term_weights[[class, term]] + self.alpha) / denom).ln();
            }
        }

        self.class_log_priors = Some(priors);
        self.feature_log_probs = Some(feature_log_probs);
        Ok(())
    }

    /// Joint log-likelihood of each class for one row
    fn joint_log_likelihood(&self, row: ArrayView1<f64>) -> Result<[f64; 2], ModelError> {
        let priors = self.class_log_priors.ok_or(ModelError::NotTrained)?;
        let feature_log_probs = self.feature_log_probs.as_ref().ok_or(ModelError::NotTrained)?;

        if row.len() != feature_log_probs.ncols() {
            return Err(ModelError::PredictionFailed(format!(
                "Expected {} features, got {}",
                feature_log_probs.ncols(),
                row.len()
            )));
        }

        let mut scores = priors;
        for (class, score) in scores.iter_mut().enumerate() {
            *score += feature_log_probs.row(class).dot(&row);
        }
        Ok(scores)
    }

    /// Predict labels for every row
    pub fn predict(&self, x: ArrayView2<f64>) -> Result<Vec<u8>, ModelError> {
        x.axis_iter(Axis(0))
            .map(|row| -> Result<u8, ModelError> {
                let [neg, pos] = self.joint_log_likelihood(row)?;
                Ok(if pos > neg { 1 } else { 0 })
            })
            .collect()
    }

    /// Probability of class 1 for every row
    pub fn predict_proba(&self, x: ArrayView2<f64>) -> Result<Array1<f64>, ModelError> {
        let probs = x
            .axis_iter(Axis(0))
            .map(|row| {
                let [neg, pos] = self.joint_log_likelihood(row)?;
                // Softmax over two classes
                let max_score = neg.max(pos);
                let e_neg = (neg - max_score).exp();
                let e_pos = (pos - max_score).exp();
                Ok(e_pos / (e_neg + e_pos))
            })
            .collect::<Result<Vec<f64>, ModelError>>()?;

        Ok(Array1::from(probs))
    }

    /// Check if the model is trained
    pub fn is_trained(&self) -> bool {
        self.feature_log_probs.is_some()
    }
}

impl Default for NaiveBayesClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for NaiveBayesClassifier {
    fn name(&self) -> &'static str {
        "NaiveBayes"
    }

    fn fit_predict(
        &self,
        train_x: ArrayView2<f64>,
        train_y: &[u8],
        test_x: ArrayView2<f64>,
    ) -> Result<Vec<u8>, ModelError> {
        check_training_data(&train_x, train_y, &test_x)?;

        let mut model = self.clone();
        model.fit(train_x, train_y)?;
        model.predict(test_x)
    }
}
