//! Linear support vector machine
//!
//! A thin wrapper around the smartcore C-SVC with a linear kernel.
//! smartcore expects labels in {-1, +1}; the wrapper maps 0/1 in and out.

use super::{check_training_data, Classifier, ModelError};
use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::svm::svc::{SVCParameters, SVC};
use smartcore::svm::Kernels;
use tracing::{debug, info};

/// SVM hyperparameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SvmParams {
    /// Regularization parameter (C)
    pub cost: f64,
    /// Number of optimizer passes over the data
    pub epochs: usize,
    /// Stopping tolerance
    pub tolerance: f64,
}

impl Default for SvmParams {
    fn default() -> Self {
        Self {
            cost: 1.0,
            epochs: 2,
            tolerance: 1e-3,
        }
    }
}

/// Linear-kernel SVM classifier
#[derive(Debug, Clone, Default)]
pub struct SvmClassifier {
    params: SvmParams,
}

impl SvmClassifier {
    /// Create a classifier with default parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a classifier with custom parameters
    pub fn with_params(params: SvmParams) -> Self {
        Self { params }
    }

    /// Get model parameters
    pub fn params(&self) -> &SvmParams {
        &self.params
    }
}

impl Classifier for SvmClassifier {
    fn name(&self) -> &'static str {
        "SVM"
    }

    fn fit_predict(
        &self,
        train_x: ArrayView2<f64>,
        train_y: &[u8],
        test_x: ArrayView2<f64>,
    ) -> Result<Vec<u8>, ModelError> {
        check_training_data(&train_x, train_y, &test_x)?;

        let has_positive = train_y.iter().any(|&y| y == 1);
        let has_negative = train_y.iter().any(|&y| y == 0);
        if !(has_positive && has_negative) {
            return Err(ModelError::InvalidData(
                "Training labels must contain both classes".to_string(),
            ));
        }

        if test_x.nrows() == 0 {
            return Ok(Vec::new());
        }

        let x = to_dense(train_x)?;
        let y: Vec<i32> = train_y.iter().map(|&l| if l == 1 { 1 } else { -1 }).collect();
        let x_test = to_dense(test_x)?;

        info!(
            "Training linear SVM with {} samples and {} features",
            train_x.nrows(),
            train_x.ncols()
        );
        debug!("Parameters: {:?}", self.params);

        let parameters: SVCParameters<f64, i32, DenseMatrix<f64>, Vec<i32>> = SVCParameters::default()
            .with_c(self.params.cost)
            .with_epoch(self.params.epochs)
            .with_tol(self.params.tolerance)
            .with_kernel(Kernels::linear());

        let model = SVC::fit(&x, &y, &parameters)
            .map_err(|e| ModelError::TrainingFailed(format!("{:?}", e)))?;

        let predictions = model
            .predict(&x_test)
            .map_err(|e| ModelError::PredictionFailed(format!("{:?}", e)))?;

        Ok(predictions
            .into_iter()
            .map(|p| if p > 0.0 { 1 } else { 0 })
            .collect())
    }
}

/// Copy an ndarray view into a smartcore matrix
fn to_dense(x: ArrayView2<f64>) -> Result<DenseMatrix<f64>, ModelError> {
    let rows: Vec<Vec<f64>> = x.outer_iter().map(|row| row.to_vec()).collect();
    DenseMatrix::from_2d_vec(&rows)
        .map_err(|e| ModelError::InvalidData(format!("Failed to create feature matrix: {:?}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    /// Two well separated groups: feature 0 marks class 1, feature 1 marks class 0
    fn separable_data() -> (Array2<f64>, Vec<u8>) {
        let x = Array2::from_shape_vec(
            (8, 2),
            vec![
                1.0, 0.0, 0.9, 0.1, 0.8, 0.0, 1.0, 0.2, // class 1
                0.0, 1.0, 0.1, 0.9, 0.0, 0.8, 0.2, 1.0, // class 0
            ],
        )
        .unwrap();
        let y = vec![1, 1, 1, 1, 0, 0, 0, 0];
        (x, y)
    }

    #[test]
    fn test_svm_separates_linear_data() {
        let (x, y) = separable_data();
        let test = Array2::from_shape_vec((2, 2), vec![0.95, 0.05, 0.05, 0.95]).unwrap();

        let svm = SvmClassifier::with_params(SvmParams {
            cost: 10.0,
            ..Default::default()
        });
        let predictions = svm.fit_predict(x.view(), &y, test.view()).unwrap();

        assert_eq!(predictions, vec![1, 0]);
    }

    #[test]
    fn test_svm_rejects_single_class() {
        let (x, _) = separable_data();
        let y = vec![1; 8];

        let result = SvmClassifier::new().fit_predict(x.view(), &y, x.view());
        assert!(matches!(result, Err(ModelError::InvalidData(_))));
    }

    #[test]
    fn test_svm_empty_test_set() {
        let (x, y) = separable_data();
        let empty = Array2::<f64>::zeros((0, 2));

        let predictions = SvmClassifier::new().fit_predict(x.view(), &y, empty.view()).unwrap();
        assert!(predictions.is_empty());
    }
}
