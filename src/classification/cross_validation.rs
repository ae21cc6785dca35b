//! K-fold cross-validation over the training partition

use super::{Classifier, Container, ModelError};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Cross-validation result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossValidationResult {
    /// Algorithm that was validated
    pub algorithm: String,
    pub n_folds: usize,
    /// Accuracy on each held-out fold
    pub fold_accuracies: Vec<f64>,
    pub mean_accuracy: f64,
    pub std_accuracy: f64,
}

/// Partition positions `0..labels.len()` into `n_folds` stratified folds
///
/// Each class is shuffled with the seeded generator and dealt round-robin with a
/// running offset, so every fold gets its share of each class and fold sizes
/// differ by at most one.
pub fn kfold_indices(labels: &[u8], n_folds: usize, seed: u64) -> Vec<Vec<usize>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut classes: Vec<u8> = labels.to_vec();
    classes.sort_unstable();
    classes.dedup();

    let n = labels.len();
    let mut folds = vec![Vec::with_capacity(n / n_folds.max(1) + 1); n_folds];
    let mut position = 0;
    for class in classes {
        let mut members: Vec<usize> = (0..n).filter(|&i| labels[i] == class).collect();
        members.shuffle(&mut rng);
        for idx in members {
            folds[position % n_folds].push(idx);
            position += 1;
        }
    }
    folds
}

/// Estimate accuracy by stratified k-fold cross-validation on the container's training rows
pub fn cross_validate(
    container: &Container,
    classifier: &dyn Classifier,
    n_folds: usize,
    seed: u64,
) -> Result<CrossValidationResult, ModelError> {
    let train = container.train_indices();

    if n_folds < 2 {
        return Err(ModelError::InvalidData(
            "Cross-validation needs at least 2 folds".to_string(),
        ));
    }
    if n_folds > train.len() {
        return Err(ModelError::InvalidData(format!(
            "Cannot make {} folds from {} training documents",
            n_folds,
            train.len()
        )));
    }

    info!(
        "Performing {}-fold cross-validation of {} on {} documents",
        n_folds,
        classifier.name(),
        train.len()
    );

    let folds = kfold_indices(&container.labels_of(train), n_folds, seed);
    let mut fold_accuracies = Vec::with_capacity(n_folds);

    for (fold_idx, held_out) in folds.iter().enumerate() {
        let test_rows: Vec<usize> = held_out.iter().map(|&p| train[p]).collect();
        let train_rows: Vec<usize> = folds
            .iter()
            .enumerate()
            .filter(|(other, _)| *other != fold_idx)
            .flat_map(|(_, fold)| fold.iter().map(|&p| train[p]))
            .collect();

        let x_train = container.rows(&train_rows);
        let y_train = container.labels_of(&train_rows);
        let x_test = container.rows(&test_rows);
        let y_test = container.labels_of(&test_rows);

        let predictions = classifier.fit_predict(x_train.view(), &y_train, x_test.view())?;

        let correct = predictions
            .iter()
            .zip(y_test.iter())
            .filter(|(p, t)| p == t)
            .count();
        let accuracy = correct as f64 / y_test.len() as f64;

        debug!("Fold {}: accuracy {:.4} on {} documents", fold_idx + 1, accuracy, y_test.len());
        fold_accuracies.push(accuracy);
    }

    let mean_accuracy = fold_accuracies.iter().sum::<f64>() / n_folds as f64;
    let variance = fold_accuracies
        .iter()
        .map(|a| (a - mean_accuracy).powi(2))
        .sum::<f64>()
        / n_folds as f64;

    info!("Mean cross-validation accuracy: {:.4}", mean_accuracy);

    Ok(CrossValidationResult {
        algorithm: classifier.name().to_string(),
        n_folds,
        fold_accuracies,
        mean_accuracy,
        std_accuracy: variance.sqrt(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::{NaiveBayesClassifier, SvmClassifier};
    use ndarray::Array2;

    #[test]
    fn test_kfold_partitions_every_index_once() {
        let labels = [1, 0, 0, 1, 0, 0, 1, 0, 0, 0];
        let folds = kfold_indices(&labels, 3, 42);
        assert_eq!(folds.len(), 3);

        let sizes: Vec<usize> = folds.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![4, 3, 3]);

        let mut all: Vec<usize> = folds.into_iter().flatten().collect();
        all.sort();
        assert_eq!(all, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_kfold_spreads_each_class_across_folds() {
        // 3 positives among 20 documents
        let labels: Vec<u8> = (0..20).map(|i| u8::from(i % 7 == 0)).collect();

        for seed in 0..10 {
            let folds = kfold_indices(&labels, 3, seed);
            for fold in &folds {
                let positives = fold.iter().filter(|&&i| labels[i] == 1).count();
                assert_eq!(positives, 1, "seed {}", seed);
            }
        }
    }

    #[test]
    fn test_cross_validate_on_separable_data() {
        // Even rows use term 0 (class 1), odd rows use term 1 (class 0)
        let n = 16;
        let matrix = Array2::from_shape_fn((n, 2), |(i, j)| if i % 2 == j { 3.0 } else { 0.0 });
        let labels: Vec<u8> = (0..n).map(|i| if i % 2 == 0 { 1 } else { 0 }).collect();

        let container = Container::new(matrix, labels, 0.75).unwrap();
        let result = cross_validate(&container, &NaiveBayesClassifier::new(), 3, 1).unwrap();

        assert_eq!(result.fold_accuracies.len(), 3);
        assert_eq!(result.mean_accuracy, 1.0);
        assert_eq!(result.std_accuracy, 0.0);
        assert_eq!(result.algorithm, "NaiveBayes");
    }

    #[test]
    fn test_rare_positive_class_keeps_both_classes_in_training() {
        // 2 bullying traces among 30 documents, all inside the training partition
        let n = 30;
        let labels: Vec<u8> = (0..n).map(|i| u8::from(i == 3 || i == 11)).collect();
        let matrix = Array2::from_shape_fn((n, 2), |(i, j)| {
            let positive = labels[i] == 1;
            match (positive, j) {
                (true, 0) | (false, 1) => 1.0,
                _ => 0.1 * (i % 3) as f64,
            }
        });

        let container = Container::new(matrix, labels, 0.9).unwrap();
        for seed in [0, 1, 7, 42, 1234] {
            let result = cross_validate(&container, &SvmClassifier::new(), 3, seed);
            assert!(result.is_ok(), "seed {}: {:?}", seed, result.err());
        }
    }

    #[test]
    fn test_cross_validate_rejects_bad_fold_counts() {
        let matrix = Array2::<f64>::zeros((4, 2));
        let container = Container::new(matrix, vec![0, 1, 0, 1], 0.5).unwrap();

        assert!(cross_validate(&container, &NaiveBayesClassifier::new(), 1, 0).is_err());
        assert!(cross_validate(&container, &NaiveBayesClassifier::new(), 3, 0).is_err());
    }
}
