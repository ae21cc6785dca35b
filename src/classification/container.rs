//! Train/test container
//!
//! Pairs a document-term matrix with its labels and a fixed partition into
//! training and test rows.

use super::ModelError;
use ndarray::{Array2, Axis};
use rand::prelude::*;

/// Document-term matrix with labels and a train/test partition
#[derive(Debug, Clone)]
pub struct Container {
    matrix: Array2<f64>,
    labels: Vec<u8>,
    train_indices: Vec<usize>,
    test_indices: Vec<usize>,
}

impl Container {
    /// Split contiguously: the first `floor(n * train_ratio)` rows train, the rest test
    pub fn new(matrix: Array2<f64>, labels: Vec<u8>, train_ratio: f64) -> Result<Self, ModelError> {
        let order: Vec<usize> = (0..labels.len()).collect();
        Self::with_order(matrix, labels, order, train_ratio)
    }

    /// Split after a seeded shuffle of the rows
    pub fn shuffled(
        matrix: Array2<f64>,
        labels: Vec<u8>,
        train_ratio: f64,
        seed: u64,
    ) -> Result<Self, ModelError> {
        let mut order: Vec<usize> = (0..labels.len()).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        order.shuffle(&mut rng);
        Self::with_order(matrix, labels, order, train_ratio)
    }

    fn with_order(
        matrix: Array2<f64>,
        labels: Vec<u8>,
        order: Vec<usize>,
        train_ratio: f64,
    ) -> Result<Self, ModelError> {
        if matrix.nrows() != labels.len() {
            return Err(ModelError::InvalidData(format!(
                "{} documents but {} labels",
                matrix.nrows(),
                labels.len()
            )));
        }
        if !(train_ratio > 0.0 && train_ratio < 1.0) {
            return Err(ModelError::InvalidData(format!(
                "Train ratio must be in (0, 1), got {}",
                train_ratio
            )));
        }

        let n = labels.len();
        let n_train = (n as f64 * train_ratio).floor() as usize;
        if n_train == 0 || n_train >= n {
            return Err(ModelError::InvalidData(format!(
                "Cannot split {} documents with ratio {}: a partition would be empty",
                n, train_ratio
            )));
        }

        let test_indices = order[n_train..].to_vec();
        let mut train_indices = order;
        train_indices.truncate(n_train);

        Ok(Self {
            matrix,
            labels,
            train_indices,
            test_indices,
        })
    }

    /// Full matrix
    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    /// All labels
    pub fn labels(&self) -> &[u8] {
        &self.labels
    }

    /// Row indices of the training partition
    pub fn train_indices(&self) -> &[usize] {
        &self.train_indices
    }

    /// Row indices of the test partition
    pub fn test_indices(&self) -> &[usize] {
        &self.test_indices
    }

    pub fn train_size(&self) -> usize {
        self.train_indices.len()
    }

    pub fn test_size(&self) -> usize {
        self.test_indices.len()
    }

    pub fn n_features(&self) -> usize {
        self.matrix.ncols()
    }

    /// Copy of the given rows
    pub fn rows(&self, indices: &[usize]) -> Array2<f64> {
        self.matrix.select(Axis(0), indices)
    }

    /// Labels of the given rows
    pub fn labels_of(&self, indices: &[usize]) -> Vec<u8> {
        indices.iter().map(|&i| self.labels[i]).collect()
    }

    pub fn train_matrix(&self) -> Array2<f64> {
        self.rows(&self.train_indices)
    }

    pub fn test_matrix(&self) -> Array2<f64> {
        self.rows(&self.test_indices)
    }

    pub fn train_labels(&self) -> Vec<u8> {
        self.labels_of(&self.train_indices)
    }

    pub fn test_labels(&self) -> Vec<u8> {
        self.labels_of(&self.test_indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(n: usize) -> Array2<f64> {
        Array2::from_shape_fn((n, 2), |(i, j)| (i * 2 + j) as f64)
    }

    #[test]
    fn test_contiguous_split() {
        let labels: Vec<u8> = (0..10).map(|i| (i % 2) as u8).collect();
        let container = Container::new(matrix(10), labels, 0.9).unwrap();

        assert_eq!(container.train_size(), 9);
        assert_eq!(container.test_size(), 1);
        assert_eq!(container.test_indices(), &[9]);
        assert_eq!(container.test_matrix()[[0, 0]], 18.0);
        assert_eq!(container.test_labels(), vec![1]);
    }

    #[test]
    fn test_shuffled_split_is_partition() {
        let labels = vec![0u8; 20];
        let container = Container::shuffled(matrix(20), labels, 0.75, 7).unwrap();

        let mut all: Vec<usize> = container
            .train_indices()
            .iter()
            .chain(container.test_indices())
            .copied()
            .collect();
        all.sort();

        assert_eq!(container.train_size(), 15);
        assert_eq!(all, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_shuffle_is_reproducible() {
        let a = Container::shuffled(matrix(12), vec![0; 12], 0.5, 3).unwrap();
        let b = Container::shuffled(matrix(12), vec![0; 12], 0.5, 3).unwrap();
        assert_eq!(a.train_indices(), b.train_indices());
    }

    #[test]
    fn test_invalid_splits() {
        assert!(Container::new(matrix(3), vec![0, 1], 0.5).is_err());
        assert!(Container::new(matrix(1), vec![0], 0.9).is_err());
        assert!(Container::new(matrix(5), vec![0; 5], 1.0).is_err());
    }
}
