//! Evaluation metrics for topic models

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Topic quality metrics over a reference document-term matrix
pub struct Evaluator<'a> {
    dtm: ArrayView2<'a, f64>,
    vocabulary: HashMap<&'a str, usize>,
}

impl<'a> Evaluator<'a> {
    /// Evaluate against `dtm`, whose columns are named by `terms`
    pub fn new(dtm: ArrayView2<'a, f64>, terms: &'a [String]) -> Self {
        let vocabulary = terms
            .iter()
            .enumerate()
            .map(|(i, w)| (w.as_str(), i))
            .collect();
        Self { dtm, vocabulary }
    }

    /// Number of documents containing the word
    fn doc_freq(&self, word_idx: usize) -> usize {
        self.dtm.column(word_idx).iter().filter(|&&x| x > 0.0).count()
    }

    /// Number of documents containing both words
    fn co_doc_freq(&self, w1: usize, w2: usize) -> usize {
        self.dtm
            .outer_iter()
            .filter(|row| row[w1] > 0.0 && row[w2] > 0.0)
            .count()
    }

    /// UMass coherence of a ranked word list
    ///
    /// Averages `ln((D(wi, wj) + 1) / D(wj))` over pairs where `wj` ranks above `wi`.
    /// Higher (less negative) values indicate more coherent topics. `None` when
    /// fewer than two words are in the vocabulary.
    pub fn umass_coherence(&self, top_words: &[String]) -> Option<f64> {
        let word_indices: Vec<usize> = top_words
            .iter()
            .filter_map(|w| self.vocabulary.get(w.as_str()).copied())
            .collect();

        if word_indices.len() < 2 {
            return None;
        }

        let mut coherence = 0.0;
        let mut pair_count = 0;

        for (i, &wi) in word_indices.iter().enumerate().skip(1) {
            for &wj in &word_indices[..i] {
                let d_wj = self.doc_freq(wj);
                if d_wj == 0 {
                    continue;
                }
                let d_both = self.co_doc_freq(wi, wj) as f64;
                coherence += ((d_both + 1.0) / d_wj as f64).ln();
                pair_count += 1;
            }
        }

        if pair_count > 0 {
            Some(coherence / pair_count as f64)
        } else {
            None
        }
    }

    /// Share of unique words across all topics' top words
    ///
    /// 1.0 means no word is shared between topics.
    pub fn topic_diversity(topics: &[Vec<String>]) -> f64 {
        let all_words: Vec<&str> = topics.iter().flatten().map(String::as_str).collect();
        if all_words.is_empty() {
            return 0.0;
        }

        let unique_words: HashSet<&str> = all_words.iter().copied().collect();
        unique_words.len() as f64 / all_words.len() as f64
    }

    /// Jaccard similarity between two topics' word sets
    pub fn topic_overlap(topic1: &[String], topic2: &[String]) -> f64 {
        let set1: HashSet<&str> = topic1.iter().map(String::as_str).collect();
        let set2: HashSet<&str> = topic2.iter().map(String::as_str).collect();

        let union = set1.union(&set2).count();
        if union == 0 {
            return 0.0;
        }

        set1.intersection(&set2).count() as f64 / union as f64
    }

    /// Pairwise overlap between all topics
    pub fn topic_overlap_matrix(topics: &[Vec<String>]) -> Array2<f64> {
        let n = topics.len();
        Array2::from_shape_fn((n, n), |(i, j)| Self::topic_overlap(&topics[i], &topics[j]))
    }

    /// Mean overlap over distinct topic pairs
    pub fn mean_topic_overlap(topics: &[Vec<String>]) -> f64 {
        let n = topics.len();
        if n < 2 {
            return 0.0;
        }

        let mut total = 0.0;
        for i in 0..n {
            for j in (i + 1)..n {
                total += Self::topic_overlap(&topics[i], &topics[j]);
            }
        }
        total / (n * (n - 1) / 2) as f64
    }
}

/// Summary statistics for a topic model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSummary {
    pub n_topics: usize,
    /// Mean UMass coherence over topics where it is defined
    pub avg_coherence: Option<f64>,
    pub diversity: f64,
    /// Mean Jaccard overlap between topic pairs
    pub mean_overlap: f64,
    pub topic_coherences: Vec<Option<f64>>,
    pub perplexity: Option<f64>,
}

impl ModelSummary {
    /// Summarize topics given as ranked word lists
    pub fn from_topics(topics: &[Vec<String>], evaluator: &Evaluator<'_>, perplexity: Option<f64>) -> Self {
        let topic_coherences: Vec<Option<f64>> = topics
            .iter()
            .map(|words| evaluator.umass_coherence(words))
            .collect();

        let defined: Vec<f64> = topic_coherences.iter().flatten().copied().collect();
        let avg_coherence = if defined.is_empty() {
            None
        } else {
            Some(defined.iter().sum::<f64>() / defined.len() as f64)
        };

        Self {
            n_topics: topics.len(),
            avg_coherence,
            diversity: Evaluator::topic_diversity(topics),
            mean_overlap: Evaluator::mean_topic_overlap(topics),
            topic_coherences,
            perplexity,
        }
    }

    /// Print summary to console
    pub fn print(&self) {
        println!("=== Topic Model Summary ===");
        println!("Number of topics: {}", self.n_topics);

        if let Some(coh) = self.avg_coherence {
            println!("Average coherence: {:.4}", coh);
        }
        println!("Topic diversity: {:.4}", self.diversity);
        println!("Mean topic overlap: {:.4}", self.mean_overlap);

        if let Some(perp) = self.perplexity {
            println!("Perplexity: {:.2}", perp);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_topic_diversity() {
        let distinct = vec![words(&["loser", "ugly"]), words(&["game", "team"])];
        assert_eq!(Evaluator::topic_diversity(&distinct), 1.0);

        let shared = vec![words(&["loser", "ugly"]), words(&["loser", "game"])];
        assert_relative_eq!(Evaluator::topic_diversity(&shared), 0.75);

        assert_eq!(Evaluator::topic_diversity(&[]), 0.0);
    }

    #[test]
    fn test_topic_overlap() {
        let a = words(&["loser", "ugly"]);
        let b = words(&["loser", "game"]);

        assert_relative_eq!(Evaluator::topic_overlap(&a, &b), 1.0 / 3.0);
        assert_relative_eq!(Evaluator::mean_topic_overlap(&[a.clone(), b.clone()]), 1.0 / 3.0);

        let matrix = Evaluator::topic_overlap_matrix(&[a, b]);
        assert_eq!(matrix[[0, 0]], 1.0);
        assert_relative_eq!(matrix[[0, 1]], matrix[[1, 0]]);
    }

    #[test]
    fn test_umass_coherence() {
        // word1 and word2 always co-occur; word3 appears alone
        let dtm = Array2::from_shape_vec(
            (4, 3),
            vec![1.0, 1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
        )
        .unwrap();
        let vocab = words(&["word1", "word2", "word3"]);
        let evaluator = Evaluator::new(dtm.view(), &vocab);

        let together = evaluator.umass_coherence(&words(&["word1", "word2"])).unwrap();
        let apart = evaluator.umass_coherence(&words(&["word1", "word3"])).unwrap();

        assert_relative_eq!(together, (3.0_f64 / 2.0).ln());
        assert!(together > apart);
        assert!(evaluator.umass_coherence(&words(&["word1", "missing"])).is_none());
    }

    #[test]
    fn test_model_summary() {
        let dtm = Array2::from_shape_vec((2, 2), vec![1.0, 1.0, 1.0, 0.0]).unwrap();
        let vocab = words(&["a", "b"]);
        let evaluator = Evaluator::new(dtm.view(), &vocab);

        let topics = vec![words(&["a", "b"]), words(&["b"])];
        let summary = ModelSummary::from_topics(&topics, &evaluator, Some(3.0));

        assert_eq!(summary.n_topics, 2);
        assert!(summary.topic_coherences[0].is_some());
        assert!(summary.topic_coherences[1].is_none());
        assert_eq!(summary.avg_coherence, summary.topic_coherences[0]);
        assert_eq!(summary.perplexity, Some(3.0));
    }
}
