//! Latent Dirichlet Allocation (LDA)
//!
//! Collapsed Gibbs sampling over a document-term count matrix.

use ndarray::{Array1, Array2};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur during LDA computation
#[derive(Error, Debug)]
pub enum LdaError {
    #[error("Matrix dimensions mismatch: {0}")]
    DimensionMismatch(String),

    #[error("Number of topics must be positive")]
    InvalidTopicCount,

    #[error("Model not fitted yet")]
    NotFitted,

    #[error("Invalid hyperparameter: {0}")]
    InvalidParameter(String),
}

/// Topic representation with words and probabilities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LdaTopic {
    /// Topic index
    pub index: usize,
    /// Top words with their probabilities
    pub top_words: Vec<(String, f64)>,
    /// Share of corpus tokens assigned to the topic
    pub prevalence: f64,
}

impl LdaTopic {
    /// Top words without their probabilities
    pub fn words(&self) -> Vec<String> {
        self.top_words.iter().map(|(w, _)| w.clone()).collect()
    }
}

/// LDA model configuration
#[derive(Debug, Clone)]
pub struct LdaConfig {
    pub n_topics: usize,
    /// Document-topic prior
    pub alpha: f64,
    /// Topic-word prior
    pub beta: f64,
    /// Number of Gibbs sweeps
    pub n_iterations: usize,
    /// Sweeps before the log-likelihood is recorded
    pub burn_in: usize,
    /// Random seed for reproducibility
    pub random_seed: Option<u64>,
}

impl Default for LdaConfig {
    fn default() -> Self {
        Self::new(20)
    }
}

impl LdaConfig {
    /// Configuration with `k` topics and the usual `50 / k` document prior
    pub fn new(n_topics: usize) -> Self {
        Self {
            n_topics,
            alpha: 50.0 / n_topics.max(1) as f64,
            beta: 0.1,
            n_iterations: 1000,
            burn_in: 100,
            random_seed: None,
        }
    }

    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    pub fn n_iterations(mut self, n: usize) -> Self {
        self.n_iterations = n;
        self
    }

    pub fn burn_in(mut self, n: usize) -> Self {
        self.burn_in = n;
        self
    }

    pub fn random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }
}

/// Count state of the sampler
struct GibbsState {
    /// n_topics x n_words
    topic_word: Array2<f64>,
    /// n_docs x n_topics
    doc_topic: Array2<f64>,
    /// Tokens per topic
    topic_totals: Array1<f64>,
}

/// Latent Dirichlet Allocation model
#[derive(Debug)]
pub struct Lda {
    config: LdaConfig,
    topic_word_counts: Option<Array2<f64>>,
    doc_topic_counts: Option<Array2<f64>>,
    topic_counts: Option<Array1<f64>>,
    terms: Vec<String>,
    log_likelihood_history: Vec<f64>,
}

impl Lda {
    /// Create a new LDA model
    pub fn new(config: LdaConfig) -> Result<Self, LdaError> {
        if config.n_topics == 0 {
            return Err(LdaError::InvalidTopicCount);
        }
        if !(config.alpha > 0.0) {
            return Err(LdaError::InvalidParameter("alpha must be positive".into()));
        }
        if !(config.beta > 0.0) {
            return Err(LdaError::InvalidParameter("beta must be positive".into()));
        }

        Ok(Self {
            config,
            topic_word_counts: None,
            doc_topic_counts: None,
            topic_counts: None,
            terms: Vec::new(),
            log_likelihood_history: Vec::new(),
        })
    }

    /// Fit the model on a count matrix whose columns are named by `terms`
    pub fn fit(&mut self, dtm: &Array2<f64>, terms: Vec<String>) -> Result<(), LdaError> {
        self.fit_with_progress(dtm, terms, |_| {})
    }

    /// Fit the model, calling `on_iteration` after every Gibbs sweep
    pub fn fit_with_progress<F>(
        &mut self,
        dtm: &Array2<f64>,
        terms: Vec<String>,
        mut on_iteration: F,
    ) -> Result<(), LdaError>
    where
        F: FnMut(usize),
    {
        let n_docs = dtm.nrows();
        let n_words = dtm.ncols();
        let n_topics = self.config.n_topics;

        if n_docs == 0 || n_words == 0 {
            return Err(LdaError::DimensionMismatch("empty document-term matrix".into()));
        }
        if terms.len() != n_words {
            return Err(LdaError::DimensionMismatch(format!(
                "{} terms for {} columns",
                terms.len(),
                n_words
            )));
        }
        if dtm.iter().any(|&v| v < 0.0 || v.fract() != 0.0) {
            return Err(LdaError::InvalidParameter(
                "document-term matrix must hold non-negative integer counts".into(),
            ));
        }

        let mut rng = match self.config.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        // One entry per token: doc_tokens[doc] = [word_idx, ...]
        let doc_tokens: Vec<Vec<usize>> = dtm
            .outer_iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .flat_map(|(word_idx, &count)| std::iter::repeat(word_idx).take(count as usize))
                    .collect()
            })
            .collect();

        let n_tokens: usize = doc_tokens.iter().map(Vec::len).sum();
        info!(
            "Fitting LDA: {} documents, {} terms, {} tokens, {} topics",
            n_docs, n_words, n_tokens, n_topics
        );

        let mut state = GibbsState {
            topic_word: Array2::zeros((n_topics, n_words)),
            doc_topic: Array2::zeros((n_docs, n_topics)),
            topic_totals: Array1::zeros(n_topics),
        };

        // Random initial assignment
        let mut assignments: Vec<Vec<usize>> = Vec::with_capacity(n_docs);
        for (doc_idx, tokens) in doc_tokens.iter().enumerate() {
            let mut doc_assignments = Vec::with_capacity(tokens.len());
            for &word_idx in tokens {
                let topic = rng.gen_range(0..n_topics);
                doc_assignments.push(topic);
                state.topic_word[[topic, word_idx]] += 1.0;
                state.doc_topic[[doc_idx, topic]] += 1.0;
                state.topic_totals[topic] += 1.0;
            }
            assignments.push(doc_assignments);
        }

        self.log_likelihood_history.clear();
        let alpha = self.config.alpha;
        let beta = self.config.beta;
        let beta_sum = beta * n_words as f64;
        let mut weights = vec![0.0; n_topics];

        for iter in 0..self.config.n_iterations {
            for (doc_idx, tokens) in doc_tokens.iter().enumerate() {
                for (pos, &word_idx) in tokens.iter().enumerate() {
                    let old_topic = assignments[doc_idx][pos];
                    state.topic_word[[old_topic, word_idx]] -= 1.0;
                    state.doc_topic[[doc_idx, old_topic]] -= 1.0;
                    state.topic_totals[old_topic] -= 1.0;

                    // The document-length denominator is the same for every topic
                    // and cancels in the normalization
                    let mut total = 0.0;
                    for (topic, weight) in weights.iter_mut().enumerate() {
                        *weight = (state.doc_topic[[doc_idx, topic]] + alpha)
                            * (state.topic_word[[topic, word_idx]] + beta)
                            / (state.topic_totals[topic] + beta_sum);
                        total += *weight;
                    }
                    let new_topic = sample_index(&weights, total, &mut rng);

                    state.topic_word[[new_topic, word_idx]] += 1.0;
                    state.doc_topic[[doc_idx, new_topic]] += 1.0;
                    state.topic_totals[new_topic] += 1.0;
                    assignments[doc_idx][pos] = new_topic;
                }
            }

            if iter >= self.config.burn_in {
                let ll = log_likelihood(&state, alpha, beta, beta_sum);
                self.log_likelihood_history.push(ll);
                if (iter + 1) % 100 == 0 {
                    debug!("Iteration {}: log-likelihood {:.2}", iter + 1, ll);
                }
            }
            on_iteration(iter);
        }

        self.terms = terms;
        self.topic_word_counts = Some(state.topic_word);
        self.doc_topic_counts = Some(state.doc_topic);
        self.topic_counts = Some(state.topic_totals);

        info!("LDA fitted after {} iterations", self.config.n_iterations);
        Ok(())
    }

    /// Document-topic distribution (theta), one row per training document
    pub fn get_document_topics(&self) -> Result<Array2<f64>, LdaError> {
        let doc_topic_counts = self.doc_topic_counts.as_ref().ok_or(LdaError::NotFitted)?;

        let n_topics = self.config.n_topics;
        let alpha = self.config.alpha;
        let mut doc_topics = Array2::zeros(doc_topic_counts.raw_dim());

        for (doc_idx, counts) in doc_topic_counts.outer_iter().enumerate() {
            let doc_total = counts.sum() + n_topics as f64 * alpha;
            for topic in 0..n_topics {
                doc_topics[[doc_idx, topic]] = (counts[topic] + alpha) / doc_total;
            }
        }

        Ok(doc_topics)
    }

    /// Topic-word distribution (phi), one row per topic
    pub fn get_topic_words(&self) -> Result<Array2<f64>, LdaError> {
        let topic_word_counts = self.topic_word_counts.as_ref().ok_or(LdaError::NotFitted)?;
        let topic_counts = self.topic_counts.as_ref().ok_or(LdaError::NotFitted)?;

        let beta = self.config.beta;
        let beta_sum = beta * self.terms.len() as f64;

        let mut topic_words = topic_word_counts.mapv(|c| c + beta);
        for (topic, mut row) in topic_words.outer_iter_mut().enumerate() {
            row /= topic_counts[topic] + beta_sum;
        }

        Ok(topic_words)
    }

    /// Topics with their `n_words` most probable words
    pub fn get_topics(&self, n_words: usize) -> Result<Vec<LdaTopic>, LdaError> {
        let topic_words = self.get_topic_words()?;
        let topic_counts = self.topic_counts.as_ref().ok_or(LdaError::NotFitted)?;
        let total_tokens: f64 = topic_counts.sum();

        let topics = topic_words
            .outer_iter()
            .enumerate()
            .map(|(index, probs)| {
                let mut word_probs: Vec<(usize, f64)> = probs.iter().copied().enumerate().collect();
                word_probs.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
                word_probs.truncate(n_words);

                let top_words = word_probs
                    .into_iter()
                    .filter_map(|(idx, prob)| self.terms.get(idx).map(|term| (term.clone(), prob)))
                    .collect();

                let prevalence = if total_tokens > 0.0 {
                    topic_counts[index] / total_tokens
                } else {
                    0.0
                };

                LdaTopic {
                    index,
                    top_words,
                    prevalence,
                }
            })
            .collect();

        Ok(topics)
    }

    /// The `n` most probable terms of every topic
    pub fn top_terms(&self, n: usize) -> Result<Vec<Vec<String>>, LdaError> {
        Ok(self.get_topics(n)?.iter().map(LdaTopic::words).collect())
    }

    /// Most probable topic of every training document
    pub fn dominant_topics(&self) -> Result<Vec<usize>, LdaError> {
        let doc_topics = self.get_document_topics()?;

        Ok(doc_topics
            .outer_iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .fold((0, f64::NEG_INFINITY), |best, (topic, &p)| {
                        if p > best.1 {
                            (topic, p)
                        } else {
                            best
                        }
                    })
                    .0
            })
            .collect())
    }

    /// Infer topic distributions for unseen documents
    ///
    /// Each token goes to its most likely topic under the fitted phi; documents
    /// without known words get a uniform distribution.
    pub fn transform(&self, dtm: &Array2<f64>) -> Result<Array2<f64>, LdaError> {
        let topic_words = self.get_topic_words()?;

        let n_topics = self.config.n_topics;
        let n_words = self.terms.len();
        let alpha = self.config.alpha;

        if dtm.ncols() != n_words {
            return Err(LdaError::DimensionMismatch(format!(
                "expected {} columns, got {}",
                n_words,
                dtm.ncols()
            )));
        }

        let mut doc_topics = Array2::zeros((dtm.nrows(), n_topics));

        for (doc_idx, row) in dtm.outer_iter().enumerate() {
            let mut local_counts = Array1::<f64>::zeros(n_topics);

            for (word_idx, &count) in row.iter().enumerate() {
                if count <= 0.0 {
                    continue;
                }
                let best_topic = topic_words
                    .column(word_idx)
                    .iter()
                    .enumerate()
                    .fold((0, f64::NEG_INFINITY), |best, (topic, &p)| {
                        if p > best.1 {
                            (topic, p)
                        } else {
                            best
                        }
                    })
                    .0;
                local_counts[best_topic] += count;
            }

            let total = local_counts.sum() + n_topics as f64 * alpha;
            for topic in 0..n_topics {
                doc_topics[[doc_idx, topic]] = (local_counts[topic] + alpha) / total;
            }
        }

        Ok(doc_topics)
    }

    /// Perplexity of the training documents in `dtm`; lower is better
    pub fn perplexity(&self, dtm: &Array2<f64>) -> Result<f64, LdaError> {
        let doc_topics = self.get_document_topics()?;
        let topic_words = self.get_topic_words()?;

        if dtm.nrows() != doc_topics.nrows() || dtm.ncols() != topic_words.ncols() {
            return Err(LdaError::DimensionMismatch(format!(
                "model was fitted on {}x{}, got {}x{}",
                doc_topics.nrows(),
                topic_words.ncols(),
                dtm.nrows(),
                dtm.ncols()
            )));
        }

        let mut log_likelihood = 0.0;
        let mut total_words = 0.0;

        for (doc_idx, row) in dtm.outer_iter().enumerate() {
            let theta = doc_topics.row(doc_idx);
            for (word_idx, &count) in row.iter().enumerate() {
                if count > 0.0 {
                    // P(word | doc) = sum_k P(word | k) P(k | doc)
                    let prob = topic_words.column(word_idx).dot(&theta);
                    log_likelihood += count * prob.ln();
                    total_words += count;
                }
            }
        }

        if total_words == 0.0 {
            return Err(LdaError::DimensionMismatch("no tokens to score".into()));
        }

        Ok((-log_likelihood / total_words).exp())
    }

    /// Log-likelihood recorded after each post burn-in sweep
    pub fn log_likelihood_history(&self) -> &[f64] {
        &self.log_likelihood_history
    }

    pub fn config(&self) -> &LdaConfig {
        &self.config
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn is_fitted(&self) -> bool {
        self.topic_word_counts.is_some()
    }
}

/// Draw an index with probability proportional to its weight
fn sample_index(weights: &[f64], total: f64, rng: &mut StdRng) -> usize {
    let threshold = rng.gen::<f64>() * total;
    let mut cumsum = 0.0;
    for (idx, &w) in weights.iter().enumerate() {
        cumsum += w;
        if cumsum >= threshold {
            return idx;
        }
    }
    weights.len() - 1
}

/// Log-likelihood of the current assignment under the smoothed estimates
fn log_likelihood(state: &GibbsState, alpha: f64, beta: f64, beta_sum: f64) -> f64 {
    let mut ll = 0.0;
    let n_topics = state.topic_totals.len();

    for (topic, row) in state.topic_word.outer_iter().enumerate() {
        let denom = state.topic_totals[topic] + beta_sum;
        for &count in row.iter().filter(|&&c| c > 0.0) {
            ll += count * ((count + beta) / denom).ln();
        }
    }

    for row in state.doc_topic.outer_iter() {
        let denom = row.sum() + n_topics as f64 * alpha;
        for &count in row.iter().filter(|&&c| c > 0.0) {
            ll += count * ((count + alpha) / denom).ln();
        }
    }

    ll
}

impl std::fmt::Display for LdaTopic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Topic {}: (prevalence: {:.2}%) [",
            self.index + 1,
            self.prevalence * 100.0
        )?;
        for (i, (word, prob)) in self.top_words.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {:.3}", word, prob)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Two disjoint blocks of vocabulary:
    /// bullying words in docs 0-2, sports words in docs 3-5
    fn two_block_corpus() -> (Array2<f64>, Vec<String>) {
        let matrix = Array2::from_shape_vec(
            (6, 6),
            vec![
                3.0, 2.0, 2.0, 0.0, 0.0, 0.0, //
                2.0, 3.0, 1.0, 0.0, 0.0, 0.0, //
                1.0, 2.0, 3.0, 0.0, 0.0, 0.0, //
                0.0, 0.0, 0.0, 3.0, 2.0, 2.0, //
                0.0, 0.0, 0.0, 2.0, 3.0, 1.0, //
                0.0, 0.0, 0.0, 1.0, 2.0, 3.0, //
            ],
        )
        .unwrap();

        let terms = ["bulli", "loser", "ugli", "game", "team", "score"]
            .iter()
            .map(|t| t.to_string())
            .collect();

        (matrix, terms)
    }

    fn fitted_model() -> (Lda, Array2<f64>) {
        let (matrix, terms) = two_block_corpus();
        let config = LdaConfig::new(2)
            .alpha(0.1)
            .beta(0.01)
            .n_iterations(200)
            .burn_in(50)
            .random_seed(42);

        let mut lda = Lda::new(config).unwrap();
        lda.fit(&matrix, terms).unwrap();
        (lda, matrix)
    }

    #[test]
    fn test_lda_creation() {
        assert!(Lda::new(LdaConfig::new(5)).is_ok());
        assert!(matches!(Lda::new(LdaConfig::new(0)), Err(LdaError::InvalidTopicCount)));
        assert!(Lda::new(LdaConfig::new(2).beta(0.0)).is_err());
        assert!(Lda::new(LdaConfig::new(2).alpha(-1.0)).is_err());
    }

    #[test]
    fn test_nan_priors_are_rejected() {
        assert!(matches!(
            Lda::new(LdaConfig::new(2).alpha(f64::NAN)),
            Err(LdaError::InvalidParameter(_))
        ));
        assert!(matches!(
            Lda::new(LdaConfig::new(2).beta(f64::NAN)),
            Err(LdaError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_default_alpha_is_fifty_over_k() {
        assert_relative_eq!(LdaConfig::new(20).alpha, 2.5);
    }

    #[test]
    fn test_fit_rejects_bad_input() {
        let mut lda = Lda::new(LdaConfig::new(2)).unwrap();
        let empty = Array2::<f64>::zeros((0, 3));
        assert!(lda.fit(&empty, vec!["a".into(), "b".into(), "c".into()]).is_err());

        let (matrix, _) = two_block_corpus();
        assert!(lda.fit(&matrix, vec!["a".into()]).is_err());

        let fractional = Array2::from_elem((2, 2), 0.5);
        assert!(lda.fit(&fractional, vec!["a".into(), "b".into()]).is_err());
    }

    #[test]
    fn test_queries_before_fit() {
        let lda = Lda::new(LdaConfig::new(2)).unwrap();
        assert!(!lda.is_fitted());
        assert!(matches!(lda.get_topics(3), Err(LdaError::NotFitted)));
        assert!(matches!(lda.dominant_topics(), Err(LdaError::NotFitted)));
    }

    #[test]
    fn test_lda_separates_blocks() {
        let (lda, _) = fitted_model();
        let dominant = lda.dominant_topics().unwrap();
        assert_eq!(dominant.len(), 6);

        assert_eq!(dominant[0], dominant[1]);
        assert_eq!(dominant[1], dominant[2]);
        assert_eq!(dominant[3], dominant[4]);
        assert_eq!(dominant[4], dominant[5]);
        assert_ne!(dominant[0], dominant[3]);
    }

    #[test]
    fn test_top_terms_length_and_distributions() {
        let (lda, _) = fitted_model();

        let top = lda.top_terms(3).unwrap();
        assert_eq!(top.len(), 2);
        assert!(top.iter().all(|t| t.len() == 3));

        let phi = lda.get_topic_words().unwrap();
        for row in phi.outer_iter() {
            assert_relative_eq!(row.sum(), 1.0, epsilon = 1e-9);
        }
        let theta = lda.get_document_topics().unwrap();
        for row in theta.outer_iter() {
            assert_relative_eq!(row.sum(), 1.0, epsilon = 1e-9);
        }

        let prevalence: f64 = lda.get_topics(3).unwrap().iter().map(|t| t.prevalence).sum();
        assert_relative_eq!(prevalence, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_history_perplexity_and_transform() {
        let (lda, matrix) = fitted_model();

        assert_eq!(lda.log_likelihood_history().len(), 150);

        let perplexity = lda.perplexity(&matrix).unwrap();
        assert!(perplexity.is_finite() && perplexity >= 1.0);

        let unseen = Array2::from_shape_vec((2, 6), vec![0.0; 12]).unwrap();
        let theta = lda.transform(&unseen).unwrap();
        assert_relative_eq!(theta[[0, 0]], 0.5);
    }

    #[test]
    fn test_progress_callback_sees_every_sweep() {
        let (matrix, terms) = two_block_corpus();
        let mut lda = Lda::new(LdaConfig::new(2).n_iterations(25).burn_in(5).random_seed(1)).unwrap();

        let mut calls = 0;
        lda.fit_with_progress(&matrix, terms, |_| calls += 1).unwrap();
        assert_eq!(calls, 25);
    }

    #[test]
    fn test_same_seed_same_topics() {
        let (a, _) = fitted_model();
        let (b, _) = fitted_model();
        assert_eq!(a.top_terms(3).unwrap(), b.top_terms(3).unwrap());
    }
}
