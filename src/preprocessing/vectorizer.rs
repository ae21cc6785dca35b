//! Document-term matrix construction
//!
//! Provides TF-IDF and count vectorization for converting
//! tokenized tweets into numerical matrices.

use hashbrown::HashMap;
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Errors raised by the vectorizers
#[derive(Error, Debug, PartialEq)]
pub enum VectorizerError {
    #[error("Vectorizer must be fitted before transform")]
    NotFitted,

    #[error("Vocabulary is empty after term filtering")]
    EmptyVocabulary,
}

/// Term frequency computation methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TfMethod {
    /// Raw term count
    Raw,
    /// Boolean: 1 if term present, 0 otherwise
    Binary,
    /// Log-normalized: 1 + log(tf)
    LogNorm,
    /// Double normalization: 0.5 + 0.5 * (tf / max_tf)
    DoubleNorm,
    /// Relative frequency: tf / document length
    Normalized,
}

/// Inverse document frequency computation methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdfMethod {
    /// Standard IDF: ln(N / df)
    Standard,
    /// Smooth IDF: ln(N / (1 + df)) + 1
    Smooth,
    /// Probabilistic IDF: ln((N - df) / df)
    Probabilistic,
    /// Base-2 IDF: log2(N / df)
    Log2,
}

/// Document frequency filters shared by both vectorizers
#[derive(Debug, Clone)]
struct TermFilter {
    min_df: usize,
    max_df_ratio: f64,
    max_sparsity: Option<f64>,
    max_features: Option<usize>,
}

impl Default for TermFilter {
    fn default() -> Self {
        Self {
            min_df: 1,
            max_df_ratio: 1.0,
            max_sparsity: None,
            max_features: None,
        }
    }
}

/// Term statistics gathered while fitting
struct TermStats {
    term: String,
    doc_freq: usize,
    total_freq: usize,
}

impl TermFilter {
    /// Select the vocabulary, returned in alphabetical order
    ///
    /// When `max_features` truncates, terms are ranked by document frequency
    /// (`rank_by_total == false`) or by total occurrences.
    fn select(&self, tokenized_docs: &[Vec<String>], rank_by_total: bool) -> Vec<TermStats> {
        let n_docs = tokenized_docs.len();

        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        let mut total_freq: HashMap<&str, usize> = HashMap::new();

        for doc in tokenized_docs {
            let unique_terms: HashSet<&str> = doc.iter().map(String::as_str).collect();
            for term in unique_terms {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
            for term in doc {
                *total_freq.entry(term.as_str()).or_insert(0) += 1;
            }
        }

        let max_df = (n_docs as f64 * self.max_df_ratio) as usize;
        // A term is kept when its share of documents lacking it does not exceed max_sparsity
        let sparsity_floor = self.max_sparsity.map(|s| n_docs as f64 * (1.0 - s));

        let mut terms: Vec<TermStats> = doc_freq
            .into_iter()
            .filter(|(_, df)| *df >= self.min_df && *df <= max_df)
            .filter(|(_, df)| sparsity_floor.map_or(true, |floor| *df as f64 > floor))
            .map(|(term, df)| TermStats {
                term: term.to_string(),
                doc_freq: df,
                total_freq: total_freq.get(term).copied().unwrap_or(0),
            })
            .collect();

        if let Some(max) = self.max_features {
            if rank_by_total {
                terms.sort_by(|a, b| b.total_freq.cmp(&a.total_freq).then_with(|| a.term.cmp(&b.term)));
            } else {
                terms.sort_by(|a, b| b.doc_freq.cmp(&a.doc_freq).then_with(|| a.term.cmp(&b.term)));
            }
            terms.truncate(max);
        }

        // Sort alphabetically for consistent vocabulary ordering
        terms.sort_by(|a, b| a.term.cmp(&b.term));
        terms
    }
}

/// TF-IDF Vectorizer
///
/// Converts tokenized documents into TF-IDF feature matrices. The defaults
/// (relative term frequency, base-2 IDF) weight a term that occurs in every
/// document at zero.
#[derive(Debug, Clone)]
pub struct TfIdfVectorizer {
    /// Vocabulary: term -> index mapping
    vocabulary: HashMap<String, usize>,
    /// Inverse vocabulary: index -> term
    inverse_vocabulary: Vec<String>,
    /// Document frequencies for each term
    document_frequencies: Vec<usize>,
    /// Total number of documents seen during fitting
    n_documents: usize,
    tf_method: TfMethod,
    idf_method: IdfMethod,
    filter: TermFilter,
    /// IDF values (computed during fit)
    idf_values: Vec<f64>,
    is_fitted: bool,
}

impl TfIdfVectorizer {
    /// Create a new TF-IDF vectorizer with default settings
    pub fn new() -> Self {
        Self {
            vocabulary: HashMap::new(),
            inverse_vocabulary: Vec::new(),
            document_frequencies: Vec::new(),
            n_documents: 0,
            tf_method: TfMethod::Normalized,
            idf_method: IdfMethod::Log2,
            filter: TermFilter::default(),
            idf_values: Vec::new(),
            is_fitted: false,
        }
    }

    /// Set TF computation method
    pub fn tf_method(mut self, method: TfMethod) -> Self {
        self.tf_method = method;
        self
    }

    /// Set IDF computation method
    pub fn idf_method(mut self, method: IdfMethod) -> Self {
        self.idf_method = method;
        self
    }

    /// Set minimum document frequency
    pub fn min_df(mut self, min_df: usize) -> Self {
        self.filter.min_df = min_df;
        self
    }

    /// Set maximum document frequency ratio
    pub fn max_df_ratio(mut self, ratio: f64) -> Self {
        self.filter.max_df_ratio = ratio;
        self
    }

    /// Remove terms missing from more than `sparsity` of the documents
    pub fn max_sparsity(mut self, sparsity: f64) -> Self {
        self.filter.max_sparsity = Some(sparsity);
        self
    }

    /// Set maximum vocabulary size
    pub fn max_features(mut self, max: usize) -> Self {
        self.filter.max_features = Some(max);
        self
    }

    /// Fit the vectorizer on tokenized documents
    pub fn fit(&mut self, tokenized_docs: &[Vec<String>]) {
        self.n_documents = tokenized_docs.len();

        self.vocabulary.clear();
        self.inverse_vocabulary.clear();
        self.document_frequencies.clear();

        for (idx, stats) in self.filter.select(tokenized_docs, false).into_iter().enumerate() {
            self.vocabulary.insert(stats.term.clone(), idx);
            self.inverse_vocabulary.push(stats.term);
            self.document_frequencies.push(stats.doc_freq);
        }

        self.idf_values = self
            .document_frequencies
            .iter()
            .map(|&df| self.compute_idf(df))
            .collect();
        self.is_fitted = true;
    }

    /// Compute IDF for a single term
    fn compute_idf(&self, df: usize) -> f64 {
        let n = self.n_documents as f64;
        let df = df as f64;

        match self.idf_method {
            IdfMethod::Standard => (n / df).ln(),
            IdfMethod::Smooth => (n / (1.0 + df)).ln() + 1.0,
            IdfMethod::Probabilistic => ((n - df) / df).ln().max(0.0),
            IdfMethod::Log2 => (n / df).log2(),
        }
    }

    /// Compute TF for a term count
    fn compute_tf(&self, count: usize, max_count: usize, doc_length: usize) -> f64 {
        let count = count as f64;
        if count <= 0.0 {
            return 0.0;
        }

        match self.tf_method {
            TfMethod::Raw => count,
            TfMethod::Binary => 1.0,
            TfMethod::LogNorm => 1.0 + count.ln(),
            TfMethod::DoubleNorm => 0.5 + 0.5 * (count / max_count.max(1) as f64),
            TfMethod::Normalized => count / doc_length.max(1) as f64,
        }
    }

    /// Transform tokenized documents into a TF-IDF matrix
    ///
    /// Returns a matrix of shape (n_documents, n_features). Normalized term
    /// frequencies divide by the full token count of the document, including
    /// tokens removed by term filtering.
    pub fn transform(&self, tokenized_docs: &[Vec<String>]) -> Result<Array2<f64>, VectorizerError> {
        if !self.is_fitted {
            return Err(VectorizerError::NotFitted);
        }

        let mut matrix = Array2::zeros((tokenized_docs.len(), self.vocabulary.len()));

        for (doc_idx, doc) in tokenized_docs.iter().enumerate() {
            let mut term_counts: HashMap<usize, usize> = HashMap::new();
            for term in doc {
                if let Some(&term_idx) = self.vocabulary.get(term.as_str()) {
                    *term_counts.entry(term_idx).or_insert(0) += 1;
                }
            }

            let doc_length = doc.len();
            let max_count = term_counts.values().copied().max().unwrap_or(1);

            for (&term_idx, &count) in &term_counts {
                let tf = self.compute_tf(count, max_count, doc_length);
                matrix[[doc_idx, term_idx]] = tf * self.idf_values[term_idx];
            }
        }

        Ok(matrix)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, tokenized_docs: &[Vec<String>]) -> Result<Array2<f64>, VectorizerError> {
        self.fit(tokenized_docs);
        self.transform(tokenized_docs)
    }

    /// Fit, transform and wrap the result with its vocabulary
    pub fn fit_transform_dtm(
        &mut self,
        tokenized_docs: &[Vec<String>],
        document_ids: Vec<String>,
    ) -> Result<DocumentTermMatrix, VectorizerError> {
        let matrix = self.fit_transform(tokenized_docs)?;
        if self.vocabulary.is_empty() {
            return Err(VectorizerError::EmptyVocabulary);
        }
        Ok(DocumentTermMatrix::new(
            matrix,
            self.vocabulary.clone(),
            self.inverse_vocabulary.clone(),
            document_ids,
        ))
    }

    /// Get the vocabulary
    pub fn get_vocabulary(&self) -> &HashMap<String, usize> {
        &self.vocabulary
    }

    /// Terms in column order
    pub fn terms(&self) -> &[String] {
        &self.inverse_vocabulary
    }

    /// Get vocabulary size
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }
}

impl Default for TfIdfVectorizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Count Vectorizer (Bag of Words)
///
/// Converts tokenized documents into term count matrices, the input
/// expected by the topic model.
#[derive(Debug, Clone)]
pub struct CountVectorizer {
    /// Vocabulary: term -> index mapping
    vocabulary: HashMap<String, usize>,
    /// Inverse vocabulary: index -> term
    inverse_vocabulary: Vec<String>,
    filter: TermFilter,
    is_fitted: bool,
}

impl CountVectorizer {
    /// Create a new count vectorizer
    pub fn new() -> Self {
        Self {
            vocabulary: HashMap::new(),
            inverse_vocabulary: Vec::new(),
            filter: TermFilter::default(),
            is_fitted: false,
        }
    }

    /// Set minimum document frequency
    pub fn min_df(mut self, min_df: usize) -> Self {
        self.filter.min_df = min_df;
        self
    }

    /// Set maximum document frequency ratio
    pub fn max_df_ratio(mut self, ratio: f64) -> Self {
        self.filter.max_df_ratio = ratio;
        self
    }

    /// Remove terms missing from more than `sparsity` of the documents
    pub fn max_sparsity(mut self, sparsity: f64) -> Self {
        self.filter.max_sparsity = Some(sparsity);
        self
    }

    /// Set maximum vocabulary size
    pub fn max_features(mut self, max: usize) -> Self {
        self.filter.max_features = Some(max);
        self
    }

    /// Fit the vectorizer
    pub fn fit(&mut self, tokenized_docs: &[Vec<String>]) {
        self.vocabulary.clear();
        self.inverse_vocabulary.clear();

        for (idx, stats) in self.filter.select(tokenized_docs, true).into_iter().enumerate() {
            self.vocabulary.insert(stats.term.clone(), idx);
            self.inverse_vocabulary.push(stats.term);
        }

        self.is_fitted = true;
    }

    /// Transform tokenized documents into a count matrix
    pub fn transform(&self, tokenized_docs: &[Vec<String>]) -> Result<Array2<f64>, VectorizerError> {
        if !self.is_fitted {
            return Err(VectorizerError::NotFitted);
        }

        let mut matrix = Array2::zeros((tokenized_docs.len(), self.vocabulary.len()));

        for (doc_idx, doc) in tokenized_docs.iter().enumerate() {
            for term in doc {
                if let Some(&term_idx) = self.vocabulary.get(term.as_str()) {
                    matrix[[doc_idx, term_idx]] += 1.0;
                }
            }
        }

        Ok(matrix)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, tokenized_docs: &[Vec<String>]) -> Result<Array2<f64>, VectorizerError> {
        self.fit(tokenized_docs);
        self.transform(tokenized_docs)
    }

    /// Fit, transform and wrap the result with its vocabulary
    pub fn fit_transform_dtm(
        &mut self,
        tokenized_docs: &[Vec<String>],
        document_ids: Vec<String>,
    ) -> Result<DocumentTermMatrix, VectorizerError> {
        let matrix = self.fit_transform(tokenized_docs)?;
        if self.vocabulary.is_empty() {
            return Err(VectorizerError::EmptyVocabulary);
        }
        Ok(DocumentTermMatrix::new(
            matrix,
            self.vocabulary.clone(),
            self.inverse_vocabulary.clone(),
            document_ids,
        ))
    }

    /// Get the vocabulary
    pub fn get_vocabulary(&self) -> &HashMap<String, usize> {
        &self.vocabulary
    }

    /// Terms in column order
    pub fn terms(&self) -> &[String] {
        &self.inverse_vocabulary
    }

    /// Get vocabulary size
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }
}

impl Default for CountVectorizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Document-Term Matrix wrapper with metadata
#[derive(Debug, Clone)]
pub struct DocumentTermMatrix {
    /// The actual matrix (n_documents x n_terms)
    pub matrix: Array2<f64>,
    /// Vocabulary mapping
    pub vocabulary: HashMap<String, usize>,
    /// Inverse vocabulary
    pub terms: Vec<String>,
    /// Document IDs
    pub document_ids: Vec<String>,
}

impl DocumentTermMatrix {
    /// Create a new DTM from components
    pub fn new(
        matrix: Array2<f64>,
        vocabulary: HashMap<String, usize>,
        terms: Vec<String>,
        document_ids: Vec<String>,
    ) -> Self {
        Self {
            matrix,
            vocabulary,
            terms,
            document_ids,
        }
    }

    /// Get matrix dimensions
    pub fn shape(&self) -> (usize, usize) {
        (self.matrix.nrows(), self.matrix.ncols())
    }

    /// Get number of documents
    pub fn n_documents(&self) -> usize {
        self.matrix.nrows()
    }

    /// Get number of terms
    pub fn n_terms(&self) -> usize {
        self.matrix.ncols()
    }

    /// Share of zero cells
    pub fn sparsity(&self) -> f64 {
        let total = self.matrix.len();
        if total == 0 {
            return 1.0;
        }
        let zeros = self.matrix.iter().filter(|&&v| v == 0.0).count();
        zeros as f64 / total as f64
    }

    /// Get document vector by index
    pub fn get_document(&self, idx: usize) -> Option<Array1<f64>> {
        if idx < self.n_documents() {
            Some(self.matrix.row(idx).to_owned())
        } else {
            None
        }
    }

    /// Get term vector (all documents for one term)
    pub fn get_term_vector(&self, term: &str) -> Option<Array1<f64>> {
        self.vocabulary
            .get(term)
            .map(|&idx| self.matrix.column(idx).to_owned())
    }

    /// Indices of documents with at least one non-zero cell
    pub fn non_empty_rows(&self) -> Vec<usize> {
        self.matrix
            .axis_iter(Axis(0))
            .enumerate()
            .filter(|(_, row)| row.iter().any(|&v| v != 0.0))
            .map(|(idx, _)| idx)
            .collect()
    }

    /// New matrix restricted to the given rows, in the given order
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        let document_ids = rows
            .iter()
            .filter_map(|&r| self.document_ids.get(r).cloned())
            .collect();

        Self {
            matrix: self.matrix.select(Axis(0), rows),
            vocabulary: self.vocabulary.clone(),
            terms: self.terms.clone(),
            document_ids,
        }
    }

    /// Get top terms for a document
    pub fn top_terms_for_document(&self, doc_idx: usize, n: usize) -> Vec<(String, f64)> {
        if doc_idx >= self.n_documents() {
            return vec![];
        }

        let mut term_scores: Vec<(usize, f64)> = self
            .matrix
            .row(doc_idx)
            .iter()
            .enumerate()
            .filter(|(_, &score)| score > 0.0)
            .map(|(idx, &score)| (idx, score))
            .collect();

        term_scores.sort_by(|a, b| b.1.total_cmp(&a.1));
        term_scores.truncate(n);

        term_scores
            .into_iter()
            .filter_map(|(idx, score)| self.terms.get(idx).map(|term| (term.clone(), score)))
            .collect()
    }
}
