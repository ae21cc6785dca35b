//! End-to-end workflows
//!
//! Classification: encode labels, tokenize, build a tf-idf matrix, split,
//! train and score, then cross-validate.
//!
//! Topic modeling: keep one language, tokenize, build a count matrix,
//! drop empty documents and fit LDA.

use crate::classification::{
    build_classifier, cross_validate, ClassificationMetrics, Container, ModelError,
};
use crate::config::{ConfigError, PipelineConfig};
use crate::data::{DataError, LabelEncoder, TweetDataset};
use crate::preprocessing::{CountVectorizer, TfIdfVectorizer, Tokenizer, VectorizerError};
use crate::report::{ClassificationReport, TopicReport};
use crate::topics::{Evaluator, Lda, LdaConfig, LdaError, ModelSummary};
use thiserror::Error;
use tracing::{info, warn};

/// Errors from either workflow
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Vectorizer(#[from] VectorizerError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Lda(#[from] LdaError),

    #[error("Empty corpus: {0}")]
    EmptyCorpus(String),
}

/// Map an empty vocabulary to `EmptyCorpus`
fn vocabulary_error(e: VectorizerError) -> PipelineError {
    match e {
        VectorizerError::EmptyVocabulary => PipelineError::EmptyCorpus(
            "no terms left after sparse-term removal".to_string(),
        ),
        other => PipelineError::Vectorizer(other),
    }
}

/// Train and evaluate the bullying-trace classifier
pub fn run_classification(
    dataset: &TweetDataset,
    config: &PipelineConfig,
) -> Result<ClassificationReport, PipelineError> {
    config.validate()?;
    if dataset.is_empty() {
        return Err(PipelineError::EmptyCorpus("dataset has no tweets".to_string()));
    }

    let labels = LabelEncoder::new().encode_all(dataset)?;
    let positives = labels.iter().filter(|&&l| l == 1).count();
    info!(
        "Classifying {} tweets ({} bullying, {} not bullying)",
        labels.len(),
        positives,
        labels.len() - positives
    );

    let tokenizer = Tokenizer::from_config(&config.preprocessing);
    let tokens = tokenizer.tokenize_documents(&dataset.texts());

    let mut vectorizer = TfIdfVectorizer::new()
        .tf_method(config.preprocessing.tf_method)
        .idf_method(config.preprocessing.idf_method)
        .max_sparsity(config.preprocessing.max_sparsity);
    if let Some(max) = config.preprocessing.max_features {
        vectorizer = vectorizer.max_features(max);
    }
    let dtm = vectorizer
        .fit_transform_dtm(&tokens, dataset.ids())
        .map_err(vocabulary_error)?;
    info!(
        "TF-IDF matrix: {} documents x {} terms (sparsity {:.3})",
        dtm.n_documents(),
        dtm.n_terms(),
        dtm.sparsity()
    );
    let (n_documents, n_terms) = dtm.shape();
    let sparsity = dtm.sparsity();

    let cc = &config.classification;
    let container = if cc.shuffle {
        Container::shuffled(dtm.matrix, labels, cc.train_ratio, cc.seed)?
    } else {
        Container::new(dtm.matrix, labels, cc.train_ratio)?
    };
    info!(
        "Split: {} training / {} test documents",
        container.train_size(),
        container.test_size()
    );

    let classifier = build_classifier(cc);
    let train_x = container.train_matrix();
    let test_x = container.test_matrix();
    let test_y = container.test_labels();
    let predictions = classifier.fit_predict(train_x.view(), &container.train_labels(), test_x.view())?;
    let test_metrics = ClassificationMetrics::from_predictions(&test_y, &predictions)?;
    info!("{} test accuracy: {:.4}", classifier.name(), test_metrics.accuracy);

    let cross_validation = cross_validate(&container, classifier.as_ref(), cc.n_folds, cc.seed)?;

    Ok(ClassificationReport {
        algorithm: classifier.name().to_string(),
        n_documents,
        n_terms,
        sparsity,
        train_size: container.train_size(),
        test_size: container.test_size(),
        test_metrics,
        cross_validation,
    })
}

/// Fit the topic model on tweets of the configured language
pub fn run_topic_model(
    dataset: &TweetDataset,
    config: &PipelineConfig,
) -> Result<TopicReport, PipelineError> {
    run_topic_model_with_progress(dataset, config, |_| {})
}

/// Same as [`run_topic_model`], reporting each finished Gibbs sweep
pub fn run_topic_model_with_progress<F>(
    dataset: &TweetDataset,
    config: &PipelineConfig,
    on_iteration: F,
) -> Result<TopicReport, PipelineError>
where
    F: FnMut(usize),
{
    config.validate()?;

    let language = &config.data.topic_language;
    let filtered = dataset.filter_language(language);
    if filtered.is_empty() {
        return Err(PipelineError::EmptyCorpus(format!(
            "no tweets with language '{}'",
            language
        )));
    }
    info!(
        "Topic modeling on {} of {} tweets (lang = {})",
        filtered.len(),
        dataset.len(),
        language
    );

    let tokenizer = Tokenizer::from_config(&config.preprocessing);
    let tokens = tokenizer.tokenize_documents(&filtered.texts());

    let mut vectorizer = CountVectorizer::new().max_sparsity(config.preprocessing.max_sparsity);
    if let Some(max) = config.preprocessing.max_features {
        vectorizer = vectorizer.max_features(max);
    }
    let dtm = vectorizer
        .fit_transform_dtm(&tokens, filtered.ids())
        .map_err(vocabulary_error)?;

    let kept = dtm.non_empty_rows();
    let n_dropped = dtm.n_documents() - kept.len();
    if kept.is_empty() {
        return Err(PipelineError::EmptyCorpus(
            "every document is empty after preprocessing".to_string(),
        ));
    }
    if n_dropped > 0 {
        warn!("Dropping {} documents with no remaining terms", n_dropped);
    }
    let dtm = dtm.select_rows(&kept);
    info!(
        "Count matrix: {} documents x {} terms",
        dtm.n_documents(),
        dtm.n_terms()
    );

    let tc = &config.topics;
    let lda_config = LdaConfig::new(tc.n_topics)
        .alpha(tc.effective_alpha())
        .beta(tc.beta)
        .n_iterations(tc.n_iterations)
        .burn_in(tc.burn_in)
        .random_seed(tc.seed);

    let mut lda = Lda::new(lda_config)?;
    lda.fit_with_progress(&dtm.matrix, dtm.terms.clone(), on_iteration)?;

    let topics = lda.get_topics(tc.n_top_terms)?;
    let perplexity = lda.perplexity(&dtm.matrix)?;

    let mut document_counts = vec![0usize; tc.n_topics];
    for topic in lda.dominant_topics()? {
        document_counts[topic] += 1;
    }

    let topic_words: Vec<Vec<String>> = topics.iter().map(|t| t.words()).collect();
    let evaluator = Evaluator::new(dtm.matrix.view(), &dtm.terms);
    let summary = ModelSummary::from_topics(&topic_words, &evaluator, Some(perplexity));

    Ok(TopicReport {
        language: language.clone(),
        n_documents: dtm.n_documents(),
        n_dropped,
        n_terms: dtm.n_terms(),
        alpha: lda.config().alpha,
        beta: lda.config().beta,
        topics,
        document_counts,
        final_log_likelihood: lda.log_likelihood_history().last().copied(),
        summary,
    })
}
