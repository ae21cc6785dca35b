//! End-to-end tests over CSV input

use approx::assert_relative_eq;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tweet_mining::config::Algorithm;
use tweet_mining::data::sample::sample_dataset;
use tweet_mining::data::DataError;
use tweet_mining::{
    run_classification, run_topic_model, PipelineConfig, PipelineError, Report, TweetDataset,
};

/// Write the sample corpus as a CSV file with the usual column names
fn write_sample_csv(dir: &Path) -> PathBuf {
    let path = dir.join("tweets.csv");
    let mut writer = csv::Writer::from_path(&path).unwrap();
    writer.write_record(["id", "Text", "bullying_traces", "lang"]).unwrap();
    for tweet in sample_dataset().tweets {
        writer
            .write_record([&tweet.id, &tweet.text, &tweet.label, &tweet.lang])
            .unwrap();
    }
    writer.flush().unwrap();
    path
}

fn test_config() -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.preprocessing.max_sparsity = 1.0;
    config.classification.shuffle = true;
    config.topics.n_topics = 4;
    config.topics.n_iterations = 100;
    config.topics.burn_in = 10;
    config
}

#[test]
fn test_load_csv() {
    let dir = TempDir::new().unwrap();
    let path = write_sample_csv(dir.path());

    let dataset = TweetDataset::from_csv(&path, &PipelineConfig::default().data).unwrap();
    assert_eq!(dataset.len(), 26);
    assert_eq!(dataset.filter_language("en").len(), 24);
    assert_eq!(dataset.tweets[0].id, "1");
}

#[test]
fn test_missing_column() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.csv");
    std::fs::write(&path, "id,text,lang\n1,hello there,en\n").unwrap();

    let result = TweetDataset::from_csv(&path, &PipelineConfig::default().data);
    assert!(matches!(result, Err(DataError::MissingColumn(col)) if col == "bullying_traces"));
}

#[test]
fn test_svm_classification_from_csv() {
    let dir = TempDir::new().unwrap();
    let path = write_sample_csv(dir.path());
    let config = test_config();

    let dataset = TweetDataset::from_csv(&path, &config.data).unwrap();
    let report = run_classification(&dataset, &config).unwrap();

    assert_eq!(report.algorithm, "SVM");
    assert_eq!(report.n_documents, 26);
    assert_eq!(report.train_size, 23);
    assert_eq!(report.test_size, 3);
    assert_eq!(report.test_metrics.confusion_matrix.total(), 3);

    let cv = &report.cross_validation;
    assert_eq!(cv.fold_accuracies.len(), 3);
    let mean = cv.fold_accuracies.iter().sum::<f64>() / 3.0;
    assert_relative_eq!(cv.mean_accuracy, mean, epsilon = 1e-12);
}

#[test]
fn test_naive_bayes_classification_is_reproducible() {
    let mut config = test_config();
    config.classification.algorithm = Algorithm::NaiveBayes;

    let a = run_classification(&sample_dataset(), &config).unwrap();
    let b = run_classification(&sample_dataset(), &config).unwrap();
    assert_eq!(a.cross_validation.fold_accuracies, b.cross_validation.fold_accuracies);
    assert_eq!(a.test_metrics.confusion_matrix, b.test_metrics.confusion_matrix);
}

#[test]
fn test_topic_model_from_csv() {
    let dir = TempDir::new().unwrap();
    let path = write_sample_csv(dir.path());
    let config = test_config();

    let dataset = TweetDataset::from_csv(&path, &config.data).unwrap();
    let report = run_topic_model(&dataset, &config).unwrap();

    assert_eq!(report.n_documents + report.n_dropped, 24);
    assert_eq!(report.topics.len(), 4);
    assert!(report.topics.iter().all(|t| t.top_words.len() == 10));
    assert_relative_eq!(report.alpha, 12.5);

    let prevalence: f64 = report.topics.iter().map(|t| t.prevalence).sum();
    assert_relative_eq!(prevalence, 1.0, epsilon = 1e-9);
    assert!(report.summary.perplexity.is_some());
}

#[test]
fn test_aggressive_sparsity_empties_vocabulary() {
    let mut config = test_config();
    // Only terms present in more than 99.9% of tweets survive
    config.preprocessing.max_sparsity = 0.001;

    let result = run_classification(&sample_dataset(), &config);
    assert!(matches!(result, Err(PipelineError::EmptyCorpus(_))));
}

#[test]
fn test_partial_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{ "classification": { "algorithm": "naive_bayes", "n_folds": 5 }, "topics": { "n_topics": 8 } }"#,
    )
    .unwrap();

    let config = PipelineConfig::from_json_file(&path).unwrap();
    assert_eq!(config.classification.algorithm, Algorithm::NaiveBayes);
    assert_eq!(config.classification.n_folds, 5);
    assert_relative_eq!(config.classification.train_ratio, 0.9);
    assert_relative_eq!(config.topics.effective_alpha(), 6.25);
}

#[test]
fn test_full_report_json() {
    let dir = TempDir::new().unwrap();
    let config = test_config();
    let dataset = sample_dataset();

    let report = Report {
        classification: Some(run_classification(&dataset, &config).unwrap()),
        topics: Some(run_topic_model(&dataset, &config).unwrap()),
    };
    let path = dir.path().join("report.json");
    report.write_json(&path).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["classification"]["algorithm"], "SVM");
    assert_eq!(value["classification"]["cross_validation"]["n_folds"], 3);
    assert_eq!(value["topics"]["language"], "en");
    assert_eq!(value["topics"]["topics"].as_array().unwrap().len(), 4);
}
