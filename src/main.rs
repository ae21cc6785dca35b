//! CLI for mining the bullying-trace tweet corpus
//!
//! Usage:
//! ```bash
//! cargo run -- --help
//! cargo run -- classify --input tweets.csv
//! cargo run -- topics --input tweets.csv --topics 20
//! cargo run -- run --input tweets.csv --output report.json
//! cargo run -- demo
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use tweet_mining::config::Algorithm;
use tweet_mining::data::sample::sample_dataset;
use tweet_mining::pipeline::run_topic_model_with_progress;
use tweet_mining::{run_classification, PipelineConfig, Report, TopicReport, TweetDataset};

#[derive(Parser)]
#[command(name = "tweet_mining")]
#[command(author = "ML for Trading")]
#[command(version = "0.1.0")]
#[command(about = "Bullying-trace classification and topic modeling for tweets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON configuration file (missing fields use defaults)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level: debug, info, warn or error
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Train and cross-validate the bullying-trace classifier
    Classify {
        /// Annotated tweets CSV
        #[arg(short, long)]
        input: PathBuf,

        /// Override the configured algorithm
        #[arg(short, long, value_enum)]
        algorithm: Option<Algorithm>,
    },

    /// Fit an LDA topic model on tweets of one language
    Topics {
        /// Annotated tweets CSV
        #[arg(short, long)]
        input: PathBuf,

        /// Number of topics
        #[arg(short, long)]
        topics: Option<usize>,
    },

    /// Run both workflows
    Run {
        /// Annotated tweets CSV
        #[arg(short, long)]
        input: PathBuf,

        /// Write the combined report as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run both workflows on the built-in sample corpus
    Demo {
        /// Write the combined report as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.log_level.as_str() {
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            PipelineConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?
        }
        None => PipelineConfig::default(),
    };

    match cli.command {
        Commands::Classify { input, algorithm } => {
            if let Some(algorithm) = algorithm {
                config.classification.algorithm = algorithm;
            }
            let dataset = load(&input, &config)?;
            let report = run_classification(&dataset, &config)?;
            report.print();
        }
        Commands::Topics { input, topics } => {
            if let Some(n) = topics {
                config.topics.n_topics = n;
                config.topics.alpha = None;
            }
            let dataset = load(&input, &config)?;
            let report = fit_topics(&dataset, &config)?;
            report.print();
        }
        Commands::Run { input, output } => {
            let dataset = load(&input, &config)?;
            run_all(&dataset, &config, output.as_deref())?;
        }
        Commands::Demo { output } => {
            println!("Running on the built-in sample corpus\n");
            // The sample is ordered by label, so a contiguous split would test on one class
            config.classification.shuffle = true;
            config.preprocessing.max_sparsity = 1.0;
            config.topics.n_topics = 3;
            config.topics.alpha = None;
            config.topics.n_iterations = 200;
            config.topics.burn_in = 20;
            run_all(&sample_dataset(), &config, output.as_deref())?;
        }
    }

    Ok(())
}

fn load(input: &Path, config: &PipelineConfig) -> Result<TweetDataset> {
    TweetDataset::from_csv(input, &config.data)
        .with_context(|| format!("Failed to read tweets from {}", input.display()))
}

/// Topic model with a progress bar over the Gibbs sweeps
fn fit_topics(dataset: &TweetDataset, config: &PipelineConfig) -> Result<TopicReport> {
    let pb = ProgressBar::new(config.topics.n_iterations as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );
    pb.set_message("Gibbs sampling");

    let result = run_topic_model_with_progress(dataset, config, |_| pb.inc(1));
    pb.finish_and_clear();

    Ok(result?)
}

fn run_all(dataset: &TweetDataset, config: &PipelineConfig, output: Option<&Path>) -> Result<()> {
    let classification = run_classification(dataset, config).context("Classification failed")?;
    let topics = fit_topics(dataset, config).context("Topic modeling failed")?;

    let report = Report {
        classification: Some(classification),
        topics: Some(topics),
    };
    report.print();

    if let Some(path) = output {
        report
            .write_json(path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
    }

    Ok(())
}
