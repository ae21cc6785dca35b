//! Topic modeling
//!
//! - LDA (Latent Dirichlet Allocation) by collapsed Gibbs sampling
//! - Coherence, diversity and overlap metrics for fitted topics

pub mod evaluation;
pub mod lda;

pub use evaluation::{Evaluator, ModelSummary};
pub use lda::{Lda, LdaConfig, LdaError, LdaTopic};
