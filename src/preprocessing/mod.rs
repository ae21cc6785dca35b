//! Text preprocessing module
//!
//! Provides tokenization, text cleaning, stemming and vectorization
//! utilities for turning tweets into document-term matrices.

pub mod tokenizer;
pub mod vectorizer;

pub use tokenizer::Tokenizer;
pub use vectorizer::{
    CountVectorizer, DocumentTermMatrix, IdfMethod, TfIdfVectorizer, TfMethod, VectorizerError,
};
