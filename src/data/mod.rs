//! Tweet dataset handling
//!
//! Loading the annotated tweet CSV, filtering by language and
//! turning the bullying annotation into numeric labels.

mod dataset;
mod labels;
pub mod sample;

pub use dataset::{DataError, Tweet, TweetDataset};
pub use labels::LabelEncoder;
