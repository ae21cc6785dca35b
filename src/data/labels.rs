//! Binary label encoding

use super::dataset::{DataError, TweetDataset};

/// Maps the bullying annotation to 0/1
///
/// `y`/`yes`/`true` become 1 and `n`/`no`/`false` become 0 (any case).
/// Values that are already numeric are kept when they equal 0 or 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelEncoder;

impl LabelEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Encode a single raw label; `row` is only used for error reporting
    pub fn encode(&self, raw: &str, row: usize) -> Result<u8, DataError> {
        let value = raw.trim();
        match value.to_ascii_lowercase().as_str() {
            "y" | "yes" | "true" => return Ok(1),
            "n" | "no" | "false" => return Ok(0),
            _ => {}
        }

        match value.parse::<f64>() {
            Ok(v) if v == 1.0 => Ok(1),
            Ok(v) if v == 0.0 => Ok(0),
            _ => Err(DataError::InvalidLabel {
                row,
                value: value.to_string(),
            }),
        }
    }

    /// Encode the label of every tweet, failing on the first unknown value
    pub fn encode_all(&self, dataset: &TweetDataset) -> Result<Vec<u8>, DataError> {
        dataset
            .tweets
            .iter()
            .enumerate()
            .map(|(i, tweet)| self.encode(&tweet.label, i + 1))
            .collect()
    }

    /// Human-readable name of an encoded label
    pub fn class_name(label: u8) -> &'static str {
        if label == 1 {
            "bullying"
        } else {
            "not bullying"
        }
    }
}
