use serde::{Deserialize, Serialize};

use super::ModelError;

/// Maps the two original labels of a dataset onto class indices.
///
/// Classes are sorted ascending, so with labels `{-1, 1}` the "good" label
/// `1` becomes index `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: [i64; 2],
}

impl LabelEncoder {
    pub fn fit(labels: &[i64]) -> Result<Self, ModelError> {
        let mut distinct = labels.to_vec();
        distinct.sort_unstable();
        distinct.dedup();
        match distinct.as_slice() {
            [a, b] => Ok(Self { classes: [*a, *b] }),
            other => Err(ModelError::ClassCount(other.len())),
        }
    }

    pub const fn classes(&self) -> [i64; 2] {
        self.classes
    }

    pub fn encode(&self, labels: &[i64]) -> Result<Vec<u8>, ModelError> {
        labels
            .iter()
            .map(|&l| {
                self.classes
                    .iter()
                    .position(|&c| c == l)
                    .map(|i| u8::from(i == 1))
                    .ok_or(ModelError::UnknownLabel(l))
            })
            .collect()
    }

    pub fn decode(&self, class: u8) -> i64 {
        self.classes[usize::from(class.min(1))]
    }
}
