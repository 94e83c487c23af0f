use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use crate::constants::splits::{TRAIN_END, VALIDATE_END};
use crate::errors::DatasetError;

/// Logical dataset partitions over conversations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitLabel {
    /// Training split.
    Train,
    /// Validation split.
    Validate,
    /// Test split.
    Test,
}

impl SplitLabel {
    /// All splits in boundary order.
    pub const ALL: [SplitLabel; 3] = [SplitLabel::Train, SplitLabel::Validate, SplitLabel::Test];

    /// Lowercase split name.
    pub fn as_str(self) -> &'static str {
        match self {
            SplitLabel::Train => "train",
            SplitLabel::Validate => "validate",
            SplitLabel::Test => "test",
        }
    }
}

impl fmt::Display for SplitLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SplitLabel {
    type Err = DatasetError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "train" => Ok(SplitLabel::Train),
            "validate" | "validation" => Ok(SplitLabel::Validate),
            "test" => Ok(SplitLabel::Test),
            _ => Err(DatasetError::UnknownSplit(value.to_string())),
        }
    }
}

/// Cumulative split boundaries as fractions of the conversation count.
///
/// Train covers `[0, floor(train_end * N))`, validate covers up to
/// `floor(validate_end * N)`, and test takes the rest.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SplitCutoffs {
    /// Fraction of conversations before the validate split starts.
    pub train_end: f64,
    /// Fraction of conversations before the test split starts.
    pub validate_end: f64,
}

impl Default for SplitCutoffs {
    fn default() -> Self {
        Self {
            train_end: TRAIN_END,
            validate_end: VALIDATE_END,
        }
    }
}

impl SplitCutoffs {
    /// Validate that `0 <= train_end <= validate_end <= 1`.
    pub fn validated(self) -> Result<Self, DatasetError> {
        let ordered = 0.0 <= self.train_end
            && self.train_end <= self.validate_end
            && self.validate_end <= 1.0;
        if !ordered {
            return Err(DatasetError::Configuration(format!(
                "split cutoffs must satisfy 0 <= train_end <= validate_end <= 1 (got {} and {})",
                self.train_end, self.validate_end
            )));
        }
        Ok(self)
    }
}

/// Index ranges of each split over an ordered list of `total` conversations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitPlan {
    total: usize,
    train_end: usize,
    validate_end: usize,
}

impl SplitPlan {
    /// Compute split boundaries for `total` conversations.
    pub fn new(total: usize, cutoffs: SplitCutoffs) -> Result<Self, DatasetError> {
        let cutoffs = cutoffs.validated()?;
        let train_end = floor_fraction(cutoffs.train_end, total);
        let validate_end = floor_fraction(cutoffs.validate_end, total).max(train_end);
        Ok(Self {
            total,
            train_end,
            validate_end,
        })
    }

    /// Number of conversations the plan covers.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Index range of `label` within the ordered conversation list.
    pub fn range(&self, label: SplitLabel) -> Range<usize> {
        match label {
            SplitLabel::Train => 0..self.train_end,
            SplitLabel::Validate => self.train_end..self.validate_end,
            SplitLabel::Test => self.validate_end..self.total,
        }
    }

    /// Number of conversations in `label`.
    pub fn len(&self, label: SplitLabel) -> usize {
        self.range(label).len()
    }

    /// Split containing the conversation at `index`.
    pub fn label_for_index(&self, index: usize) -> Option<SplitLabel> {
        SplitLabel::ALL
            .into_iter()
            .find(|label| self.range(*label).contains(&index))
    }
}

/// Per-split conversation and turn counts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitSummary {
    /// Split described.
    pub label: SplitLabel,
    /// Conversations in the split.
    pub conversations: usize,
    /// Turns across those conversations.
    pub turns: usize,
}

fn floor_fraction(fraction: f64, total: usize) -> usize {
    (fraction * total as f64) as usize
}
