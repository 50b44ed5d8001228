//! Seeded train/validation split.

use rand::seq::SliceRandom;
use rand::{rngs::StdRng, SeedableRng};

use crate::error::YolokitError;

pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_TRAIN_RATIO: f64 = 0.8;

/// A partition of the input items into train and validation sets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatasetSplit<T> {
    pub train: Vec<T>,
    pub val: Vec<T>,
}

/// Reject ratios outside `[0, 1]` (and NaN).
pub fn validate_train_ratio(ratio: f64) -> Result<(), YolokitError> {
    if (0.0..=1.0).contains(&ratio) {
        Ok(())
    } else {
        Err(YolokitError::InvalidOptions(format!(
            "train ratio must be in [0.0, 1.0], got {ratio}"
        )))
    }
}

/// `floor(ratio * total)`, never more than `total`.
pub fn train_count(total: usize, ratio: f64) -> usize {
    ((total as f64 * ratio).floor() as usize).min(total)
}

/// Shuffle `items` with a generator seeded by `seed`, then cut at
/// [`train_count`]. The same seed and input order give the same partition.
pub fn split_dataset<T>(mut items: Vec<T>, train_ratio: f64, seed: u64) -> DatasetSplit<T> {
    let mut rng = StdRng::seed_from_u64(seed);
    items.shuffle(&mut rng);

    let cut = train_count(items.len(), train_ratio);
    let val = items.split_off(cut);

    DatasetSplit { train: items, val }
}
