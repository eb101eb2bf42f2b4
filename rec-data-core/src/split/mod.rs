//! Train/test splitters over frozen tables
//!
//! A splitter assigns every row position of its accessor to exactly one of two
//! ordered position sets. All splitters here compute their assignment once at
//! construction and expose a single fold afterwards.

mod config;
mod predicate;
mod random;
mod ratio;

pub use config::SplitterConfig;
pub use predicate::PredicateSplitter;
pub use random::{RandomSplitOptions, StratifiedRandomSplitter};
pub use ratio::{GivenNumberSplitter, RatioSplitter};

use crate::accessor::DataAccessor;
use crate::error::{Error, Result};
use crate::partition::Partition;

/// Train/test assignment of a splitter
pub trait DataSplitter {
    /// Accessor the positions refer to
    type Accessor: DataAccessor + ?Sized;

    /// Number of folds
    fn size(&self) -> usize;

    /// Accessor the positions refer to
    fn accessor(&self) -> &Self::Accessor;

    /// Training positions of a fold, in increasing order
    fn train_positions(&self, fold: usize) -> Result<&[usize]>;

    /// Test positions of a fold, in increasing order
    fn test_positions(&self, fold: usize) -> Result<&[usize]>;
}

/// One train/test assignment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fold {
    /// Training positions, in increasing order
    pub train: Vec<usize>,

    /// Test positions, in increasing order
    pub test: Vec<usize>,
}

impl Fold {
    /// Build a fold from one flag per position, `true` meaning train
    pub fn from_assignments(assignments: &[bool]) -> Self {
        let mut fold = Fold::default();
        for (position, &train) in assignments.iter().enumerate() {
            if train {
                fold.train.push(position);
            } else {
                fold.test.push(position);
            }
        }
        fold
    }
}

pub(crate) fn single_fold(fold: &Fold, index: usize) -> Result<&Fold> {
    if index == 0 {
        Ok(fold)
    } else {
        Err(Error::IndexOutOfBounds { index, len: 1 })
    }
}

/// Assign the first `train_count(bucket_len)` positions of every bucket to
/// training and the rest to test
pub(crate) fn split_buckets<F>(partition: &Partition, size: usize, train_count: F) -> Fold
where
    F: Fn(usize) -> usize,
{
    let mut assignments = vec![false; size];
    for bucket in partition.buckets() {
        let count = train_count(bucket.len()).min(bucket.len());
        for &position in &bucket[..count] {
            assignments[position] = true;
        }
    }
    Fold::from_assignments(&assignments)
}

pub(crate) fn stratify<A>(accessor: &A, field: &str) -> Result<Partition>
where
    A: DataAccessor + ?Sized,
{
    if accessor.discrete_dimension(field).is_none() {
        return Err(Error::invalid(format!("Unknown discrete field: {}", field)));
    }
    Partition::by_field(accessor, field)
}

#[cfg(test)]
pub(crate) fn assert_covers<S: DataSplitter>(splitter: &S) {
    let size = splitter.accessor().size();
    let mut seen = vec![0u8; size];
    let train = splitter.train_positions(0).unwrap();
    let test = splitter.test_positions(0).unwrap();

    assert!(train.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(test.windows(2).all(|pair| pair[0] < pair[1]));
    for &position in train.iter().chain(test) {
        seen[position] += 1;
    }
    assert!(seen.iter().all(|&count| count == 1));
    assert_eq!(splitter.size(), 1);
    assert!(matches!(
        splitter.train_positions(1),
        Err(Error::IndexOutOfBounds { index: 1, len: 1 })
    ));
}
