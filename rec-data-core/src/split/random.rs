use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::accessor::DataAccessor;
use crate::error::{Error, Result};

use super::{single_fold, stratify, DataSplitter, Fold};

/// Options for [`StratifiedRandomSplitter`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomSplitOptions {
    /// Probability of a position going to training, in `[0, 1]`
    pub train_ratio: f64,

    /// Seed of the random generator; equal seeds give equal splits
    pub seed: u64,
}

impl Default for RandomSplitOptions {
    fn default() -> Self {
        Self {
            train_ratio: 0.8,
            seed: 0,
        }
    }
}

/// Random split stratified by a discrete field
///
/// Rows are grouped by the field's code, then every position independently
/// goes to training with probability `train_ratio`. Each category therefore
/// contributes to both sets in roughly the configured proportion; the exact
/// count per category is binomial, not fixed.
pub struct StratifiedRandomSplitter<'a, A: ?Sized> {
    accessor: &'a A,
    fold: Fold,
}

impl<'a, A> StratifiedRandomSplitter<'a, A>
where
    A: DataAccessor + ?Sized,
{
    /// Split `accessor` stratified by the discrete field `field`
    pub fn new(accessor: &'a A, field: &str, options: RandomSplitOptions) -> Result<Self> {
        let ratio = options.train_ratio;
        if !(0.0..=1.0).contains(&ratio) {
            return Err(Error::invalid(format!("Train ratio {} outside [0, 1]", ratio)));
        }
        let partition = stratify(accessor, field)?;

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(options.seed);
        let mut assignments = vec![false; accessor.size()];
        for bucket in partition.buckets() {
            for &position in bucket {
                assignments[position] = rng.gen::<f64>() < ratio;
            }
        }
        let fold = Fold::from_assignments(&assignments);

        debug!(
            field,
            ratio,
            seed = options.seed,
            buckets = partition.bucket_count(),
            train = fold.train.len(),
            test = fold.test.len(),
            "Stratified random split"
        );

        Ok(Self { accessor, fold })
    }
}

impl<'a, A> DataSplitter for StratifiedRandomSplitter<'a, A>
where
    A: DataAccessor + ?Sized,
{
    type Accessor = A;

    fn size(&self) -> usize {
        1
    }

    fn accessor(&self) -> &A {
        self.accessor
    }

    fn train_positions(&self, fold: usize) -> Result<&[usize]> {
        Ok(&single_fold(&self.fold, fold)?.train)
    }

    fn test_positions(&self, fold: usize) -> Result<&[usize]> {
        Ok(&single_fold(&self.fold, fold)?.test)
    }
}
