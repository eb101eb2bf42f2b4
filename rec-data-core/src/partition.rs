//! Stable bucketing of row positions by a discrete field's code.
//!
//! # Layout
//!
//! ```text
//! positions:   [rows with code 0...][rows with code 1...] ... [rows with code K-1...]
//!               ↑                    ↑                         ↑                     ↑
//! paginations: [0,                   n0,                  ...  N - n(K-1),           N]
//! ```
//!
//! Bucket `i` is `positions[paginations[i]..paginations[i + 1]]`. Positions
//! inside a bucket keep their original relative order.
//!
//! # Algorithm
//!
//! A counting sort in three passes, O(N + K):
//! 1. count: `paginations[code + 1] += 1` for every position,
//! 2. prefix: walk `paginations[K..=1]` downwards with a cursor starting at N,
//!    turning each count into the start offset of its bucket,
//! 3. scatter: write every position at `paginations[code + 1]` and bump that
//!    entry; the cursors only move forward, which makes the result stable
//!    and leaves `paginations[i]` at the start of bucket `i`.

use tracing::debug;

use crate::accessor::DataAccessor;
use crate::dictionary::Code;
use crate::error::{Error, Result};

/// Bucket positions `0..size` by `code_of(position)` into caller buffers.
///
/// Callers guarantee every code is below `paginations.len() - 1`.
fn bucket_positions<F>(size: usize, code_of: F, paginations: &mut [usize], positions: &mut [usize])
where
    F: Fn(usize) -> Code,
{
    paginations.fill(0);

    for position in 0..size {
        paginations[code_of(position) as usize + 1] += 1;
    }

    let mut cursor = size;
    for index in (1..paginations.len()).rev() {
        cursor -= paginations[index];
        paginations[index] = cursor;
    }

    for position in 0..size {
        let slot = &mut paginations[code_of(position) as usize + 1];
        positions[*slot] = position;
        *slot += 1;
    }
}

fn check_buffers(cardinality: usize, size: usize, paginations: &[usize], positions: &[usize]) -> Result<()> {
    if paginations.len() != cardinality + 1 {
        return Err(Error::invalid(format!(
            "Paginations buffer has {} entries, expected {}",
            paginations.len(),
            cardinality + 1
        )));
    }
    if positions.len() != size {
        return Err(Error::invalid(format!(
            "Positions buffer has {} entries, expected {}",
            positions.len(),
            size
        )));
    }
    Ok(())
}

/// Partition the rows of `accessor` by the codes of a discrete dimension.
///
/// `paginations` must hold `K + 1` entries, where `K` is the dimension's
/// cardinality, and `positions` must hold one entry per row. Buffers of the
/// wrong size, and codes at or above the cardinality, are rejected before
/// either buffer is written.
pub fn partition_into<A>(
    accessor: &A,
    dimension: usize,
    paginations: &mut [usize],
    positions: &mut [usize],
) -> Result<()>
where
    A: DataAccessor + ?Sized,
{
    if dimension >= accessor.discrete_order() {
        return Err(Error::invalid(format!(
            "Discrete dimension {} out of range for {} dimensions",
            dimension,
            accessor.discrete_order()
        )));
    }
    let cardinality = accessor.discrete_cardinality(dimension);
    check_buffers(cardinality, accessor.size(), paginations, positions)?;
    if let Some(code) = (0..accessor.size())
        .map(|position| accessor.discrete_value(dimension, position))
        .find(|&code| code as usize >= cardinality)
    {
        return Err(Error::invalid(format!(
            "Code {} of '{}' out of range for cardinality {}",
            code,
            accessor.discrete_name(dimension),
            cardinality
        )));
    }

    bucket_positions(
        accessor.size(),
        |position| accessor.discrete_value(dimension, position),
        paginations,
        positions,
    );
    Ok(())
}

/// Partition a plain code slice whose codes are all below `cardinality`.
pub fn partition_codes(
    codes: &[Code],
    cardinality: usize,
    paginations: &mut [usize],
    positions: &mut [usize],
) -> Result<()> {
    check_buffers(cardinality, codes.len(), paginations, positions)?;
    if let Some(code) = codes.iter().find(|&&code| code as usize >= cardinality) {
        return Err(Error::invalid(format!(
            "Code {} out of range for cardinality {}",
            code, cardinality
        )));
    }

    bucket_positions(codes.len(), |position| codes[position], paginations, positions);
    Ok(())
}

/// Owned result of partitioning a table by one discrete field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    /// Start offset of every bucket, followed by the row count
    paginations: Vec<usize>,

    /// Row positions grouped by bucket
    positions: Vec<usize>,
}

impl Partition {
    /// Partition by a discrete dimension
    pub fn by_dimension<A>(accessor: &A, dimension: usize) -> Result<Self>
    where
        A: DataAccessor + ?Sized,
    {
        if dimension >= accessor.discrete_order() {
            return Err(Error::invalid(format!(
                "Discrete dimension {} out of range for {} dimensions",
                dimension,
                accessor.discrete_order()
            )));
        }

        let mut paginations = vec![0; accessor.discrete_cardinality(dimension) + 1];
        let mut positions = vec![0; accessor.size()];
        partition_into(accessor, dimension, &mut paginations, &mut positions)?;

        debug!(
            field = accessor.discrete_name(dimension),
            rows = positions.len(),
            buckets = paginations.len() - 1,
            "Partitioned rows"
        );

        Ok(Self { paginations, positions })
    }

    /// Partition by a discrete field, looked up by name
    pub fn by_field<A>(accessor: &A, field: &str) -> Result<Self>
    where
        A: DataAccessor + ?Sized,
    {
        let dimension = accessor
            .discrete_dimension(field)
            .ok_or_else(|| Error::invalid(format!("Unknown discrete field: {}", field)))?;
        Self::by_dimension(accessor, dimension)
    }

    /// Number of buckets, one per code
    pub fn bucket_count(&self) -> usize {
        self.paginations.len() - 1
    }

    /// Positions whose code is `code`, in original order
    ///
    /// # Panics
    ///
    /// Panics if `code` is not below `bucket_count()`.
    pub fn bucket(&self, code: Code) -> &[usize] {
        let code = code as usize;
        &self.positions[self.paginations[code]..self.paginations[code + 1]]
    }

    /// Iterate over all buckets in code order
    pub fn buckets(&self) -> impl Iterator<Item = &[usize]> + '_ {
        self.paginations
            .windows(2)
            .map(move |bounds| &self.positions[bounds[0]..bounds[1]])
    }

    /// Bucket boundaries, `bucket_count() + 1` entries
    pub fn paginations(&self) -> &[usize] {
        &self.paginations
    }

    /// Positions grouped by bucket
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::tests::interactions;
    use proptest::prelude::*;

    /// Accessor whose single discrete column reports codes past its cardinality
    struct OverflowingCodes;

    impl DataAccessor for OverflowingCodes {
        fn size(&self) -> usize {
            3
        }

        fn discrete_order(&self) -> usize {
            1
        }

        fn continuous_order(&self) -> usize {
            0
        }

        fn discrete_dimension(&self, name: &str) -> Option<usize> {
            (name == "user").then_some(0)
        }

        fn continuous_dimension(&self, _name: &str) -> Option<usize> {
            None
        }

        fn discrete_name(&self, _dimension: usize) -> &str {
            "user"
        }

        fn continuous_name(&self, dimension: usize) -> &str {
            panic!("no continuous dimension {}", dimension)
        }

        fn discrete_cardinality(&self, _dimension: usize) -> usize {
            2
        }

        fn discrete_value(&self, _dimension: usize, position: usize) -> Code {
            Code::try_from(position).unwrap()
        }

        fn continuous_value(&self, dimension: usize, _position: usize) -> f32 {
            panic!("no continuous dimension {}", dimension)
        }
    }

    #[test]
    fn test_out_of_range_accessor_code_leaves_buffers_untouched() {
        let mut paginations = vec![7; 3];
        let mut positions = vec![9; 3];

        let result = partition_into(&OverflowingCodes, 0, &mut paginations, &mut positions);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
        assert_eq!(paginations, vec![7; 3]);
        assert_eq!(positions, vec![9; 3]);

        assert!(Partition::by_field(&OverflowingCodes, "user").is_err());
    }

    #[test]
    fn test_user_partition() {
        let table = interactions();

        let partition = Partition::by_field(&table, "user").unwrap();
        assert_eq!(partition.paginations(), &[0, 3, 5]);
        assert_eq!(partition.bucket(0), &[0, 1, 3]);
        assert_eq!(partition.bucket(1), &[2, 4]);
        assert_eq!(partition.buckets().count(), 2);
    }

    #[test]
    fn test_item_partition() {
        let table = interactions();

        let partition = Partition::by_field(&table, "item").unwrap();
        assert_eq!(partition.paginations(), &[0, 2, 4, 5]);
        assert_eq!(partition.positions(), &[0, 2, 1, 4, 3]);
    }

    #[test]
    fn test_wrong_buffer_sizes_untouched() {
        let table = interactions();
        let mut paginations = vec![7; 2];
        let mut positions = vec![7; 5];

        let result = partition_into(&table, 0, &mut paginations, &mut positions);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));

        let mut paginations = vec![7; 3];
        let mut positions = vec![7; 4];
        let result = partition_into(&table, 0, &mut paginations, &mut positions);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
        assert_eq!(paginations, vec![7; 3]);
        assert_eq!(positions, vec![7; 4]);
    }

    #[test]
    fn test_unknown_field() {
        let table = interactions();
        assert!(Partition::by_field(&table, "score").is_err());
        assert!(Partition::by_field(&table, "missing").is_err());
    }

    #[test]
    fn test_out_of_range_code_rejected() {
        let mut paginations = vec![0; 3];
        let mut positions = vec![0; 2];
        let result = partition_codes(&[0, 2], 2, &mut paginations, &mut positions);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_empty_codes() {
        let mut paginations = vec![9];
        let mut positions = Vec::new();
        partition_codes(&[], 0, &mut paginations, &mut positions).unwrap();
        assert_eq!(paginations, vec![0]);
    }

    #[test]
    fn test_buffers_are_reusable() {
        let mut paginations = vec![0; 3];
        let mut positions = vec![0; 4];
        partition_codes(&[1, 1, 0, 0], 2, &mut paginations, &mut positions).unwrap();
        partition_codes(&[0, 1, 0, 1], 2, &mut paginations, &mut positions).unwrap();
        assert_eq!(paginations, vec![0, 2, 4]);
        assert_eq!(positions, vec![0, 2, 1, 3]);
    }

    proptest! {
        #[test]
        fn prop_stable_permutation(
            cardinality in 1usize..12,
            seeds in prop::collection::vec(any::<u32>(), 0..300),
        ) {
            let codes: Vec<Code> = seeds
                .iter()
                .map(|seed| seed % Code::try_from(cardinality).unwrap())
                .collect();
            let mut paginations = vec![0; cardinality + 1];
            let mut positions = vec![0; codes.len()];
            partition_codes(&codes, cardinality, &mut paginations, &mut positions).unwrap();

            prop_assert_eq!(paginations[0], 0);
            prop_assert_eq!(paginations[cardinality], codes.len());

            let mut seen = positions.clone();
            seen.sort_unstable();
            prop_assert_eq!(seen, (0..codes.len()).collect::<Vec<_>>());

            for code in 0..cardinality {
                let bucket = &positions[paginations[code]..paginations[code + 1]];
                prop_assert!(bucket.windows(2).all(|pair| pair[0] < pair[1]));
                prop_assert!(bucket.iter().all(|&position| codes[position] as usize == code));
            }
        }
    }
}
