use tracing::debug;

use crate::accessor::DataAccessor;
use crate::error::{Error, Result};

use super::{single_fold, split_buckets, stratify, DataSplitter, Fold};

/// Deterministic per-category split by proportion
///
/// Within every category of the field, the first `⌊ratio × bucket size⌋`
/// positions in row order go to training and the rest to test.
pub struct RatioSplitter<'a, A: ?Sized> {
    accessor: &'a A,
    fold: Fold,
}

impl<'a, A> RatioSplitter<'a, A>
where
    A: DataAccessor + ?Sized,
{
    /// Split `accessor` per category of `field`
    pub fn new(accessor: &'a A, field: &str, ratio: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(Error::invalid(format!("Train ratio {} outside [0, 1]", ratio)));
        }
        let partition = stratify(accessor, field)?;

        let fold = split_buckets(&partition, accessor.size(), |len| ratio_count(ratio, len));

        debug!(field, ratio, train = fold.train.len(), test = fold.test.len(), "Ratio split");
        Ok(Self { accessor, fold })
    }
}

/// `⌊ratio × len⌋`, treating products within rounding error of an integer as
/// that integer (`0.29 × 100` evaluates to `28.999999999999996`)
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn ratio_count(ratio: f64, len: usize) -> usize {
    let product = ratio * len as f64;
    (product * (1.0 + 4.0 * f64::EPSILON)).floor() as usize
}

/// Deterministic per-category split by count
///
/// Within every category of the field, the first `number` positions in row
/// order go to training and the rest to test. Categories with fewer rows go
/// entirely to training.
pub struct GivenNumberSplitter<'a, A: ?Sized> {
    accessor: &'a A,
    fold: Fold,
}

impl<'a, A> GivenNumberSplitter<'a, A>
where
    A: DataAccessor + ?Sized,
{
    /// Split `accessor` per category of `field`
    pub fn new(accessor: &'a A, field: &str, number: usize) -> Result<Self> {
        let partition = stratify(accessor, field)?;

        let fold = split_buckets(&partition, accessor.size(), |_| number);

        debug!(field, number, train = fold.train.len(), test = fold.test.len(), "Given number split");
        Ok(Self { accessor, fold })
    }
}

macro_rules! single_fold_splitter {
    ($name:ident) => {
        impl<'a, A> DataSplitter for $name<'a, A>
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
    };
}

single_fold_splitter!(RatioSplitter);
single_fold_splitter!(GivenNumberSplitter);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::split::assert_covers;
    use crate::chunk::ColumnOptions;
    use crate::schema::{DataType, TableSchema};
    use crate::table::tests::interactions;
    use crate::table::{Table, TableBuilder};
    use test_case::test_case;

    #[test_case(0.0, &[], &[0, 1, 2, 3, 4] ; "nothing")]
    #[test_case(0.5, &[0, 2], &[1, 3, 4] ; "half")]
    #[test_case(0.7, &[0, 1, 2], &[3, 4] ; "most")]
    #[test_case(1.0, &[0, 1, 2, 3, 4], &[] ; "everything")]
    fn test_ratio_split(ratio: f64, train: &[usize], test: &[usize]) {
        let table = interactions();
        let splitter = RatioSplitter::new(&table, "user", ratio).unwrap();

        assert_eq!(splitter.train_positions(0).unwrap(), train);
        assert_eq!(splitter.test_positions(0).unwrap(), test);
        assert_covers(&splitter);
    }

    fn single_category(rows: usize) -> Table {
        let schema = TableSchema::new().discrete_field("user", DataType::String);
        let mut builder = TableBuilder::new(schema, ColumnOptions::default()).unwrap();
        for _ in 0..rows {
            builder.append(["A"]).unwrap();
        }
        builder.build().unwrap()
    }

    #[test_case(0.29, 100, 29 ; "decimal ratio of a hundred")]
    #[test_case(0.57, 100, 57 ; "product just below integer")]
    #[test_case(0.1, 30, 3 ; "a tenth")]
    #[test_case(0.3, 10, 3 ; "three tenths")]
    #[test_case(0.999, 100, 99 ; "rounds down")]
    fn test_ratio_count_is_exact_floor(ratio: f64, rows: usize, expected: usize) {
        let table = single_category(rows);
        let splitter = RatioSplitter::new(&table, "user", ratio).unwrap();

        assert_eq!(splitter.train_positions(0).unwrap().len(), expected);
        assert_eq!(splitter.test_positions(0).unwrap().len(), rows - expected);
    }

    #[test]
    fn test_ratio_rejects_out_of_range() {
        let table = interactions();
        assert!(RatioSplitter::new(&table, "user", 2.0).is_err());
    }

    #[test_case(0, &[] ; "none")]
    #[test_case(1, &[0, 2] ; "first of each")]
    #[test_case(2, &[0, 1, 2, 4] ; "first two of each")]
    #[test_case(10, &[0, 1, 2, 3, 4] ; "more than any bucket")]
    fn test_given_number_split(number: usize, train: &[usize]) {
        let table = interactions();
        let splitter = GivenNumberSplitter::new(&table, "user", number).unwrap();

        assert_eq!(splitter.train_positions(0).unwrap(), train);
        assert_covers(&splitter);
    }

    #[test]
    fn test_given_number_unknown_field() {
        let table = interactions();
        assert!(matches!(
            GivenNumberSplitter::new(&table, "time", 1),
            Err(Error::InvalidArgument(_))
        ));
    }
}
