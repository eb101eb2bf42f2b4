use tracing::debug;

use crate::accessor::{DataAccessor, RowView};
use crate::error::Result;

use super::{single_fold, DataSplitter, Fold};

/// Sends every row matching a predicate to test and the rest to training
pub struct PredicateSplitter<'a, A: ?Sized> {
    accessor: &'a A,
    fold: Fold,
}

impl<'a, A> PredicateSplitter<'a, A>
where
    A: DataAccessor + ?Sized,
{
    /// Split in a single ordered pass over the rows of `accessor`
    pub fn new<F>(accessor: &'a A, predicate: F) -> Self
    where
        F: Fn(RowView<'_, A>) -> bool,
    {
        let mut fold = Fold::default();
        for row in accessor.rows() {
            if predicate(row) {
                fold.test.push(row.position());
            } else {
                fold.train.push(row.position());
            }
        }

        debug!(train = fold.train.len(), test = fold.test.len(), "Predicate split");
        Self { accessor, fold }
    }
}

impl<'a, A> DataSplitter for PredicateSplitter<'a, A>
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::split::assert_covers;
    use crate::table::tests::interactions;

    #[test]
    fn test_predicate_on_continuous_field() {
        let table = interactions();
        let time = table.continuous_dimension("time").unwrap();

        let splitter = PredicateSplitter::new(&table, |row| row.continuous(time) >= 103.0);

        assert_eq!(splitter.train_positions(0).unwrap(), &[0, 1, 2]);
        assert_eq!(splitter.test_positions(0).unwrap(), &[3, 4]);
        assert_covers(&splitter);
    }

    #[test]
    fn test_predicate_on_discrete_field() {
        let table = interactions();
        let user_b = table
            .dictionary("user")
            .and_then(|dictionary| dictionary.code_of(&crate::schema::Value::String("B".into())))
            .unwrap();

        let splitter = PredicateSplitter::new(&table, |row| row.discrete_by_name("user") == Some(user_b));

        assert_eq!(splitter.test_positions(0).unwrap(), &[2, 4]);
        assert_covers(&splitter);
    }

    #[test]
    fn test_constant_predicates() {
        let table = interactions();

        let none = PredicateSplitter::new(&table, |_| false);
        assert_eq!(none.train_positions(0).unwrap().len(), 5);
        assert!(none.test_positions(0).unwrap().is_empty());

        let all = PredicateSplitter::new(&table, |_| true);
        assert!(all.train_positions(0).unwrap().is_empty());
        assert_eq!(all.test_positions(0).unwrap().len(), 5);
    }
}
