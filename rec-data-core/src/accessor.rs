//! Positional row/column access shared by tables and their derived views

use std::iter::FusedIterator;

use crate::dictionary::Code;

/// Read access to a position-aligned set of discrete and continuous columns
///
/// Positions are dense in `0..size()` and identical across every column.
/// Dimensions are numbered separately for discrete and continuous columns, in
/// declaration order. Value lookups index straight into storage and panic on
/// an out-of-range dimension or position, like slice indexing.
pub trait DataAccessor {
    /// Number of rows
    fn size(&self) -> usize;

    /// Number of discrete dimensions
    fn discrete_order(&self) -> usize;

    /// Number of continuous dimensions
    fn continuous_order(&self) -> usize;

    /// Dimension of a discrete field
    fn discrete_dimension(&self, name: &str) -> Option<usize>;

    /// Dimension of a continuous field
    fn continuous_dimension(&self, name: &str) -> Option<usize>;

    /// Field name of a discrete dimension
    fn discrete_name(&self, dimension: usize) -> &str;

    /// Field name of a continuous dimension
    fn continuous_name(&self, dimension: usize) -> &str;

    /// Number of distinct codes a discrete dimension may hold
    fn discrete_cardinality(&self, dimension: usize) -> usize;

    /// Code of a discrete dimension at a position
    fn discrete_value(&self, dimension: usize, position: usize) -> Code;

    /// Value of a continuous dimension at a position
    fn continuous_value(&self, dimension: usize, position: usize) -> f32;

    /// Check if there are no rows
    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// View of the row at `position`
    fn row(&self, position: usize) -> RowView<'_, Self> {
        RowView {
            accessor: self,
            position,
        }
    }

    /// Iterate over all rows in position order
    fn rows(&self) -> Rows<'_, Self> {
        Rows {
            accessor: self,
            next: 0,
            end: self.size(),
        }
    }
}

impl<A: DataAccessor + ?Sized> DataAccessor for &A {
    fn size(&self) -> usize {
        (**self).size()
    }

    fn discrete_order(&self) -> usize {
        (**self).discrete_order()
    }

    fn continuous_order(&self) -> usize {
        (**self).continuous_order()
    }

    fn discrete_dimension(&self, name: &str) -> Option<usize> {
        (**self).discrete_dimension(name)
    }

    fn continuous_dimension(&self, name: &str) -> Option<usize> {
        (**self).continuous_dimension(name)
    }

    fn discrete_name(&self, dimension: usize) -> &str {
        (**self).discrete_name(dimension)
    }

    fn continuous_name(&self, dimension: usize) -> &str {
        (**self).continuous_name(dimension)
    }

    fn discrete_cardinality(&self, dimension: usize) -> usize {
        (**self).discrete_cardinality(dimension)
    }

    fn discrete_value(&self, dimension: usize, position: usize) -> Code {
        (**self).discrete_value(dimension, position)
    }

    fn continuous_value(&self, dimension: usize, position: usize) -> f32 {
        (**self).continuous_value(dimension, position)
    }
}

/// One row of an accessor
pub struct RowView<'a, A: ?Sized> {
    accessor: &'a A,
    position: usize,
}

impl<'a, A: DataAccessor + ?Sized> RowView<'a, A> {
    /// Position of this row
    pub fn position(&self) -> usize {
        self.position
    }

    /// Code of a discrete dimension in this row
    pub fn discrete(&self, dimension: usize) -> Code {
        self.accessor.discrete_value(dimension, self.position)
    }

    /// Value of a continuous dimension in this row
    pub fn continuous(&self, dimension: usize) -> f32 {
        self.accessor.continuous_value(dimension, self.position)
    }

    /// Code of a discrete field in this row, looked up by name
    pub fn discrete_by_name(&self, name: &str) -> Option<Code> {
        self.accessor.discrete_dimension(name).map(|dimension| self.discrete(dimension))
    }

    /// Value of a continuous field in this row, looked up by name
    pub fn continuous_by_name(&self, name: &str) -> Option<f32> {
        self.accessor.continuous_dimension(name).map(|dimension| self.continuous(dimension))
    }
}

impl<'a, A: ?Sized> Clone for RowView<'a, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, A: ?Sized> Copy for RowView<'a, A> {}

/// Iterator over the rows of an accessor, in position order
pub struct Rows<'a, A: ?Sized> {
    accessor: &'a A,
    next: usize,
    end: usize,
}

impl<'a, A: DataAccessor + ?Sized> Iterator for Rows<'a, A> {
    type Item = RowView<'a, A>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let row = RowView {
            accessor: self.accessor,
            position: self.next,
        };
        self.next += 1;
        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.next;
        (remaining, Some(remaining))
    }
}

impl<'a, A: DataAccessor + ?Sized> ExactSizeIterator for Rows<'a, A> {}

impl<'a, A: DataAccessor + ?Sized> FusedIterator for Rows<'a, A> {}
