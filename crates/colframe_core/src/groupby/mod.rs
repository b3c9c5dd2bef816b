//! Hash based grouping of dataframe rows.

pub mod aggregate;

use colframe_error::{FrameError, Result};
use hashbrown::raw::RawTable;
use tracing::debug;

pub use self::aggregate::AggKind;
use crate::array::Array;
use crate::compute::hash::hash_arrays;
use crate::frame::DataFrame;
use crate::series::Series;

/// Name of the aggregate result column.
pub const AGG_COLUMN_NAME: &str = "";

/// Row positions for each distinct key, in first-seen key order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GroupIndices {
    /// Row that first produced each key.
    first: Vec<usize>,
    /// All rows for each key, in row order.
    groups: Vec<Vec<usize>>,
}

impl GroupIndices {
    /// Partition rows by the values of one or more key arrays.
    ///
    /// Keys are compared by value, nulls being equal to other nulls. All
    /// arrays must be the same length.
    pub fn compute(keys: &[&Array]) -> Self {
        let num_rows = keys.first().map(|arr| arr.len()).unwrap_or(0);

        let mut hashes = vec![0; num_rows];
        hash_arrays(keys, &mut hashes);

        // (hash, group index)
        let mut table: RawTable<(u64, usize)> = RawTable::new();
        let mut indices = GroupIndices::default();

        for (row, &hash) in hashes.iter().enumerate() {
            let existing = table
                .get(hash, |&(entry_hash, group)| {
                    entry_hash == hash && rows_eq(keys, indices.first[group], row)
                })
                .map(|&(_, group)| group);

            match existing {
                Some(group) => indices.groups[group].push(row),
                None => {
                    let group = indices.groups.len();
                    indices.first.push(row);
                    indices.groups.push(vec![row]);
                    table.insert(hash, (hash, group), |&(hash, _)| hash);
                }
            }
        }

        indices
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn first(&self) -> &[usize] {
        &self.first
    }

    pub fn groups(&self) -> &[Vec<usize>] {
        &self.groups
    }
}

fn rows_eq(keys: &[&Array], left: usize, right: usize) -> bool {
    keys.iter().all(|arr| arr.rows_eq(left, arr, right))
}

/// A dataframe grouped by one or more key columns.
#[derive(Debug)]
pub struct GroupBy<'a> {
    df: &'a DataFrame,
    keys: Vec<usize>,
    indices: GroupIndices,
}

impl<'a> GroupBy<'a> {
    pub(crate) fn try_new(df: &'a DataFrame, by: &[&str]) -> Result<Self> {
        if by.is_empty() {
            return Err(FrameError::InvalidArgument(
                "Group by requires at least one key column".to_string(),
            ));
        }

        let keys = by
            .iter()
            .map(|name| df.try_column_index(name))
            .collect::<Result<Vec<_>>>()?;

        let arrays: Vec<_> = keys.iter().map(|&idx| df.columns()[idx].array()).collect();
        let indices = GroupIndices::compute(&arrays);

        debug!(rows = df.height(), groups = indices.len(), "grouped dataframe");

        Ok(GroupBy { df, keys, indices })
    }

    pub fn groups(&self) -> &GroupIndices {
        &self.indices
    }

    /// Select the column that aggregations will reduce.
    pub fn select(self, column: &str) -> Result<GroupBySelection<'a>> {
        let column = self.df.try_column_index(column)?;
        Ok(GroupBySelection {
            groupby: self,
            column,
        })
    }

    /// Aggregate a column, producing one row per distinct key.
    ///
    /// The key columns come first followed by the aggregate column, named
    /// with an empty string.
    pub fn agg(&self, column: &str, kind: AggKind) -> Result<DataFrame> {
        let column = self.df.try_column_index(column)?;
        self.agg_at(column, kind)
    }

    fn agg_at(&self, column: usize, kind: AggKind) -> Result<DataFrame> {
        let mut columns: Vec<Series> = self
            .keys
            .iter()
            .map(|&idx| self.df.columns()[idx].take_unchecked(self.indices.first()))
            .collect();

        let values = &self.df.columns()[column];
        let result = aggregate::aggregate(values.array(), self.indices.groups(), kind)?;
        columns.push(Series::from_array(AGG_COLUMN_NAME, result));

        DataFrame::new(columns)
    }
}

/// A grouped dataframe with a column selected for aggregation.
#[derive(Debug)]
pub struct GroupBySelection<'a> {
    groupby: GroupBy<'a>,
    column: usize,
}

impl GroupBySelection<'_> {
    pub fn groups(&self) -> &GroupIndices {
        self.groupby.groups()
    }

    pub fn agg(&self, kind: AggKind) -> Result<DataFrame> {
        self.groupby.agg_at(self.column, kind)
    }

    pub fn sum(&self) -> Result<DataFrame> {
        self.agg(AggKind::Sum)
    }

    pub fn min(&self) -> Result<DataFrame> {
        self.agg(AggKind::Min)
    }

    pub fn max(&self) -> Result<DataFrame> {
        self.agg(AggKind::Max)
    }

    pub fn mean(&self) -> Result<DataFrame> {
        self.agg(AggKind::Mean)
    }

    pub fn first(&self) -> Result<DataFrame> {
        self.agg(AggKind::First)
    }

    pub fn last(&self) -> Result<DataFrame> {
        self.agg(AggKind::Last)
    }

    /// Count of non-null values per group.
    pub fn count(&self) -> Result<DataFrame> {
        self.agg(AggKind::Count)
    }

    pub fn n_unique(&self) -> Result<DataFrame> {
        self.agg(AggKind::NUnique)
    }

    pub fn quantile(&self, q: f64) -> Result<DataFrame> {
        self.agg(AggKind::Quantile(q))
    }
}
