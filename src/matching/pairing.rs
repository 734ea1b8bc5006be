//! Column pairing of two grids.
//!
//! Aligns two collections of grid entries by topology alone: entries are
//! grouped by column, columns are ordered left to right, and entries within a
//! column are ordered front before back, then top to bottom. The n-th entry
//! of the n-th column of one grid pairs with the n-th entry of the n-th
//! column of the other. Absolute column and row values never need to agree.

use std::collections::BTreeMap;

use crate::geometry::{compare_side_then_row, GridEntry};

/// A way in which two grids failed to line up.
#[derive(Clone, Debug, PartialEq)]
pub enum PairColumnEntriesIssue<T, U> {
    /// The grids have a different number of non-empty columns.
    ColumnCountMismatch { counts: (usize, usize) },
    /// The column at `column_index` holds a different number of entries in
    /// each grid. The unpaired tail of the longer column is carried along.
    ColumnEntryCountMismatch {
        column_index: usize,
        counts: (usize, usize),
        extra_left: Vec<T>,
        extra_right: Vec<U>,
    },
}

/// Every pair that could be formed, plus why the rest could not.
#[derive(Clone, Debug, PartialEq)]
pub struct PairColumnEntriesError<T, U> {
    pub pairs: Vec<(T, U)>,
    pub issues: Vec<PairColumnEntriesIssue<T, U>>,
}

fn into_columns<T: GridEntry>(entries: impl IntoIterator<Item = T>) -> Vec<Vec<T>> {
    let mut by_column: BTreeMap<i32, Vec<T>> = BTreeMap::new();
    for entry in entries {
        by_column.entry(entry.column()).or_default().push(entry);
    }
    by_column
        .into_values()
        .map(|mut column| {
            column.sort_by(compare_side_then_row);
            column
        })
        .collect()
}

/// Pairs the entries of two grids column by column.
///
/// On success every entry of both grids is in exactly one pair. Otherwise the
/// error still carries every pair that could be formed: columns are zipped up
/// to the shorter column count, and entries up to the shorter column length.
pub fn pair_column_entries<T, U>(
    left: impl IntoIterator<Item = T>,
    right: impl IntoIterator<Item = U>,
) -> Result<Vec<(T, U)>, PairColumnEntriesError<T, U>>
where
    T: GridEntry,
    U: GridEntry,
{
    let left_columns = into_columns(left);
    let right_columns = into_columns(right);
    let mut pairs = Vec::new();
    let mut issues = Vec::new();

    if left_columns.len() != right_columns.len() {
        issues.push(PairColumnEntriesIssue::ColumnCountMismatch {
            counts: (left_columns.len(), right_columns.len()),
        });
    }

    for (column_index, (mut left_column, mut right_column)) in
        left_columns.into_iter().zip(right_columns).enumerate()
    {
        let counts = (left_column.len(), right_column.len());
        let paired = counts.0.min(counts.1);
        let extra_left = left_column.split_off(paired);
        let extra_right = right_column.split_off(paired);

        pairs.extend(left_column.into_iter().zip(right_column));

        if counts.0 != counts.1 {
            issues.push(PairColumnEntriesIssue::ColumnEntryCountMismatch {
                column_index,
                counts,
                extra_left,
                extra_right,
            });
        }
    }

    if issues.is_empty() {
        Ok(pairs)
    } else {
        Err(PairColumnEntriesError { pairs, issues })
    }
}
