use std::collections::BTreeMap;
use std::fmt::Display;

use serde::Serialize;

use crate::error::{DashboardError, Result};

// ---------------------------------------------------------------------------
// Reductions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Reduction {
    Mean,
    Sum,
}

impl Reduction {
    /// `None` only for a mean over no values.
    pub fn apply(self, values: &[f64]) -> Option<f64> {
        match self {
            Reduction::Sum => Some(values.iter().sum()),
            Reduction::Mean if values.is_empty() => None,
            Reduction::Mean => Some(values.iter().sum::<f64>() / values.len() as f64),
        }
    }
}

/// Mean of the present values; `None` when nothing is present.
pub fn mean_of(values: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    let present: Vec<f64> = values.into_iter().flatten().collect();
    Reduction::Mean.apply(&present)
}

/// Sum of the present values; zero for no values.
pub fn sum_of(values: impl IntoIterator<Item = Option<f64>>) -> f64 {
    values.into_iter().flatten().sum()
}

/// One output column: which field to read and how to reduce it.
pub struct Reducer<R> {
    pub output: &'static str,
    pub field: fn(&R) -> Option<f64>,
    pub reduction: Reduction,
}

impl<R> Reducer<R> {
    pub fn new(output: &'static str, field: fn(&R) -> Option<f64>, reduction: Reduction) -> Self {
        Self {
            output,
            field,
            reduction,
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregation – grouped result
// ---------------------------------------------------------------------------

/// Grouped summary: one row of reduced values per distinct key, key-sorted.
///
/// A cell is `None` when its reduction had nothing to work with, e.g. the mean
/// of a column that is blank throughout the group.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation<K: Ord> {
    pub columns: Vec<String>,
    pub groups: BTreeMap<K, Vec<Option<f64>>>,
}

impl<K: Ord> Aggregation<K> {
    pub fn value(&self, key: &K, column: &str) -> Option<f64> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.groups.get(key).and_then(|row| row[idx])
    }

    /// `(key, value)` pairs of one column in key order.
    pub fn series(&self, column: &str) -> Vec<(&K, Option<f64>)> {
        match self.columns.iter().position(|c| c == column) {
            Some(idx) => self.groups.iter().map(|(k, row)| (k, row[idx])).collect(),
            None => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Partition record indices by key. Records whose key is `None` are left out;
/// every other index lands in exactly one group.
pub fn group_indices<R, K, F>(records: &[R], key: F) -> BTreeMap<K, Vec<usize>>
where
    K: Ord,
    F: Fn(&R) -> Option<K>,
{
    let mut groups: BTreeMap<K, Vec<usize>> = BTreeMap::new();
    for (i, rec) in records.iter().enumerate() {
        if let Some(k) = key(rec) {
            groups.entry(k).or_default().push(i);
        }
    }
    groups
}

/// Reduce one column of one group.
fn reduce_group<R, K: Display>(
    records: &[R],
    members: &[usize],
    key: &K,
    reducer: &Reducer<R>,
) -> Result<f64> {
    let values: Vec<f64> = members
        .iter()
        .filter_map(|&i| (reducer.field)(&records[i]))
        .collect();
    reducer
        .reduction
        .apply(&values)
        .ok_or_else(|| DashboardError::EmptyGroup {
            group: key.to_string(),
            column: reducer.output.to_string(),
        })
}

/// Group `records` by `key` and reduce each group with `reducers`.
///
/// Only keys present in the input produce a row, so an empty input yields an
/// empty aggregation. Records without a key are dropped. Absent field values
/// are skipped; a mean with nothing left to average becomes `None` for that
/// cell only.
pub fn aggregate_by_key<R, K, F>(records: &[R], key: F, reducers: &[Reducer<R>]) -> Aggregation<K>
where
    K: Ord + Display,
    F: Fn(&R) -> Option<K>,
{
    let mut groups = BTreeMap::new();
    for (k, members) in group_indices(records, key) {
        let row = reducers
            .iter()
            .map(|red| match reduce_group(records, &members, &k, red) {
                Ok(v) => Some(v),
                Err(e) => {
                    log::debug!("{e}; shown as not available");
                    None
                }
            })
            .collect();
        groups.insert(k, row);
    }

    Aggregation {
        columns: reducers.iter().map(|r| r.output.to_string()).collect(),
        groups,
    }
}
