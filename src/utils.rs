//! Utility functions shared by the tree engine and its tests.
use crate::data::FloatData;
use hashbrown::HashMap;

/// The most frequent class in a set of labels.
///
/// Ties are broken by the first label, in slice order, that reaches the
/// maximum count. The second pass over the labels keeps the result
/// independent of map iteration order.
pub fn most_frequent_class(y: &[usize]) -> usize {
    debug_assert!(!y.is_empty());
    let mut counts: HashMap<usize, usize> = HashMap::new();
    for label in y {
        *counts.entry(*label).or_insert(0) += 1;
    }
    let mut best_count = 0;
    let mut best_label = y[0];
    for label in y {
        let count = counts[label];
        if count > best_count {
            best_count = count;
            best_label = *label;
        }
    }
    best_label
}

/// Number of distinct classes in a set of labels.
pub fn n_distinct_classes(y: &[usize]) -> usize {
    let mut seen = hashbrown::HashSet::new();
    for label in y {
        seen.insert(*label);
    }
    seen.len()
}

/// The distinct values of a column, in ascending order.
///
/// These are the candidate thresholds of the split search. Sorting keeps
/// the enumeration order fixed, which is what makes the first-found
/// tie-break deterministic.
pub fn unique_sorted<T: FloatData<T>>(column: &[T]) -> Vec<T> {
    let mut values = column.to_vec();
    values.sort_by(|a, b| a.partial_cmp(b).unwrap());
    values.dedup();
    values
}

/// Round to a specific number of digits, for float comparison in tests.
pub fn precision_round(n: f64, precision: i32) -> f64 {
    let p = (10.0_f64).powi(precision);
    (n * p).round() / p
}
