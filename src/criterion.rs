//! Split criterion
//!
//! Entropy based scoring of candidate binary splits. These are pure
//! functions, the tree engine calls them for every candidate
//! `(feature, threshold)` pair during the split search.
use crate::data::FloatData;
use hashbrown::HashMap;

/// Shannon entropy, in bits, of a set of class labels.
///
/// Computed from the empirical class histogram. Classes with zero
/// probability contribute nothing, so the result is exactly `0.0` when all
/// labels are identical, and at most `log2(k)` for `k` distinct classes.
pub fn entropy(y: &[usize]) -> f64 {
    let mut counts: HashMap<usize, usize> = HashMap::new();
    for label in y {
        *counts.entry(*label).or_insert(0) += 1;
    }
    let n = y.len() as f64;
    counts
        .values()
        .map(|&count| {
            let p = count as f64 / n;
            -p * p.log2()
        })
        .sum()
}

/// Partition the positions of a column by a threshold.
///
/// Returns the positions with `value <= threshold` on the left and
/// `value > threshold` on the right, both in their original order. This is
/// the single place the split rule lives, both gain scoring and tree
/// growth partition through it.
pub fn split_column<T: FloatData<T>>(column: &[T], threshold: T) -> (Vec<usize>, Vec<usize>) {
    let mut left = Vec::new();
    let mut right = Vec::new();
    for (i, value) in column.iter().enumerate() {
        if *value <= threshold {
            left.push(i);
        } else {
            right.push(i);
        }
    }
    (left, right)
}

/// Information gain of splitting `column` at `threshold`.
///
/// Parent entropy minus the row-count weighted average of the child
/// entropies. A split that leaves either side empty gains exactly `0.0`,
/// so a degenerate split is never preferred over a real one.
pub fn information_gain<T: FloatData<T>>(y: &[usize], column: &[T], threshold: T) -> f64 {
    debug_assert_eq!(y.len(), column.len());
    let parent_entropy = entropy(y);

    let (left, right) = split_column(column, threshold);
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }

    let left_labels = left.iter().map(|&i| y[i]).collect::<Vec<usize>>();
    let right_labels = right.iter().map(|&i| y[i]).collect::<Vec<usize>>();

    let n = y.len() as f64;
    let child_entropy = (left_labels.len() as f64 / n) * entropy(&left_labels)
        + (right_labels.len() as f64 / n) * entropy(&right_labels);

    parent_entropy - child_entropy
}
