//! Decision tree
//!
//! A binary classification tree grown by recursive partitioning, using
//! information gain to pick the best `(feature, threshold)` split at every
//! node.
use crate::criterion::{information_gain, split_column};
use crate::data::{FloatData, Matrix};
use crate::errors::SaplingError;
use crate::node::Node;
use crate::sampler::sample_feature_indices;
use crate::utils::{most_frequent_class, n_distinct_classes, unique_sorted};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::fs;

/// An information gain decision tree classifier.
///
/// Rows of the feature matrix are samples, labels are dense integer class
/// ids. The tree is grown once by [`DecisionTree::fit`] and is read only
/// afterwards, so a fitted tree can be shared freely across threads for
/// prediction.
#[derive(Deserialize, Serialize, Clone)]
pub struct DecisionTree {
    /// Minimum number of samples required to attempt a split.
    pub min_samples_split: usize,
    /// Hard ceiling on the recursion depth.
    pub max_depth: usize,
    /// Number of features sampled, without replacement, at every split
    /// decision. Defaults to all features, larger values are clamped.
    pub n_features_per_split: Option<usize>,
    /// Seed of the rng driving the per split feature sampling.
    pub seed: u64,
    /// The nodes of the fitted tree, the root is node 0.
    pub nodes: Vec<Node>,
    /// Depth of the fitted tree.
    pub depth: usize,
    /// Number of leaves of the fitted tree.
    pub n_leaves: usize,
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionTree {
    /// Create a new decision tree with default parameters.
    pub fn new() -> Self {
        DecisionTree {
            min_samples_split: 2,
            max_depth: 100,
            n_features_per_split: None,
            seed: 0,
            nodes: Vec::new(),
            depth: 0,
            n_leaves: 0,
        }
    }

    // Set methods for parameters

    /// Set the minimum number of samples required to attempt a split.
    pub fn set_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    /// Set the maximum depth of the tree.
    pub fn set_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the number of features sampled at every split decision.
    pub fn set_n_features_per_split(mut self, n_features_per_split: Option<usize>) -> Self {
        self.n_features_per_split = n_features_per_split;
        self
    }

    /// Set the seed of the feature sampling rng.
    pub fn set_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Whether the tree has been fit.
    pub fn is_fitted(&self) -> bool {
        !self.nodes.is_empty()
    }

    /// Fit the tree on a feature matrix and aligned label vector.
    ///
    /// Any previously fitted tree is replaced.
    ///
    /// * `data` - Feature matrix, rows are samples.
    /// * `y` - One class id per row of `data`.
    pub fn fit<T: FloatData<T>>(&mut self, data: &Matrix<T>, y: &[usize]) -> Result<(), SaplingError> {
        if data.rows == 0 || y.is_empty() {
            return Err(SaplingError::EmptyData);
        }
        if data.rows != y.len() {
            return Err(SaplingError::DimensionMismatch(data.rows, y.len()));
        }
        let n_feats = match self.n_features_per_split {
            Some(k) if k > data.cols => {
                warn!(
                    "n_features_per_split {} is larger than the {} available features, clamping.",
                    k, data.cols
                );
                data.cols
            }
            Some(k) => k,
            None => data.cols,
        };

        self.nodes.clear();
        self.depth = 0;
        self.n_leaves = 0;

        let mut rng = StdRng::seed_from_u64(self.seed);
        let index = (0..data.rows).collect::<Vec<usize>>();
        // The root set is never empty, the fallback class is arbitrary.
        self.grow(data, y, &index, 0, n_feats, &mut rng, y[0]);

        info!(
            "Grew a tree with {} nodes, {} leaves, depth {}.",
            self.nodes.len(),
            self.n_leaves,
            self.depth
        );
        Ok(())
    }

    /// Grow the subtree over the samples in `index`, returning the arena
    /// index of its root node.
    ///
    /// `fallback_class` is the majority class of the parent subset. It
    /// labels the leaf produced when a degenerate winning split hands an
    /// empty partition to one side.
    #[allow(clippy::too_many_arguments)]
    fn grow<T: FloatData<T>>(
        &mut self,
        data: &Matrix<T>,
        y: &[usize],
        index: &[usize],
        depth: usize,
        n_feats: usize,
        rng: &mut StdRng,
        fallback_class: usize,
    ) -> usize {
        let num = self.nodes.len();
        self.depth = self.depth.max(depth);

        if index.is_empty() {
            self.nodes.push(Node::new_leaf(num, depth, fallback_class));
            self.n_leaves += 1;
            return num;
        }

        let labels = index.iter().map(|&i| y[i]).collect::<Vec<usize>>();
        let majority = most_frequent_class(&labels);

        // Stopping rules, checked before any split search.
        if depth >= self.max_depth || n_distinct_classes(&labels) == 1 || index.len() < self.min_samples_split {
            self.nodes.push(Node::new_leaf(num, depth, majority));
            self.n_leaves += 1;
            return num;
        }

        let feat_idxs = sample_feature_indices(rng, data.cols, n_feats);

        // Score every candidate feature independently. Candidates are
        // reduced in ascending feature order afterwards, so the result is
        // identical to a sequential scan with a strict `>` comparison.
        let candidates = feat_idxs
            .par_iter()
            .map(|&feature| {
                let column = index.iter().map(|&i| *data.get(i, feature)).collect::<Vec<T>>();
                let mut best: Option<(f64, T)> = None;
                for threshold in unique_sorted(&column) {
                    let gain = information_gain(&labels, &column, threshold);
                    if best.map_or(true, |(best_gain, _)| gain > best_gain) {
                        best = Some((gain, threshold));
                    }
                }
                best.map(|(gain, threshold)| (gain, feature, threshold))
            })
            .collect::<Vec<Option<(f64, usize, T)>>>();

        // Any real split, including a zero gain one, beats the sentinel.
        let mut best_gain = -1.0;
        let mut best_split: Option<(usize, T)> = None;
        for (gain, feature, threshold) in candidates.into_iter().flatten() {
            if gain > best_gain {
                best_gain = gain;
                best_split = Some((feature, threshold));
            }
        }
        let (split_feature, split_value) = match best_split {
            Some(split) => split,
            None => {
                self.nodes.push(Node::new_leaf(num, depth, majority));
                self.n_leaves += 1;
                return num;
            }
        };

        let column = index.iter().map(|&i| *data.get(i, split_feature)).collect::<Vec<T>>();
        let (left_pos, right_pos) = split_column(&column, split_value);
        let left_index = left_pos.iter().map(|&p| index[p]).collect::<Vec<usize>>();
        let right_index = right_pos.iter().map(|&p| index[p]).collect::<Vec<usize>>();

        // Reserve this node's slot before growing the children.
        self.nodes.push(Node::new_leaf(num, depth, majority));
        let left_child = self.grow(data, y, &left_index, depth + 1, n_feats, rng, majority);
        let right_child = self.grow(data, y, &right_index, depth + 1, n_feats, rng, majority);
        self.nodes[num].make_parent_node(split_feature, split_value.as_f64(), best_gain, left_child, right_child);
        num
    }

    /// Predict the class id of every row of `data`.
    ///
    /// Traversal is read only, rows are evaluated in parallel and returned
    /// in input order.
    pub fn predict<T: FloatData<T>>(&self, data: &Matrix<T>) -> Result<Vec<usize>, SaplingError> {
        if !self.is_fitted() {
            return Err(SaplingError::NotFitted);
        }
        Ok((0..data.rows)
            .into_par_iter()
            .map(|row| self.predict_row(data, row))
            .collect())
    }

    fn predict_row<T: FloatData<T>>(&self, data: &Matrix<T>, row: usize) -> usize {
        let mut node = &self.nodes[0];
        while !node.is_leaf {
            let value = data.get(row, node.split_feature).as_f64();
            node = &self.nodes[node.get_child_idx(value)];
        }
        node.predicted_class
    }

    /// Save the tree as a json object to a file.
    ///
    /// * `path` - Path to save the tree.
    pub fn save_model(&self, path: &str) -> Result<(), SaplingError> {
        let model = self.json_dump()?;
        match fs::write(path, model) {
            Err(e) => Err(SaplingError::UnableToWrite(e.to_string())),
            Ok(_) => Ok(()),
        }
    }

    /// Dump the tree as a json object.
    pub fn json_dump(&self) -> Result<String, SaplingError> {
        match serde_json::to_string(self) {
            Ok(s) => Ok(s),
            Err(e) => Err(SaplingError::UnableToWrite(e.to_string())),
        }
    }

    /// Load a tree from a json string.
    ///
    /// * `json_str` - String object, which can be serialized to json.
    pub fn from_json(json_str: &str) -> Result<Self, SaplingError> {
        let model = serde_json::from_str::<DecisionTree>(json_str);
        match model {
            Ok(m) => Ok(m),
            Err(e) => Err(SaplingError::UnableToRead(e.to_string())),
        }
    }

    /// Load a tree from a path to a json tree object.
    ///
    /// * `path` - Path to load the tree from.
    pub fn load_model(path: &str) -> Result<Self, SaplingError> {
        let json_str = match fs::read_to_string(path) {
            Ok(s) => Ok(s),
            Err(e) => Err(SaplingError::UnableToRead(e.to_string())),
        }?;
        Self::from_json(&json_str)
    }
}

impl Display for DecisionTree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for node in &self.nodes {
            writeln!(f, "{}{}", "  ".repeat(node.depth), node)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::accuracy_score;

    fn column_matrix(v: &[f64]) -> Matrix<f64> {
        Matrix::new(v, v.len(), 1)
    }

    #[test]
    fn test_single_feature_perfect_split() {
        let v = vec![0.0, 1.0, 2.0, 3.0];
        let data = column_matrix(&v);
        let y = vec![0, 0, 1, 1];

        let mut tree = DecisionTree::new().set_max_depth(10);
        tree.fit(&data, &y).unwrap();

        let root = &tree.nodes[0];
        assert!(!root.is_leaf);
        assert_eq!(root.split_feature, 0);
        assert_eq!(root.split_value, 1.0);

        let preds = tree.predict(&data).unwrap();
        assert_eq!(preds, y);
        assert_eq!(accuracy_score(&y, &preds).unwrap(), 1.0);
    }

    #[test]
    fn test_uniform_labels_make_a_leaf_root() {
        let v = vec![3.0, 1.0, 4.0, 1.0];
        let data = column_matrix(&v);
        let y = vec![5, 5, 5, 5];

        let mut tree = DecisionTree::new();
        tree.fit(&data, &y).unwrap();

        assert_eq!(tree.nodes.len(), 1);
        assert!(tree.nodes[0].is_leaf);
        assert_eq!(tree.nodes[0].predicted_class, 5);
        assert_eq!(tree.depth, 0);

        let other = vec![9.0, -2.0, 0.5, 100.0];
        let preds = tree.predict(&column_matrix(&other)).unwrap();
        assert_eq!(preds, vec![5, 5, 5, 5]);
    }

    #[test]
    fn test_max_depth_zero_is_majority_vote() {
        let v = vec![0.0, 1.0, 2.0, 3.0, 4.0];
        let data = column_matrix(&v);
        let y = vec![1, 0, 1, 0, 1];

        let mut tree = DecisionTree::new().set_max_depth(0);
        tree.fit(&data, &y).unwrap();

        assert_eq!(tree.nodes.len(), 1);
        assert!(tree.nodes[0].is_leaf);
        assert_eq!(tree.nodes[0].predicted_class, 1);
        assert_eq!(tree.predict(&data).unwrap(), vec![1; 5]);
    }

    #[test]
    fn test_min_samples_split_forces_leaf() {
        let v = vec![0.0, 1.0, 2.0, 3.0];
        let data = column_matrix(&v);
        let y = vec![0, 0, 1, 1];

        let mut tree = DecisionTree::new().set_min_samples_split(10);
        tree.fit(&data, &y).unwrap();

        assert_eq!(tree.nodes.len(), 1);
        assert!(tree.nodes[0].is_leaf);
    }

    #[test]
    fn test_constant_feature_with_mixed_labels() {
        // Every candidate split is degenerate, growth must still
        // terminate and predict the majority class.
        let v = vec![1.0, 1.0, 1.0, 1.0];
        let data = column_matrix(&v);
        let y = vec![0, 1, 0, 1];

        let mut tree = DecisionTree::new().set_max_depth(3);
        tree.fit(&data, &y).unwrap();

        let preds = tree.predict(&data).unwrap();
        assert_eq!(preds, vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_two_features_multiclass() {
        // Class is decided by feature 1 first, then feature 0.
        #[rustfmt::skip]
        let v = vec![
            // feature 0
            1.0, 2.0, 8.0, 9.0, 1.0, 9.0,
            // feature 1
            0.0, 0.0, 0.0, 0.0, 5.0, 5.0,
        ];
        let data = Matrix::new(&v, 6, 2);
        let y = vec![0, 0, 1, 1, 2, 2];

        let mut tree = DecisionTree::new();
        tree.fit(&data, &y).unwrap();

        let preds = tree.predict(&data).unwrap();
        assert_eq!(preds, y);
        assert_eq!(accuracy_score(&y, &preds).unwrap(), 1.0);
    }

    #[test]
    fn test_every_internal_node_has_two_children() {
        let v = vec![
            0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 3.0, 3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0,
        ];
        let data = Matrix::new(&v, 8, 2);
        let y = vec![0, 1, 0, 1, 2, 2, 0, 1];

        let mut tree = DecisionTree::new();
        tree.fit(&data, &y).unwrap();

        let mut n_leaves = 0;
        for node in &tree.nodes {
            if node.is_leaf {
                n_leaves += 1;
            } else {
                assert_ne!(node.left_child, node.num);
                assert_ne!(node.right_child, node.num);
                assert!(node.left_child < tree.nodes.len());
                assert!(node.right_child < tree.nodes.len());
            }
        }
        assert_eq!(n_leaves, tree.n_leaves);
        // A strict binary tree has one more leaf than internal nodes.
        assert_eq!(tree.nodes.len(), 2 * n_leaves - 1);
    }

    #[test]
    fn test_prediction_is_deterministic() {
        let v = vec![
            0.0, 3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0, 5.0, 3.0, 5.0, 8.0, 9.0, 7.0, 9.0,
        ];
        let data = Matrix::new(&v, 8, 2);
        let y = vec![0, 1, 1, 0, 1, 0, 0, 1];

        let mut tree = DecisionTree::new();
        tree.fit(&data, &y).unwrap();
        assert_eq!(tree.predict(&data).unwrap(), tree.predict(&data).unwrap());
    }

    #[test]
    fn test_feature_subsampling_is_seeded() {
        let v = (0..40).map(f64::from).collect::<Vec<f64>>();
        let data = Matrix::new(&v, 10, 4);
        let y = vec![0, 1, 0, 1, 2, 2, 1, 0, 2, 1];

        let mut a = DecisionTree::new().set_n_features_per_split(Some(2)).set_seed(13);
        let mut b = DecisionTree::new().set_n_features_per_split(Some(2)).set_seed(13);
        a.fit(&data, &y).unwrap();
        b.fit(&data, &y).unwrap();

        assert_eq!(a.json_dump().unwrap(), b.json_dump().unwrap());
        assert_eq!(a.predict(&data).unwrap(), b.predict(&data).unwrap());
    }

    #[test]
    fn test_n_features_per_split_is_clamped() {
        let v = vec![0.0, 1.0, 2.0, 3.0];
        let data = column_matrix(&v);
        let y = vec![0, 0, 1, 1];

        let mut tree = DecisionTree::new().set_n_features_per_split(Some(100));
        tree.fit(&data, &y).unwrap();
        assert_eq!(tree.predict(&data).unwrap(), y);
    }

    #[test]
    fn test_refit_replaces_tree() {
        let v = vec![0.0, 1.0, 2.0, 3.0];
        let data = column_matrix(&v);

        let mut tree = DecisionTree::new();
        tree.fit(&data, &[0, 0, 1, 1]).unwrap();
        assert!(tree.nodes.len() > 1);

        tree.fit(&data, &[4, 4, 4, 4]).unwrap();
        assert_eq!(tree.nodes.len(), 1);
        assert_eq!(tree.predict(&data).unwrap(), vec![4; 4]);
    }

    #[test]
    fn test_predict_before_fit_errors() {
        let v = vec![0.0, 1.0];
        let data = column_matrix(&v);
        let tree = DecisionTree::new();
        assert!(matches!(tree.predict(&data), Err(SaplingError::NotFitted)));
    }

    #[test]
    fn test_fit_input_validation() {
        let mut tree = DecisionTree::new();

        let empty: Vec<f64> = Vec::new();
        let data = Matrix::new(&empty, 0, 0);
        assert!(matches!(tree.fit(&data, &[]), Err(SaplingError::EmptyData)));

        let v = vec![0.0, 1.0, 2.0];
        let data = column_matrix(&v);
        assert!(matches!(
            tree.fit(&data, &[0, 1]),
            Err(SaplingError::DimensionMismatch(3, 2))
        ));
    }

    #[test]
    fn test_f32_features() {
        let v: Vec<f32> = vec![0.0, 1.0, 2.0, 3.0];
        let data = Matrix::new(&v, 4, 1);
        let y = vec![0, 0, 1, 1];

        let mut tree = DecisionTree::new();
        tree.fit(&data, &y).unwrap();
        assert_eq!(tree.predict(&data).unwrap(), y);
    }

    #[test]
    fn test_json_round_trip() {
        let v = vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let data = Matrix::new(&v, 4, 2);
        let y = vec![0, 1, 1, 0];

        let mut tree = DecisionTree::new();
        tree.fit(&data, &y).unwrap();

        let json = tree.json_dump().unwrap();
        let loaded = DecisionTree::from_json(&json).unwrap();
        assert_eq!(loaded.predict(&data).unwrap(), tree.predict(&data).unwrap());
        assert_eq!(loaded.nodes.len(), tree.nodes.len());
        assert_eq!(loaded.depth, tree.depth);
    }

    #[test]
    fn test_display_prints_every_node() {
        let v = vec![0.0, 1.0, 2.0, 3.0];
        let data = column_matrix(&v);
        let mut tree = DecisionTree::new();
        tree.fit(&data, &[0, 0, 1, 1]).unwrap();

        let printed = format!("{}", tree);
        assert_eq!(printed.lines().count(), tree.nodes.len());
        assert!(printed.contains("leaf=0"));
        assert!(printed.contains("leaf=1"));
    }
}
