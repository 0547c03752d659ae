use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};

/// A single node of a fitted decision tree.
///
/// Nodes live in a flat arena owned by the tree and refer to their children
/// by index. A node is either a split node, in which case `split_feature`,
/// `split_value`, `left_child` and `right_child` are meaningful, or a leaf,
/// in which case only `predicted_class` is. The two constructors keep those
/// states disjoint.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct Node {
    pub num: usize,
    pub depth: usize,
    pub split_feature: usize,
    pub split_value: f64,
    pub split_gain: f64,
    pub left_child: usize,
    pub right_child: usize,
    pub is_leaf: bool,
    pub predicted_class: usize,
}

impl Node {
    /// Create a leaf node predicting a single class.
    pub fn new_leaf(num: usize, depth: usize, predicted_class: usize) -> Self {
        Node {
            num,
            depth,
            split_feature: 0,
            split_value: 0.0,
            split_gain: 0.0,
            left_child: 0,
            right_child: 0,
            is_leaf: true,
            predicted_class,
        }
    }

    /// Update all the info that is needed if this node is a
    /// parent node, once both of its children have been grown.
    pub fn make_parent_node(
        &mut self,
        split_feature: usize,
        split_value: f64,
        split_gain: f64,
        left_child: usize,
        right_child: usize,
    ) {
        self.is_leaf = false;
        self.split_feature = split_feature;
        self.split_value = split_value;
        self.split_gain = split_gain;
        self.left_child = left_child;
        self.right_child = right_child;
    }

    /// Get the path that should be traveled down, given a value.
    /// Values less than or equal to the split value go left.
    pub fn get_child_idx(&self, v: f64) -> usize {
        if v <= self.split_value {
            self.left_child
        } else {
            self.right_child
        }
    }
}

impl fmt::Display for Node {
    // This trait requires `fmt` with this exact signature.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_leaf {
            write!(f, "{}:leaf={}", self.num, self.predicted_class)
        } else {
            write!(
                f,
                "{}:[{} <= {}] yes={},no={},gain={}",
                self.num, self.split_feature, self.split_value, self.left_child, self.right_child, self.split_gain
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_has_no_children() {
        let node = Node::new_leaf(3, 2, 7);
        assert!(node.is_leaf);
        assert_eq!(node.predicted_class, 7);
        assert_eq!(format!("{}", node), "3:leaf=7");
    }

    #[test]
    fn test_make_parent_node() {
        let mut node = Node::new_leaf(0, 0, 1);
        node.make_parent_node(2, 1.5, 0.81, 1, 2);
        assert!(!node.is_leaf);
        assert_eq!(node.get_child_idx(1.5), 1);
        assert_eq!(node.get_child_idx(1.6), 2);
        assert_eq!(format!("{}", node), "0:[2 <= 1.5] yes=1,no=2,gain=0.81");
    }
}
