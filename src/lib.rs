// Modules
pub mod criterion;
pub mod data;
pub mod errors;
pub mod metric;
pub mod node;
pub mod sampler;
pub mod tree;
pub mod utils;

// Individual classes, and functions
pub use data::Matrix;
pub use metric::accuracy_score;
pub use tree::DecisionTree;
