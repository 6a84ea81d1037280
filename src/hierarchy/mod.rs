mod build;
mod node;
mod resolve;

pub use build::{BuildStats, HierarchyBuilder};
pub use node::{Hierarchy, TreeNode};
