use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TreeNode {
    pub title: String,
    pub level: usize,
    pub children: Vec<TreeNode>,
    pub tooltip_data: BTreeMap<String, String>,
}

impl TreeNode {
    pub fn new(title: impl Into<String>, level: usize) -> Self {
        Self {
            title: title.into(),
            level,
            children: Vec::new(),
            tooltip_data: BTreeMap::new(),
        }
    }

    #[cfg(test)]
    pub fn child(&self, title: &str) -> Option<&TreeNode> {
        self.children.iter().find(|child| child.title == title)
    }

    #[cfg(test)]
    pub fn child_titles(&self) -> Vec<&str> {
        self.children.iter().map(|child| child.title.as_str()).collect()
    }

    /// Follows `titles` downward from this node.
    #[cfg(test)]
    pub fn descend<'a>(&'a self, titles: &[&str]) -> Option<&'a TreeNode> {
        titles
            .iter()
            .try_fold(self, |node, title| node.child(title))
    }

    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::node_count).sum::<usize>()
    }

    pub fn depth(&self) -> usize {
        self.children
            .iter()
            .map(|child| child.depth() + 1)
            .max()
            .unwrap_or(0)
    }
}

/// The set of root trees produced by one build. Currently always one root,
/// keyed by the configured root value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Hierarchy {
    pub roots: Vec<TreeNode>,
}

impl Hierarchy {
    pub fn root(&self) -> Option<&TreeNode> {
        self.roots.first()
    }

    pub fn node_count(&self) -> usize {
        self.roots.iter().map(TreeNode::node_count).sum()
    }
}
