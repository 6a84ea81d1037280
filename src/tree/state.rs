use std::collections::BTreeMap;
use std::fmt;
use std::mem;

use crate::hierarchy::{Hierarchy, TreeNode};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Titles from the root down to a node. Stable identity for one visual
/// element across layouts: two nodes sharing a title under different parents
/// have different paths.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodePath(Vec<String>);

impl NodePath {
    pub fn root(title: &str) -> Self {
        Self(vec![title.to_owned()])
    }

    pub fn child(&self, title: &str) -> Self {
        let mut titles = self.0.clone();
        titles.push(title.to_owned());
        Self(titles)
    }

    pub fn parent(&self) -> Option<Self> {
        (self.0.len() > 1).then(|| Self(self.0[..self.0.len() - 1].to_vec()))
    }

    pub fn titles(&self) -> &[String] {
        &self.0
    }

    #[cfg(test)]
    pub fn depth(&self) -> usize {
        self.0.len().saturating_sub(1)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" / "))
    }
}

/// A node's descendants are either shown or held back; never both.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Branch {
    Expanded(Vec<NodeId>),
    Collapsed(Vec<NodeId>),
}

impl Branch {
    pub fn children(&self) -> &[NodeId] {
        match self {
            Self::Expanded(children) | Self::Collapsed(children) => children,
        }
    }

    pub fn visible(&self) -> &[NodeId] {
        match self {
            Self::Expanded(children) => children,
            Self::Collapsed(_) => &[],
        }
    }

    pub fn is_expanded(&self) -> bool {
        matches!(self, Self::Expanded(_))
    }

    fn expanded(self) -> Self {
        match self {
            Self::Collapsed(children) => Self::Expanded(children),
            expanded => expanded,
        }
    }

    fn collapsed(self) -> Self {
        match self {
            Self::Expanded(children) => Self::Collapsed(children),
            collapsed => collapsed,
        }
    }
}

#[derive(Clone, Debug)]
pub struct RenderNode {
    pub title: String,
    pub level: usize,
    pub path: NodePath,
    pub tooltip_data: BTreeMap<String, String>,
    pub branch: Branch,
}

/// Collapse state of one built tree. Rebuilt from every new hierarchy; starts
/// with the root expanded and everything below it collapsed.
#[derive(Clone, Debug)]
pub struct RenderState {
    nodes: Vec<RenderNode>,
}

impl RenderState {
    pub const ROOT: NodeId = NodeId(0);

    pub fn from_hierarchy(hierarchy: &Hierarchy) -> Option<Self> {
        hierarchy.root().map(Self::from_tree)
    }

    pub fn from_tree(root: &TreeNode) -> Self {
        let mut state = Self { nodes: Vec::new() };
        state.push(root, NodePath::root(&root.title));
        if let Some(root) = state.nodes.first_mut() {
            root.branch = mem::replace(&mut root.branch, Branch::Expanded(Vec::new())).expanded();
        }
        state
    }

    fn push(&mut self, tree: &TreeNode, path: NodePath) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(RenderNode {
            title: tree.title.clone(),
            level: tree.level,
            path: path.clone(),
            tooltip_data: tree.tooltip_data.clone(),
            branch: Branch::Collapsed(Vec::new()),
        });

        let children = tree
            .children
            .iter()
            .map(|child| self.push(child, path.child(&child.title)))
            .collect();
        self.nodes[id.0].branch = Branch::Collapsed(children);
        id
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> &RenderNode {
        &self.nodes[id.0]
    }

    #[cfg(test)]
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn visible_children(&self, id: NodeId) -> &[NodeId] {
        self.nodes[id.0].branch.visible()
    }

    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.nodes[id.0].branch.is_expanded()
    }

    pub fn find(&self, path: &NodePath) -> Option<NodeId> {
        let mut current = Self::ROOT;
        let (first, rest) = path.titles().split_first()?;
        if self.nodes.first()?.title != *first {
            return None;
        }
        for title in rest {
            current = *self.nodes[current.0]
                .branch
                .children()
                .iter()
                .find(|child| self.nodes[child.0].title == *title)?;
        }
        Some(current)
    }

    /// Pre-order walk over the nodes currently shown.
    pub fn visible_nodes(&self) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![Self::ROOT];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.visible_children(id).iter().rev().copied());
        }
        order
    }

    /// Flips one node between expanded and collapsed. Leaves do not change.
    pub fn toggle(&mut self, id: NodeId) -> bool {
        let Some(node) = self.nodes.get_mut(id.0) else {
            return false;
        };

        let next = match mem::replace(&mut node.branch, Branch::Expanded(Vec::new())) {
            Branch::Expanded(children) if !children.is_empty() => Branch::Collapsed(children),
            Branch::Collapsed(hidden) if !hidden.is_empty() => Branch::Expanded(hidden),
            unchanged => {
                node.branch = unchanged;
                return false;
            }
        };
        node.branch = next;
        true
    }

    pub fn expand_all(&mut self) {
        for node in &mut self.nodes {
            node.branch = mem::replace(&mut node.branch, Branch::Expanded(Vec::new())).expanded();
        }
    }

    /// Hides every node's children, the root's included.
    pub fn collapse_all(&mut self) {
        for node in &mut self.nodes {
            node.branch = mem::replace(&mut node.branch, Branch::Expanded(Vec::new())).collapsed();
        }
    }
}
