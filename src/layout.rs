use std::collections::HashMap;

use eframe::egui::{Vec2, vec2};

use crate::tree::{NodeId, RenderState};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutConfig {
    /// Horizontal distance of one separation unit.
    pub node_spacing: f32,
    /// Vertical distance between depths.
    pub level_spacing: f32,
    /// Separation units between neighbours below the first level.
    pub sibling_separation: f32,
    /// Separation units between neighbours at the first level, widening the top split.
    pub top_split_separation: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_spacing: 100.0,
            level_spacing: 200.0,
            sibling_separation: 2.0,
            top_split_separation: 2.5,
        }
    }
}

impl LayoutConfig {
    fn separation(&self, depth: usize) -> f32 {
        if depth <= 1 {
            self.top_split_separation
        } else {
            self.sibling_separation
        }
    }
}

/// Positions for the visible part of the tree, root at the origin.
#[derive(Clone, Debug, Default)]
pub struct TreeLayout {
    positions: HashMap<NodeId, Vec2>,
    /// Visible nodes in pre-order.
    pub order: Vec<NodeId>,
    /// Visible parent/child pairs.
    pub links: Vec<(NodeId, NodeId)>,
}

impl TreeLayout {
    pub fn position(&self, id: NodeId) -> Option<Vec2> {
        self.positions.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }
}

/// Leftmost and rightmost x per depth of a subtree, relative to its root.
struct Contour {
    left: Vec<f32>,
    right: Vec<f32>,
}

impl Contour {
    fn leaf() -> Self {
        Self {
            left: vec![0.0],
            right: vec![0.0],
        }
    }

    fn shifted(mut self, offset: f32) -> Self {
        self.left.iter_mut().for_each(|x| *x += offset);
        self.right.iter_mut().for_each(|x| *x += offset);
        self
    }

    fn absorb(&mut self, other: &Contour) {
        for (depth, (&left, &right)) in other.left.iter().zip(&other.right).enumerate() {
            if depth < self.left.len() {
                self.left[depth] = self.left[depth].min(left);
                self.right[depth] = self.right[depth].max(right);
            } else {
                self.left.push(left);
                self.right.push(right);
            }
        }
    }
}

/// Tidy top-down layout over the expanded part of `state`: parents are centred
/// over their outermost children and neighbouring subtrees never overlap.
pub fn tidy_tree(state: &RenderState, config: &LayoutConfig) -> TreeLayout {
    let mut offsets = HashMap::new();
    place_subtree(state, RenderState::ROOT, 0, config, &mut offsets);

    let mut layout = TreeLayout::default();
    let mut stack = vec![(RenderState::ROOT, 0usize, 0.0f32)];
    while let Some((id, depth, x)) = stack.pop() {
        layout.order.push(id);
        layout.positions.insert(
            id,
            vec2(x * config.node_spacing, depth as f32 * config.level_spacing),
        );
        for &child in state.visible_children(id).iter().rev() {
            let offset = offsets.get(&child).copied().unwrap_or(0.0);
            stack.push((child, depth + 1, x + offset));
        }
        layout
            .links
            .extend(state.visible_children(id).iter().map(|&child| (id, child)));
    }
    layout
}

/// Places the children of `id` relative to it (in separation units) and
/// returns the subtree's contour.
fn place_subtree(
    state: &RenderState,
    id: NodeId,
    depth: usize,
    config: &LayoutConfig,
    offsets: &mut HashMap<NodeId, f32>,
) -> Contour {
    let children = state.visible_children(id);
    if children.is_empty() {
        return Contour::leaf();
    }

    let mut combined: Option<Contour> = None;
    let mut child_offsets = Vec::with_capacity(children.len());

    for &child in children {
        let contour = place_subtree(state, child, depth + 1, config, offsets);
        let offset = match &combined {
            None => 0.0,
            Some(combined) => combined
                .right
                .iter()
                .zip(&contour.left)
                .enumerate()
                .map(|(level, (&right, &left))| right + config.separation(depth + 1 + level) - left)
                .fold(f32::NEG_INFINITY, f32::max),
        };

        let contour = contour.shifted(offset);
        match combined.as_mut() {
            None => combined = Some(contour),
            Some(existing) => existing.absorb(&contour),
        }
        child_offsets.push(offset);
    }

    let first = child_offsets.first().copied().unwrap_or(0.0);
    let last = child_offsets.last().copied().unwrap_or(0.0);
    let midpoint = (first + last) / 2.0;
    for (&child, offset) in children.iter().zip(child_offsets) {
        offsets.insert(child, offset - midpoint);
    }

    let mut contour = Contour::leaf();
    if let Some(below) = combined {
        let below = below.shifted(-midpoint);
        contour.left.extend(below.left);
        contour.right.extend(below.right);
    }
    contour
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::hierarchy::TreeNode;

    fn tree(title: &str, level: usize, children: Vec<TreeNode>) -> TreeNode {
        TreeNode {
            title: title.to_owned(),
            level,
            children,
            tooltip_data: BTreeMap::new(),
        }
    }

    fn leaves(prefix: &str, level: usize, count: usize) -> Vec<TreeNode> {
        (0..count)
            .map(|index| tree(&format!("{prefix}{index}"), level, vec![]))
            .collect()
    }

    fn sample() -> RenderState {
        let root = tree(
            "Company",
            0,
            vec![
                tree("Eng", 1, leaves("e", 2, 4)),
                tree("Ops", 1, vec![]),
                tree("Sales", 1, leaves("s", 2, 3)),
            ],
        );
        let mut state = RenderState::from_tree(&root);
        state.expand_all();
        state
    }

    #[test]
    fn root_sits_at_origin_and_depth_advances_downward() {
        let state = sample();
        let config = LayoutConfig::default();
        let layout = tidy_tree(&state, &config);

        assert_eq!(layout.position(RenderState::ROOT), Some(Vec2::ZERO));
        for id in &layout.order {
            let depth = state.node(*id).path.depth();
            assert_eq!(
                layout.position(*id).unwrap().y,
                depth as f32 * config.level_spacing
            );
        }
        assert_eq!(layout.len(), state.len());
    }

    #[test]
    fn neighbours_on_each_depth_keep_their_separation() {
        let state = sample();
        let config = LayoutConfig::default();
        let layout = tidy_tree(&state, &config);

        let mut by_depth: BTreeMap<usize, Vec<f32>> = BTreeMap::new();
        for id in &layout.order {
            by_depth
                .entry(state.node(*id).path.depth())
                .or_default()
                .push(layout.position(*id).unwrap().x);
        }

        for (depth, xs) in by_depth {
            let minimum = config.separation(depth) * config.node_spacing - 1e-3;
            for pair in xs.windows(2) {
                assert!(pair[1] - pair[0] >= minimum, "depth {depth}: {pair:?}");
            }
        }
    }

    #[test]
    fn parents_are_centred_over_children() {
        let state = sample();
        let layout = tidy_tree(&state, &LayoutConfig::default());

        for id in &layout.order {
            let children = state.visible_children(*id);
            let (Some(first), Some(last)) = (children.first(), children.last()) else {
                continue;
            };
            let centre =
                (layout.position(*first).unwrap().x + layout.position(*last).unwrap().x) / 2.0;
            assert!((layout.position(*id).unwrap().x - centre).abs() < 1e-3);
        }
    }

    #[test]
    fn collapsed_subtrees_are_not_laid_out() {
        let mut state = sample();
        state.collapse_all();
        state.toggle(RenderState::ROOT);

        let layout = tidy_tree(&state, &LayoutConfig::default());
        assert_eq!(layout.len(), 4);
        assert_eq!(layout.links.len(), 3);
        assert!(layout.links.iter().all(|(parent, _)| *parent == RenderState::ROOT));
    }
}
