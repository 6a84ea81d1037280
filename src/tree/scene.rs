use std::collections::{BTreeMap, HashMap};

use eframe::egui::{Color32, Vec2};
use tracing::debug;

use crate::layout::TreeLayout;
use crate::util::{ease_cubic_in_out, transition_progress};

use super::{NodeId, NodePath, RenderState, TRANSITION_SECS};

pub type LinkKey = (NodePath, NodePath);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Entering,
    Updating,
    Exiting,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Motion<T> {
    from: T,
    to: T,
    started_at: f64,
}

impl Motion<Vec2> {
    fn at(&self, now: f64) -> Vec2 {
        let t = ease_cubic_in_out(transition_progress(self.started_at, now, TRANSITION_SECS));
        self.from + (self.to - self.from) * t
    }
}

impl Motion<(Vec2, Vec2)> {
    fn at(&self, now: f64) -> (Vec2, Vec2) {
        let t = ease_cubic_in_out(transition_progress(self.started_at, now, TRANSITION_SECS));
        (
            self.from.0 + (self.to.0 - self.from.0) * t,
            self.from.1 + (self.to.1 - self.from.1) * t,
        )
    }
}

fn finished(started_at: f64, now: f64) -> bool {
    transition_progress(started_at, now, TRANSITION_SECS) >= 1.0
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
    pub id: NodeId,
    pub title: String,
    pub level: usize,
    pub color: Color32,
    pub phase: Phase,
    /// Whether the node has children that are currently hidden.
    pub collapsed: bool,
    motion: Motion<Vec2>,
}

impl SceneNode {
    /// World position at `now`.
    pub fn position(&self, now: f64) -> Vec2 {
        self.motion.at(now)
    }

    #[cfg(test)]
    pub fn target(&self) -> Vec2 {
        self.motion.to
    }

    pub fn opacity(&self, now: f64) -> f32 {
        let t = ease_cubic_in_out(transition_progress(
            self.motion.started_at,
            now,
            TRANSITION_SECS,
        ));
        match self.phase {
            Phase::Entering => t,
            Phase::Updating => 1.0,
            Phase::Exiting => 1.0 - t,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneLink {
    pub phase: Phase,
    motion: Motion<(Vec2, Vec2)>,
}

impl SceneLink {
    /// Parent and child endpoints at `now`.
    pub fn endpoints(&self, now: f64) -> (Vec2, Vec2) {
        self.motion.at(now)
    }

    pub fn opacity(&self, now: f64) -> f32 {
        match self.phase {
            Phase::Exiting => {
                1.0 - ease_cubic_in_out(transition_progress(
                    self.motion.started_at,
                    now,
                    TRANSITION_SECS,
                ))
            }
            Phase::Entering | Phase::Updating => 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delta<K> {
    pub entered: Vec<K>,
    pub updated: Vec<K>,
    pub exited: Vec<K>,
}

impl<K> Default for Delta<K> {
    fn default() -> Self {
        Self {
            entered: Vec::new(),
            updated: Vec::new(),
            exited: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub nodes: Delta<NodePath>,
    pub links: Delta<LinkKey>,
}

/// Animated visual elements keyed by path. Each reconcile diffs the new layout
/// against what is on screen and restarts every element's transition from
/// where it currently is.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    nodes: BTreeMap<NodePath, SceneNode>,
    links: BTreeMap<LinkKey, SceneLink>,
}

impl Scene {
    pub fn nodes(&self) -> impl Iterator<Item = (&NodePath, &SceneNode)> {
        self.nodes.iter()
    }

    pub fn links(&self) -> impl Iterator<Item = (&LinkKey, &SceneLink)> {
        self.links.iter()
    }

    #[cfg(test)]
    pub fn node(&self, path: &NodePath) -> Option<&SceneNode> {
        self.nodes.get(path)
    }

    #[cfg(test)]
    pub fn link(&self, key: &LinkKey) -> Option<&SceneLink> {
        self.links.get(key)
    }

    pub fn is_animating(&self, now: f64) -> bool {
        self.nodes
            .values()
            .any(|node| !finished(node.motion.started_at, now))
            || self
                .links
                .values()
                .any(|link| !finished(link.motion.started_at, now))
    }

    pub fn reconcile(
        &mut self,
        layout: &TreeLayout,
        state: &RenderState,
        color_for_level: impl Fn(usize) -> Color32,
        now: f64,
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        let shown: HashMap<&NodePath, Vec2> = self
            .nodes
            .iter()
            .filter(|(_, node)| node.phase != Phase::Exiting)
            .map(|(path, node)| (path, node.position(now)))
            .collect();

        let mut targets: HashMap<NodePath, Vec2> = HashMap::with_capacity(layout.len());
        for &id in &layout.order {
            if let Some(position) = layout.position(id) {
                targets.insert(state.node(id).path.clone(), position);
            }
        }

        let mut nodes = BTreeMap::new();
        let mut entry_points: HashMap<&NodePath, Vec2> = HashMap::new();

        for &id in &layout.order {
            let render_node = state.node(id);
            let path = &render_node.path;
            let Some(&target) = targets.get(path) else {
                continue;
            };

            let previous = self.nodes.get(path);
            let (phase, from) = match (previous, shown.get(path)) {
                (Some(_), Some(&current)) => {
                    report.nodes.updated.push(path.clone());
                    (Phase::Updating, current)
                }
                (Some(exiting), None) => {
                    report.nodes.entered.push(path.clone());
                    (Phase::Entering, exiting.position(now))
                }
                (None, _) => {
                    report.nodes.entered.push(path.clone());
                    let from = nearest_ancestor(path, |ancestor| shown.get(ancestor).copied())
                        .unwrap_or(target);
                    (Phase::Entering, from)
                }
            };
            entry_points.insert(path, from);

            nodes.insert(
                path.clone(),
                SceneNode {
                    id,
                    title: render_node.title.clone(),
                    level: render_node.level,
                    color: color_for_level(render_node.level),
                    phase,
                    collapsed: !render_node.branch.is_expanded()
                        && !render_node.branch.children().is_empty(),
                    motion: Motion {
                        from,
                        to: target,
                        started_at: now,
                    },
                },
            );
        }

        let exit_target = |path: &NodePath| {
            nearest_ancestor(path, |ancestor| targets.get(ancestor).copied())
        };

        for (path, mut node) in std::mem::take(&mut self.nodes) {
            if nodes.contains_key(&path) {
                continue;
            }
            let current = node.position(now);
            let to = exit_target(&path).unwrap_or(current);
            if node.phase != Phase::Exiting {
                report.nodes.exited.push(path.clone());
                node.phase = Phase::Exiting;
                node.motion = Motion {
                    from: current,
                    to,
                    started_at: now,
                };
            } else {
                node.motion.to = to;
            }
            nodes.insert(path, node);
        }
        self.nodes = nodes;

        let mut links = BTreeMap::new();
        for &(parent, child) in &layout.links {
            let key = (state.node(parent).path.clone(), state.node(child).path.clone());
            let (Some(&parent_target), Some(&child_target)) =
                (targets.get(&key.0), targets.get(&key.1))
            else {
                continue;
            };

            let (phase, from) = match self.links.get(&key) {
                Some(link) if link.phase != Phase::Exiting => {
                    report.links.updated.push(key.clone());
                    (Phase::Updating, link.endpoints(now))
                }
                Some(link) => {
                    report.links.entered.push(key.clone());
                    (Phase::Entering, link.endpoints(now))
                }
                None => {
                    report.links.entered.push(key.clone());
                    let origin = entry_points.get(&key.1).copied().unwrap_or(parent_target);
                    (Phase::Entering, (origin, origin))
                }
            };

            links.insert(
                key,
                SceneLink {
                    phase,
                    motion: Motion {
                        from,
                        to: (parent_target, child_target),
                        started_at: now,
                    },
                },
            );
        }

        for (key, mut link) in std::mem::take(&mut self.links) {
            if links.contains_key(&key) {
                continue;
            }
            let current = link.endpoints(now);
            let collapse_point = exit_target(&key.1).unwrap_or(current.0);
            if link.phase != Phase::Exiting {
                report.links.exited.push(key.clone());
                link.phase = Phase::Exiting;
                link.motion = Motion {
                    from: current,
                    to: (collapse_point, collapse_point),
                    started_at: now,
                };
            } else {
                link.motion.to = (collapse_point, collapse_point);
            }
            links.insert(key, link);
        }
        self.links = links;

        debug!(
            entered = report.nodes.entered.len(),
            updated = report.nodes.updated.len(),
            exited = report.nodes.exited.len(),
            "scene reconciled"
        );
        report
    }

    /// Drops exiting elements whose transition has finished.
    pub fn prune(&mut self, now: f64) -> usize {
        let before = self.nodes.len() + self.links.len();
        self.nodes.retain(|_, node| {
            node.phase != Phase::Exiting || !finished(node.motion.started_at, now)
        });
        self.links.retain(|_, link| {
            link.phase != Phase::Exiting || !finished(link.motion.started_at, now)
        });
        before - (self.nodes.len() + self.links.len())
    }
}

/// First proper ancestor of `path` for which `lookup` yields a position.
fn nearest_ancestor(path: &NodePath, lookup: impl Fn(&NodePath) -> Option<Vec2>) -> Option<Vec2> {
    let mut current = path.parent();
    while let Some(ancestor) = current {
        if let Some(position) = lookup(&ancestor) {
            return Some(position);
        }
        current = ancestor.parent();
    }
    None
}
