use tracing::debug;

use crate::layout::tidy_tree;

use super::super::ViewModel;

impl ViewModel {
    /// Lays out the expanded part of the tree and diffs the scene against it.
    pub(in crate::app) fn sync_scene(&mut self, now: f64) {
        let layout = tidy_tree(&self.tree, &self.layout_config);
        let palette = &self.palette;
        self.last_report = self
            .scene
            .reconcile(&layout, &self.tree, |level| palette.color(level), now);
        self.layout_dirty = false;

        debug!(
            visible = layout.len(),
            links = layout.links.len(),
            entered_links = self.last_report.links.entered.len(),
            exited_links = self.last_report.links.exited.len(),
            "tree laid out"
        );
    }
}
