use eframe::egui::{self, Pos2, Rect, Ui};
use tracing::{debug, info};

use crate::tree::{NodeId, NodePath, Phase, Viewport, ViewportTransform};

use super::super::ViewModel;
use super::super::render_utils::NODE_RADIUS;

impl ViewModel {
    pub(in crate::app) fn handle_tree_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let (scroll, pinch) = ui.input(|input| (input.raw_scroll_delta.y, input.zoom_delta()));
        if scroll.abs() <= f32::EPSILON && (pinch - 1.0).abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15) * pinch;
        self.viewport.zoom_at(rect.min, pointer, zoom_factor);
    }

    pub(in crate::app) fn handle_tree_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Primary)
            || response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.viewport.pan(response.drag_delta());
        }
    }

    /// The closest shown (not exiting) node whose circle contains `pointer`.
    pub(in crate::app) fn node_at(
        &self,
        origin: Pos2,
        pointer: Pos2,
        now: f64,
    ) -> Option<(NodePath, NodeId)> {
        let transform = self.viewport.transform();
        let radius = NODE_RADIUS * transform.scale;

        self.scene
            .nodes()
            .filter(|(_, node)| node.phase != Phase::Exiting)
            .filter_map(|(path, node)| {
                let distance = transform
                    .world_to_screen(origin, node.position(now))
                    .distance(pointer);
                (distance <= radius).then_some((path, node.id, distance))
            })
            .min_by(|a, b| a.2.total_cmp(&b.2))
            .map(|(path, id, _)| (path.clone(), id))
    }

    /// Canvas clicks are dropped while a reload is in flight.
    pub(in crate::app) fn click_node(&mut self, id: NodeId, now: f64, interactive: bool) -> bool {
        if !interactive {
            debug!(node = %self.tree.node(id).path, "click ignored during reload");
            return false;
        }
        self.toggle_node(id, now)
    }

    fn toggle_node(&mut self, id: NodeId, now: f64) -> bool {
        if !self.tree.toggle(id) {
            return false;
        }
        info!(
            node = %self.tree.node(id).path,
            expanded = self.tree.is_expanded(id),
            "node toggled"
        );
        self.sync_scene(now);
        true
    }

    pub(in crate::app) fn expand_all(&mut self, now: f64) {
        self.tree.expand_all();
        self.sync_scene(now);
        self.reset_view(now);
    }

    pub(in crate::app) fn collapse_all(&mut self, now: f64) {
        self.tree.collapse_all();
        self.sync_scene(now);
        self.reset_view(now);
    }

    /// Animates back to the unscaled view with the root centred.
    pub(in crate::app) fn reset_view(&mut self, now: f64) {
        if let Some(width) = self.canvas_width {
            self.viewport
                .animate_to(ViewportTransform::centered_on_root(width), now);
        }
    }

    /// Tracks the canvas width; the first observation places the root.
    pub(in crate::app) fn observe_canvas_width(&mut self, width: f32) {
        if self.canvas_width.is_none() {
            self.viewport = Viewport::new(ViewportTransform::centered_on_root(width));
        }
        self.canvas_width = Some(width);
    }
}
