use eframe::egui::{self, Color32, FontId, Pos2, Rect, Sense, Stroke, StrokeKind, Ui, vec2};

use crate::tree::{NodePath, RenderState};
use crate::util::truncate_label;

use super::super::ViewModel;
use super::super::render_utils::{
    HOVER_COLOR, LINK_COLOR, LINK_WIDTH, NODE_RADIUS, circle_visible, draw_background, draw_link,
    link_visible, with_opacity,
};
use super::tooltip::tooltip_lines;

const LABEL_OFFSET: egui::Vec2 = vec2(20.0, -10.0);
const LABEL_WRAP_WIDTH: f32 = 180.0;
const LABEL_MAX_CHARS: usize = 120;
const TOOLTIP_OFFSET: egui::Vec2 = vec2(10.0, 10.0);

impl ViewModel {
    pub(in crate::app) fn draw_tree(&mut self, ui: &mut Ui, interactive: bool) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        let now = ui.input(|input| input.time);

        draw_background(&painter, rect);
        self.observe_canvas_width(rect.width());
        if self.layout_dirty {
            self.sync_scene(now);
        }

        self.handle_tree_zoom(ui, rect, &response);
        self.handle_tree_pan(&response);
        self.viewport.tick(now);
        self.scene.prune(now);

        let origin = rect.min;
        let pointer = response.hover_pos();
        let hovered = pointer.and_then(|pointer| self.node_at(origin, pointer, now));

        if response.clicked_by(egui::PointerButton::Primary)
            && let Some((_, id)) = &hovered
        {
            self.click_node(*id, now, interactive);
        }
        self.hovered = hovered.map(|(path, _)| path);

        self.paint_links(&painter, rect, now);
        self.paint_nodes(&painter, rect, now);

        if let (Some(path), Some(pointer)) = (self.hovered.clone(), pointer) {
            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
            self.paint_tooltip(&painter, rect, &path, pointer);
        }

        if self.scene.is_animating(now) || self.viewport.is_animating() || response.dragged() {
            ui.ctx().request_repaint();
        }
    }

    fn paint_links(&self, painter: &egui::Painter, rect: Rect, now: f64) {
        let transform = self.viewport.transform();
        let width = (LINK_WIDTH * transform.scale).max(1.0);

        for (_, link) in self.scene.links() {
            let (parent, child) = link.endpoints(now);
            let parent = transform.world_to_screen(rect.min, parent);
            let child = transform.world_to_screen(rect.min, child);
            if !link_visible(rect, parent, child, width) {
                continue;
            }

            let color = with_opacity(LINK_COLOR, link.opacity(now));
            draw_link(painter, parent, child, Stroke::new(width, color));
        }
    }

    fn paint_nodes(&self, painter: &egui::Painter, rect: Rect, now: f64) {
        let transform = self.viewport.transform();
        let radius = NODE_RADIUS * transform.scale;
        let font = FontId::proportional(12.0 * transform.scale);

        for (path, node) in self.scene.nodes() {
            let position = transform.world_to_screen(rect.min, node.position(now));
            let opacity = node.opacity(now);
            let label_rect = Rect::from_min_size(
                position + LABEL_OFFSET * transform.scale,
                vec2(LABEL_WRAP_WIDTH, 40.0) * transform.scale,
            );
            if !circle_visible(rect, position, radius) && !rect.intersects(label_rect) {
                continue;
            }

            let fill = if self.hovered.as_ref() == Some(path) {
                HOVER_COLOR
            } else {
                node.color
            };
            painter.circle_filled(position, radius, with_opacity(fill, opacity));
            if node.collapsed {
                painter.circle_stroke(
                    position,
                    radius,
                    Stroke::new(
                        2.0 * transform.scale,
                        with_opacity(Color32::from_gray(40), opacity),
                    ),
                );
            }

            let galley = painter.layout(
                truncate_label(&node.title, LABEL_MAX_CHARS),
                font.clone(),
                with_opacity(Color32::from_gray(30), opacity),
                LABEL_WRAP_WIDTH * transform.scale,
            );
            painter.galley(label_rect.min, galley, Color32::from_gray(30));
        }
    }

    fn paint_tooltip(&self, painter: &egui::Painter, rect: Rect, path: &NodePath, pointer: Pos2) {
        let Some(id) = self.tree.find(path) else {
            return;
        };
        let node = self.tree.node(id);
        let lines = tooltip_lines(node, self.config.tooltip_fields_for(node.level), &self.metadata);

        let title = painter.layout_no_wrap(
            node.title.clone(),
            FontId::proportional(14.0),
            Color32::from_gray(20),
        );
        let body = (!lines.is_empty()).then(|| {
            painter.layout(
                lines.join("\n"),
                FontId::proportional(12.0),
                Color32::from_gray(60),
                320.0,
            )
        });

        let padding = vec2(10.0, 10.0);
        let body_size = body.as_ref().map_or(egui::Vec2::ZERO, |body| body.size());
        let gap = if body.is_some() { 4.0 } else { 0.0 };
        let size = vec2(
            title.size().x.max(body_size.x),
            title.size().y + gap + body_size.y,
        ) + padding * 2.0;

        let mut min = pointer + TOOLTIP_OFFSET;
        min.x = min.x.min(rect.right() - size.x).max(rect.left());
        min.y = min.y.min(rect.bottom() - size.y).max(rect.top());
        let frame = Rect::from_min_size(min, size);

        painter.rect_filled(frame, 5.0, Color32::WHITE);
        painter.rect_stroke(
            frame,
            5.0,
            Stroke::new(1.0, Color32::from_gray(204)),
            StrokeKind::Inside,
        );

        let title_height = title.size().y;
        painter.galley(frame.min + padding, title, Color32::from_gray(20));
        if let Some(body) = body {
            painter.galley(
                frame.min + padding + vec2(0.0, title_height + gap),
                body,
                Color32::from_gray(60),
            );
        }
    }

    pub(in crate::app) fn visible_node_count(&self) -> usize {
        self.tree.visible_nodes().len()
    }

    pub(in crate::app) fn is_root_expanded(&self) -> bool {
        self.tree.is_expanded(RenderState::ROOT)
    }
}
