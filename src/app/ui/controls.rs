use eframe::egui::{self, Sense, Ui, vec2};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui, interactive: bool) {
        let now = ui.input(|input| input.time);

        ui.heading("Tree Controls");
        ui.separator();
        ui.add_space(4.0);

        ui.horizontal_wrapped(|ui| {
            if ui
                .add_enabled(interactive, egui::Button::new("Expand all"))
                .on_hover_text("Show every level, then recentre the view.")
                .clicked()
            {
                self.expand_all(now);
            }
            if ui
                .add_enabled(interactive, egui::Button::new("Collapse all"))
                .on_hover_text("Hide everything below the root, then recentre the view.")
                .clicked()
            {
                self.collapse_all(now);
            }
            if ui
                .button("Reset view")
                .on_hover_text("Centre the root and restore 100% zoom.")
                .clicked()
            {
                self.reset_view(now);
            }
        });

        ui.add_space(4.0);
        ui.label(format!(
            "zoom: {:.0}%",
            self.viewport.transform().scale * 100.0
        ));
        if !self.is_root_expanded() {
            ui.weak("Click the root to open the tree.");
        }

        ui.separator();

        egui::CollapsingHeader::new("Levels")
            .default_open(true)
            .show(ui, |ui| self.draw_levels(ui));

        egui::CollapsingHeader::new("Last update")
            .default_open(false)
            .show(ui, |ui| self.draw_report(ui));

        egui::CollapsingHeader::new("Build statistics")
            .default_open(false)
            .show(ui, |ui| {
                ui.label(format!("records: {}", self.stats.records));
                ui.label(format!("nodes: {}", self.stats.nodes));
                ui.label(format!("depth: {}", self.stats.max_depth));
                for (level, gaps) in &self.stats.gaps_by_level {
                    ui.label(format!("stopped at level {level}: {gaps}"));
                }
            });
    }

    fn draw_levels(&self, ui: &mut Ui) {
        for (index, column) in self.config.grouping_columns.iter().enumerate() {
            let level = index + 1;
            ui.horizontal(|ui| {
                let (swatch, _) = ui.allocate_exact_size(vec2(12.0, 12.0), Sense::hover());
                ui.painter()
                    .circle_filled(swatch.center(), 6.0, self.palette.color(level));
                ui.label(format!("{level}. {}", self.metadata.display_name(column)));
            });

            let fields = self.config.tooltip_fields_for(level);
            if !fields.is_empty() {
                let names = fields
                    .iter()
                    .map(|field| self.metadata.display_name(field))
                    .collect::<Vec<_>>();
                ui.indent(("tooltip_fields", level), |ui| {
                    ui.weak(format!("tooltip: {}", names.join(", ")));
                });
            }
        }
    }

    fn draw_report(&self, ui: &mut Ui) {
        let report = &self.last_report;
        egui::Grid::new("reconcile_report")
            .num_columns(4)
            .striped(true)
            .show(ui, |ui| {
                ui.label("");
                ui.strong("entered");
                ui.strong("updated");
                ui.strong("exited");
                ui.end_row();

                ui.label("nodes");
                ui.label(report.nodes.entered.len().to_string());
                ui.label(report.nodes.updated.len().to_string());
                ui.label(report.nodes.exited.len().to_string());
                ui.end_row();

                ui.label("links");
                ui.label(report.links.entered.len().to_string());
                ui.label(report.links.updated.len().to_string());
                ui.label(report.links.exited.len().to_string());
                ui.end_row();
            });
    }
}
