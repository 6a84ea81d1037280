use eframe::egui::{self, Align, Context, Layout};

use super::super::{LoadRequest, ViewModel};

impl ViewModel {
    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        request: &LoadRequest,
        reload_requested: &mut bool,
        is_reloading: bool,
    ) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("hierarchy-view");
                    ui.separator();
                    ui.label(format!("root: {}", self.config.root_value));
                    ui.label(format!("list: {}", self.config.list));
                    ui.label(format!("filter: {}", self.filter_text()));
                    ui.label(format!("records: {}", self.stats.records));
                    ui.label(format!("nodes: {}", self.hierarchy.node_count()));
                    let reload_button =
                        ui.add_enabled(!is_reloading, egui::Button::new("Reload"));
                    if reload_button
                        .on_hover_text(format!(
                            "Re-read {} and its records.",
                            request.config_path.display()
                        ))
                        .clicked()
                    {
                        *reload_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if is_reloading {
                            ui.spinner();
                        }
                        ui.label(format!("visible: {}", self.visible_node_count()));
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui, !is_reloading));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_tree(ui, !is_reloading));
    }

    pub(in crate::app) fn filter_text(&self) -> String {
        self.config
            .filter()
            .map_or_else(|| "none".to_owned(), |filter| filter.to_string())
    }
}
