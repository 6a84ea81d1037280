use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context};
use tracing::{error, warn};

use crate::config::TreeConfig;
use crate::hierarchy::{BuildStats, Hierarchy};
use crate::layout::LayoutConfig;
use crate::source::ColumnMetadata;
use crate::tree::{NodePath, ReconcileReport, RenderState, Scene, Viewport};

use self::load::{LoadOutcome, LoadedTree, load_tree};
use self::render_utils::LevelPalette;

mod graph;
mod load;
mod render_utils;
mod ui;

pub use self::load::LoadRequest;

type LoadResult = Result<LoadOutcome, String>;

pub struct HierarchyViewApp {
    request: LoadRequest,
    state: AppState,
    reload_rx: Option<Receiver<LoadResult>>,
}

enum AppState {
    Unconfigured(String),
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<ViewModel>),
}

struct ViewModel {
    config: TreeConfig,
    metadata: ColumnMetadata,
    hierarchy: Hierarchy,
    stats: BuildStats,
    palette: LevelPalette,
    layout_config: LayoutConfig,
    tree: RenderState,
    scene: Scene,
    viewport: Viewport,
    /// Width of the canvas seen on the last frame; `None` until first drawn.
    canvas_width: Option<f32>,
    hovered: Option<NodePath>,
    last_report: ReconcileReport,
    layout_dirty: bool,
}

impl HierarchyViewApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, request: LoadRequest) -> Self {
        let state = Self::start_load(request.clone());
        Self {
            request,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(request: LoadRequest) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_tree(&request).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(request: LoadRequest) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(request),
        }
    }

    fn state_from(outcome: LoadOutcome) -> AppState {
        match outcome {
            LoadOutcome::Unconfigured(reason) => AppState::Unconfigured(reason),
            LoadOutcome::Loaded(tree) => match ViewModel::new(*tree) {
                Some(model) => AppState::Ready(Box::new(model)),
                None => AppState::Unconfigured("the hierarchy has no root".to_owned()),
            },
        }
    }
}

impl eframe::App for HierarchyViewApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(Ok(outcome)) => transition = Some(Self::state_from(outcome)),
                    Ok(Err(reason)) => {
                        error!(error = %reason, "failed to load hierarchy");
                        transition = Some(AppState::Unconfigured(reason));
                    }
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(AppState::Unconfigured(
                            "Background load worker disconnected".to_owned(),
                        ));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading hierarchy...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Unconfigured(reason) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Nothing to draw");
                        ui.add_space(6.0);
                        ui.label(reason.as_str());
                        ui.label(format!(
                            "Edit {} and reload.",
                            self.request.config_path.display()
                        ));
                        ui.add_space(10.0);
                        if ui.button("Reload").clicked() {
                            transition = Some(Self::start_load(self.request.clone()));
                        }
                    });
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &self.request, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.request.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(Ok(outcome)) => transition = Some(Self::state_from(outcome)),
                        Ok(Err(reason)) => {
                            error!(error = %reason, "reload failed; keeping the current tree");
                        }
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            warn!("reload worker disconnected; keeping the current tree");
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}

impl ViewModel {
    fn new(loaded: LoadedTree) -> Option<Self> {
        let LoadedTree {
            config,
            metadata,
            hierarchy,
            stats,
        } = loaded;
        let tree = RenderState::from_hierarchy(&hierarchy)?;
        let palette = LevelPalette::from_config(&config.node_colors);

        Some(Self {
            config,
            metadata,
            hierarchy,
            stats,
            palette,
            layout_config: LayoutConfig::default(),
            tree,
            scene: Scene::default(),
            viewport: Viewport::default(),
            canvas_width: None,
            hovered: None,
            last_report: ReconcileReport::default(),
            layout_dirty: true,
        })
    }
}
