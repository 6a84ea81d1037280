mod app;
mod config;
mod hierarchy;
mod layout;
mod source;
mod tree;
mod util;

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::app::{HierarchyViewApp, LoadRequest};
use crate::config::TreeConfig;

/// Interactive collapsible tree over a flat list of records.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Tree configuration (JSON).
    #[arg(long)]
    config: PathBuf,
    /// Record list to read instead of the configured one.
    #[arg(long)]
    records: Option<PathBuf>,
    /// Root node label, overriding the configured value.
    #[arg(long)]
    root: Option<String>,
    #[arg(long, default_value_t = 1280.0)]
    width: f32,
    #[arg(long, default_value_t = 860.0)]
    height: f32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("hierarchy_view=info")),
        )
        .init();

    let args = Args::parse();
    // Fails before the window opens. The loader re-reads the file on every load and reload.
    let config = TreeConfig::load(&args.config)?;
    info!(
        config = %args.config.display(),
        levels = config.grouping_columns.len(),
        "configuration loaded"
    );

    let request = LoadRequest {
        config_path: args.config,
        records: args.records,
        root_value: args.root,
    };
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([args.width, args.height]),
        ..Default::default()
    };

    eframe::run_native(
        "hierarchy-view",
        options,
        Box::new(move |cc| Ok(Box::new(HierarchyViewApp::new(cc, request)))),
    )
    .map_err(|error| anyhow!("failed to run the viewer: {error}"))
}
