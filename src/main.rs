use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use lineage_graph::app::{LineageApp, NodeSource};
use lineage_graph::config::LayoutConfig;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON file with the node list. Shows a demo graph when omitted.
    nodes: Option<PathBuf>,

    /// JSON file overriding layout and interaction defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start with the graph filling the whole window.
    #[arg(long)]
    fullscreen: bool,

    #[arg(long, default_value_t = 1440.0)]
    width: f32,

    #[arg(long, default_value_t = 920.0)]
    height: f32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => LayoutConfig::load(path)?,
        None => LayoutConfig::default(),
    };
    let source = match args.nodes {
        Some(path) => NodeSource::File(path),
        None => NodeSource::Demo,
    };
    let fullscreen = args.fullscreen;

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([args.width, args.height])
            .with_fullscreen(fullscreen),
        ..Default::default()
    };

    eframe::run_native(
        "lineage-graph",
        options,
        Box::new(move |cc| {
            Ok(Box::new(LineageApp::new(
                cc,
                source.clone(),
                config.clone(),
                fullscreen,
            )))
        }),
    )
    .map_err(|error| anyhow!("viewer failed: {error}"))
}
