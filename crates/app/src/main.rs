mod state;
mod tour;
mod ui;

use anyhow::Context;
use clap::Parser;
use eframe::egui;
use state::{AppState, Persisted};
use std::path::PathBuf;
use sunburst_core::ViewConfig;

struct SunburstApp {
    state: AppState,
}

impl SunburstApp {
    fn new(cc: &eframe::CreationContext<'_>, config: ViewConfig, document: Option<PathBuf>) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());
        let persisted: Persisted = cc
            .storage
            .and_then(|s| eframe::get_value(s, eframe::APP_KEY))
            .unwrap_or_default();
        let mut state = AppState::new(config, persisted);
        if let Some(path) = document.or_else(|| state.dataset.clone().filter(|p| p.is_file())) {
            state.start_load(path);
        }
        Self { state }
    }
}

impl eframe::App for SunburstApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ui::draw(&mut self.state, ctx);
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.state.persisted());
    }
}

#[derive(Parser, Debug)]
#[command(name = "sunburst-app", about = "Interactive zoomable sunburst viewer")]
struct Args {
    /// Tree document (JSON) to open at startup
    document: Option<PathBuf>,
    /// View configuration (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    sunburst_core::logging::init("warn");
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => ViewConfig::from_path(path)
            .with_context(|| format!("loading view config {}", path.display()))?,
        None => ViewConfig::default(),
    };
    let document = args.document;
    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Sunburst Explorer",
        options,
        Box::new(move |cc| Ok(Box::new(SunburstApp::new(cc, config, document)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
