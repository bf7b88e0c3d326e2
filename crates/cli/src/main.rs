use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use sunburst_core::human::human_weight;
use sunburst_core::loader::{LoadMsg, Loader};
use sunburst_core::{export, search, SunburstRenderer, ViewConfig};

#[derive(Parser, Debug)]
#[command(name = "sunburst-cli", about = "Zoomable sunburst report generator")]
struct Args {
    /// Tree document (JSON)
    document: PathBuf,
    /// Canvas width in pixels
    #[arg(long, default_value_t = 932.0)]
    width: f64,
    /// Canvas height in pixels
    #[arg(long, default_value_t = 932.0)]
    height: f64,
    /// Zoom to the node best matching this name
    #[arg(short, long)]
    focus: Option<String>,
    /// View configuration (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Output JSON frame path
    #[arg(short, long)]
    json: Option<PathBuf>,
    /// Output CSV arc table path
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Output SVG path
    #[arg(long)]
    svg: Option<PathBuf>,
    /// Output PDF report path
    #[arg(long)]
    pdf: Option<PathBuf>,
}

fn main() -> ExitCode {
    sunburst_core::logging::init("info");
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = match &args.config {
        Some(path) => ViewConfig::from_path(path)?,
        None => ViewConfig::default(),
    };

    let cancel = Arc::new(AtomicBool::new(false));
    let (tx, rx) = crossbeam_channel::unbounded::<LoadMsg>();
    let loader = Loader::new(cancel);
    std::thread::spawn({
        let path = args.document.clone();
        move || loader.load(path, tx)
    });

    let mut bytes = 0u64;
    let mut doc = None;
    while let Ok(msg) = rx.recv() {
        match msg {
            LoadMsg::Read { bytes: b } => bytes = b,
            LoadMsg::Done(d) => {
                doc = Some(d);
                break;
            }
            LoadMsg::Error(e) => return Err(e.into()),
        }
    }
    let doc = doc.ok_or("loader exited without a document")?;

    let mut renderer = SunburstRenderer::new(&doc, args.width, args.height, cfg)?;
    if let Some(query) = &args.focus {
        let hit = search::find(renderer.hierarchy(), query, 1)
            .into_iter()
            .next()
            .ok_or_else(|| format!("no node matches `{query}`"))?;
        renderer.zoom_to(hit.id);
        renderer.finish();
        tracing::info!(focus = %renderer.hierarchy().path(renderer.focus()), "zoomed");
    }

    if let Some(path) = &args.json {
        let json = export::to_json(&renderer)?;
        std::fs::write(path, serde_json::to_string_pretty(&json)?)?;
    }
    if let Some(path) = &args.csv {
        export::to_csv(&renderer, std::fs::File::create(path)?)?;
    }
    if let Some(path) = &args.svg {
        export::write_svg(&renderer, path)?;
    }
    if let Some(path) = &args.pdf {
        export::to_pdf(&renderer, path)?;
    }

    let visible = renderer.frame().iter().filter(|v| v.visible).count();
    println!(
        "Loaded {} nodes ({} bytes), total weight {}, focus {}, {} arcs visible",
        renderer.hierarchy().len(),
        bytes,
        human_weight(renderer.hierarchy().total_weight()),
        renderer.hierarchy().path(renderer.focus()),
        visible
    );
    Ok(())
}
