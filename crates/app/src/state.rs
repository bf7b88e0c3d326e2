use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use sunburst_core::loader::{LoadMsg, Loader};
use sunburst_core::search::{self, SearchHit};
use sunburst_core::{LayoutError, NodeId, SunburstRenderer, ViewConfig};

use crate::tour::Tour;

/// Survives restarts through eframe storage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Persisted {
    pub last_dataset: Option<PathBuf>,
    pub tour_seen: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Idle,
    Loading,
    Ready,
    NoData,
    Failed(String),
}

pub struct AppState {
    pub dataset: Option<PathBuf>,
    pub cancel: Arc<AtomicBool>,
    pub load_rx: Option<Receiver<LoadMsg>>,
    pub loaded_bytes: u64,
    pub loaded_at: Option<chrono::DateTime<chrono::Local>>,
    pub status: Status,
    pub config: ViewConfig,
    pub renderer: Option<SunburstRenderer>,
    pub search: String,
    pub tour: Tour,
}

impl AppState {
    pub fn new(config: ViewConfig, persisted: Persisted) -> Self {
        let tour = if persisted.tour_seen {
            Tour::closed()
        } else {
            Tour::open()
        };
        Self {
            dataset: persisted.last_dataset,
            cancel: Arc::new(AtomicBool::new(false)),
            load_rx: None,
            loaded_bytes: 0,
            loaded_at: None,
            status: Status::Idle,
            config,
            renderer: None,
            search: String::new(),
            tour,
        }
    }

    pub fn persisted(&self) -> Persisted {
        Persisted {
            last_dataset: self.dataset.clone(),
            tour_seen: self.tour.seen(),
        }
    }

    pub fn start_load(&mut self, path: PathBuf) {
        // A load still in flight must not overwrite the new one.
        self.cancel.store(true, Ordering::Relaxed);
        self.cancel = Arc::new(AtomicBool::new(false));

        self.dataset = Some(path.clone());
        self.loaded_bytes = 0;
        self.renderer = None;
        self.search.clear();
        self.status = Status::Loading;

        let (tx, rx): (Sender<LoadMsg>, Receiver<LoadMsg>) = unbounded();
        self.load_rx = Some(rx);
        let cancel = self.cancel.clone();

        std::thread::spawn(move || {
            let loader = Loader::new(cancel);
            loader.load(path, tx);
        });
    }

    pub fn cancel_load(&mut self) {
        self.cancel.store(true, Ordering::Relaxed);
        self.load_rx = None;
        if self.status == Status::Loading {
            self.status = Status::Idle;
        }
    }

    /// Applies one loader message. Returns `true` once loading is over.
    pub fn apply(&mut self, msg: LoadMsg, canvas: (f64, f64)) -> bool {
        match msg {
            LoadMsg::Read { bytes } => {
                self.loaded_bytes = bytes;
                false
            }
            LoadMsg::Done(doc) => {
                match SunburstRenderer::new(&doc, canvas.0, canvas.1, self.config.clone()) {
                    Ok(r) => {
                        self.renderer = Some(r);
                        self.status = Status::Ready;
                        self.loaded_at = Some(chrono::Local::now());
                    }
                    Err(LayoutError::NoData) => self.status = Status::NoData,
                }
                true
            }
            LoadMsg::Error(e) => {
                tracing::warn!(error = %e, "dataset failed to load");
                self.status = Status::Failed(e);
                true
            }
        }
    }

    pub fn zoom_out(&mut self) {
        if let Some(r) = &mut self.renderer {
            r.click_center();
        }
    }

    pub fn zoom_to(&mut self, id: NodeId) {
        if let Some(r) = &mut self.renderer {
            r.zoom_to(id);
        }
    }

    pub fn reset_view(&mut self) {
        if let Some(r) = &mut self.renderer {
            let root = r.hierarchy().root;
            if r.focus() != root {
                r.zoom_to(root);
            }
        }
    }

    pub fn search_hits(&self, limit: usize) -> Vec<SearchHit> {
        match &self.renderer {
            Some(r) => search::find(r.hierarchy(), &self.search, limit),
            None => Vec::new(),
        }
    }

    /// Shows the onboarding tour again from its first step.
    pub fn reset_tour(&mut self) {
        self.tour = Tour::open();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sunburst_core::Document;

    fn doc(json: &str) -> Document {
        Document::from_json_str(json).unwrap()
    }

    #[test]
    fn done_message_builds_renderer() {
        let mut app = AppState::new(ViewConfig::default(), Persisted::default());
        assert!(app.tour.is_open());
        assert!(!app.apply(LoadMsg::Read { bytes: 10 }, (600.0, 600.0)));
        let d = doc(r#"{"name":"r","children":[{"name":"a","children":[{"name":"b","value":1}]}]}"#);
        assert!(app.apply(LoadMsg::Done(d), (600.0, 600.0)));
        assert_eq!(app.status, Status::Ready);
        assert_eq!(app.loaded_bytes, 10);

        app.zoom_to(NodeId(1));
        assert_eq!(app.renderer.as_ref().unwrap().focus(), NodeId(1));
        app.reset_view();
        assert_eq!(app.renderer.as_ref().unwrap().focus(), NodeId(0));
    }

    #[test]
    fn empty_document_and_errors_show_placeholders() {
        let mut app = AppState::new(ViewConfig::default(), Persisted::default());
        assert!(app.apply(LoadMsg::Done(doc(r#"{"name":"r"}"#)), (100.0, 100.0)));
        assert_eq!(app.status, Status::NoData);
        assert!(app.renderer.is_none());
        assert!(app.apply(LoadMsg::Error("boom".into()), (100.0, 100.0)));
        assert_eq!(app.status, Status::Failed("boom".into()));
    }

    #[test]
    fn tour_flag_round_trips_through_persistence() {
        let mut app = AppState::new(
            ViewConfig::default(),
            Persisted {
                last_dataset: None,
                tour_seen: true,
            },
        );
        assert!(!app.tour.is_open());
        assert!(app.persisted().tour_seen);
        app.reset_tour();
        assert!(app.tour.is_open());
        assert!(!app.persisted().tour_seen);
    }

    #[test]
    fn search_needs_a_renderer() {
        let mut app = AppState::new(ViewConfig::default(), Persisted::default());
        app.search = "a".into();
        assert!(app.search_hits(5).is_empty());
        app.apply(
            LoadMsg::Done(doc(r#"{"name":"r","children":[{"name":"alpha","value":1}]}"#)),
            (100.0, 100.0),
        );
        assert_eq!(app.search_hits(5)[0].id, NodeId(1));
    }
}
