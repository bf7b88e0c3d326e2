use crossbeam_channel::Sender;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::LoadError;
use crate::model::Document;

#[derive(Debug, Clone)]
pub enum LoadMsg {
    Read { bytes: u64 },
    Done(Document),
    Error(String),
}

/// Reads and validates a tree document from disk.
pub fn load_document(path: &Path) -> Result<Document, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let doc = Document::from_json_str(&text).map_err(|source| {
        tracing::warn!(path = %path.display(), error = %source, "rejected document");
        LoadError::Document {
            path: path.to_path_buf(),
            source,
        }
    })?;
    tracing::info!(path = %path.display(), nodes = doc.node_count(), "document loaded");
    Ok(doc)
}

/// Background loader reporting over a channel, so a UI thread never blocks
/// on disk.
pub struct Loader {
    cancel: Arc<AtomicBool>,
}

impl Loader {
    pub fn new(cancel: Arc<AtomicBool>) -> Self {
        Self { cancel }
    }

    pub fn load(&self, path: PathBuf, tx: Sender<LoadMsg>) {
        if let Ok(md) = std::fs::metadata(&path) {
            let _ = tx.send(LoadMsg::Read { bytes: md.len() });
        }
        let result = load_document(&path);
        if self.cancel.load(Ordering::Relaxed) {
            tracing::debug!(path = %path.display(), "load cancelled");
            return;
        }
        let _ = match result {
            Ok(doc) => tx.send(LoadMsg::Done(doc)),
            Err(e) => tx.send(LoadMsg::Error(e.to_string())),
        };
    }
}
